//! Model implementations.
//!
//! Models are small, pure functions so the fitting code can stay generic over
//! `ModelKind`.

pub mod model;

pub use model::*;
