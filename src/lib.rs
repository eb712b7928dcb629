//! `lab-fit` library crate.
//!
//! The binary (`labfit`) is a thin wrapper around this library so that:
//!
//! - fitting, axis and evaluation logic is testable without spawning processes
//! - every mode pipeline can be driven from tests with plain config structs
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod axis;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod fit;
pub mod grades;
pub mod io;
pub mod math;
pub mod models;
pub mod periods;
pub mod plot;
pub mod report;
