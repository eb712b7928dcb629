//! Input/output helpers.
//!
//! - CSV tables with by-name column lookup (`table`)
//! - observation sets assembled from columns (`series`)
//! - CSV/JSON exports (`export`)

pub mod export;
pub mod series;
pub mod table;

pub use export::*;
pub use series::*;
pub use table::*;
