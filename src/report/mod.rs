//! Reporting utilities: human-readable summaries of fits, evaluations and grades.
//!
//! Formatting lives here so the numeric modules stay free of presentation.

pub mod format;

pub use format::*;
