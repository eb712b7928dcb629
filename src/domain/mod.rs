//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the model selector (`ModelKind`) and fit output (`FitResult`)
//! - paired observations with optional uncertainties (`ObservationSet`)
//! - axis policies and resolved ranges (`Bound`, `TickPolicy`, `AxisRange`)
//! - per-mode run configuration (`ErrorbarConfig`, `HistConfig`, ...)

pub mod types;

pub use types::*;
