//! Model fitting engine.
//!
//! Responsibilities:
//!
//! - weight observations by their (propagated) uncertainties
//! - solve constant / linear / linear-through-origin models by weighted least squares
//! - compute the weighted average analytically

pub mod fitter;

pub use fitter::*;
