//! Axis-range heuristic.
//!
//! Turns data plus a bound policy into concrete axis limits rounded to two
//! significant figures, and picks a tick count whose increment reads well.

pub mod divider;
pub mod range;
pub mod signif;

pub use divider::*;
pub use range::*;
pub use signif::*;
