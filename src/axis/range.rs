//! Axis range resolution: auto bounds, explicit bounds, tick count.

use crate::axis::{best_divider, signif_down, signif_up, DEFAULT_DIVIDERS};
use crate::domain::{AxisConfig, AxisRange, Bound, TickPolicy};
use crate::error::AppError;

/// A resolved axis plus informational warnings (never errors).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAxis {
    pub range: AxisRange,
    pub warnings: Vec<String>,
}

/// Smallest and largest finite value over all series.
pub fn data_extent(series: &[&[f64]]) -> Option<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in series.iter().flat_map(|s| s.iter()).filter(|v| v.is_finite()) {
        lo = lo.min(*v);
        hi = hi.max(*v);
    }
    (lo.is_finite() && hi.is_finite()).then_some((lo, hi))
}

/// Auto maximum: the largest value rounded up to two significant figures.
pub fn auto_max(series: &[&[f64]]) -> Option<f64> {
    data_extent(series).map(|(_, hi)| signif_up(hi))
}

/// Auto minimum: the smallest value rounded down to two significant figures,
/// floored at zero unless negative minimums are allowed.
pub fn auto_min(series: &[&[f64]], allow_negative: bool) -> Option<f64> {
    data_extent(series).map(|(lo, _)| {
        let min = signif_down(lo);
        if allow_negative { min } else { min.max(0.0) }
    })
}

/// Resolve an axis against the data it has to show.
pub fn resolve_axis(config: &AxisConfig, series: &[&[f64]], name: &str) -> Result<ResolvedAxis, AppError> {
    let (data_min, data_max) = data_extent(series)
        .ok_or_else(|| AppError::invalid_input(format!("No finite data for the {name}-axis")))?;
    let mut warnings = Vec::new();

    let mut min = match config.min {
        Bound::Value(v) => {
            if !v.is_finite() {
                return Err(AppError::invalid_input(format!("{name}_min must be a finite number")));
            }
            if !config.allow_negative && v < 0.0 {
                return Err(AppError::invalid_input(format!(
                    "{name}_min has to be >= 0 (found: {v})"
                )));
            }
            if v > data_min {
                warnings.push(format!(
                    "{name}_min = {v} is above the smallest data value {data_min}; some points will be cut off"
                ));
            }
            v
        }
        Bound::Auto => auto_min(series, config.allow_negative).unwrap_or(data_min),
    };

    let mut max = match config.max {
        Bound::Value(v) => {
            if !v.is_finite() {
                return Err(AppError::invalid_input(format!("{name}_max must be a finite number")));
            }
            if v < data_max {
                warnings.push(format!(
                    "{name}_max = {v} is below the largest data value {data_max}; some points will be cut off"
                ));
            }
            v
        }
        Bound::Auto => auto_max(series).unwrap_or(data_max),
    };

    // A single distinct value leaves no span; widen whichever side is automatic.
    if max <= min {
        match (config.min, config.max) {
            (_, Bound::Auto) => max = min + 1.0,
            (Bound::Auto, Bound::Value(_)) => {
                min = max - 1.0;
                if !config.allow_negative && min < 0.0 {
                    min = 0.0;
                }
            }
            (Bound::Value(_), Bound::Value(_)) => {}
        }
    }
    if max <= min {
        return Err(AppError::invalid_input(format!(
            "{name}-axis range is empty: min {min} >= max {max}"
        )));
    }

    let ticks = match config.ticks {
        TickPolicy::Count(n) => n,
        TickPolicy::Auto => best_divider(max - min, DEFAULT_DIVIDERS)
            .ok_or_else(|| AppError::invalid_input(format!("Cannot choose ticks for the {name}-axis")))?,
    };

    Ok(ResolvedAxis {
        range: AxisRange { min, max, ticks },
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn auto(allow_negative: bool) -> AxisConfig {
        AxisConfig {
            min: Bound::Auto,
            max: Bound::Auto,
            ticks: TickPolicy::Auto,
            allow_negative,
        }
    }

    #[test]
    fn auto_bounds_cover_all_series() {
        let a = [1.23, 4.0];
        let b = [0.5, 98.7];
        assert_eq!(auto_max(&[&a, &b]), Some(99.0));
        assert_eq!(auto_min(&[&a, &b], true), Some(0.5));

        let resolved = resolve_axis(&auto(false), &[&a, &b], "x").unwrap();
        assert_eq!(resolved.range.min, 0.5);
        assert_eq!(resolved.range.max, 99.0);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn auto_min_is_floored_at_zero_unless_negative_allowed() {
        let data = [-3.21, 7.0];
        assert_eq!(auto_min(&[&data], false), Some(0.0));
        assert_eq!(auto_min(&[&data], true), Some(-3.3));
    }

    #[test]
    fn explicit_negative_min_is_rejected_when_not_allowed() {
        let mut config = auto(false);
        config.min = Bound::Value(-1.0);
        let err = resolve_axis(&config, &[&[1.0, 2.0]], "x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        config.allow_negative = true;
        assert!(resolve_axis(&config, &[&[1.0, 2.0]], "x").is_ok());
    }

    #[test]
    fn narrow_explicit_bounds_only_warn() {
        let mut config = auto(false);
        config.min = Bound::Value(0.0);
        config.max = Bound::Value(5.0);
        config.ticks = TickPolicy::Count(6);
        let resolved = resolve_axis(&config, &[&[1.0, 8.0]], "x").unwrap();
        assert_eq!(resolved.range, AxisRange { min: 0.0, max: 5.0, ticks: 6 });
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("x_max"));
    }

    #[test]
    fn auto_ticks_use_divider_heuristic() {
        let mut config = auto(false);
        config.min = Bound::Value(0.0);
        config.max = Bound::Value(100.8);
        let resolved = resolve_axis(&config, &[&[10.0, 100.0]], "x").unwrap();
        assert_eq!(resolved.range.ticks, 10);
    }

    #[test]
    fn zero_ticks_are_kept() {
        let mut config = auto(false);
        config.ticks = TickPolicy::Count(0);
        let resolved = resolve_axis(&config, &[&[1.0, 2.0]], "x").unwrap();
        assert_eq!(resolved.range.ticks, 0);
    }

    #[test]
    fn single_value_gets_a_unit_span() {
        let resolved = resolve_axis(&auto(false), &[&[4.0, 4.0]], "y").unwrap();
        assert_eq!(resolved.range.min, 4.0);
        assert_eq!(resolved.range.max, 5.0);
    }

    #[test]
    fn no_data_is_invalid_input() {
        let err = resolve_axis(&auto(false), &[&[f64::NAN]], "y").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
