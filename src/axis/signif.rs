//! Rounding to two significant figures.

/// Significant figures kept by the axis rounding.
pub const SIGNIFICANT_FIGURES: i32 = 2;

/// Relative distance under which a scaled quotient counts as an integer, so
/// values that already have two significant figures survive the binary
/// representation error of the scaling step.
const SNAP: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
}

/// Round `x` up (towards +∞) to two significant figures.
///
/// Zero and non-finite values are returned unchanged.
pub fn signif_up(x: f64) -> f64 {
    round_signif(x, Direction::Up)
}

/// Round `x` down (towards −∞) to two significant figures.
///
/// Zero and non-finite values are returned unchanged.
pub fn signif_down(x: f64) -> f64 {
    round_signif(x, Direction::Down)
}

fn round_signif(x: f64, direction: Direction) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }

    let exponent = decimal_exponent(x.abs()) - (SIGNIFICANT_FIGURES - 1);
    let q = scale_down(x, exponent);

    let nearest = q.round();
    if (q - nearest).abs() <= SNAP * nearest.abs() {
        let candidate = scale_up(nearest, exponent);
        let keeps_direction = match direction {
            Direction::Up => candidate >= x,
            Direction::Down => candidate <= x,
        };
        if keeps_direction {
            return candidate;
        }
    }

    let rounded = match direction {
        Direction::Up => q.ceil(),
        Direction::Down => q.floor(),
    };
    scale_up(rounded, exponent)
}

/// `floor(log10(v))` for positive finite `v`, corrected for log rounding at
/// exact powers of ten.
fn decimal_exponent(v: f64) -> i32 {
    let mut e = v.log10().floor() as i32;
    if 10f64.powi(e) > v {
        e -= 1;
    } else if 10f64.powi(e + 1) <= v {
        e += 1;
    }
    e
}

// Multiplying or dividing by an exact power of ten keeps results like 0.13
// exact, where multiplying by 10^-2 would not.
fn scale_down(x: f64, exponent: i32) -> f64 {
    if exponent >= 0 {
        x / 10f64.powi(exponent)
    } else {
        x * 10f64.powi(-exponent)
    }
}

fn scale_up(q: f64, exponent: i32) -> f64 {
    if exponent >= 0 {
        q * 10f64.powi(exponent)
    } else {
        q / 10f64.powi(-exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn rounds_to_two_significant_figures() {
        assert_eq!(signif_up(123.0), 130.0);
        assert_eq!(signif_down(123.0), 120.0);
        assert_eq!(signif_up(0.01234), 0.013);
        assert_eq!(signif_down(0.01234), 0.012);
        assert_eq!(signif_up(9.91), 10.0);
        assert_eq!(signif_down(-123.0), -130.0);
        assert_eq!(signif_up(-123.0), -120.0);
    }

    #[test]
    fn two_figure_values_are_fixed_points() {
        for v in [0.13, 1.2, 12.0, 100.0, 4500.0, 0.0007, -3.4, 1e-12, 2.5e20] {
            assert_eq!(signif_up(v), v, "signif_up({v})");
            assert_eq!(signif_down(v), v, "signif_down({v})");
        }
    }

    #[test]
    fn zero_and_non_finite_pass_through() {
        assert_eq!(signif_up(0.0), 0.0);
        assert_eq!(signif_down(0.0), 0.0);
        assert!(signif_up(f64::NAN).is_nan());
        assert_eq!(signif_up(f64::INFINITY), f64::INFINITY);
        assert_eq!(signif_down(f64::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn bounds_and_idempotence_hold_for_random_values() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..5_000 {
            let mantissa: f64 = rng.gen_range(-10.0..10.0);
            let exponent: i32 = rng.gen_range(-8..9);
            let x = mantissa * 10f64.powi(exponent);
            if x == 0.0 {
                continue;
            }
            let up = signif_up(x);
            let down = signif_down(x);
            assert!(up >= x, "signif_up({x}) = {up}");
            assert!(down <= x, "signif_down({x}) = {down}");
            assert_eq!(signif_up(up), up, "signif_up not idempotent at {x}");
            assert_eq!(signif_down(down), down, "signif_down not idempotent at {x}");
        }
    }
}
