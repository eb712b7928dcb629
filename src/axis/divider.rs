//! Tick-count selection.
//!
//! For a span and a set of candidate tick counts ("dividers"), pick the count
//! whose per-tick increment `span / (divider - 1)` reads most naturally:
//!
//! 1. fewer digits wins outright
//! 2. then the last digit, ranked `0 > 5 > 2 > 1 > 4 > 6 > 8 > 3 > 7 > 9`
//! 3. then the larger divider (denser ticks)

use std::cmp::Reverse;
use std::ops::RangeInclusive;

/// Candidate tick counts used when none are configured.
pub const DEFAULT_DIVIDERS: RangeInclusive<usize> = 5..=12;

/// Rank of each trailing digit (index = digit, lower is better).
const TRAILING_DIGIT_RANK: [u8; 10] = [0, 3, 2, 7, 4, 1, 5, 8, 6, 9];

/// Significant digits kept before reading off the decimal representation.
const REPR_DIGITS: usize = 10;

/// Pick the divider with the nicest increment.
///
/// Dividers below 2 are ignored. Returns `None` when no usable candidate
/// remains or `span` is not finite.
pub fn best_divider(span: f64, candidates: impl IntoIterator<Item = usize>) -> Option<usize> {
    if !span.is_finite() {
        return None;
    }
    let span = span.abs();

    candidates
        .into_iter()
        .filter(|&d| d >= 2)
        .min_by_key(|&d| {
            let digits = tick_digits(span / (d - 1) as f64);
            (digits.len(), trailing_rank(&digits), Reverse(d))
        })
}

/// Digits of the decimal representation of `value`, without sign or separator.
///
/// The value is first rounded to ten significant digits so binary noise
/// (`11.200000000000001`) does not count as extra digits. Whole numbers keep
/// one decimal place, so an increment of 2 reads `2.0` and ends in 0.
pub fn tick_digits(value: f64) -> String {
    format!("{:?}", tidy(value))
        .chars()
        .filter(char::is_ascii_digit)
        .collect()
}

/// `value` rounded to ten significant digits, for display.
pub fn tidy(value: f64) -> f64 {
    format!("{:.*e}", REPR_DIGITS - 1, value)
        .parse::<f64>()
        .unwrap_or(value)
}

fn trailing_rank(digits: &str) -> u8 {
    digits
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map_or(u8::MAX, |d| TRAILING_DIGIT_RANK[d as usize])
}
