//! Conversion ratio bounds.
//!
//! A ratio is `output_rate / input_rate`.  Every ratio entering the engine,
//! whether through [`Converter::set_ratio`](crate::Converter::set_ratio), a
//! [`ConversionRequest`](crate::ConversionRequest) or a streaming read, is
//! checked with [`is_valid_ratio`].

/// Largest supported up-sampling factor.  The smallest supported ratio is
/// its reciprocal.
pub const MAX_RATIO: f64 = 256.0;

/// Two ratios closer than this select the constant-ratio kernel path.
pub const RATIO_TOLERANCE: f64 = 1e-15;

/// Returns `true` when `ratio` lies in `[1 / MAX_RATIO, MAX_RATIO]`.
///
/// NaN and infinities are rejected.
///
/// ```
/// use srconv::{is_valid_ratio, MAX_RATIO};
///
/// assert!(is_valid_ratio(1.0));
/// assert!(is_valid_ratio(MAX_RATIO));
/// assert!(is_valid_ratio(1.0 / MAX_RATIO));
/// assert!(!is_valid_ratio(MAX_RATIO * 1.0001));
/// assert!(!is_valid_ratio(f64::NAN));
/// ```
pub fn is_valid_ratio(ratio: f64) -> bool {
    (1.0 / MAX_RATIO..=MAX_RATIO).contains(&ratio)
}

/// `true` when two ratios are equal for the purpose of path selection.
pub(crate) fn same_ratio(a: f64, b: f64) -> bool {
    (a - b).abs() < RATIO_TOLERANCE
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
