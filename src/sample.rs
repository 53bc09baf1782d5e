//! Conversions between integer PCM and the `f32` samples the converters use.
//!
//! Integer to float divides by `2^15` (`i16`) or `2^31` (`i32`).  Float to
//! integer multiplies by the same factor, rounds to nearest (ties to even)
//! and clips to the integer range, so `1.0` maps to the largest positive
//! value.  All four functions convert `min(input.len(), output.len())`
//! samples.

const SHORT_SCALE: f32 = 32_768.0;
const INT_SCALE: f64 = 2_147_483_648.0;

/// `i16` samples to `f32` in `[-1.0, 1.0)`.
///
/// ```
/// use srconv::sample::short_to_float;
///
/// let mut out = [0.0_f32; 3];
/// short_to_float(&[i16::MIN, 0, 16_384], &mut out);
/// assert_eq!(out, [-1.0, 0.0, 0.5]);
/// ```
pub fn short_to_float(input: &[i16], output: &mut [f32]) {
    for (dst, &src) in output.iter_mut().zip(input) {
        *dst = f32::from(src) / SHORT_SCALE;
    }
}

/// `f32` samples to `i16`, clipping out-of-range values.
///
/// ```
/// use srconv::sample::float_to_short;
///
/// let mut out = [0_i16; 4];
/// float_to_short(&[1.0, -1.0, 0.5, 3.0], &mut out);
/// assert_eq!(out, [i16::MAX, i16::MIN, 16_384, i16::MAX]);
/// ```
pub fn float_to_short(input: &[f32], output: &mut [i16]) {
    for (dst, &src) in output.iter_mut().zip(input) {
        let scaled = src * SHORT_SCALE;
        *dst = if scaled >= f32::from(i16::MAX) {
            i16::MAX
        } else if scaled <= f32::from(i16::MIN) {
            i16::MIN
        } else {
            scaled.round_ties_even() as i16
        };
    }
}

/// `i32` samples to `f32` in `[-1.0, 1.0)`.
pub fn int_to_float(input: &[i32], output: &mut [f32]) {
    for (dst, &src) in output.iter_mut().zip(input) {
        *dst = (f64::from(src) / INT_SCALE) as f32;
    }
}

/// `f32` samples to `i32`, clipping out-of-range values.
pub fn float_to_int(input: &[f32], output: &mut [i32]) {
    for (dst, &src) in output.iter_mut().zip(input) {
        let scaled = f64::from(src) * INT_SCALE;
        *dst = if scaled >= f64::from(i32::MAX) {
            i32::MAX
        } else if scaled <= f64::from(i32::MIN) {
            i32::MIN
        } else {
            scaled.round_ties_even() as i32
        };
    }
}
