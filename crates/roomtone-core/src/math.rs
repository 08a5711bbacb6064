//! Level and time conversions used throughout the reverberator.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - decibels and linear gain
//! - [`millibels_to_linear`] - millibels (1/100 dB) to linear gain
//!
//! # Utilities
//!
//! - [`ms_to_samples`] - time conversion
//! - [`flush_denormal`] - keep recursive state out of the subnormal range

use libm::{expf, logf};

/// Convert decibels to linear gain.
///
/// `10^(db/20)`: 0 dB → 1.0, −6 dB → ~0.5, +6 dB → ~2.0.
///
/// # Example
/// ```rust
/// use roomtone_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-60.0) - 0.001).abs() < 1e-6);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    // 10^(dB/20) = e^(dB * ln(10)/20)
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels.
///
/// The caller is expected to pass `linear > 0`; anything at or below `1e-10`
/// is floored there, so the result never falls below −200 dB.
///
/// # Example
/// ```rust
/// use roomtone_core::linear_to_db;
///
/// assert!(linear_to_db(1.0).abs() < 0.001);
/// assert!((linear_to_db(0.5) - (-6.02)).abs() < 0.01);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    // 20 * log10(linear) = 20 * ln(linear) / ln(10)
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Convert millibels to linear gain.
///
/// Room and reverb levels are expressed in millibels (−10000 mB is silence
/// for practical purposes, −100 mB is −1 dB).
///
/// # Example
/// ```rust
/// use roomtone_core::millibels_to_linear;
///
/// assert!((millibels_to_linear(-600.0) - 0.501).abs() < 0.001);
/// ```
#[inline]
pub fn millibels_to_linear(mb: f32) -> f32 {
    db_to_linear(mb / 100.0)
}

/// Convert milliseconds to a (fractional) sample count.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Flush values in the subnormal range to zero.
///
/// Recursive filters decaying toward silence otherwise spend their tail in
/// subnormal arithmetic.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_conversions() {
        assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_linear(20.0) - 10.0).abs() < 1e-4);
        assert!((db_to_linear(-20.0) - 0.1).abs() < 1e-6);

        assert!(linear_to_db(1.0).abs() < 1e-6);
        assert!((linear_to_db(10.0) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_linear_to_db_floor() {
        assert!((linear_to_db(0.0) - (-200.0)).abs() < 0.01);
        assert!((linear_to_db(-1.0) - (-200.0)).abs() < 0.01);
    }

    #[test]
    fn test_millibels() {
        assert!((millibels_to_linear(0.0) - 1.0).abs() < 1e-6);
        assert!((millibels_to_linear(-2000.0) - 0.1).abs() < 1e-6);
        // -10000 mB is -100 dB
        assert!(millibels_to_linear(-10000.0) < 1.1e-5);
    }

    #[test]
    fn test_ms_to_samples() {
        assert_eq!(ms_to_samples(1000.0, 48000.0), 48000.0);
        assert_eq!(ms_to_samples(20.0, 48000.0), 960.0);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1.0), 1.0);
        assert_eq!(flush_denormal(-0.5), -0.5);
        assert_eq!(flush_denormal(1e-10), 1e-10);

        assert_eq!(flush_denormal(1e-21), 0.0);
        assert_eq!(flush_denormal(-1e-38), 0.0);
    }
}
