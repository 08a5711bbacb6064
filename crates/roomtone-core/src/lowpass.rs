//! Decay-matched one-pole low-pass.
//!
//! A recirculating delay of `delay_ms` that must lose 60 dB over
//! `hf_ratio · decay_ms` at the reference frequency needs a per-pass gain of
//!
//! ```text
//! G = 10^((-60 · delay_ms / (hf_ratio · decay_ms)) / 20)
//! ```
//!
//! at that frequency. [`solve_damping_coefficient`] finds the feedback
//! coefficient `b` of the one-pole
//!
//! ```text
//! y[n] = (1 - b) · x[n] + b · y[n-1]
//! ```
//!
//! whose power gain `|H|²` at the reference frequency equals `G`:
//!
//! ```text
//! ω = cos(2π · f_ref / fs)
//! A = 8G - 4G² - 8Gω + 4G²ω²
//! b = (2Gω - 2 + √A) / (2G - 2)
//! ```
//!
//! and clamps it to `[0, 1]`.
//!
//! # Filter Memory
//!
//! [`FilterMemory::Persistent`] runs a genuine one-pole. With
//! [`FilterMemory::ResetPerSample`] the memory is cleared on every call, so
//! the filter reduces to a broadband gain of `1 - b`. Both are offered; the
//! reverberator selects one through its configuration.

use crate::flush_denormal;

/// How a [`DampingLowpass`] treats its one-sample memory between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMemory {
    /// `y[n-1]` carries over between calls (a real one-pole).
    #[default]
    Persistent,
    /// Memory is cleared before every call: `y = (1 - b) · x`.
    ResetPerSample,
}

/// Solve the one-pole coefficient realizing a target HF decay.
///
/// # Arguments
///
/// * `hf_ratio` - Ratio of HF decay time to the broadband decay time
/// * `corner_hz` - Reference frequency the ratio applies at
/// * `delay_ms` - Length of the recirculating path the filter sits in
/// * `decay_ms` - Broadband RT60 in milliseconds
/// * `sample_rate` - Sample rate in Hz
///
/// # Degenerate inputs
///
/// - `hf_ratio · decay_ms <= 0` is treated as instant absorption: `b = 1`.
/// - `G == 1` (zero-length path) needs no filtering: `b = 0`.
/// - A negative discriminant is clamped to zero before the square root.
///
/// # Example
///
/// ```rust
/// use roomtone_core::solve_damping_coefficient;
///
/// let b = solve_damping_coefficient(0.83, 5000.0, 127.0, 1490.0, 48000.0);
/// assert!(b > 0.0 && b < 1.0);
/// ```
pub fn solve_damping_coefficient(
    hf_ratio: f32,
    corner_hz: f32,
    delay_ms: f32,
    decay_ms: f32,
    sample_rate: f32,
) -> f32 {
    let denominator = f64::from(hf_ratio) * f64::from(decay_ms);
    if denominator.is_nan() || denominator <= 0.0 || sample_rate.is_nan() || sample_rate <= 0.0 {
        return 1.0;
    }

    let db = -60.0 * f64::from(delay_ms.max(0.0)) / denominator;
    let g = libm::pow(10.0, db / 20.0);
    if (g - 1.0).abs() < 1e-12 {
        return 0.0;
    }

    let omega = libm::cos(core::f64::consts::TAU * f64::from(corner_hz) / f64::from(sample_rate));
    let discriminant = 8.0 * g - 4.0 * g * g - 8.0 * g * omega + 4.0 * g * g * omega * omega;
    let b = (2.0 * g * omega - 2.0 + libm::sqrt(discriminant.max(0.0))) / (2.0 * g - 2.0);

    if b.is_nan() {
        return 1.0;
    }
    b.clamp(0.0, 1.0) as f32
}

/// One-pole low-pass driven by [`solve_damping_coefficient`].
///
/// # Example
///
/// ```rust
/// use roomtone_core::{DampingLowpass, FilterMemory};
///
/// let mut lp = DampingLowpass::new(48000.0);
/// lp.calculate_coefficient(0.83, 5000.0, 269.0, 1490.0);
///
/// lp.set_memory(FilterMemory::ResetPerSample);
/// let y = lp.process(1.0);
/// assert!((y - (1.0 - lp.coefficient())).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct DampingLowpass {
    coefficient: f32,
    state: f32,
    sample_rate: f32,
    memory: FilterMemory,
}

impl DampingLowpass {
    /// Create a pass-through filter (`b = 0`) at `sample_rate`.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            coefficient: 0.0,
            state: 0.0,
            sample_rate,
            memory: FilterMemory::default(),
        }
    }

    /// Solve and store the coefficient for the given decay target.
    ///
    /// Returns the new coefficient.
    pub fn calculate_coefficient(
        &mut self,
        hf_ratio: f32,
        corner_hz: f32,
        delay_ms: f32,
        decay_ms: f32,
    ) -> f32 {
        self.coefficient =
            solve_damping_coefficient(hf_ratio, corner_hz, delay_ms, decay_ms, self.sample_rate);
        self.coefficient
    }

    /// Set the coefficient directly, clamped to `[0, 1]`.
    pub fn set_coefficient(&mut self, coefficient: f32) {
        self.coefficient = coefficient.clamp(0.0, 1.0);
    }

    /// Current feedback coefficient `b`.
    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }

    /// Select the memory behaviour.
    pub fn set_memory(&mut self, memory: FilterMemory) {
        self.memory = memory;
        self.state = 0.0;
    }

    /// Current memory behaviour.
    pub fn memory(&self) -> FilterMemory {
        self.memory
    }

    /// Update the sample rate used by [`calculate_coefficient`](Self::calculate_coefficient).
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let previous = match self.memory {
            FilterMemory::Persistent => self.state,
            FilterMemory::ResetPerSample => 0.0,
        };
        self.state = flush_denormal((1.0 - self.coefficient) * input + self.coefficient * previous);
        self.state
    }

    /// Clear the filter memory.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    #[test]
    fn zero_delay_needs_no_filtering() {
        assert_eq!(solve_damping_coefficient(0.83, 5000.0, 0.0, 1490.0, SR), 0.0);
    }

    #[test]
    fn degenerate_decay_absorbs() {
        assert_eq!(solve_damping_coefficient(0.0, 5000.0, 100.0, 1490.0, SR), 1.0);
        assert_eq!(solve_damping_coefficient(0.83, 5000.0, 100.0, 0.0, SR), 1.0);
        assert_eq!(solve_damping_coefficient(-1.0, 5000.0, 100.0, 1490.0, SR), 1.0);
    }

    #[test]
    fn power_gain_matches_target_at_corner() {
        let (hf_ratio, corner, delay_ms, decay_ms) = (0.83, 5000.0f32, 127.0, 1490.0);
        let b = f64::from(solve_damping_coefficient(hf_ratio, corner, delay_ms, decay_ms, SR));

        // |H(e^jw)|² = (1 - b)² / |1 - b e^-jw|²
        let w = core::f64::consts::TAU * f64::from(corner) / f64::from(SR);
        let re = 1.0 - b * libm::cos(w);
        let im = b * libm::sin(w);
        let power = (1.0 - b) * (1.0 - b) / (re * re + im * im);

        let target = libm::pow(
            10.0,
            -3.0 * f64::from(delay_ms) / (f64::from(hf_ratio) * f64::from(decay_ms)),
        );
        assert!(
            (power - target).abs() < 1e-3,
            "power {power} vs target {target}"
        );
    }

    #[test]
    fn longer_paths_need_more_damping() {
        let short = solve_damping_coefficient(0.83, 5000.0, 50.0, 1490.0, SR);
        let long = solve_damping_coefficient(0.83, 5000.0, 500.0, 1490.0, SR);
        assert!(long > short);
    }

    #[test]
    fn reset_per_sample_is_broadband_gain() {
        let mut lp = DampingLowpass::new(SR);
        lp.set_coefficient(0.25);
        lp.set_memory(FilterMemory::ResetPerSample);
        for _ in 0..10 {
            assert!((lp.process(1.0) - 0.75).abs() < 1e-6);
        }
    }

    #[test]
    fn persistent_passes_dc() {
        let mut lp = DampingLowpass::new(SR);
        lp.set_coefficient(0.9);
        let mut y = 0.0;
        for _ in 0..2000 {
            y = lp.process(1.0);
        }
        assert!((y - 1.0).abs() < 1e-3, "got {y}");
    }
}
