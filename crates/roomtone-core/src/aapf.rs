//! Absorbent all-pass filter.
//!
//! A Schroeder all-pass whose recirculating path is damped: the delayed
//! sample passes through a [`DampingLowpass`] and an absorbent gain before it
//! is fed back. Six of these in series form each channel of the late
//! reverberation chain; one undamped instance diffuses the early taps.
//!
//! ```text
//! delayed = buffer[write - delay]
//! damped  = lowpass(delayed) · absorbent_gain
//! v       = input - damped · g
//! output  = v · g + damped
//! buffer[write] = v
//! ```
//!
//! With `absorbent_gain = 1` and a zero low-pass coefficient this is a
//! lossless all-pass. Stability (`|g| < 1`, `0 <= absorbent_gain <= 1`) is
//! the caller's responsibility.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::lowpass::{DampingLowpass, FilterMemory};
use crate::{flush_denormal, ms_to_samples};

/// Absorbent all-pass stage.
///
/// # Invariants
///
/// - `1 <= delay_samples < max_delay_samples`
/// - the read position is `write - delay` wrapped into `[0, max_delay_samples)`
#[derive(Debug, Clone)]
pub struct AbsorbentAllpass {
    buffer: Vec<f32>,
    write_pos: usize,
    delay_samples: usize,
    max_delay_ms: f32,
    sample_rate: f32,
    absorbent_gain: f32,
    feedback_gain: f32,
    lowpass: DampingLowpass,
}

impl AbsorbentAllpass {
    /// Create a stage able to hold `max_delay_ms` at `sample_rate`.
    ///
    /// Starts as a one-sample lossless all-pass with zero feedback.
    pub fn new(sample_rate: f32, max_delay_ms: f32) -> Self {
        let mut stage = Self {
            buffer: Vec::new(),
            write_pos: 0,
            delay_samples: 1,
            max_delay_ms,
            sample_rate,
            absorbent_gain: 1.0,
            feedback_gain: 0.0,
            lowpass: DampingLowpass::new(sample_rate),
        };
        stage.reset(sample_rate);
        stage
    }

    /// Reallocate for a new sample rate, keeping the maximum delay time.
    ///
    /// Clears the buffer and filter memory. Not real-time safe.
    pub fn reset(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.lowpass.set_sample_rate(sample_rate);
        let max_samples = libm::ceilf(ms_to_samples(self.max_delay_ms, sample_rate)) as usize;
        self.change_max_delay(max_samples);
    }

    /// Resize the circular buffer to `max_delay_samples` (at least 2).
    ///
    /// Clears the buffer and re-clamps the current delay. Not real-time safe.
    pub fn change_max_delay(&mut self, max_delay_samples: usize) {
        let len = max_delay_samples.max(2);

        #[cfg(feature = "tracing")]
        tracing::trace!(len, "absorbent allpass resized");

        self.buffer = vec![0.0; len];
        self.write_pos = 0;
        self.lowpass.reset();
        self.set_delay_samples(self.delay_samples);
    }

    /// Set the delay length, clamped into `[1, max_delay_samples - 1]`.
    #[inline]
    pub fn set_delay_samples(&mut self, delay_samples: usize) {
        self.delay_samples = delay_samples.clamp(1, self.buffer.len() - 1);
    }

    /// Set the delay length in milliseconds, rounded to whole samples.
    pub fn set_delay_ms(&mut self, delay_ms: f32) {
        let samples = libm::roundf(ms_to_samples(delay_ms.max(0.0), self.sample_rate));
        self.set_delay_samples(samples as usize);
    }

    /// Set the absorbent gain applied to the recirculating sample.
    #[inline]
    pub fn set_absorbent_gain(&mut self, gain: f32) {
        self.absorbent_gain = gain;
    }

    /// Set the all-pass feedback gain `g`.
    #[inline]
    pub fn set_feedback_gain(&mut self, gain: f32) {
        self.feedback_gain = gain;
    }

    /// Set the damping low-pass coefficient.
    #[inline]
    pub fn set_lowpass_coefficient(&mut self, coefficient: f32) {
        self.lowpass.set_coefficient(coefficient);
    }

    /// Select how the damping low-pass treats its memory.
    pub fn set_filter_memory(&mut self, memory: FilterMemory) {
        self.lowpass.set_memory(memory);
    }

    /// Process one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let len = self.buffer.len();
        let read_pos = (self.write_pos + len - self.delay_samples) % len;

        let delayed = self.buffer[read_pos];
        let damped = self.lowpass.process(delayed) * self.absorbent_gain;

        let v = input - damped * self.feedback_gain;
        let output = v * self.feedback_gain + damped;

        self.buffer[self.write_pos] = flush_denormal(v);
        self.write_pos = (self.write_pos + 1) % len;

        output
    }

    /// Zero the buffer and filter memory without reallocating.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
        self.lowpass.reset();
    }

    /// Current delay in samples.
    pub fn delay_samples(&self) -> usize {
        self.delay_samples
    }

    /// Buffer length in samples.
    pub fn max_delay_samples(&self) -> usize {
        self.buffer.len()
    }

    /// Absorbent gain.
    pub fn absorbent_gain(&self) -> f32 {
        self.absorbent_gain
    }

    /// All-pass feedback gain.
    pub fn feedback_gain(&self) -> f32 {
        self.feedback_gain
    }

    /// Damping low-pass coefficient.
    pub fn lowpass_coefficient(&self) -> f32 {
        self.lowpass.coefficient()
    }
}
