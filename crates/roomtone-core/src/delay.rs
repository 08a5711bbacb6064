//! Circular delay line with time-addressed reads.
//!
//! The reverberator uses one [`DelayLine`] per channel for the tapped
//! early-reflection line, another for the plain delay in the middle of each
//! late chain, and one inside every [`AbsorbentAllpass`](crate::AbsorbentAllpass).
//!
//! # Addressing
//!
//! Reads are relative to the most recently written sample: a delay of `0`
//! returns the sample just written, a delay of `d` returns the sample written
//! `d` calls to [`write`](DelayLine::write) earlier. Fractional delays are
//! linearly interpolated toward the older neighbour when interpolation is on,
//! and truncated otherwise.
//!
//! # Memory
//!
//! [`configure`](DelayLine::configure) (re)allocates and is not real-time
//! safe. Reads and writes never allocate.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

use crate::ms_to_samples;

/// Heap-allocated circular delay line.
///
/// # Example
///
/// ```rust
/// use roomtone_core::DelayLine;
///
/// let mut line = DelayLine::new();
/// line.configure(100.0, 48000.0);
///
/// line.write(1.0);
/// for _ in 0..479 {
///     line.write(0.0);
/// }
/// // The impulse was written 479 samples (~9.98 ms) ago.
/// assert_eq!(line.read_samples(479.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    write_pos: usize,
    sample_rate: f32,
    max_delay_ms: f32,
    interpolate: bool,
}

impl DelayLine {
    /// Create an unconfigured line holding a single sample.
    pub fn new() -> Self {
        Self {
            buffer: vec![0.0; 1],
            write_pos: 0,
            sample_rate: 0.0,
            max_delay_ms: 0.0,
            interpolate: true,
        }
    }

    /// Create and configure in one step.
    pub fn with_max_delay(max_delay_ms: f32, sample_rate: f32) -> Self {
        let mut line = Self::new();
        line.configure(max_delay_ms, sample_rate);
        line
    }

    /// (Re)allocate for `max_delay_ms` at `sample_rate` and clear the contents.
    ///
    /// Not real-time safe.
    pub fn configure(&mut self, max_delay_ms: f32, sample_rate: f32) {
        let max_delay_ms = max_delay_ms.max(0.0);
        let max_samples = libm::ceilf(ms_to_samples(max_delay_ms, sample_rate)) as usize;
        let len = max_samples + 1;

        #[cfg(feature = "tracing")]
        tracing::trace!(max_delay_ms, sample_rate, len, "delay line configured");

        self.buffer = vec![0.0; len];
        self.write_pos = 0;
        self.sample_rate = sample_rate;
        self.max_delay_ms = max_delay_ms;
    }

    /// Enable or disable linear interpolation of fractional reads.
    pub fn set_interpolate(&mut self, interpolate: bool) {
        self.interpolate = interpolate;
    }

    /// Store `sample` and advance the write position.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Read `delay_samples` behind the most recent write.
    ///
    /// Negative delays read the newest sample; delays beyond capacity clamp
    /// to the oldest retained sample.
    #[inline]
    pub fn read_samples(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (len - 1) as f32);

        let delay_int = delay as usize;
        let frac = delay - delay_int as f32;

        // Sample `delay_int` behind the last written one
        let read_pos = (self.write_pos + len - delay_int - 1) % len;

        if !self.interpolate || frac == 0.0 {
            return self.buffer[read_pos];
        }

        let older_pos = (read_pos + len - 1) % len;
        let a = self.buffer[read_pos];
        let b = self.buffer[older_pos];
        a + (b - a) * frac
    }

    /// Read `delay_ms` milliseconds behind the most recent write.
    ///
    /// Requests beyond the configured maximum clamp to it.
    #[inline]
    pub fn read_at_ms(&self, delay_ms: f32) -> f32 {
        let delay_ms = delay_ms.clamp(0.0, self.max_delay_ms);
        self.read_samples(ms_to_samples(delay_ms, self.sample_rate))
    }

    /// Zero the contents without reallocating.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Buffer length in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Configured maximum delay in milliseconds.
    pub fn max_delay_ms(&self) -> f32 {
        self.max_delay_ms
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}
