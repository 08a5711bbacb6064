//! Early-reflection section.
//!
//! Per channel: room-HF low-pass, then a tapped delay line. Five weighted
//! taps sum into an all-pass diffuser whose output is the early
//! contribution. A sixth tap, at reflections delay plus reverb delay, feeds
//! the late section.
//!
//! ```text
//! x ─► LPF ─► delay line ─┬─ tap 1..5 ─► Σ w_k ─► diffuser ─► early
//!                         └─ late tap ─────────────────────► late in
//! ```

use roomtone_core::{AbsorbentAllpass, DampingLowpass, DelayLine, FilterMemory};

use crate::cook::{CookedCoefficients, channel_tap_positions, late_tap_position};
use crate::tables::{EARLY_DIFFUSER_DELAYS_MS, EARLY_TAP_GAINS, MAX_ALLPASS_GAIN};

/// Output of one channel of the early section for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarlyOutput {
    /// Diffused early reflections.
    pub early: f32,
    /// Signal entering the late section.
    pub late_tap: f32,
}

/// Two-channel early-reflection section.
#[derive(Debug, Clone)]
pub struct EarlySection {
    input_filters: [DampingLowpass; 2],
    lines: [DelayLine; 2],
    diffusers: [AbsorbentAllpass; 2],
}

impl EarlySection {
    /// Allocate for `sample_rate`. Not real-time safe.
    pub fn new(
        sample_rate: f32,
        max_delay_ms: f32,
        allpass_max_delay_ms: f32,
        memory: FilterMemory,
        interpolate: bool,
    ) -> Self {
        let input_filters = core::array::from_fn(|_| {
            let mut lp = DampingLowpass::new(sample_rate);
            lp.set_memory(memory);
            lp
        });

        let lines = core::array::from_fn(|_| {
            let mut line = DelayLine::with_max_delay(max_delay_ms, sample_rate);
            line.set_interpolate(interpolate);
            line
        });

        let diffusers = core::array::from_fn(|ch| {
            let mut ap = AbsorbentAllpass::new(sample_rate, allpass_max_delay_ms);
            ap.set_delay_ms(EARLY_DIFFUSER_DELAYS_MS[ch]);
            ap.set_absorbent_gain(1.0);
            ap.set_lowpass_coefficient(0.0);
            ap.set_feedback_gain(MAX_ALLPASS_GAIN);
            ap.set_filter_memory(memory);
            ap
        });

        Self {
            input_filters,
            lines,
            diffusers,
        }
    }

    /// Copy the section's coefficients from a cooked set.
    pub fn apply(&mut self, cooked: &CookedCoefficients) {
        for lp in &mut self.input_filters {
            lp.set_coefficient(cooked.input_lowpass);
        }
    }

    /// Process one sample of channel `ch`.
    ///
    /// `reflections_ms` and `reverb_ms` are the (smoothed) delay controls.
    #[inline]
    pub fn process(
        &mut self,
        ch: usize,
        input: f32,
        reflections_ms: f32,
        reverb_ms: f32,
    ) -> EarlyOutput {
        let filtered = self.input_filters[ch].process(input);
        let line = &mut self.lines[ch];
        line.write(filtered);

        let taps = channel_tap_positions(ch, reflections_ms, reverb_ms);
        let mut sum = 0.0;
        for (position, gain) in taps.iter().zip(EARLY_TAP_GAINS) {
            sum += gain * line.read_at_ms(*position);
        }
        let late_tap = line.read_at_ms(late_tap_position(reflections_ms, reverb_ms));

        EarlyOutput {
            early: self.diffusers[ch].process(sum),
            late_tap,
        }
    }

    /// Clear all delay and filter memory.
    pub fn clear(&mut self) {
        for lp in &mut self.input_filters {
            lp.reset();
        }
        for line in &mut self.lines {
            line.clear();
        }
        for ap in &mut self.diffusers {
            ap.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ReverbParams;

    const SR: f32 = 48000.0;

    fn section() -> EarlySection {
        let mut early = EarlySection::new(SR, 1000.0, 2000.0, FilterMemory::Persistent, true);
        let mut cooked = CookedCoefficients::cook(&ReverbParams::default(), SR);
        cooked.input_lowpass = 0.0;
        early.apply(&cooked);
        early
    }

    #[test]
    fn late_tap_arrives_at_total_delay() {
        let mut early = section();
        let mut first = None;
        for n in 0..3000 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            let out = early.process(0, x, 20.0, 30.0);
            if out.late_tap != 0.0 && first.is_none() {
                first = Some(n);
            }
        }
        assert_eq!(first, Some(2400));
    }

    #[test]
    fn first_reflection_arrives_at_reflections_delay() {
        let mut early = section();
        let mut first = None;
        for n in 0..3000 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            let out = early.process(1, x, 20.0, 30.0);
            if out.early != 0.0 && first.is_none() {
                first = Some(n);
            }
        }
        // Diffuser passes g · x straight through, so the tap shows up undelayed
        assert_eq!(first, Some(960));
    }

    #[test]
    fn rendered_taps_follow_cooked_positions() {
        let params = ReverbParams {
            reflections_delay: 0.02,
            reverb_delay: 0.03,
            ..ReverbParams::default()
        };
        let cooked = CookedCoefficients::cook(&params, SR);
        let refl_ms = params.reflections_delay * 1000.0;
        let rev_ms = params.reverb_delay * 1000.0;

        let mut early = section();
        let mut late_first = None;
        for n in 0..3000 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            let out = early.process(0, x, refl_ms, rev_ms);
            if out.late_tap != 0.0 && late_first.is_none() {
                late_first = Some(n);
            }
        }
        let expected = libm::roundf(cooked.late_tap_ms * SR / 1000.0) as usize;
        assert_eq!(late_first, Some(expected));

        // First reflection lands on the first cooked tap
        let mut early = section();
        let mut history = Vec::new();
        for n in 0..3000 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            history.push(early.process(0, x, refl_ms, rev_ms).early);
        }
        let first = history.iter().position(|&s| s != 0.0);
        let expected = libm::roundf(cooked.early_taps_ms[0][0] * SR / 1000.0) as usize;
        assert_eq!(first, Some(expected));
    }

    #[test]
    fn clear_silences() {
        let mut early = section();
        for _ in 0..100 {
            early.process(0, 1.0, 1.0, 1.0);
        }
        early.clear();
        let out = early.process(0, 0.0, 1.0, 1.0);
        assert_eq!(out.early, 0.0);
        assert_eq!(out.late_tap, 0.0);
    }
}
