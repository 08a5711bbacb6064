//! Late-reverberation section.
//!
//! Two chains of six absorbent all-pass stages, cross-coupled through a
//! 2×2 orthogonal mixing matrix. Every stage output is tapped into the
//! channel's late output; the signal leaving the last stage is fed back
//! into the matrix on the next sample.
//!
//! ```text
//!            ┌──────────────── loopback ◄──────────────────────┐
//!            ▼                                                 │
//! tap_L ─► (+) ─┐       ┌─► S1 ► S2 ► S3 ► S4 ► D·LPF·gD ► S5 ► S6 ─┘
//!               ├─ H ───┤     │    │    │    │              │    │
//! tap_R ─► (+) ─┘       └─►  ...  Σ w_k ────────────────────────────► late
//! ```

use core::f32::consts::FRAC_1_SQRT_2;

use roomtone_core::{AbsorbentAllpass, DampingLowpass, DelayLine, FilterMemory, flush_denormal};

use crate::cook::CookedCoefficients;
use crate::tables::{CHAIN_DELAYS_MS, LATE_TAP_GAINS, STAGE_COUNT, STAGES_BEFORE_CHAIN_DELAY};

#[derive(Debug, Clone)]
struct LateChain {
    stages: [AbsorbentAllpass; STAGE_COUNT],
    delay: DelayLine,
    delay_ms: f32,
    lowpass: DampingLowpass,
    gain: f32,
}

impl LateChain {
    fn new(
        ch: usize,
        sample_rate: f32,
        allpass_max_delay_ms: f32,
        memory: FilterMemory,
        interpolate: bool,
    ) -> Self {
        let stages = core::array::from_fn(|_| {
            let mut stage = AbsorbentAllpass::new(sample_rate, allpass_max_delay_ms);
            stage.set_filter_memory(memory);
            stage
        });

        // Density never lengthens the chain delay beyond its table value
        let mut delay = DelayLine::with_max_delay(CHAIN_DELAYS_MS[ch] + 1.0, sample_rate);
        delay.set_interpolate(interpolate);

        let mut lowpass = DampingLowpass::new(sample_rate);
        lowpass.set_memory(memory);

        Self {
            stages,
            delay,
            delay_ms: 0.0,
            lowpass,
            gain: 1.0,
        }
    }

    fn apply(&mut self, ch: usize, cooked: &CookedCoefficients) {
        for (i, stage) in self.stages.iter_mut().enumerate() {
            stage.set_delay_samples(cooked.stage_delay_samples[ch][i]);
            stage.set_absorbent_gain(cooked.absorbent_gain[ch][i]);
            stage.set_lowpass_coefficient(cooked.stage_lowpass[ch][i]);
            stage.set_feedback_gain(cooked.feedback_gain);
        }
        self.delay_ms = cooked.chain_delay_ms[ch];
        self.lowpass.set_coefficient(cooked.chain_lowpass[ch]);
        self.gain = cooked.chain_gain[ch];
    }

    /// Returns `(tapped sum, last stage output)`.
    #[inline]
    fn process(&mut self, input: f32) -> (f32, f32) {
        let mut acc = 0.0;
        let mut s = input;

        for i in 0..STAGES_BEFORE_CHAIN_DELAY {
            s = self.stages[i].process(s);
            acc += LATE_TAP_GAINS[i] * s;
        }

        self.delay.write(s);
        s = self.lowpass.process(self.delay.read_at_ms(self.delay_ms)) * self.gain;

        for i in STAGES_BEFORE_CHAIN_DELAY..STAGE_COUNT {
            s = self.stages[i].process(s);
            acc += LATE_TAP_GAINS[i] * s;
        }

        (acc, s)
    }

    fn clear(&mut self) {
        for stage in &mut self.stages {
            stage.clear();
        }
        self.delay.clear();
        self.lowpass.reset();
    }
}

/// Two cross-coupled late chains.
#[derive(Debug, Clone)]
pub struct LateSection {
    chains: [LateChain; 2],
    loopback: [f32; 2],
}

impl LateSection {
    /// Allocate for `sample_rate`. Not real-time safe.
    pub fn new(
        sample_rate: f32,
        allpass_max_delay_ms: f32,
        memory: FilterMemory,
        interpolate: bool,
    ) -> Self {
        Self {
            chains: core::array::from_fn(|ch| {
                LateChain::new(ch, sample_rate, allpass_max_delay_ms, memory, interpolate)
            }),
            loopback: [0.0; 2],
        }
    }

    /// Copy stage delays, gains and filter coefficients from a cooked set.
    pub fn apply(&mut self, cooked: &CookedCoefficients) {
        for (ch, chain) in self.chains.iter_mut().enumerate() {
            chain.apply(ch, cooked);
        }
    }

    /// Process one stereo sample of late taps. Returns the un-scaled late
    /// output per channel.
    #[inline]
    pub fn process(&mut self, taps: [f32; 2]) -> [f32; 2] {
        let l = taps[0] + self.loopback[0];
        let r = taps[1] + self.loopback[1];
        let mixed = [(l + r) * FRAC_1_SQRT_2, (l - r) * FRAC_1_SQRT_2];

        let mut out = [0.0; 2];
        for ch in 0..2 {
            let (acc, last) = self.chains[ch].process(mixed[ch]);
            // Only the last stage loops back. Feeding back `acc` sums six
            // unit taps and the Generic impulse runs to inf within a second.
            self.loopback[ch] = flush_denormal(last);
            out[ch] = acc;
        }
        out
    }

    /// Clear all delay, filter and feedback memory.
    pub fn clear(&mut self) {
        for chain in &mut self.chains {
            chain.clear();
        }
        self.loopback = [0.0; 2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ControlId, ReverbParams};

    const SR: f32 = 48000.0;

    fn section(params: &ReverbParams, memory: FilterMemory) -> LateSection {
        let mut late = LateSection::new(SR, 2000.0, memory, true);
        late.apply(&CookedCoefficients::cook(params, SR));
        late
    }

    fn tail_energy(late: &mut LateSection, samples: usize) -> (f32, f32) {
        let mut first_half = 0.0;
        let mut second_half = 0.0;
        for n in 0..samples {
            let x = if n == 0 { 1.0 } else { 0.0 };
            let [l, r] = late.process([x, x]);
            assert!(l.is_finite() && r.is_finite());
            if n < samples / 2 {
                first_half += l * l + r * r;
            } else {
                second_half += l * l + r * r;
            }
        }
        (first_half, second_half)
    }

    #[test]
    fn generic_tail_decays() {
        for memory in [FilterMemory::Persistent, FilterMemory::ResetPerSample] {
            let mut late = section(&ReverbParams::default(), memory);
            let (early, late_energy) = tail_energy(&mut late, 96_000);
            assert!(early > 0.0);
            assert!(late_energy < early * 0.01, "{memory:?}: {early} -> {late_energy}");
        }
    }

    #[test]
    fn first_output_arrives_without_stage_delay() {
        // Each stage passes g · x straight through
        let mut late = section(&ReverbParams::default(), FilterMemory::Persistent);
        let [l, r] = late.process([1.0, 0.0]);
        assert!(l > 0.0);
        assert!(r > 0.0);
    }

    #[test]
    fn zero_density_stays_finite() {
        let mut params = ReverbParams::default();
        params.set(ControlId::Density, 0.0);
        params.set(ControlId::DecayTime, 20.0);
        let mut late = section(&params, FilterMemory::Persistent);
        for n in 0..48_000 {
            let x = if n == 0 { 1.0 } else { 0.0 };
            let [l, r] = late.process([x, -x]);
            assert!(l.is_finite() && r.is_finite());
        }
    }

    #[test]
    fn loopback_carries_last_stage_not_tap_sum() {
        // Stages after the chain delay see nothing on the first sample, so
        // the last stage is silent while the early taps are not
        let mut late = section(&ReverbParams::default(), FilterMemory::Persistent);
        let out = late.process([1.0, 0.0]);
        assert!(out[0] != 0.0 && out[1] != 0.0);
        assert_eq!(late.loopback, [0.0, 0.0]);
    }

    #[test]
    fn clear_removes_loopback() {
        let mut late = section(&ReverbParams::default(), FilterMemory::Persistent);
        for _ in 0..1000 {
            late.process([1.0, 1.0]);
        }
        late.clear();
        assert_eq!(late.process([0.0, 0.0]), [0.0, 0.0]);
    }
}
