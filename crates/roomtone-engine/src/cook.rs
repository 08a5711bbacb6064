//! Parameter-to-coefficient cooking.
//!
//! [`CookedCoefficients`] is a pure function of a [`ReverbParams`] set and a
//! sample rate. The engine keeps one instance and, when a control changes,
//! recomputes only the [`CookGroups`] that control feeds
//! ([`ControlId::dependencies`](crate::ControlId::dependencies)).
//! Normalization is always recomputed last because it reads the stage and
//! diffusion groups.
//!
//! # Energy normalization
//!
//! Each absorbent all-pass stage with absorbent gain `a` and feedback `g`
//! passes an energy fraction
//!
//! ```text
//! c = (g² + (1 - g²)) · a² / (1 - a²g²)
//! ```
//!
//! The loop energy per channel is `A = gD² · ∏c` (chain gain `gD`), the tap
//! energy is `B = Σ_k w_k² · ∏_{i<=k} c_i` with `gD²` folded into the last
//! tap. The late level is scaled by `norm = clamp(1 - (A_L + A_R) / B, 0, 1)`
//! so that the recirculated energy does not add loudness as decay, diffusion
//! or density grow.

use roomtone_core::{db_to_linear, millibels_to_linear, solve_damping_coefficient};

use crate::params::ReverbParams;
use crate::stereo::width_coefficients;
use crate::tables::{
    CHAIN_DELAYS_MS, DECAY_DB, EARLY_TAP_COUNT, EARLY_TAP_FRACTIONS, INPUT_FILTER_PATH_MS,
    LATE_TAP_GAINS, MAX_ALLPASS_GAIN, MONO_BOOST_DB, STAGE_COUNT, STAGE_DELAYS_MS,
};

/// Set of coefficient groups.
///
/// # Example
///
/// ```rust
/// use roomtone_engine::CookGroups;
///
/// let groups = CookGroups::STAGES.union(CookGroups::NORMALIZATION);
/// assert!(groups.contains(CookGroups::STAGES));
/// assert!(!groups.contains(CookGroups::TAPS));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CookGroups(u8);

impl CookGroups {
    /// Nothing to recompute.
    pub const NONE: Self = Self(0);
    /// Room, reflections and reverb gains.
    pub const LEVELS: Self = Self(1 << 0);
    /// Room-HF input low-pass.
    pub const INPUT_FILTER: Self = Self(1 << 1);
    /// Stage and chain delays, absorbent gains, damping coefficients.
    pub const STAGES: Self = Self(1 << 2);
    /// All-pass feedback gain and mono boost.
    pub const DIFFUSION: Self = Self(1 << 3);
    /// Early and late tap positions.
    pub const TAPS: Self = Self(1 << 4);
    /// Energy normalization and late output level.
    pub const NORMALIZATION: Self = Self(1 << 5);
    /// Width coefficients.
    pub const WIDTH: Self = Self(1 << 6);
    /// Direct sound switch.
    pub const DIRECT: Self = Self(1 << 7);
    /// Everything.
    pub const ALL: Self = Self(u8::MAX);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any bit in `other` is set in `self`.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns the union of two sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns `true` if no group is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Everything the signal path needs, derived from the parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CookedCoefficients {
    /// Sample rate the sample counts were computed for.
    pub sample_rate: f32,

    /// Linear room gain applied to the whole wet signal.
    pub room_gain: f32,
    /// Linear early reflections gain.
    pub reflections_gain: f32,
    /// `min(room · reverb, 1)` before normalization.
    pub late_output_gain: f32,
    /// Late level per channel: `late_output_gain · norm`.
    pub late_level: [f32; 2],
    /// Normalization factor per channel.
    pub norm: [f32; 2],
    /// Late-level boost for mono output.
    pub mono_boost: f32,

    /// Room-HF input low-pass coefficient.
    pub input_lowpass: f32,

    /// Stage delays in milliseconds, after density scaling.
    pub stage_delay_ms: [[f32; STAGE_COUNT]; 2],
    /// Stage delays in whole samples, at least 1.
    pub stage_delay_samples: [[usize; STAGE_COUNT]; 2],
    /// Absorbent gain per stage.
    pub absorbent_gain: [[f32; STAGE_COUNT]; 2],
    /// Damping low-pass coefficient per stage.
    pub stage_lowpass: [[f32; STAGE_COUNT]; 2],
    /// All-pass feedback gain shared by every stage.
    pub feedback_gain: f32,

    /// Chain delay per channel, milliseconds.
    pub chain_delay_ms: [f32; 2],
    /// Chain gain `gD` per channel.
    pub chain_gain: [f32; 2],
    /// Chain damping coefficient per channel.
    pub chain_lowpass: [f32; 2],

    /// Early tap positions, milliseconds.
    pub early_taps_ms: [[f32; EARLY_TAP_COUNT]; 2],
    /// Position of the tap feeding the late section, milliseconds.
    pub late_tap_ms: f32,

    /// Width mid coefficient.
    pub width_mid: f32,
    /// Width side coefficient.
    pub width_side: f32,
    /// Dry signal on.
    pub direct: bool,
}

impl CookedCoefficients {
    /// Cook every group from scratch.
    pub fn cook(params: &ReverbParams, sample_rate: f32) -> Self {
        let mut cooked = Self {
            sample_rate,
            room_gain: 0.0,
            reflections_gain: 0.0,
            late_output_gain: 0.0,
            late_level: [0.0; 2],
            norm: [1.0; 2],
            mono_boost: 1.0,
            input_lowpass: 0.0,
            stage_delay_ms: [[0.0; STAGE_COUNT]; 2],
            stage_delay_samples: [[1; STAGE_COUNT]; 2],
            absorbent_gain: [[1.0; STAGE_COUNT]; 2],
            stage_lowpass: [[0.0; STAGE_COUNT]; 2],
            feedback_gain: 0.0,
            chain_delay_ms: [0.0; 2],
            chain_gain: [1.0; 2],
            chain_lowpass: [0.0; 2],
            early_taps_ms: [[0.0; EARLY_TAP_COUNT]; 2],
            late_tap_ms: 0.0,
            width_mid: 0.5,
            width_side: 0.0,
            direct: false,
        };
        cooked.recook(params, CookGroups::ALL);
        cooked
    }

    /// Recompute the given groups in dependency order.
    pub fn recook(&mut self, params: &ReverbParams, groups: CookGroups) {
        if groups.is_empty() {
            return;
        }
        tracing::trace!(?groups, "recook");

        if groups.contains(CookGroups::LEVELS) {
            self.cook_levels(params);
        }
        if groups.contains(CookGroups::INPUT_FILTER) {
            self.cook_input_filter(params);
        }
        if groups.contains(CookGroups::STAGES) {
            self.cook_stages(params);
        }
        if groups.contains(CookGroups::DIFFUSION) {
            self.cook_diffusion(params);
        }
        if groups.contains(CookGroups::TAPS) {
            self.cook_taps(params);
        }
        if groups.contains(CookGroups::WIDTH) {
            (self.width_mid, self.width_side) = width_coefficients(params.stereo_width);
        }
        if groups.contains(CookGroups::DIRECT) {
            self.direct = params.direct_sound;
        }
        if groups.contains(CookGroups::NORMALIZATION) {
            self.cook_normalization();
        }
    }

    fn cook_levels(&mut self, params: &ReverbParams) {
        self.room_gain = millibels_to_linear(params.room_level);
        self.reflections_gain = millibels_to_linear(params.reflections_level);
        self.late_output_gain =
            millibels_to_linear(params.room_level + params.reverb_level).min(1.0);
    }

    fn cook_input_filter(&mut self, params: &ReverbParams) {
        self.input_lowpass = solve_damping_coefficient(
            millibels_to_linear(params.room_hf_level),
            params.hf_reference,
            INPUT_FILTER_PATH_MS,
            decay_ms(params),
            self.sample_rate,
        );
    }

    fn cook_stages(&mut self, params: &ReverbParams) {
        let density = params.density / 100.0;
        let decay_ms = decay_ms(params);

        for ch in 0..2 {
            for stage in 0..STAGE_COUNT {
                let samples = ms_to_whole_samples(STAGE_DELAYS_MS[ch][stage] * density, self.sample_rate);
                let ms = samples as f32 * 1000.0 / self.sample_rate;

                self.stage_delay_samples[ch][stage] = samples;
                self.stage_delay_ms[ch][stage] = ms;
                self.absorbent_gain[ch][stage] = absorbent_gain(ms, decay_ms);
                self.stage_lowpass[ch][stage] = solve_damping_coefficient(
                    params.decay_hf_ratio,
                    params.hf_reference,
                    ms,
                    decay_ms,
                    self.sample_rate,
                );
            }

            let chain_ms = CHAIN_DELAYS_MS[ch] * density;
            self.chain_delay_ms[ch] = chain_ms;
            self.chain_gain[ch] = absorbent_gain(chain_ms, decay_ms);
            self.chain_lowpass[ch] = solve_damping_coefficient(
                params.decay_hf_ratio,
                params.hf_reference,
                chain_ms,
                decay_ms,
                self.sample_rate,
            );
        }
    }

    fn cook_diffusion(&mut self, params: &ReverbParams) {
        let diffusion = params.diffusion / 100.0;
        self.feedback_gain = MAX_ALLPASS_GAIN * diffusion;
        self.mono_boost = db_to_linear(MONO_BOOST_DB * diffusion);
    }

    fn cook_taps(&mut self, params: &ReverbParams) {
        let reflections_ms = params.reflections_delay * 1000.0;
        let reverb_ms = params.reverb_delay * 1000.0;
        self.early_taps_ms = early_tap_positions(reflections_ms, reverb_ms);
        self.late_tap_ms = late_tap_position(reflections_ms, reverb_ms);
    }

    fn cook_normalization(&mut self) {
        self.norm = energy_normalization(
            &self.absorbent_gain,
            self.feedback_gain,
            &self.chain_gain,
        );
        for ch in 0..2 {
            self.late_level[ch] = self.late_output_gain * self.norm[ch];
        }
    }
}

/// Decay time in milliseconds.
fn decay_ms(params: &ReverbParams) -> f32 {
    params.decay_time * 1000.0
}

/// Delay rounded to whole samples, at least one.
fn ms_to_whole_samples(ms: f32, sample_rate: f32) -> usize {
    (libm::roundf(ms * sample_rate / 1000.0) as usize).max(1)
}

/// Per-pass gain losing 60 dB over `decay_ms`: `10^(-3 · delay / decay)`.
pub fn absorbent_gain(delay_ms: f32, decay_ms: f32) -> f32 {
    if decay_ms <= 0.0 {
        return 0.0;
    }
    db_to_linear(DECAY_DB * delay_ms / decay_ms)
}

/// Early tap positions of channel `ch`: the reflections delay, then the
/// reflections delay plus a fixed fraction of the reverb delay.
#[inline]
pub fn channel_tap_positions(
    ch: usize,
    reflections_ms: f32,
    reverb_ms: f32,
) -> [f32; EARLY_TAP_COUNT] {
    let mut taps = [reflections_ms; EARLY_TAP_COUNT];
    for (k, fraction) in EARLY_TAP_FRACTIONS[ch].iter().enumerate() {
        taps[k + 1] = reflections_ms + fraction * reverb_ms;
    }
    taps
}

/// Early tap positions for both channels.
pub fn early_tap_positions(reflections_ms: f32, reverb_ms: f32) -> [[f32; EARLY_TAP_COUNT]; 2] {
    [
        channel_tap_positions(0, reflections_ms, reverb_ms),
        channel_tap_positions(1, reflections_ms, reverb_ms),
    ]
}

/// Position of the tap feeding the late section.
#[inline]
pub fn late_tap_position(reflections_ms: f32, reverb_ms: f32) -> f32 {
    reflections_ms + reverb_ms
}

/// Normalization factor per channel, in `[0, 1]`.
pub fn energy_normalization(
    absorbent: &[[f32; STAGE_COUNT]; 2],
    feedback_gain: f32,
    chain_gain: &[f32; 2],
) -> [f32; 2] {
    let g2 = f64::from(feedback_gain) * f64::from(feedback_gain);

    let mut loop_energy = [0.0f64; 2];
    let mut tap_energy = [0.0f64; 2];

    for ch in 0..2 {
        let gd2 = f64::from(chain_gain[ch]) * f64::from(chain_gain[ch]);
        let mut product = 1.0f64;
        for stage in 0..STAGE_COUNT {
            let a2 = f64::from(absorbent[ch][stage]) * f64::from(absorbent[ch][stage]);
            let denominator = (1.0 - a2 * g2).max(f64::EPSILON);
            product *= (g2 + (1.0 - g2)) * a2 / denominator;

            let w = f64::from(LATE_TAP_GAINS[stage]);
            let mut tap = w * w * product;
            if stage == STAGE_COUNT - 1 {
                tap *= gd2;
            }
            tap_energy[ch] += tap;
        }
        loop_energy[ch] = gd2 * product;
    }

    let total_loop = loop_energy[0] + loop_energy[1];
    let mut norm = [1.0f32; 2];
    for ch in 0..2 {
        if tap_energy[ch] > 1e-12 && total_loop.is_finite() {
            norm[ch] = (1.0 - total_loop / tap_energy[ch]).clamp(0.0, 1.0) as f32;
        }
    }
    norm
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ControlId;

    const SR: f32 = 48000.0;

    #[test]
    fn generic_environment() {
        let cooked = CookedCoefficients::cook(&ReverbParams::default(), SR);

        assert!((cooked.room_gain - 0.891).abs() < 1e-3);
        // -100 + 200 mB = +1 dB, capped at unity
        assert_eq!(cooked.late_output_gain, 1.0);
        assert!((cooked.feedback_gain - MAX_ALLPASS_GAIN).abs() < 1e-6);
        assert_eq!(cooked.stage_delay_samples[0][0], 6096);
        assert_eq!(cooked.stage_delay_samples[1][5], 24624);
        assert!((cooked.input_lowpass - 0.953).abs() < 2e-3);
        for ch in 0..2 {
            assert!(cooked.norm[ch] > 0.99 && cooked.norm[ch] <= 1.0);
        }
    }

    #[test]
    fn taps_increase_after_the_first() {
        let taps = early_tap_positions(20.0, 30.0);
        for ch in 0..2 {
            assert_eq!(taps[ch][0], 20.0);
            for k in 1..EARLY_TAP_COUNT {
                assert!(taps[ch][k] > taps[ch][k - 1]);
            }
        }
        assert!((taps[0][1] - 24.2).abs() < 1e-4);
    }

    #[test]
    fn absorbent_gain_matches_decay() {
        // A path as long as the decay time loses 60 dB
        assert!((absorbent_gain(1490.0, 1490.0) - 0.001).abs() < 1e-6);
        assert_eq!(absorbent_gain(0.0, 1490.0), 1.0);
        assert_eq!(absorbent_gain(100.0, 0.0), 0.0);
    }

    #[test]
    fn zero_density_keeps_one_sample_stages() {
        let mut params = ReverbParams::default();
        params.set(ControlId::Density, 0.0);
        let cooked = CookedCoefficients::cook(&params, SR);
        for ch in 0..2 {
            for stage in 0..STAGE_COUNT {
                assert_eq!(cooked.stage_delay_samples[ch][stage], 1);
                assert!(cooked.absorbent_gain[ch][stage] < 1.0);
            }
            assert_eq!(cooked.chain_delay_ms[ch], 0.0);
            assert!(cooked.norm[ch].is_finite());
        }
    }

    #[test]
    fn incremental_recook_matches_full_cook() {
        let mut params = ReverbParams::default();
        let mut cooked = CookedCoefficients::cook(&params, SR);

        let changes = [
            (ControlId::DecayTime, 7.5),
            (ControlId::Density, 40.0),
            (ControlId::Diffusion, 25.0),
            (ControlId::ReverbLevel, -600.0),
            (ControlId::StereoWidth, 90.0),
            (ControlId::HfReference, 1200.0),
            (ControlId::ReflectionsDelay, 0.05),
            (ControlId::DirectSound, 0.0),
        ];
        for (control, value) in changes {
            params.set(control, value);
            cooked.recook(&params, control.dependencies());
        }

        assert_eq!(cooked, CookedCoefficients::cook(&params, SR));
    }

    #[test]
    fn normalization_of_lossless_stages_stays_in_unit_range() {
        let norm = energy_normalization(&[[1.0; STAGE_COUNT]; 2], 0.6, &[1.0; 2]);
        for n in norm {
            assert!(n.is_finite() && (0.0..=1.0).contains(&n), "norm {n}");
        }
        // Recirculated energy is a large share of the tap energy here
        assert!(norm[0] < 0.5);
    }

    #[test]
    fn silent_taps_leave_level_untouched() {
        let norm = energy_normalization(&[[0.0; STAGE_COUNT]; 2], 0.6, &[0.0; 2]);
        assert_eq!(norm, [1.0, 1.0]);
    }
}
