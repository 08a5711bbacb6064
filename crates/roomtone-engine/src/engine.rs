//! The reverberator.
//!
//! [`ReverbEngine`] owns three layers:
//!
//! - [`ReverbParams`]: the plain values hosts set
//! - [`CookedCoefficients`]: everything derived from them, recomputed per
//!   changed group
//! - the signal state: delay lines, all-pass stages, filters and smoothers,
//!   allocated by [`reset`](FrameProcessor::reset)
//!
//! Per frame, for each channel:
//!
//! ```text
//! in ─► early section ─┬─ early ·refl ──────────────┐
//!                      └─ late tap ─► late section ─┴─ ·late ─► Σ ·room ─► width ─► (+ direct) ─► out
//! ```

use roomtone_core::{ParamDescriptor, ParameterInfo, Smoother};

use crate::config::EngineConfig;
use crate::cook::{CookGroups, CookedCoefficients};
use crate::early::EarlySection;
use crate::error::EngineError;
use crate::late::LateSection;
use crate::params::{ControlId, ReverbParams};
use crate::processor::FrameProcessor;
use crate::stereo::{ChannelConfig, ChannelFormat, apply_width};
use crate::tables::{DIRECT_SOUND_GAIN, MAX_SAMPLE_RATE};

/// Per-sample smoothed controls.
#[derive(Debug, Clone)]
struct Smoothers {
    room: Smoother,
    reflections: Smoother,
    late: [Smoother; 2],
    width_mid: Smoother,
    width_side: Smoother,
    reflections_ms: Smoother,
    reverb_ms: Smoother,
}

impl Smoothers {
    fn new(
        config: &EngineConfig,
        sample_rate: f32,
        cooked: &CookedCoefficients,
        params: &ReverbParams,
    ) -> Self {
        let level = |initial| Smoother::new(config.level_smoothing, sample_rate, initial);
        let delay = |initial| Smoother::new(config.delay_smoothing, sample_rate, initial);
        Self {
            room: level(cooked.room_gain),
            reflections: level(cooked.reflections_gain),
            late: [level(cooked.late_level[0]), level(cooked.late_level[1])],
            width_mid: level(cooked.width_mid),
            width_side: level(cooked.width_side),
            reflections_ms: delay(reflections_ms(params)),
            reverb_ms: delay(reverb_ms(params)),
        }
    }

    fn retarget(&mut self, cooked: &CookedCoefficients, params: &ReverbParams) {
        self.room.set_target(cooked.room_gain);
        self.reflections.set_target(cooked.reflections_gain);
        for ch in 0..2 {
            self.late[ch].set_target(cooked.late_level[ch]);
        }
        self.width_mid.set_target(cooked.width_mid);
        self.width_side.set_target(cooked.width_side);
        self.reflections_ms.set_target(reflections_ms(params));
        self.reverb_ms.set_target(reverb_ms(params));
    }

    fn snap(&mut self, cooked: &CookedCoefficients, params: &ReverbParams) {
        self.room.snap(cooked.room_gain);
        self.reflections.snap(cooked.reflections_gain);
        for ch in 0..2 {
            self.late[ch].snap(cooked.late_level[ch]);
        }
        self.width_mid.snap(cooked.width_mid);
        self.width_side.snap(cooked.width_side);
        self.reflections_ms.snap(reflections_ms(params));
        self.reverb_ms.snap(reverb_ms(params));
    }
}

fn reflections_ms(params: &ReverbParams) -> f32 {
    params.reflections_delay * 1000.0
}

fn reverb_ms(params: &ReverbParams) -> f32 {
    params.reverb_delay * 1000.0
}

/// Everything allocated for one sample rate.
#[derive(Debug, Clone)]
struct EngineState {
    cooked: CookedCoefficients,
    early: EarlySection,
    late: LateSection,
    smoothers: Smoothers,
}

impl EngineState {
    fn new(sample_rate: f32, config: &EngineConfig, params: &ReverbParams) -> Self {
        let cooked = CookedCoefficients::cook(params, sample_rate);
        let mut early = EarlySection::new(
            sample_rate,
            config.max_early_delay_ms,
            config.allpass_max_delay_ms,
            config.filter_memory,
            config.interpolate_delays,
        );
        let mut late = LateSection::new(
            sample_rate,
            config.allpass_max_delay_ms,
            config.filter_memory,
            config.interpolate_delays,
        );
        early.apply(&cooked);
        late.apply(&cooked);
        let smoothers = Smoothers::new(config, sample_rate, &cooked, params);

        Self {
            cooked,
            early,
            late,
            smoothers,
        }
    }

    fn apply_structure(&mut self, groups: CookGroups) {
        if groups.intersects(CookGroups::INPUT_FILTER) {
            self.early.apply(&self.cooked);
        }
        if groups.intersects(CookGroups::STAGES.union(CookGroups::DIFFUSION)) {
            self.late.apply(&self.cooked);
        }
    }

    /// Render one stereo frame.
    #[inline]
    fn render(&mut self, input: [f32; 2], mono_output: bool) -> [f32; 2] {
        let s = &mut self.smoothers;
        let room = s.room.advance();
        let reflections = s.reflections.advance();
        let late_level = [s.late[0].advance(), s.late[1].advance()];
        let k_mid = s.width_mid.advance();
        let k_side = s.width_side.advance();
        let reflections_ms = s.reflections_ms.advance();
        let reverb_ms = s.reverb_ms.advance();

        let early = [
            self.early.process(0, input[0], reflections_ms, reverb_ms),
            self.early.process(1, input[1], reflections_ms, reverb_ms),
        ];
        let late = self.late.process([early[0].late_tap, early[1].late_tap]);

        let boost = if mono_output {
            self.cooked.mono_boost
        } else {
            1.0
        };

        let mut wet = [0.0; 2];
        for ch in 0..2 {
            wet[ch] = (early[ch].early * reflections + late[ch] * late_level[ch] * boost) * room;
        }

        let (mut left, mut right) = apply_width(wet[0], wet[1], k_mid, k_side);
        if self.cooked.direct {
            left += DIRECT_SOUND_GAIN * input[0];
            right += DIRECT_SOUND_GAIN * input[1];
        }
        [left, right]
    }
}

/// Stereo I3DL2-style room reverberator.
///
/// # Example
///
/// ```rust
/// use roomtone_engine::{ChannelConfig, ControlId, EngineConfig, FrameProcessor, ReverbEngine};
///
/// let mut engine = ReverbEngine::new(EngineConfig::default());
/// engine.on_parameter_changed(ControlId::DecayTime.id(), 3.92).unwrap();
/// engine.reset(44100.0).unwrap();
///
/// let mut out = [0.0; 2];
/// for n in 0..4410 {
///     let x = if n == 0 { 1.0 } else { 0.0 };
///     engine.process_frame(ChannelConfig::STEREO, &[x, x], &mut out).unwrap();
/// }
/// assert!(out[0].is_finite() && out[1].is_finite());
/// ```
#[derive(Debug, Clone)]
pub struct ReverbEngine {
    params: ReverbParams,
    config: EngineConfig,
    sample_rate: f32,
    state: Option<EngineState>,
}

impl ReverbEngine {
    /// Create an unprepared engine with the default parameter set.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            params: ReverbParams::default(),
            config,
            sample_rate: 0.0,
            state: None,
        }
    }

    /// Replace the parameter set, e.g. with a loaded preset.
    ///
    /// Values are clamped. A prepared engine recomputes every coefficient and
    /// moves its smoothed controls toward the new values.
    pub fn set_params(&mut self, params: &ReverbParams) {
        self.params = params.clamped();
        if let Some(state) = &mut self.state {
            state.cooked.recook(&self.params, CookGroups::ALL);
            state.apply_structure(CookGroups::ALL);
            state.smoothers.retarget(&state.cooked, &self.params);
        }
    }

    /// Replace the engine configuration. Takes effect on the next
    /// [`reset`](FrameProcessor::reset), which validates it.
    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Current parameter values.
    pub fn params(&self) -> &ReverbParams {
        &self.params
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Cooked coefficients, once prepared.
    pub fn cooked(&self) -> Option<&CookedCoefficients> {
        self.state.as_ref().map(|s| &s.cooked)
    }

    /// Prepared sample rate, once prepared.
    pub fn sample_rate(&self) -> Option<f32> {
        self.state.as_ref().map(|_| self.sample_rate)
    }

    /// Whether [`reset`](FrameProcessor::reset) has run.
    pub fn is_prepared(&self) -> bool {
        self.state.is_some()
    }

    /// Set control `id` from a normalized `[0, 1]` value.
    pub fn on_parameter_changed_normalized(
        &mut self,
        id: u32,
        normalized: f32,
    ) -> Result<(), EngineError> {
        let control = ControlId::try_from(id)?;
        self.set_control(control, control.descriptor().denormalize(normalized));
        Ok(())
    }

    fn set_control(&mut self, control: ControlId, value: f32) {
        let stored = self.params.set(control, value);
        tracing::trace!(control = control.key(), value = stored, "control changed");

        if let Some(state) = &mut self.state {
            let groups = control.dependencies();
            state.cooked.recook(&self.params, groups);
            state.apply_structure(groups);
            state.smoothers.retarget(&state.cooked, &self.params);
        }
    }
}

impl Default for ReverbEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl FrameProcessor for ReverbEngine {
    fn reset(&mut self, sample_rate: f32) -> Result<(), EngineError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 || sample_rate > MAX_SAMPLE_RATE {
            return Err(EngineError::InvalidSampleRate(sample_rate));
        }
        self.config
            .validate()
            .map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        tracing::debug!(
            sample_rate,
            max_early_delay_ms = self.config.max_early_delay_ms,
            allpass_max_delay_ms = self.config.allpass_max_delay_ms,
            filter_memory = ?self.config.filter_memory,
            "reverb engine reset"
        );

        self.sample_rate = sample_rate;
        self.state = Some(EngineState::new(sample_rate, &self.config, &self.params));
        Ok(())
    }

    fn initialize(&mut self) -> Result<(), EngineError> {
        let state = self.state.as_mut().ok_or(EngineError::NotPrepared)?;
        tracing::debug!(sample_rate = self.sample_rate, "reverb engine initialized");

        state.cooked = CookedCoefficients::cook(&self.params, self.sample_rate);
        state.apply_structure(CookGroups::ALL);
        state.early.clear();
        state.late.clear();
        state.smoothers.snap(&state.cooked, &self.params);
        Ok(())
    }

    fn on_parameter_changed(&mut self, id: u32, value: f32) -> Result<(), EngineError> {
        let control = ControlId::try_from(id)?;
        self.set_control(control, value);
        Ok(())
    }

    fn process_frame(
        &mut self,
        config: ChannelConfig,
        input: &[f32],
        output: &mut [f32],
    ) -> Result<(), EngineError> {
        config.validate(input.len(), output.len())?;
        let state = self.state.as_mut().ok_or(EngineError::NotPrepared)?;

        let stereo_in = match config.input {
            ChannelFormat::Mono => [input[0], input[0]],
            ChannelFormat::Stereo => [input[0], input[1]],
        };

        match config.output {
            ChannelFormat::Mono => {
                let [left, right] = state.render(stereo_in, true);
                output[0] = 0.5 * (left + right);
            }
            ChannelFormat::Stereo => {
                let [left, right] = state.render(stereo_in, false);
                output[0] = left;
                output[1] = right;
            }
        }
        Ok(())
    }
}

impl ParameterInfo for ReverbEngine {
    fn param_count(&self) -> usize {
        ControlId::ALL.len()
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        ControlId::ALL.get(index).map(|c| c.descriptor())
    }

    fn get_param(&self, index: usize) -> f32 {
        ControlId::ALL
            .get(index)
            .map_or(0.0, |c| self.params.get(*c))
    }

    fn set_param(&mut self, index: usize, value: f32) {
        if let Some(control) = ControlId::ALL.get(index) {
            self.set_control(*control, value);
        }
    }
}
