//! Host-facing processing interface.
//!
//! [`FrameProcessor`] is the contract between a host (a plugin wrapper, the
//! `roomtone` CLI, a test) and the engine. The host prepares a sample rate,
//! forwards parameter changes by numeric control id, and pulls one frame at
//! a time.
//!
//! ## Design Decisions
//!
//! - **Frame granularity**: one sample per channel per call. Hosts with
//!   interleaved buffers use [`process_interleaved`](FrameProcessor::process_interleaved).
//!
//! - **Errors before effects**: every method validates its arguments before
//!   it touches state, so a rejected call leaves the processor unchanged.
//!
//! - **No allocations** in `on_parameter_changed` and `process_frame`.

use crate::error::EngineError;
use crate::stereo::ChannelConfig;

/// A sample-rate-prepared frame processor.
///
/// # Example
///
/// ```rust
/// use roomtone_engine::{ChannelConfig, ControlId, FrameProcessor, ReverbEngine};
///
/// let mut engine = ReverbEngine::default();
/// engine.reset(48000.0).unwrap();
/// engine.on_parameter_changed(ControlId::DecayTime.id(), 2.5).unwrap();
///
/// let mut out = [0.0; 2];
/// engine.process_frame(ChannelConfig::MONO_TO_STEREO, &[1.0], &mut out).unwrap();
/// assert!(out.iter().all(|s| s.is_finite()));
/// ```
pub trait FrameProcessor {
    /// (Re)allocate every buffer for `sample_rate` and recompute all
    /// coefficients. Required before processing.
    ///
    /// Not real-time safe.
    fn reset(&mut self, sample_rate: f32) -> Result<(), EngineError>;

    /// Recompute every coefficient from the current parameters and clear
    /// the signal state, keeping the current allocation.
    fn initialize(&mut self) -> Result<(), EngineError>;

    /// Set control `id` to the plain `value` and recompute what depends on
    /// it. Values are clamped to the control's range.
    fn on_parameter_changed(&mut self, id: u32, value: f32) -> Result<(), EngineError>;

    /// Render one frame.
    ///
    /// `input` holds `config.input.channels()` samples and `output`
    /// `config.output.channels()`, left first.
    fn process_frame(
        &mut self,
        config: ChannelConfig,
        input: &[f32],
        output: &mut [f32],
    ) -> Result<(), EngineError>;

    /// Render interleaved buffers frame by frame. Returns the number of
    /// frames rendered, which is the smaller of the two buffers' frame
    /// counts.
    fn process_interleaved(
        &mut self,
        config: ChannelConfig,
        input: &[f32],
        output: &mut [f32],
    ) -> Result<usize, EngineError> {
        config.validate(input.len(), output.len())?;

        let mut frames = 0;
        for (frame_in, frame_out) in input
            .chunks_exact(config.input.channels())
            .zip(output.chunks_exact_mut(config.output.channels()))
        {
            self.process_frame(config, frame_in, frame_out)?;
            frames += 1;
        }
        Ok(frames)
    }
}
