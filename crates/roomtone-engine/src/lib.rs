//! Roomtone Engine - stereo room reverberator
//!
//! An I3DL2-style reverberator built on roomtone-core:
//!
//! - early reflections from a five-tap delay line and an all-pass diffuser
//! - a late tail from two cross-coupled chains of six absorbent all-pass
//!   stages, with energy normalization against density, diffusion and decay
//! - a mid/side width stage and optional direct sound
//!
//! Hosts drive it through [`FrameProcessor`]: prepare a sample rate, forward
//! control changes by numeric [`ControlId`], pull frames.
//!
//! ## Example
//!
//! ```rust
//! use roomtone_engine::{ChannelConfig, ControlId, FrameProcessor, ReverbEngine};
//!
//! let mut engine = ReverbEngine::default();
//! engine.on_parameter_changed(ControlId::StereoWidth.id(), 80.0).unwrap();
//! engine.reset(48000.0).unwrap();
//!
//! let input = [0.5_f32];
//! let mut output = [0.0_f32; 2];
//! engine.process_frame(ChannelConfig::MONO_TO_STEREO, &input, &mut output).unwrap();
//! ```

pub mod config;
pub mod cook;
pub mod early;
pub mod engine;
pub mod error;
pub mod late;
pub mod params;
pub mod processor;
pub mod stereo;
pub mod tables;

pub use config::EngineConfig;
pub use cook::{CookGroups, CookedCoefficients};
pub use engine::ReverbEngine;
pub use error::{ConfigError, EngineError};
pub use params::{ControlId, ReverbParams};
pub use processor::FrameProcessor;
pub use stereo::{ChannelConfig, ChannelFormat};
