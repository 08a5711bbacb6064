//! Roomtone Core - DSP primitives for algorithmic reverberation
//!
//! This crate provides the building blocks the roomtone reverberator is made
//! of, designed for real-time processing with zero allocation in the audio
//! path. Buffers are sized once when the host prepares a sample rate and never
//! grow afterwards.
//!
//! # Core Abstractions
//!
//! ## Level Conversion
//!
//! - [`db_to_linear`] / [`linear_to_db`] - decibel and linear gain
//! - [`millibels_to_linear`] - hundredths of a decibel, the unit room levels use
//!
//! ## Parameter Smoothing
//!
//! - [`ParameterSmoother`] - one-pole control-rate smoother (`a = 0.999`)
//! - [`LinearRamp`] - constant-rate ramp for delay times
//! - [`Smoother`] / [`SmoothingPolicy`] - runtime-selected smoothing
//!
//! ## Delay and Filtering
//!
//! - [`DelayLine`] - circular buffer with millisecond-addressed reads
//! - [`DampingLowpass`] - one-pole low-pass whose coefficient realizes a target
//!   high-frequency decay, see [`solve_damping_coefficient`]
//! - [`AbsorbentAllpass`] - delay, damping and all-pass feedback in one stage
//!
//! ## Parameters
//!
//! - [`ParameterInfo`] / [`ParamDescriptor`] - index-based parameter discovery
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! roomtone-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use roomtone_core::{AbsorbentAllpass, FilterMemory};
//!
//! let mut stage = AbsorbentAllpass::new(48000.0, 2000.0);
//! stage.set_delay_samples(6096);
//! stage.set_feedback_gain(0.618);
//! stage.set_absorbent_gain(0.75);
//! stage.set_lowpass_coefficient(0.2);
//! stage.set_filter_memory(FilterMemory::Persistent);
//!
//! let out = stage.process(1.0);
//! assert!(out.is_finite());
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod aapf;
pub mod delay;
pub mod lowpass;
pub mod math;
pub mod param_info;
pub mod smoothing;

pub use aapf::AbsorbentAllpass;
pub use delay::DelayLine;
pub use lowpass::{DampingLowpass, FilterMemory, solve_damping_coefficient};
pub use math::{db_to_linear, flush_denormal, linear_to_db, millibels_to_linear, ms_to_samples};
pub use param_info::{ParamDescriptor, ParamFlags, ParamId, ParamScale, ParamUnit, ParameterInfo};
pub use smoothing::{LinearRamp, ParameterSmoother, Smoother, SmoothingPolicy};
