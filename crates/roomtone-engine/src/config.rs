//! Engine configuration.
//!
//! Settings that shape the engine itself rather than the sound of a room:
//! how filter memory behaves, how controls are smoothed, and how large the
//! delay buffers are. They take effect on the next
//! [`reset`](crate::FrameProcessor::reset).
//!
//! # TOML Format
//!
//! ```toml
//! filter_memory = "persistent"
//! interpolate_delays = true
//! max_early_delay_ms = 1000.0
//! allpass_max_delay_ms = 2000.0
//!
//! [level_smoothing]
//! kind = "one_pole"
//! coefficient = 0.999
//!
//! [delay_smoothing]
//! kind = "linear"
//! time_ms = 100.0
//! ```
//!
//! Every key is optional.

use std::path::Path;

use roomtone_core::{FilterMemory, SmoothingPolicy};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tables::{MAX_BUFFER_DELAY_MS, MIN_ALLPASS_DELAY_MS, MIN_EARLY_DELAY_MS};

#[derive(Serialize, Deserialize)]
#[serde(remote = "FilterMemory", rename_all = "snake_case")]
enum FilterMemoryDef {
    Persistent,
    ResetPerSample,
}

#[derive(Serialize, Deserialize)]
#[serde(remote = "SmoothingPolicy", tag = "kind", rename_all = "snake_case")]
enum SmoothingPolicyDef {
    None,
    Linear { time_ms: f32 },
    OnePole { coefficient: f32 },
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Whether damping low-passes keep state between samples.
    #[serde(with = "FilterMemoryDef")]
    pub filter_memory: FilterMemory,

    /// Linear interpolation of fractional delay-line reads.
    pub interpolate_delays: bool,

    /// Early delay line length, ms. Between 700 and 10000.
    pub max_early_delay_ms: f32,

    /// All-pass buffer length, ms. Between 600 and 10000.
    pub allpass_max_delay_ms: f32,

    /// Smoothing of room, reflections and late levels and of the width.
    #[serde(with = "SmoothingPolicyDef")]
    pub level_smoothing: SmoothingPolicy,

    /// Smoothing of the reflections and reverb delays.
    #[serde(with = "SmoothingPolicyDef")]
    pub delay_smoothing: SmoothingPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            filter_memory: FilterMemory::Persistent,
            interpolate_delays: true,
            max_early_delay_ms: 1000.0,
            allpass_max_delay_ms: 2000.0,
            level_smoothing: SmoothingPolicy::one_pole(),
            delay_smoothing: SmoothingPolicy::Linear { time_ms: 100.0 },
        }
    }
}

impl EngineConfig {
    /// Check every value against what the engine can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_buffer(
            "max_early_delay_ms",
            self.max_early_delay_ms,
            MIN_EARLY_DELAY_MS,
        )?;
        validate_buffer(
            "allpass_max_delay_ms",
            self.allpass_max_delay_ms,
            MIN_ALLPASS_DELAY_MS,
        )?;
        validate_policy("level_smoothing", self.level_smoothing)?;
        validate_policy("delay_smoothing", self.delay_smoothing)?;
        Ok(())
    }

    /// Parse and validate a configuration from TOML.
    ///
    /// ```rust
    /// use roomtone_core::FilterMemory;
    /// use roomtone_engine::EngineConfig;
    ///
    /// let config = EngineConfig::from_toml_str(r#"filter_memory = "reset_per_sample""#).unwrap();
    /// assert_eq!(config.filter_memory, FilterMemory::ResetPerSample);
    /// assert_eq!(config.max_early_delay_ms, 1000.0);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn validate_buffer(field: &'static str, value_ms: f32, min_ms: f32) -> Result<(), ConfigError> {
    if (min_ms..=MAX_BUFFER_DELAY_MS).contains(&value_ms) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("must be between {min_ms} and {MAX_BUFFER_DELAY_MS}, got {value_ms}"),
        ))
    }
}

fn validate_policy(field: &'static str, policy: SmoothingPolicy) -> Result<(), ConfigError> {
    match policy {
        SmoothingPolicy::None => Ok(()),
        SmoothingPolicy::Linear { time_ms } => {
            if time_ms.is_finite() && time_ms >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::invalid(
                    field,
                    format!("ramp time must be a non-negative number, got {time_ms}"),
                ))
            }
        }
        SmoothingPolicy::OnePole { coefficient } => {
            if (0.0..1.0).contains(&coefficient) {
                Ok(())
            } else {
                Err(ConfigError::invalid(
                    field,
                    format!("coefficient must be in [0, 1), got {coefficient}"),
                ))
            }
        }
    }
}
