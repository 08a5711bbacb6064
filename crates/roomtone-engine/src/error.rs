//! Error types for the engine and its configuration.

use std::path::PathBuf;
use thiserror::Error;

use crate::stereo::ChannelFormat;

/// Errors reported by [`FrameProcessor`](crate::FrameProcessor) operations.
///
/// Numeric trouble inside the signal path is never an error: degenerate
/// coefficients are clamped during cooking. These cover the host contract.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Sample rate was not a finite value in `(0, 768000]` Hz.
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f32),

    /// The engine configuration failed validation at `reset`.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// Processing was requested before `reset(sample_rate)`.
    #[error("engine not prepared: call reset(sample_rate) before processing")]
    NotPrepared,

    /// The channel configuration is not one the engine renders.
    #[error("unsupported channel configuration: {input} in, {output} out")]
    UnsupportedChannelConfig {
        /// Input channel format.
        input: ChannelFormat,
        /// Output channel format.
        output: ChannelFormat,
    },

    /// A frame slice holds fewer samples than its channel format needs.
    #[error("frame too short: expected {expected} samples, got {got}")]
    FrameTooShort {
        /// Samples the channel format needs.
        expected: usize,
        /// Samples supplied.
        got: usize,
    },

    /// A parameter notification named a control id the engine does not have.
    #[error("unknown control id: {0}")]
    UnknownControl(u32),
}

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    ReadFile {
        /// Path of the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to serialize TOML
    #[error("failed to serialize TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// A value parsed but is outside what the engine accepts
    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

impl ConfigError {
    /// Create a read file error.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Create a validation error.
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn read_file_keeps_source() {
        let err = ConfigError::read_file(
            "/etc/roomtone.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "mock"),
        );
        assert!(err.to_string().contains("/etc/roomtone.toml"));
        assert!(err.source().is_some());
    }

    #[test]
    fn invalid_names_field() {
        let err = ConfigError::invalid("max_early_delay_ms", "must be at least 700");
        assert_eq!(
            err.to_string(),
            "invalid value for 'max_early_delay_ms': must be at least 700"
        );
    }

    #[test]
    fn engine_error_messages() {
        let err = EngineError::UnsupportedChannelConfig {
            input: ChannelFormat::Stereo,
            output: ChannelFormat::Mono,
        };
        assert_eq!(
            err.to_string(),
            "unsupported channel configuration: stereo in, mono out"
        );
        assert_eq!(
            EngineError::InvalidConfig("bad".into()).to_string(),
            "invalid engine configuration: bad"
        );
        assert_eq!(
            EngineError::UnknownControl(42).to_string(),
            "unknown control id: 42"
        );
    }
}
