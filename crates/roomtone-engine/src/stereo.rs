//! Channel configurations and the mid/side width stage.
//!
//! The reverberator always renders two channels internally. Mono input is
//! fed to both; mono output is the average of the two after the width stage.
//!
//! # Width
//!
//! ```text
//! w      = width% / 10
//! k_mid  = 1 / max(1 + w, 2)
//! k_side = w · k_mid
//! mid    = (L + R) · k_mid
//! side   = (R - L) · k_side
//! L'     = mid - side
//! R'     = mid + side
//! ```
//!
//! At 10 % (`w = 1`) the stage is transparent. Below that the image narrows
//! toward mono, above it the side signal dominates.

use std::fmt;

use crate::error::EngineError;

/// Channel count of one side of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelFormat {
    /// One channel.
    Mono,
    /// Two channels, left first.
    Stereo,
}

impl ChannelFormat {
    /// Samples per frame.
    pub const fn channels(self) -> usize {
        match self {
            ChannelFormat::Mono => 1,
            ChannelFormat::Stereo => 2,
        }
    }

    /// Format for a channel count, `None` beyond stereo.
    pub const fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(ChannelFormat::Mono),
            2 => Some(ChannelFormat::Stereo),
            _ => None,
        }
    }
}

impl fmt::Display for ChannelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelFormat::Mono => f.write_str("mono"),
            ChannelFormat::Stereo => f.write_str("stereo"),
        }
    }
}

/// Input and output format of a processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelConfig {
    /// Input channels.
    pub input: ChannelFormat,
    /// Output channels.
    pub output: ChannelFormat,
}

impl ChannelConfig {
    /// Mono in, mono out.
    pub const MONO: Self = Self::new(ChannelFormat::Mono, ChannelFormat::Mono);
    /// Mono in, stereo out.
    pub const MONO_TO_STEREO: Self = Self::new(ChannelFormat::Mono, ChannelFormat::Stereo);
    /// Stereo in, stereo out.
    pub const STEREO: Self = Self::new(ChannelFormat::Stereo, ChannelFormat::Stereo);

    /// Build a configuration.
    pub const fn new(input: ChannelFormat, output: ChannelFormat) -> Self {
        Self { input, output }
    }

    /// Check that the configuration is renderable and both slices are long
    /// enough for it.
    pub fn validate(self, input_len: usize, output_len: usize) -> Result<(), EngineError> {
        if self.input == ChannelFormat::Stereo && self.output == ChannelFormat::Mono {
            return Err(EngineError::UnsupportedChannelConfig {
                input: self.input,
                output: self.output,
            });
        }
        if input_len < self.input.channels() {
            return Err(EngineError::FrameTooShort {
                expected: self.input.channels(),
                got: input_len,
            });
        }
        if output_len < self.output.channels() {
            return Err(EngineError::FrameTooShort {
                expected: self.output.channels(),
                got: output_len,
            });
        }
        Ok(())
    }
}

/// Mid and side coefficients for a width percentage.
///
/// Returns `(k_mid, k_side)`.
pub fn width_coefficients(width_percent: f32) -> (f32, f32) {
    let w = width_percent.max(0.0) / 10.0;
    let k_mid = 1.0 / (1.0 + w).max(2.0);
    (k_mid, w * k_mid)
}

/// Apply the width stage to a stereo pair.
#[inline]
pub fn apply_width(left: f32, right: f32, k_mid: f32, k_side: f32) -> (f32, f32) {
    let mid = (left + right) * k_mid;
    let side = (right - left) * k_side;
    (mid - side, mid + side)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_percent_is_transparent() {
        let (k_mid, k_side) = width_coefficients(10.0);
        let (l, r) = apply_width(0.8, -0.2, k_mid, k_side);
        assert!((l - 0.8).abs() < 1e-6);
        assert!((r + 0.2).abs() < 1e-6);
    }

    #[test]
    fn zero_width_is_mono() {
        let (k_mid, k_side) = width_coefficients(0.0);
        assert_eq!(k_side, 0.0);
        let (l, r) = apply_width(1.0, 0.0, k_mid, k_side);
        assert_eq!(l, r);
        assert!((l - 0.5).abs() < 1e-6);
    }

    #[test]
    fn wide_setting_keeps_mid_bounded() {
        let (k_mid, k_side) = width_coefficients(100.0);
        assert!((k_mid - 1.0 / 11.0).abs() < 1e-6);
        assert!((k_side - 10.0 / 11.0).abs() < 1e-6);
    }

    #[test]
    fn stereo_to_mono_is_rejected() {
        let cfg = ChannelConfig::new(ChannelFormat::Stereo, ChannelFormat::Mono);
        assert!(matches!(
            cfg.validate(2, 1),
            Err(EngineError::UnsupportedChannelConfig { .. })
        ));
    }

    #[test]
    fn short_slices_are_rejected() {
        assert_eq!(
            ChannelConfig::STEREO.validate(1, 2),
            Err(EngineError::FrameTooShort {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            ChannelConfig::MONO_TO_STEREO.validate(1, 1),
            Err(EngineError::FrameTooShort {
                expected: 2,
                got: 1
            })
        );
        assert!(ChannelConfig::MONO.validate(1, 1).is_ok());
    }

    #[test]
    fn format_from_channels() {
        assert_eq!(ChannelFormat::from_channels(2), Some(ChannelFormat::Stereo));
        assert_eq!(ChannelFormat::from_channels(6), None);
    }
}
