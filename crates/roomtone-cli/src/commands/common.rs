//! Shared CLI helpers used across multiple commands.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use roomtone_engine::{
    ChannelFormat, ControlId, EngineConfig, FrameProcessor, ReverbEngine, ReverbParams,
};

/// Engine and room options shared by the rendering commands.
#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    /// Engine configuration file (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Room parameter file (TOML)
    #[arg(short, long, value_name = "FILE")]
    preset: Option<PathBuf>,

    /// Room parameters, applied after the preset (e.g. "decay_time=2.5")
    #[arg(long, value_parser = parse_key_val, number_of_values = 1)]
    param: Vec<(String, String)>,
}

/// Output channel layout.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// One channel
    Mono,
    /// Two channels
    Stereo,
}

impl From<Channels> for ChannelFormat {
    fn from(channels: Channels) -> Self {
        match channels {
            Channels::Mono => ChannelFormat::Mono,
            Channels::Stereo => ChannelFormat::Stereo,
        }
    }
}

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        ));
    }
    Ok((parts[0].trim().to_string(), parts[1].trim().to_string()))
}

/// Parse a parameter value. Switches also accept on/off and true/false.
pub fn parse_value(control: ControlId, value: &str) -> anyhow::Result<f32> {
    if control == ControlId::DirectSound {
        match value.to_ascii_lowercase().as_str() {
            "on" | "true" | "yes" => return Ok(1.0),
            "off" | "false" | "no" => return Ok(0.0),
            _ => {}
        }
    }
    value.parse::<f32>().map_err(|_| {
        anyhow::anyhow!(
            "Invalid value '{}' for parameter '{}'",
            value,
            control.key()
        )
    })
}

impl EngineArgs {
    /// Load the configuration and parameters and build an engine prepared
    /// for `sample_rate`.
    pub fn build_engine(&self, sample_rate: f32) -> anyhow::Result<ReverbEngine> {
        let config = match &self.config {
            Some(path) => EngineConfig::load(path)?,
            None => EngineConfig::default(),
        };

        let params = match &self.preset {
            Some(path) => ReverbParams::load(path)?,
            None => ReverbParams::default(),
        };

        let mut engine = ReverbEngine::new(config);
        engine.set_params(&params);

        for (key, value) in &self.param {
            let control = ControlId::from_key(key).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown parameter '{}'. Use 'roomtone params' to see available parameters.",
                    key
                )
            })?;
            let value = parse_value(control, value)?;
            engine.on_parameter_changed(control.id(), value)?;
        }

        engine.reset(sample_rate)?;
        tracing::info!(
            sample_rate,
            decay_time = engine.params().decay_time,
            "engine ready"
        );
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_val_splits_on_first_equals() {
        assert_eq!(
            parse_key_val("decay_time = 2.5"),
            Ok(("decay_time".to_string(), "2.5".to_string()))
        );
        assert!(parse_key_val("decay_time").is_err());
    }

    #[test]
    fn switch_values() {
        assert_eq!(parse_value(ControlId::DirectSound, "off").unwrap(), 0.0);
        assert_eq!(parse_value(ControlId::DirectSound, "ON").unwrap(), 1.0);
        assert_eq!(parse_value(ControlId::DecayTime, "3.5").unwrap(), 3.5);
        assert!(parse_value(ControlId::DecayTime, "long").is_err());
    }
}
