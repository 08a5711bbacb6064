//! Impulse response rendering command.

use std::path::PathBuf;

use clap::Args;
use roomtone_core::linear_to_db;
use roomtone_engine::{ChannelConfig, ChannelFormat, FrameProcessor};

use super::common::{Channels, EngineArgs};
use super::process::default_tail_seconds;
use crate::wav::{WavAudio, peak, write_wav};

#[derive(Args)]
pub struct ImpulseArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    engine: EngineArgs,

    /// Sample rate in Hz
    #[arg(long, default_value = "48000")]
    sample_rate: u32,

    /// Length in seconds (default: decay time plus reflections and reverb
    /// delays)
    #[arg(long, value_name = "SECONDS")]
    length: Option<f32>,

    /// Output channels
    #[arg(long, value_enum, default_value = "stereo")]
    channels: Channels,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

pub fn run(args: ImpulseArgs) -> anyhow::Result<()> {
    let sample_rate = args.sample_rate as f32;
    let mut engine = args.engine.build_engine(sample_rate)?;

    let length = args
        .length
        .unwrap_or_else(|| default_tail_seconds(engine.params()))
        .max(0.0);
    let frames = (length * sample_rate) as usize;

    let config = ChannelConfig::new(ChannelFormat::Mono, args.channels.into());
    let channels = config.output.channels();

    let mut samples = vec![0.0; frames * channels];
    for (n, frame) in samples.chunks_exact_mut(channels).enumerate() {
        let x = if n == 0 { 1.0 } else { 0.0 };
        engine.process_frame(config, &[x], frame)?;
    }

    println!(
        "Rendered {} frames ({:.2}s) at {} Hz",
        frames, length, args.sample_rate
    );
    println!("  Peak {:.1} dB", linear_to_db(peak(&samples)));

    let energy: Vec<f32> = samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().map(|s| s * s).sum())
        .collect();
    match schroeder_decay_time(&energy, sample_rate, -60.0) {
        Some(t) => println!("  Energy decay reaches -60 dB at {t:.2}s"),
        None => println!("  Energy decay does not reach -60 dB within the render"),
    }

    let audio = WavAudio {
        samples,
        channels: channels as u16,
        sample_rate: args.sample_rate,
    };
    write_wav(&args.output, &audio, args.bit_depth)?;
    println!("Wrote {}", args.output.display());

    Ok(())
}

/// Time at which the backward-integrated energy decay curve first falls
/// `db` below its start. `None` if it never does or the response is silent.
pub fn schroeder_decay_time(energy: &[f32], sample_rate: f32, db: f32) -> Option<f32> {
    let mut remaining: Vec<f64> = Vec::with_capacity(energy.len());
    let mut sum = 0.0f64;
    for &e in energy.iter().rev() {
        sum += f64::from(e);
        remaining.push(sum);
    }
    remaining.reverse();

    let total = *remaining.first()?;
    if total <= 0.0 {
        return None;
    }
    let threshold = total * 10f64.powf(f64::from(db) / 10.0);
    remaining
        .iter()
        .position(|&r| r < threshold)
        .map(|n| n as f32 / sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exponential_decay_time() {
        // 60 dB over 1000 samples
        let energy: Vec<f32> = (0..4000)
            .map(|n| 10f32.powf(-6.0 * n as f32 / 1000.0))
            .collect();
        let t = schroeder_decay_time(&energy, 1000.0, -60.0).unwrap();
        assert!((t - 1.0).abs() < 0.01, "t = {t}");
    }

    #[test]
    fn silence_has_no_decay_time() {
        assert_eq!(schroeder_decay_time(&[0.0; 10], 1000.0, -60.0), None);
        assert_eq!(schroeder_decay_time(&[], 1000.0, -60.0), None);
    }
}
