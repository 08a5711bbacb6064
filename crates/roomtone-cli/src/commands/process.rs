//! File-based reverb processing command.

use std::path::PathBuf;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use roomtone_core::linear_to_db;
use roomtone_engine::{ChannelConfig, ChannelFormat, FrameProcessor, ReverbParams};

use super::common::{Channels, EngineArgs};
use crate::wav::{WavAudio, peak, read_wav, rms, write_wav};

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file (mono or stereo)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    engine: EngineArgs,

    /// Output channels
    #[arg(long, value_enum, default_value = "stereo")]
    channels: Channels,

    /// Seconds of tail rendered after the input ends (default: decay time
    /// plus reflections and reverb delays)
    #[arg(long, value_name = "SECONDS")]
    tail: Option<f32>,

    /// Processing block size in frames
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value = "32")]
    bit_depth: u16,
}

/// Tail long enough for the late reverberation to die away.
pub fn default_tail_seconds(params: &ReverbParams) -> f32 {
    params.decay_time + params.reflections_delay + params.reverb_delay
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        anyhow::bail!("Block size must be at least 1");
    }

    println!("Reading {}...", args.input.display());
    let audio = read_wav(&args.input)?;
    let input_format = ChannelFormat::from_channels(usize::from(audio.channels))
        .ok_or_else(|| anyhow::anyhow!("Unsupported channel count: {}", audio.channels))?;
    let sample_rate = audio.sample_rate as f32;

    println!(
        "  {} frames, {} channel(s), {} Hz, {:.2}s",
        audio.frames(),
        audio.channels,
        audio.sample_rate,
        audio.frames() as f32 / sample_rate
    );

    let config = ChannelConfig::new(input_format, args.channels.into());
    config.validate(config.input.channels(), config.output.channels())?;

    let mut engine = args.engine.build_engine(sample_rate)?;

    let tail = args
        .tail
        .unwrap_or_else(|| default_tail_seconds(engine.params()))
        .max(0.0);
    let total_frames = audio.frames() + (tail * sample_rate) as usize;

    let in_channels = config.input.channels();
    let out_channels = config.output.channels();

    let mut input = audio.samples.clone();
    input.resize(total_frames * in_channels, 0.0);
    let mut output = vec![0.0; total_frames * out_channels];

    println!(
        "Processing {} in, {} out, {:.2}s tail...",
        config.input, config.output, tail
    );

    let pb = ProgressBar::new(total_frames as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    for (in_chunk, out_chunk) in input
        .chunks(args.block_size * in_channels)
        .zip(output.chunks_mut(args.block_size * out_channels))
    {
        let frames = engine.process_interleaved(config, in_chunk, out_chunk)?;
        pb.inc(frames as u64);
    }

    pb.finish_with_message("done");

    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&audio.samples)),
        linear_to_db(peak(&audio.samples))
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        linear_to_db(rms(&output)),
        linear_to_db(peak(&output))
    );

    println!("\nWriting {}...", args.output.display());
    let rendered = WavAudio {
        samples: output,
        channels: out_channels as u16,
        sample_rate: audio.sample_rate,
    };
    write_wav(&args.output, &rendered, args.bit_depth)?;
    println!("Done!");

    Ok(())
}
