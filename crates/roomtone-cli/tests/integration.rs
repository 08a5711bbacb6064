//! Integration tests for roomtone-cli.
//!
//! Tests cover the CLI binary invocation and end-to-end file processing.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Helper to get the path to the `roomtone` binary built by cargo.
fn roomtone_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_roomtone"))
}

fn write_test_wav(path: &Path, channels: u16, frames: usize) {
    let spec = hound::WavSpec {
        channels,
        sample_rate: 48000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for n in 0..frames {
        let s = (2.0 * std::f32::consts::PI * 440.0 * n as f32 / 48000.0).sin() * 0.5;
        for _ in 0..channels {
            writer.write_sample(s).unwrap();
        }
    }
    writer.finalize().unwrap();
}

// ---------------------------------------------------------------------------
// roomtone params
// ---------------------------------------------------------------------------

#[test]
fn cli_params_lists_every_control() {
    let output = roomtone_bin().arg("params").output().unwrap();
    assert!(output.status.success(), "roomtone params failed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Room Parameters"));
    for key in [
        "room_level",
        "room_hf_level",
        "room_rolloff_factor",
        "decay_time",
        "decay_hf_ratio",
        "reflections_level",
        "reflections_delay",
        "reverb_level",
        "reverb_delay",
        "diffusion",
        "density",
        "hf_reference",
        "stereo_width",
        "direct_sound",
    ] {
        assert!(stdout.contains(key), "listing should contain '{key}'");
    }
}

#[test]
fn cli_params_json() {
    let output = roomtone_bin().args(["params", "--json"]).output().unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 14);
    assert_eq!(entries[3]["key"], "decay_time");
    assert_eq!(entries[3]["id"], 3);
    assert_eq!(entries[11]["logarithmic"], true);
    assert_eq!(entries[2]["inert"], true);
}

#[test]
fn cli_params_reads_preset_values() {
    let dir = TempDir::new().unwrap();
    let preset = dir.path().join("hall.toml");
    std::fs::write(&preset, "decay_time = 3.92\ndensity = 100.0\n").unwrap();

    let output = roomtone_bin()
        .args(["params", "--json", "--preset", preset.to_str().unwrap()])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let value = entries[3]["value"].as_f64().unwrap();
    assert!((value - 3.92).abs() < 1e-5);
}

// ---------------------------------------------------------------------------
// roomtone process
// ---------------------------------------------------------------------------

#[test]
fn cli_process_mono_to_stereo_with_tail() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.wav");
    let output = dir.path().join("output.wav");
    write_test_wav(&input, 1, 4800);

    let result = roomtone_bin()
        .args([
            "process",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--param",
            "decay_time=0.5",
            "--param",
            "direct_sound=off",
            "--tail",
            "0.25",
        ])
        .output()
        .unwrap();
    assert!(
        result.status.success(),
        "process failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let reader = hound::WavReader::open(&output).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, 48000);
    assert_eq!(reader.duration(), 4800 + 12000);

    let samples: Vec<f32> = reader.into_samples::<f32>().map(Result::unwrap).collect();
    assert!(samples.iter().all(|s| s.is_finite()));
    assert!(samples.iter().any(|&s| s != 0.0));
}

#[test]
fn cli_process_with_engine_config_and_mono_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.wav");
    let output = dir.path().join("output.wav");
    let config = dir.path().join("engine.toml");
    write_test_wav(&input, 1, 2400);
    std::fs::write(
        &config,
        "filter_memory = \"reset_per_sample\"\n\n[delay_smoothing]\nkind = \"none\"\n",
    )
    .unwrap();

    let result = roomtone_bin()
        .args([
            "process",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--channels",
            "mono",
            "--tail",
            "0",
            "--bit-depth",
            "16",
        ])
        .output()
        .unwrap();
    assert!(
        result.status.success(),
        "process failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let reader = hound::WavReader::open(&output).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.duration(), 2400);
}

#[test]
fn cli_process_rejects_stereo_to_mono() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.wav");
    let output = dir.path().join("output.wav");
    write_test_wav(&input, 2, 480);

    let result = roomtone_bin()
        .args([
            "process",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--channels",
            "mono",
        ])
        .output()
        .unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(
        stderr.contains("unsupported channel configuration"),
        "stderr: {stderr}"
    );
    assert!(!output.exists());
}

#[test]
fn cli_process_rejects_unknown_parameter() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.wav");
    let output = dir.path().join("output.wav");
    write_test_wav(&input, 1, 480);

    let result = roomtone_bin()
        .args([
            "process",
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--param",
            "room_size=0.8",
        ])
        .output()
        .unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("Unknown parameter 'room_size'"), "stderr: {stderr}");
}

#[test]
fn cli_process_rejects_bad_engine_config() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.wav");
    let config = dir.path().join("engine.toml");
    write_test_wav(&input, 1, 480);
    std::fs::write(&config, "max_early_delay_ms = 10.0\n").unwrap();

    let result = roomtone_bin()
        .args([
            "process",
            input.to_str().unwrap(),
            dir.path().join("out.wav").to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("max_early_delay_ms"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// roomtone impulse
// ---------------------------------------------------------------------------

#[test]
fn cli_impulse_renders_requested_length() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("ir.wav");

    let result = roomtone_bin()
        .args([
            "impulse",
            output.to_str().unwrap(),
            "--length",
            "0.5",
            "--sample-rate",
            "44100",
        ])
        .output()
        .unwrap();
    assert!(
        result.status.success(),
        "impulse failed: {}",
        String::from_utf8_lossy(&result.stderr)
    );
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("Rendered 22050 frames"));

    let reader = hound::WavReader::open(&output).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, 44100);
    assert_eq!(reader.duration(), 22050);

    // Direct sound lands on the first frame
    let samples: Vec<f32> = reader.into_samples::<f32>().map(Result::unwrap).collect();
    assert!((samples[0] - 0.35).abs() < 1e-4);
}
