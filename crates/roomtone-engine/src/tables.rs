//! Tuning tables.
//!
//! Delay lengths are mutually prime in milliseconds so the modes of the six
//! stages (and of the two channels) do not pile up on common frequencies.
//! Indices are `[channel][stage]`, channel 0 is left.

/// Number of absorbent all-pass stages per channel.
pub const STAGE_COUNT: usize = 6;

/// Stages before the chain delay is inserted.
pub const STAGES_BEFORE_CHAIN_DELAY: usize = 4;

/// Number of early-reflection taps per channel.
pub const EARLY_TAP_COUNT: usize = 5;

/// Largest stable all-pass feedback gain, reached at 100 % diffusion.
pub const MAX_ALLPASS_GAIN: f32 = 0.61803;

/// Stage delays at 100 % density, in milliseconds.
pub const STAGE_DELAYS_MS: [[f32; STAGE_COUNT]; 2] = [
    [127.0, 189.0, 253.0, 303.0, 451.0, 521.0],
    [131.0, 207.0, 269.0, 337.0, 441.0, 513.0],
];

/// Plain delay after stage 4 at 100 % density, in milliseconds.
pub const CHAIN_DELAYS_MS: [f32; 2] = [269.0, 293.0];

/// Output tap weight of each stage in the late chain.
pub const LATE_TAP_GAINS: [f32; STAGE_COUNT] = [1.0; STAGE_COUNT];

/// Position of early taps 2 to 5 as a fraction of the reverb delay, added to
/// the reflections delay.
pub const EARLY_TAP_FRACTIONS: [[f32; EARLY_TAP_COUNT - 1]; 2] =
    [[0.14, 0.20, 0.29, 0.37], [0.11, 0.23, 0.27, 0.39]];

/// Weight of each early tap.
pub const EARLY_TAP_GAINS: [f32; EARLY_TAP_COUNT] = [1.00, 0.97, 0.94, 0.91, 0.88];

/// Delay of the all-pass diffusing the summed early taps, in milliseconds.
pub const EARLY_DIFFUSER_DELAYS_MS: [f32; 2] = [83.0, 97.0];

/// Path length the room-HF input filter is solved for, in milliseconds.
pub const INPUT_FILTER_PATH_MS: f32 = 1000.0;

/// Minimum early-line length: longest reflections delay plus reverb delay,
/// with headroom.
pub const MIN_EARLY_DELAY_MS: f32 = 700.0;

/// Minimum all-pass buffer length: the longest stage delay, with headroom.
pub const MIN_ALLPASS_DELAY_MS: f32 = 600.0;

/// Largest accepted early-line or all-pass buffer length, in milliseconds.
pub const MAX_BUFFER_DELAY_MS: f32 = 10_000.0;

/// Highest sample rate `reset` accepts, in Hz.
pub const MAX_SAMPLE_RATE: f32 = 768_000.0;

/// Gain of the dry signal when direct sound is on.
pub const DIRECT_SOUND_GAIN: f32 = 0.35;

/// Late-level boost applied to mono output at 100 % diffusion, in dB.
pub const MONO_BOOST_DB: f32 = 3.5;

/// RT60 attenuation, in dB.
pub const DECAY_DB: f32 = -60.0;
