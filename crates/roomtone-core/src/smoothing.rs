//! Control-rate smoothing for zipper-free parameter changes.
//!
//! Macro-parameters arrive from the host once per buffer; gains and tap
//! positions derived from them are smoothed per sample so steps in the
//! control value never reach the output as clicks.
//!
//! ## Smoothing Methods
//!
//! - [`ParameterSmoother`]: one-pole low-pass `y[n] = (1-a)·x[n] + a·y[n-1]`
//!   with `a = 0.999` by default. Starts from zero memory.
//! - [`LinearRamp`]: constant rate of change over a fixed time, used for
//!   delay times where an exponential approach would sweep pitch unevenly.
//! - [`Smoother`]: holds a target and dispatches to one of the above, chosen
//!   at runtime by a [`SmoothingPolicy`].
//!
//! ## Usage
//!
//! ```rust
//! use roomtone_core::ParameterSmoother;
//!
//! let mut smoother = ParameterSmoother::new();
//! // Zero initial memory: the first output is (1 - a) * x.
//! let first = smoother.smooth(1.0);
//! assert!((first - 0.001).abs() < 1e-6);
//! ```

/// Default one-pole coefficient.
pub const DEFAULT_SMOOTHING_COEFFICIENT: f32 = 0.999;

/// One-pole control smoother.
///
/// # Invariants
///
/// - Output is bounded by the extrema of the inputs and the initial memory.
/// - For a held input the output converges monotonically toward it.
#[derive(Debug, Clone, Copy)]
pub struct ParameterSmoother {
    coefficient: f32,
    memory: f32,
}

impl ParameterSmoother {
    /// Create a smoother with the default coefficient and zero memory.
    pub const fn new() -> Self {
        Self::with_coefficient(DEFAULT_SMOOTHING_COEFFICIENT)
    }

    /// Create a smoother with a custom coefficient, clamped to `[0, 1)`.
    ///
    /// `0.0` passes input straight through.
    pub const fn with_coefficient(coefficient: f32) -> Self {
        let coefficient = if coefficient < 0.0 {
            0.0
        } else if coefficient > 0.999_999 {
            0.999_999
        } else {
            coefficient
        };
        Self {
            coefficient,
            memory: 0.0,
        }
    }

    /// Smooth one control sample.
    #[inline]
    pub fn smooth(&mut self, input: f32) -> f32 {
        self.memory = (1.0 - self.coefficient) * input + self.coefficient * self.memory;
        self.memory
    }

    /// Seed the memory so the next outputs start from `value`.
    #[inline]
    pub fn prime(&mut self, value: f32) {
        self.memory = value;
    }

    /// Clear the memory to zero.
    pub fn reset(&mut self) {
        self.memory = 0.0;
    }

    /// Last output value.
    #[inline]
    pub fn value(&self) -> f32 {
        self.memory
    }

    /// The smoothing coefficient `a`.
    pub fn coefficient(&self) -> f32 {
        self.coefficient
    }
}

impl Default for ParameterSmoother {
    fn default() -> Self {
        Self::new()
    }
}

/// A value with linear smoothing (constant rate of change).
///
/// Reaches a new target in exactly `transition_time_ms`, regardless of the
/// size of the step.
#[derive(Debug, Clone)]
pub struct LinearRamp {
    current: f32,
    target: f32,
    increment: f32,
    samples_remaining: u32,
    sample_rate: f32,
    transition_time_ms: f32,
}

impl LinearRamp {
    /// Create a ramp resting at `initial`.
    pub fn new(initial: f32, sample_rate: f32, transition_time_ms: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            increment: 0.0,
            samples_remaining: 0,
            sample_rate,
            transition_time_ms: transition_time_ms.max(0.0),
        }
    }

    /// Start ramping toward `target` from the current value.
    pub fn set_target(&mut self, target: f32) {
        if (target - self.target).abs() < 1e-9 {
            return;
        }

        self.target = target;

        let samples = (self.transition_time_ms / 1000.0 * self.sample_rate) as u32;
        if samples == 0 {
            self.snap(target);
        } else {
            self.increment = (target - self.current) / samples as f32;
            self.samples_remaining = samples;
        }
    }

    /// Jump to `value` with no ramp.
    pub fn snap(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.increment = 0.0;
        self.samples_remaining = 0;
    }

    /// Update sample rate. Takes effect on the next target change.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.increment;
            self.samples_remaining -= 1;
            if self.samples_remaining == 0 {
                self.current = self.target;
            }
        }
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn value(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// `true` once the ramp has reached its target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.samples_remaining == 0
    }
}

/// How a parameter moves toward a new value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SmoothingPolicy {
    /// Jump immediately.
    None,
    /// Constant-rate ramp over `time_ms`.
    Linear {
        /// Ramp duration in milliseconds.
        time_ms: f32,
    },
    /// One-pole low-pass, see [`ParameterSmoother`].
    OnePole {
        /// Smoothing coefficient `a` in `[0, 1)`.
        coefficient: f32,
    },
}

impl SmoothingPolicy {
    /// One-pole smoothing with the default coefficient.
    pub const fn one_pole() -> Self {
        Self::OnePole {
            coefficient: DEFAULT_SMOOTHING_COEFFICIENT,
        }
    }
}

impl Default for SmoothingPolicy {
    fn default() -> Self {
        Self::one_pole()
    }
}

#[derive(Debug, Clone)]
enum SmootherKind {
    Immediate,
    Linear(LinearRamp),
    OnePole(ParameterSmoother),
}

/// A smoothed parameter value driven by a [`SmoothingPolicy`].
///
/// # Example
///
/// ```rust
/// use roomtone_core::{Smoother, SmoothingPolicy};
///
/// let mut delay_ms = Smoother::new(SmoothingPolicy::Linear { time_ms: 10.0 }, 48000.0, 7.0);
/// delay_ms.set_target(20.0);
/// for _ in 0..480 {
///     delay_ms.advance();
/// }
/// assert_eq!(delay_ms.value(), 20.0);
/// ```
#[derive(Debug, Clone)]
pub struct Smoother {
    kind: SmootherKind,
    target: f32,
    current: f32,
}

impl Smoother {
    /// Create a smoother resting at `initial`.
    pub fn new(policy: SmoothingPolicy, sample_rate: f32, initial: f32) -> Self {
        let kind = match policy {
            SmoothingPolicy::None => SmootherKind::Immediate,
            SmoothingPolicy::Linear { time_ms } => {
                SmootherKind::Linear(LinearRamp::new(initial, sample_rate, time_ms))
            }
            SmoothingPolicy::OnePole { coefficient } => {
                let mut s = ParameterSmoother::with_coefficient(coefficient);
                s.prime(initial);
                SmootherKind::OnePole(s)
            }
        };
        Self {
            kind,
            target: initial,
            current: initial,
        }
    }

    /// Set the value the smoother moves toward.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
        if let SmootherKind::Linear(ramp) = &mut self.kind {
            ramp.set_target(target);
        }
    }

    /// Jump to `value` and rest there.
    pub fn snap(&mut self, value: f32) {
        self.target = value;
        self.current = value;
        match &mut self.kind {
            SmootherKind::Immediate => {}
            SmootherKind::Linear(ramp) => ramp.snap(value),
            SmootherKind::OnePole(s) => s.prime(value),
        }
    }

    /// Advance one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current = match &mut self.kind {
            SmootherKind::Immediate => self.target,
            SmootherKind::Linear(ramp) => ramp.advance(),
            SmootherKind::OnePole(s) => s.smooth(self.target),
        };
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn value(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }
}
