//! Parameter introspection for hosts that discover controls at runtime.
//!
//! A processor exposes its controls through the [`ParameterInfo`] trait, one
//! [`ParamDescriptor`] per index. Hosts use the descriptors to label
//! controls, clamp incoming values and translate between plain values and the
//! normalized `[0, 1]` range most automation systems speak.
//!
//! # Example
//!
//! ```rust
//! use roomtone_core::{ParameterInfo, ParamDescriptor, ParamId};
//!
//! struct Level {
//!     level_mb: f32,
//! }
//!
//! impl ParameterInfo for Level {
//!     fn param_count(&self) -> usize { 1 }
//!
//!     fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
//!         match index {
//!             0 => Some(ParamDescriptor::millibels("Level", "Level", -10000.0, 0.0, 0.0)
//!                 .with_id(ParamId(0), "level")),
//!             _ => None,
//!         }
//!     }
//!
//!     fn get_param(&self, index: usize) -> f32 {
//!         match index {
//!             0 => self.level_mb,
//!             _ => 0.0,
//!         }
//!     }
//!
//!     fn set_param(&mut self, index: usize, value: f32) {
//!         if let Some(desc) = self.param_info(index) {
//!             self.level_mb = desc.clamp(value);
//!         }
//!     }
//! }
//!
//! let mut level = Level { level_mb: 0.0 };
//! level.set_param(0, -20000.0);
//! assert_eq!(level.get_param(0), -10000.0);
//! ```
//!
//! # no_std Support
//!
//! Fully `no_std` compatible, no heap allocation.

/// Scaling curve for parameter normalization.
///
/// - **Linear**: `normalized = (value - min) / (max - min)`
/// - **Logarithmic**: `normalized = ln(value/min) / ln(max/min)`, requires `min > 0`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamScale {
    /// Equal resolution across the range.
    #[default]
    Linear,
    /// More resolution at low values. Used for frequencies.
    Logarithmic,
}

/// Stable parameter identifier that survives reordering.
///
/// Hosts record automation and presets against this number, so it must never
/// change for a given parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Parameter capability flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Host can automate this parameter.
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Discrete steps (switches, enumerations).
    pub const STEPPED: Self = Self(1 << 1);
    /// Stored and reported but not wired to any processing.
    pub const INERT: Self = Self(1 << 2);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Trait for processors that expose introspectable parameters.
///
/// Parameters are addressed by zero-based index, stable for the lifetime of
/// the instance. Implementations clamp incoming values to the descriptor
/// range and ignore out-of-range indices.
pub trait ParameterInfo {
    /// Number of parameters. Valid indices are `0..param_count()`.
    fn param_count(&self) -> usize;

    /// Descriptor for the parameter at `index`, `None` if out of range.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current plain value of the parameter at `index` (`0.0` if out of range).
    fn get_param(&self, index: usize) -> f32;

    /// Set the plain value of the parameter at `index`, clamped to its range.
    fn set_param(&mut self, index: usize, value: f32);

    /// Find a parameter index by name, short name or string id
    /// (case-insensitive).
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        (0..self.param_count()).find(|&i| {
            self.param_info(i).is_some_and(|desc| {
                desc.name.eq_ignore_ascii_case(name)
                    || desc.short_name.eq_ignore_ascii_case(name)
                    || desc.string_id.eq_ignore_ascii_case(name)
            })
        })
    }

    /// Stable [`ParamId`] of the parameter at `index`.
    fn param_id(&self, index: usize) -> Option<ParamId> {
        self.param_info(index).map(|d| d.id)
    }

    /// Index of the parameter with the given [`ParamId`].
    ///
    /// Scans all parameters; meant for setup paths, not audio.
    fn param_index_by_id(&self, id: ParamId) -> Option<usize> {
        (0..self.param_count()).find(|&i| self.param_info(i).is_some_and(|d| d.id == id))
    }
}

/// Metadata for a single parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full display name.
    pub name: &'static str,
    /// Short name for narrow displays, 8 characters or less.
    pub short_name: &'static str,
    /// Unit used when formatting the value.
    pub unit: ParamUnit,
    /// Minimum plain value.
    pub min: f32,
    /// Maximum plain value.
    pub max: f32,
    /// Value on construction.
    pub default: f32,
    /// Suggested increment for encoder-style control.
    pub step: f32,
    /// Stable numeric identifier.
    pub id: ParamId,
    /// Stable textual identifier used by configuration files and the CLI.
    pub string_id: &'static str,
    /// Normalization curve.
    pub scale: ParamScale,
    /// Capability flags.
    pub flags: ParamFlags,
}

impl ParamDescriptor {
    const fn base(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
        step: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit,
            min,
            max,
            default,
            step,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Linear,
            flags: ParamFlags::AUTOMATABLE,
        }
    }

    /// Level in millibels (hundredths of a decibel).
    pub const fn millibels(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::base(name, short_name, ParamUnit::Millibels, min, max, default, 10.0)
    }

    /// Time in seconds.
    pub const fn seconds(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::base(name, short_name, ParamUnit::Seconds, min, max, default, 0.001)
    }

    /// Percentage, 0 to 100.
    pub const fn percent(name: &'static str, short_name: &'static str, default: f32) -> Self {
        Self::base(name, short_name, ParamUnit::Percent, 0.0, 100.0, default, 1.0)
    }

    /// Frequency in Hz with logarithmic normalization.
    pub const fn hertz(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::base(name, short_name, ParamUnit::Hertz, min, max, default, 1.0)
            .with_scale(ParamScale::Logarithmic)
    }

    /// Dimensionless factor or ratio.
    pub const fn factor(
        name: &'static str,
        short_name: &'static str,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self::base(name, short_name, ParamUnit::None, min, max, default, 0.01)
    }

    /// Two-state switch, 0 = off, 1 = on.
    pub const fn switch(name: &'static str, short_name: &'static str, on: bool) -> Self {
        Self::base(
            name,
            short_name,
            ParamUnit::None,
            0.0,
            1.0,
            if on { 1.0 } else { 0.0 },
            1.0,
        )
        .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED))
    }

    /// Sets the stable numeric and string ids.
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Sets the normalization scale.
    pub const fn with_scale(mut self, scale: ParamScale) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the capability flags.
    pub const fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Clamps a value to the valid range.
    ///
    /// Stepped parameters are also rounded to the nearest step. NaN maps to
    /// the default.
    ///
    /// ```rust
    /// use roomtone_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::percent("Diffusion", "Diffuse", 100.0);
    /// assert_eq!(desc.clamp(150.0), 100.0);
    /// assert_eq!(desc.clamp(f32::NAN), 100.0);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        let value = value.clamp(self.min, self.max);
        if self.flags.contains(ParamFlags::STEPPED) {
            libm::roundf(value)
        } else {
            value
        }
    }

    /// Converts a plain value to `[0, 1]`.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        let value = self.clamp(value);
        match self.scale {
            ParamScale::Linear => (value - self.min) / range,
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return 0.0;
                }
                libm::logf(value / self.min) / libm::logf(self.max / self.min)
            }
        }
    }

    /// Converts a normalized value in `[0, 1]` to the plain range.
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let normalized = if normalized.is_nan() {
            self.normalize(self.default)
        } else {
            normalized.clamp(0.0, 1.0)
        };
        let value = match self.scale {
            ParamScale::Linear => self.min + normalized * (self.max - self.min),
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return self.min;
                }
                self.min * libm::powf(self.max / self.min, normalized)
            }
        };
        self.clamp(value)
    }
}

/// Unit type for parameter display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Millibels (1/100 dB).
    Millibels,
    /// Seconds.
    Seconds,
    /// Hertz.
    Hertz,
    /// Percentage.
    Percent,
    /// Dimensionless.
    None,
}

impl ParamUnit {
    /// Suffix for display.
    ///
    /// ```rust
    /// use roomtone_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Millibels.suffix(), " mB");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Millibels => " mB",
            ParamUnit::Seconds => " s",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Percent => "%",
            ParamUnit::None => "",
        }
    }
}
