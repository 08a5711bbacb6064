//! Macro-parameters and their control ids.
//!
//! [`ReverbParams`] holds the plain values a host sets; nothing else crosses
//! the engine boundary. Each parameter has a stable numeric [`ControlId`]
//! (the id hosts send with change notifications) and a [`ParamDescriptor`]
//! carrying its range, unit and default.
//!
//! The defaults are the I3DL2 "Generic" environment.

use std::path::Path;

use roomtone_core::{ParamDescriptor, ParamFlags, ParamId};
use serde::{Deserialize, Serialize};

use crate::cook::CookGroups;
use crate::error::{ConfigError, EngineError};

/// Numeric control ids, in host order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ControlId {
    /// Master level of the whole room effect, mB.
    RoomLevel = 0,
    /// High-frequency attenuation at the room input, mB.
    RoomHfLevel = 1,
    /// Distance rolloff factor.
    RoomRolloffFactor = 2,
    /// Broadband RT60, s.
    DecayTime = 3,
    /// Ratio of HF decay time to broadband decay time.
    DecayHfRatio = 4,
    /// Early reflections level, mB.
    ReflectionsLevel = 5,
    /// Delay of the first reflection, s.
    ReflectionsDelay = 6,
    /// Late reverberation level, mB.
    ReverbLevel = 7,
    /// Delay of the late reverberation after the first reflection, s.
    ReverbDelay = 8,
    /// Echo density of the late tail, %.
    Diffusion = 9,
    /// Modal density of the late tail, %.
    Density = 10,
    /// Reference frequency for the HF controls, Hz.
    HfReference = 11,
    /// Stereo width, %.
    StereoWidth = 12,
    /// Mix in the dry signal.
    DirectSound = 13,
}

impl ControlId {
    /// Every control, in id order.
    pub const ALL: [ControlId; 14] = [
        ControlId::RoomLevel,
        ControlId::RoomHfLevel,
        ControlId::RoomRolloffFactor,
        ControlId::DecayTime,
        ControlId::DecayHfRatio,
        ControlId::ReflectionsLevel,
        ControlId::ReflectionsDelay,
        ControlId::ReverbLevel,
        ControlId::ReverbDelay,
        ControlId::Diffusion,
        ControlId::Density,
        ControlId::HfReference,
        ControlId::StereoWidth,
        ControlId::DirectSound,
    ];

    /// Numeric id.
    pub const fn id(self) -> u32 {
        self as u32
    }

    /// Range, unit and default of this control.
    pub const fn descriptor(self) -> ParamDescriptor {
        let desc = match self {
            ControlId::RoomLevel => {
                ParamDescriptor::millibels("Room Level", "Room", -10000.0, 0.0, -100.0)
            }
            ControlId::RoomHfLevel => {
                ParamDescriptor::millibels("Room HF Level", "Room HF", -10000.0, 0.0, -100.0)
            }
            ControlId::RoomRolloffFactor => {
                ParamDescriptor::factor("Room Rolloff Factor", "Rolloff", 0.0, 10.0, 0.0)
                    .with_flags(ParamFlags::AUTOMATABLE.union(ParamFlags::INERT))
            }
            ControlId::DecayTime => ParamDescriptor::seconds("Decay Time", "Decay", 0.1, 20.0, 1.49),
            ControlId::DecayHfRatio => {
                ParamDescriptor::factor("Decay HF Ratio", "HF Ratio", 0.1, 2.0, 0.83)
            }
            ControlId::ReflectionsLevel => {
                ParamDescriptor::millibels("Reflections Level", "Refl", -10000.0, 1000.0, -2602.0)
            }
            ControlId::ReflectionsDelay => {
                ParamDescriptor::seconds("Reflections Delay", "Refl Dly", 0.0, 0.3, 0.007)
            }
            ControlId::ReverbLevel => {
                ParamDescriptor::millibels("Reverb Level", "Reverb", -10000.0, 2000.0, 200.0)
            }
            ControlId::ReverbDelay => {
                ParamDescriptor::seconds("Reverb Delay", "Rev Dly", 0.0, 0.3, 0.011)
            }
            ControlId::Diffusion => ParamDescriptor::percent("Diffusion", "Diffuse", 100.0),
            ControlId::Density => ParamDescriptor::percent("Density", "Density", 100.0),
            ControlId::HfReference => {
                ParamDescriptor::hertz("HF Reference", "HF Ref", 20.0, 20000.0, 5000.0)
            }
            ControlId::StereoWidth => ParamDescriptor::percent("Stereo Width", "Width", 50.0),
            ControlId::DirectSound => ParamDescriptor::switch("Direct Sound", "Direct", true),
        };
        desc.with_id(ParamId(self as u32), self.key())
    }

    /// Stable textual id, as used in TOML files and on the command line.
    pub const fn key(self) -> &'static str {
        match self {
            ControlId::RoomLevel => "room_level",
            ControlId::RoomHfLevel => "room_hf_level",
            ControlId::RoomRolloffFactor => "room_rolloff_factor",
            ControlId::DecayTime => "decay_time",
            ControlId::DecayHfRatio => "decay_hf_ratio",
            ControlId::ReflectionsLevel => "reflections_level",
            ControlId::ReflectionsDelay => "reflections_delay",
            ControlId::ReverbLevel => "reverb_level",
            ControlId::ReverbDelay => "reverb_delay",
            ControlId::Diffusion => "diffusion",
            ControlId::Density => "density",
            ControlId::HfReference => "hf_reference",
            ControlId::StereoWidth => "stereo_width",
            ControlId::DirectSound => "direct_sound",
        }
    }

    /// Coefficient groups that must be recomputed when this control changes.
    pub const fn dependencies(self) -> CookGroups {
        match self {
            ControlId::RoomLevel | ControlId::ReflectionsLevel | ControlId::ReverbLevel => {
                CookGroups::LEVELS.union(CookGroups::NORMALIZATION)
            }
            ControlId::RoomHfLevel => CookGroups::INPUT_FILTER,
            ControlId::RoomRolloffFactor => CookGroups::NONE,
            ControlId::DecayTime => CookGroups::INPUT_FILTER
                .union(CookGroups::STAGES)
                .union(CookGroups::NORMALIZATION),
            ControlId::DecayHfRatio => CookGroups::STAGES,
            ControlId::ReflectionsDelay | ControlId::ReverbDelay => CookGroups::TAPS,
            ControlId::Diffusion => CookGroups::DIFFUSION.union(CookGroups::NORMALIZATION),
            ControlId::Density => CookGroups::STAGES.union(CookGroups::NORMALIZATION),
            ControlId::HfReference => CookGroups::INPUT_FILTER.union(CookGroups::STAGES),
            ControlId::StereoWidth => CookGroups::WIDTH,
            ControlId::DirectSound => CookGroups::DIRECT,
        }
    }

    /// Look a control up by its textual id or display name.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| {
            let desc = c.descriptor();
            c.key().eq_ignore_ascii_case(key)
                || desc.name.eq_ignore_ascii_case(key)
                || desc.short_name.eq_ignore_ascii_case(key)
        })
    }
}

impl TryFrom<u32> for ControlId {
    type Error = EngineError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .get(id as usize)
            .copied()
            .ok_or(EngineError::UnknownControl(id))
    }
}

/// Plain parameter values.
///
/// Setting a value through [`set`](Self::set) clamps it to the control's
/// range. Values loaded from TOML are clamped by [`clamped`](Self::clamped).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReverbParams {
    /// mB
    pub room_level: f32,
    /// mB
    pub room_hf_level: f32,
    /// Stored and reported; no coefficient depends on it.
    pub room_rolloff_factor: f32,
    /// s
    pub decay_time: f32,
    /// ratio
    pub decay_hf_ratio: f32,
    /// mB
    pub reflections_level: f32,
    /// s
    pub reflections_delay: f32,
    /// mB
    pub reverb_level: f32,
    /// s
    pub reverb_delay: f32,
    /// %
    pub diffusion: f32,
    /// %
    pub density: f32,
    /// Hz
    pub hf_reference: f32,
    /// %
    pub stereo_width: f32,
    /// Dry signal on or off.
    pub direct_sound: bool,
}

impl Default for ReverbParams {
    fn default() -> Self {
        let mut params = Self {
            room_level: 0.0,
            room_hf_level: 0.0,
            room_rolloff_factor: 0.0,
            decay_time: 0.0,
            decay_hf_ratio: 0.0,
            reflections_level: 0.0,
            reflections_delay: 0.0,
            reverb_level: 0.0,
            reverb_delay: 0.0,
            diffusion: 0.0,
            density: 0.0,
            hf_reference: 0.0,
            stereo_width: 0.0,
            direct_sound: false,
        };
        for control in ControlId::ALL {
            params.set(control, control.descriptor().default);
        }
        params
    }
}

impl ReverbParams {
    /// Current plain value of a control. Switches read as 0.0 or 1.0.
    pub fn get(&self, control: ControlId) -> f32 {
        match control {
            ControlId::RoomLevel => self.room_level,
            ControlId::RoomHfLevel => self.room_hf_level,
            ControlId::RoomRolloffFactor => self.room_rolloff_factor,
            ControlId::DecayTime => self.decay_time,
            ControlId::DecayHfRatio => self.decay_hf_ratio,
            ControlId::ReflectionsLevel => self.reflections_level,
            ControlId::ReflectionsDelay => self.reflections_delay,
            ControlId::ReverbLevel => self.reverb_level,
            ControlId::ReverbDelay => self.reverb_delay,
            ControlId::Diffusion => self.diffusion,
            ControlId::Density => self.density,
            ControlId::HfReference => self.hf_reference,
            ControlId::StereoWidth => self.stereo_width,
            ControlId::DirectSound => {
                if self.direct_sound {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Set a control, clamped to its range. Returns the stored value.
    pub fn set(&mut self, control: ControlId, value: f32) -> f32 {
        let value = control.descriptor().clamp(value);
        let slot = match control {
            ControlId::RoomLevel => &mut self.room_level,
            ControlId::RoomHfLevel => &mut self.room_hf_level,
            ControlId::RoomRolloffFactor => &mut self.room_rolloff_factor,
            ControlId::DecayTime => &mut self.decay_time,
            ControlId::DecayHfRatio => &mut self.decay_hf_ratio,
            ControlId::ReflectionsLevel => &mut self.reflections_level,
            ControlId::ReflectionsDelay => &mut self.reflections_delay,
            ControlId::ReverbLevel => &mut self.reverb_level,
            ControlId::ReverbDelay => &mut self.reverb_delay,
            ControlId::Diffusion => &mut self.diffusion,
            ControlId::Density => &mut self.density,
            ControlId::HfReference => &mut self.hf_reference,
            ControlId::StereoWidth => &mut self.stereo_width,
            ControlId::DirectSound => {
                self.direct_sound = value >= 0.5;
                return value;
            }
        };
        *slot = value;
        value
    }

    /// Copy with every value clamped to its range.
    pub fn clamped(&self) -> Self {
        let mut out = self.clone();
        for control in ControlId::ALL {
            out.set(control, self.get(control));
        }
        out
    }

    /// Parse a parameter set from TOML. Missing keys keep their defaults.
    ///
    /// ```rust
    /// use roomtone_engine::ReverbParams;
    ///
    /// let params = ReverbParams::from_toml_str("decay_time = 3.9\ndensity = 250.0").unwrap();
    /// assert_eq!(params.decay_time, 3.9);
    /// assert_eq!(params.density, 100.0);
    /// assert_eq!(params.diffusion, 100.0);
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let params: Self = toml::from_str(content)?;
        Ok(params.clamped())
    }

    /// Load a parameter set from a TOML file.
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
