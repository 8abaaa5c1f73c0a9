//! Controller settings
//!
//! Every tunable the controller reads lives here as one immutable value
//! handed to [`Controller::new`](crate::sim::Controller::new). Settings load
//! from partial JSON documents (missing fields fall back to defaults) and are
//! validated again when a controller is constructed.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::MAX_SWEEP_SAMPLES;
use crate::sim::contacts::Corner;
use crate::sim::geometry::LayerMask;

/// Errors produced while loading or validating settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which clock drives the tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeSource {
    /// Delta affected by global time scaling (slow-mo, pause)
    #[default]
    Scaled,
    /// Real elapsed time, ignoring time scaling
    Unscaled,
}

impl TimeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeSource::Scaled => "scaled",
            TimeSource::Unscaled => "unscaled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "scaled" => Some(TimeSource::Scaled),
            "unscaled" | "realtime" => Some(TimeSource::Unscaled),
            _ => None,
        }
    }
}

/// Placement of the detection probes around the bounding box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// How far past the box edge a probe reports contact
    pub detection_distance: f32,
    /// Rays per cardinal fan
    pub rays_per_side: u32,
    /// Inset of the cardinal fans from the box corners
    pub ray_inset: f32,
    /// Inset of the outer corner-detector ray from the box corner
    pub corner_outer_inset: f32,
    /// Layers that count as blocking ground
    pub ground_layers: LayerMask,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            detection_distance: 0.1,
            rays_per_side: 3,
            ray_inset: 0.1,
            corner_outer_inset: 0.01,
            ground_layers: LayerMask::GROUND,
        }
    }
}

/// Nudge direction per corner detector, indexed by [`Corner::index`].
///
/// Tuned by feel rather than derived from contact geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerNudges(pub [Vec2; 8]);

impl CornerNudges {
    #[inline]
    pub fn get(&self, corner: Corner) -> Vec2 {
        self.0[corner.index()]
    }

    pub fn set(&mut self, corner: Corner, direction: Vec2) {
        self.0[corner.index()] = direction;
    }
}

impl Default for CornerNudges {
    fn default() -> Self {
        let mut nudges = Self([Vec2::ZERO; 8]);
        // Step up over a low lip
        nudges.set(Corner::LeftBottom, Vec2::Y);
        nudges.set(Corner::RightBottom, Vec2::Y);
        // Slide onto a ledge caught by one foot
        nudges.set(Corner::BottomLeft, Vec2::NEG_X);
        nudges.set(Corner::BottomRight, Vec2::X);
        // Duck under an overhang at head height
        nudges.set(Corner::LeftTop, Vec2::NEG_Y);
        nudges.set(Corner::RightTop, Vec2::NEG_Y);
        // Slip past a ceiling edge grazing one shoulder
        nudges.set(Corner::TopLeft, Vec2::X);
        nudges.set(Corner::TopRight, Vec2::NEG_X);
        nudges
    }
}

/// All controller tunables. Units are world units and seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    // === Run ===
    pub max_run_speed: f32,
    pub run_acceleration: f32,
    pub run_deceleration: f32,

    // === Vertical ===
    pub gravity: f32,
    pub max_fall_speed: f32,
    pub jump_speed: f32,
    /// Vertical velocity multiplier applied once when jump is released early (< 1)
    pub jump_cut_speed_mult: f32,
    /// Gravity multiplier while jump-cutting (> 1)
    pub jump_cut_gravity_mult: f32,

    // === Forgiveness windows ===
    pub jump_buffer_time: f32,
    pub coyote_time: f32,

    // === Apex ===
    /// |vy| at or below this while jumping counts as the apex
    pub apex_speed_threshold: f32,
    /// Gravity multiplier at the apex (< 1, hang time)
    pub apex_gravity_mult: f32,
    /// Extra horizontal acceleration at the apex
    pub apex_bonus_move_speed: f32,

    // === Sweep & correction ===
    /// Intermediate samples when the cheap move is blocked (1 to 1024)
    pub max_check_collider_count: u32,
    pub corner_correction_distance: f32,
    pub corner_nudges: CornerNudges,

    pub probes: ProbeSettings,
    pub time_source: TimeSource,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            max_run_speed: 13.0,
            run_acceleration: 90.0,
            run_deceleration: 60.0,

            gravity: 80.0,
            max_fall_speed: 40.0,
            jump_speed: 30.0,
            jump_cut_speed_mult: 0.5,
            jump_cut_gravity_mult: 2.0,

            jump_buffer_time: 0.1,
            coyote_time: 0.1,

            apex_speed_threshold: 3.0,
            apex_gravity_mult: 0.5,
            apex_bonus_move_speed: 10.0,

            max_check_collider_count: 10,
            corner_correction_distance: 0.1,
            corner_nudges: CornerNudges::default(),

            probes: ProbeSettings::default(),
            time_source: TimeSource::Scaled,
        }
    }
}

impl ControllerSettings {
    /// Parse from JSON (missing fields use defaults) and validate
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would make the controller misbehave
    pub fn validate(&self) -> Result<(), SettingsError> {
        positive("max_run_speed", self.max_run_speed)?;
        non_negative("run_acceleration", self.run_acceleration)?;
        non_negative("run_deceleration", self.run_deceleration)?;
        non_negative("gravity", self.gravity)?;
        positive("max_fall_speed", self.max_fall_speed)?;
        non_negative("jump_speed", self.jump_speed)?;
        in_range("jump_cut_speed_mult", self.jump_cut_speed_mult, 0.0, 1.0)?;
        at_least("jump_cut_gravity_mult", self.jump_cut_gravity_mult, 1.0)?;
        non_negative("jump_buffer_time", self.jump_buffer_time)?;
        non_negative("coyote_time", self.coyote_time)?;
        non_negative("apex_speed_threshold", self.apex_speed_threshold)?;
        in_range("apex_gravity_mult", self.apex_gravity_mult, 0.0, 1.0)?;
        non_negative("apex_bonus_move_speed", self.apex_bonus_move_speed)?;
        if !(1..=MAX_SWEEP_SAMPLES).contains(&self.max_check_collider_count) {
            return Err(SettingsError::Invalid {
                field: "max_check_collider_count",
                reason: format!(
                    "{} must be within [1, {MAX_SWEEP_SAMPLES}]",
                    self.max_check_collider_count
                ),
            });
        }
        non_negative("corner_correction_distance", self.corner_correction_distance)?;
        for corner in Corner::ALL {
            let dir = self.corner_nudges.get(corner);
            if !dir.is_finite() {
                return Err(SettingsError::Invalid {
                    field: "corner_nudges",
                    reason: format!("direction for {corner:?} is not finite"),
                });
            }
        }
        positive("probes.detection_distance", self.probes.detection_distance)?;
        non_negative("probes.ray_inset", self.probes.ray_inset)?;
        non_negative("probes.corner_outer_inset", self.probes.corner_outer_inset)?;
        if self.probes.corner_outer_inset > self.probes.ray_inset {
            return Err(SettingsError::Invalid {
                field: "probes.corner_outer_inset",
                reason: "must not exceed probes.ray_inset".to_string(),
            });
        }
        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            field,
            reason: format!("{value} is not finite"),
        })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), SettingsError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            field,
            reason: format!("{value} must be > 0"),
        })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), SettingsError> {
    at_least(field, value, 0.0)
}

fn at_least(field: &'static str, value: f32, min: f32) -> Result<(), SettingsError> {
    finite(field, value)?;
    if value >= min {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            field,
            reason: format!("{value} must be >= {min}"),
        })
    }
}

fn in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), SettingsError> {
    finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(SettingsError::Invalid {
            field,
            reason: format!("{value} must be within [{min}, {max}]"),
        })
    }
}
