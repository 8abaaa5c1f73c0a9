//! Tick Platformer - a deterministic 2D kinematic character controller
//!
//! Core modules:
//! - `sim`: Deterministic per-tick controller (probes, contacts, timers, integration, sweep)
//! - `settings`: Tunable controller configuration (JSON via serde)
//! - `course`: Seeded platform courses for demos and scenario tests
//! - `debug`: Debug-draw hooks for bounding boxes and probe shapes

pub mod course;
pub mod debug;
pub mod settings;
pub mod sim;

pub use settings::{ControllerSettings, SettingsError, TimeSource};
pub use sim::{Controller, GeometryQuery, StaticGeometry, TickInput};

/// Controller configuration constants
pub mod consts {
    /// Fixed simulation timestep used by the demo host (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Movements below this squared length are treated as no movement
    pub const MIN_MOVE_SQ: f32 = 1.0e-10;

    /// Upper bound on intermediate sweep samples
    pub const MAX_SWEEP_SAMPLES: u32 = 1024;

    /// Default actor size (world units)
    pub const ACTOR_WIDTH: f32 = 0.8;
    pub const ACTOR_HEIGHT: f32 = 1.0;
}

/// Move `current` toward `target` by at most `max_delta`, never overshooting
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + delta.signum() * max_delta
    }
}

/// Sanitize a raw input axis into [-1, 1] (non-finite input reads as released)
#[inline]
pub fn sanitize_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
