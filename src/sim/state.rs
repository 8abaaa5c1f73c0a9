//! Controller state and core types
//!
//! Everything that must persist between ticks for determinism lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::contacts::{ContactFlags, Corner, ProbeLayout};
use super::geometry::Rect;
use super::integrate::{JumpMode, LaunchKind, MotionPhase};
use super::timers::JumpTimers;
use crate::consts::{ACTOR_HEIGHT, ACTOR_WIDTH};
use crate::settings::{ControllerSettings, SettingsError};

/// Axis-aligned box relative to the actor position (the feet)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Box center relative to the actor position
    pub offset: Vec2,
    pub size: Vec2,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            offset: Vec2::new(0.0, ACTOR_HEIGHT * 0.5),
            size: Vec2::new(ACTOR_WIDTH, ACTOR_HEIGHT),
        }
    }
}

impl BoundingBox {
    #[inline]
    pub fn center_at(&self, position: Vec2) -> Vec2 {
        position + self.offset
    }

    #[inline]
    pub fn half_size(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn rect_at(&self, position: Vec2) -> Rect {
        Rect::from_center_size(self.center_at(position), self.size)
    }

    /// Finite offset and a strictly positive, finite size
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.offset.is_finite() {
            return Err(SettingsError::Invalid {
                field: "bounds.offset",
                reason: format!("{} is not finite", self.offset),
            });
        }
        if !self.size.is_finite() || self.size.min_element() <= 0.0 {
            return Err(SettingsError::Invalid {
                field: "bounds.size",
                reason: format!("{} must be finite and > 0 on both axes", self.size),
            });
        }
        Ok(())
    }
}

/// The kinematic body being driven
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub position: Vec2,
    /// Velocity committed by the last move
    pub velocity: Vec2,
    /// Integrated velocity latched once per tick; next tick's starting point
    pub last_velocity: Vec2,
    pub bounds: BoundingBox,
}

impl Actor {
    pub fn new(position: Vec2, bounds: BoundingBox) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            last_velocity: Vec2::ZERO,
            bounds,
        }
    }
}

/// Start-up gate: ticks are skipped until the host reports geometry is ready
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Active,
}

/// Which half of the tick the host called last
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) enum TickPhase {
    /// Ready for `integrate`
    #[default]
    Idle,
    /// Velocity integrated, waiting for `apply_last_velocity`
    MovePending { dt: f32 },
    /// Tick skipped; the matching move is a no-op
    SkipPending,
}

/// Things that happened during a tick (for audio/animation hooks and tests)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerEvent {
    /// Down contact gained
    Landed,
    /// Down contact lost
    LeftGround,
    Jumped(LaunchKind),
    JumpCut,
    /// Move resolved from a nudged origin
    CornerCorrected(Corner),
    /// Move stopped short of the integrated displacement
    MoveTruncated,
    /// No clear sample at all
    MoveBlocked,
}

/// Serializable view of all per-tick state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    pub tick: u64,
    pub actor: Actor,
    pub contacts: ContactFlags,
    pub timers: JumpTimers,
    pub jump: JumpMode,
    pub lifecycle: Lifecycle,
}

/// One platformer character controller
#[derive(Debug, Clone)]
pub struct Controller {
    pub(crate) settings: ControllerSettings,
    pub(crate) probes: ProbeLayout,
    pub(crate) actor: Actor,
    pub(crate) contacts: ContactFlags,
    /// Only used to detect landing / leaving-ground edges
    pub(crate) previous_contacts: ContactFlags,
    pub(crate) timers: JumpTimers,
    pub(crate) jump: JumpMode,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) phase: TickPhase,
    pub(crate) events: Vec<ControllerEvent>,
    pub(crate) tick_count: u64,
}

impl Controller {
    /// Create a controller with the default actor box at `position`.
    /// Fails if the settings do not validate.
    pub fn new(settings: ControllerSettings, position: Vec2) -> Result<Self, SettingsError> {
        Self::with_bounds(settings, position, BoundingBox::default())
    }

    pub fn with_bounds(settings: ControllerSettings, position: Vec2, bounds: BoundingBox) -> Result<Self, SettingsError> {
        settings.validate()?;
        bounds.validate()?;
        let probes = ProbeLayout::from_bounds(&bounds, &settings.probes);
        Ok(Self::assemble(settings, position, bounds, probes))
    }

    /// Use a hand-assembled probe layout instead of the generated one
    pub fn with_probes(
        settings: ControllerSettings,
        position: Vec2,
        bounds: BoundingBox,
        probes: ProbeLayout,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        bounds.validate()?;
        Ok(Self::assemble(settings, position, bounds, probes))
    }

    fn assemble(settings: ControllerSettings, position: Vec2, bounds: BoundingBox, probes: ProbeLayout) -> Self {
        Self {
            settings,
            probes,
            actor: Actor::new(position, bounds),
            contacts: ContactFlags::EMPTY,
            previous_contacts: ContactFlags::EMPTY,
            timers: JumpTimers::default(),
            jump: JumpMode::default(),
            lifecycle: Lifecycle::Uninitialized,
            phase: TickPhase::Idle,
            events: Vec::new(),
            tick_count: 0,
        }
    }

    /// External "geometry ready" signal; ticks run from now on
    pub fn mark_ready(&mut self) {
        if self.lifecycle == Lifecycle::Uninitialized {
            log::info!("Controller active at {:?}", self.actor.position);
        }
        self.lifecycle = Lifecycle::Active;
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn probes(&self) -> &ProbeLayout {
        &self.probes
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn position(&self) -> Vec2 {
        self.actor.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.actor.velocity
    }

    pub fn last_velocity(&self) -> Vec2 {
        self.actor.last_velocity
    }

    pub fn contacts(&self) -> ContactFlags {
        self.contacts
    }

    pub fn timers(&self) -> &JumpTimers {
        &self.timers
    }

    pub fn jump_mode(&self) -> &JumpMode {
        &self.jump
    }

    pub fn is_grounded(&self) -> bool {
        self.contacts.down()
    }

    pub fn motion_phase(&self) -> MotionPhase {
        self.jump.phase(self.contacts.down(), self.actor.last_velocity.y)
    }

    /// Events collected since the last `integrate`
    pub fn events(&self) -> &[ControllerEvent] {
        &self.events
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Teleport the actor (respawn, level load). Clears motion but keeps timers.
    pub fn teleport(&mut self, position: Vec2) {
        self.actor.position = position;
        self.actor.velocity = Vec2::ZERO;
        self.actor.last_velocity = Vec2::ZERO;
        self.phase = TickPhase::Idle;
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            tick: self.tick_count,
            actor: self.actor,
            contacts: self.contacts,
            timers: self.timers,
            jump: self.jump,
            lifecycle: self.lifecycle,
        }
    }

    /// Restore a previously taken snapshot. Settings and probes are kept.
    pub fn restore(&mut self, snapshot: &ControllerSnapshot) {
        self.tick_count = snapshot.tick;
        self.actor = snapshot.actor;
        self.contacts = snapshot.contacts;
        self.previous_contacts = snapshot.contacts;
        self.timers = snapshot.timers;
        self.jump = snapshot.jump;
        self.lifecycle = snapshot.lifecycle;
        self.phase = TickPhase::Idle;
        self.events.clear();
    }
}
