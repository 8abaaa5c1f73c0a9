//! Per-tick entry points
//!
//! The host calls [`Controller::integrate`] then
//! [`Controller::apply_last_velocity`] once per frame, or [`Controller::step`]
//! for both. Order within a tick:
//!
//! 1. detect contacts at the current position
//! 2. landing / leaving-ground bookkeeping
//! 3. timers
//! 4. velocity integration (apex, run, gravity, jump, restriction)
//! 5. latch last velocity
//! 6. corner correction + swept move

use serde::{Deserialize, Serialize};

use super::corner::CornerCorrector;
use super::geometry::GeometryQuery;
use super::integrate::{GroundTransition, IntegrateInput, JumpEdges, JumpOutcome, integrate_velocity};
use super::mover::{SweepKind, SweptMover};
use super::state::{Controller, ControllerEvent, Lifecycle, TickPhase};
use crate::sanitize_axis;
use crate::settings::TimeSource;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickInput {
    /// Horizontal axis in [-1, 1]
    pub horizontal: f32,
    /// Jump went down this tick
    pub jump_pressed: bool,
    /// Jump went up this tick
    pub jump_released: bool,
    /// Scaled delta time (seconds)
    pub dt: f32,
    /// Real delta time, ignoring time scaling
    pub unscaled_dt: f32,
}

impl TickInput {
    /// Idle input with both clocks at `dt`
    pub fn with_dt(dt: f32) -> Self {
        Self {
            dt,
            unscaled_dt: dt,
            ..Default::default()
        }
    }

    pub fn delta(&self, source: TimeSource) -> f32 {
        match source {
            TimeSource::Scaled => self.dt,
            TimeSource::Unscaled => self.unscaled_dt,
        }
    }
}

/// Host called the tick halves out of order
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("integrate called twice without apply_last_velocity")]
    MovePending,

    #[error("apply_last_velocity called without a preceding integrate")]
    NothingToApply,
}

/// Why a tick did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Geometry not reported ready yet
    Uninitialized,
    /// Zero, negative or non-finite delta time
    DegenerateDelta,
}

/// Outcome of the integrate half
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    Ran,
    Skipped(SkipReason),
}

impl Controller {
    /// First half of the tick: detect, update timers, integrate velocity
    pub fn integrate<Q: GeometryQuery + ?Sized>(&mut self, input: &TickInput, query: &Q) -> Result<TickStatus, StepError> {
        if matches!(self.phase, TickPhase::MovePending { .. } | TickPhase::SkipPending) {
            log::warn!("integrate called with a move still pending (tick {})", self.tick_count);
            return Err(StepError::MovePending);
        }
        self.events.clear();

        if self.lifecycle == Lifecycle::Uninitialized {
            self.phase = TickPhase::SkipPending;
            return Ok(TickStatus::Skipped(SkipReason::Uninitialized));
        }

        let dt = input.delta(self.settings.time_source);
        if !(dt > 0.0 && dt.is_finite()) {
            log::debug!("Skipping tick {}: degenerate dt {dt}", self.tick_count);
            self.phase = TickPhase::SkipPending;
            return Ok(TickStatus::Skipped(SkipReason::DegenerateDelta));
        }

        let flags = self.probes.detect(query, self.actor.position);
        self.previous_contacts = self.contacts;
        self.contacts = flags;
        match self.jump.on_contacts(flags, self.previous_contacts) {
            GroundTransition::Landed => self.push_event(ControllerEvent::Landed),
            GroundTransition::LeftGround => self.push_event(ControllerEvent::LeftGround),
            GroundTransition::None => {}
        }

        self.timers.update(dt, input.jump_pressed, flags.down(), &self.settings);

        let (velocity, outcome) = integrate_velocity(
            IntegrateInput {
                last_velocity: self.actor.last_velocity,
                horizontal: sanitize_axis(input.horizontal),
                edges: JumpEdges {
                    pressed: input.jump_pressed,
                    released: input.jump_released,
                },
                flags,
                dt,
            },
            &mut self.timers,
            &mut self.jump,
            &self.settings,
        );
        match outcome {
            JumpOutcome::Launched(kind) => self.push_event(ControllerEvent::Jumped(kind)),
            JumpOutcome::Cut => self.push_event(ControllerEvent::JumpCut),
            JumpOutcome::None => {}
        }

        self.actor.velocity = velocity;
        self.actor.last_velocity = velocity;
        self.phase = TickPhase::MovePending { dt };
        self.tick_count += 1;
        Ok(TickStatus::Ran)
    }

    /// Second half of the tick: corner correction and swept move
    pub fn apply_last_velocity<Q: GeometryQuery + ?Sized>(&mut self, query: &Q) -> Result<SweepKind, StepError> {
        let dt = match self.phase {
            TickPhase::Idle => {
                log::warn!("apply_last_velocity called without integrate (tick {})", self.tick_count);
                return Err(StepError::NothingToApply);
            }
            TickPhase::SkipPending => {
                self.phase = TickPhase::Idle;
                return Ok(SweepKind::Skipped);
            }
            TickPhase::MovePending { dt } => dt,
        };
        self.phase = TickPhase::Idle;

        let layers = self.settings.probes.ground_layers;
        let start = self.actor.position;
        let velocity = self.actor.velocity;
        let flags = self.contacts;
        let corrector = CornerCorrector {
            bounds: &self.actor.bounds,
            layers,
            settings: &self.settings,
        };
        let mover = SweptMover {
            bounds: &self.actor.bounds,
            layers,
            max_samples: self.settings.max_check_collider_count,
        };
        let out = mover.resolve(query, start, velocity, dt, || corrector.correct(query, start, velocity, flags));

        self.actor.position = out.position;
        if let Some(fix) = out.correction {
            self.push_event(ControllerEvent::CornerCorrected(fix.corner));
        }
        match out.kind {
            SweepKind::Truncated => {
                self.actor.velocity = out.velocity;
                self.actor.last_velocity = out.velocity;
                self.push_event(ControllerEvent::MoveTruncated);
            }
            SweepKind::Blocked => {
                self.actor.velocity = out.velocity;
                self.actor.last_velocity = out.velocity;
                self.push_event(ControllerEvent::MoveBlocked);
            }
            SweepKind::Clear | SweepKind::Corrected | SweepKind::Skipped => {}
        }
        Ok(out.kind)
    }

    /// Run both halves of one tick
    pub fn step<Q: GeometryQuery + ?Sized>(&mut self, input: &TickInput, query: &Q) -> Result<TickStatus, StepError> {
        let status = self.integrate(input, query)?;
        self.apply_last_velocity(query)?;
        Ok(status)
    }

    fn push_event(&mut self, event: ControllerEvent) {
        log::debug!("tick {}: {:?} at {:?}", self.tick_count, event, self.actor.position);
        self.events.push(event);
    }
}
