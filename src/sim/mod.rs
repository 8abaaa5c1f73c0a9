//! Deterministic controller simulation
//!
//! Everything that moves the actor lives here. This module must stay pure and
//! deterministic:
//! - Explicit tick only (the host owns the loop)
//! - Geometry is injected, never owned
//! - No rendering or platform dependencies

pub mod contacts;
pub mod corner;
pub mod geometry;
pub mod integrate;
pub mod mover;
pub mod probe;
pub mod replay;
pub mod state;
pub mod tick;
pub mod timers;

pub use contacts::{Contact, ContactFlags, Corner, CornerProbe, ProbeLayout};
pub use corner::{Correction, CornerCorrector};
pub use geometry::{GeometryQuery, LayerMask, RayHit, Rect, Solid, StaticGeometry};
pub use integrate::{JumpMode, JumpOutcome, LaunchKind, MotionPhase};
pub use mover::{SweepKind, SweepOutcome, SweptMover};
pub use probe::{Probe, ProbeShape};
pub use replay::InputLog;
pub use state::{Actor, BoundingBox, Controller, ControllerEvent, ControllerSnapshot, Lifecycle};
pub use tick::{SkipReason, StepError, TickInput, TickStatus};
pub use timers::{Countdown, JumpTimers};
