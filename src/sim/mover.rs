//! Swept mover
//!
//! Resolves the integrated velocity into a position update:
//!
//! 1. Test the box at `start + velocity * dt`. Clear: commit (common case).
//! 2. Otherwise take a corner nudge if one is offered and re-test the
//!    furthest point from the nudged origin, once.
//! 3. Otherwise walk `max_samples` evenly spaced points strictly between
//!    origin and furthest, and commit the last clear one before the first
//!    blocked one. Velocity is recomputed from the actual displacement.
//!
//! Samples are discrete: a displacement longer than an obstacle plus the
//! actor box can skip over it entirely. `max_samples` is the
//! precision/cost dial for the blocked case, capped at
//! [`MAX_SWEEP_SAMPLES`].

use glam::Vec2;

use super::corner::Correction;
use super::geometry::{GeometryQuery, LayerMask};
use super::state::BoundingBox;
use crate::consts::MAX_SWEEP_SAMPLES;

/// How the sweep was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    /// Full displacement, no obstruction
    Clear,
    /// Full displacement after a corner nudge
    Corrected,
    /// Stopped at an intermediate sample
    Truncated,
    /// Every sample blocked: no movement
    Blocked,
    /// Degenerate delta time: no movement
    Skipped,
}

/// Result of one sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOutcome {
    pub position: Vec2,
    pub velocity: Vec2,
    pub kind: SweepKind,
    pub correction: Option<Correction>,
}

/// Discrete sweep-and-resolve for one actor's bounding box
#[derive(Debug, Clone, Copy)]
pub struct SweptMover<'a> {
    pub bounds: &'a BoundingBox,
    pub layers: LayerMask,
    pub max_samples: u32,
}

impl SweptMover<'_> {
    #[inline]
    pub fn is_clear<Q: GeometryQuery + ?Sized>(&self, query: &Q, position: Vec2) -> bool {
        !query.overlap_box(self.bounds.center_at(position), self.bounds.size, self.layers)
    }

    /// Move from `start` by `velocity * dt`.
    ///
    /// `nudge` is only consulted when the direct move is blocked.
    pub fn resolve<Q, F>(&self, query: &Q, start: Vec2, velocity: Vec2, dt: f32, nudge: F) -> SweepOutcome
    where
        Q: GeometryQuery + ?Sized,
        F: FnOnce() -> Option<Correction>,
    {
        let velocity = if velocity.is_finite() { velocity } else { Vec2::ZERO };
        if !(dt > 0.0) || !dt.is_finite() {
            return SweepOutcome {
                position: start,
                velocity,
                kind: SweepKind::Skipped,
                correction: None,
            };
        }

        let displacement = velocity * dt;
        let furthest = start + displacement;
        if self.is_clear(query, furthest) {
            return SweepOutcome {
                position: furthest,
                velocity,
                kind: SweepKind::Clear,
                correction: None,
            };
        }

        let mut origin = start;
        let correction = nudge();
        if let Some(fix) = correction {
            let nudged_furthest = fix.position + displacement;
            if self.is_clear(query, nudged_furthest) {
                return SweepOutcome {
                    position: nudged_furthest,
                    velocity,
                    kind: SweepKind::Corrected,
                    correction,
                };
            }
            origin = fix.position;
        }

        let steps = self.max_samples.min(MAX_SWEEP_SAMPLES) + 1;
        let last_clear = (1..steps)
            .map(|i| origin + displacement * (i as f32 / steps as f32))
            .take_while(|&p| self.is_clear(query, p))
            .last();

        match last_clear {
            Some(position) => SweepOutcome {
                position,
                velocity: (position - origin) / dt,
                kind: SweepKind::Truncated,
                correction,
            },
            None => SweepOutcome {
                position: start,
                velocity: Vec2::ZERO,
                kind: SweepKind::Blocked,
                correction: None,
            },
        }
    }
}
