//! Corner correction
//!
//! Axis-aligned discrete sweeps snag on lips and ledge corners that a player
//! would expect to slip past. When a corner detector fired and the actor is
//! moving in a compatible direction, the corrector proposes a small nudge
//! along that corner's configured direction.

use glam::Vec2;

use super::contacts::{ContactFlags, Corner};
use super::geometry::{GeometryQuery, LayerMask};
use super::state::BoundingBox;
use crate::consts::MIN_MOVE_SQ;
use crate::settings::ControllerSettings;

/// Does `corner`'s nudge make sense for this movement?
pub fn applies(corner: Corner, flags: ContactFlags, velocity: Vec2) -> bool {
    match corner {
        Corner::LeftBottom => velocity.x < 0.0 && !flags.left(),
        Corner::RightBottom => velocity.x > 0.0 && !flags.right(),
        Corner::LeftTop => velocity.x < 0.0 && !flags.left() && !flags.down(),
        Corner::RightTop => velocity.x > 0.0 && !flags.right() && !flags.down(),
        Corner::BottomLeft | Corner::BottomRight => velocity.y < 0.0 && !flags.down(),
        Corner::TopLeft | Corner::TopRight => velocity.y > 0.0,
    }
}

/// A nudge the mover may start its sweep from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    pub corner: Corner,
    pub position: Vec2,
}

/// Proposes corner nudges for one actor
#[derive(Debug, Clone, Copy)]
pub struct CornerCorrector<'a> {
    pub bounds: &'a BoundingBox,
    pub layers: LayerMask,
    pub settings: &'a ControllerSettings,
}

impl CornerCorrector<'_> {
    /// First active, applicable corner (in [`Corner::ALL`] order) whose
    /// nudged box is clear. Zero-length directions never nudge.
    pub fn correct<Q: GeometryQuery + ?Sized>(
        &self,
        query: &Q,
        position: Vec2,
        velocity: Vec2,
        flags: ContactFlags,
    ) -> Option<Correction> {
        let distance = self.settings.corner_correction_distance;
        if distance <= 0.0 {
            return None;
        }

        Corner::ALL
            .into_iter()
            .filter(|&corner| flags.corner(corner) && applies(corner, flags, velocity))
            .find_map(|corner| {
                let nudge = self.settings.corner_nudges.get(corner).normalize_or_zero() * distance;
                if nudge.length_squared() <= MIN_MOVE_SQ {
                    return None;
                }
                let nudged = position + nudge;
                let clear = !query.overlap_box(self.bounds.center_at(nudged), self.bounds.size, self.layers);
                clear.then_some(Correction {
                    corner,
                    position: nudged,
                })
            })
    }
}
