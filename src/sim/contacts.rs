//! Collision state: cardinal contacts and near-corner detectors
//!
//! Once per tick the controller runs every probe of its [`ProbeLayout`] and
//! folds the results into a [`ContactFlags`] bit-set. Flags are a pure
//! function of position and static geometry; nothing else writes them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::GeometryQuery;
use super::probe::Probe;
use super::state::BoundingBox;
use crate::settings::ProbeSettings;

/// Cardinal contact direction
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Contact {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Contact {
    pub const ALL: [Contact; 4] = [Contact::Up, Contact::Down, Contact::Left, Contact::Right];

    #[inline]
    fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

/// Near-corner detector. The first word is the side the probe sits on, the
/// second the end of that side it watches: `LeftBottom` looks left from the
/// bottom of the left side (a low step), `TopLeft` looks up from the left end
/// of the top side (a ceiling lip over the left shoulder).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    LeftBottom = 0,
    RightBottom = 1,
    BottomLeft = 2,
    BottomRight = 3,
    LeftTop = 4,
    RightTop = 5,
    TopLeft = 6,
    TopRight = 7,
}

impl Corner {
    pub const ALL: [Corner; 8] = [
        Corner::LeftBottom,
        Corner::RightBottom,
        Corner::BottomLeft,
        Corner::BottomRight,
        Corner::LeftTop,
        Corner::RightTop,
        Corner::TopLeft,
        Corner::TopRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// The side of the bounding box this detector sits on
    pub fn side(self) -> Contact {
        match self {
            Corner::LeftBottom | Corner::LeftTop => Contact::Left,
            Corner::RightBottom | Corner::RightTop => Contact::Right,
            Corner::BottomLeft | Corner::BottomRight => Contact::Down,
            Corner::TopLeft | Corner::TopRight => Contact::Up,
        }
    }

    #[inline]
    fn bit(self) -> u16 {
        1 << (4 + self as u8)
    }
}

/// Cardinal contacts (bits 0..4) and corner detectors (bits 4..12)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContactFlags(u16);

impl ContactFlags {
    pub const EMPTY: Self = Self(0);

    /// Copy with a cardinal contact set
    #[must_use]
    pub fn with(self, contact: Contact) -> Self {
        Self(self.0 | contact.bit())
    }

    /// Copy with a corner detector set
    #[must_use]
    pub fn with_corner(self, corner: Corner) -> Self {
        Self(self.0 | corner.bit())
    }

    #[inline]
    pub fn has(self, contact: Contact) -> bool {
        self.0 & contact.bit() != 0
    }

    #[inline]
    pub fn corner(self, corner: Corner) -> bool {
        self.0 & corner.bit() != 0
    }

    #[inline]
    pub fn up(self) -> bool {
        self.has(Contact::Up)
    }

    #[inline]
    pub fn down(self) -> bool {
        self.has(Contact::Down)
    }

    #[inline]
    pub fn left(self) -> bool {
        self.has(Contact::Left)
    }

    #[inline]
    pub fn right(self) -> bool {
        self.has(Contact::Right)
    }

    /// A top corner detector fired: the ceiling only grazes a shoulder
    #[inline]
    pub fn ceiling_graze(self) -> bool {
        self.corner(Corner::TopLeft) || self.corner(Corner::TopRight)
    }

    /// Up-contact that actually blocks (a shoulder graze does not)
    #[inline]
    pub fn blocked_above(self) -> bool {
        self.up() && !self.ceiling_graze()
    }
}

/// Paired rays: fires when `outer` hits and `inner` does not
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerProbe {
    pub outer: Probe,
    pub inner: Probe,
}

impl CornerProbe {
    pub fn detect<Q: GeometryQuery + ?Sized>(&self, query: &Q, position: Vec2) -> bool {
        self.outer.is_touching(query, position) && !self.inner.is_touching(query, position)
    }
}

/// Every probe the collision state is built from, in actor-local offsets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeLayout {
    /// Indexed by `Contact as usize`
    pub cardinal: [Probe; 4],
    /// Indexed by `Corner::index`
    pub corners: [CornerProbe; 8],
}

impl ProbeLayout {
    /// Standard layout around a bounding box.
    ///
    /// Cardinal probes are ray fans inset from the box corners by
    /// `ray_inset`, so a lip in the corner sliver is left to the corner
    /// detectors. Each corner pairs an outer ray `corner_outer_inset` from the
    /// corner with an inner ray at `ray_inset`.
    pub fn from_bounds(bounds: &BoundingBox, settings: &ProbeSettings) -> Self {
        let half = bounds.size.abs() * 0.5;
        let c = bounds.offset;
        let (left, right) = (c.x - half.x, c.x + half.x);
        let (bottom, top) = (c.y - half.y, c.y + half.y);

        let layers = settings.ground_layers;
        let dist = settings.detection_distance;
        let count = settings.rays_per_side;
        let inset_x = settings.ray_inset.clamp(0.0, half.x);
        let inset_y = settings.ray_inset.clamp(0.0, half.y);
        let outer_x = settings.corner_outer_inset.clamp(0.0, inset_x);
        let outer_y = settings.corner_outer_inset.clamp(0.0, inset_y);

        let fan = |start: Vec2, end: Vec2, dir: Vec2| Probe::ray_fan(start, end, count, dir, dist, layers);
        let pair = |outer: Vec2, inner: Vec2, dir: Vec2| CornerProbe {
            outer: Probe::ray(outer, dir, dist, layers),
            inner: Probe::ray(inner, dir, dist, layers),
        };

        let cardinal = [
            // Up
            fan(Vec2::new(left + inset_x, top), Vec2::new(right - inset_x, top), Vec2::Y),
            // Down
            fan(Vec2::new(left + inset_x, bottom), Vec2::new(right - inset_x, bottom), Vec2::NEG_Y),
            // Left
            fan(Vec2::new(left, bottom + inset_y), Vec2::new(left, top - inset_y), Vec2::NEG_X),
            // Right
            fan(Vec2::new(right, bottom + inset_y), Vec2::new(right, top - inset_y), Vec2::X),
        ];

        let corners = [
            // LeftBottom
            pair(Vec2::new(left, bottom + outer_y), Vec2::new(left, bottom + inset_y), Vec2::NEG_X),
            // RightBottom
            pair(Vec2::new(right, bottom + outer_y), Vec2::new(right, bottom + inset_y), Vec2::X),
            // BottomLeft
            pair(Vec2::new(left + outer_x, bottom), Vec2::new(left + inset_x, bottom), Vec2::NEG_Y),
            // BottomRight
            pair(Vec2::new(right - outer_x, bottom), Vec2::new(right - inset_x, bottom), Vec2::NEG_Y),
            // LeftTop
            pair(Vec2::new(left, top - outer_y), Vec2::new(left, top - inset_y), Vec2::NEG_X),
            // RightTop
            pair(Vec2::new(right, top - outer_y), Vec2::new(right, top - inset_y), Vec2::X),
            // TopLeft
            pair(Vec2::new(left + outer_x, top), Vec2::new(left + inset_x, top), Vec2::Y),
            // TopRight
            pair(Vec2::new(right - outer_x, top), Vec2::new(right - inset_x, top), Vec2::Y),
        ];

        Self { cardinal, corners }
    }

    #[inline]
    pub fn probe(&self, contact: Contact) -> &Probe {
        &self.cardinal[contact as usize]
    }

    #[inline]
    pub fn corner_probe(&self, corner: Corner) -> &CornerProbe {
        &self.corners[corner.index()]
    }

    /// Run every probe at `position`. Pure: same inputs, same flags.
    pub fn detect<Q: GeometryQuery + ?Sized>(&self, query: &Q, position: Vec2) -> ContactFlags {
        let mut flags = ContactFlags::EMPTY;
        for contact in Contact::ALL {
            if self.probe(contact).is_touching(query, position) {
                flags = flags.with(contact);
            }
        }
        for corner in Corner::ALL {
            if self.corner_probe(corner).detect(query, position) {
                flags = flags.with_corner(corner);
            }
        }
        flags
    }
}
