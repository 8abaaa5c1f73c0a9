//! Static world geometry and the query capability the controller is given
//!
//! The controller never owns geometry. It asks a [`GeometryQuery`] whether a
//! shape overlaps blocking solids, or where a ray first hits one.
//! [`StaticGeometry`] is the bundled implementation: a flat list of
//! axis-aligned solids, each tagged with a layer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Layer filter for geometry queries (which solids count as blocking)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Matches nothing.
    pub const NONE: Self = Self(0);
    /// Walkable, blocking ground.
    pub const GROUND: Self = Self(1 << 0);
    /// Hazards (spikes etc.) - not blocking for the default probes.
    pub const HAZARD: Self = Self(1 << 1);
    /// Matches everything.
    pub const ALL: Self = Self(u32::MAX);

    #[inline]
    pub fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::GROUND
    }
}

impl std::ops::BitOr for LayerMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Axis-aligned rectangle in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Interior overlap. Rectangles that only share an edge do not overlap,
    /// so an actor resting exactly on a floor is not "inside" it.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Interior overlap with a circle (tangent circles do not overlap)
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        (center - closest).length_squared() < radius * radius
    }

    /// Slab test against a ray with a normalized direction.
    ///
    /// Returns the entry distance and the face normal. A ray starting inside
    /// (or on the boundary of) the rectangle hits at distance 0.
    pub fn ray_intersection(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<(f32, Vec2)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec2::ZERO;

        for axis in 0..2 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1.0e-12 {
                // Parallel to this slab: must already be between its planes
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            if t0 > t_enter {
                t_enter = t0;
                normal = Vec2::ZERO;
                normal[axis] = -d.signum();
            }
            t_exit = t_exit.min(t1);
            if t_enter > t_exit {
                return None;
            }
        }

        if t_exit < 0.0 {
            return None;
        }
        let t = t_enter.max(0.0);
        if t > max_distance {
            return None;
        }
        if t_enter < 0.0 {
            // Started inside: report the surface facing back along the ray
            normal = -dir;
        }
        Some((t, normal))
    }
}

/// Nearest hit of a raycast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    pub distance: f32,
    pub normal: Vec2,
}

/// Read-only geometry queries the controller depends on.
///
/// Implement this for your own world representation (tilemap, BVH, ...) to
/// drive a [`Controller`](super::Controller) from it.
pub trait GeometryQuery {
    /// Does a box centered at `center` overlap any solid on `layers`?
    fn overlap_box(&self, center: Vec2, size: Vec2, layers: LayerMask) -> bool;

    /// Does a circle overlap any solid on `layers`?
    fn overlap_circle(&self, center: Vec2, radius: f32, layers: LayerMask) -> bool;

    /// Nearest hit along `direction` within `max_distance`.
    /// Zero-length directions never hit.
    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, layers: LayerMask) -> Option<RayHit>;
}

/// A blocking solid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub rect: Rect,
    #[serde(default)]
    pub layer: LayerMask,
}

/// Flat set of static axis-aligned solids
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticGeometry {
    solids: Vec<Solid>,
}

impl StaticGeometry {
    pub fn new() -> Self {
        Self { solids: Vec::new() }
    }

    /// Builder-style: add a ground solid spanning `min`..`max`
    pub fn with_ground(mut self, min: Vec2, max: Vec2) -> Self {
        self.push(Rect::new(min, max), LayerMask::GROUND);
        self
    }

    pub fn push(&mut self, rect: Rect, layer: LayerMask) {
        self.solids.push(Solid { rect, layer });
    }

    pub fn solids(&self) -> &[Solid] {
        &self.solids
    }

    pub fn len(&self) -> usize {
        self.solids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    fn filtered(&self, layers: LayerMask) -> impl Iterator<Item = &Solid> {
        self.solids.iter().filter(move |s| s.layer.intersects(layers))
    }
}

impl GeometryQuery for StaticGeometry {
    fn overlap_box(&self, center: Vec2, size: Vec2, layers: LayerMask) -> bool {
        let probe = Rect::from_center_size(center, size);
        self.filtered(layers).any(|s| s.rect.overlaps(&probe))
    }

    fn overlap_circle(&self, center: Vec2, radius: f32, layers: LayerMask) -> bool {
        self.filtered(layers).any(|s| s.rect.overlaps_circle(center, radius))
    }

    fn raycast(&self, origin: Vec2, direction: Vec2, max_distance: f32, layers: LayerMask) -> Option<RayHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec2::ZERO || !(max_distance >= 0.0) {
            return None;
        }

        let mut best: Option<RayHit> = None;
        for solid in self.filtered(layers) {
            if let Some((t, normal)) = solid.rect.ray_intersection(origin, dir, max_distance) {
                if best.map_or(true, |b| t < b.distance) {
                    best = Some(RayHit {
                        point: origin + dir * t,
                        distance: t,
                        normal,
                    });
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> StaticGeometry {
        StaticGeometry::new().with_ground(Vec2::new(-10.0, -1.0), Vec2::new(10.0, 0.0))
    }

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(Vec2::ZERO, Vec2::ONE);
        let touching = Rect::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        let inside = Rect::new(Vec2::splat(0.5), Vec2::splat(1.5));
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
    }

    #[test]
    fn test_box_resting_on_floor_is_clear() {
        let geo = floor();
        assert!(!geo.overlap_box(Vec2::new(0.0, 0.5), Vec2::new(0.8, 1.0), LayerMask::GROUND));
        assert!(geo.overlap_box(Vec2::new(0.0, 0.49), Vec2::new(0.8, 1.0), LayerMask::GROUND));
    }

    #[test]
    fn test_circle_overlap() {
        let geo = floor();
        assert!(geo.overlap_circle(Vec2::new(0.0, 0.25), 0.3, LayerMask::GROUND));
        assert!(!geo.overlap_circle(Vec2::new(0.0, 0.5), 0.3, LayerMask::GROUND));
    }

    #[test]
    fn test_raycast_hits_nearest_face() {
        let geo = floor().with_ground(Vec2::new(-1.0, 2.0), Vec2::new(1.0, 3.0));
        let hit = geo
            .raycast(Vec2::new(0.0, 1.0), Vec2::new(0.0, -1.0), 5.0, LayerMask::GROUND)
            .expect("floor below");
        assert!((hit.distance - 1.0).abs() < 1e-6);
        assert!((hit.point.y - 0.0).abs() < 1e-6);
        assert_eq!(hit.normal, Vec2::new(0.0, 1.0));

        let hit = geo
            .raycast(Vec2::new(0.0, 1.0), Vec2::new(0.0, 1.0), 5.0, LayerMask::GROUND)
            .expect("ceiling above");
        assert!((hit.point.y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_raycast_respects_distance_and_surface_start() {
        let geo = floor();
        assert!(geo.raycast(Vec2::new(0.0, 1.0), Vec2::NEG_Y, 0.5, LayerMask::GROUND).is_none());

        // Starting on the surface counts as a hit at distance 0
        let hit = geo.raycast(Vec2::ZERO, Vec2::NEG_Y, 0.1, LayerMask::GROUND).unwrap();
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn test_raycast_zero_direction_never_hits() {
        let geo = floor();
        assert!(geo.raycast(Vec2::new(0.0, -0.5), Vec2::ZERO, 1.0, LayerMask::GROUND).is_none());
    }

    #[test]
    fn test_layer_filter() {
        let mut geo = StaticGeometry::new();
        geo.push(Rect::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 0.0)), LayerMask::HAZARD);
        assert!(!geo.overlap_box(Vec2::new(0.0, -0.5), Vec2::ONE, LayerMask::GROUND));
        assert!(geo.overlap_box(Vec2::new(0.0, -0.5), Vec2::ONE, LayerMask::GROUND | LayerMask::HAZARD));
        assert!(LayerMask::ALL.contains(LayerMask::HAZARD));
    }
}
