//! Geometric probes: stateless shape-vs-geometry tests
//!
//! A probe is a shape placed at an offset from the actor's position. It
//! answers one question per query ("is this touching ground?") and, for ray
//! shapes only, "where?". Probes hold no reference to the actor.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{GeometryQuery, LayerMask};
use crate::debug::DebugShape;

/// Probe shape descriptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProbeShape {
    /// Box centered on the probe origin
    Rect { size: Vec2 },
    /// Circle centered on the probe origin
    Circle { radius: f32 },
    /// Single ray from the probe origin
    Ray { direction: Vec2, distance: f32 },
    /// `count` parallel rays linearly spaced from `start` to `end`
    /// (offsets relative to the probe origin). Ray 0 sits at `start`.
    RayFan {
        direction: Vec2,
        distance: f32,
        start: Vec2,
        end: Vec2,
        count: u32,
    },
}

impl ProbeShape {
    fn kind(&self) -> &'static str {
        match self {
            ProbeShape::Rect { .. } => "rect",
            ProbeShape::Circle { .. } => "circle",
            ProbeShape::Ray { .. } => "ray",
            ProbeShape::RayFan { .. } => "ray fan",
        }
    }
}

/// A shape placed relative to the actor position, filtered to some layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    pub offset: Vec2,
    pub shape: ProbeShape,
    pub layers: LayerMask,
}

impl Probe {
    pub fn rect(offset: Vec2, size: Vec2, layers: LayerMask) -> Self {
        Self {
            offset,
            shape: ProbeShape::Rect { size },
            layers,
        }
    }

    pub fn circle(offset: Vec2, radius: f32, layers: LayerMask) -> Self {
        Self {
            offset,
            shape: ProbeShape::Circle { radius },
            layers,
        }
    }

    pub fn ray(offset: Vec2, direction: Vec2, distance: f32, layers: LayerMask) -> Self {
        Self {
            offset,
            shape: ProbeShape::Ray { direction, distance },
            layers,
        }
    }

    pub fn ray_fan(start: Vec2, end: Vec2, count: u32, direction: Vec2, distance: f32, layers: LayerMask) -> Self {
        Self {
            offset: Vec2::ZERO,
            shape: ProbeShape::RayFan {
                direction,
                distance,
                start,
                end,
                count,
            },
            layers,
        }
    }

    /// World-space ray origins, in sample order (index 0 first)
    pub fn ray_origins(&self, origin: Vec2) -> Vec<Vec2> {
        let base = origin + self.offset;
        match self.shape {
            ProbeShape::Ray { .. } => vec![base],
            ProbeShape::RayFan { start, end, count, .. } => (0..count)
                .map(|i| {
                    let t = if count > 1 { i as f32 / (count - 1) as f32 } else { 0.0 };
                    base + start.lerp(end, t)
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Does this probe, placed at `origin`, touch blocking geometry?
    pub fn is_touching<Q: GeometryQuery + ?Sized>(&self, query: &Q, origin: Vec2) -> bool {
        let center = origin + self.offset;
        match self.shape {
            ProbeShape::Rect { size } => query.overlap_box(center, size, self.layers),
            ProbeShape::Circle { radius } => query.overlap_circle(center, radius, self.layers),
            ProbeShape::Ray { direction, distance } | ProbeShape::RayFan { direction, distance, .. } => self
                .ray_origins(origin)
                .into_iter()
                .any(|o| query.raycast(o, direction, distance, self.layers).is_some()),
        }
    }

    /// Nearest hit point of a ray probe, or `default` when nothing is hit.
    /// For fans the first ray (in sample order) that hits wins.
    ///
    /// # Panics
    ///
    /// Panics when called on a rectangle or circle probe; that is a wiring
    /// bug in the probe layout, not a runtime condition.
    pub fn hit_point<Q: GeometryQuery + ?Sized>(&self, query: &Q, origin: Vec2, default: Vec2) -> Vec2 {
        let (direction, distance) = match self.shape {
            ProbeShape::Ray { direction, distance } | ProbeShape::RayFan { direction, distance, .. } => {
                (direction, distance)
            }
            _ => panic!("hit_point requires a ray probe, got a {} probe", self.shape.kind()),
        };

        self.ray_origins(origin)
            .into_iter()
            .find_map(|o| query.raycast(o, direction, distance, self.layers))
            .map_or(default, |hit| hit.point)
    }

    /// Shapes for debug drawing, placed at `origin`
    pub fn debug_shapes(&self, origin: Vec2) -> Vec<DebugShape> {
        let center = origin + self.offset;
        match self.shape {
            ProbeShape::Rect { size } => vec![DebugShape::Rect { center, size }],
            ProbeShape::Circle { radius } => vec![DebugShape::Circle { center, radius }],
            ProbeShape::Ray { direction, distance } | ProbeShape::RayFan { direction, distance, .. } => {
                let reach = direction.normalize_or_zero() * distance;
                self.ray_origins(origin)
                    .into_iter()
                    .map(|o| DebugShape::Ray { from: o, to: o + reach })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::geometry::StaticGeometry;

    /// Floor under x in [-10, 0], top at y = 0
    fn ledge() -> StaticGeometry {
        StaticGeometry::new().with_ground(Vec2::new(-10.0, -1.0), Vec2::new(0.0, 0.0))
    }

    fn down_fan() -> Probe {
        Probe::ray_fan(
            Vec2::new(-0.3, 0.0),
            Vec2::new(0.3, 0.0),
            3,
            Vec2::NEG_Y,
            0.1,
            LayerMask::GROUND,
        )
    }

    #[test]
    fn test_fan_touches_if_any_ray_hits() {
        let geo = ledge();
        let probe = down_fan();
        // Only ray 0 (x = -0.3 + 0.25) is over the ledge
        assert!(probe.is_touching(&geo, Vec2::new(0.25, 0.05)));
        // Every ray is past the edge
        assert!(!probe.is_touching(&geo, Vec2::new(0.5, 0.05)));
        // Too high
        assert!(!probe.is_touching(&geo, Vec2::new(-1.0, 0.5)));
    }

    #[test]
    fn test_fan_ray_origins_are_interpolated() {
        let probe = down_fan();
        let origins = probe.ray_origins(Vec2::new(1.0, 2.0));
        assert_eq!(origins.len(), 3);
        let expected = [Vec2::new(0.7, 2.0), Vec2::new(1.0, 2.0), Vec2::new(1.3, 2.0)];
        for (got, want) in origins.iter().zip(expected) {
            assert!(got.abs_diff_eq(want, 1e-5), "{got} != {want}");
        }
    }

    #[test]
    fn test_fan_degenerate_counts() {
        let geo = ledge();
        let mut probe = down_fan();
        if let ProbeShape::RayFan { ref mut count, .. } = probe.shape {
            *count = 0;
        }
        assert!(!probe.is_touching(&geo, Vec2::new(-1.0, 0.0)));

        if let ProbeShape::RayFan { ref mut count, .. } = probe.shape {
            *count = 1;
        }
        assert_eq!(probe.ray_origins(Vec2::ZERO), vec![Vec2::new(-0.3, 0.0)]);
    }

    #[test]
    fn test_hit_point_first_ray_wins() {
        // A step under the last ray sits higher than the floor under the first
        let geo = ledge().with_ground(Vec2::new(-0.8, 0.0), Vec2::new(-0.6, 0.05));
        let probe = down_fan();
        let origin = Vec2::new(-0.9, 0.1);
        let point = probe.hit_point(&geo, origin, Vec2::splat(99.0));
        // Ray 0 at x = -1.2 hits the floor at y = 0
        assert!((point.x + 1.2).abs() < 1e-5);
        assert!(point.y.abs() < 1e-5);
    }

    #[test]
    fn test_hit_point_default_on_miss() {
        let geo = ledge();
        let probe = Probe::ray(Vec2::ZERO, Vec2::NEG_Y, 0.1, LayerMask::GROUND);
        let fallback = Vec2::new(-7.0, -7.0);
        assert_eq!(probe.hit_point(&geo, Vec2::new(5.0, 1.0), fallback), fallback);
    }

    #[test]
    #[should_panic(expected = "requires a ray probe")]
    fn test_hit_point_on_rect_panics() {
        let geo = ledge();
        let probe = Probe::rect(Vec2::ZERO, Vec2::ONE, LayerMask::GROUND);
        probe.hit_point(&geo, Vec2::ZERO, Vec2::ZERO);
    }

    #[test]
    fn test_rect_and_circle_probes() {
        let geo = ledge();
        let feet = Probe::rect(Vec2::new(0.0, -0.05), Vec2::new(0.6, 0.2), LayerMask::GROUND);
        assert!(feet.is_touching(&geo, Vec2::new(-1.0, 0.0)));
        assert!(!feet.is_touching(&geo, Vec2::new(-1.0, 0.3)));

        let head = Probe::circle(Vec2::new(0.0, 1.0), 0.2, LayerMask::GROUND);
        assert!(!head.is_touching(&geo, Vec2::new(-1.0, 0.0)));
        assert!(head.is_touching(&geo, Vec2::new(-1.0, -1.1)));
    }

    #[test]
    fn test_probe_ignores_other_layers() {
        let geo = ledge();
        let mut probe = down_fan();
        probe.layers = LayerMask::HAZARD;
        assert!(!probe.is_touching(&geo, Vec2::new(-1.0, 0.0)));
    }
}
