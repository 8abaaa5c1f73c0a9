//! Seeded platform courses
//!
//! Left-to-right runs of floor separated by pits, decorated with low lips
//! (corner-correction fodder), floating ledges and low ceilings. The same
//! seed always builds the same course.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::geometry::{LayerMask, Rect, StaticGeometry};

/// Floor thickness below y = 0
const FLOOR_DEPTH: f32 = 1.0;
/// Height of a step-up lip
const LIP_HEIGHT: f32 = 0.05;
/// Hazard strip depth inside each pit
const PIT_DEPTH: f32 = 3.0;

/// Shape parameters for generated courses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseConfig {
    /// Floor runs after the spawn run
    pub segments: u32,
    pub min_run: f32,
    pub max_run: f32,
    pub min_gap: f32,
    pub max_gap: f32,
    pub lip_chance: f64,
    pub ledge_chance: f64,
    pub ceiling_chance: f64,
}

impl Default for CourseConfig {
    fn default() -> Self {
        Self {
            segments: 8,
            min_run: 5.0,
            max_run: 12.0,
            min_gap: 1.0,
            max_gap: 3.0,
            lip_chance: 0.4,
            ledge_chance: 0.3,
            ceiling_chance: 0.2,
        }
    }
}

/// A pit between two floor runs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub start: f32,
    pub end: f32,
}

/// Generated course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub seed: u64,
    pub geometry: StaticGeometry,
    /// Actor spawn position (feet)
    pub spawn: Vec2,
    /// Reaching this x finishes the course
    pub finish_x: f32,
    /// Pits in increasing x order
    pub gaps: Vec<Gap>,
}

impl Course {
    pub fn generate(seed: u64, config: &CourseConfig) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut geometry = StaticGeometry::new();
        let mut gaps = Vec::new();

        // Spawn run: flat and undecorated
        let spawn = Vec2::new(-3.0, 0.0);
        let mut x = -6.0;
        let first_end = 2.0;
        geometry.push(floor(x, first_end), LayerMask::GROUND);
        x = first_end;

        for _ in 0..config.segments {
            let gap = rng.random_range(config.min_gap..=config.max_gap);
            gaps.push(Gap { start: x, end: x + gap });
            geometry.push(
                Rect::new(Vec2::new(x, -FLOOR_DEPTH - PIT_DEPTH), Vec2::new(x + gap, -FLOOR_DEPTH)),
                LayerMask::HAZARD,
            );
            x += gap;

            let run = rng.random_range(config.min_run..=config.max_run);
            geometry.push(floor(x, x + run), LayerMask::GROUND);

            if rng.random_bool(config.lip_chance) {
                // Lip over the back half of the run
                geometry.push(
                    Rect::new(Vec2::new(x + run * 0.5, 0.0), Vec2::new(x + run, LIP_HEIGHT)),
                    LayerMask::GROUND,
                );
            }
            if rng.random_bool(config.ledge_chance) {
                let height = rng.random_range(2.0f32..=2.8);
                let width = rng.random_range(1.5f32..=3.0).min(run - 1.0);
                geometry.push(
                    Rect::new(Vec2::new(x + 0.5, height), Vec2::new(x + 0.5 + width, height + 0.3)),
                    LayerMask::GROUND,
                );
            } else if run > 6.0 && rng.random_bool(config.ceiling_chance) {
                // Over the middle of the run so jumps at either end stay clear
                geometry.push(
                    Rect::new(Vec2::new(x + 2.0, 3.6), Vec2::new(x + run - 3.0, 4.0)),
                    LayerMask::GROUND,
                );
            }
            x += run;
        }

        let finish_run = 8.0;
        geometry.push(floor(x, x + finish_run), LayerMask::GROUND);
        let finish_x = x + finish_run - 2.0;

        log::info!(
            "Course {seed}: {} solids, {} gaps, finish at x={finish_x:.1}",
            geometry.len(),
            gaps.len()
        );

        Self {
            seed,
            geometry,
            spawn,
            finish_x,
            gaps,
        }
    }

    pub fn is_finished(&self, position: Vec2) -> bool {
        position.x >= self.finish_x
    }

    /// Distance from `x` to the start of the next pit ahead, if any
    pub fn next_gap_distance(&self, x: f32) -> Option<f32> {
        self.gaps.iter().find(|g| g.end > x).map(|g| (g.start - x).max(0.0))
    }
}

fn floor(from: f32, to: f32) -> Rect {
    Rect::new(Vec2::new(from, -FLOOR_DEPTH), Vec2::new(to, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ControllerSettings;
    use crate::sim::contacts::ProbeLayout;
    use crate::sim::geometry::GeometryQuery;
    use crate::sim::state::BoundingBox;

    #[test]
    fn test_same_seed_same_course() {
        let config = CourseConfig::default();
        assert_eq!(Course::generate(7, &config), Course::generate(7, &config));
        assert_ne!(Course::generate(7, &config).geometry, Course::generate(8, &config).geometry);
    }

    #[test]
    fn test_spawn_is_clear_and_grounded() {
        let settings = ControllerSettings::default();
        let bounds = BoundingBox::default();
        for seed in 0..20 {
            let course = Course::generate(seed, &CourseConfig::default());
            let geo = &course.geometry;
            assert!(!geo.overlap_box(bounds.center_at(course.spawn), bounds.size, LayerMask::GROUND));
            let flags = ProbeLayout::from_bounds(&bounds, &settings.probes).detect(geo, course.spawn);
            assert!(flags.down(), "seed {seed} spawns in the air");
        }
    }

    #[test]
    fn test_pits_are_hazards_not_ground() {
        let course = Course::generate(3, &CourseConfig::default());
        assert_eq!(course.gaps.len(), 8);
        for gap in &course.gaps {
            assert!(gap.end > gap.start);
            let center = Vec2::new((gap.start + gap.end) * 0.5, -2.5);
            let size = Vec2::new(0.2, 0.2);
            assert!(course.geometry.overlap_box(center, size, LayerMask::HAZARD));
            assert!(!course.geometry.overlap_box(center, size, LayerMask::GROUND));
        }
        assert!(course.gaps.windows(2).all(|w| w[0].end < w[1].start));
    }

    #[test]
    fn test_next_gap_distance() {
        let course = Course::generate(11, &CourseConfig::default());
        let first = course.gaps[0];
        assert_eq!(course.next_gap_distance(first.start - 1.5), Some(1.5));
        assert_eq!(course.next_gap_distance(first.start + 0.1), Some(0.0));
        assert_eq!(course.next_gap_distance(course.finish_x), None);
        assert!(!course.is_finished(course.spawn));
        assert!(course.is_finished(Vec2::new(course.finish_x, 0.0)));
    }
}
