//! Debug drawing
//!
//! The controller describes what it would like drawn (its box, every probe,
//! its velocity) as [`DebugShape`]s pushed into a [`DebugDraw`] sink. Nothing
//! here feeds back into the simulation. [`LineBatch`] is the bundled sink: it
//! turns shapes into a line-list vertex buffer ready for upload.

pub mod shapes;
pub mod vertex;

use glam::Vec2;

pub use vertex::{DebugVertex, colors};

use crate::sim::contacts::{Contact, Corner};
use crate::sim::geometry::StaticGeometry;
use crate::sim::state::Controller;

/// Primitive the controller can ask to have drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DebugShape {
    Rect { center: Vec2, size: Vec2 },
    Circle { center: Vec2, radius: f32 },
    Ray { from: Vec2, to: Vec2 },
}

/// What a shape represents, so sinks can style it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DebugCategory {
    Bounds,
    Probe { touching: bool },
    CornerProbe { firing: bool },
    Solid,
    Velocity,
}

impl DebugCategory {
    pub fn color(self) -> [f32; 4] {
        match self {
            DebugCategory::Bounds => colors::BOUNDS,
            DebugCategory::Probe { touching: false } => colors::PROBE_IDLE,
            DebugCategory::Probe { touching: true } => colors::PROBE_HIT,
            DebugCategory::CornerProbe { firing: false } => colors::CORNER_IDLE,
            DebugCategory::CornerProbe { firing: true } => colors::CORNER_HIT,
            DebugCategory::Solid => colors::SOLID,
            DebugCategory::Velocity => colors::VELOCITY,
        }
    }
}

/// Receiver for debug shapes
pub trait DebugDraw {
    fn shape(&mut self, shape: DebugShape, category: DebugCategory);
}

/// Collects shapes into a line-list vertex buffer
#[derive(Debug, Clone, Default)]
pub struct LineBatch {
    vertices: Vec<DebugVertex>,
    /// Chords per circle outline
    pub circle_segments: u32,
}

impl LineBatch {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            circle_segments: 16,
        }
    }

    pub fn vertices(&self) -> &[DebugVertex] {
        &self.vertices
    }

    /// Packed bytes for a GPU vertex buffer
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }
}

impl DebugDraw for LineBatch {
    fn shape(&mut self, shape: DebugShape, category: DebugCategory) {
        let color = category.color();
        let verts = match shape {
            DebugShape::Rect { center, size } => shapes::rect_outline(center, size, color),
            DebugShape::Circle { center, radius } => {
                shapes::circle_outline(center, radius, color, self.circle_segments)
            }
            DebugShape::Ray { from, to } => match category {
                DebugCategory::Velocity => shapes::arrow(from, to, color),
                _ => shapes::segment(from, to, color),
            },
        };
        self.vertices.extend(verts);
    }
}

/// Outline every solid of a static geometry set
pub fn draw_geometry<D: DebugDraw + ?Sized>(geometry: &StaticGeometry, sink: &mut D) {
    for solid in geometry.solids() {
        sink.shape(
            DebugShape::Rect {
                center: solid.rect.center(),
                size: solid.rect.size(),
            },
            DebugCategory::Solid,
        );
    }
}

impl Controller {
    /// Draw the bounding box, all probes (colored by last detection) and
    /// the last integrated velocity
    pub fn draw_debug<D: DebugDraw + ?Sized>(&self, sink: &mut D) {
        let actor = self.actor();
        let position = actor.position;
        sink.shape(
            DebugShape::Rect {
                center: actor.bounds.center_at(position),
                size: actor.bounds.size,
            },
            DebugCategory::Bounds,
        );

        let flags = self.contacts();
        for contact in Contact::ALL {
            let category = DebugCategory::Probe {
                touching: flags.has(contact),
            };
            for shape in self.probes().probe(contact).debug_shapes(position) {
                sink.shape(shape, category);
            }
        }
        for corner in Corner::ALL {
            let category = DebugCategory::CornerProbe {
                firing: flags.corner(corner),
            };
            let pair = self.probes().corner_probe(corner);
            for shape in pair.outer.debug_shapes(position).into_iter().chain(pair.inner.debug_shapes(position)) {
                sink.shape(shape, category);
            }
        }

        let center = actor.bounds.center_at(position);
        // Scaled to one tenth of a second of travel
        sink.shape(
            DebugShape::Ray {
                from: center,
                to: center + actor.last_velocity * 0.1,
            },
            DebugCategory::Velocity,
        );
    }
}
