//! Line-list generation for debug primitives
//!
//! Every function emits vertex pairs (one pair per segment).

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::DebugVertex;

fn segment_into(out: &mut Vec<DebugVertex>, a: Vec2, b: Vec2, color: [f32; 4]) {
    out.push(DebugVertex::new(a.x, a.y, color));
    out.push(DebugVertex::new(b.x, b.y, color));
}

/// Single segment
pub fn segment(from: Vec2, to: Vec2, color: [f32; 4]) -> Vec<DebugVertex> {
    let mut vertices = Vec::with_capacity(2);
    segment_into(&mut vertices, from, to, color);
    vertices
}

/// Rectangle outline (four segments)
pub fn rect_outline(center: Vec2, size: Vec2, color: [f32; 4]) -> Vec<DebugVertex> {
    let half = size.abs() * 0.5;
    let corners = [
        center + Vec2::new(-half.x, -half.y),
        center + Vec2::new(half.x, -half.y),
        center + Vec2::new(half.x, half.y),
        center + Vec2::new(-half.x, half.y),
    ];

    let mut vertices = Vec::with_capacity(8);
    for i in 0..4 {
        segment_into(&mut vertices, corners[i], corners[(i + 1) % 4], color);
    }
    vertices
}

/// Circle outline approximated by `segments` chords
pub fn circle_outline(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<DebugVertex> {
    let segments = segments.max(3);
    let mut vertices = Vec::with_capacity((segments * 2) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;
        segment_into(
            &mut vertices,
            center + radius * Vec2::new(theta1.cos(), theta1.sin()),
            center + radius * Vec2::new(theta2.cos(), theta2.sin()),
            color,
        );
    }

    vertices
}

/// Arrow from `from` to `to` with a small head
pub fn arrow(from: Vec2, to: Vec2, color: [f32; 4]) -> Vec<DebugVertex> {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    let head = ((to - from).length() * 0.2).min(0.25);
    let perp = Vec2::new(-dir.y, dir.x);

    let mut vertices = Vec::with_capacity(6);
    segment_into(&mut vertices, from, to, color);
    segment_into(&mut vertices, to, to - dir * head + perp * head * 0.5, color);
    segment_into(&mut vertices, to, to - dir * head - perp * head * 0.5, color);
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [f32; 4] = [1.0; 4];

    #[test]
    fn test_rect_outline_is_closed() {
        let verts = rect_outline(Vec2::new(1.0, 1.0), Vec2::new(2.0, 4.0), WHITE);
        assert_eq!(verts.len(), 8);
        assert_eq!(verts[0].position, [0.0, -1.0]);
        assert_eq!(verts[7].position, verts[0].position);
    }

    #[test]
    fn test_circle_outline_stays_on_radius() {
        let verts = circle_outline(Vec2::new(2.0, -1.0), 0.5, WHITE, 16);
        assert_eq!(verts.len(), 32);
        for v in &verts {
            let p = Vec2::from(v.position);
            assert!(((p - Vec2::new(2.0, -1.0)).length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn test_degenerate_arrow_is_empty() {
        assert!(arrow(Vec2::ONE, Vec2::ONE, WHITE).is_empty());
        assert_eq!(arrow(Vec2::ZERO, Vec2::X, WHITE).len(), 6);
    }
}
