//! Vertex types for debug line rendering

use bytemuck::{Pod, Zeroable};

/// 2D line-list vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl DebugVertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Byte stride of one vertex in a packed buffer
    pub const STRIDE: usize = std::mem::size_of::<DebugVertex>();
}

/// Colors per debug category
pub mod colors {
    pub const BOUNDS: [f32; 4] = [0.2, 0.8, 0.4, 1.0];
    pub const PROBE_IDLE: [f32; 4] = [0.4, 0.4, 0.5, 1.0];
    pub const PROBE_HIT: [f32; 4] = [1.0, 0.4, 0.2, 1.0];
    pub const CORNER_IDLE: [f32; 4] = [0.3, 0.3, 0.6, 1.0];
    pub const CORNER_HIT: [f32; 4] = [0.9, 0.85, 0.3, 1.0]; // Gold/yellow
    pub const SOLID: [f32; 4] = [0.4, 0.7, 1.0, 1.0];
    pub const VELOCITY: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_is_tightly_packed() {
        assert_eq!(DebugVertex::STRIDE, 24);
        let verts = [DebugVertex::new(1.0, 2.0, colors::BOUNDS); 2];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 48);
    }
}
