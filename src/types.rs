//! Plain-old-data vertex types uploaded to GPU buffers.

use bytemuck::{Pod, Zeroable};

/// A clip-space position for the full-surface quad.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex2 {
    /// `x`, `y` in clip space.
    pub position: [f32; 2],
}

/// A model-space position for the cube.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex3 {
    /// `x`, `y`, `z` in model space.
    pub position: [f32; 3],
}

/// Shorthand used by the static geometry tables.
pub(crate) const fn v2(x: f32, y: f32) -> Vertex2 {
    Vertex2 { position: [x, y] }
}

/// Shorthand used by the static geometry tables.
pub(crate) const fn v3(x: f32, y: f32, z: f32) -> Vertex3 {
    Vertex3 {
        position: [x, y, z],
    }
}
