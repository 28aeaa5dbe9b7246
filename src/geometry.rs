//! The two fixed meshes a session can draw.
//!
//! Which one is used is decided once, at resolve time, by
//! [`ResolvedShader::requires_model_view_projection`]; nothing else
//! participates.
//!
//! [`ResolvedShader::requires_model_view_projection`]: crate::ResolvedShader::requires_model_view_projection

use crate::types::{v2, v3, Vertex2, Vertex3};

/// Two triangles covering the clip-space square.
static QUAD_VERTICES: [Vertex2; 6] = [
    v2(-1.0, -1.0),
    v2(1.0, -1.0),
    v2(-1.0, 1.0),
    v2(-1.0, 1.0),
    v2(1.0, -1.0),
    v2(1.0, 1.0),
];

/// Unit cube centred on the origin, four vertices per face so faces can
/// carry their own attributes.
static CUBE_VERTICES: [Vertex3; 24] = [
    // front (+z)
    v3(-0.5, -0.5, 0.5),
    v3(0.5, -0.5, 0.5),
    v3(0.5, 0.5, 0.5),
    v3(-0.5, 0.5, 0.5),
    // back (-z)
    v3(-0.5, -0.5, -0.5),
    v3(-0.5, 0.5, -0.5),
    v3(0.5, 0.5, -0.5),
    v3(0.5, -0.5, -0.5),
    // top (+y)
    v3(-0.5, 0.5, -0.5),
    v3(-0.5, 0.5, 0.5),
    v3(0.5, 0.5, 0.5),
    v3(0.5, 0.5, -0.5),
    // bottom (-y)
    v3(-0.5, -0.5, -0.5),
    v3(0.5, -0.5, -0.5),
    v3(0.5, -0.5, 0.5),
    v3(-0.5, -0.5, 0.5),
    // right (+x)
    v3(0.5, -0.5, -0.5),
    v3(0.5, 0.5, -0.5),
    v3(0.5, 0.5, 0.5),
    v3(0.5, -0.5, 0.5),
    // left (-x)
    v3(-0.5, -0.5, -0.5),
    v3(-0.5, -0.5, 0.5),
    v3(-0.5, 0.5, 0.5),
    v3(-0.5, 0.5, -0.5),
];

/// Counter-clockwise when seen from outside the cube.
#[rustfmt::skip]
static CUBE_INDICES: [u16; 36] = [
    0, 1, 2,    0, 2, 3,    // front
    4, 5, 6,    4, 6, 7,    // back
    8, 9, 10,   8, 10, 11,  // top
    12, 13, 14, 12, 14, 15, // bottom
    16, 17, 18, 16, 18, 19, // right
    20, 21, 22, 20, 22, 23, // left
];

/// Which mesh a session draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    /// Full-surface quad, 2-component positions, non-indexed.
    Quad,
    /// Rotating cube, 3-component positions, 36 indices.
    Cube,
}

impl GeometryKind {
    /// Pick the mesh for a shader. `true` means the vertex stage consumes the
    /// model-view-projection matrix.
    #[must_use]
    pub fn select(requires_model_view_projection: bool) -> Self {
        if requires_model_view_projection {
            Self::Cube
        } else {
            Self::Quad
        }
    }

    /// Vertex data, layout, and draw parameters for this mesh.
    #[must_use]
    pub fn descriptor(self) -> GeometryDescriptor {
        match self {
            Self::Quad => GeometryDescriptor {
                kind: self,
                components: 2,
                vertex_count: QUAD_VERTICES.len(),
                vertex_bytes: bytemuck::cast_slice(&QUAD_VERTICES),
                indices: &[],
            },
            Self::Cube => GeometryDescriptor {
                kind: self,
                components: 3,
                vertex_count: CUBE_VERTICES.len(),
                vertex_bytes: bytemuck::cast_slice(&CUBE_VERTICES),
                indices: &CUBE_INDICES,
            },
        }
    }
}

/// Static mesh data ready for upload.
#[derive(Debug, Clone, Copy)]
pub struct GeometryDescriptor {
    /// Which mesh this is.
    pub kind: GeometryKind,
    /// Position components per vertex.
    pub components: i32,
    /// Number of vertices in [`vertex_bytes`](Self::vertex_bytes).
    pub vertex_count: usize,
    /// Tightly packed `f32` positions.
    pub vertex_bytes: &'static [u8],
    /// Triangle-list indices; empty for non-indexed meshes.
    pub indices: &'static [u16],
}

impl GeometryDescriptor {
    /// Whether the mesh is drawn with an element buffer.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        !self.indices.is_empty()
    }

    /// The `count` argument of the draw call: indices if indexed, vertices
    /// otherwise.
    #[must_use]
    pub fn draw_count(&self) -> i32 {
        let count = if self.is_indexed() {
            self.indices.len()
        } else {
            self.vertex_count
        };
        // Both meshes are a few dozen elements.
        i32::try_from(count).unwrap_or(i32::MAX)
    }
}
