//! Tunables for the render loop.
//!
//! The defaults reproduce the fixed camera the engine has always used; a
//! JSON document may override any subset of fields.

use glam::{Mat4, Vec3};
use serde::Deserialize;

/// Per-frame rendering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    /// RGBA the frame is cleared to.
    pub clear_color: [f32; 4],
    /// Vertical field of view of the cube camera, in degrees.
    pub field_of_view_degrees: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Camera position; the camera looks at the origin with +Y up.
    pub eye: [f32; 3],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.1, 0.1, 0.1, 1.0],
            field_of_view_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            eye: [0.0, 0.0, 3.0],
        }
    }
}

impl RenderConfig {
    /// Parse a (possibly partial) JSON override.
    ///
    /// # Errors
    ///
    /// Returns the parser's error if `json` is not a valid config object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Projection × view × model for a cube rotated `elapsed` radians about
    /// +Y, viewed on a surface of the given aspect ratio.
    #[must_use]
    pub fn model_view_projection(&self, aspect: f32, elapsed: f32) -> Mat4 {
        let projection = Mat4::perspective_rh_gl(
            self.field_of_view_degrees.to_radians(),
            aspect,
            self.near,
            self.far,
        );
        let view = Mat4::look_at_rh(Vec3::from(self.eye), Vec3::ZERO, Vec3::Y);
        let model = Mat4::from_rotation_y(elapsed);
        projection * view * model
    }
}
