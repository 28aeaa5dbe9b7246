//! Built-in GLSL fallbacks and the uniform/attribute names the engine feeds.
//!
//! The fallbacks target GLSL ES 3.00, the dialect generated shaders are
//! written in, so they run on WebGL2, GLES 3 and desktop GL with
//! `ARB_ES3_compatibility`.

/// Vertex attribute carrying the mesh position.
pub const POSITION_ATTRIBUTE: &str = "a_position";

/// `float`: seconds since the session started rendering.
pub const TIME_UNIFORM: &str = "u_time";

/// `vec2`: surface backing-store size in pixels.
pub const RESOLUTION_UNIFORM: &str = "u_resolution";

/// `mat4`: projection × view × model.
///
/// Its presence in the vertex source is what selects the cube mesh.
pub const MVP_UNIFORM: &str = "u_modelViewProjectionMatrix";

/// Vertex stage used when none is supplied: passes the clip-space position
/// through unchanged.
pub const DEFAULT_VERTEX_SRC: &str = r"#version 300 es
in vec4 a_position;

void main() {
    gl_Position = a_position;
}
";

/// Fragment stage used when neither a fragment nor a combined source is
/// supplied. Cycles colour over time; reads no uniform besides `u_time`.
pub const DEFAULT_FRAGMENT_SRC: &str = r"#version 300 es
precision highp float;

uniform float u_time;

out vec4 frag_color;

void main() {
    frag_color = vec4(
        sin(u_time) * 0.5 + 0.5,
        cos(u_time) * 0.5 + 0.5,
        sin(u_time + 3.14) * 0.5 + 0.5,
        1.0
    );
}
";
