//! The narrow slice of OpenGL the session engine needs, and its glow
//! implementation.
//!
//! The engine never talks to [`glow`] directly; it goes through [`Gpu`], so
//! every handle it creates has a matching delete reachable through the same
//! trait object.

use std::fmt;
use std::sync::Arc;

use glow::HasContext;

use crate::error::ShaderStage;

/// Buffer binding points used by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`, vertex data.
    Array,
    /// `GL_ELEMENT_ARRAY_BUFFER`, index data.
    ElementArray,
}

impl BufferTarget {
    fn gl_target(self) -> u32 {
        match self {
            Self::Array => glow::ARRAY_BUFFER,
            Self::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
        }
    }
}

/// Graphics-context operations issued by the engine.
///
/// All methods act on the context's global state. Implementations are
/// expected to be driven from a single thread, the one the context is
/// current on.
pub trait Gpu {
    /// Shader-stage object.
    type Shader: Copy + Eq + fmt::Debug;
    /// Linked program object.
    type Program: Copy + Eq + fmt::Debug;
    /// Vertex array object.
    type VertexArray: Copy + Eq + fmt::Debug;
    /// Buffer object.
    type Buffer: Copy + Eq + fmt::Debug;
    /// Uniform location within a program.
    type UniformLocation: Clone + fmt::Debug;

    /// Create an empty shader object for `stage`.
    ///
    /// # Errors
    ///
    /// Returns the driver's message if no object could be created.
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    /// Replace the shader's source text.
    fn shader_source(&self, shader: Self::Shader, source: &str);
    /// Compile the shader's current source.
    fn compile_shader(&self, shader: Self::Shader);
    /// Whether the last compile succeeded.
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    /// The shader's info log.
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    /// Delete a shader object.
    fn delete_shader(&self, shader: Self::Shader);

    /// Create an empty program object.
    ///
    /// # Errors
    ///
    /// Returns the driver's message if no object could be created.
    fn create_program(&self) -> Result<Self::Program, String>;
    /// Attach a shader to a program.
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Detach a shader from a program.
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    /// Link the program's attached stages.
    fn link_program(&self, program: Self::Program);
    /// Whether the last link succeeded.
    fn program_link_status(&self, program: Self::Program) -> bool;
    /// The program's info log.
    fn program_info_log(&self, program: Self::Program) -> String;
    /// Delete a program object.
    fn delete_program(&self, program: Self::Program);
    /// Make `program` current, or unbind with `None`.
    fn use_program(&self, program: Option<Self::Program>);

    /// Look up an active uniform.
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;
    /// Look up an active vertex attribute.
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    /// Create a vertex array object.
    ///
    /// # Errors
    ///
    /// Returns the driver's message if no object could be created.
    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    /// Bind a vertex array, or unbind with `None`.
    fn bind_vertex_array(&self, vao: Option<Self::VertexArray>);
    /// Delete a vertex array object.
    fn delete_vertex_array(&self, vao: Self::VertexArray);

    /// Create a buffer object.
    ///
    /// # Errors
    ///
    /// Returns the driver's message if no object could be created.
    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    /// Bind a buffer to `target`, or unbind with `None`.
    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>);
    /// Upload static data to the buffer bound at `target`.
    fn buffer_data(&self, target: BufferTarget, data: &[u8]);
    /// Delete a buffer object.
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Enable attribute `index` as tightly packed `f32` components.
    fn float_attribute(&self, index: u32, components: i32);

    /// Enable depth testing and back-face culling, counter-clockwise front.
    fn enable_depth_and_culling(&self);
    /// Set the viewport to `[0, 0, width, height]`.
    fn viewport(&self, width: i32, height: i32);
    /// Clear color and depth buffers.
    fn clear(&self, color: [f32; 4]);

    /// Upload a `float` uniform.
    fn uniform_f32(&self, location: &Self::UniformLocation, value: f32);
    /// Upload a `vec2` uniform.
    fn uniform_vec2(&self, location: &Self::UniformLocation, x: f32, y: f32);
    /// Upload a column-major `mat4` uniform.
    fn uniform_mat4(&self, location: &Self::UniformLocation, matrix: &[f32; 16]);

    /// Draw `count` vertices as a triangle list.
    fn draw_arrays(&self, count: i32);
    /// Draw `count` `u16` indices from the bound element buffer.
    fn draw_elements_u16(&self, count: i32);
}

/// [`Gpu`] over a [`glow`] context.
///
/// Generic over the context type so the same engine runs on native GL and on
/// WebGL2.
pub struct GlowGpu<C: HasContext = glow::Context> {
    gl: Arc<C>,
}

impl<C: HasContext> GlowGpu<C> {
    /// Wrap a glow context.
    ///
    /// # Safety
    ///
    /// The context must be current on the calling thread and must stay
    /// current and valid for as long as this value (or any session created
    /// through it) is alive.
    pub unsafe fn new(gl: Arc<C>) -> Self {
        Self { gl }
    }

    /// The wrapped context.
    #[must_use]
    pub fn context(&self) -> &Arc<C> {
        &self.gl
    }
}

// SAFETY (whole impl): `GlowGpu::new` requires a current, valid context for
// the lifetime of the value, which is every precondition glow's calls have.
impl<C: HasContext> Gpu for GlowGpu<C> {
    type Shader = C::Shader;
    type Program = C::Program;
    type VertexArray = C::VertexArray;
    type Buffer = C::Buffer;
    type UniformLocation = C::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { self.gl.create_shader(stage.gl_kind()) }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.gl.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.gl.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.gl.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.detach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.gl.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.gl.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.gl.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.gl.use_program(program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.gl.get_uniform_location(program, name) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.gl.get_attrib_location(program, name) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { self.gl.create_vertex_array() }
    }

    fn bind_vertex_array(&self, vao: Option<Self::VertexArray>) {
        unsafe { self.gl.bind_vertex_array(vao) }
    }

    fn delete_vertex_array(&self, vao: Self::VertexArray) {
        unsafe { self.gl.delete_vertex_array(vao) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { self.gl.create_buffer() }
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: Option<Self::Buffer>) {
        unsafe { self.gl.bind_buffer(target.gl_target(), buffer) }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(target.gl_target(), data, glow::STATIC_DRAW);
        }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.gl.delete_buffer(buffer) }
    }

    fn float_attribute(&self, index: u32, components: i32) {
        unsafe {
            self.gl.enable_vertex_attrib_array(index);
            // Tightly packed: stride 0 lets GL derive it from `components`.
            self.gl
                .vertex_attrib_pointer_f32(index, components, glow::FLOAT, false, 0, 0);
        }
    }

    fn enable_depth_and_culling(&self) {
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.enable(glow::CULL_FACE);
            self.gl.front_face(glow::CCW);
            self.gl.cull_face(glow::BACK);
        }
    }

    fn viewport(&self, width: i32, height: i32) {
        unsafe { self.gl.viewport(0, 0, width, height) }
    }

    fn clear(&self, [r, g, b, a]: [f32; 4]) {
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }

    fn uniform_f32(&self, location: &Self::UniformLocation, value: f32) {
        unsafe { self.gl.uniform_1_f32(Some(location), value) }
    }

    fn uniform_vec2(&self, location: &Self::UniformLocation, x: f32, y: f32) {
        unsafe { self.gl.uniform_2_f32(Some(location), x, y) }
    }

    fn uniform_mat4(&self, location: &Self::UniformLocation, matrix: &[f32; 16]) {
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(location), false, matrix);
        }
    }

    fn draw_arrays(&self, count: i32) {
        unsafe { self.gl.draw_arrays(glow::TRIANGLES, 0, count) }
    }

    fn draw_elements_u16(&self, count: i32) {
        unsafe {
            self.gl
                .draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_SHORT, 0);
        }
    }
}
