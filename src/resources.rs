//! Creation and release of every GPU object a session owns.
//!
//! Each constructor here releases whatever it already created before it
//! returns an error, and [`SessionResources::dispose`] releases the rest, so
//! every exit path of a session attempt ends with zero live objects.

use crate::error::{SessionError, ShaderStage};
use crate::geometry::GeometryDescriptor;
use crate::gpu::{BufferTarget, Gpu};
use crate::resolve::ResolvedShader;
use crate::shaders::POSITION_ATTRIBUTE;

/// Compile a single shader stage.
///
/// # Errors
///
/// [`SessionError::Allocation`] if the driver refuses to create the object,
/// [`SessionError::Compile`] with the raw info log if compilation fails. In
/// the latter case the shader object has already been deleted.
pub fn compile_stage<G: Gpu>(
    gpu: &G,
    stage: ShaderStage,
    source: &str,
) -> Result<G::Shader, SessionError> {
    let shader = gpu.create_shader(stage).map_err(SessionError::Allocation)?;
    gpu.shader_source(shader, source);
    gpu.compile_shader(shader);

    if !gpu.shader_compile_status(shader) {
        let log = gpu.shader_info_log(shader);
        gpu.delete_shader(shader);
        log::warn!("{stage} shader failed to compile: {log}");
        return Err(SessionError::Compile { stage, log });
    }

    Ok(shader)
}

/// Link two compiled stages into a program.
///
/// Consumes both stage handles: they are detached and deleted on success,
/// and deleted along with the program object on failure.
///
/// # Errors
///
/// [`SessionError::Link`] with the raw info log, or
/// [`SessionError::Allocation`] if no program object could be created.
pub fn link<G: Gpu>(
    gpu: &G,
    vertex: G::Shader,
    fragment: G::Shader,
) -> Result<G::Program, SessionError> {
    let program = match gpu.create_program() {
        Ok(program) => program,
        Err(msg) => {
            gpu.delete_shader(vertex);
            gpu.delete_shader(fragment);
            return Err(SessionError::Allocation(msg));
        }
    };

    gpu.attach_shader(program, vertex);
    gpu.attach_shader(program, fragment);
    gpu.link_program(program);

    if !gpu.program_link_status(program) {
        let log = gpu.program_info_log(program);
        gpu.delete_program(program);
        gpu.delete_shader(vertex);
        gpu.delete_shader(fragment);
        log::warn!("program failed to link: {log}");
        return Err(SessionError::Link { log });
    }

    // Stages are no longer needed once the program is linked.
    gpu.detach_shader(program, vertex);
    gpu.detach_shader(program, fragment);
    gpu.delete_shader(vertex);
    gpu.delete_shader(fragment);

    Ok(program)
}

/// Compile both stages of `shader` and link them.
///
/// # Errors
///
/// Whatever [`compile_stage`] or [`link`] return. The vertex stage is
/// deleted if the fragment stage fails.
pub fn compile_program<G: Gpu>(
    gpu: &G,
    shader: &ResolvedShader,
) -> Result<G::Program, SessionError> {
    let vertex = compile_stage(gpu, ShaderStage::Vertex, &shader.vertex_text)?;
    let fragment = match compile_stage(gpu, ShaderStage::Fragment, &shader.fragment_text) {
        Ok(fragment) => fragment,
        Err(err) => {
            gpu.delete_shader(vertex);
            return Err(err);
        }
    };
    link(gpu, vertex, fragment)
}

/// The vertex array and buffers holding one mesh.
#[derive(Debug)]
pub struct GeometryBinding<G: Gpu> {
    /// The mesh this binding was created from.
    pub descriptor: GeometryDescriptor,
    vao: G::VertexArray,
    vertex_buffer: G::Buffer,
    index_buffer: Option<G::Buffer>,
}

impl<G: Gpu> GeometryBinding<G> {
    /// Bind the vertex array for drawing.
    pub fn bind(&self, gpu: &G) {
        gpu.bind_vertex_array(Some(self.vao));
    }

    fn release(self, gpu: &G) {
        gpu.bind_vertex_array(None);
        gpu.delete_vertex_array(self.vao);
        gpu.delete_buffer(self.vertex_buffer);
        if let Some(ebo) = self.index_buffer {
            gpu.delete_buffer(ebo);
        }
    }
}

/// Upload `descriptor` and wire its position attribute to `program`.
///
/// Leaves the new vertex array bound.
///
/// # Errors
///
/// [`SessionError::Allocation`] if any object cannot be created; objects
/// created before the failure are deleted first.
pub fn bind_geometry<G: Gpu>(
    gpu: &G,
    program: G::Program,
    descriptor: GeometryDescriptor,
) -> Result<GeometryBinding<G>, SessionError> {
    let vao = gpu.create_vertex_array().map_err(SessionError::Allocation)?;
    gpu.bind_vertex_array(Some(vao));

    let vertex_buffer = match gpu.create_buffer() {
        Ok(buffer) => buffer,
        Err(msg) => {
            gpu.bind_vertex_array(None);
            gpu.delete_vertex_array(vao);
            return Err(SessionError::Allocation(msg));
        }
    };
    gpu.bind_buffer(BufferTarget::Array, Some(vertex_buffer));
    gpu.buffer_data(BufferTarget::Array, descriptor.vertex_bytes);

    // Shaders that name their input differently usually pin it to slot 0.
    let location = gpu.attrib_location(program, POSITION_ATTRIBUTE).unwrap_or_else(|| {
        log::debug!("`{POSITION_ATTRIBUTE}` is not an active attribute; using location 0");
        0
    });
    gpu.float_attribute(location, descriptor.components);

    let index_buffer = if descriptor.is_indexed() {
        let ebo = match gpu.create_buffer() {
            Ok(buffer) => buffer,
            Err(msg) => {
                gpu.bind_vertex_array(None);
                gpu.delete_vertex_array(vao);
                gpu.delete_buffer(vertex_buffer);
                return Err(SessionError::Allocation(msg));
            }
        };
        gpu.bind_buffer(BufferTarget::ElementArray, Some(ebo));
        gpu.buffer_data(
            BufferTarget::ElementArray,
            bytemuck::cast_slice(descriptor.indices),
        );
        Some(ebo)
    } else {
        None
    };

    log::debug!(
        "bound {:?} geometry ({} vertices, {} indices)",
        descriptor.kind,
        descriptor.vertex_count,
        descriptor.indices.len()
    );

    Ok(GeometryBinding {
        descriptor,
        vao,
        vertex_buffer,
        index_buffer,
    })
}

/// Every GPU object owned by one session.
///
/// Dropping this without calling [`dispose`](Self::dispose) leaks the
/// objects; the GL context is not reachable from `Drop`.
#[derive(Debug)]
pub struct SessionResources<G: Gpu> {
    program: Option<G::Program>,
    geometry: Option<GeometryBinding<G>>,
}

impl<G: Gpu> SessionResources<G> {
    /// Take ownership of a linked program and its mesh.
    pub fn new(program: G::Program, geometry: GeometryBinding<G>) -> Self {
        Self {
            program: Some(program),
            geometry: Some(geometry),
        }
    }

    /// The linked program, unless disposed.
    #[must_use]
    pub fn program(&self) -> Option<G::Program> {
        self.program
    }

    /// The mesh binding, unless disposed.
    #[must_use]
    pub fn geometry(&self) -> Option<&GeometryBinding<G>> {
        self.geometry.as_ref()
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.program.is_none() && self.geometry.is_none()
    }

    /// Unbind and delete the program, vertex array and buffers.
    ///
    /// Idempotent: a second call finds nothing left to release.
    pub fn dispose(&mut self, gpu: &G) {
        if let Some(program) = self.program.take() {
            gpu.use_program(None);
            gpu.delete_program(program);
        }
        if let Some(geometry) = self.geometry.take() {
            geometry.release(gpu);
        }
    }
}
