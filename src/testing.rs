//! A recording [`Gpu`] for unit tests.
//!
//! Tracks every live object so tests can assert that an operation leaves
//! nothing behind, and logs the per-frame calls (uniform uploads, draws) so
//! render-loop behaviour can be checked without a driver.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::error::ShaderStage;
use crate::gpu::{BufferTarget, Gpu};
use crate::scheduler::{FrameQueue, FrameRequest, FrameScheduler};
use crate::shaders::MVP_UNIFORM;

/// Fails to compile on the fake backend.
pub const BROKEN_SOURCE: &str = "#version 300 es\nthis is not glsl";

/// A vertex stage that consumes the MVP matrix.
pub const MVP_VERTEX_SRC: &str = r"#version 300 es
in vec3 a_position;
uniform mat4 u_modelViewProjectionMatrix;
void main() {
    gl_Position = u_modelViewProjectionMatrix * vec4(a_position, 1.0);
}
";

/// A fragment-only snippet reading `u_time` and `u_resolution`.
pub const PLASMA_FRAGMENT_SRC: &str = r"#version 300 es
precision highp float;
uniform float u_time;
uniform vec2 u_resolution;
out vec4 frag_color;
void main() {
    vec2 uv = gl_FragCoord.xy / u_resolution;
    frag_color = vec4(uv, sin(u_time) * 0.5 + 0.5, 1.0);
}
";

/// Calls worth asserting on.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(u32),
    CreateProgram(u32),
    DeleteProgram(u32),
    RequestFrame(u64),
    CancelFrame(u64),
    UseProgram(Option<u32>),
    EnableDepthAndCulling,
    Viewport(i32, i32),
    Clear,
    UniformF32(String, f32),
    UniformVec2(String, f32, f32),
    UniformMat4(String, [f32; 16]),
    DrawArrays(i32),
    DrawElements(i32),
}

/// Live object counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Live {
    pub shaders: usize,
    pub programs: usize,
    pub vertex_arrays: usize,
    pub buffers: usize,
}

impl Live {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug)]
struct FakeShader {
    source: String,
    compiled: bool,
}

#[derive(Debug, Default)]
struct FakeProgram {
    attached: Vec<u32>,
    linked_sources: Vec<String>,
    linked: bool,
}

#[derive(Debug, Default)]
pub struct FakeGpu {
    next_id: Cell<u32>,
    shaders: RefCell<HashMap<u32, FakeShader>>,
    programs: RefCell<HashMap<u32, FakeProgram>>,
    vertex_arrays: RefCell<HashSet<u32>>,
    buffers: RefCell<HashSet<u32>>,
    current_program: Cell<Option<u32>>,
    calls: Rc<RefCell<Vec<Call>>>,
    call_count: Cell<usize>,
    link_failure: RefCell<Option<String>>,
    allocations_before_failure: Cell<Option<usize>>,
    double_frees: Cell<usize>,
    dangling_uses: Cell<usize>,
}

impl FakeGpu {
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(1),
            ..Self::default()
        }
    }

    pub fn live(&self) -> Live {
        Live {
            shaders: self.shaders.borrow().len(),
            programs: self.programs.borrow().len(),
            vertex_arrays: self.vertex_arrays.borrow().len(),
            buffers: self.buffers.borrow().len(),
        }
    }

    /// The next link reports failure with `log`.
    pub fn fail_next_link(&self, log: &str) {
        *self.link_failure.borrow_mut() = Some(log.to_owned());
    }

    /// The `create_*` call after the next `successes` ones fails, once.
    pub fn fail_allocation_after(&self, successes: usize) {
        self.allocations_before_failure.set(Some(successes));
    }

    /// A [`FrameQueue`] whose requests and cancellations land in this
    /// backend's call log, so they can be ordered against GL calls.
    pub fn scheduler(&self) -> RecordingScheduler {
        RecordingScheduler {
            queue: FrameQueue::new(),
            calls: Rc::clone(&self.calls),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Total trait calls made, recorded or not.
    pub fn call_count(&self) -> usize {
        self.call_count.get()
    }

    pub fn double_frees(&self) -> usize {
        self.double_frees.get()
    }

    /// Draws or `use_program` calls against a deleted program.
    pub fn dangling_uses(&self) -> usize {
        self.dangling_uses.get()
    }

    /// Values uploaded to the named `float` uniform, in order.
    pub fn f32_uploads(&self, name: &str) -> Vec<f32> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::UniformF32(n, v) if n == name => Some(*v),
                _ => None,
            })
            .collect()
    }

    /// Matrices uploaded to the MVP uniform, in order.
    pub fn mvp_uploads(&self) -> Vec<[f32; 16]> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::UniformMat4(n, m) if n == MVP_UNIFORM => Some(*m),
                _ => None,
            })
            .collect()
    }

    /// Draw calls, in order.
    pub fn draws(&self) -> Vec<Call> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, Call::DrawArrays(_) | Call::DrawElements(_)))
            .cloned()
            .collect()
    }

    fn tick(&self) {
        self.call_count.set(self.call_count.get() + 1);
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn allocate(&self, what: &str) -> Result<u32, String> {
        self.tick();
        match self.allocations_before_failure.get() {
            Some(0) => {
                self.allocations_before_failure.set(None);
                return Err(format!("out of memory creating {what}"));
            }
            Some(n) => self.allocations_before_failure.set(Some(n - 1)),
            None => {}
        }
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Ok(id)
    }

    fn check_current_program(&self) {
        if let Some(program) = self.current_program.get() {
            if !self.programs.borrow().contains_key(&program) {
                self.dangling_uses.set(self.dangling_uses.get() + 1);
            }
        }
    }
}

impl Gpu for FakeGpu {
    type Shader = u32;
    type Program = u32;
    type VertexArray = u32;
    type Buffer = u32;
    type UniformLocation = String;

    fn create_shader(&self, _stage: ShaderStage) -> Result<u32, String> {
        let id = self.allocate("shader")?;
        self.record(Call::CreateShader(id));
        self.shaders.borrow_mut().insert(
            id,
            FakeShader {
                source: String::new(),
                compiled: false,
            },
        );
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.tick();
        if let Some(s) = self.shaders.borrow_mut().get_mut(&shader) {
            source.clone_into(&mut s.source);
        }
    }

    fn compile_shader(&self, shader: u32) {
        self.tick();
        if let Some(s) = self.shaders.borrow_mut().get_mut(&shader) {
            s.compiled = s.source.contains("void main") && !s.source.contains("#error");
        }
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        self.tick();
        self.shaders.borrow().get(&shader).is_some_and(|s| s.compiled)
    }

    fn shader_info_log(&self, _shader: u32) -> String {
        self.tick();
        "ERROR: 0:2: syntax error".to_owned()
    }

    fn delete_shader(&self, shader: u32) {
        self.tick();
        if self.shaders.borrow_mut().remove(&shader).is_none() {
            self.double_frees.set(self.double_frees.get() + 1);
        }
    }

    fn create_program(&self) -> Result<u32, String> {
        let id = self.allocate("program")?;
        self.record(Call::CreateProgram(id));
        self.programs.borrow_mut().insert(id, FakeProgram::default());
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.tick();
        if let Some(p) = self.programs.borrow_mut().get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.tick();
        if let Some(p) = self.programs.borrow_mut().get_mut(&program) {
            p.attached.retain(|&s| s != shader);
        }
    }

    fn link_program(&self, program: u32) {
        self.tick();
        let failure = self.link_failure.borrow().is_some();
        let shaders = self.shaders.borrow();
        if let Some(p) = self.programs.borrow_mut().get_mut(&program) {
            p.linked_sources = p
                .attached
                .iter()
                .filter_map(|id| shaders.get(id))
                .map(|s| s.source.clone())
                .collect();
            p.linked = !failure && p.attached.len() == 2;
        }
    }

    fn program_link_status(&self, program: u32) -> bool {
        self.tick();
        self.programs.borrow().get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, _program: u32) -> String {
        self.tick();
        self.link_failure.borrow_mut().take().unwrap_or_default()
    }

    fn delete_program(&self, program: u32) {
        self.tick();
        self.record(Call::DeleteProgram(program));
        if self.programs.borrow_mut().remove(&program).is_none() {
            self.double_frees.set(self.double_frees.get() + 1);
        }
    }

    fn use_program(&self, program: Option<u32>) {
        self.tick();
        self.record(Call::UseProgram(program));
        self.current_program.set(program);
        self.check_current_program();
    }

    fn uniform_location(&self, program: u32, name: &str) -> Option<String> {
        self.tick();
        let programs = self.programs.borrow();
        let p = programs.get(&program)?;
        p.linked_sources
            .iter()
            .flat_map(|s| s.lines())
            .any(|line| line.contains("uniform") && line.contains(name))
            .then(|| name.to_owned())
    }

    fn attrib_location(&self, program: u32, name: &str) -> Option<u32> {
        self.tick();
        let programs = self.programs.borrow();
        let p = programs.get(&program)?;
        p.linked_sources.iter().any(|s| s.contains(name)).then_some(0)
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let id = self.allocate("vertex array")?;
        self.vertex_arrays.borrow_mut().insert(id);
        Ok(id)
    }

    fn bind_vertex_array(&self, _vao: Option<u32>) {
        self.tick();
    }

    fn delete_vertex_array(&self, vao: u32) {
        self.tick();
        if !self.vertex_arrays.borrow_mut().remove(&vao) {
            self.double_frees.set(self.double_frees.get() + 1);
        }
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let id = self.allocate("buffer")?;
        self.buffers.borrow_mut().insert(id);
        Ok(id)
    }

    fn bind_buffer(&self, _target: BufferTarget, _buffer: Option<u32>) {
        self.tick();
    }

    fn buffer_data(&self, _target: BufferTarget, _data: &[u8]) {
        self.tick();
    }

    fn delete_buffer(&self, buffer: u32) {
        self.tick();
        if !self.buffers.borrow_mut().remove(&buffer) {
            self.double_frees.set(self.double_frees.get() + 1);
        }
    }

    fn float_attribute(&self, _index: u32, _components: i32) {
        self.tick();
    }

    fn enable_depth_and_culling(&self) {
        self.tick();
        self.record(Call::EnableDepthAndCulling);
    }

    fn viewport(&self, width: i32, height: i32) {
        self.tick();
        self.record(Call::Viewport(width, height));
    }

    fn clear(&self, _color: [f32; 4]) {
        self.tick();
        self.record(Call::Clear);
    }

    fn uniform_f32(&self, location: &String, value: f32) {
        self.tick();
        self.record(Call::UniformF32(location.clone(), value));
    }

    fn uniform_vec2(&self, location: &String, x: f32, y: f32) {
        self.tick();
        self.record(Call::UniformVec2(location.clone(), x, y));
    }

    fn uniform_mat4(&self, location: &String, matrix: &[f32; 16]) {
        self.tick();
        self.record(Call::UniformMat4(location.clone(), *matrix));
    }

    fn draw_arrays(&self, count: i32) {
        self.tick();
        self.check_current_program();
        self.record(Call::DrawArrays(count));
    }

    fn draw_elements_u16(&self, count: i32) {
        self.tick();
        self.check_current_program();
        self.record(Call::DrawElements(count));
    }
}

/// A [`FrameQueue`] that logs into a [`FakeGpu`]'s call log.
#[derive(Debug)]
pub struct RecordingScheduler {
    queue: FrameQueue,
    calls: Rc<RefCell<Vec<Call>>>,
}

impl RecordingScheduler {
    pub fn pending(&self) -> usize {
        self.queue.pending()
    }
}

impl FrameScheduler for RecordingScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        let request = self.queue.request_frame();
        self.calls.borrow_mut().push(Call::RequestFrame(request.raw()));
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        self.queue.cancel_frame(request);
        self.calls.borrow_mut().push(Call::CancelFrame(request.raw()));
    }
}
