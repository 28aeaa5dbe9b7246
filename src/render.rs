//! One render session: a linked program, its mesh, and the frame loop that
//! animates it.
//!
//! A session walks a one-way state machine:
//!
//! ```text
//! Idle -> Compiling -> Linked -> Rendering -> Disposed
//!             |           |
//!             +-----------+-----> Errored
//! ```
//!
//! `Errored` and `Disposed` are terminal. A new shader always gets a new
//! session, never a recycled one.

use std::fmt;
use std::time::Instant;

use crate::config::RenderConfig;
use crate::error::SessionError;
use crate::geometry::GeometryDescriptor;
use crate::gpu::Gpu;
use crate::resolve::ResolvedShader;
use crate::resources::{self, SessionResources};
use crate::scheduler::{FrameRequest, FrameScheduler};
use crate::shaders::{MVP_UNIFORM, RESOLUTION_UNIFORM, TIME_UNIFORM};
use crate::surface::SurfaceSize;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nothing attempted yet.
    Idle,
    /// Stages are being compiled and linked.
    Compiling,
    /// Program linked, geometry bound, no frame scheduled yet.
    Linked,
    /// A frame callback is outstanding.
    Rendering,
    /// Frame callback cancelled and all resources released.
    Disposed,
    /// Compilation, linking or allocation failed.
    Errored,
}

impl SessionStatus {
    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Disposed | Self::Errored)
    }

    fn can_become(self, next: Self) -> bool {
        use SessionStatus::{Compiling, Disposed, Errored, Idle, Linked, Rendering};
        matches!(
            (self, next),
            (Idle, Compiling)
                | (Compiling, Linked | Errored)
                | (Linked, Rendering | Errored | Disposed)
                | (Rendering, Disposed)
        )
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Uniform locations looked up once after linking. A uniform the program
/// does not use is `None` and simply not uploaded.
#[derive(Debug)]
struct FrameUniforms<L> {
    time: Option<L>,
    resolution: Option<L>,
    mvp: Option<L>,
}

/// A compiled shader bound to its mesh and driven by frame callbacks.
///
/// The GL context is not reachable from `Drop`, so a session must be
/// [`dispose`](Self::dispose)d explicitly; the orchestrator does this on
/// every path.
pub struct RenderSession<G: Gpu> {
    resources: SessionResources<G>,
    geometry: GeometryDescriptor,
    uniforms: FrameUniforms<G::UniformLocation>,
    config: RenderConfig,
    status: SessionStatus,
    started_at: Option<Instant>,
    pending: Option<FrameRequest>,
    frames_rendered: u64,
}

impl<G: Gpu> fmt::Debug for RenderSession<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderSession")
            .field("geometry", &self.geometry.kind)
            .field("status", &self.status)
            .field("pending", &self.pending)
            .field("frames_rendered", &self.frames_rendered)
            .finish_non_exhaustive()
    }
}

/// Move `status` along the lifecycle, logging the edge.
fn transition(status: &mut SessionStatus, next: SessionStatus) {
    debug_assert!(
        status.can_become(next),
        "illegal session transition {status} -> {next}"
    );
    log::debug!("session {status} -> {next}");
    *status = next;
}

impl<G: Gpu> RenderSession<G> {
    /// Compile and link `shader`, then upload the mesh it needs.
    ///
    /// On success the session is [`Linked`](SessionStatus::Linked) and owns a
    /// program, a vertex array and its buffers.
    ///
    /// # Errors
    ///
    /// Any compile, link or allocation failure. Everything allocated up to
    /// that point has been released when this returns.
    pub fn create(
        gpu: &G,
        shader: &ResolvedShader,
        config: RenderConfig,
    ) -> Result<Self, SessionError> {
        let mut status = SessionStatus::Idle;
        transition(&mut status, SessionStatus::Compiling);

        let attempt = Self::compile_and_bind(gpu, shader);
        let (program, binding) = match attempt {
            Ok(parts) => parts,
            Err(err) => {
                transition(&mut status, SessionStatus::Errored);
                return Err(err);
            }
        };
        transition(&mut status, SessionStatus::Linked);

        let uniforms = FrameUniforms {
            time: gpu.uniform_location(program, TIME_UNIFORM),
            resolution: gpu.uniform_location(program, RESOLUTION_UNIFORM),
            mvp: gpu.uniform_location(program, MVP_UNIFORM),
        };
        let geometry = binding.descriptor;

        Ok(Self {
            resources: SessionResources::new(program, binding),
            geometry,
            uniforms,
            config,
            status,
            started_at: None,
            pending: None,
            frames_rendered: 0,
        })
    }

    fn compile_and_bind(
        gpu: &G,
        shader: &ResolvedShader,
    ) -> Result<(G::Program, resources::GeometryBinding<G>), SessionError> {
        let program = resources::compile_program(gpu, shader)?;
        gpu.use_program(Some(program));

        match resources::bind_geometry(gpu, program, shader.geometry().descriptor()) {
            Ok(binding) => Ok((program, binding)),
            Err(err) => {
                gpu.use_program(None);
                gpu.delete_program(program);
                Err(err)
            }
        }
    }

    /// Enable depth testing and culling, record the start time and schedule
    /// the first frame.
    ///
    /// Only a [`Linked`](SessionStatus::Linked) session can start; any other
    /// state is left untouched.
    pub fn start(&mut self, gpu: &G, scheduler: &mut impl FrameScheduler, now: Instant) {
        if self.status != SessionStatus::Linked {
            log::warn!("cannot start a session that is {}", self.status);
            return;
        }
        if let Some(binding) = self.resources.geometry() {
            binding.bind(gpu);
        }
        gpu.enable_depth_and_culling();

        self.started_at = Some(now);
        self.pending = Some(scheduler.request_frame());
        transition(&mut self.status, SessionStatus::Rendering);
        log::info!("rendering {:?} geometry", self.geometry.kind);
    }

    /// Run the frame registered as `request`, then schedule the next one.
    ///
    /// Returns `false` (and draws nothing) unless the session is rendering
    /// and `request` is its outstanding callback.
    pub fn render_frame(
        &mut self,
        gpu: &G,
        scheduler: &mut impl FrameScheduler,
        request: FrameRequest,
        size: SurfaceSize,
        now: Instant,
    ) -> bool {
        if self.status != SessionStatus::Rendering || self.pending != Some(request) {
            log::warn!("ignoring stale frame callback {}", request.raw());
            return false;
        }
        let (Some(program), Some(binding)) =
            (self.resources.program(), self.resources.geometry())
        else {
            return false;
        };
        self.pending = None;

        let elapsed = self.elapsed(now);

        gpu.clear(self.config.clear_color);
        gpu.use_program(Some(program));
        binding.bind(gpu);

        if let Some(time) = &self.uniforms.time {
            gpu.uniform_f32(time, elapsed);
        }
        if let Some(resolution) = &self.uniforms.resolution {
            #[expect(clippy::cast_precision_loss)] // surface sizes are far below 2^24
            let (width, height) = (size.width as f32, size.height as f32);
            gpu.uniform_vec2(resolution, width, height);
        }
        if let Some(mvp) = &self.uniforms.mvp {
            let matrix = self.config.model_view_projection(size.aspect(), elapsed);
            gpu.uniform_mat4(mvp, &matrix.to_cols_array());
        }

        if self.geometry.is_indexed() {
            gpu.draw_elements_u16(self.geometry.draw_count());
        } else {
            gpu.draw_arrays(self.geometry.draw_count());
        }

        self.frames_rendered += 1;
        log::trace!("frame {} at {elapsed:.3}s", self.frames_rendered);

        self.pending = Some(scheduler.request_frame());
        true
    }

    /// Cancel the outstanding frame callback, then release every GPU object.
    ///
    /// The order matters: once this returns no scheduled frame can reach the
    /// released handles. Idempotent.
    pub fn dispose(&mut self, gpu: &G, scheduler: &mut impl FrameScheduler) {
        self.cancel_pending(scheduler);
        self.resources.dispose(gpu);
        if !self.status.is_terminal() {
            transition(&mut self.status, SessionStatus::Disposed);
        }
    }

    /// Revoke the outstanding frame callback without touching GPU objects.
    pub fn cancel_pending(&mut self, scheduler: &mut impl FrameScheduler) {
        if let Some(request) = self.pending.take() {
            log::trace!("cancelling frame callback {}", request.raw());
            scheduler.cancel_frame(request);
        }
    }

    /// Seconds since [`start`](Self::start), or zero before it.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> f32 {
        self.started_at
            .map_or(0.0, |start| now.saturating_duration_since(start).as_secs_f32())
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// The mesh being drawn.
    #[must_use]
    pub fn geometry(&self) -> GeometryDescriptor {
        self.geometry
    }

    /// The outstanding frame callback, if any.
    #[must_use]
    pub fn pending_frame(&self) -> Option<FrameRequest> {
        self.pending
    }

    /// Frames drawn so far.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}
