//! A safe session engine for running untrusted GLSL on an OpenGL surface via
//! [glow].
//!
//! Shader text arrives from outside (typically a language-model-backed
//! generation service) and changes whenever the user asks for something new.
//! This crate turns each version into a running, animated render session and
//! tears the previous one down first:
//!
//! 1. [`resolve`] fills in missing stages with built-in fallbacks and decides
//!    once whether the vertex stage needs the model-view-projection matrix.
//! 2. The matching mesh is chosen: a full-surface quad, or a rotating cube
//!    when the MVP uniform is used.
//! 3. [`RenderSession`] compiles, links and binds everything, releasing what
//!    it allocated on every failure path.
//! 4. The session draws once per frame callback, uploading `u_time`,
//!    `u_resolution` and `u_modelViewProjectionMatrix` when the program
//!    uses them.
//! 5. [`SessionOrchestrator`] makes sure only one session is ever live per
//!    surface, cancelling the old frame callback and deleting the old
//!    objects before the next shader is compiled.
//!
//! # Hosting
//!
//! The engine is driven by the host's event loop. Wrap the glow context in a
//! [`GlowGpu`], put it in a [`HostSurface`], and pair it with a
//! [`FrameQueue`]. On each redraw, [`drain`](FrameQueue::drain) the queue
//! and pass every request to [`SessionOrchestrator::on_frame`].
//!
//! ```no_run
//! # use std::{sync::Arc, time::Instant};
//! # use shader_session::*;
//! # fn example(gl: Arc<glow::Context>, body: &str) -> Result<(), SessionError> {
//! let gpu = unsafe { GlowGpu::new(gl) };
//! let surface = HostSurface::new(gpu, SurfaceSize::new(800, 600));
//! let config = RenderConfig::default();
//! let mut sessions = SessionOrchestrator::new(surface, FrameQueue::new(), config);
//!
//! sessions.submit(GenerationResult::from_json(body)?, Instant::now())?;
//!
//! // Every redraw:
//! for request in sessions.scheduler_mut().drain() {
//!     sessions.on_frame(request, Instant::now());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Safety
//!
//! [`GlowGpu::new`] is `unsafe`: the context must stay current and valid for
//! as long as the orchestrator using it is alive.
//!
//! [glow]: https://docs.rs/glow

mod config;
mod error;
mod extract;
mod generation;
mod geometry;
mod gpu;
pub mod logging;
mod orchestrator;
mod render;
mod resolve;
mod resources;
mod scheduler;
pub mod shaders;
mod surface;
mod types;

#[cfg(test)]
mod testing;

pub use config::RenderConfig;
pub use error::{SessionError, ShaderStage};
pub use extract::extract_shader_code;
pub use generation::{GenerationResult, ShaderPayload};
pub use geometry::{GeometryDescriptor, GeometryKind};
pub use gpu::{BufferTarget, GlowGpu, Gpu};
pub use orchestrator::{InputChange, SessionOrchestrator};
pub use render::{RenderSession, SessionStatus};
pub use resolve::{resolve, ResolvedShader, ShaderSource};
pub use resources::{
    bind_geometry, compile_program, compile_stage, link, GeometryBinding, SessionResources,
};
pub use scheduler::{FrameQueue, FrameRequest, FrameScheduler};
pub use surface::{HostSurface, Surface, SurfaceSize};
pub use types::{Vertex2, Vertex3};
