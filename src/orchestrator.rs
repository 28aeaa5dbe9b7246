//! Owns the single live session of a surface and reacts to input changes.
//!
//! Every change goes through [`SessionOrchestrator::apply`], whose first step
//! is always to dispose the current session. A new session is only compiled
//! after the old one's frame callback is cancelled and its objects deleted,
//! so two sessions never touch the context at once.

use std::time::Instant;

use crate::config::RenderConfig;
use crate::error::SessionError;
use crate::generation::GenerationResult;
use crate::gpu::Gpu;
use crate::render::{RenderSession, SessionStatus};
use crate::resolve::{resolve, ShaderSource};
use crate::scheduler::{FrameRequest, FrameScheduler};
use crate::surface::Surface;

/// An externally observed change.
#[derive(Debug, Clone)]
pub enum InputChange {
    /// A response from the generation service.
    Generated(GenerationResult),
    /// Shader text from any other source.
    Source(ShaderSource),
    /// The view became visible.
    Activate,
    /// The view was hidden. The last shader is kept for reactivation.
    Deactivate,
    /// The surface is going away. Nothing renders afterwards.
    SurfaceRemoved,
}

/// Sequences session creation and disposal for one surface.
pub struct SessionOrchestrator<S: Surface, F: FrameScheduler> {
    surface: S,
    scheduler: F,
    config: RenderConfig,
    active: bool,
    removed: bool,
    input: Option<ShaderSource>,
    session: Option<RenderSession<S::Gpu>>,
    status: SessionStatus,
    last_error: Option<SessionError>,
}

impl<S: Surface, F: FrameScheduler> SessionOrchestrator<S, F> {
    /// An active orchestrator with no shader yet.
    pub fn new(surface: S, scheduler: F, config: RenderConfig) -> Self {
        Self {
            surface,
            scheduler,
            config,
            active: true,
            removed: false,
            input: None,
            session: None,
            status: SessionStatus::Idle,
            last_error: None,
        }
    }

    /// React to `change`.
    ///
    /// Disposes the current session, records the change, and, if the view
    /// is active and has a shader, starts a fresh session. Re-asserting the
    /// current activity state is not a change and leaves the running session
    /// alone.
    ///
    /// # Errors
    ///
    /// The failure of the new attempt: [`SessionError::Upstream`] for a
    /// failed generation result, [`SessionError::ContextUnavailable`],
    /// compile, link or allocation errors. The attempt is left
    /// [`Errored`](SessionStatus::Errored) with nothing allocated.
    pub fn apply(&mut self, change: InputChange, now: Instant) -> Result<(), SessionError> {
        match change {
            InputChange::Activate if self.active => return Ok(()),
            InputChange::Deactivate if !self.active => return Ok(()),
            _ => {}
        }

        self.dispose_current();
        self.last_error = None;

        match change {
            InputChange::Generated(result) => match result.into_source() {
                Ok(source) => self.input = Some(source),
                Err(err) => {
                    self.input = None;
                    return Err(self.fail(err));
                }
            },
            InputChange::Source(source) => self.input = Some(source),
            InputChange::Activate => self.active = true,
            InputChange::Deactivate => self.active = false,
            InputChange::SurfaceRemoved => {
                self.removed = true;
                self.input = None;
            }
        }

        if self.active && !self.removed {
            if let Some(source) = self.input.clone() {
                return self.start(&source, now);
            }
        }
        Ok(())
    }

    /// Shorthand for [`apply`](Self::apply) with [`InputChange::Generated`].
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn submit(&mut self, result: GenerationResult, now: Instant) -> Result<(), SessionError> {
        self.apply(InputChange::Generated(result), now)
    }

    /// Shorthand for [`apply`](Self::apply) with [`InputChange::Source`].
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn submit_source(
        &mut self,
        source: ShaderSource,
        now: Instant,
    ) -> Result<(), SessionError> {
        self.apply(InputChange::Source(source), now)
    }

    /// Shorthand for [`apply`](Self::apply) with [`InputChange::Activate`] or
    /// [`InputChange::Deactivate`].
    ///
    /// # Errors
    ///
    /// See [`apply`](Self::apply).
    pub fn set_active(&mut self, active: bool, now: Instant) -> Result<(), SessionError> {
        let change = if active {
            InputChange::Activate
        } else {
            InputChange::Deactivate
        };
        self.apply(change, now)
    }

    /// Stop rendering for good and release everything. Idempotent.
    pub fn teardown(&mut self) {
        if !self.removed {
            log::debug!("surface removed");
        }
        self.dispose_current();
        self.removed = true;
        self.input = None;
    }

    /// Deliver a frame callback. Returns whether a frame was drawn.
    ///
    /// Callbacks that do not belong to the active session (for example one
    /// the host had already queued before a cancellation) draw nothing.
    pub fn on_frame(&mut self, request: FrameRequest, now: Instant) -> bool {
        let (Some(session), Some(gpu)) = (self.session.as_mut(), self.surface.gpu()) else {
            log::warn!("frame callback {} with no active session", request.raw());
            return false;
        };
        let size = self.surface.backing_size();
        session.render_frame(gpu, &mut self.scheduler, request, size, now)
    }

    fn start(&mut self, source: &ShaderSource, now: Instant) -> Result<(), SessionError> {
        let shader = resolve(source);

        let display = self.surface.display_size();
        self.surface.resize_backing(display);

        let Some(gpu) = self.surface.gpu() else {
            return Err(self.fail(SessionError::ContextUnavailable));
        };
        let (width, height) = display.gl_size();
        gpu.viewport(width, height);

        self.status = SessionStatus::Compiling;
        let mut session = match RenderSession::create(gpu, &shader, self.config) {
            Ok(session) => session,
            Err(err) => return Err(self.fail(err)),
        };
        session.start(gpu, &mut self.scheduler, now);

        self.status = session.status();
        self.session = Some(session);
        Ok(())
    }

    /// Cancel the current session's frame and release its objects.
    fn dispose_current(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        match self.surface.gpu() {
            Some(gpu) => session.dispose(gpu, &mut self.scheduler),
            None => {
                session.cancel_pending(&mut self.scheduler);
                log::error!("graphics context lost; session objects could not be released");
            }
        }
        self.status = SessionStatus::Disposed;
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        log::warn!("session attempt failed: {err}");
        self.status = SessionStatus::Errored;
        self.last_error = Some(err.clone());
        err
    }

    /// State of the live session, or of the last attempt if none is live.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.session.as_ref().map_or(self.status, RenderSession::status)
    }

    /// The live session.
    #[must_use]
    pub fn session(&self) -> Option<&RenderSession<S::Gpu>> {
        self.session.as_ref()
    }

    /// Why the last attempt failed, if it did.
    #[must_use]
    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// Whether the view is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The drawing surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The drawing surface, e.g. to push a new displayed size.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// The frame scheduler.
    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    /// The frame scheduler, e.g. to drain due callbacks.
    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }
}

impl<S: Surface, F: FrameScheduler> Drop for SessionOrchestrator<S, F> {
    fn drop(&mut self) {
        self.dispose_current();
    }
}
