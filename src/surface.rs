//! The drawing surface a session renders into.

use crate::gpu::Gpu;

/// Width and height in physical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl SurfaceSize {
    /// A size of `width` × `height`.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `width / height`, or `1.0` for a degenerate surface.
    #[must_use]
    #[expect(clippy::cast_precision_loss)] // surface sizes are far below 2^24
    pub fn aspect(self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Size as the `i32` pair GL viewport calls take.
    #[must_use]
    pub fn gl_size(self) -> (i32, i32) {
        (
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }
}

/// Something a session can draw on.
pub trait Surface {
    /// The surface's graphics context.
    type Gpu: Gpu;

    /// The graphics context, or `None` if the surface has none usable.
    fn gpu(&self) -> Option<&Self::Gpu>;

    /// Size the surface is displayed at.
    fn display_size(&self) -> SurfaceSize;

    /// Size of the backing store that is actually rendered to.
    fn backing_size(&self) -> SurfaceSize;

    /// Resize the backing store.
    fn resize_backing(&mut self, size: SurfaceSize);
}

/// A [`Surface`] whose sizes are pushed in by the host (typically from window
/// resize events).
#[derive(Debug)]
pub struct HostSurface<G: Gpu> {
    gpu: Option<G>,
    display: SurfaceSize,
    backing: SurfaceSize,
}

impl<G: Gpu> HostSurface<G> {
    /// A surface with a graphics context.
    pub fn new(gpu: G, display: SurfaceSize) -> Self {
        Self {
            gpu: Some(gpu),
            display,
            backing: SurfaceSize::default(),
        }
    }

    /// A surface on which context creation failed.
    #[must_use]
    pub fn without_context(display: SurfaceSize) -> Self {
        Self {
            gpu: None,
            display,
            backing: SurfaceSize::default(),
        }
    }

    /// Record a new displayed size. Takes effect when the next session
    /// starts.
    pub fn set_display_size(&mut self, size: SurfaceSize) {
        self.display = size;
    }
}

impl<G: Gpu> Surface for HostSurface<G> {
    type Gpu = G;

    fn gpu(&self) -> Option<&G> {
        self.gpu.as_ref()
    }

    fn display_size(&self) -> SurfaceSize {
        self.display
    }

    fn backing_size(&self) -> SurfaceSize {
        self.backing
    }

    fn resize_backing(&mut self, size: SurfaceSize) {
        if self.backing != size {
            log::debug!(
                "resizing backing store {}x{} -> {}x{}",
                self.backing.width,
                self.backing.height,
                size.width,
                size.height
            );
        }
        self.backing = size;
    }
}
