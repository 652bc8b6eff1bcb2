/// Lesson trait and lesson context - the host-facing lifecycle surface

use std::sync::Arc;

use crate::asset::AssetProvider;
use crate::graphics_device::GraphicsDevice;

/// Presentation collaborator
///
/// Publishes the completed frame (buffer swap, compositor hand-off, frame
/// counter). Platform-specific and opaque to the engine.
pub trait Presenter: Send {
    /// Publish the frame rendered since the last call
    fn present_frame(&mut self);
}

/// Everything a lesson needs, passed explicitly to every lifecycle call
///
/// There is deliberately no global application state: the host owns one
/// context per lesson run and threads it through the callbacks.
///
/// `worker_device` must be a share context of `device` created by the
/// platform layer: object storage shared, binding state independent. The
/// background loader runs exclusively against it.
pub struct LessonContext {
    /// Render-thread device (context current on the render thread)
    pub device: Arc<dyn GraphicsDevice>,
    /// Loader-thread device (share context of `device`)
    pub worker_device: Arc<dyn GraphicsDevice>,
    /// Model and texture source
    pub assets: Arc<dyn AssetProvider>,
    /// Frame presentation collaborator
    pub presenter: Box<dyn Presenter>,
    /// Current surface width in pixels
    pub surface_width: u32,
    /// Current surface height in pixels
    pub surface_height: u32,
}

impl LessonContext {
    /// Create a context with zero surface dimensions; the host calls the
    /// lesson's `resize` with real dimensions before the first frame
    pub fn new(
        device: Arc<dyn GraphicsDevice>,
        worker_device: Arc<dyn GraphicsDevice>,
        assets: Arc<dyn AssetProvider>,
        presenter: Box<dyn Presenter>,
    ) -> Self {
        Self {
            device,
            worker_device,
            assets,
            presenter,
            surface_width: 0,
            surface_height: 0,
        }
    }
}

/// One self-contained rendering lesson
///
/// The host invokes the callbacks in order: `initialize` once, `resize` at
/// least once before the first frame and again on every surface size
/// change, `render_frame` once per display refresh, `destroy` last.
///
/// `render_frame` must be callable at any point of a lesson's background
/// loading progress and must never block waiting for resources.
pub trait Lesson {
    /// Set up lesson state and start any background work
    fn initialize(&mut self, ctx: &mut LessonContext) -> crate::error::Result<()>;

    /// React to a surface size change
    fn resize(&mut self, ctx: &mut LessonContext, width: u32, height: u32)
        -> crate::error::Result<()>;

    /// Render one frame and present it
    fn render_frame(&mut self, ctx: &mut LessonContext) -> crate::error::Result<()>;

    /// Release all lesson resources; the host guarantees no further calls
    fn destroy(&mut self, ctx: &mut LessonContext) -> crate::error::Result<()>;
}
