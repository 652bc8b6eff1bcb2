#![allow(dead_code)]
//! Shared test harness for lesson integration tests
//!
//! Builds a complete headless lesson environment: render device, worker
//! share context, procedural assets, and a counting presenter.

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use nebula_gles_engine::nebula::asset::ProceduralAssets;
use nebula_gles_engine::nebula::device::headless::{HeadlessGraphicsDevice, HeadlessPresenter};
use nebula_gles_engine::nebula::lesson::LessonContext;

/// A fully wired headless environment for one lesson run
pub struct TestEnvironment {
    pub render_device: Arc<HeadlessGraphicsDevice>,
    pub worker_device: Arc<HeadlessGraphicsDevice>,
    pub frames_presented: Arc<AtomicUsize>,
    pub ctx: LessonContext,
}

/// Build a test environment with a shared worker context
pub fn environment() -> TestEnvironment {
    let render_device = Arc::new(HeadlessGraphicsDevice::new());
    let worker_device = Arc::new(render_device.share_context());
    let presenter = HeadlessPresenter::new();
    let frames_presented = presenter.frame_counter();

    let ctx = LessonContext::new(
        render_device.clone(),
        worker_device.clone(),
        Arc::new(ProceduralAssets::new()),
        Box::new(presenter),
    );

    TestEnvironment {
        render_device,
        worker_device,
        frames_presented,
        ctx,
    }
}

/// Poll a condition until it holds or the deadline passes
pub fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let end = Instant::now() + deadline;
    while Instant::now() < end {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}
