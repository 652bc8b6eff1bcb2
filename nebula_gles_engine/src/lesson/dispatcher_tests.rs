//! Unit tests for the render dispatcher
//!
//! Tests graceful degradation at every loading stage, the one-time
//! re-attachment fixup, per-material texture fallback, and unconditional
//! presentation.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::asset::{AssetProvider, ModelData, ProceduralAssets, TexturePixels};
use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, HeadlessGraphicsDevice, LoadPacing,
};
use crate::graphics_device::headless::HeadlessPresenter;
use crate::lesson::async_load::AsyncLoadLesson;
use crate::lesson::dispatcher::RenderDispatcher;
use crate::lesson::lesson::LessonContext;
use crate::lesson::loader::BackgroundLoader;
use crate::lesson::session::LessonSession;

// ============================================================================
// TEST HELPERS
// ============================================================================

struct FailingTextureAssets {
    inner: ProceduralAssets,
}

impl AssetProvider for FailingTextureAssets {
    fn load_model(&self, name: &str) -> Result<ModelData> {
        self.inner.load_model(name)
    }

    fn load_texture_pixels(&self, _name: &str) -> Result<TexturePixels> {
        Err(Error::InvalidResource("texture storage offline".to_string()))
    }
}

struct Harness {
    render: Arc<HeadlessGraphicsDevice>,
    worker: Arc<HeadlessGraphicsDevice>,
    session: LessonSession,
    ctx: LessonContext,
    frames_presented: Arc<std::sync::atomic::AtomicUsize>,
}

fn harness() -> Harness {
    let render = Arc::new(HeadlessGraphicsDevice::new());
    let worker = Arc::new(render.share_context());
    let presenter = HeadlessPresenter::new();
    let frames_presented = presenter.frame_counter();
    let mut ctx = LessonContext::new(
        render.clone(),
        worker.clone(),
        Arc::new(ProceduralAssets::new()),
        Box::new(presenter),
    );
    ctx.surface_width = 640;
    ctx.surface_height = 480;
    Harness {
        render,
        worker,
        session: LessonSession::new(),
        ctx,
        frames_presented,
    }
}

/// Run the loader synchronously on the worker context
fn load_now(h: &Harness, assets: &dyn AssetProvider) {
    let device: Arc<dyn GraphicsDevice> = h.worker.clone();
    let descriptors = AsyncLoadLesson::descriptor_set(LoadPacing::immediate());
    // A failing tail step still leaves earlier groups published
    let _ = BackgroundLoader::run(&device, assets, &descriptors, &h.session);
}

// ============================================================================
// GRACEFUL DEGRADATION TESTS
// ============================================================================

#[test]
fn test_frame_with_nothing_loaded_presents_without_drawing() {
    let mut h = harness();
    let mut dispatcher = RenderDispatcher::new();

    dispatcher.render_frame(&h.session, &mut h.ctx).unwrap();

    assert_eq!(h.render.draw_count(), 0);
    assert_eq!(h.frames_presented.load(Ordering::Relaxed), 1);

    // The frame still cleared the primary target
    assert!(h.render.op_log().iter().any(|op| op.starts_with("clear")));
}

#[test]
fn test_hundred_empty_frames_are_safe() {
    let mut h = harness();
    let mut dispatcher = RenderDispatcher::new();

    for _ in 0..100 {
        dispatcher.render_frame(&h.session, &mut h.ctx).unwrap();
    }

    assert_eq!(h.render.draw_count(), 0);
    assert_eq!(h.frames_presented.load(Ordering::Relaxed), 100);
}

#[test]
fn test_fully_loaded_frame_draws_model_and_cube() {
    let mut h = harness();
    load_now(&h, &ProceduralAssets::new());
    let mut dispatcher = RenderDispatcher::new();

    dispatcher.render_frame(&h.session, &mut h.ctx).unwrap();

    // Offscreen model pass + main model pass (3 materials + edge each)
    // plus the cube pass
    assert_eq!(h.render.draw_count(), 9);

    // Two textured materials in each model pass, plus the cube sampling
    // the render target
    assert_eq!(h.render.texture_bind_count(), 5);

    assert_eq!(h.frames_presented.load(Ordering::Relaxed), 1);
}

#[test]
fn test_pending_textures_fall_back_to_flat_color() {
    let mut h = harness();
    load_now(
        &h,
        &FailingTextureAssets {
            inner: ProceduralAssets::new(),
        },
    );

    // Geometry, programs and target are ready; textures never arrived
    assert!(h.session.geometry.is_ready());
    assert!(!h.session.textures.is_ready());

    let mut dispatcher = RenderDispatcher::new();
    dispatcher.render_frame(&h.session, &mut h.ctx).unwrap();

    // The full mesh still draws; only the cube binds a texture
    assert_eq!(h.render.draw_count(), 9);
    assert_eq!(h.render.texture_bind_count(), 1);

    // Pending materials drew with their diffuse color
    let flat_colors = h
        .render
        .op_log()
        .iter()
        .filter(|op| op.starts_with("set_uniform_vec4") && !op.contains("[0.0, 0.0, 0.0"))
        .count();
    assert!(flat_colors > 0);
}

// ============================================================================
// ONE-TIME RE-ATTACHMENT TESTS
// ============================================================================

#[test]
fn test_reattachment_happens_exactly_once() {
    let mut h = harness();
    load_now(&h, &ProceduralAssets::new());
    let mut dispatcher = RenderDispatcher::new();

    for _ in 0..100 {
        dispatcher.render_frame(&h.session, &mut h.ctx).unwrap();
    }

    // One color attach + one depth attach on the render context, ever
    assert_eq!(h.render.attach_count(), 2);
    assert!(h.session.is_render_target_attached());
}

#[test]
fn test_reattachment_restores_default_framebuffer() {
    let mut h = harness();
    load_now(&h, &ProceduralAssets::new());
    let mut dispatcher = RenderDispatcher::new();

    dispatcher.render_frame(&h.session, &mut h.ctx).unwrap();

    let ops = h.render.op_log();
    let last_attach = ops
        .iter()
        .rposition(|op| op.starts_with("attach_"))
        .unwrap();
    let restored = ops[last_attach..]
        .iter()
        .any(|op| op == "bind_framebuffer default");
    assert!(restored);
}

#[test]
fn test_no_reattachment_before_target_ready() {
    let mut h = harness();
    let mut dispatcher = RenderDispatcher::new();

    for _ in 0..10 {
        dispatcher.render_frame(&h.session, &mut h.ctx).unwrap();
    }

    assert_eq!(h.render.attach_count(), 0);
    assert!(!h.session.is_render_target_attached());
}

// ============================================================================
// PRESENTATION TESTS
// ============================================================================

#[test]
fn test_present_called_once_per_frame_at_every_stage() {
    let mut h = harness();
    let mut dispatcher = RenderDispatcher::new();

    dispatcher.render_frame(&h.session, &mut h.ctx).unwrap();
    assert_eq!(h.frames_presented.load(Ordering::Relaxed), 1);

    load_now(&h, &ProceduralAssets::new());
    dispatcher.render_frame(&h.session, &mut h.ctx).unwrap();
    assert_eq!(h.frames_presented.load(Ordering::Relaxed), 2);
}

// ============================================================================
// DISPATCHER RESET TESTS
// ============================================================================

#[test]
fn test_reset_releases_cube_buffers() {
    let mut h = harness();
    load_now(&h, &ProceduralAssets::new());
    let mut dispatcher = RenderDispatcher::new();

    dispatcher.render_frame(&h.session, &mut h.ctx).unwrap();
    let live_with_cube = h.render.live_object_count();

    dispatcher.reset();
    assert_eq!(h.render.live_object_count(), live_with_cube - 2);
}
