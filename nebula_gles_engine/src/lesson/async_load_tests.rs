//! Unit tests for the AsyncLoad lesson
//!
//! Drives the lesson through its full lifecycle over the headless device.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::asset::ProceduralAssets;
use crate::graphics_device::headless::HeadlessPresenter;
use crate::graphics_device::{HeadlessGraphicsDevice, LoadPacing};
use crate::lesson::async_load::AsyncLoadLesson;
use crate::lesson::lesson::{Lesson, LessonContext};

// ============================================================================
// TEST HELPERS
// ============================================================================

fn context() -> (Arc<HeadlessGraphicsDevice>, LessonContext) {
    let render = Arc::new(HeadlessGraphicsDevice::new());
    let worker = Arc::new(render.share_context());
    let ctx = LessonContext::new(
        render.clone(),
        worker,
        Arc::new(ProceduralAssets::new()),
        Box::new(HeadlessPresenter::new()),
    );
    (render, ctx)
}

// ============================================================================
// LIFECYCLE TESTS
// ============================================================================

#[test]
fn test_full_lesson_lifecycle() {
    let (render, mut ctx) = context();
    let mut lesson = AsyncLoadLesson::new();

    lesson.initialize(&mut ctx).unwrap();
    lesson.resize(&mut ctx, 800, 600).unwrap();
    assert_eq!(ctx.surface_width, 800);
    assert_eq!(ctx.surface_height, 600);

    // Pump frames until the fully textured state is reached (5 texture
    // binds in one frame: 2 per model pass plus the cube)
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let before = render.texture_bind_count();
        lesson.render_frame(&mut ctx).unwrap();
        let binds = render.texture_bind_count() - before;
        if binds >= 5 {
            assert_eq!(binds, 5);
            break;
        }
        assert!(Instant::now() < deadline, "textured state never reached");
        std::thread::yield_now();
    }

    lesson.destroy(&mut ctx).unwrap();
    assert_eq!(render.live_object_count(), 0);
}

#[test]
fn test_initialize_enables_depth_and_culling() {
    let (render, mut ctx) = context();
    let mut lesson = AsyncLoadLesson::new();
    lesson.initialize(&mut ctx).unwrap();

    let ops = render.op_log();
    assert!(ops.iter().any(|op| op == "set_depth_test(true)"));
    assert!(ops.iter().any(|op| op == "set_face_culling(true)"));

    lesson.destroy(&mut ctx).unwrap();
}

// ============================================================================
// MISUSE TESTS
// ============================================================================

#[test]
fn test_double_initialize_fails() {
    let (_render, mut ctx) = context();
    let mut lesson = AsyncLoadLesson::new();

    lesson.initialize(&mut ctx).unwrap();
    assert!(lesson.initialize(&mut ctx).is_err());
    lesson.destroy(&mut ctx).unwrap();
}

#[test]
fn test_render_before_initialize_fails() {
    let (_render, mut ctx) = context();
    let mut lesson = AsyncLoadLesson::new();
    assert!(lesson.render_frame(&mut ctx).is_err());
}

#[test]
fn test_destroy_before_initialize_fails() {
    let (_render, mut ctx) = context();
    let mut lesson = AsyncLoadLesson::new();
    assert!(lesson.destroy(&mut ctx).is_err());
}

#[test]
fn test_lesson_reusable_after_destroy() {
    let (_render, mut ctx) = context();
    let mut lesson = AsyncLoadLesson::with_pacing(LoadPacing::immediate());

    lesson.initialize(&mut ctx).unwrap();
    lesson.resize(&mut ctx, 320, 240).unwrap();
    lesson.render_frame(&mut ctx).unwrap();
    lesson.destroy(&mut ctx).unwrap();

    // A destroyed lesson can start a fresh run
    lesson.initialize(&mut ctx).unwrap();
    lesson.render_frame(&mut ctx).unwrap();
    lesson.destroy(&mut ctx).unwrap();
}
