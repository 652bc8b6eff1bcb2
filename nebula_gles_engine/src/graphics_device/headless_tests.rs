//! Unit tests for the headless graphics device
//!
//! Tests the two protocol-relevant behaviors (pending-until-finish
//! completion and per-context attachment state) plus the recording and
//! validity APIs.

use crate::graphics_device::{
    BufferUsage, DeviceCapabilities, FramebufferStatus, GraphicsDevice, HeadlessGraphicsDevice,
    PixelFormat, ResourceKind, TextureSpec,
};

// ============================================================================
// OBJECT LIFECYCLE TESTS
// ============================================================================

#[test]
fn test_created_objects_are_valid_and_distinct() {
    let device = HeadlessGraphicsDevice::new();
    let a = device.create_buffer(BufferUsage::Vertex, &[0u8; 4]).unwrap();
    let b = device.create_buffer(BufferUsage::Index, &[0u8; 4]).unwrap();

    assert_ne!(a, b);
    assert!(device.is_resource_valid(ResourceKind::VertexBuffer, a));
    assert!(device.is_resource_valid(ResourceKind::IndexBuffer, b));
    // Kind mismatch is not valid
    assert!(!device.is_resource_valid(ResourceKind::Texture2D, a));
}

#[test]
fn test_delete_invalidates() {
    let device = HeadlessGraphicsDevice::new();
    let id = device.create_framebuffer().unwrap();
    assert!(device.is_resource_valid(ResourceKind::Framebuffer, id));

    device.delete_resource(ResourceKind::Framebuffer, id);
    assert!(!device.is_resource_valid(ResourceKind::Framebuffer, id));
    assert_eq!(device.live_object_count(), 0);
}

// ============================================================================
// COMPLETION (FINISH) SEMANTICS
// ============================================================================

#[test]
fn test_objects_incomplete_until_finish() {
    let device = HeadlessGraphicsDevice::new();
    let id = device.create_buffer(BufferUsage::Vertex, &[0u8; 4]).unwrap();

    // Submitted but not executed yet
    assert!(!device.is_complete(id));

    device.finish();
    assert!(device.is_complete(id));
    assert_eq!(device.finish_count(), 1);
}

#[test]
fn test_finish_only_completes_own_context() {
    let render = HeadlessGraphicsDevice::new();
    let loader = render.share_context();

    let id = loader.create_buffer(BufferUsage::Vertex, &[0u8; 4]).unwrap();

    // A finish on the other context does not complete the loader's work
    render.finish();
    assert!(!loader.is_complete(id));

    loader.finish();
    assert!(loader.is_complete(id));
    // Completion is object state, visible from both contexts
    assert!(render.is_complete(id));
}

// ============================================================================
// SHARE GROUP SEMANTICS
// ============================================================================

#[test]
fn test_objects_shared_across_contexts() {
    let render = HeadlessGraphicsDevice::new();
    let loader = render.share_context();

    let id = loader
        .create_texture(&TextureSpec::render_target_color(64, 64, PixelFormat::Rgba8))
        .unwrap();

    // Object storage is shared
    assert!(render.is_resource_valid(ResourceKind::Texture2D, id));
}

#[test]
fn test_attachment_state_is_per_context() {
    let render = HeadlessGraphicsDevice::new();
    let loader = render.share_context();

    let color = loader
        .create_texture(&TextureSpec::render_target_color(64, 64, PixelFormat::Rgba8))
        .unwrap();
    let framebuffer = loader.create_framebuffer().unwrap();

    loader.bind_framebuffer(Some(framebuffer));
    loader.attach_color_texture(color).unwrap();
    assert_eq!(loader.framebuffer_status(), FramebufferStatus::Complete);

    // The render context sees the shared framebuffer object but not the
    // attachment established on the loader context
    render.bind_framebuffer(Some(framebuffer));
    assert_eq!(
        render.framebuffer_status(),
        FramebufferStatus::IncompleteMissingAttachment
    );

    // Re-attaching on the render context completes it there too
    render.attach_color_texture(color).unwrap();
    assert_eq!(render.framebuffer_status(), FramebufferStatus::Complete);
}

#[test]
fn test_default_framebuffer_always_complete() {
    let device = HeadlessGraphicsDevice::new();
    device.bind_framebuffer(None);
    assert_eq!(device.framebuffer_status(), FramebufferStatus::Complete);
}

// ============================================================================
// VALIDATION TESTS
// ============================================================================

#[test]
fn test_attach_without_bound_framebuffer_fails() {
    let device = HeadlessGraphicsDevice::new();
    let color = device
        .create_texture(&TextureSpec::render_target_color(64, 64, PixelFormat::Rgba8))
        .unwrap();

    device.bind_framebuffer(None);
    assert!(device.attach_color_texture(color).is_err());
}

#[test]
fn test_empty_shader_source_fails_compilation() {
    let device = HeadlessGraphicsDevice::new();
    assert!(device.compile_program("", "void main() {}").is_err());
    assert!(device.compile_program("void main() {}", "  ").is_err());
    assert!(device
        .compile_program("void main() {}", "void main() {}")
        .is_ok());
}

#[test]
fn test_texture_data_size_mismatch_fails() {
    let device = HeadlessGraphicsDevice::new();
    let spec = TextureSpec {
        width: 4,
        height: 4,
        format: PixelFormat::Rgba8,
        wrap: crate::graphics_device::WrapMode::Repeat,
        filter: crate::graphics_device::FilterMode::Linear,
        pixels: Some(vec![0u8; 3]),
    };
    assert!(device.create_texture(&spec).is_err());
}

#[test]
fn test_draw_without_program_fails() {
    let device = HeadlessGraphicsDevice::new();
    assert!(device.draw_indexed(3, 0).is_err());
}

#[test]
fn test_depth_texture_attach_respects_capability() {
    let device = HeadlessGraphicsDevice::with_capabilities(DeviceCapabilities {
        depth_texture: false,
        max_texture_size: 4096,
    });
    let depth = device
        .create_texture(&TextureSpec::render_target_depth(64, 64))
        .unwrap();
    let framebuffer = device.create_framebuffer().unwrap();
    device.bind_framebuffer(Some(framebuffer));
    assert!(device.attach_depth_texture(depth).is_err());
}

// ============================================================================
// LOCATION RESOLUTION TESTS
// ============================================================================

#[test]
fn test_locations_are_stable_per_name() {
    let device = HeadlessGraphicsDevice::new();
    let program = device
        .compile_program("void main() {}", "void main() {}")
        .unwrap();

    let first = device.attrib_location(program, "attr_pos").unwrap();
    let second = device.attrib_location(program, "attr_uv").unwrap();
    assert_ne!(first, second);
    // Repeated lookup returns the same location
    assert_eq!(device.attrib_location(program, "attr_pos").unwrap(), first);

    let u_first = device.uniform_location(program, "unif_wlp").unwrap();
    assert_eq!(device.uniform_location(program, "unif_wlp").unwrap(), u_first);
}

// ============================================================================
// RECORDING TESTS
// ============================================================================

#[test]
fn test_op_log_records_in_order() {
    let device = HeadlessGraphicsDevice::new();
    device.set_viewport(0, 0, 640, 480);
    device.set_clear_color(0.0, 0.0, 0.0, 1.0);

    let ops = device.op_log();
    assert_eq!(ops.len(), 2);
    assert!(ops[0].starts_with("set_viewport"));
    assert!(ops[1].starts_with("set_clear_color"));
}
