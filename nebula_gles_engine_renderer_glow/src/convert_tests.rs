//! Unit tests for GL constant conversions

use nebula_gles_engine::nebula::device::{
    BufferUsage, ClearMask, CullFace, FilterMode, FramebufferStatus, PixelFormat, WrapMode,
};

use crate::convert;

// ============================================================================
// BUFFER AND TEXTURE PARAMETERS
// ============================================================================

#[test]
fn test_buffer_targets() {
    assert_eq!(convert::buffer_target(BufferUsage::Vertex), glow::ARRAY_BUFFER);
    assert_eq!(
        convert::buffer_target(BufferUsage::Index),
        glow::ELEMENT_ARRAY_BUFFER
    );
}

#[test]
fn test_wrap_modes() {
    assert_eq!(convert::wrap_mode(WrapMode::Repeat), glow::REPEAT as i32);
    assert_eq!(
        convert::wrap_mode(WrapMode::ClampToEdge),
        glow::CLAMP_TO_EDGE as i32
    );
}

#[test]
fn test_filter_modes() {
    assert_eq!(convert::filter_mode(FilterMode::Nearest), glow::NEAREST as i32);
    assert_eq!(convert::filter_mode(FilterMode::Linear), glow::LINEAR as i32);
}

#[test]
fn test_pixel_formats() {
    let (internal, format, ty) = convert::pixel_format(PixelFormat::Rgba8);
    assert_eq!(internal, glow::RGBA as i32);
    assert_eq!(format, glow::RGBA);
    assert_eq!(ty, glow::UNSIGNED_BYTE);

    let (internal, format, ty) = convert::pixel_format(PixelFormat::Depth16);
    assert_eq!(internal, glow::DEPTH_COMPONENT as i32);
    assert_eq!(format, glow::DEPTH_COMPONENT);
    assert_eq!(ty, glow::UNSIGNED_SHORT);
}

// ============================================================================
// STATE CONVERSIONS
// ============================================================================

#[test]
fn test_cull_faces() {
    assert_eq!(convert::cull_face(CullFace::Back), glow::BACK);
    assert_eq!(convert::cull_face(CullFace::Front), glow::FRONT);
}

#[test]
fn test_clear_bits() {
    assert_eq!(convert::clear_bits(ClearMask::COLOR), glow::COLOR_BUFFER_BIT);
    assert_eq!(convert::clear_bits(ClearMask::DEPTH), glow::DEPTH_BUFFER_BIT);
    assert_eq!(
        convert::clear_bits(ClearMask::COLOR | ClearMask::DEPTH),
        glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT
    );
    assert_eq!(convert::clear_bits(ClearMask::empty()), 0);
}

// ============================================================================
// FRAMEBUFFER STATUS
// ============================================================================

#[test]
fn test_framebuffer_status_codes() {
    assert_eq!(
        convert::framebuffer_status(glow::FRAMEBUFFER_COMPLETE),
        FramebufferStatus::Complete
    );
    assert_eq!(
        convert::framebuffer_status(glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT),
        FramebufferStatus::IncompleteAttachment
    );
    assert_eq!(
        convert::framebuffer_status(glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT),
        FramebufferStatus::IncompleteMissingAttachment
    );
    assert_eq!(
        convert::framebuffer_status(glow::FRAMEBUFFER_INCOMPLETE_DIMENSIONS),
        FramebufferStatus::IncompleteDimensions
    );
    // Unknown codes map to Unsupported
    assert_eq!(
        convert::framebuffer_status(0xDEAD),
        FramebufferStatus::Unsupported
    );
}
