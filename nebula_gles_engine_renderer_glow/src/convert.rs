/// Conversions between engine enums and GL constants

use nebula_gles_engine::nebula::device::{
    BufferUsage, ClearMask, CullFace, FilterMode, FramebufferStatus, PixelFormat, WrapMode,
};

/// GL buffer binding target for a buffer usage
pub(crate) fn buffer_target(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::Vertex => glow::ARRAY_BUFFER,
        BufferUsage::Index => glow::ELEMENT_ARRAY_BUFFER,
    }
}

/// GL wrap parameter value
pub(crate) fn wrap_mode(wrap: WrapMode) -> i32 {
    match wrap {
        WrapMode::Repeat => glow::REPEAT as i32,
        WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE as i32,
    }
}

/// GL filter parameter value
pub(crate) fn filter_mode(filter: FilterMode) -> i32 {
    match filter {
        FilterMode::Nearest => glow::NEAREST as i32,
        FilterMode::Linear => glow::LINEAR as i32,
    }
}

/// GL (internal format, format, type) triple for a pixel format
pub(crate) fn pixel_format(format: PixelFormat) -> (i32, u32, u32) {
    match format {
        PixelFormat::Rgba8 => (glow::RGBA as i32, glow::RGBA, glow::UNSIGNED_BYTE),
        PixelFormat::Rgb8 => (glow::RGB as i32, glow::RGB, glow::UNSIGNED_BYTE),
        PixelFormat::Luminance8 => (
            glow::LUMINANCE as i32,
            glow::LUMINANCE,
            glow::UNSIGNED_BYTE,
        ),
        PixelFormat::Depth16 => (
            glow::DEPTH_COMPONENT as i32,
            glow::DEPTH_COMPONENT,
            glow::UNSIGNED_SHORT,
        ),
    }
}

/// GL cull face mode
pub(crate) fn cull_face(face: CullFace) -> u32 {
    match face {
        CullFace::Back => glow::BACK,
        CullFace::Front => glow::FRONT,
    }
}

/// GL clear bitmask
pub(crate) fn clear_bits(mask: ClearMask) -> u32 {
    let mut bits = 0;
    if mask.contains(ClearMask::COLOR) {
        bits |= glow::COLOR_BUFFER_BIT;
    }
    if mask.contains(ClearMask::DEPTH) {
        bits |= glow::DEPTH_BUFFER_BIT;
    }
    bits
}

/// Engine framebuffer status from a GL status code
pub(crate) fn framebuffer_status(gl_status: u32) -> FramebufferStatus {
    match gl_status {
        glow::FRAMEBUFFER_COMPLETE => FramebufferStatus::Complete,
        glow::FRAMEBUFFER_INCOMPLETE_ATTACHMENT => FramebufferStatus::IncompleteAttachment,
        glow::FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT => {
            FramebufferStatus::IncompleteMissingAttachment
        }
        glow::FRAMEBUFFER_INCOMPLETE_DIMENSIONS => FramebufferStatus::IncompleteDimensions,
        _ => FramebufferStatus::Unsupported,
    }
}

#[cfg(test)]
#[path = "convert_tests.rs"]
mod tests;
