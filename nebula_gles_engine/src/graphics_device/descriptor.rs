/// Resource descriptor set - the declarative plan the background loader executes

use std::time::Duration;

use crate::graphics_device::{BufferUsage, FilterMode, PixelFormat, WrapMode};

/// Descriptor for one shader program
///
/// Attribute and uniform names are declared up front; the loader resolves
/// every declared location right after linking and treats a missing one as
/// a fatal configuration error.
#[derive(Debug, Clone)]
pub struct ShaderSourceDesc {
    /// Name the lesson uses to look the compiled program up
    pub label: String,
    /// GLSL ES vertex shader source
    pub vertex_source: String,
    /// GLSL ES fragment shader source
    pub fragment_source: String,
    /// Attribute names to resolve after linking
    pub attributes: Vec<String>,
    /// Uniform names to resolve after linking
    pub uniforms: Vec<String>,
}

/// Descriptor for one buffer upload
#[derive(Debug, Clone)]
pub struct BufferSpec {
    /// Vertex or index buffer
    pub usage: BufferUsage,
    /// Raw bytes to upload
    pub bytes: Vec<u8>,
}

/// Descriptor for creating a 2D texture
#[derive(Debug, Clone)]
pub struct TextureSpec {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel format
    pub format: PixelFormat,
    /// Coordinate wrap mode (both axes)
    pub wrap: WrapMode,
    /// Min/mag filter
    pub filter: FilterMode,
    /// Optional initial pixel data
    /// If provided, the data must match the size: width * height * bytes_per_pixel
    pub pixels: Option<Vec<u8>>,
}

impl TextureSpec {
    /// Spec for an uninitialized render-target color texture
    pub fn render_target_color(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            width,
            height,
            format,
            wrap: WrapMode::Repeat,
            filter: FilterMode::Linear,
            pixels: None,
        }
    }

    /// Spec for an uninitialized depth texture
    pub fn render_target_depth(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: PixelFormat::Depth16,
            wrap: WrapMode::ClampToEdge,
            filter: FilterMode::Nearest,
            pixels: None,
        }
    }
}

/// Which kind of object backs the depth attachment of a render target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthAttachmentKind {
    /// 16-bit depth renderbuffer (universally supported in ES 2.0)
    Renderbuffer16,
    /// Depth texture (requires the depth-texture capability; the loader
    /// falls back to Renderbuffer16 when the device lacks it)
    Texture,
}

/// Plan for an offscreen render target (color + depth + framebuffer)
#[derive(Debug, Clone)]
pub struct RenderTargetPlan {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Color attachment format
    pub color_format: PixelFormat,
    /// Preferred depth attachment kind, subject to capability fallback
    pub preferred_depth: DepthAttachmentKind,
}

/// Pacing configuration for the background loader
///
/// The inter-step delay exists to make slow asset sources observable and
/// testable; production descriptor sets leave it at zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadPacing {
    /// Sleep inserted before each load step
    pub step_delay: Duration,
}

impl LoadPacing {
    /// No artificial delays
    pub fn immediate() -> Self {
        Self {
            step_delay: Duration::ZERO,
        }
    }

    /// Fixed delay before each load step
    pub fn with_step_delay(step_delay: Duration) -> Self {
        Self { step_delay }
    }
}

/// The complete declarative plan for what one lesson needs
///
/// Immutable once constructed; consumed exactly once by the background
/// loader. The model's vertex/index buffer specs are derived at load time
/// from whatever the asset collaborator returns for `model`.
#[derive(Debug, Clone)]
pub struct ResourceDescriptorSet {
    /// Shader programs to compile and link (step 1)
    pub shaders: Vec<ShaderSourceDesc>,
    /// Offscreen render target, when the lesson draws to texture (step 2)
    pub render_target: Option<RenderTargetPlan>,
    /// Asset name of the model to load and upload (step 3)
    pub model: String,
    /// Loader pacing
    pub pacing: LoadPacing,
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
