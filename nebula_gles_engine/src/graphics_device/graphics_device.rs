/// GraphicsDevice trait - OpenGL ES 2.0-shaped device interface

use bitflags::bitflags;
use glam::Mat4;

use crate::error::Result;
use crate::graphics_device::{NativeId, ResourceKind, TextureSpec};

// ============================================================================
// Configuration and capabilities
// ============================================================================

/// Device configuration
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Enable extra GL error validation after every call
    pub enable_validation: bool,
    /// Application name
    pub app_name: String,
    /// Application version (major, minor, patch)
    pub app_version: (u32, u32, u32),
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            enable_validation: cfg!(debug_assertions),
            app_name: "Nebula GLES Application".to_string(),
            app_version: (1, 0, 0),
        }
    }
}

/// Optional-feature capabilities queried once at device creation
///
/// Resource plans consult these to pick between a preferred resource kind
/// and a universally supported fallback (e.g. a depth texture vs. a
/// 16-bit depth renderbuffer).
#[derive(Debug, Clone, Copy)]
pub struct DeviceCapabilities {
    /// GL_OES_depth_texture (depth textures attachable to framebuffers)
    pub depth_texture: bool,
    /// Maximum texture edge length in pixels
    pub max_texture_size: u32,
}

impl Default for DeviceCapabilities {
    fn default() -> Self {
        Self {
            depth_texture: true,
            max_texture_size: 4096,
        }
    }
}

// ============================================================================
// Common device-level types
// ============================================================================

/// Buffer usage (GL_ARRAY_BUFFER vs GL_ELEMENT_ARRAY_BUFFER)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex buffer
    Vertex,
    /// Index buffer
    Index,
}

/// Pixel formats supported by the ES 2.0 core plus the depth extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit RGBA
    Rgba8,
    /// 8-bit RGB
    Rgb8,
    /// Single-channel luminance
    Luminance8,
    /// 16-bit depth (requires the depth-texture capability when used as a
    /// texture rather than a renderbuffer)
    Depth16,
}

impl PixelFormat {
    /// Returns size in bytes of one pixel in this format
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Luminance8 => 1,
            PixelFormat::Depth16 => 2,
        }
    }
}

/// Texture coordinate wrap mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Repeat,
    ClampToEdge,
}

/// Texture sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Which faces get culled during rasterization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    /// Cull back faces (normal rendering)
    Back,
    /// Cull front faces (inside-out passes such as edge outlining)
    Front,
}

/// Result of a framebuffer completeness query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    /// All attachments present and compatible
    Complete,
    /// An attachment is incomplete or invalid
    IncompleteAttachment,
    /// No attachment at all
    IncompleteMissingAttachment,
    /// Attachments disagree on dimensions
    IncompleteDimensions,
    /// The attachment combination is unsupported by this implementation
    Unsupported,
}

bitflags! {
    /// Which buffers a clear call touches
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
    }
}

/// Layout of one float vertex attribute inside the bound vertex buffer
///
/// Mirrors the glVertexAttribPointer parameter set for GL_FLOAT attributes
/// (the only component type the lessons use).
#[derive(Debug, Clone, Copy)]
pub struct VertexAttribLayout {
    /// Attribute location (as resolved by `attrib_location`)
    pub location: u32,
    /// Number of float components (1-4)
    pub components: i32,
    /// Stride between consecutive vertices in bytes
    pub stride: i32,
    /// Offset of this attribute from the start of a vertex in bytes
    pub offset: i32,
}

// ============================================================================
// GraphicsDevice trait
// ============================================================================

/// OpenGL ES 2.0-shaped graphics device trait
///
/// This is the seam between the lesson framework and the GPU. ES 2.0 is an
/// immediate-mode API with no command lists, so state and draw operations
/// live directly on the device rather than on a recording object.
///
/// One instance represents one GL context. The background loader runs
/// against a second instance created by the platform layer as a share
/// context of the render thread's instance: object storage (programs,
/// buffers, textures, renderbuffers) is shared between the two, framebuffer
/// *attachment* state is not. Each instance must only be used from a thread
/// where its context is current; that discipline is the host's
/// responsibility.
pub trait GraphicsDevice: Send + Sync {
    /// Optional-feature capabilities of the underlying implementation
    fn capabilities(&self) -> DeviceCapabilities;

    // ===== FACTORY =====

    /// Compile and link a program from vertex and fragment shader sources
    ///
    /// # Errors
    ///
    /// Returns an error when compilation or linking fails; the message
    /// carries the shader info log. Callers treat this as fatal.
    fn compile_program(&self, vertex_source: &str, fragment_source: &str) -> Result<NativeId>;

    /// Create a buffer object and upload `data` into it (GL_STATIC_DRAW)
    fn create_buffer(&self, usage: BufferUsage, data: &[u8]) -> Result<NativeId>;

    /// Create a 2D texture from a spec, uploading pixel data when present
    fn create_texture(&self, spec: &TextureSpec) -> Result<NativeId>;

    /// Create a 16-bit depth renderbuffer with the given storage dimensions
    fn create_renderbuffer(&self, width: u32, height: u32) -> Result<NativeId>;

    /// Create an (unattached) framebuffer object
    fn create_framebuffer(&self) -> Result<NativeId>;

    // ===== FRAMEBUFFER ATTACHMENT (per-context state) =====

    /// Bind a framebuffer, or restore the default framebuffer with `None`
    fn bind_framebuffer(&self, framebuffer: Option<NativeId>);

    /// Attach a color texture to the bound framebuffer's color slot 0
    fn attach_color_texture(&self, texture: NativeId) -> Result<()>;

    /// Attach a depth renderbuffer to the bound framebuffer
    fn attach_depth_renderbuffer(&self, renderbuffer: NativeId) -> Result<()>;

    /// Attach a depth texture to the bound framebuffer
    ///
    /// Only valid when `capabilities().depth_texture` is true.
    fn attach_depth_texture(&self, texture: NativeId) -> Result<()>;

    /// Completeness status of the bound framebuffer
    fn framebuffer_status(&self) -> FramebufferStatus;

    // ===== PROGRAM REFLECTION =====

    /// Resolve an attribute location by name
    ///
    /// # Errors
    ///
    /// Returns an error when the attribute does not exist in the linked
    /// program (location < 0); the lessons treat this as fatal.
    fn attrib_location(&self, program: NativeId, name: &str) -> Result<u32>;

    /// Resolve a uniform location by name
    ///
    /// # Errors
    ///
    /// Returns an error when the uniform does not exist in the linked
    /// program; the lessons treat this as fatal.
    fn uniform_location(&self, program: NativeId, name: &str) -> Result<i32>;

    // ===== STATE AND DRAW =====

    /// Set the viewport in window coordinates
    fn set_viewport(&self, x: i32, y: i32, width: u32, height: u32);

    /// Set the color used by subsequent color clears
    fn set_clear_color(&self, r: f32, g: f32, b: f32, a: f32);

    /// Clear the selected buffers of the bound framebuffer
    fn clear(&self, mask: ClearMask);

    /// Enable or disable depth testing
    fn set_depth_test(&self, enabled: bool);

    /// Enable or disable face culling
    fn set_face_culling(&self, enabled: bool);

    /// Select which faces are culled while face culling is enabled
    fn set_cull_face(&self, face: CullFace);

    /// Start using a program for subsequent draws
    fn use_program(&self, program: NativeId);

    /// Bind a vertex buffer (GL_ARRAY_BUFFER), or unbind with `None`
    fn bind_vertex_buffer(&self, buffer: Option<NativeId>);

    /// Bind an index buffer (GL_ELEMENT_ARRAY_BUFFER), or unbind with `None`
    fn bind_index_buffer(&self, buffer: Option<NativeId>);

    /// Enable a vertex attribute array
    fn enable_vertex_attrib(&self, location: u32);

    /// Describe a float attribute's layout inside the bound vertex buffer
    fn vertex_attrib_pointer(&self, layout: VertexAttribLayout);

    /// Bind a 2D texture to texture unit 0, or unbind with `None`
    fn bind_texture_2d(&self, texture: Option<NativeId>);

    /// Upload a 4x4 matrix uniform
    fn set_uniform_mat4(&self, location: i32, value: &Mat4);

    /// Upload a vec4 uniform
    fn set_uniform_vec4(&self, location: i32, value: [f32; 4]);

    /// Upload a float uniform
    fn set_uniform_f32(&self, location: i32, value: f32);

    /// Point a sampler uniform at a texture unit
    fn set_uniform_sampler(&self, location: i32, unit: i32);

    /// Draw `index_count` indices (u16) starting at index `first_index`
    /// from the bound index buffer, as triangles
    fn draw_indexed(&self, index_count: u32, first_index: u32) -> Result<()>;

    // ===== SYNCHRONIZATION =====

    /// Full pipeline synchronization: block until the GPU has *completed*
    /// every previously submitted command (glFinish, not glFlush)
    ///
    /// This is the load-bearing barrier of the resource handoff protocol:
    /// a resource may only be published to another thread after `finish()`
    /// returns on the context that produced it.
    fn finish(&self);

    // ===== VALIDITY AND DELETION =====

    /// Whether `id` currently names a live object of `kind` (glIs* family)
    fn is_resource_valid(&self, kind: ResourceKind, id: NativeId) -> bool;

    /// Delete the object named by `id`
    ///
    /// Called exactly once per object, by `GpuObject::drop`.
    fn delete_resource(&self, kind: ResourceKind, id: NativeId);
}

#[cfg(test)]
#[path = "graphics_device_tests.rs"]
mod tests;
