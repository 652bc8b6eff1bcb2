/// GPU resource handles and the RAII object wrapper

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::graphics_device::GraphicsDevice;

/// Kinds of GPU-visible objects the engine manages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Program,
    VertexBuffer,
    IndexBuffer,
    Texture2D,
    Renderbuffer,
    Framebuffer,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Program => "program",
            ResourceKind::VertexBuffer => "vertex buffer",
            ResourceKind::IndexBuffer => "index buffer",
            ResourceKind::Texture2D => "texture",
            ResourceKind::Renderbuffer => "renderbuffer",
            ResourceKind::Framebuffer => "framebuffer",
        };
        write!(f, "{}", name)
    }
}

/// Opaque nonzero object name as allocated by the device
///
/// GL object names are never zero (zero is the unbind sentinel), which this
/// type encodes so `Option<NativeId>` stays pointer-sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeId(NonZeroU32);

impl NativeId {
    /// Wrap a raw GL object name; returns None for the zero name
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(NativeId)
    }

    /// Wrap an already-nonzero GL object name
    pub fn from_nonzero(raw: NonZeroU32) -> Self {
        NativeId(raw)
    }

    /// The raw GL object name
    pub fn get(&self) -> u32 {
        self.0.get()
    }

    /// The raw GL object name as NonZeroU32
    pub fn nonzero(&self) -> NonZeroU32 {
        self.0
    }
}

impl fmt::Display for NativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0.get())
    }
}

/// RAII owner of one GPU-side object
///
/// Holds the object's kind, native name and descriptive metadata, plus the
/// device that allocated it. Dropping the wrapper deletes the underlying
/// object exactly once. In debug builds the drop asserts the object is
/// valid immediately before deletion and invalid immediately after, which
/// catches double-free and use-after-free regressions during development.
///
/// Created only by the background loader or the render dispatcher, never by
/// both for the same object. Ownership moves into a shared resource slot on
/// publish and ends when the lesson session is torn down.
pub struct GpuObject {
    device: Arc<dyn GraphicsDevice>,
    kind: ResourceKind,
    id: NativeId,
    byte_size: Option<u64>,
    width: Option<u32>,
    height: Option<u32>,
}

impl GpuObject {
    /// Take ownership of a freshly created device object
    pub fn new(device: Arc<dyn GraphicsDevice>, kind: ResourceKind, id: NativeId) -> Self {
        Self {
            device,
            kind,
            id,
            byte_size: None,
            width: None,
            height: None,
        }
    }

    /// Record the object's storage size in bytes
    pub fn with_byte_size(mut self, byte_size: u64) -> Self {
        self.byte_size = Some(byte_size);
        self
    }

    /// Record the object's pixel dimensions (textures, renderbuffers)
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Kind of the underlying object
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Native object name
    pub fn id(&self) -> NativeId {
        self.id
    }

    /// Storage size in bytes, when known
    pub fn byte_size(&self) -> Option<u64> {
        self.byte_size
    }

    /// Pixel width, when the object is image-shaped
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// Pixel height, when the object is image-shaped
    pub fn height(&self) -> Option<u32> {
        self.height
    }
}

impl Drop for GpuObject {
    fn drop(&mut self) {
        debug_assert!(
            self.device.is_resource_valid(self.kind, self.id),
            "deleting dead {} {}",
            self.kind,
            self.id
        );

        self.device.delete_resource(self.kind, self.id);

        debug_assert!(
            !self.device.is_resource_valid(self.kind, self.id),
            "{} {} still valid after deletion",
            self.kind,
            self.id
        );
    }
}

impl fmt::Debug for GpuObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuObject")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("byte_size", &self.byte_size)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
