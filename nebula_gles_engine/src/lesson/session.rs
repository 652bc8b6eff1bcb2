/// Lesson session - the aggregate of all shared resource slots

use std::sync::atomic::{AtomicBool, Ordering};

use rustc_hash::FxHashMap;

use crate::engine_bail;
use crate::error::Result;
use crate::asset::{Aabb, Material};
use crate::graphics_device::GpuObject;
use crate::lesson::slot::ResourceSlot;

// ============================================================================
// Resource groups (one per slot)
// ============================================================================

/// One compiled program with its resolved attribute and uniform locations
///
/// Locations are resolved by the loader right after linking; a lookup of an
/// undeclared name afterwards is a programming error and fails loudly.
pub struct CompiledProgram {
    label: String,
    object: GpuObject,
    attributes: FxHashMap<String, u32>,
    uniforms: FxHashMap<String, i32>,
}

impl CompiledProgram {
    pub fn new(
        label: String,
        object: GpuObject,
        attributes: FxHashMap<String, u32>,
        uniforms: FxHashMap<String, i32>,
    ) -> Self {
        Self {
            label,
            object,
            attributes,
            uniforms,
        }
    }

    /// Label the lesson uses to select this program
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The underlying program object
    pub fn object(&self) -> &GpuObject {
        &self.object
    }

    /// Resolved attribute location for a declared attribute name
    pub fn attribute(&self, name: &str) -> Result<u32> {
        match self.attributes.get(name) {
            Some(location) => Ok(*location),
            None => {
                engine_bail!("nebula::CompiledProgram",
                    "attribute '{}' was not declared for program '{}'", name, self.label);
            }
        }
    }

    /// Resolved uniform location for a declared uniform name
    pub fn uniform(&self, name: &str) -> Result<i32> {
        match self.uniforms.get(name) {
            Some(location) => Ok(*location),
            None => {
                engine_bail!("nebula::CompiledProgram",
                    "uniform '{}' was not declared for program '{}'", name, self.label);
            }
        }
    }
}

/// All shader programs of a lesson, published together
pub struct ProgramGroup {
    programs: Vec<CompiledProgram>,
}

impl ProgramGroup {
    pub fn new(programs: Vec<CompiledProgram>) -> Self {
        Self { programs }
    }

    /// Look a program up by label
    pub fn program(&self, label: &str) -> Result<&CompiledProgram> {
        match self.programs.iter().find(|p| p.label() == label) {
            Some(program) => Ok(program),
            None => {
                engine_bail!("nebula::ProgramGroup", "no program labeled '{}'", label);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

/// Depth attachment of an offscreen render target
///
/// Which variant gets built depends on the plan's preference and the
/// device's depth-texture capability.
pub enum DepthAttachment {
    /// 16-bit depth renderbuffer
    Renderbuffer(GpuObject),
    /// Depth texture (sampleable afterwards, e.g. for shadow mapping)
    Texture(GpuObject),
}

impl DepthAttachment {
    /// The underlying object, whichever variant backs it
    pub fn object(&self) -> &GpuObject {
        match self {
            DepthAttachment::Renderbuffer(object) => object,
            DepthAttachment::Texture(object) => object,
        }
    }
}

/// Offscreen render target: color texture + depth attachment + framebuffer
pub struct RenderTargetGroup {
    pub color: GpuObject,
    pub depth: DepthAttachment,
    pub framebuffer: GpuObject,
    pub width: u32,
    pub height: u32,
}

/// Uploaded model geometry plus its CPU-side material table
pub struct GeometryGroup {
    pub vertex_buffer: GpuObject,
    pub index_buffer: GpuObject,
    pub index_count: u32,
    pub materials: Vec<Material>,
    pub bounds: Aabb,
}

/// Material textures, looked up by asset name
pub struct TextureGroup {
    textures: FxHashMap<String, GpuObject>,
}

impl TextureGroup {
    pub fn new(textures: FxHashMap<String, GpuObject>) -> Self {
        Self { textures }
    }

    /// The texture for an asset name, if that texture was loaded
    pub fn get(&self, name: &str) -> Option<&GpuObject> {
        self.textures.get(name)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

// ============================================================================
// Lesson session
// ============================================================================

/// The shared state of one lesson run
///
/// Created at lesson initialize, shared between the background loader
/// (writer, one publish per slot) and the render thread (reader, every
/// frame), destroyed at teardown after the loader has quiesced.
pub struct LessonSession {
    // Field order is release order: the reverse of the loader's
    // acquisition order (programs, render target, geometry, textures).
    /// Material textures (loader step 4)
    pub textures: ResourceSlot<TextureGroup>,
    /// Model geometry (loader step 3)
    pub geometry: ResourceSlot<GeometryGroup>,
    /// Offscreen render target (loader step 2)
    pub render_target: ResourceSlot<RenderTargetGroup>,
    /// Shader programs (loader step 1)
    pub programs: ResourceSlot<ProgramGroup>,

    /// One-shot: the render context has re-attached the offscreen
    /// framebuffer (attachment state is per-context even though the
    /// attached objects are shared)
    render_target_attached: AtomicBool,

    /// Cooperative cancellation signal, checked by the loader between steps
    cancel: AtomicBool,
}

impl LessonSession {
    /// Fresh session: every slot not ready, flags clear
    pub fn new() -> Self {
        Self {
            textures: ResourceSlot::new(),
            geometry: ResourceSlot::new(),
            render_target: ResourceSlot::new(),
            programs: ResourceSlot::new(),
            render_target_attached: AtomicBool::new(false),
            cancel: AtomicBool::new(false),
        }
    }

    /// Whether the render context has performed its one-time re-attachment
    pub fn is_render_target_attached(&self) -> bool {
        self.render_target_attached.load(Ordering::Acquire)
    }

    /// Record that the one-time re-attachment has happened
    pub fn mark_render_target_attached(&self) {
        self.render_target_attached.store(true, Ordering::Release);
    }

    /// Ask the loader to stop after its current step
    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Release all published groups in reverse-acquisition order
    ///
    /// Called by the lifecycle controller after the loader has quiesced.
    pub(crate) fn release(mut self) {
        drop(self.textures.take());
        drop(self.geometry.take());
        drop(self.render_target.take());
        drop(self.programs.take());
    }
}

impl Default for LessonSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
