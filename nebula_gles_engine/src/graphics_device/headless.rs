/// Headless graphics device (no GPU required)
///
/// A GraphicsDevice implementation that allocates fake object names and
/// records every call, for tests and for driving lessons without a GPU.
///
/// Two behaviors make the resource handoff protocol observable:
///
/// - Objects created on a context stay *incomplete* until that context
///   calls `finish()`, mirroring commands that have been submitted but not
///   executed. Tests assert that every published object is complete.
/// - `share_context()` returns a second device sharing object storage but
///   NOT framebuffer attachment state, mirroring GL share groups. A
///   framebuffer attached on the loader context reports
///   `IncompleteMissingAttachment` on the render context until the render
///   context re-attaches, which forces the dispatcher's one-time fixup.

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    BufferUsage, ClearMask, CullFace, DeviceCapabilities, FramebufferStatus, GraphicsDevice,
    NativeId, ResourceKind, TextureSpec, VertexAttribLayout,
};
use crate::lesson::Presenter;

// ============================================================================
// Shared (cross-context) object storage
// ============================================================================

#[derive(Debug)]
struct ObjectRecord {
    kind: ResourceKind,
    alive: bool,
    /// Whether the GPU-side construction of this object has finished
    /// (set by `finish()` on the creating context)
    complete: bool,
}

#[derive(Default)]
struct SharedObjects {
    next_id: u32,
    objects: FxHashMap<u32, ObjectRecord>,
    /// Resolved attribute locations per (program, name)
    attrib_locations: FxHashMap<(u32, String), u32>,
    /// Resolved uniform locations per (program, name)
    uniform_locations: FxHashMap<(u32, String), i32>,
}

impl SharedObjects {
    fn allocate(&mut self, kind: ResourceKind) -> NativeId {
        self.next_id += 1;
        let raw = self.next_id;
        self.objects.insert(
            raw,
            ObjectRecord {
                kind,
                alive: true,
                complete: false,
            },
        );
        NativeId::new(raw).unwrap()
    }

    fn is_alive(&self, kind: ResourceKind, id: NativeId) -> bool {
        self.objects
            .get(&id.get())
            .map(|record| record.alive && record.kind == kind)
            .unwrap_or(false)
    }
}

// ============================================================================
// Per-context state
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
struct Attachments {
    color: Option<u32>,
    depth: Option<u32>,
}

#[derive(Default)]
struct ContextState {
    bound_framebuffer: Option<u32>,
    /// Framebuffer attachment state as visible from THIS context only
    attachments: FxHashMap<u32, Attachments>,
    /// Objects created on this context whose construction has not finished
    pending: Vec<u32>,
    bound_program: Option<u32>,
    ops: Vec<String>,
    finish_count: usize,
    draw_count: usize,
    attach_count: usize,
    texture_bind_count: usize,
}

// ============================================================================
// Headless device
// ============================================================================

/// GPU-less GraphicsDevice that records operations for inspection
pub struct HeadlessGraphicsDevice {
    caps: DeviceCapabilities,
    shared: Arc<Mutex<SharedObjects>>,
    context: Mutex<ContextState>,
}

impl HeadlessGraphicsDevice {
    /// Create a new primary headless context with default capabilities
    pub fn new() -> Self {
        Self::with_capabilities(DeviceCapabilities::default())
    }

    /// Create a new primary headless context with explicit capabilities
    pub fn with_capabilities(caps: DeviceCapabilities) -> Self {
        Self {
            caps,
            shared: Arc::new(Mutex::new(SharedObjects::default())),
            context: Mutex::new(ContextState::default()),
        }
    }

    /// Create a share context: same object storage, independent context
    /// state (bindings, framebuffer attachments, pending completions)
    pub fn share_context(&self) -> Self {
        Self {
            caps: self.caps,
            shared: self.shared.clone(),
            context: Mutex::new(ContextState::default()),
        }
    }

    fn record(&self, op: String) {
        self.context.lock().unwrap().ops.push(op);
    }

    fn allocate(&self, kind: ResourceKind, op: &str) -> NativeId {
        let id = self.shared.lock().unwrap().allocate(kind);
        let mut context = self.context.lock().unwrap();
        context.pending.push(id.get());
        context.ops.push(format!("{} -> {}", op, id));
        id
    }

    // ===== INSPECTION API (tests and the demo) =====

    /// Every operation recorded on this context, in call order
    pub fn op_log(&self) -> Vec<String> {
        self.context.lock().unwrap().ops.clone()
    }

    /// Number of `finish()` calls on this context
    pub fn finish_count(&self) -> usize {
        self.context.lock().unwrap().finish_count
    }

    /// Number of draw calls issued on this context
    pub fn draw_count(&self) -> usize {
        self.context.lock().unwrap().draw_count
    }

    /// Number of framebuffer attach calls issued on this context
    pub fn attach_count(&self) -> usize {
        self.context.lock().unwrap().attach_count
    }

    /// Number of texture binds issued on this context
    pub fn texture_bind_count(&self) -> usize {
        self.context.lock().unwrap().texture_bind_count
    }

    /// Whether the object's GPU-side construction has finished
    /// (i.e. the creating context called `finish()` after creating it)
    pub fn is_complete(&self, id: NativeId) -> bool {
        self.shared
            .lock()
            .unwrap()
            .objects
            .get(&id.get())
            .map(|record| record.alive && record.complete)
            .unwrap_or(false)
    }

    /// Number of objects currently alive in the share group
    pub fn live_object_count(&self) -> usize {
        self.shared
            .lock()
            .unwrap()
            .objects
            .values()
            .filter(|record| record.alive)
            .count()
    }
}

impl Default for HeadlessGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsDevice for HeadlessGraphicsDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.caps
    }

    fn compile_program(&self, vertex_source: &str, fragment_source: &str) -> Result<NativeId> {
        if vertex_source.trim().is_empty() || fragment_source.trim().is_empty() {
            return Err(Error::BackendError(
                "shader compilation failed: empty source".to_string(),
            ));
        }
        Ok(self.allocate(ResourceKind::Program, "compile_program"))
    }

    fn create_buffer(&self, usage: BufferUsage, data: &[u8]) -> Result<NativeId> {
        let kind = match usage {
            BufferUsage::Vertex => ResourceKind::VertexBuffer,
            BufferUsage::Index => ResourceKind::IndexBuffer,
        };
        Ok(self.allocate(kind, &format!("create_buffer({:?}, {} bytes)", usage, data.len())))
    }

    fn create_texture(&self, spec: &TextureSpec) -> Result<NativeId> {
        if let Some(pixels) = &spec.pixels {
            let expected = (spec.width * spec.height * spec.format.bytes_per_pixel()) as usize;
            if pixels.len() != expected {
                return Err(Error::InvalidResource(format!(
                    "texture data size mismatch: got {} bytes, expected {}",
                    pixels.len(),
                    expected
                )));
            }
        }
        Ok(self.allocate(
            ResourceKind::Texture2D,
            &format!("create_texture({}x{}, {:?})", spec.width, spec.height, spec.format),
        ))
    }

    fn create_renderbuffer(&self, width: u32, height: u32) -> Result<NativeId> {
        Ok(self.allocate(
            ResourceKind::Renderbuffer,
            &format!("create_renderbuffer({}x{})", width, height),
        ))
    }

    fn create_framebuffer(&self) -> Result<NativeId> {
        Ok(self.allocate(ResourceKind::Framebuffer, "create_framebuffer"))
    }

    fn bind_framebuffer(&self, framebuffer: Option<NativeId>) {
        let mut context = self.context.lock().unwrap();
        context.bound_framebuffer = framebuffer.map(|id| id.get());
        match framebuffer {
            Some(id) => context.ops.push(format!("bind_framebuffer {}", id)),
            None => context.ops.push("bind_framebuffer default".to_string()),
        }
    }

    fn attach_color_texture(&self, texture: NativeId) -> Result<()> {
        if !self.shared.lock().unwrap().is_alive(ResourceKind::Texture2D, texture) {
            return Err(Error::InvalidResource(format!(
                "attach_color_texture: dead texture {}",
                texture
            )));
        }
        let mut context = self.context.lock().unwrap();
        let Some(framebuffer) = context.bound_framebuffer else {
            return Err(Error::InvalidResource(
                "attach_color_texture: no framebuffer bound".to_string(),
            ));
        };
        context
            .attachments
            .entry(framebuffer)
            .or_default()
            .color = Some(texture.get());
        context.attach_count += 1;
        context.ops.push(format!("attach_color_texture {}", texture));
        Ok(())
    }

    fn attach_depth_renderbuffer(&self, renderbuffer: NativeId) -> Result<()> {
        if !self.shared.lock().unwrap().is_alive(ResourceKind::Renderbuffer, renderbuffer) {
            return Err(Error::InvalidResource(format!(
                "attach_depth_renderbuffer: dead renderbuffer {}",
                renderbuffer
            )));
        }
        let mut context = self.context.lock().unwrap();
        let Some(framebuffer) = context.bound_framebuffer else {
            return Err(Error::InvalidResource(
                "attach_depth_renderbuffer: no framebuffer bound".to_string(),
            ));
        };
        context
            .attachments
            .entry(framebuffer)
            .or_default()
            .depth = Some(renderbuffer.get());
        context.attach_count += 1;
        context
            .ops
            .push(format!("attach_depth_renderbuffer {}", renderbuffer));
        Ok(())
    }

    fn attach_depth_texture(&self, texture: NativeId) -> Result<()> {
        if !self.caps.depth_texture {
            return Err(Error::UnsupportedFeature(
                "depth texture attachment not supported".to_string(),
            ));
        }
        if !self.shared.lock().unwrap().is_alive(ResourceKind::Texture2D, texture) {
            return Err(Error::InvalidResource(format!(
                "attach_depth_texture: dead texture {}",
                texture
            )));
        }
        let mut context = self.context.lock().unwrap();
        let Some(framebuffer) = context.bound_framebuffer else {
            return Err(Error::InvalidResource(
                "attach_depth_texture: no framebuffer bound".to_string(),
            ));
        };
        context
            .attachments
            .entry(framebuffer)
            .or_default()
            .depth = Some(texture.get());
        context.attach_count += 1;
        context.ops.push(format!("attach_depth_texture {}", texture));
        Ok(())
    }

    fn framebuffer_status(&self) -> FramebufferStatus {
        let context = self.context.lock().unwrap();
        match context.bound_framebuffer {
            // The default framebuffer is always complete
            None => FramebufferStatus::Complete,
            Some(framebuffer) => {
                let attachments = context
                    .attachments
                    .get(&framebuffer)
                    .copied()
                    .unwrap_or_default();
                if attachments.color.is_none() {
                    FramebufferStatus::IncompleteMissingAttachment
                } else {
                    FramebufferStatus::Complete
                }
            }
        }
    }

    fn attrib_location(&self, program: NativeId, name: &str) -> Result<u32> {
        let mut shared = self.shared.lock().unwrap();
        if !shared.is_alive(ResourceKind::Program, program) {
            return Err(Error::InvalidResource(format!(
                "attrib_location: dead program {}",
                program
            )));
        }
        let next = shared
            .attrib_locations
            .keys()
            .filter(|(owner, _)| *owner == program.get())
            .count() as u32;
        Ok(*shared
            .attrib_locations
            .entry((program.get(), name.to_string()))
            .or_insert(next))
    }

    fn uniform_location(&self, program: NativeId, name: &str) -> Result<i32> {
        let mut shared = self.shared.lock().unwrap();
        if !shared.is_alive(ResourceKind::Program, program) {
            return Err(Error::InvalidResource(format!(
                "uniform_location: dead program {}",
                program
            )));
        }
        let next = shared
            .uniform_locations
            .keys()
            .filter(|(owner, _)| *owner == program.get())
            .count() as i32;
        Ok(*shared
            .uniform_locations
            .entry((program.get(), name.to_string()))
            .or_insert(next))
    }

    fn set_viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        self.record(format!("set_viewport({}, {}, {}, {})", x, y, width, height));
    }

    fn set_clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        self.record(format!("set_clear_color({}, {}, {}, {})", r, g, b, a));
    }

    fn clear(&self, mask: ClearMask) {
        self.record(format!("clear({:?})", mask));
    }

    fn set_depth_test(&self, enabled: bool) {
        self.record(format!("set_depth_test({})", enabled));
    }

    fn set_face_culling(&self, enabled: bool) {
        self.record(format!("set_face_culling({})", enabled));
    }

    fn set_cull_face(&self, face: CullFace) {
        self.record(format!("set_cull_face({:?})", face));
    }

    fn use_program(&self, program: NativeId) {
        let mut context = self.context.lock().unwrap();
        context.bound_program = Some(program.get());
        context.ops.push(format!("use_program {}", program));
    }

    fn bind_vertex_buffer(&self, buffer: Option<NativeId>) {
        match buffer {
            Some(id) => self.record(format!("bind_vertex_buffer {}", id)),
            None => self.record("bind_vertex_buffer none".to_string()),
        }
    }

    fn bind_index_buffer(&self, buffer: Option<NativeId>) {
        match buffer {
            Some(id) => self.record(format!("bind_index_buffer {}", id)),
            None => self.record("bind_index_buffer none".to_string()),
        }
    }

    fn enable_vertex_attrib(&self, location: u32) {
        self.record(format!("enable_vertex_attrib {}", location));
    }

    fn vertex_attrib_pointer(&self, layout: VertexAttribLayout) {
        self.record(format!(
            "vertex_attrib_pointer(loc {}, {} floats, stride {}, offset {})",
            layout.location, layout.components, layout.stride, layout.offset
        ));
    }

    fn bind_texture_2d(&self, texture: Option<NativeId>) {
        let mut context = self.context.lock().unwrap();
        match texture {
            Some(id) => {
                context.texture_bind_count += 1;
                context.ops.push(format!("bind_texture_2d {}", id));
            }
            None => context.ops.push("bind_texture_2d none".to_string()),
        }
    }

    fn set_uniform_mat4(&self, location: i32, _value: &Mat4) {
        self.record(format!("set_uniform_mat4(loc {})", location));
    }

    fn set_uniform_vec4(&self, location: i32, value: [f32; 4]) {
        self.record(format!("set_uniform_vec4(loc {}, {:?})", location, value));
    }

    fn set_uniform_f32(&self, location: i32, value: f32) {
        self.record(format!("set_uniform_f32(loc {}, {})", location, value));
    }

    fn set_uniform_sampler(&self, location: i32, unit: i32) {
        self.record(format!("set_uniform_sampler(loc {}, unit {})", location, unit));
    }

    fn draw_indexed(&self, index_count: u32, first_index: u32) -> Result<()> {
        let mut context = self.context.lock().unwrap();
        if context.bound_program.is_none() {
            return Err(Error::InvalidResource(
                "draw_indexed: no program bound".to_string(),
            ));
        }
        context.draw_count += 1;
        context
            .ops
            .push(format!("draw_indexed({}, {})", index_count, first_index));
        Ok(())
    }

    fn finish(&self) {
        let mut context = self.context.lock().unwrap();
        let mut shared = self.shared.lock().unwrap();
        for raw in context.pending.drain(..) {
            if let Some(record) = shared.objects.get_mut(&raw) {
                record.complete = true;
            }
        }
        context.finish_count += 1;
        context.ops.push("finish".to_string());
    }

    fn is_resource_valid(&self, kind: ResourceKind, id: NativeId) -> bool {
        self.shared.lock().unwrap().is_alive(kind, id)
    }

    fn delete_resource(&self, kind: ResourceKind, id: NativeId) {
        if let Some(record) = self.shared.lock().unwrap().objects.get_mut(&id.get()) {
            record.alive = false;
        }
        self.record(format!("delete {} {}", kind, id));
    }
}

// ============================================================================
// Headless presenter
// ============================================================================

/// Presenter that counts presented frames instead of swapping buffers
pub struct HeadlessPresenter {
    frames: Arc<AtomicUsize>,
}

impl HeadlessPresenter {
    /// Create a presenter that counts frames
    pub fn new() -> Self {
        Self {
            frames: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared counter handle, valid after the presenter moves into a context
    pub fn frame_counter(&self) -> Arc<AtomicUsize> {
        self.frames.clone()
    }
}

impl Default for HeadlessPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for HeadlessPresenter {
    fn present_frame(&mut self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
#[path = "headless_tests.rs"]
mod tests;
