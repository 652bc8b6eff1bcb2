/// GlowGraphicsDevice - OpenGL ES 2.0 implementation of GraphicsDevice

use std::num::NonZeroU32;
use std::sync::Mutex;

use glow::HasContext;
use rustc_hash::FxHashSet;

use nebula_gles_engine::glam::Mat4;
use nebula_gles_engine::nebula::device::{
    BufferUsage, ClearMask, CullFace, DeviceCapabilities, DeviceConfig, FramebufferStatus,
    GraphicsDevice, NativeId, ResourceKind, TextureSpec, VertexAttribLayout,
};
use nebula_gles_engine::{Error, Result};

use crate::convert;

/// OpenGL ES 2.0 graphics device over one glow context
///
/// One instance wraps one GL context. For asynchronous loading the host
/// creates a second context in the same share group and wraps it in a
/// second `GlowGraphicsDevice`; object storage is shared between the two,
/// binding and framebuffer-attachment state is not.
pub struct GlowGraphicsDevice {
    gl: glow::Context,
    config: DeviceConfig,
    caps: DeviceCapabilities,
    /// Default framebuffer captured at creation; zero on most platforms,
    /// nonzero where the surface itself is framebuffer-backed
    default_framebuffer: Option<glow::NativeFramebuffer>,
    /// Objects created through this device, for validity queries
    live: Mutex<FxHashSet<(ResourceKind, u32)>>,
}

// SAFETY: GL contexts are thread-affine; the engine's threading model makes
// each device instance current on exactly one thread (render thread or
// loader thread) and never migrates it. The `live` table is internally
// locked. Within that discipline, sharing references across threads is
// sound; establishing it is the host's responsibility, as with every GL
// binding.
unsafe impl Send for GlowGraphicsDevice {}
unsafe impl Sync for GlowGraphicsDevice {}

impl GlowGraphicsDevice {
    /// Wrap an existing glow context
    ///
    /// The context must be current on the calling thread. Queries the
    /// capability set and captures the current framebuffer binding as the
    /// default framebuffer.
    pub fn new(gl: glow::Context, config: DeviceConfig) -> Result<Self> {
        let depth_texture = gl
            .supported_extensions()
            .contains("GL_OES_depth_texture");
        let max_texture_size = unsafe { gl.get_parameter_i32(glow::MAX_TEXTURE_SIZE) };
        if max_texture_size <= 0 {
            return Err(Error::InitializationFailed(
                "GL_MAX_TEXTURE_SIZE query failed".to_string(),
            ));
        }

        let default_framebuffer = unsafe {
            let raw = gl.get_parameter_i32(glow::FRAMEBUFFER_BINDING);
            NonZeroU32::new(raw as u32).map(glow::NativeFramebuffer)
        };

        Ok(Self {
            gl,
            config,
            caps: DeviceCapabilities {
                depth_texture,
                max_texture_size: max_texture_size as u32,
            },
            default_framebuffer,
            live: Mutex::new(FxHashSet::default()),
        })
    }

    /// Check glGetError after a call when validation is enabled
    fn check(&self, what: &str) -> Result<()> {
        if !self.config.enable_validation {
            return Ok(());
        }
        let error = unsafe { self.gl.get_error() };
        if error != glow::NO_ERROR {
            return Err(Error::BackendError(format!(
                "GL error 0x{:04x} after {}",
                error, what
            )));
        }
        Ok(())
    }

    fn register(&self, kind: ResourceKind, raw: NonZeroU32) -> NativeId {
        self.live.lock().unwrap().insert((kind, raw.get()));
        NativeId::from_nonzero(raw)
    }

    fn compile_shader(&self, stage: u32, source: &str) -> Result<glow::NativeShader> {
        unsafe {
            let shader = self
                .gl
                .create_shader(stage)
                .map_err(Error::BackendError)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(Error::BackendError(format!(
                    "shader compilation failed: {}",
                    log
                )));
            }
            Ok(shader)
        }
    }
}

impl GraphicsDevice for GlowGraphicsDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.caps
    }

    fn compile_program(&self, vertex_source: &str, fragment_source: &str) -> Result<NativeId> {
        unsafe {
            let vertex = self.compile_shader(glow::VERTEX_SHADER, vertex_source)?;
            let fragment = match self.compile_shader(glow::FRAGMENT_SHADER, fragment_source) {
                Ok(shader) => shader,
                Err(err) => {
                    self.gl.delete_shader(vertex);
                    return Err(err);
                }
            };

            let program = self.gl.create_program().map_err(Error::BackendError)?;
            self.gl.attach_shader(program, vertex);
            self.gl.attach_shader(program, fragment);
            self.gl.link_program(program);

            // Shaders are owned by the program after linking
            self.gl.delete_shader(vertex);
            self.gl.delete_shader(fragment);

            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                self.gl.delete_program(program);
                return Err(Error::BackendError(format!(
                    "program linking failed: {}",
                    log
                )));
            }

            Ok(self.register(ResourceKind::Program, program.0))
        }
    }

    fn create_buffer(&self, usage: BufferUsage, data: &[u8]) -> Result<NativeId> {
        let target = convert::buffer_target(usage);
        unsafe {
            let buffer = self.gl.create_buffer().map_err(Error::BackendError)?;
            self.gl.bind_buffer(target, Some(buffer));
            self.gl.buffer_data_u8_slice(target, data, glow::STATIC_DRAW);
            self.check("buffer_data")?;
            let kind = match usage {
                BufferUsage::Vertex => ResourceKind::VertexBuffer,
                BufferUsage::Index => ResourceKind::IndexBuffer,
            };
            Ok(self.register(kind, buffer.0))
        }
    }

    fn create_texture(&self, spec: &TextureSpec) -> Result<NativeId> {
        if spec.width > self.caps.max_texture_size || spec.height > self.caps.max_texture_size {
            return Err(Error::InvalidResource(format!(
                "texture {}x{} exceeds GL_MAX_TEXTURE_SIZE ({})",
                spec.width, spec.height, self.caps.max_texture_size
            )));
        }
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

        let (internal_format, format, data_type) = convert::pixel_format(spec.format);
        unsafe {
            let texture = self.gl.create_texture().map_err(Error::BackendError)?;
            self.gl.bind_texture(glow::TEXTURE_2D, Some(texture));

            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_S,
                convert::wrap_mode(spec.wrap),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_WRAP_T,
                convert::wrap_mode(spec.wrap),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                convert::filter_mode(spec.filter),
            );
            self.gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                convert::filter_mode(spec.filter),
            );

            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format,
                spec.width as i32,
                spec.height as i32,
                0,
                format,
                data_type,
                spec.pixels.as_deref(),
            );
            self.check("tex_image_2d")?;

            Ok(self.register(ResourceKind::Texture2D, texture.0))
        }
    }

    fn create_renderbuffer(&self, width: u32, height: u32) -> Result<NativeId> {
        unsafe {
            let renderbuffer = self
                .gl
                .create_renderbuffer()
                .map_err(Error::BackendError)?;
            self.gl
                .bind_renderbuffer(glow::RENDERBUFFER, Some(renderbuffer));
            self.gl.renderbuffer_storage(
                glow::RENDERBUFFER,
                glow::DEPTH_COMPONENT16,
                width as i32,
                height as i32,
            );
            self.check("renderbuffer_storage")?;
            Ok(self.register(ResourceKind::Renderbuffer, renderbuffer.0))
        }
    }

    fn create_framebuffer(&self) -> Result<NativeId> {
        unsafe {
            let framebuffer = self
                .gl
                .create_framebuffer()
                .map_err(Error::BackendError)?;
            Ok(self.register(ResourceKind::Framebuffer, framebuffer.0))
        }
    }

    fn bind_framebuffer(&self, framebuffer: Option<NativeId>) {
        unsafe {
            match framebuffer {
                Some(id) => self.gl.bind_framebuffer(
                    glow::FRAMEBUFFER,
                    Some(glow::NativeFramebuffer(id.nonzero())),
                ),
                None => self
                    .gl
                    .bind_framebuffer(glow::FRAMEBUFFER, self.default_framebuffer),
            }
        }
    }

    fn attach_color_texture(&self, texture: NativeId) -> Result<()> {
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::COLOR_ATTACHMENT0,
                glow::TEXTURE_2D,
                Some(glow::NativeTexture(texture.nonzero())),
                0,
            );
        }
        self.check("framebuffer_texture_2d(color)")
    }

    fn attach_depth_renderbuffer(&self, renderbuffer: NativeId) -> Result<()> {
        unsafe {
            self.gl.framebuffer_renderbuffer(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::RENDERBUFFER,
                Some(glow::NativeRenderbuffer(renderbuffer.nonzero())),
            );
        }
        self.check("framebuffer_renderbuffer(depth)")
    }

    fn attach_depth_texture(&self, texture: NativeId) -> Result<()> {
        if !self.caps.depth_texture {
            return Err(Error::UnsupportedFeature(
                "GL_OES_depth_texture not supported".to_string(),
            ));
        }
        unsafe {
            self.gl.framebuffer_texture_2d(
                glow::FRAMEBUFFER,
                glow::DEPTH_ATTACHMENT,
                glow::TEXTURE_2D,
                Some(glow::NativeTexture(texture.nonzero())),
                0,
            );
        }
        self.check("framebuffer_texture_2d(depth)")
    }

    fn framebuffer_status(&self) -> FramebufferStatus {
        let gl_status = unsafe { self.gl.check_framebuffer_status(glow::FRAMEBUFFER) };
        convert::framebuffer_status(gl_status)
    }

    fn attrib_location(&self, program: NativeId, name: &str) -> Result<u32> {
        let program = glow::NativeProgram(program.nonzero());
        match unsafe { self.gl.get_attrib_location(program, name) } {
            Some(location) => Ok(location),
            None => Err(Error::InvalidResource(format!(
                "attribute '{}' not found in program",
                name
            ))),
        }
    }

    fn uniform_location(&self, program: NativeId, name: &str) -> Result<i32> {
        let program = glow::NativeProgram(program.nonzero());
        match unsafe { self.gl.get_uniform_location(program, name) } {
            Some(location) => Ok(location.0 as i32),
            None => Err(Error::InvalidResource(format!(
                "uniform '{}' not found in program",
                name
            ))),
        }
    }

    fn set_viewport(&self, x: i32, y: i32, width: u32, height: u32) {
        unsafe {
            self.gl.viewport(x, y, width as i32, height as i32);
        }
    }

    fn set_clear_color(&self, r: f32, g: f32, b: f32, a: f32) {
        unsafe {
            self.gl.clear_color(r, g, b, a);
        }
    }

    fn clear(&self, mask: ClearMask) {
        unsafe {
            self.gl.clear(convert::clear_bits(mask));
        }
    }

    fn set_depth_test(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::DEPTH_TEST);
            } else {
                self.gl.disable(glow::DEPTH_TEST);
            }
        }
    }

    fn set_face_culling(&self, enabled: bool) {
        unsafe {
            if enabled {
                self.gl.enable(glow::CULL_FACE);
            } else {
                self.gl.disable(glow::CULL_FACE);
            }
        }
    }

    fn set_cull_face(&self, face: CullFace) {
        unsafe {
            self.gl.cull_face(convert::cull_face(face));
        }
    }

    fn use_program(&self, program: NativeId) {
        unsafe {
            self.gl
                .use_program(Some(glow::NativeProgram(program.nonzero())));
        }
    }

    fn bind_vertex_buffer(&self, buffer: Option<NativeId>) {
        unsafe {
            self.gl.bind_buffer(
                glow::ARRAY_BUFFER,
                buffer.map(|id| glow::NativeBuffer(id.nonzero())),
            );
        }
    }

    fn bind_index_buffer(&self, buffer: Option<NativeId>) {
        unsafe {
            self.gl.bind_buffer(
                glow::ELEMENT_ARRAY_BUFFER,
                buffer.map(|id| glow::NativeBuffer(id.nonzero())),
            );
        }
    }

    fn enable_vertex_attrib(&self, location: u32) {
        unsafe {
            self.gl.enable_vertex_attrib_array(location);
        }
    }

    fn vertex_attrib_pointer(&self, layout: VertexAttribLayout) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                layout.location,
                layout.components,
                glow::FLOAT,
                false,
                layout.stride,
                layout.offset,
            );
        }
    }

    fn bind_texture_2d(&self, texture: Option<NativeId>) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0);
            self.gl.bind_texture(
                glow::TEXTURE_2D,
                texture.map(|id| glow::NativeTexture(id.nonzero())),
            );
        }
    }

    fn set_uniform_mat4(&self, location: i32, value: &Mat4) {
        let location = glow::NativeUniformLocation(location as u32);
        unsafe {
            self.gl
                .uniform_matrix_4_f32_slice(Some(&location), false, &value.to_cols_array());
        }
    }

    fn set_uniform_vec4(&self, location: i32, value: [f32; 4]) {
        let location = glow::NativeUniformLocation(location as u32);
        unsafe {
            self.gl
                .uniform_4_f32(Some(&location), value[0], value[1], value[2], value[3]);
        }
    }

    fn set_uniform_f32(&self, location: i32, value: f32) {
        let location = glow::NativeUniformLocation(location as u32);
        unsafe {
            self.gl.uniform_1_f32(Some(&location), value);
        }
    }

    fn set_uniform_sampler(&self, location: i32, unit: i32) {
        let location = glow::NativeUniformLocation(location as u32);
        unsafe {
            self.gl.uniform_1_i32(Some(&location), unit);
        }
    }

    fn draw_indexed(&self, index_count: u32, first_index: u32) -> Result<()> {
        unsafe {
            self.gl.draw_elements(
                glow::TRIANGLES,
                index_count as i32,
                glow::UNSIGNED_SHORT,
                (first_index * 2) as i32,
            );
        }
        self.check("draw_elements")
    }

    fn finish(&self) {
        unsafe {
            self.gl.finish();
        }
    }

    fn is_resource_valid(&self, kind: ResourceKind, id: NativeId) -> bool {
        self.live.lock().unwrap().contains(&(kind, id.get()))
    }

    fn delete_resource(&self, kind: ResourceKind, id: NativeId) {
        unsafe {
            match kind {
                ResourceKind::Program => self
                    .gl
                    .delete_program(glow::NativeProgram(id.nonzero())),
                ResourceKind::VertexBuffer | ResourceKind::IndexBuffer => {
                    self.gl.delete_buffer(glow::NativeBuffer(id.nonzero()))
                }
                ResourceKind::Texture2D => self
                    .gl
                    .delete_texture(glow::NativeTexture(id.nonzero())),
                ResourceKind::Renderbuffer => self
                    .gl
                    .delete_renderbuffer(glow::NativeRenderbuffer(id.nonzero())),
                ResourceKind::Framebuffer => self
                    .gl
                    .delete_framebuffer(glow::NativeFramebuffer(id.nonzero())),
            }
        }
        self.live.lock().unwrap().remove(&(kind, id.get()));
    }
}
