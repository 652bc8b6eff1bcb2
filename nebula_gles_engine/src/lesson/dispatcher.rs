/// Render dispatcher - the per-frame entry point of the handoff protocol
///
/// Safe to call at any point of the background loader's progress, including
/// before it has started. Consults the shared resource slots every frame
/// and renders whatever is available: background only, untextured model,
/// fully textured model plus the offscreen target shown on a spinning cube.
/// Never blocks on the loader.

use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::engine_info;
use crate::error::{Error, Result};
use crate::asset::{Aabb, ModelVertex};
use crate::graphics_device::{
    BufferUsage, ClearMask, CullFace, FramebufferStatus, GpuObject, GraphicsDevice, NativeId,
    ResourceKind, VertexAttribLayout,
};
use crate::lesson::lesson::LessonContext;
use crate::lesson::session::{DepthAttachment, LessonSession};

const SOURCE: &str = "nebula::RenderDispatcher";

// Program labels and shader interface names shared between the descriptor
// set and the draw code
pub const TEXTURED_PROGRAM: &str = "textured";
pub const EDGE_PROGRAM: &str = "edge";
pub const ATTR_POSITION: &str = "attr_pos";
pub const ATTR_NORMAL: &str = "attr_normal";
pub const ATTR_UV: &str = "attr_uv";
pub const UNIF_WLP: &str = "unif_wlp";
pub const UNIF_COLOR: &str = "unif_color";
pub const UNIF_TEX_DIFFUSE: &str = "unif_tex_diffuse";
pub const UNIF_EDGE_SIZE: &str = "unif_edgesize";

/// Width of the black outline drawn by the edge pass, in model units
const EDGE_SIZE: f32 = 0.025;

/// Cube buffers the dispatcher creates lazily on the render context for the
/// pass that displays the offscreen target
struct ScreenCube {
    vertex_buffer: GpuObject,
    index_buffer: GpuObject,
    index_count: u32,
}

/// Per-frame renderer over a lesson session
pub struct RenderDispatcher {
    rotate_degrees: f32,
    cube: Option<ScreenCube>,
}

impl RenderDispatcher {
    pub fn new() -> Self {
        Self {
            rotate_degrees: 0.0,
            cube: None,
        }
    }

    /// Drop dispatcher-owned GPU objects and reset animation state
    pub fn reset(&mut self) {
        self.cube = None;
        self.rotate_degrees = 0.0;
    }

    /// Render and present one frame
    pub fn render_frame(
        &mut self,
        session: &LessonSession,
        ctx: &mut LessonContext,
    ) -> Result<()> {
        let device = ctx.device.clone();

        self.ensure_render_target_attached(session, &device)?;

        device.set_clear_color(0.0, 1.0, 1.0, 1.0);
        device.clear(ClearMask::COLOR | ClearMask::DEPTH);

        // Offscreen pass into the render target
        if session.is_render_target_attached() {
            if let Some(target) = session.render_target.get() {
                device.bind_framebuffer(Some(target.framebuffer.id()));
                device.set_viewport(0, 0, target.width, target.height);
                device.set_clear_color(1.0, 1.0, 0.0, 1.0);
                device.clear(ClearMask::COLOR | ClearMask::DEPTH);
                self.draw_model(session, &device, target.width, target.height)?;
                device.bind_framebuffer(None);
            }
        }

        // Main scene
        device.set_viewport(0, 0, ctx.surface_width, ctx.surface_height);
        self.draw_model(session, &device, ctx.surface_width, ctx.surface_height)?;

        // Auxiliary cube sampling the offscreen target
        if session.is_render_target_attached() {
            if let Some(target) = session.render_target.get() {
                self.draw_screen_cube(
                    session,
                    &device,
                    target.color.id(),
                    ctx.surface_width,
                    ctx.surface_height,
                )?;
            }
        }

        self.rotate_degrees += 1.0;

        ctx.presenter.present_frame();
        Ok(())
    }

    /// One-time re-attachment of the offscreen framebuffer on the render
    /// context
    ///
    /// The color/depth objects are shared with the worker context, but the
    /// framebuffer *attachment* state established there is not guaranteed
    /// visible here; some drivers require re-binding the attachments on
    /// every context that renders into the framebuffer. Runs exactly once
    /// per session, on the first frame after the render-target slot becomes
    /// ready.
    fn ensure_render_target_attached(
        &self,
        session: &LessonSession,
        device: &Arc<dyn GraphicsDevice>,
    ) -> Result<()> {
        if session.is_render_target_attached() {
            return Ok(());
        }
        let Some(target) = session.render_target.get() else {
            return Ok(());
        };

        engine_info!(SOURCE, "initializing offscreen framebuffer on the render context");

        device.bind_framebuffer(Some(target.framebuffer.id()));
        device.attach_color_texture(target.color.id())?;
        match &target.depth {
            DepthAttachment::Renderbuffer(object) => {
                device.attach_depth_renderbuffer(object.id())?
            }
            DepthAttachment::Texture(object) => device.attach_depth_texture(object.id())?,
        }
        let status = device.framebuffer_status();
        device.bind_framebuffer(None);

        if status != FramebufferStatus::Complete {
            return Err(Error::IncompleteFramebuffer(format!(
                "offscreen target incomplete after re-attachment: {:?}",
                status
            )));
        }

        session.mark_render_target_attached();
        Ok(())
    }

    /// Draw the model if geometry and programs are available
    ///
    /// Per-material partial availability: a material whose texture has not
    /// been published yet renders with its flat diffuse color instead; the
    /// mesh itself always draws in full once geometry is ready.
    fn draw_model(
        &self,
        session: &LessonSession,
        device: &Arc<dyn GraphicsDevice>,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<()> {
        let Some(geometry) = session.geometry.get() else {
            return Ok(());
        };
        let Some(programs) = session.programs.get() else {
            return Ok(());
        };
        let textures = session.textures.get();

        let wlp = self.model_camera(&geometry.bounds, viewport_width, viewport_height);

        device.bind_vertex_buffer(Some(geometry.vertex_buffer.id()));
        device.bind_index_buffer(Some(geometry.index_buffer.id()));

        // Textured pass
        let main = programs.program(TEXTURED_PROGRAM)?;
        device.use_program(main.object().id());
        device.set_cull_face(CullFace::Back);

        let attr_pos = main.attribute(ATTR_POSITION)?;
        let attr_uv = main.attribute(ATTR_UV)?;
        device.enable_vertex_attrib(attr_pos);
        device.enable_vertex_attrib(attr_uv);
        device.vertex_attrib_pointer(VertexAttribLayout {
            location: attr_pos,
            components: 3,
            stride: ModelVertex::STRIDE,
            offset: ModelVertex::POSITION_OFFSET,
        });
        device.vertex_attrib_pointer(VertexAttribLayout {
            location: attr_uv,
            components: 2,
            stride: ModelVertex::STRIDE,
            offset: ModelVertex::UV_OFFSET,
        });
        device.set_uniform_mat4(main.uniform(UNIF_WLP)?, &wlp);

        let mut first_index = 0;
        for material in &geometry.materials {
            let texture = textures.as_ref().and_then(|group| {
                material
                    .diffuse_texture
                    .as_deref()
                    .and_then(|name| group.get(name))
            });
            match texture {
                Some(object) => {
                    // Zero alpha selects the texture path in the shader
                    device.bind_texture_2d(Some(object.id()));
                    device.set_uniform_sampler(main.uniform(UNIF_TEX_DIFFUSE)?, 0);
                    device.set_uniform_vec4(main.uniform(UNIF_COLOR)?, [0.0, 0.0, 0.0, 0.0]);
                }
                None => {
                    device.set_uniform_vec4(main.uniform(UNIF_COLOR)?, material.diffuse);
                }
            }
            device.draw_indexed(material.index_count, first_index)?;
            first_index += material.index_count;
        }

        // Edge pass: inside-out silhouette along vertex normals
        let edge = programs.program(EDGE_PROGRAM)?;
        device.use_program(edge.object().id());
        device.set_cull_face(CullFace::Front);

        let attr_pos = edge.attribute(ATTR_POSITION)?;
        let attr_normal = edge.attribute(ATTR_NORMAL)?;
        device.enable_vertex_attrib(attr_pos);
        device.enable_vertex_attrib(attr_normal);
        device.vertex_attrib_pointer(VertexAttribLayout {
            location: attr_pos,
            components: 3,
            stride: ModelVertex::STRIDE,
            offset: ModelVertex::POSITION_OFFSET,
        });
        device.vertex_attrib_pointer(VertexAttribLayout {
            location: attr_normal,
            components: 3,
            stride: ModelVertex::STRIDE,
            offset: ModelVertex::NORMAL_OFFSET,
        });
        device.set_uniform_mat4(edge.uniform(UNIF_WLP)?, &wlp);
        device.set_uniform_vec4(edge.uniform(UNIF_COLOR)?, [0.0, 0.0, 0.0, 1.0]);
        device.set_uniform_f32(edge.uniform(UNIF_EDGE_SIZE)?, EDGE_SIZE);
        device.draw_indexed(geometry.index_count, 0)?;

        device.set_cull_face(CullFace::Back);
        Ok(())
    }

    /// Draw the spinning cube textured with the offscreen target's color
    /// attachment
    fn draw_screen_cube(
        &mut self,
        session: &LessonSession,
        device: &Arc<dyn GraphicsDevice>,
        target_texture: NativeId,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Result<()> {
        let Some(programs) = session.programs.get() else {
            return Ok(());
        };
        let main = programs.program(TEXTURED_PROGRAM)?;

        if self.cube.is_none() {
            self.cube = Some(Self::create_screen_cube(device)?);
        }
        let Some(cube) = &self.cube else {
            return Ok(());
        };

        device.bind_vertex_buffer(Some(cube.vertex_buffer.id()));
        device.bind_index_buffer(Some(cube.index_buffer.id()));
        device.use_program(main.object().id());
        device.set_cull_face(CullFace::Back);

        let attr_pos = main.attribute(ATTR_POSITION)?;
        let attr_uv = main.attribute(ATTR_UV)?;
        device.enable_vertex_attrib(attr_pos);
        device.enable_vertex_attrib(attr_uv);
        device.vertex_attrib_pointer(VertexAttribLayout {
            location: attr_pos,
            components: 3,
            stride: ModelVertex::STRIDE,
            offset: ModelVertex::POSITION_OFFSET,
        });
        device.vertex_attrib_pointer(VertexAttribLayout {
            location: attr_uv,
            components: 2,
            stride: ModelVertex::STRIDE,
            offset: ModelVertex::UV_OFFSET,
        });

        device.set_uniform_mat4(
            main.uniform(UNIF_WLP)?,
            &self.cube_camera(viewport_width, viewport_height),
        );
        device.bind_texture_2d(Some(target_texture));
        device.set_uniform_sampler(main.uniform(UNIF_TEX_DIFFUSE)?, 0);
        device.set_uniform_vec4(main.uniform(UNIF_COLOR)?, [0.0, 0.0, 0.0, 0.0]);
        device.draw_indexed(cube.index_count, 0)?;
        Ok(())
    }

    /// Camera framing the model from its bounding box
    fn model_camera(&self, bounds: &Aabb, viewport_width: u32, viewport_height: u32) -> Mat4 {
        let eye = Vec3::new(0.0, bounds.max.y * 0.7, bounds.min.z * 7.0);
        let look = Vec3::new(0.0, bounds.max.y * 0.3, 0.0);
        let up = Vec3::Y;

        let near = 1.0;
        let far = (bounds.max.z - bounds.min.z) * 30.0;
        let aspect = viewport_width.max(1) as f32 / viewport_height.max(1) as f32;

        let view = Mat4::look_at_rh(eye, look, up);
        let projection = Mat4::perspective_rh_gl(45f32.to_radians(), aspect, near, far);
        let world = Mat4::from_axis_angle(Vec3::Y, self.rotate_degrees.to_radians());

        projection * view * world
    }

    /// Camera for the screen cube
    fn cube_camera(&self, viewport_width: u32, viewport_height: u32) -> Mat4 {
        let eye = Vec3::new(3.0, 3.0, -5.0);
        let look = Vec3::ZERO;
        let up = Vec3::Y;

        let aspect = viewport_width.max(1) as f32 / viewport_height.max(1) as f32;

        let view = Mat4::look_at_rh(eye, look, up);
        let projection = Mat4::perspective_rh_gl(45f32.to_radians(), aspect, 1.0, 100.0);
        let world = Mat4::from_axis_angle(
            Vec3::new(1.0, 1.0, 0.0).normalize(),
            self.rotate_degrees.to_radians(),
        );

        projection * view * world
    }

    /// Build the unit cube buffers on the render context
    fn create_screen_cube(device: &Arc<dyn GraphicsDevice>) -> Result<ScreenCube> {
        let (vertices, indices) = cube_mesh();

        let vertex_bytes: &[u8] = bytemuck::cast_slice(&vertices);
        let vertex_id = device.create_buffer(BufferUsage::Vertex, vertex_bytes)?;
        let vertex_buffer = GpuObject::new(device.clone(), ResourceKind::VertexBuffer, vertex_id)
            .with_byte_size(vertex_bytes.len() as u64);

        let index_bytes: &[u8] = bytemuck::cast_slice(&indices);
        let index_id = device.create_buffer(BufferUsage::Index, index_bytes)?;
        let index_buffer = GpuObject::new(device.clone(), ResourceKind::IndexBuffer, index_id)
            .with_byte_size(index_bytes.len() as u64);

        Ok(ScreenCube {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        })
    }
}

impl Default for RenderDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Unit cube mesh with per-face UVs, reusing the model vertex layout
fn cube_mesh() -> (Vec<ModelVertex>, Vec<u16>) {
    const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +X
        ([1.0, 0.0, 0.0], [[1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]]),
        // -X
        ([-1.0, 0.0, 0.0], [[-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0]]),
        // +Y
        ([0.0, 1.0, 0.0], [[-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
        // -Y
        ([0.0, -1.0, 0.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [-1.0, -1.0, -1.0]]),
        // +Z
        ([0.0, 0.0, 1.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
        // -Z
        ([0.0, 0.0, -1.0], [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]]),
    ];
    const CORNER_UVS: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in FACES {
        let base = vertices.len() as u16;
        for (corner, uv) in corners.iter().zip(CORNER_UVS) {
            vertices.push(ModelVertex {
                position: *corner,
                normal,
                uv,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    (vertices, indices)
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
