/// Background loader - prepares GPU resources on the worker context
///
/// Runs once per lesson, to completion, on its own thread against the
/// worker share context. Executes the descriptor set in a fixed order
/// (shaders, render target, geometry, textures) and publishes each group to
/// its shared resource slot immediately after a full device
/// synchronization, so the render thread lights features up progressively
/// instead of waiting for total completion.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use rustc_hash::FxHashMap;

use crate::{engine_error, engine_info, engine_warn};
use crate::error::{Error, Result};
use crate::asset::{AssetProvider, ModelData};
use crate::graphics_device::{
    BufferSpec, BufferUsage, DepthAttachmentKind, FilterMode, FramebufferStatus, GpuObject,
    GraphicsDevice, RenderTargetPlan, ResourceDescriptorSet, ResourceKind, ShaderSourceDesc,
    TextureSpec, WrapMode,
};
use crate::lesson::session::{
    CompiledProgram, DepthAttachment, GeometryGroup, LessonSession, ProgramGroup,
    RenderTargetGroup, TextureGroup,
};

const SOURCE: &str = "nebula::BackgroundLoader";

/// Background loader entry point
pub struct BackgroundLoader;

impl BackgroundLoader {
    /// Spawn the loader thread
    ///
    /// The worker device must be a share context of the render thread's
    /// device, current on no other thread. Any load failure is fatal: it is
    /// logged and the worker thread panics, which `LifecycleController::
    /// teardown` surfaces to the host.
    pub fn spawn(
        device: Arc<dyn GraphicsDevice>,
        assets: Arc<dyn AssetProvider>,
        descriptors: ResourceDescriptorSet,
        session: Arc<LessonSession>,
    ) -> Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("nebula-loader".to_string())
            .spawn(move || {
                if let Err(err) = Self::run(&device, &*assets, &descriptors, &session) {
                    engine_error!(SOURCE, "resource load failed: {}", err);
                    panic!("background resource load failed: {}", err);
                }
            })
            .map_err(|err| {
                Error::InitializationFailed(format!("failed to spawn loader thread: {}", err))
            })
    }

    /// Execute the full load sequence
    ///
    /// Every step ends with `device.finish()` *before* its publish: the
    /// render thread must never observe a handle whose GPU-side object is
    /// still being constructed.
    pub(crate) fn run(
        device: &Arc<dyn GraphicsDevice>,
        assets: &dyn AssetProvider,
        descriptors: &ResourceDescriptorSet,
        session: &LessonSession,
    ) -> Result<()> {
        // Step 1: shader programs
        Self::pace(descriptors);
        if session.is_cancelled() {
            engine_info!(SOURCE, "load cancelled before shader step");
            return Ok(());
        }
        let programs = Self::load_programs(device, &descriptors.shaders)?;
        let count = programs.len();
        device.finish();
        session.programs.publish(programs)?;
        engine_info!(SOURCE, "published {} shader program(s)", count);

        // Step 2: offscreen render target
        if let Some(plan) = &descriptors.render_target {
            Self::pace(descriptors);
            if session.is_cancelled() {
                engine_info!(SOURCE, "load cancelled before render target step");
                return Ok(());
            }
            let target = Self::load_render_target(device, plan)?;
            device.finish();
            session.render_target.publish(target)?;
            engine_info!(SOURCE, "published {}x{} render target", plan.width, plan.height);
        }

        // Step 3: model geometry
        Self::pace(descriptors);
        if session.is_cancelled() {
            engine_info!(SOURCE, "load cancelled before geometry step");
            return Ok(());
        }
        let model = assets.load_model(&descriptors.model)?;
        let texture_names: Vec<String> =
            model.texture_names().iter().map(|s| s.to_string()).collect();
        let geometry = Self::upload_geometry(device, model)?;
        let index_count = geometry.index_count;
        device.finish();
        session.geometry.publish(geometry)?;
        engine_info!(SOURCE, "published model geometry ({} indices)", index_count);

        // Step 4: material textures
        Self::pace(descriptors);
        if session.is_cancelled() {
            engine_info!(SOURCE, "load cancelled before texture step");
            return Ok(());
        }
        let textures = Self::load_textures(device, assets, &texture_names)?;
        let count = textures.len();
        device.finish();
        session.textures.publish(textures)?;
        engine_info!(SOURCE, "published {} material texture(s)", count);

        Ok(())
    }

    /// Sleep the configured inter-step delay
    fn pace(descriptors: &ResourceDescriptorSet) {
        let delay = descriptors.pacing.step_delay;
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    /// Compile and link every declared program and resolve its locations
    fn load_programs(
        device: &Arc<dyn GraphicsDevice>,
        shaders: &[ShaderSourceDesc],
    ) -> Result<ProgramGroup> {
        let mut programs = Vec::with_capacity(shaders.len());
        for desc in shaders {
            let id = device
                .compile_program(&desc.vertex_source, &desc.fragment_source)
                .map_err(|err| {
                    Error::BackendError(format!("program '{}': {}", desc.label, err))
                })?;
            let object = GpuObject::new(device.clone(), ResourceKind::Program, id);

            let mut attributes = FxHashMap::default();
            for name in &desc.attributes {
                attributes.insert(name.clone(), device.attrib_location(id, name)?);
            }
            let mut uniforms = FxHashMap::default();
            for name in &desc.uniforms {
                uniforms.insert(name.clone(), device.uniform_location(id, name)?);
            }

            programs.push(CompiledProgram::new(
                desc.label.clone(),
                object,
                attributes,
                uniforms,
            ));
        }
        Ok(ProgramGroup::new(programs))
    }

    /// Allocate color/depth storage, attach both, and validate completeness
    fn load_render_target(
        device: &Arc<dyn GraphicsDevice>,
        plan: &RenderTargetPlan,
    ) -> Result<RenderTargetGroup> {
        let color_spec = TextureSpec::render_target_color(plan.width, plan.height, plan.color_format);
        let color_id = device.create_texture(&color_spec)?;
        let color = GpuObject::new(device.clone(), ResourceKind::Texture2D, color_id)
            .with_dimensions(plan.width, plan.height)
            .with_byte_size(
                (plan.width * plan.height * plan.color_format.bytes_per_pixel()) as u64,
            );

        let depth = match plan.preferred_depth {
            DepthAttachmentKind::Texture if device.capabilities().depth_texture => {
                let depth_spec = TextureSpec::render_target_depth(plan.width, plan.height);
                let id = device.create_texture(&depth_spec)?;
                DepthAttachment::Texture(
                    GpuObject::new(device.clone(), ResourceKind::Texture2D, id)
                        .with_dimensions(plan.width, plan.height),
                )
            }
            kind => {
                if kind == DepthAttachmentKind::Texture {
                    engine_warn!(SOURCE,
                        "depth textures unsupported on this device, using a 16-bit renderbuffer");
                }
                let id = device.create_renderbuffer(plan.width, plan.height)?;
                DepthAttachment::Renderbuffer(
                    GpuObject::new(device.clone(), ResourceKind::Renderbuffer, id)
                        .with_dimensions(plan.width, plan.height),
                )
            }
        };

        let framebuffer_id = device.create_framebuffer()?;
        let framebuffer =
            GpuObject::new(device.clone(), ResourceKind::Framebuffer, framebuffer_id);

        // Attach on the worker context and validate. The binding can stay in
        // place afterwards: this context's binding state is invisible to the
        // render thread.
        device.bind_framebuffer(Some(framebuffer_id));
        device.attach_color_texture(color_id)?;
        match &depth {
            DepthAttachment::Renderbuffer(object) => {
                device.attach_depth_renderbuffer(object.id())?
            }
            DepthAttachment::Texture(object) => device.attach_depth_texture(object.id())?,
        }
        let status = device.framebuffer_status();
        if status != FramebufferStatus::Complete {
            return Err(Error::IncompleteFramebuffer(format!(
                "offscreen target failed validation on the worker context: {:?}",
                status
            )));
        }

        Ok(RenderTargetGroup {
            color,
            depth,
            framebuffer,
            width: plan.width,
            height: plan.height,
        })
    }

    /// Upload the model's vertex and index arrays into device buffers
    fn upload_geometry(
        device: &Arc<dyn GraphicsDevice>,
        model: ModelData,
    ) -> Result<GeometryGroup> {
        let bounds = model.bounding_box();
        let index_count = model.index_count();

        let vertex_spec = BufferSpec {
            usage: BufferUsage::Vertex,
            bytes: bytemuck::cast_slice(&model.vertices).to_vec(),
        };
        let vertex_id = device.create_buffer(vertex_spec.usage, &vertex_spec.bytes)?;
        let vertex_buffer = GpuObject::new(device.clone(), ResourceKind::VertexBuffer, vertex_id)
            .with_byte_size(vertex_spec.bytes.len() as u64);

        let index_spec = BufferSpec {
            usage: BufferUsage::Index,
            bytes: bytemuck::cast_slice(&model.indices).to_vec(),
        };
        let index_id = device.create_buffer(index_spec.usage, &index_spec.bytes)?;
        let index_buffer = GpuObject::new(device.clone(), ResourceKind::IndexBuffer, index_id)
            .with_byte_size(index_spec.bytes.len() as u64);

        Ok(GeometryGroup {
            vertex_buffer,
            index_buffer,
            index_count,
            materials: model.materials,
            bounds,
        })
    }

    /// Load and create every referenced material texture
    fn load_textures(
        device: &Arc<dyn GraphicsDevice>,
        assets: &dyn AssetProvider,
        names: &[String],
    ) -> Result<TextureGroup> {
        let mut textures = FxHashMap::default();
        for name in names {
            let pixels = assets.load_texture_pixels(name)?;
            let spec = TextureSpec {
                width: pixels.width,
                height: pixels.height,
                format: pixels.format,
                wrap: WrapMode::Repeat,
                filter: FilterMode::Linear,
                pixels: Some(pixels.pixels),
            };
            let id = device.create_texture(&spec)?;
            engine_info!(SOURCE, "material texture '{}' -> {}", name, id);
            textures.insert(
                name.clone(),
                GpuObject::new(device.clone(), ResourceKind::Texture2D, id)
                    .with_dimensions(spec.width, spec.height),
            );
        }
        Ok(TextureGroup::new(textures))
    }
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
