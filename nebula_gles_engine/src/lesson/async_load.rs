/// AsyncLoad lesson - asynchronous resource loading with progressive display
///
/// The flagship lesson of the handoff protocol. A background worker loads
/// two shader programs, a 512x512 offscreen render target, the figure model
/// and its material textures, publishing each group as it completes; the
/// render thread keeps presenting throughout, lighting features up as they
/// arrive: background only, then the untextured model with edge outlines,
/// then full texturing with the offscreen target spinning on a cube.

use crate::{engine_bail, engine_info};
use crate::error::Result;
use crate::asset::procedural::FIGURE_MODEL;
use crate::graphics_device::{
    DepthAttachmentKind, LoadPacing, PixelFormat, RenderTargetPlan, ResourceDescriptorSet,
    ShaderSourceDesc,
};
use crate::lesson::dispatcher::{
    RenderDispatcher, ATTR_NORMAL, ATTR_POSITION, ATTR_UV, EDGE_PROGRAM, TEXTURED_PROGRAM,
    UNIF_COLOR, UNIF_EDGE_SIZE, UNIF_TEX_DIFFUSE, UNIF_WLP,
};
use crate::lesson::lesson::{Lesson, LessonContext};
use crate::lesson::lifecycle::LifecycleController;

const SOURCE: &str = "nebula::AsyncLoadLesson";

/// Offscreen render target edge length in pixels
const TARGET_SIZE: u32 = 512;

/// Textured-or-flat main shader: zero uniform alpha selects the texture path
const TEXTURED_VERTEX_SHADER: &str = "\
attribute highp vec4 attr_pos;
attribute mediump vec2 attr_uv;
uniform highp mat4 unif_wlp;
varying mediump vec2 vary_uv;
void main() {
    gl_Position = unif_wlp * attr_pos;
    vary_uv = attr_uv;
}
";

const TEXTURED_FRAGMENT_SHADER: &str = "\
uniform lowp vec4 unif_color;
uniform sampler2D unif_tex_diffuse;
varying mediump vec2 vary_uv;
void main() {
    if (unif_color.a == 0.0) {
        gl_FragColor = texture2D(unif_tex_diffuse, vary_uv);
    } else {
        gl_FragColor = unif_color;
    }
}
";

/// Edge shader: pushes vertices outwards along their normals, drawn with
/// front-face culling for a silhouette outline
const EDGE_VERTEX_SHADER: &str = "\
attribute mediump vec3 attr_pos;
attribute mediump vec3 attr_normal;
uniform mediump float unif_edgesize;
uniform mediump mat4 unif_wlp;
void main() {
    gl_Position = unif_wlp * vec4(attr_pos + (attr_normal * unif_edgesize), 1.0);
}
";

const EDGE_FRAGMENT_SHADER: &str = "\
uniform lowp vec4 unif_color;
void main() {
    gl_FragColor = unif_color;
}
";

/// The asynchronous-loading lesson
pub struct AsyncLoadLesson {
    pacing: LoadPacing,
    controller: Option<LifecycleController>,
    dispatcher: RenderDispatcher,
}

impl AsyncLoadLesson {
    /// Lesson with no artificial load delays
    pub fn new() -> Self {
        Self::with_pacing(LoadPacing::immediate())
    }

    /// Lesson with a configured inter-step load delay (to make the
    /// progressive states observable)
    pub fn with_pacing(pacing: LoadPacing) -> Self {
        Self {
            pacing,
            controller: None,
            dispatcher: RenderDispatcher::new(),
        }
    }

    /// The declarative resource plan this lesson hands to the loader
    pub fn descriptor_set(pacing: LoadPacing) -> ResourceDescriptorSet {
        ResourceDescriptorSet {
            shaders: vec![
                ShaderSourceDesc {
                    label: TEXTURED_PROGRAM.to_string(),
                    vertex_source: TEXTURED_VERTEX_SHADER.to_string(),
                    fragment_source: TEXTURED_FRAGMENT_SHADER.to_string(),
                    attributes: vec![ATTR_POSITION.to_string(), ATTR_UV.to_string()],
                    uniforms: vec![
                        UNIF_WLP.to_string(),
                        UNIF_COLOR.to_string(),
                        UNIF_TEX_DIFFUSE.to_string(),
                    ],
                },
                ShaderSourceDesc {
                    label: EDGE_PROGRAM.to_string(),
                    vertex_source: EDGE_VERTEX_SHADER.to_string(),
                    fragment_source: EDGE_FRAGMENT_SHADER.to_string(),
                    attributes: vec![ATTR_POSITION.to_string(), ATTR_NORMAL.to_string()],
                    uniforms: vec![
                        UNIF_WLP.to_string(),
                        UNIF_COLOR.to_string(),
                        UNIF_EDGE_SIZE.to_string(),
                    ],
                },
            ],
            render_target: Some(RenderTargetPlan {
                width: TARGET_SIZE,
                height: TARGET_SIZE,
                color_format: PixelFormat::Rgba8,
                preferred_depth: DepthAttachmentKind::Renderbuffer16,
            }),
            model: FIGURE_MODEL.to_string(),
            pacing,
        }
    }
}

impl Default for AsyncLoadLesson {
    fn default() -> Self {
        Self::new()
    }
}

impl Lesson for AsyncLoadLesson {
    fn initialize(&mut self, ctx: &mut LessonContext) -> Result<()> {
        if self.controller.is_some() {
            engine_bail!(SOURCE, "lesson already initialized");
        }

        ctx.device.set_depth_test(true);
        ctx.device.set_face_culling(true);

        let descriptors = Self::descriptor_set(self.pacing);
        self.controller = Some(LifecycleController::start(
            ctx.worker_device.clone(),
            ctx.assets.clone(),
            descriptors,
        )?);

        engine_info!(SOURCE, "background load started");
        Ok(())
    }

    fn resize(&mut self, ctx: &mut LessonContext, width: u32, height: u32) -> Result<()> {
        ctx.surface_width = width;
        ctx.surface_height = height;
        ctx.device.set_viewport(0, 0, width, height);
        Ok(())
    }

    fn render_frame(&mut self, ctx: &mut LessonContext) -> Result<()> {
        let Some(controller) = &self.controller else {
            engine_bail!(SOURCE, "render_frame called before initialize");
        };
        self.dispatcher.render_frame(controller.session(), ctx)
    }

    fn destroy(&mut self, _ctx: &mut LessonContext) -> Result<()> {
        let Some(controller) = self.controller.take() else {
            engine_bail!(SOURCE, "destroy called before initialize");
        };

        // Dispatcher-owned objects go first, then the session's groups in
        // reverse-acquisition order.
        self.dispatcher.reset();
        controller.teardown()?;

        engine_info!(SOURCE, "lesson destroyed");
        Ok(())
    }
}

#[cfg(test)]
#[path = "async_load_tests.rs"]
mod tests;
