//! The scene protocol the renderer consumes.
//!
//! A figure owns a drawable surface and a set of views; each view exposes the
//! drawable objects in its scene. The renderer only ever asks a drawable how
//! its pipeline should look, so anything that can describe vertex and
//! fragment shaders can be rendered.

use std::hash::{Hash, Hasher};

use glint_native::{GpuApi, SurfaceId};

use crate::error::RenderError;

/// Pipeline-relevant description of one drawable object.
///
/// Carries raw SPIR-V; validation happens when the shader modules are built.
#[derive(Debug, Clone)]
pub struct PipelineDescription {
    pub vertex_shader: Vec<u8>,
    pub fragment_shader: Vec<u8>,
}

impl PipelineDescription {
    /// Fingerprint used to detect description changes between composes.
    pub(crate) fn fingerprint(&self) -> u64 {
        let mut hasher = std::hash::DefaultHasher::new();
        self.vertex_shader.hash(&mut hasher);
        self.fragment_shader.hash(&mut hasher);
        hasher.finish()
    }
}

/// An object that can be drawn.
pub trait Drawable {
    fn describe_pipeline(&self) -> PipelineDescription;
}

/// One view into a scene.
pub trait View {
    fn drawables(&self) -> Vec<&dyn Drawable>;
}

/// A drawable surface holding one or more views.
pub trait Figure {
    fn views(&self) -> Vec<&dyn View>;

    /// Current surface size in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Hands out the native surface for this figure's canvas.
    ///
    /// Called again whenever the swapchain is rebuilt, since a resized canvas
    /// may sit on a fresh platform surface.
    fn surface_id(&self, gpu: &dyn GpuApi) -> Result<SurfaceId, RenderError>;
}
