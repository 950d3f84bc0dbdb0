//! Minimal renderer over the native GPU binding.
//!
//! Composes a render pipeline from a scene description, owns the swapchain
//! for one drawable surface (rebuilding it on resize), and records one pass
//! per frame. The scene side is a small trait protocol so any figure/canvas
//! implementation can plug in; the GPU side is [`glint_native::GpuApi`], so
//! tests run against a recording double and applications against the loaded
//! library.
//!
//! ```rust,ignore
//! let gpu = Arc::new(NativeGpu::load(&LoadOptions::from_env())?);
//! let mut renderer = Renderer::new(gpu, RendererOptions::default())?;
//! renderer.compose_from_figure(&figure)?;
//! loop {
//!     renderer.draw_frame(&figure)?;
//! }
//! ```

pub mod error;
pub mod renderer;
pub mod scene;

pub use error::RenderError;
pub use renderer::{Renderer, RendererOptions};
pub use scene::{Drawable, Figure, PipelineDescription, View};
