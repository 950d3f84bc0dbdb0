use glint_native::BindingError;
use thiserror::Error;

/// Failure while composing a pipeline or drawing a frame.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The scene does not hold exactly one drawable object.
    #[error("scene holds {found} drawable object(s); exactly one is supported")]
    UnsupportedScene { found: usize },

    /// `draw_frame` was called before a pipeline was composed.
    #[error("no pipeline composed for this renderer yet")]
    NotComposed,

    /// The figure could not hand out a drawable surface.
    #[error("window system error: {0}")]
    Window(String),

    /// A native call failed; propagated unchanged.
    #[error(transparent)]
    Gpu(#[from] BindingError),
}
