//! Windowed triangle demo: a winit canvas embedding the glint renderer.
//!
//! Usage: `glint-studio <vertex.spv> <fragment.spv>`
//!
//! The native library is resolved through `WGPU_LIB_PATH` / `WGPU_DEBUG`
//! (see `glint_native::LoadOptions::from_env`). The window redraws
//! continuously and the swapchain follows resizes.

mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::{Window, WindowId};

use glint_native::{GpuApi, LoadOptions, NativeGpu, SurfaceId};
use glint_render::{
    Drawable, Figure, PipelineDescription, RenderError, Renderer, RendererOptions, View,
};

/// The one drawable object of the demo scene.
struct TriangleMesh {
    vertex_shader: Vec<u8>,
    fragment_shader: Vec<u8>,
}

impl Drawable for TriangleMesh {
    fn describe_pipeline(&self) -> PipelineDescription {
        PipelineDescription {
            vertex_shader: self.vertex_shader.clone(),
            fragment_shader: self.fragment_shader.clone(),
        }
    }
}

struct CanvasView {
    mesh: TriangleMesh,
}

impl View for CanvasView {
    fn drawables(&self) -> Vec<&dyn Drawable> {
        vec![&self.mesh]
    }
}

/// A winit window playing the figure role: it owns the canvas the renderer
/// draws into and hands out its native surface.
struct CanvasFigure {
    window: Window,
    view: CanvasView,
}

impl Figure for CanvasFigure {
    fn views(&self) -> Vec<&dyn View> {
        vec![&self.view]
    }

    fn size(&self) -> (u32, u32) {
        let size = self.window.inner_size();
        (size.width, size.height)
    }

    fn surface_id(&self, gpu: &dyn GpuApi) -> Result<SurfaceId, RenderError> {
        let display = self
            .window
            .display_handle()
            .map_err(|err| RenderError::Window(err.to_string()))?
            .as_raw();
        let window = self
            .window
            .window_handle()
            .map_err(|err| RenderError::Window(err.to_string()))?
            .as_raw();
        Ok(gpu.create_surface(display, window)?)
    }
}

struct StudioApp {
    renderer: Renderer,
    /// Shader bytecode parked here until the window exists.
    shaders: Option<(Vec<u8>, Vec<u8>)>,
    figure: Option<CanvasFigure>,
}

impl ApplicationHandler for StudioApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.figure.is_some() {
            return;
        }
        let Some((vertex_shader, fragment_shader)) = self.shaders.take() else {
            return;
        };

        let attrs = Window::default_attributes()
            .with_title("glint triangle")
            .with_inner_size(LogicalSize::new(640.0, 480.0));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => window,
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        let figure = CanvasFigure {
            window,
            view: CanvasView {
                mesh: TriangleMesh {
                    vertex_shader,
                    fragment_shader,
                },
            },
        };

        if let Err(err) = self.renderer.compose_from_figure(&figure) {
            log::error!("failed to compose pipeline: {err}");
            event_loop.exit();
            return;
        }

        figure.window.request_redraw();
        self.figure = Some(figure);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                // The renderer notices the new size on the next frame.
                if let Some(figure) = &self.figure {
                    figure.window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                let Some(figure) = &self.figure else { return };
                if let Err(err) = self.renderer.draw_frame(figure) {
                    log::error!("frame failed: {err}");
                    event_loop.exit();
                    return;
                }
                // Continuous redraw; invalidation-based scheduling can come
                // from the embedding toolkit later.
                figure.window.request_redraw();
            }

            _ => {}
        }
    }
}

fn main() -> Result<()> {
    logging::init_logging(logging::LoggingConfig::default());

    let mut args = std::env::args().skip(1);
    let usage = "usage: glint-studio <vertex.spv> <fragment.spv>";
    let vertex_path = args.next().context(usage)?;
    let fragment_path = args.next().context(usage)?;
    let vertex_shader = std::fs::read(&vertex_path)
        .with_context(|| format!("failed to read vertex shader {vertex_path}"))?;
    let fragment_shader = std::fs::read(&fragment_path)
        .with_context(|| format!("failed to read fragment shader {fragment_path}"))?;

    let gpu = Arc::new(
        NativeGpu::load(&LoadOptions::from_env()).context("failed to load wgpu_native")?,
    );
    // env_logger has settled the host threshold by now; mirror it natively.
    gpu.sync_log_level();
    log::info!("loaded wgpu_native {:?}", gpu.version());

    let renderer = Renderer::new(gpu, RendererOptions::default())
        .context("failed to initialize renderer")?;

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    let mut app = StudioApp {
        renderer,
        shaders: Some((vertex_shader, fragment_shader)),
        figure: None,
    };
    event_loop
        .run_app(&mut app)
        .context("winit event loop terminated with error")?;

    Ok(())
}
