//! Frame orchestration: pipeline composition, swapchain lifecycle, drawing.
//!
//! One renderer drives one figure's surface. The expensive work (shader
//! modules, layouts, the render pipeline) happens in `compose_from_figure`
//! and is reused across frames; `draw_frame` only rebuilds the swapchain when
//! the observed surface size changes, then records and submits a single pass.

use std::sync::Arc;

use glint_native::{
    AdapterOptions, Backends, BindGroupConfig, BindGroupId, BindGroupLayoutConfig, Color,
    ColorAttachment, DeviceId, DeviceProfile, GpuApi, PipelineLayoutConfig, PowerPreference,
    PresentMode, RenderPassConfig, RenderPipelineConfig, RenderPipelineId, SpirvShader,
    StageConfig, SurfaceId, SwapChainConfig, SwapChainId, TextureFormat, TextureUsage,
};

use crate::error::RenderError;
use crate::scene::{Drawable, Figure};

/// Renderer configuration.
///
/// The defaults match the surfaces this targets today: Vulkan or Metal,
/// an sRGB BGRA swapchain, vsync, and a green clear so an empty frame is
/// visibly alive.
#[derive(Debug, Clone)]
pub struct RendererOptions {
    pub backends: Backends,
    pub power_preference: PowerPreference,
    pub device_profile: DeviceProfile,
    pub surface_format: TextureFormat,
    pub present_mode: PresentMode,
    pub clear_color: Color,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            backends: Backends::VULKAN | Backends::METAL,
            power_preference: PowerPreference::Default,
            device_profile: DeviceProfile {
                anisotropic_filtering: false,
                // The composed pipeline binds nothing; some adapters reject
                // higher limits for empty layouts.
                max_bind_groups: 0,
            },
            surface_format: TextureFormat::Bgra8UnormSrgb,
            present_mode: PresentMode::Vsync,
            clear_color: Color::GREEN,
        }
    }
}

struct ComposedPipeline {
    fingerprint: u64,
    render_pipeline: RenderPipelineId,
    bind_group: BindGroupId,
}

/// Drives one figure's surface through compose / resize / draw.
pub struct Renderer {
    gpu: Arc<dyn GpuApi>,
    device: DeviceId,
    options: RendererOptions,
    surface_size: (u32, u32),
    surface: Option<SurfaceId>,
    swap_chain: Option<SwapChainId>,
    pipeline: Option<ComposedPipeline>,
}

impl Renderer {
    /// Requests an adapter and device per `options`.
    ///
    /// The adapter request blocks until the native callback delivers; all
    /// further calls must stay on this thread, which owns the device.
    pub fn new(gpu: Arc<dyn GpuApi>, options: RendererOptions) -> Result<Self, RenderError> {
        let adapter = gpu.request_adapter(
            &AdapterOptions {
                power_preference: options.power_preference,
            },
            options.backends,
        )?;
        let device = gpu.request_device(adapter, &options.device_profile)?;
        log::info!("renderer device ready (adapter {adapter:?})");

        Ok(Self {
            gpu,
            device,
            options,
            surface_size: (0, 0),
            surface: None,
            swap_chain: None,
            pipeline: None,
        })
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// Collects the figure's drawables and composes the pipeline for the one
    /// object the minimal design supports.
    ///
    /// Cheap when the pipeline-relevant description is unchanged; a changed
    /// description triggers a full rebuild (there is no granular
    /// invalidation).
    pub fn compose_from_figure(&mut self, figure: &dyn Figure) -> Result<(), RenderError> {
        let mut drawables: Vec<&dyn Drawable> = Vec::new();
        for view in figure.views() {
            drawables.extend(view.drawables());
        }

        match drawables.as_slice() {
            [single] => self.compose_pipeline(*single),
            other => Err(RenderError::UnsupportedScene { found: other.len() }),
        }
    }

    fn compose_pipeline(&mut self, drawable: &dyn Drawable) -> Result<(), RenderError> {
        let description = drawable.describe_pipeline();
        let fingerprint = description.fingerprint();

        if let Some(composed) = &self.pipeline {
            if composed.fingerprint == fingerprint {
                log::trace!("pipeline description unchanged, keeping composed pipeline");
                return Ok(());
            }
        }
        if let Some(old) = self.pipeline.take() {
            // No destroy call exists for these ids; the native allocator
            // reclaims them with the device.
            log::debug!(
                "pipeline description changed; abandoning pipeline {:?} and bind group {:?}",
                old.render_pipeline,
                old.bind_group
            );
        }

        let vertex = SpirvShader::from_bytes(&description.vertex_shader)?;
        let fragment = SpirvShader::from_bytes(&description.fragment_shader)?;
        let vertex_module = self.gpu.create_shader_module(self.device, &vertex)?;
        let fragment_module = self.gpu.create_shader_module(self.device, &fragment)?;

        let bind_group_layout = self
            .gpu
            .create_bind_group_layout(self.device, &BindGroupLayoutConfig::default())?;
        let bind_group = self
            .gpu
            .create_bind_group(self.device, &BindGroupConfig::empty(bind_group_layout))?;
        let pipeline_layout = self
            .gpu
            .create_pipeline_layout(self.device, &PipelineLayoutConfig::default())?;

        let config = RenderPipelineConfig::with_stages(
            pipeline_layout,
            StageConfig::new(vertex_module),
            Some(StageConfig::new(fragment_module)),
            self.options.surface_format,
        );
        let render_pipeline = self.gpu.create_render_pipeline(self.device, &config)?;
        log::info!("composed render pipeline {render_pipeline:?}");

        self.pipeline = Some(ComposedPipeline {
            fingerprint,
            render_pipeline,
            bind_group,
        });
        Ok(())
    }

    /// Renders one frame to the figure's surface.
    ///
    /// Rebuilds the swapchain first if the surface size changed since the
    /// last frame. Any native failure aborts the frame and propagates; there
    /// is no partial-frame recovery.
    pub fn draw_frame(&mut self, figure: &dyn Figure) -> Result<(), RenderError> {
        let pipeline = self
            .pipeline
            .as_ref()
            .map(|composed| composed.render_pipeline)
            .ok_or(RenderError::NotComposed)?;

        let size = figure.size();
        if size.0 == 0 || size.1 == 0 {
            log::debug!("surface has zero size, skipping frame");
            return Ok(());
        }
        let swap_chain = self.ensure_swap_chain(figure, size)?;

        let texture_view = self.gpu.swap_chain_next_texture(swap_chain)?;
        let encoder = self.gpu.create_command_encoder(self.device)?;

        let pass_config = RenderPassConfig {
            color_attachments: vec![ColorAttachment::cleared(
                texture_view,
                self.options.clear_color,
            )]
            .into(),
            depth_stencil_attachment: None,
        };
        let pass = self.gpu.begin_render_pass(encoder, &pass_config)?;
        self.gpu.set_pipeline(pass, pipeline);
        self.gpu.draw(pass, 3, 1, 0, 0);
        self.gpu.end_render_pass(pass);

        let command_buffer = self.gpu.finish_encoder(encoder)?;
        let queue = self.gpu.queue(self.device)?;
        self.gpu.submit(queue, &[command_buffer]);
        self.gpu.present(swap_chain);
        Ok(())
    }

    /// Returns the live swapchain, rebuilding it when the size changed.
    ///
    /// Exactly one swapchain exists per (device, surface) pair; a superseded
    /// one is abandoned to the native allocator rather than destroyed (see
    /// DESIGN.md).
    fn ensure_swap_chain(
        &mut self,
        figure: &dyn Figure,
        size: (u32, u32),
    ) -> Result<SwapChainId, RenderError> {
        if size == self.surface_size {
            if let Some(swap_chain) = self.swap_chain {
                return Ok(swap_chain);
            }
        }

        let surface = figure.surface_id(self.gpu.as_ref())?;
        if let Some(old) = self.swap_chain.take() {
            log::debug!("surface resized to {size:?}; swap chain {old:?} superseded");
        }

        let config = SwapChainConfig {
            usage: TextureUsage::OUTPUT_ATTACHMENT,
            format: self.options.surface_format,
            width: size.0,
            height: size.1,
            present_mode: self.options.present_mode,
        };
        let swap_chain = self.gpu.create_swap_chain(self.device, surface, &config)?;

        self.surface = Some(surface);
        self.swap_chain = Some(swap_chain);
        self.surface_size = size;
        Ok(swap_chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{PipelineDescription, View};

    use std::cell::{Cell, RefCell};

    use glint_native::{
        AdapterId, BindGroupLayoutId, BindingError, CommandBufferId, CommandEncoderId,
        PipelineLayoutId, QueueId, RenderPassId, ShaderModuleId, TextureViewId,
    };
    use glint_native::raw::RawId;

    /// Records every call and mints sequential ids.
    #[derive(Default)]
    struct RecordingGpu {
        calls: RefCell<Vec<String>>,
        next_id: Cell<RawId>,
    }

    impl RecordingGpu {
        fn mint(&self, call: &str) -> RawId {
            self.calls.borrow_mut().push(call.to_owned());
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            id
        }

        fn count(&self, call: &str) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|recorded| recorded.as_str() == call)
                .count()
        }
    }

    impl GpuApi for RecordingGpu {
        fn request_adapter(
            &self,
            _options: &AdapterOptions,
            _backends: Backends,
        ) -> Result<AdapterId, BindingError> {
            Ok(AdapterId::from_raw(self.mint("request_adapter")))
        }

        fn request_device(
            &self,
            _adapter: AdapterId,
            _profile: &DeviceProfile,
        ) -> Result<DeviceId, BindingError> {
            Ok(DeviceId::from_raw(self.mint("request_device")))
        }

        fn create_shader_module(
            &self,
            _device: DeviceId,
            _shader: &SpirvShader,
        ) -> Result<ShaderModuleId, BindingError> {
            Ok(ShaderModuleId::from_raw(self.mint("create_shader_module")))
        }

        fn create_bind_group_layout(
            &self,
            _device: DeviceId,
            _config: &BindGroupLayoutConfig,
        ) -> Result<BindGroupLayoutId, BindingError> {
            Ok(BindGroupLayoutId::from_raw(
                self.mint("create_bind_group_layout"),
            ))
        }

        fn create_bind_group(
            &self,
            _device: DeviceId,
            _config: &BindGroupConfig,
        ) -> Result<BindGroupId, BindingError> {
            Ok(BindGroupId::from_raw(self.mint("create_bind_group")))
        }

        fn create_pipeline_layout(
            &self,
            _device: DeviceId,
            _config: &PipelineLayoutConfig,
        ) -> Result<PipelineLayoutId, BindingError> {
            Ok(PipelineLayoutId::from_raw(self.mint("create_pipeline_layout")))
        }

        fn create_render_pipeline(
            &self,
            _device: DeviceId,
            _config: &RenderPipelineConfig,
        ) -> Result<RenderPipelineId, BindingError> {
            Ok(RenderPipelineId::from_raw(self.mint("create_render_pipeline")))
        }

        fn create_surface(
            &self,
            _display: glint_native::raw_window_handle::RawDisplayHandle,
            _window: glint_native::raw_window_handle::RawWindowHandle,
        ) -> Result<SurfaceId, BindingError> {
            Ok(SurfaceId::from_raw(self.mint("create_surface")))
        }

        fn create_swap_chain(
            &self,
            _device: DeviceId,
            _surface: SurfaceId,
            _config: &SwapChainConfig,
        ) -> Result<SwapChainId, BindingError> {
            Ok(SwapChainId::from_raw(self.mint("create_swap_chain")))
        }

        fn swap_chain_next_texture(
            &self,
            _swap_chain: SwapChainId,
        ) -> Result<TextureViewId, BindingError> {
            Ok(TextureViewId::from_raw(self.mint("swap_chain_next_texture")))
        }

        fn create_command_encoder(
            &self,
            _device: DeviceId,
        ) -> Result<CommandEncoderId, BindingError> {
            Ok(CommandEncoderId::from_raw(self.mint("create_command_encoder")))
        }

        fn begin_render_pass(
            &self,
            _encoder: CommandEncoderId,
            _config: &RenderPassConfig,
        ) -> Result<RenderPassId, BindingError> {
            Ok(RenderPassId::from_raw(self.mint("begin_render_pass")))
        }

        fn set_pipeline(&self, _pass: RenderPassId, _pipeline: RenderPipelineId) {
            self.mint("set_pipeline");
        }

        fn draw(
            &self,
            _pass: RenderPassId,
            vertex_count: u32,
            instance_count: u32,
            _first_vertex: u32,
            _first_instance: u32,
        ) {
            assert_eq!((vertex_count, instance_count), (3, 1));
            self.mint("draw");
        }

        fn end_render_pass(&self, _pass: RenderPassId) {
            self.mint("end_render_pass");
        }

        fn finish_encoder(
            &self,
            _encoder: CommandEncoderId,
        ) -> Result<CommandBufferId, BindingError> {
            Ok(CommandBufferId::from_raw(self.mint("finish_encoder")))
        }

        fn queue(&self, _device: DeviceId) -> Result<QueueId, BindingError> {
            Ok(QueueId::from_raw(self.mint("queue")))
        }

        fn submit(&self, _queue: QueueId, buffers: &[CommandBufferId]) {
            assert_eq!(buffers.len(), 1);
            self.mint("submit");
        }

        fn present(&self, _swap_chain: SwapChainId) {
            self.mint("present");
        }
    }

    /// Minimal valid shader bytecode stand-ins.
    fn spirv_bytes(seed: u8) -> Vec<u8> {
        vec![seed; 16]
    }

    struct Triangle {
        vertex_shader: Vec<u8>,
        fragment_shader: Vec<u8>,
    }

    impl Drawable for Triangle {
        fn describe_pipeline(&self) -> PipelineDescription {
            PipelineDescription {
                vertex_shader: self.vertex_shader.clone(),
                fragment_shader: self.fragment_shader.clone(),
            }
        }
    }

    struct SingleView {
        drawables: Vec<Triangle>,
    }

    impl View for SingleView {
        fn drawables(&self) -> Vec<&dyn Drawable> {
            self.drawables
                .iter()
                .map(|triangle| triangle as &dyn Drawable)
                .collect()
        }
    }

    struct TestFigure {
        view: SingleView,
        size: Cell<(u32, u32)>,
    }

    impl TestFigure {
        fn with_drawables(count: usize) -> Self {
            let drawables = (0..count)
                .map(|index| Triangle {
                    vertex_shader: spirv_bytes(index as u8 + 1),
                    fragment_shader: spirv_bytes(index as u8 + 100),
                })
                .collect();
            Self {
                view: SingleView { drawables },
                size: Cell::new((640, 480)),
            }
        }

        fn resize(&self, size: (u32, u32)) {
            self.size.set(size);
        }
    }

    impl Figure for TestFigure {
        fn views(&self) -> Vec<&dyn View> {
            vec![&self.view]
        }

        fn size(&self) -> (u32, u32) {
            self.size.get()
        }

        fn surface_id(&self, _gpu: &dyn GpuApi) -> Result<SurfaceId, RenderError> {
            Ok(SurfaceId::from_raw(900))
        }
    }

    fn renderer_with(gpu: &Arc<RecordingGpu>) -> Renderer {
        Renderer::new(gpu.clone(), RendererOptions::default()).unwrap()
    }

    // ── composition ───────────────────────────────────────────────────────

    #[test]
    fn compose_builds_the_full_pipeline_chain() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut renderer = renderer_with(&gpu);
        let figure = TestFigure::with_drawables(1);

        renderer.compose_from_figure(&figure).unwrap();

        assert_eq!(gpu.count("create_shader_module"), 2);
        assert_eq!(gpu.count("create_bind_group_layout"), 1);
        assert_eq!(gpu.count("create_bind_group"), 1);
        assert_eq!(gpu.count("create_pipeline_layout"), 1);
        assert_eq!(gpu.count("create_render_pipeline"), 1);
    }

    #[test]
    fn empty_scene_is_rejected() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut renderer = renderer_with(&gpu);
        let figure = TestFigure::with_drawables(0);

        let err = renderer.compose_from_figure(&figure).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedScene { found: 0 }));
    }

    #[test]
    fn multi_object_scene_is_rejected() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut renderer = renderer_with(&gpu);
        let figure = TestFigure::with_drawables(2);

        let err = renderer.compose_from_figure(&figure).unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedScene { found: 2 }));
    }

    #[test]
    fn unchanged_description_skips_recompose() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut renderer = renderer_with(&gpu);
        let figure = TestFigure::with_drawables(1);

        renderer.compose_from_figure(&figure).unwrap();
        renderer.compose_from_figure(&figure).unwrap();

        assert_eq!(gpu.count("create_render_pipeline"), 1);
    }

    #[test]
    fn changed_description_rebuilds_pipeline() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut renderer = renderer_with(&gpu);
        let mut figure = TestFigure::with_drawables(1);

        renderer.compose_from_figure(&figure).unwrap();
        figure.view.drawables[0].fragment_shader = spirv_bytes(200);
        renderer.compose_from_figure(&figure).unwrap();

        assert_eq!(gpu.count("create_render_pipeline"), 2);
    }

    #[test]
    fn invalid_bytecode_fails_compose() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut renderer = renderer_with(&gpu);
        let mut figure = TestFigure::with_drawables(1);
        figure.view.drawables[0].vertex_shader = vec![0u8; 7];

        let err = renderer.compose_from_figure(&figure).unwrap_err();
        assert!(matches!(
            err,
            RenderError::Gpu(BindingError::InvalidShaderBytecode { len: 7 })
        ));
    }

    // ── drawing ───────────────────────────────────────────────────────────

    #[test]
    fn draw_before_compose_is_rejected() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut renderer = renderer_with(&gpu);
        let figure = TestFigure::with_drawables(1);

        assert!(matches!(
            renderer.draw_frame(&figure),
            Err(RenderError::NotComposed)
        ));
    }

    #[test]
    fn stable_size_draws_one_frame_without_rebuild() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut renderer = renderer_with(&gpu);
        let figure = TestFigure::with_drawables(1);
        renderer.compose_from_figure(&figure).unwrap();

        // First frame builds the initial swapchain.
        renderer.draw_frame(&figure).unwrap();
        assert_eq!(gpu.count("create_swap_chain"), 1);

        // Second frame at the same size reuses it.
        renderer.draw_frame(&figure).unwrap();
        assert_eq!(gpu.count("create_swap_chain"), 1);
        assert_eq!(gpu.count("draw"), 2);
        assert_eq!(gpu.count("present"), 2);
        assert_eq!(gpu.count("submit"), 2);
    }

    #[test]
    fn resize_rebuilds_swap_chain_exactly_once() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut renderer = renderer_with(&gpu);
        let figure = TestFigure::with_drawables(1);
        renderer.compose_from_figure(&figure).unwrap();

        renderer.draw_frame(&figure).unwrap();
        figure.resize((800, 600));
        renderer.draw_frame(&figure).unwrap();
        renderer.draw_frame(&figure).unwrap();

        assert_eq!(gpu.count("create_swap_chain"), 2);
        assert_eq!(gpu.count("draw"), 3);
    }

    #[test]
    fn zero_size_skips_the_frame() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut renderer = renderer_with(&gpu);
        let figure = TestFigure::with_drawables(1);
        renderer.compose_from_figure(&figure).unwrap();

        figure.resize((0, 480));
        renderer.draw_frame(&figure).unwrap();

        assert_eq!(gpu.count("create_swap_chain"), 0);
        assert_eq!(gpu.count("draw"), 0);
    }

    #[test]
    fn frame_ops_run_in_order() {
        let gpu = Arc::new(RecordingGpu::default());
        let mut renderer = renderer_with(&gpu);
        let figure = TestFigure::with_drawables(1);
        renderer.compose_from_figure(&figure).unwrap();
        renderer.draw_frame(&figure).unwrap();

        let calls = gpu.calls.borrow();
        let frame: Vec<&str> = calls
            .iter()
            .skip_while(|call| call.as_str() != "create_swap_chain")
            .map(String::as_str)
            .collect();
        assert_eq!(
            frame,
            [
                "create_swap_chain",
                "swap_chain_next_texture",
                "create_command_encoder",
                "begin_render_pass",
                "set_pipeline",
                "draw",
                "end_render_pass",
                "finish_encoder",
                "queue",
                "submit",
                "present",
            ]
        );
    }
}
