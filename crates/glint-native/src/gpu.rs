//! The loaded native library and the facade trait over it.
//!
//! [`NativeGpu`] owns the open library plus its resolved function table and
//! implements [`GpuApi`], the object-safe surface the render layer drives.
//! Keeping the operations behind a trait leaves a seam for test doubles;
//! nothing else is generic over it.

use std::ffi::c_void;
use std::sync::Once;

use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use crate::descriptors::{
    AdapterOptions, BindGroupConfig, BindGroupLayoutConfig, DeviceProfile, PipelineLayoutConfig,
    RenderPassConfig, RenderPipelineConfig, SpirvShader, SwapChainConfig,
};
use crate::error::{BindingError, LoadError};
use crate::handles::{
    AdapterId, BindGroupId, BindGroupLayoutId, CommandBufferId, CommandEncoderId, DeviceId,
    PipelineLayoutId, QueueId, RenderPassId, RenderPipelineId, ShaderModuleId, SurfaceId,
    SwapChainId, TextureViewId,
};
use crate::loader::LoadOptions;
use crate::raw::{self, Backends, RawId};
use crate::{header, log_bridge, request};

/// The wgpu_native version this binding was written against.
///
/// A different loaded version is worth a warning, not a failure; patch
/// releases are normally compatible.
pub const EXPECTED_VERSION: (u8, u8, u8) = (0, 4, 0);

/// Operations the render layer needs from the native library, one creation
/// call per resource type plus the per-frame commands.
pub trait GpuApi {
    /// Requests an adapter for the given backends, blocking until the native
    /// callback delivers one.
    fn request_adapter(
        &self,
        options: &AdapterOptions,
        backends: Backends,
    ) -> Result<AdapterId, BindingError>;

    fn request_device(
        &self,
        adapter: AdapterId,
        profile: &DeviceProfile,
    ) -> Result<DeviceId, BindingError>;

    fn create_shader_module(
        &self,
        device: DeviceId,
        shader: &SpirvShader,
    ) -> Result<ShaderModuleId, BindingError>;

    fn create_bind_group_layout(
        &self,
        device: DeviceId,
        config: &BindGroupLayoutConfig,
    ) -> Result<BindGroupLayoutId, BindingError>;

    fn create_bind_group(
        &self,
        device: DeviceId,
        config: &BindGroupConfig,
    ) -> Result<BindGroupId, BindingError>;

    fn create_pipeline_layout(
        &self,
        device: DeviceId,
        config: &PipelineLayoutConfig,
    ) -> Result<PipelineLayoutId, BindingError>;

    fn create_render_pipeline(
        &self,
        device: DeviceId,
        config: &RenderPipelineConfig,
    ) -> Result<RenderPipelineId, BindingError>;

    /// Builds a native surface from raw window-system handles.
    fn create_surface(
        &self,
        display: RawDisplayHandle,
        window: RawWindowHandle,
    ) -> Result<SurfaceId, BindingError>;

    fn create_swap_chain(
        &self,
        device: DeviceId,
        surface: SurfaceId,
        config: &SwapChainConfig,
    ) -> Result<SwapChainId, BindingError>;

    /// Acquires the next presentation texture; failure is fatal to the frame.
    fn swap_chain_next_texture(
        &self,
        swap_chain: SwapChainId,
    ) -> Result<TextureViewId, BindingError>;

    fn create_command_encoder(&self, device: DeviceId)
    -> Result<CommandEncoderId, BindingError>;

    fn begin_render_pass(
        &self,
        encoder: CommandEncoderId,
        config: &RenderPassConfig,
    ) -> Result<RenderPassId, BindingError>;

    fn set_pipeline(&self, pass: RenderPassId, pipeline: RenderPipelineId);

    fn draw(
        &self,
        pass: RenderPassId,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    );

    fn end_render_pass(&self, pass: RenderPassId);

    fn finish_encoder(&self, encoder: CommandEncoderId)
    -> Result<CommandBufferId, BindingError>;

    fn queue(&self, device: DeviceId) -> Result<QueueId, BindingError>;

    fn submit(&self, queue: QueueId, buffers: &[CommandBufferId]);

    fn present(&self, swap_chain: SwapChainId);
}

/// The loaded `wgpu_native` library.
///
/// There is one logical instance per process: the log callback registration
/// is process-wide and guarded, and the function table stays valid only while
/// the library handle held here is open.
pub struct NativeGpu {
    sym: raw::Symbols,
    lib: libloading::Library,
}

static LOG_CALLBACK: Once = Once::new();

impl NativeGpu {
    /// Resolves, opens, and wires up the native library.
    ///
    /// Registers the logging callback (once per process), pushes the current
    /// host log threshold down, and runs the version handshake and symbol
    /// audit. Loader failures are fatal to the caller; there is no retry.
    pub fn load(options: &LoadOptions) -> Result<Self, LoadError> {
        let path = options.resolve()?;
        log::debug!("loading wgpu_native from {}", path.display());

        let lib = unsafe { libloading::Library::new(&path) }?;
        let sym = unsafe { raw::Symbols::resolve(&lib)? };
        let gpu = NativeGpu { sym, lib };

        LOG_CALLBACK.call_once(|| {
            unsafe { (gpu.sym.set_log_callback)(log_bridge::native_log_callback) };
        });
        gpu.sync_log_level();
        gpu.check_version();
        gpu.audit_exports();

        Ok(gpu)
    }

    /// The loaded library's version triple.
    pub fn version(&self) -> (u8, u8, u8) {
        unpack_version(unsafe { (self.sym.get_version)() })
    }

    /// Pushes an explicit severity threshold down to the native logger.
    ///
    /// Safe to call repeatedly; the host may change its log level at runtime.
    pub fn set_log_threshold(&self, threshold: u32) {
        let level = log_bridge::native_level_for_threshold(threshold);
        unsafe { (self.sym.set_log_level)(level) };
    }

    /// Re-propagates the host's current maximum log level to the native side.
    ///
    /// Call after reconfiguring the host logger.
    pub fn sync_log_level(&self) {
        self.set_log_threshold(log_bridge::threshold_for_filter(log::max_level()));
    }

    fn check_version(&self) {
        let loaded = self.version();
        if loaded != EXPECTED_VERSION {
            log::warn!(
                "expected wgpu_native version {:?} but loaded {:?}; continuing anyway",
                EXPECTED_VERSION,
                loaded
            );
        }
    }

    /// Probes every function the vendored header declares and warns about
    /// missing exports. Diagnostics only; the required table was already
    /// resolved.
    fn audit_exports(&self) {
        let declarations = header::normalize(include_str!("../wgpu.h"));
        for name in header::function_names(&declarations) {
            if unsafe { self.lib.get::<*mut c_void>(name.as_bytes()) }.is_err() {
                log::warn!("declared function `{name}` is not exported by the loaded library");
            }
        }
    }
}

/// Splits the packed `wgpu_get_version` value into `(major, minor, patch)`.
fn unpack_version(packed: u32) -> (u8, u8, u8) {
    ((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
}

/// Trampoline handed to `wgpu_request_adapter_async`; `userdata` carries the
/// boxed sender for this request.
unsafe extern "C" fn adapter_callback(received: RawId, userdata: *mut c_void) {
    let sender = unsafe { Box::from_raw(userdata.cast::<request::Sender<RawId>>()) };
    sender.send(received);
}

impl GpuApi for NativeGpu {
    fn request_adapter(
        &self,
        options: &AdapterOptions,
        backends: Backends,
    ) -> Result<AdapterId, BindingError> {
        let raw_options = options.as_raw();
        let (sender, receiver) = request::oneshot::<RawId>();
        let userdata = Box::into_raw(Box::new(sender)).cast::<c_void>();

        unsafe {
            (self.sym.request_adapter_async)(
                &raw_options,
                backends.bits(),
                adapter_callback,
                userdata,
            );
        }

        let received = pollster::block_on(receiver);
        AdapterId::checked(received, "wgpu_request_adapter_async")
            .map_err(|_| BindingError::NoAdapter)
    }

    fn request_device(
        &self,
        adapter: AdapterId,
        profile: &DeviceProfile,
    ) -> Result<DeviceId, BindingError> {
        let descriptor = profile.as_raw();
        let raw = unsafe { (self.sym.adapter_request_device)(adapter.to_raw(), &descriptor) };
        DeviceId::checked(raw, "wgpu_adapter_request_device")
    }

    fn create_shader_module(
        &self,
        device: DeviceId,
        shader: &SpirvShader,
    ) -> Result<ShaderModuleId, BindingError> {
        let descriptor = shader.as_raw();
        let raw =
            unsafe { (self.sym.device_create_shader_module)(device.to_raw(), &descriptor) };
        ShaderModuleId::checked(raw, "wgpu_device_create_shader_module")
    }

    fn create_bind_group_layout(
        &self,
        device: DeviceId,
        config: &BindGroupLayoutConfig,
    ) -> Result<BindGroupLayoutId, BindingError> {
        let built = config.build()?;
        let raw =
            unsafe { (self.sym.device_create_bind_group_layout)(device.to_raw(), &built.raw) };
        BindGroupLayoutId::checked(raw, "wgpu_device_create_bind_group_layout")
    }

    fn create_bind_group(
        &self,
        device: DeviceId,
        config: &BindGroupConfig,
    ) -> Result<BindGroupId, BindingError> {
        let built = config.build()?;
        let raw = unsafe { (self.sym.device_create_bind_group)(device.to_raw(), &built.raw) };
        BindGroupId::checked(raw, "wgpu_device_create_bind_group")
    }

    fn create_pipeline_layout(
        &self,
        device: DeviceId,
        config: &PipelineLayoutConfig,
    ) -> Result<PipelineLayoutId, BindingError> {
        let built = config.build()?;
        let raw =
            unsafe { (self.sym.device_create_pipeline_layout)(device.to_raw(), &built.raw) };
        PipelineLayoutId::checked(raw, "wgpu_device_create_pipeline_layout")
    }

    fn create_render_pipeline(
        &self,
        device: DeviceId,
        config: &RenderPipelineConfig,
    ) -> Result<RenderPipelineId, BindingError> {
        let built = config.build()?;
        let raw =
            unsafe { (self.sym.device_create_render_pipeline)(device.to_raw(), &built.raw) };
        RenderPipelineId::checked(raw, "wgpu_device_create_render_pipeline")
    }

    fn create_surface(
        &self,
        display: RawDisplayHandle,
        window: RawWindowHandle,
    ) -> Result<SurfaceId, BindingError> {
        let raw = match (display, window) {
            (RawDisplayHandle::Xlib(display), RawWindowHandle::Xlib(window)) => {
                let mut display_ptr = display
                    .display
                    .map_or(std::ptr::null_mut(), |display| display.as_ptr());
                unsafe {
                    (self.sym.create_surface_from_xlib)(&mut display_ptr, window.window as u64)
                }
            }
            (RawDisplayHandle::Wayland(display), RawWindowHandle::Wayland(window)) => unsafe {
                (self.sym.create_surface_from_wayland)(
                    window.surface.as_ptr(),
                    display.display.as_ptr(),
                )
            },
            (_, RawWindowHandle::Win32(window)) => {
                let hinstance = window
                    .hinstance
                    .map_or(std::ptr::null_mut(), |hinstance| {
                        hinstance.get() as *mut c_void
                    });
                unsafe {
                    (self.sym.create_surface_from_windows_hwnd)(
                        hinstance,
                        window.hwnd.get() as *mut c_void,
                    )
                }
            }
            (_, other) => {
                return Err(BindingError::UnsupportedWindowSystem {
                    system: window_system_name(&other),
                });
            }
        };
        SurfaceId::checked(raw, "wgpu_create_surface")
    }

    fn create_swap_chain(
        &self,
        device: DeviceId,
        surface: SurfaceId,
        config: &SwapChainConfig,
    ) -> Result<SwapChainId, BindingError> {
        let descriptor = config.as_raw();
        let raw = unsafe {
            (self.sym.device_create_swap_chain)(device.to_raw(), surface.to_raw(), &descriptor)
        };
        SwapChainId::checked(raw, "wgpu_device_create_swap_chain")
    }

    fn swap_chain_next_texture(
        &self,
        swap_chain: SwapChainId,
    ) -> Result<TextureViewId, BindingError> {
        let output = unsafe { (self.sym.swap_chain_get_next_texture)(swap_chain.to_raw()) };
        TextureViewId::checked(output.view_id, "wgpu_swap_chain_get_next_texture")
    }

    fn create_command_encoder(
        &self,
        device: DeviceId,
    ) -> Result<CommandEncoderId, BindingError> {
        let descriptor = raw::CommandEncoderDescriptor { todo: 0 };
        let raw =
            unsafe { (self.sym.device_create_command_encoder)(device.to_raw(), &descriptor) };
        CommandEncoderId::checked(raw, "wgpu_device_create_command_encoder")
    }

    fn begin_render_pass(
        &self,
        encoder: CommandEncoderId,
        config: &RenderPassConfig,
    ) -> Result<RenderPassId, BindingError> {
        let built = config.build()?;
        let raw = unsafe {
            (self.sym.command_encoder_begin_render_pass)(encoder.to_raw(), &built.raw)
        };
        RenderPassId::checked(raw, "wgpu_command_encoder_begin_render_pass")
    }

    fn set_pipeline(&self, pass: RenderPassId, pipeline: RenderPipelineId) {
        unsafe { (self.sym.render_pass_set_pipeline)(pass.to_raw(), pipeline.to_raw()) };
    }

    fn draw(
        &self,
        pass: RenderPassId,
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    ) {
        unsafe {
            (self.sym.render_pass_draw)(
                pass.to_raw(),
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            );
        }
    }

    fn end_render_pass(&self, pass: RenderPassId) {
        unsafe { (self.sym.render_pass_end_pass)(pass.to_raw()) };
    }

    fn finish_encoder(
        &self,
        encoder: CommandEncoderId,
    ) -> Result<CommandBufferId, BindingError> {
        let raw =
            unsafe { (self.sym.command_encoder_finish)(encoder.to_raw(), std::ptr::null()) };
        CommandBufferId::checked(raw, "wgpu_command_encoder_finish")
    }

    fn queue(&self, device: DeviceId) -> Result<QueueId, BindingError> {
        let raw = unsafe { (self.sym.device_get_queue)(device.to_raw()) };
        QueueId::checked(raw, "wgpu_device_get_queue")
    }

    fn submit(&self, queue: QueueId, buffers: &[CommandBufferId]) {
        let raw: Vec<RawId> = buffers.iter().map(|buffer| buffer.to_raw()).collect();
        unsafe { (self.sym.queue_submit)(queue.to_raw(), raw.as_ptr(), raw.len()) };
    }

    fn present(&self, swap_chain: SwapChainId) {
        unsafe { (self.sym.swap_chain_present)(swap_chain.to_raw()) };
    }
}

fn window_system_name(handle: &RawWindowHandle) -> &'static str {
    match handle {
        RawWindowHandle::AppKit(_) => "appkit",
        RawWindowHandle::UiKit(_) => "uikit",
        RawWindowHandle::Xcb(_) => "xcb",
        RawWindowHandle::Xlib(_) => "xlib",
        RawWindowHandle::Wayland(_) => "wayland",
        RawWindowHandle::AndroidNdk(_) => "android",
        RawWindowHandle::Web(_) => "web",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_unpacks_byte_fields() {
        assert_eq!(unpack_version(0x00_04_00), (0, 4, 0));
        assert_eq!(unpack_version(0x01_02_03), (1, 2, 3));
        assert_eq!(unpack_version(0), (0, 0, 0));
    }

    #[test]
    fn adapter_trampoline_fills_the_request_slot() {
        // Exercises the exact path the native callback takes: a boxed sender
        // travels through `userdata` and the received id lands in the slot
        // before the (conceptual) request call returns.
        let (sender, receiver) = request::oneshot::<RawId>();
        let userdata = Box::into_raw(Box::new(sender)).cast::<c_void>();
        unsafe { adapter_callback(55, userdata) };
        assert_eq!(pollster::block_on(receiver), 55);
    }
}
