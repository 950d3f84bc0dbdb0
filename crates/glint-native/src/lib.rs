//! Safe binding over the `wgpu_native` shared library.
//!
//! The native side is a C ABI: opaque `u64` handles, fixed-layout descriptor
//! structs whose lists travel as pointer + explicit length pairs, and a
//! callback-based adapter request. This crate loads the library at runtime
//! and turns that surface into typed handles, validated descriptor builders,
//! and a blocking adapter request that stays correct if the native callback
//! ever becomes truly asynchronous.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`loader`] | `LoadOptions`, platform naming convention, path resolution |
//! | [`header`] | normalization of the vendored native header text |
//! | [`raw`] | the fixed C ABI: ids, descriptor structs, function table |
//! | [`handles`] | per-resource-category id newtypes |
//! | [`descriptors`] | host-side configuration and descriptor construction |
//! | [`gpu`] | `NativeGpu`, the `GpuApi` facade trait |
//! | [`error`] | `LoadError`, `BindingError` |
//!
//! # Quick start
//!
//! ```no_run
//! use glint_native::{GpuApi, LoadOptions, NativeGpu};
//!
//! let gpu = NativeGpu::load(&LoadOptions::from_env())?;
//! let adapter = gpu.request_adapter(
//!     &glint_native::AdapterOptions::default(),
//!     glint_native::Backends::VULKAN | glint_native::Backends::METAL,
//! )?;
//! let _device = gpu.request_device(adapter, &glint_native::DeviceProfile::default())?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Everything created from a device stays valid only while that device (and
//! the loaded library) is alive; all calls belong on the thread that owns the
//! device.

pub use raw_window_handle;

pub mod descriptors;
pub mod error;
pub mod gpu;
pub mod handles;
pub mod header;
pub mod loader;
pub mod raw;

mod log_bridge;
mod request;

pub use descriptors::{
    AdapterOptions, BindGroupConfig, BindGroupEntry, BindGroupLayoutConfig, ColorAttachment,
    ColorState, Counted, DeviceProfile, LayoutEntry, PipelineLayoutConfig, RenderPassConfig,
    RenderPipelineConfig, ResourceBinding, SpirvShader, StageConfig, SwapChainConfig,
    VertexBufferLayout, VertexInputConfig,
};
pub use error::{BindingError, LoadError};
pub use gpu::{EXPECTED_VERSION, GpuApi, NativeGpu};
pub use handles::{
    AdapterId, BindGroupId, BindGroupLayoutId, CommandBufferId, CommandEncoderId, DeviceId,
    PipelineLayoutId, QueueId, RenderPassId, RenderPipelineId, ShaderModuleId, SurfaceId,
    SwapChainId, TextureViewId,
};
pub use loader::{LoadOptions, library_filename};
pub use log_bridge::{native_level_for_threshold, threshold_for_filter};
pub use raw::{
    Backends, BlendDescriptor, BlendFactor, BlendOperation, Color, ColorWrite, CullMode,
    FrontFace, IndexFormat, LoadOp, PowerPreference, PresentMode, PrimitiveTopology, ShaderStage,
    StoreOp, TextureFormat, TextureUsage,
};
