//! The fixed C ABI of `wgpu_native`.
//!
//! Everything here mirrors the native header byte for byte: opaque `u64`
//! handle ids, `repr(C)` descriptor structs whose list fields travel as
//! pointer + explicit length pairs, and `repr(u32)` enums with the
//! discriminants the native side expects. Nothing in this module allocates or
//! validates; the safe construction layer lives in [`crate::descriptors`].

use std::ffi::{c_char, c_int, c_void};

use bitflags::bitflags;

use crate::error::LoadError;

/// Opaque native resource identifier.
pub type RawId = u64;

// ── callbacks ────────────────────────────────────────────────────────────

/// Signature of the native log sink: `(level, nul-terminated message)`.
pub type LogCallback = unsafe extern "C" fn(level: c_int, message: *const c_char);

/// Signature of the adapter request callback: `(received handle, userdata)`.
pub type RequestAdapterCallback = unsafe extern "C" fn(received: RawId, userdata: *mut c_void);

// ── enums ────────────────────────────────────────────────────────────────

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Maps a level integer coming in over the C callback; out-of-range
    /// values are `None`.
    pub fn from_native(level: c_int) -> Option<Self> {
        Some(match level {
            0 => Self::Off,
            1 => Self::Error,
            2 => Self::Warn,
            3 => Self::Info,
            4 => Self::Debug,
            5 => Self::Trace,
            _ => return None,
        })
    }
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerPreference {
    Default = 0,
    LowPower = 1,
    HighPerformance = 2,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveTopology {
    PointList = 0,
    LineList = 1,
    LineStrip = 2,
    TriangleList = 3,
    TriangleStrip = 4,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrontFace {
    Ccw = 0,
    Cw = 1,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CullMode {
    None = 0,
    Front = 1,
    Back = 2,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendFactor {
    Zero = 0,
    One = 1,
    SrcColor = 2,
    OneMinusSrcColor = 3,
    SrcAlpha = 4,
    OneMinusSrcAlpha = 5,
    DstColor = 6,
    OneMinusDstColor = 7,
    DstAlpha = 8,
    OneMinusDstAlpha = 9,
    SrcAlphaSaturated = 10,
    BlendColor = 11,
    OneMinusBlendColor = 12,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlendOperation {
    Add = 0,
    Subtract = 1,
    ReverseSubtract = 2,
    Min = 3,
    Max = 4,
}

/// Subset of the native texture format enum; only the formats this binding
/// actually touches are spelled out, with their header discriminants.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureFormat {
    Rgba8Unorm = 17,
    Rgba8UnormSrgb = 18,
    Bgra8Unorm = 22,
    Bgra8UnormSrgb = 23,
    Depth32Float = 35,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexFormat {
    Uint16 = 0,
    Uint32 = 1,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexFormat {
    Float = 49,
    Float2 = 50,
    Float3 = 51,
    Float4 = 52,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputStepMode {
    Vertex = 0,
    Instance = 1,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOp {
    Clear = 0,
    Load = 1,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreOp {
    Clear = 0,
    Store = 1,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresentMode {
    NoVsync = 0,
    Vsync = 1,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingType {
    UniformBuffer = 0,
    StorageBuffer = 1,
    ReadonlyStorageBuffer = 2,
    Sampler = 3,
    SampledTexture = 4,
    StorageTexture = 5,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareFunction {
    Never = 0,
    Less = 1,
    Equal = 2,
    LessEqual = 3,
    Greater = 4,
    NotEqual = 5,
    GreaterEqual = 6,
    Always = 7,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StencilOperation {
    Keep = 0,
    Zero = 1,
    Replace = 2,
    Invert = 3,
    IncrementClamp = 4,
    DecrementClamp = 5,
    IncrementWrap = 6,
    DecrementWrap = 7,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingResourceTag {
    Buffer = 0,
    Sampler = 1,
    TextureView = 2,
}

// ── bitmasks ─────────────────────────────────────────────────────────────

bitflags! {
    /// Backend selection mask passed alongside an adapter request.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Backends: u32 {
        const EMPTY = 1;
        const VULKAN = 2;
        const METAL = 4;
        const DX12 = 8;
        const DX11 = 16;
        const GL = 32;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TextureUsage: u32 {
        const COPY_SRC = 1;
        const COPY_DST = 2;
        const SAMPLED = 4;
        const STORAGE = 8;
        const OUTPUT_ATTACHMENT = 16;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ShaderStage: u32 {
        const VERTEX = 1;
        const FRAGMENT = 2;
        const COMPUTE = 4;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct ColorWrite: u32 {
        const RED = 1;
        const GREEN = 2;
        const BLUE = 4;
        const ALPHA = 8;
        const ALL = 15;
    }
}

// ── plain-data structs ───────────────────────────────────────────────────

/// Double-precision RGBA clear color.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const GREEN: Self = Self { r: 0.0, g: 1.0, b: 0.0, a: 1.0 };
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RequestAdapterOptions {
    pub power_preference: PowerPreference,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct Extensions {
    pub anisotropic_filtering: bool,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct Limits {
    pub max_bind_groups: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DeviceDescriptor {
    pub extensions: Extensions,
    pub limits: Limits,
}

/// Borrowed word view over shader bytecode.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct U32Array {
    pub bytes: *const u32,
    pub length: usize,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ShaderModuleDescriptor {
    pub code: U32Array,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct BindGroupLayoutBinding {
    pub binding: u32,
    /// [`ShaderStage`] bits.
    pub visibility: u32,
    pub ty: BindingType,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct BindGroupLayoutDescriptor {
    pub bindings: *const BindGroupLayoutBinding,
    pub bindings_length: usize,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct BufferBinding {
    pub buffer: RawId,
    pub offset: u64,
    pub size: u64,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union BindingResourcePayload {
    pub buffer: BufferBinding,
    pub sampler: RawId,
    pub texture_view: RawId,
}

/// Tagged union carried by each bind group entry.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct BindingResource {
    pub tag: BindingResourceTag,
    pub payload: BindingResourcePayload,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct BindGroupBinding {
    pub binding: u32,
    pub resource: BindingResource,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct BindGroupDescriptor {
    pub layout: RawId,
    pub bindings: *const BindGroupBinding,
    pub bindings_length: usize,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct PipelineLayoutDescriptor {
    pub bind_group_layouts: *const RawId,
    pub bind_group_layouts_length: usize,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ProgrammableStageDescriptor {
    pub module: RawId,
    pub entry_point: *const c_char,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RasterizationStateDescriptor {
    pub front_face: FrontFace,
    pub cull_mode: CullMode,
    pub depth_bias: i32,
    pub depth_bias_slope_scale: f32,
    pub depth_bias_clamp: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct BlendDescriptor {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
    pub operation: BlendOperation,
}

impl BlendDescriptor {
    /// Source replaces destination; the native default for opaque output.
    pub const REPLACE: Self = Self {
        src_factor: BlendFactor::One,
        dst_factor: BlendFactor::Zero,
        operation: BlendOperation::Add,
    };
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ColorStateDescriptor {
    pub format: TextureFormat,
    pub alpha_blend: BlendDescriptor,
    pub color_blend: BlendDescriptor,
    /// [`ColorWrite`] bits.
    pub write_mask: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct StencilStateFaceDescriptor {
    pub compare: CompareFunction,
    pub fail_op: StencilOperation,
    pub depth_fail_op: StencilOperation,
    pub pass_op: StencilOperation,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DepthStencilStateDescriptor {
    pub format: TextureFormat,
    pub depth_write_enabled: bool,
    pub depth_compare: CompareFunction,
    pub stencil_front: StencilStateFaceDescriptor,
    pub stencil_back: StencilStateFaceDescriptor,
    pub stencil_read_mask: u32,
    pub stencil_write_mask: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct VertexAttributeDescriptor {
    pub offset: u64,
    pub format: VertexFormat,
    pub shader_location: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct VertexBufferDescriptor {
    pub stride: u64,
    pub step_mode: InputStepMode,
    pub attributes: *const VertexAttributeDescriptor,
    pub attributes_length: usize,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct VertexInputDescriptor {
    pub index_format: IndexFormat,
    pub vertex_buffers: *const VertexBufferDescriptor,
    pub vertex_buffers_length: usize,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RenderPipelineDescriptor {
    pub layout: RawId,
    pub vertex_stage: ProgrammableStageDescriptor,
    pub fragment_stage: *const ProgrammableStageDescriptor,
    pub primitive_topology: PrimitiveTopology,
    pub rasterization_state: *const RasterizationStateDescriptor,
    pub color_states: *const ColorStateDescriptor,
    pub color_states_length: usize,
    pub depth_stencil_state: *const DepthStencilStateDescriptor,
    pub vertex_input: VertexInputDescriptor,
    pub sample_count: u32,
    pub sample_mask: u32,
    pub alpha_to_coverage_enabled: bool,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct SwapChainDescriptor {
    /// [`TextureUsage`] bits.
    pub usage: u32,
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    pub present_mode: PresentMode,
}

/// Returned by value from `wgpu_swap_chain_get_next_texture`.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct SwapChainOutput {
    pub view_id: RawId,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RenderPassColorAttachmentDescriptor {
    pub attachment: RawId,
    pub resolve_target: *const RawId,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub clear_color: Color,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RenderPassDepthStencilAttachmentDescriptor {
    pub attachment: RawId,
    pub depth_load_op: LoadOp,
    pub depth_store_op: StoreOp,
    pub clear_depth: f32,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub clear_stencil: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RenderPassDescriptor {
    pub color_attachments: *const RenderPassColorAttachmentDescriptor,
    pub color_attachments_length: usize,
    pub depth_stencil_attachment: *const RenderPassDepthStencilAttachmentDescriptor,
}

/// The header reserves a single unused field; keep its name.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct CommandEncoderDescriptor {
    pub todo: u32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct CommandBufferDescriptor {
    pub todo: u32,
}

// ── resolved function table ──────────────────────────────────────────────

/// Every native entry point this binding calls, resolved once at load time.
///
/// The function pointers stay valid for as long as the `Library` they were
/// resolved from remains open; `NativeGpu` owns both and enforces that.
pub(crate) struct Symbols {
    pub get_version: unsafe extern "C" fn() -> u32,
    pub set_log_callback: unsafe extern "C" fn(LogCallback),
    pub set_log_level: unsafe extern "C" fn(LogLevel),
    pub request_adapter_async: unsafe extern "C" fn(
        *const RequestAdapterOptions,
        u32, // Backends bits
        RequestAdapterCallback,
        *mut c_void,
    ),
    pub adapter_request_device: unsafe extern "C" fn(RawId, *const DeviceDescriptor) -> RawId,
    pub device_create_shader_module:
        unsafe extern "C" fn(RawId, *const ShaderModuleDescriptor) -> RawId,
    pub device_create_bind_group_layout:
        unsafe extern "C" fn(RawId, *const BindGroupLayoutDescriptor) -> RawId,
    pub device_create_bind_group: unsafe extern "C" fn(RawId, *const BindGroupDescriptor) -> RawId,
    pub device_create_pipeline_layout:
        unsafe extern "C" fn(RawId, *const PipelineLayoutDescriptor) -> RawId,
    pub device_create_render_pipeline:
        unsafe extern "C" fn(RawId, *const RenderPipelineDescriptor) -> RawId,
    pub device_create_swap_chain:
        unsafe extern "C" fn(RawId, RawId, *const SwapChainDescriptor) -> RawId,
    pub device_create_command_encoder:
        unsafe extern "C" fn(RawId, *const CommandEncoderDescriptor) -> RawId,
    pub device_get_queue: unsafe extern "C" fn(RawId) -> RawId,
    pub command_encoder_begin_render_pass:
        unsafe extern "C" fn(RawId, *const RenderPassDescriptor) -> RawId,
    pub command_encoder_finish: unsafe extern "C" fn(RawId, *const CommandBufferDescriptor) -> RawId,
    pub render_pass_set_pipeline: unsafe extern "C" fn(RawId, RawId),
    pub render_pass_draw: unsafe extern "C" fn(RawId, u32, u32, u32, u32),
    pub render_pass_end_pass: unsafe extern "C" fn(RawId),
    pub queue_submit: unsafe extern "C" fn(RawId, *const RawId, usize),
    pub swap_chain_get_next_texture: unsafe extern "C" fn(RawId) -> SwapChainOutput,
    pub swap_chain_present: unsafe extern "C" fn(RawId),
    pub create_surface_from_xlib: unsafe extern "C" fn(*mut *mut c_void, u64) -> RawId,
    pub create_surface_from_wayland: unsafe extern "C" fn(*mut c_void, *mut c_void) -> RawId,
    pub create_surface_from_windows_hwnd: unsafe extern "C" fn(*mut c_void, *mut c_void) -> RawId,
}

impl Symbols {
    /// Resolves the full table.
    ///
    /// # Safety
    ///
    /// The caller must keep `lib` open for as long as the returned pointers
    /// are used.
    pub(crate) unsafe fn resolve(lib: &libloading::Library) -> Result<Self, LoadError> {
        unsafe {
            Ok(Self {
                get_version: sym(lib, "wgpu_get_version")?,
                set_log_callback: sym(lib, "wgpu_set_log_callback")?,
                set_log_level: sym(lib, "wgpu_set_log_level")?,
                request_adapter_async: sym(lib, "wgpu_request_adapter_async")?,
                adapter_request_device: sym(lib, "wgpu_adapter_request_device")?,
                device_create_shader_module: sym(lib, "wgpu_device_create_shader_module")?,
                device_create_bind_group_layout: sym(lib, "wgpu_device_create_bind_group_layout")?,
                device_create_bind_group: sym(lib, "wgpu_device_create_bind_group")?,
                device_create_pipeline_layout: sym(lib, "wgpu_device_create_pipeline_layout")?,
                device_create_render_pipeline: sym(lib, "wgpu_device_create_render_pipeline")?,
                device_create_swap_chain: sym(lib, "wgpu_device_create_swap_chain")?,
                device_create_command_encoder: sym(lib, "wgpu_device_create_command_encoder")?,
                device_get_queue: sym(lib, "wgpu_device_get_queue")?,
                command_encoder_begin_render_pass: sym(lib, "wgpu_command_encoder_begin_render_pass")?,
                command_encoder_finish: sym(lib, "wgpu_command_encoder_finish")?,
                render_pass_set_pipeline: sym(lib, "wgpu_render_pass_set_pipeline")?,
                render_pass_draw: sym(lib, "wgpu_render_pass_draw")?,
                render_pass_end_pass: sym(lib, "wgpu_render_pass_end_pass")?,
                queue_submit: sym(lib, "wgpu_queue_submit")?,
                swap_chain_get_next_texture: sym(lib, "wgpu_swap_chain_get_next_texture")?,
                swap_chain_present: sym(lib, "wgpu_swap_chain_present")?,
                create_surface_from_xlib: sym(lib, "wgpu_create_surface_from_xlib")?,
                create_surface_from_wayland: sym(lib, "wgpu_create_surface_from_wayland")?,
                create_surface_from_windows_hwnd: sym(lib, "wgpu_create_surface_from_windows_hwnd")?,
            })
        }
    }
}

/// Copies one typed function pointer out of the library.
unsafe fn sym<T: Copy>(lib: &libloading::Library, name: &'static str) -> Result<T, LoadError> {
    let symbol = unsafe { lib.get::<T>(name.as_bytes()) }
        .map_err(|_| LoadError::MissingSymbol { name })?;
    Ok(*symbol)
}
