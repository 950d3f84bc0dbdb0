//! Host-side descriptor construction.
//!
//! The native ABI has no length-carrying collection type: every descriptor
//! list travels as a raw pointer plus an explicit length field. The types
//! here accept idiomatic Rust collections, derive the length fields
//! automatically, and build the `repr(C)` structs immediately before a
//! creation call. Built descriptors own all backing storage (C strings,
//! boxed optional state, attachment arrays) so the raw pointers stay valid
//! for exactly the duration of the call; they are never retained beyond it.

use std::ffi::CString;

use crate::error::BindingError;
use crate::handles::{
    BindGroupLayoutId, PipelineLayoutId, ShaderModuleId, TextureViewId,
};
use crate::raw;
use crate::raw::{
    BlendDescriptor, Color, ColorWrite, CullMode, FrontFace, IndexFormat, InputStepMode, LoadOp,
    PowerPreference, PresentMode, PrimitiveTopology, RawId, StoreOp, TextureFormat, TextureUsage,
};

// ── list + length pairing ────────────────────────────────────────────────

/// A list destined for a pointer + length descriptor field.
///
/// Constructed from a plain `Vec` the length field is derived from the list
/// itself, which makes a mismatch unrepresentable. [`Counted::with_declared`]
/// keeps the explicit-length escape hatch for callers mirroring foreign
/// layouts; a declared length that disagrees with the list fails descriptor
/// construction instead of reaching the native side.
#[derive(Debug, Clone)]
pub struct Counted<T> {
    items: Vec<T>,
    declared: Option<usize>,
}

impl<T> Counted<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            declared: None,
        }
    }

    /// Pairs the list with a caller-declared length, checked at build time.
    pub fn with_declared(items: Vec<T>, declared: usize) -> Self {
        Self {
            items,
            declared: Some(declared),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The length to write into the native field, or the mismatch error.
    pub(crate) fn checked_len(&self, field: &'static str) -> Result<usize, BindingError> {
        match self.declared {
            Some(declared) if declared != self.items.len() => {
                Err(BindingError::DescriptorMismatch {
                    field,
                    expected: self.items.len(),
                    declared,
                })
            }
            _ => Ok(self.items.len()),
        }
    }
}

impl<T> From<Vec<T>> for Counted<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> Default for Counted<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

// ── shader bytecode ──────────────────────────────────────────────────────

/// SPIR-V bytecode held as the 32-bit word view the native side consumes.
#[derive(Debug, Clone)]
pub struct SpirvShader {
    words: Vec<u32>,
}

impl SpirvShader {
    /// Reinterprets raw bytes as words; the length must be a multiple of 4.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BindingError> {
        if bytes.len() % 4 != 0 {
            return Err(BindingError::InvalidShaderBytecode { len: bytes.len() });
        }
        Ok(Self {
            words: bytemuck::pod_collect_to_vec(bytes),
        })
    }

    pub fn from_words(words: Vec<u32>) -> Self {
        Self { words }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub(crate) fn as_raw(&self) -> raw::ShaderModuleDescriptor {
        raw::ShaderModuleDescriptor {
            code: raw::U32Array {
                bytes: self.words.as_ptr(),
                length: self.words.len(),
            },
        }
    }
}

// ── adapter / device ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AdapterOptions {
    pub power_preference: PowerPreference,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self {
            power_preference: PowerPreference::Default,
        }
    }
}

impl AdapterOptions {
    pub(crate) fn as_raw(&self) -> raw::RequestAdapterOptions {
        raw::RequestAdapterOptions {
            power_preference: self.power_preference,
        }
    }
}

/// Extensions and limits requested from the adapter at device creation.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    pub anisotropic_filtering: bool,
    pub max_bind_groups: u32,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            anisotropic_filtering: false,
            max_bind_groups: 4,
        }
    }
}

impl DeviceProfile {
    pub(crate) fn as_raw(&self) -> raw::DeviceDescriptor {
        raw::DeviceDescriptor {
            extensions: raw::Extensions {
                anisotropic_filtering: self.anisotropic_filtering,
            },
            limits: raw::Limits {
                max_bind_groups: self.max_bind_groups,
            },
        }
    }
}

// ── bind groups ──────────────────────────────────────────────────────────

/// One slot of a bind group layout.
#[derive(Debug, Clone, Copy)]
pub struct LayoutEntry {
    pub binding: u32,
    pub visibility: raw::ShaderStage,
    pub ty: raw::BindingType,
}

#[derive(Debug, Clone, Default)]
pub struct BindGroupLayoutConfig {
    pub bindings: Counted<LayoutEntry>,
}

pub(crate) struct BuiltBindGroupLayout {
    pub raw: raw::BindGroupLayoutDescriptor,
    _bindings: Vec<raw::BindGroupLayoutBinding>,
}

impl BindGroupLayoutConfig {
    pub(crate) fn build(&self) -> Result<BuiltBindGroupLayout, BindingError> {
        let length = self.bindings.checked_len("bindings")?;
        let bindings: Vec<raw::BindGroupLayoutBinding> = self
            .bindings
            .items()
            .iter()
            .map(|entry| raw::BindGroupLayoutBinding {
                binding: entry.binding,
                visibility: entry.visibility.bits(),
                ty: entry.ty,
            })
            .collect();
        Ok(BuiltBindGroupLayout {
            raw: raw::BindGroupLayoutDescriptor {
                bindings: bindings.as_ptr(),
                bindings_length: length,
            },
            _bindings: bindings,
        })
    }
}

/// The resource bound into one bind group slot.
///
/// Only texture views are expressible so far; buffers and samplers arrive
/// with buffer support.
#[derive(Debug, Clone, Copy)]
pub enum ResourceBinding {
    TextureView(TextureViewId),
}

impl ResourceBinding {
    fn as_raw(&self) -> raw::BindingResource {
        match self {
            Self::TextureView(view) => raw::BindingResource {
                tag: raw::BindingResourceTag::TextureView,
                payload: raw::BindingResourcePayload {
                    texture_view: view.to_raw(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BindGroupEntry {
    pub binding: u32,
    pub resource: ResourceBinding,
}

#[derive(Debug, Clone)]
pub struct BindGroupConfig {
    pub layout: BindGroupLayoutId,
    pub bindings: Counted<BindGroupEntry>,
}

pub(crate) struct BuiltBindGroup {
    pub raw: raw::BindGroupDescriptor,
    _bindings: Vec<raw::BindGroupBinding>,
}

impl BindGroupConfig {
    pub fn empty(layout: BindGroupLayoutId) -> Self {
        Self {
            layout,
            bindings: Counted::default(),
        }
    }

    pub(crate) fn build(&self) -> Result<BuiltBindGroup, BindingError> {
        let length = self.bindings.checked_len("bindings")?;
        let bindings: Vec<raw::BindGroupBinding> = self
            .bindings
            .items()
            .iter()
            .map(|entry| raw::BindGroupBinding {
                binding: entry.binding,
                resource: entry.resource.as_raw(),
            })
            .collect();
        Ok(BuiltBindGroup {
            raw: raw::BindGroupDescriptor {
                layout: self.layout.to_raw(),
                bindings: bindings.as_ptr(),
                bindings_length: length,
            },
            _bindings: bindings,
        })
    }
}

// ── pipeline layout ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct PipelineLayoutConfig {
    pub bind_group_layouts: Counted<BindGroupLayoutId>,
}

pub(crate) struct BuiltPipelineLayout {
    pub raw: raw::PipelineLayoutDescriptor,
    _layouts: Vec<RawId>,
}

impl PipelineLayoutConfig {
    pub(crate) fn build(&self) -> Result<BuiltPipelineLayout, BindingError> {
        let length = self.bind_group_layouts.checked_len("bind_group_layouts")?;
        let layouts: Vec<RawId> = self
            .bind_group_layouts
            .items()
            .iter()
            .map(|layout| layout.to_raw())
            .collect();
        Ok(BuiltPipelineLayout {
            raw: raw::PipelineLayoutDescriptor {
                bind_group_layouts: layouts.as_ptr(),
                bind_group_layouts_length: length,
            },
            _layouts: layouts,
        })
    }
}

// ── render pipeline ──────────────────────────────────────────────────────

/// A shader module plus its entry point name.
#[derive(Debug, Clone)]
pub struct StageConfig {
    pub module: ShaderModuleId,
    pub entry_point: String,
}

impl StageConfig {
    /// Stage with the conventional `main` entry point.
    pub fn new(module: ShaderModuleId) -> Self {
        Self {
            module,
            entry_point: "main".to_owned(),
        }
    }

    fn build(&self) -> Result<(raw::ProgrammableStageDescriptor, CString), BindingError> {
        let entry = CString::new(self.entry_point.as_str()).map_err(|_| {
            BindingError::InvalidEntryPoint {
                name: self.entry_point.clone(),
            }
        })?;
        let descriptor = raw::ProgrammableStageDescriptor {
            module: self.module.to_raw(),
            entry_point: entry.as_ptr(),
        };
        Ok((descriptor, entry))
    }
}

#[derive(Debug, Clone)]
pub struct VertexBufferLayout {
    pub stride: u64,
    pub step_mode: InputStepMode,
    pub attributes: Counted<raw::VertexAttributeDescriptor>,
}

#[derive(Debug, Clone)]
pub struct VertexInputConfig {
    pub index_format: IndexFormat,
    pub vertex_buffers: Counted<VertexBufferLayout>,
}

impl Default for VertexInputConfig {
    fn default() -> Self {
        Self {
            index_format: IndexFormat::Uint16,
            vertex_buffers: Counted::default(),
        }
    }
}

/// Output merging state for one color target.
#[derive(Debug, Clone, Copy)]
pub struct ColorState {
    pub format: TextureFormat,
    pub alpha_blend: BlendDescriptor,
    pub color_blend: BlendDescriptor,
    pub write_mask: ColorWrite,
}

impl ColorState {
    /// Opaque replace-blend output, the fixed-function default.
    pub fn replace(format: TextureFormat) -> Self {
        Self {
            format,
            alpha_blend: BlendDescriptor::REPLACE,
            color_blend: BlendDescriptor::REPLACE,
            write_mask: ColorWrite::ALL,
        }
    }

    fn as_raw(&self) -> raw::ColorStateDescriptor {
        raw::ColorStateDescriptor {
            format: self.format,
            alpha_blend: self.alpha_blend,
            color_blend: self.color_blend,
            write_mask: self.write_mask.bits(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderPipelineConfig {
    pub layout: PipelineLayoutId,
    pub vertex_stage: StageConfig,
    pub fragment_stage: Option<StageConfig>,
    pub primitive_topology: PrimitiveTopology,
    pub rasterization_state: Option<raw::RasterizationStateDescriptor>,
    pub color_states: Counted<ColorState>,
    pub depth_stencil_state: Option<raw::DepthStencilStateDescriptor>,
    pub vertex_input: VertexInputConfig,
    pub sample_count: u32,
    pub sample_mask: u32,
    pub alpha_to_coverage_enabled: bool,
}

impl RenderPipelineConfig {
    /// A pipeline drawing opaque triangles to a single color target, the
    /// fixed-function state every path here starts from.
    pub fn with_stages(
        layout: PipelineLayoutId,
        vertex_stage: StageConfig,
        fragment_stage: Option<StageConfig>,
        format: TextureFormat,
    ) -> Self {
        Self {
            layout,
            vertex_stage,
            fragment_stage,
            primitive_topology: PrimitiveTopology::TriangleList,
            rasterization_state: Some(raw::RasterizationStateDescriptor {
                front_face: FrontFace::Ccw,
                cull_mode: CullMode::None,
                depth_bias: 0,
                depth_bias_slope_scale: 0.0,
                depth_bias_clamp: 0.0,
            }),
            color_states: Counted::new(vec![ColorState::replace(format)]),
            depth_stencil_state: None,
            vertex_input: VertexInputConfig::default(),
            sample_count: 1,
            sample_mask: 1,
            alpha_to_coverage_enabled: false,
        }
    }
}

pub(crate) struct BuiltRenderPipeline {
    pub raw: raw::RenderPipelineDescriptor,
    _vertex_entry: CString,
    _fragment_stage: Option<Box<(raw::ProgrammableStageDescriptor, CString)>>,
    _rasterization: Option<Box<raw::RasterizationStateDescriptor>>,
    _depth_stencil: Option<Box<raw::DepthStencilStateDescriptor>>,
    _color_states: Vec<raw::ColorStateDescriptor>,
    _vertex_buffers: Vec<raw::VertexBufferDescriptor>,
    _vertex_attributes: Vec<Vec<raw::VertexAttributeDescriptor>>,
}

impl RenderPipelineConfig {
    pub(crate) fn build(&self) -> Result<BuiltRenderPipeline, BindingError> {
        let color_states_length = self.color_states.checked_len("color_states")?;
        let color_states: Vec<raw::ColorStateDescriptor> = self
            .color_states
            .items()
            .iter()
            .map(ColorState::as_raw)
            .collect();

        let vertex_buffers_length = self
            .vertex_input
            .vertex_buffers
            .checked_len("vertex_buffers")?;
        let mut vertex_attributes = Vec::with_capacity(vertex_buffers_length);
        let mut vertex_buffers = Vec::with_capacity(vertex_buffers_length);
        for buffer in self.vertex_input.vertex_buffers.items() {
            let attributes_length = buffer.attributes.checked_len("attributes")?;
            let attributes = buffer.attributes.items().to_vec();
            vertex_buffers.push(raw::VertexBufferDescriptor {
                stride: buffer.stride,
                step_mode: buffer.step_mode,
                attributes: attributes.as_ptr(),
                attributes_length,
            });
            vertex_attributes.push(attributes);
        }

        let (vertex_stage, vertex_entry) = self.vertex_stage.build()?;
        let fragment_stage = match &self.fragment_stage {
            Some(stage) => Some(Box::new(stage.build()?)),
            None => None,
        };
        let rasterization = self.rasterization_state.map(Box::new);
        let depth_stencil = self.depth_stencil_state.map(Box::new);

        let raw = raw::RenderPipelineDescriptor {
            layout: self.layout.to_raw(),
            vertex_stage,
            fragment_stage: fragment_stage
                .as_ref()
                .map_or(std::ptr::null(), |stage| &stage.0 as *const _),
            primitive_topology: self.primitive_topology,
            rasterization_state: rasterization
                .as_deref()
                .map_or(std::ptr::null(), |state| state as *const _),
            color_states: color_states.as_ptr(),
            color_states_length,
            depth_stencil_state: depth_stencil
                .as_deref()
                .map_or(std::ptr::null(), |state| state as *const _),
            vertex_input: raw::VertexInputDescriptor {
                index_format: self.vertex_input.index_format,
                vertex_buffers: vertex_buffers.as_ptr(),
                vertex_buffers_length,
            },
            sample_count: self.sample_count,
            sample_mask: self.sample_mask,
            alpha_to_coverage_enabled: self.alpha_to_coverage_enabled,
        };

        Ok(BuiltRenderPipeline {
            raw,
            _vertex_entry: vertex_entry,
            _fragment_stage: fragment_stage,
            _rasterization: rasterization,
            _depth_stencil: depth_stencil,
            _color_states: color_states,
            _vertex_buffers: vertex_buffers,
            _vertex_attributes: vertex_attributes,
        })
    }
}

// ── swap chain ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct SwapChainConfig {
    pub usage: TextureUsage,
    pub format: TextureFormat,
    pub width: u32,
    pub height: u32,
    pub present_mode: PresentMode,
}

impl SwapChainConfig {
    pub(crate) fn as_raw(&self) -> raw::SwapChainDescriptor {
        raw::SwapChainDescriptor {
            usage: self.usage.bits(),
            format: self.format,
            width: self.width,
            height: self.height,
            present_mode: self.present_mode,
        }
    }
}

// ── render pass ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct ColorAttachment {
    pub attachment: TextureViewId,
    pub resolve_target: Option<TextureViewId>,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub clear_color: Color,
}

impl ColorAttachment {
    /// Clear-to-color attachment with no multisample resolve.
    pub fn cleared(attachment: TextureViewId, clear_color: Color) -> Self {
        Self {
            attachment,
            resolve_target: None,
            load_op: LoadOp::Clear,
            store_op: StoreOp::Store,
            clear_color,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RenderPassConfig {
    pub color_attachments: Counted<ColorAttachment>,
    pub depth_stencil_attachment: Option<raw::RenderPassDepthStencilAttachmentDescriptor>,
}

pub(crate) struct BuiltRenderPass {
    pub raw: raw::RenderPassDescriptor,
    _attachments: Vec<raw::RenderPassColorAttachmentDescriptor>,
    _resolve_targets: Vec<RawId>,
    _depth_stencil: Option<Box<raw::RenderPassDepthStencilAttachmentDescriptor>>,
}

impl RenderPassConfig {
    pub(crate) fn build(&self) -> Result<BuiltRenderPass, BindingError> {
        let length = self.color_attachments.checked_len("color_attachments")?;

        // Resolve targets live in a side arena so each attachment can carry
        // a stable pointer to its entry; sized up front, never reallocated.
        let resolve_targets: Vec<RawId> = self
            .color_attachments
            .items()
            .iter()
            .filter_map(|attachment| attachment.resolve_target.map(TextureViewId::to_raw))
            .collect();

        let mut next_resolve = 0;
        let attachments: Vec<raw::RenderPassColorAttachmentDescriptor> = self
            .color_attachments
            .items()
            .iter()
            .map(|attachment| {
                let resolve_target = if attachment.resolve_target.is_some() {
                    let pointer = &resolve_targets[next_resolve] as *const RawId;
                    next_resolve += 1;
                    pointer
                } else {
                    std::ptr::null()
                };
                raw::RenderPassColorAttachmentDescriptor {
                    attachment: attachment.attachment.to_raw(),
                    resolve_target,
                    load_op: attachment.load_op,
                    store_op: attachment.store_op,
                    clear_color: attachment.clear_color,
                }
            })
            .collect();

        let depth_stencil = self.depth_stencil_attachment.map(Box::new);

        Ok(BuiltRenderPass {
            raw: raw::RenderPassDescriptor {
                color_attachments: attachments.as_ptr(),
                color_attachments_length: length,
                depth_stencil_attachment: depth_stencil
                    .as_deref()
                    .map_or(std::ptr::null(), |attachment| attachment as *const _),
            },
            _attachments: attachments,
            _resolve_targets: resolve_targets,
            _depth_stencil: depth_stencil,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{BindingType, ShaderStage};

    // ── list + length pairing ─────────────────────────────────────────────

    #[test]
    fn derived_length_matches_list() {
        let counted: Counted<u32> = vec![1, 2, 3].into();
        assert_eq!(counted.checked_len("field").unwrap(), 3);
    }

    #[test]
    fn matching_declared_length_is_accepted() {
        let counted = Counted::with_declared(vec![1u32, 2], 2);
        assert_eq!(counted.checked_len("field").unwrap(), 2);
    }

    #[test]
    fn mismatched_declared_length_is_rejected() {
        let counted = Counted::with_declared(vec![1u32, 2, 3], 5);
        let err = counted.checked_len("bindings").unwrap_err();
        match err {
            BindingError::DescriptorMismatch {
                field,
                expected,
                declared,
            } => {
                assert_eq!(field, "bindings");
                assert_eq!(expected, 3);
                assert_eq!(declared, 5);
            }
            other => panic!("expected DescriptorMismatch, got {other:?}"),
        }
    }

    #[test]
    fn layout_mismatch_fails_bind_group_layout_build() {
        let config = BindGroupLayoutConfig {
            bindings: Counted::with_declared(
                vec![LayoutEntry {
                    binding: 0,
                    visibility: ShaderStage::VERTEX,
                    ty: BindingType::UniformBuffer,
                }],
                2,
            ),
        };
        assert!(matches!(
            config.build(),
            Err(BindingError::DescriptorMismatch { field: "bindings", .. })
        ));
    }

    #[test]
    fn pipeline_layout_round_trips_ids() {
        let ids = vec![
            BindGroupLayoutId::from_raw(11),
            BindGroupLayoutId::from_raw(22),
            BindGroupLayoutId::from_raw(33),
        ];
        let config = PipelineLayoutConfig {
            bind_group_layouts: Counted::new(ids),
        };
        let built = config.build().unwrap();
        assert_eq!(built.raw.bind_group_layouts_length, 3);
        let raw_ids = unsafe {
            std::slice::from_raw_parts(built.raw.bind_group_layouts, 3)
        };
        assert_eq!(raw_ids, &[11, 22, 33]);
    }

    // ── shader bytecode ───────────────────────────────────────────────────

    #[test]
    fn unaligned_bytecode_is_rejected() {
        for len in [1, 2, 3, 5, 7, 1023] {
            let err = SpirvShader::from_bytes(&vec![0u8; len]).unwrap_err();
            assert!(matches!(
                err,
                BindingError::InvalidShaderBytecode { len: reported } if reported == len
            ));
        }
    }

    #[test]
    fn bytecode_word_view_has_quarter_length() {
        let shader = SpirvShader::from_bytes(&[0u8; 256]).unwrap();
        assert_eq!(shader.word_count(), 64);
        let empty = SpirvShader::from_bytes(&[]).unwrap();
        assert_eq!(empty.word_count(), 0);
    }

    #[test]
    fn bytecode_words_preserve_native_byte_order() {
        let bytes = 0xdead_beef_u32.to_ne_bytes();
        let shader = SpirvShader::from_bytes(&bytes).unwrap();
        assert_eq!(shader.words(), &[0xdead_beef]);
    }

    // ── render pipeline ───────────────────────────────────────────────────

    fn triangle_config() -> RenderPipelineConfig {
        RenderPipelineConfig::with_stages(
            PipelineLayoutId::from_raw(1),
            StageConfig::new(ShaderModuleId::from_raw(2)),
            Some(StageConfig::new(ShaderModuleId::from_raw(3))),
            TextureFormat::Bgra8UnormSrgb,
        )
    }

    #[test]
    fn pipeline_build_populates_lengths_and_pointers() {
        let built = triangle_config().build().unwrap();
        assert_eq!(built.raw.color_states_length, 1);
        assert_eq!(built.raw.vertex_input.vertex_buffers_length, 0);
        assert!(built.raw.depth_stencil_state.is_null());
        assert!(!built.raw.fragment_stage.is_null());
        assert_eq!(built.raw.layout, 1);
        assert_eq!(built.raw.vertex_stage.module, 2);
        let fragment = unsafe { &*built.raw.fragment_stage };
        assert_eq!(fragment.module, 3);
    }

    #[test]
    fn pipeline_entry_points_read_back_as_c_strings() {
        let built = triangle_config().build().unwrap();
        let entry = unsafe { std::ffi::CStr::from_ptr(built.raw.vertex_stage.entry_point) };
        assert_eq!(entry.to_str().unwrap(), "main");
    }

    #[test]
    fn nul_in_entry_point_is_rejected() {
        let mut config = triangle_config();
        config.vertex_stage.entry_point = "ma\0in".to_owned();
        assert!(matches!(
            config.build(),
            Err(BindingError::InvalidEntryPoint { .. })
        ));
    }

    #[test]
    fn omitted_fragment_stage_is_null() {
        let mut config = triangle_config();
        config.fragment_stage = None;
        let built = config.build().unwrap();
        assert!(built.raw.fragment_stage.is_null());
    }

    #[test]
    fn color_state_mismatch_fails_pipeline_build() {
        let mut config = triangle_config();
        let states = config.color_states.items().to_vec();
        config.color_states = Counted::with_declared(states, 4);
        assert!(matches!(
            config.build(),
            Err(BindingError::DescriptorMismatch { field: "color_states", .. })
        ));
    }

    // ── render pass ───────────────────────────────────────────────────────

    #[test]
    fn render_pass_build_wires_attachments() {
        let config = RenderPassConfig {
            color_attachments: vec![ColorAttachment::cleared(
                TextureViewId::from_raw(9),
                Color::GREEN,
            )]
            .into(),
            depth_stencil_attachment: None,
        };
        let built = config.build().unwrap();
        assert_eq!(built.raw.color_attachments_length, 1);
        assert!(built.raw.depth_stencil_attachment.is_null());
        let attachment = unsafe { &*built.raw.color_attachments };
        assert_eq!(attachment.attachment, 9);
        assert!(attachment.resolve_target.is_null());
        assert_eq!(attachment.clear_color, Color::GREEN);
    }

    #[test]
    fn render_pass_resolve_targets_point_into_arena() {
        let config = RenderPassConfig {
            color_attachments: vec![
                ColorAttachment {
                    resolve_target: Some(TextureViewId::from_raw(77)),
                    ..ColorAttachment::cleared(TextureViewId::from_raw(9), Color::BLACK)
                },
                ColorAttachment::cleared(TextureViewId::from_raw(10), Color::BLACK),
            ]
            .into(),
            depth_stencil_attachment: None,
        };
        let built = config.build().unwrap();
        let attachments =
            unsafe { std::slice::from_raw_parts(built.raw.color_attachments, 2) };
        assert_eq!(unsafe { *attachments[0].resolve_target }, 77);
        assert!(attachments[1].resolve_target.is_null());
    }

    #[test]
    fn attachment_mismatch_fails_render_pass_build() {
        let config = RenderPassConfig {
            color_attachments: Counted::with_declared(Vec::new(), 1),
            depth_stencil_attachment: None,
        };
        assert!(matches!(
            config.build(),
            Err(BindingError::DescriptorMismatch { field: "color_attachments", .. })
        ));
    }
}
