//! Typed wrappers over the native library's opaque `u64` ids.
//!
//! Each resource category gets its own newtype so that, for example, an
//! [`AdapterId`] cannot be passed where a [`DeviceId`] is expected. The raw
//! value is still reachable through `to_raw` for callers that need to cross
//! the ABI themselves.

use crate::error::BindingError;
use crate::raw::RawId;

macro_rules! resource_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(RawId);

        impl $name {
            /// Wraps an id obtained from the native library.
            pub fn from_raw(raw: RawId) -> Self {
                Self(raw)
            }

            /// The underlying native id.
            pub fn to_raw(self) -> RawId {
                self.0
            }

            /// Wraps the result of a native creation call, treating a null
            /// id as the call's failure report.
            pub(crate) fn checked(raw: RawId, call: &'static str) -> Result<Self, BindingError> {
                if raw == 0 {
                    Err(BindingError::NullHandle { call })
                } else {
                    Ok(Self(raw))
                }
            }
        }
    };
}

resource_id! {
    /// A physical or virtual GPU available to the process.
    AdapterId
}
resource_id! {
    /// A logical connection to an adapter; owns all resources created from it.
    DeviceId
}
resource_id!(ShaderModuleId);
resource_id!(BindGroupLayoutId);
resource_id!(BindGroupId);
resource_id!(PipelineLayoutId);
resource_id!(RenderPipelineId);
resource_id! {
    /// A drawable platform surface, produced from raw window handles.
    SurfaceId
}
resource_id! {
    /// The rotating presentation buffers bound to one (surface, size) pair.
    SwapChainId
}
resource_id!(TextureViewId);
resource_id!(CommandEncoderId);
resource_id!(CommandBufferId);
resource_id!(QueueId);
resource_id!(RenderPassId);
