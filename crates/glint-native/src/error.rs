use std::path::PathBuf;

use thiserror::Error;

/// Failure to locate, open, or resolve the native library.
///
/// Loader errors are fatal: they surface at startup and are never retried.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No binary was found in any search directory.
    #[error("could not find a wgpu_native binary (searched {searched:?}); set WGPU_LIB_PATH to override")]
    NotFound { searched: Vec<PathBuf> },

    /// The current platform has no known binary naming convention.
    #[error("no wgpu_native binary is shipped for platform `{os}`; set WGPU_LIB_PATH instead")]
    UnsupportedPlatform { os: String },

    /// The dynamic loader failed to open the resolved path.
    #[error("failed to open native library: {0}")]
    Open(#[from] libloading::Error),

    /// The library loaded but does not export a required function.
    #[error("native library does not export `{name}`")]
    MissingSymbol { name: &'static str },
}

/// Failure at the binding boundary: descriptor validation or a native call.
///
/// Validation variants are recoverable by correcting the input; native-call
/// failures are opaque and propagated unchanged.
#[derive(Debug, Error)]
pub enum BindingError {
    /// A list-carrying descriptor field declared a length that disagrees with
    /// the list it accompanies.
    #[error("descriptor field `{field}` holds {expected} element(s) but declares a length of {declared}")]
    DescriptorMismatch {
        field: &'static str,
        expected: usize,
        declared: usize,
    },

    /// Shader bytecode cannot be viewed as 32-bit words.
    #[error("shader bytecode length {len} is not a multiple of 4")]
    InvalidShaderBytecode { len: usize },

    /// A shader entry point contained an interior NUL byte.
    #[error("shader entry point `{name}` is not a valid C string")]
    InvalidEntryPoint { name: String },

    /// The native library reported failure by returning a null handle.
    #[error("native call `{call}` returned a null handle")]
    NullHandle { call: &'static str },

    /// The adapter request callback delivered no adapter.
    #[error("no suitable adapter was reported for the requested backends")]
    NoAdapter,

    /// The window system behind a raw handle has no surface constructor.
    #[error("window system `{system}` is not supported for surface creation")]
    UnsupportedWindowSystem { system: &'static str },
}
