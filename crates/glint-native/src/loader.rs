//! Locates the `wgpu_native` shared library on disk.
//!
//! Resolution order: an explicit override path wins unconditionally;
//! otherwise the platform naming convention selects a debug or release
//! artifact, searched across the configured directories. Opening the library
//! and resolving its symbols happens in [`crate::gpu::NativeGpu::load`].

use std::path::{Path, PathBuf};

use crate::error::LoadError;

/// Environment variable holding an absolute override path for the library.
pub const LIB_PATH_ENV: &str = "WGPU_LIB_PATH";

/// Environment variable selecting the debug artifact when set to `1`.
pub const DEBUG_ENV: &str = "WGPU_DEBUG";

/// Where and what to load.
///
/// Keep this structure stable and minimal; it is the loader's entire
/// configuration surface.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Explicit library path. Takes precedence unconditionally; no existence
    /// check is performed (use it or fail trying).
    pub override_path: Option<PathBuf>,

    /// Select the debug build artifact instead of release.
    pub debug: bool,

    /// Directories searched for the platform-named artifact, in order.
    pub search_dirs: Vec<PathBuf>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            override_path: None,
            debug: false,
            search_dirs: default_search_dirs(),
        }
    }
}

impl LoadOptions {
    /// Reads `WGPU_LIB_PATH` and `WGPU_DEBUG` from the environment.
    pub fn from_env() -> Self {
        let override_path = std::env::var_os(LIB_PATH_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty());
        let debug = std::env::var(DEBUG_ENV)
            .map(|value| value.trim() == "1")
            .unwrap_or(false);

        Self {
            override_path,
            debug,
            ..Self::default()
        }
    }

    /// Resolves the library path for the current platform.
    pub fn resolve(&self) -> Result<PathBuf, LoadError> {
        self.resolve_on(std::env::consts::OS, |path| path.is_file())
    }

    fn resolve_on(
        &self,
        os: &str,
        exists: impl Fn(&Path) -> bool,
    ) -> Result<PathBuf, LoadError> {
        if let Some(path) = &self.override_path {
            return Ok(path.clone());
        }

        let filename = library_filename(os, self.debug)?;
        let mut searched = Vec::with_capacity(self.search_dirs.len());
        for dir in &self.search_dirs {
            let candidate = dir.join(&filename);
            if exists(&candidate) {
                return Ok(candidate);
            }
            searched.push(candidate);
        }

        Err(LoadError::NotFound { searched })
    }
}

/// Platform naming convention for the shipped artifact.
pub fn library_filename(os: &str, debug: bool) -> Result<String, LoadError> {
    let build = if debug { "debug" } else { "release" };
    match os {
        "windows" => Ok(format!("wgpu_native-{build}.dll")),
        "macos" => Ok(format!("libwgpu_native-{build}.dylib")),
        "linux" => Ok(format!("libwgpu_native-{build}.so")),
        other => Err(LoadError::UnsupportedPlatform {
            os: other.to_string(),
        }),
    }
}

/// Executable directory first, then the working directory.
///
/// Note that a hit can still be a false positive, e.g. an artifact built for
/// another architecture; the subsequent open reports that.
fn default_search_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            dirs.push(dir.to_path_buf());
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    dirs
}
