//! Toolchain adapter for wasmbind.
//!
//! Drives the native Go compiler toward the `js/wasm` target over a staged
//! copy of the input package, then places the compiled binary and the host
//! glue script beside the generated bindings.
//!
//! The [`Toolchain`] trait is the seam the pipeline depends on; tests replace
//! it with a mock and never need a Go installation.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod go;
mod process;

pub use go::{GLUE_SEARCH_DIRS, GLUE_SOURCE_NAME, GoWasmToolchain, find_glue};

use std::path::Path;
use wasmbind_core::Result;

/// Compiles a staged source tree and places its artifacts.
pub trait Toolchain {
    /// Compiles `staging_dir` to WebAssembly and copies the binary and the
    /// host glue script into `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`wasmbind_core::Error::ExternalCompile`] if compilation fails,
    /// [`wasmbind_core::Error::Timeout`] if it exceeds its deadline,
    /// [`wasmbind_core::Error::ArtifactCopy`] if the binary cannot be placed,
    /// and [`wasmbind_core::Error::GlueRetrieval`] if the glue script cannot
    /// be found or copied.
    fn compile(&self, output_dir: &Path, staging_dir: &Path) -> Result<()>;
}

impl<T: Toolchain + ?Sized> Toolchain for &T {
    fn compile(&self, output_dir: &Path, staging_dir: &Path) -> Result<()> {
        (**self).compile(output_dir, staging_dir)
    }
}
