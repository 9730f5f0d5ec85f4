//! The Go `js/wasm` toolchain.

use crate::Toolchain;
use crate::process::{self, Captured, RunError};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use wasmbind_core::{BindgenConfig, Error, Result};

/// Name of the glue script inside a Go installation.
pub const GLUE_SOURCE_NAME: &str = "wasm_exec.js";

/// Directories under `GOROOT` searched for the glue script, in order.
pub const GLUE_SEARCH_DIRS: [&str; 2] = ["lib/wasm", "misc/wasm"];

/// Compiles staged Go sources with `GOOS=js GOARCH=wasm` and places the
/// binary and `wasm_exec.js` in the output directory.
///
/// # Examples
///
/// ```
/// use wasmbind_core::BindgenConfig;
/// use wasmbind_toolchain::GoWasmToolchain;
///
/// let toolchain = GoWasmToolchain::new(&BindgenConfig::default());
/// assert_eq!(toolchain.compiler(), "go");
/// assert_eq!(toolchain.wasm_name(), "main.wasm");
/// ```
#[derive(Debug, Clone)]
pub struct GoWasmToolchain {
    compiler: String,
    timeout: Option<Duration>,
    wasm_name: String,
    glue_name: String,
}

impl GoWasmToolchain {
    /// Creates a toolchain from run configuration.
    #[must_use]
    pub fn new(config: &BindgenConfig) -> Self {
        Self {
            compiler: config.toolchain.compiler.clone(),
            timeout: config.compile_timeout(),
            wasm_name: config.artifacts.wasm.clone(),
            glue_name: config.artifacts.glue.clone(),
        }
    }

    /// Overrides the compile deadline.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Compiler executable.
    #[must_use]
    pub fn compiler(&self) -> &str {
        &self.compiler
    }

    /// File name of the compiled binary.
    #[must_use]
    pub fn wasm_name(&self) -> &str {
        &self.wasm_name
    }

    /// File name the glue script is given in the output directory.
    #[must_use]
    pub fn glue_name(&self) -> &str {
        &self.glue_name
    }

    fn build(&self, staging_dir: &Path) -> Result<()> {
        let mut command = Command::new(&self.compiler);
        command
            .arg("build")
            .arg("-o")
            .arg(&self.wasm_name)
            .current_dir(staging_dir)
            .env("GOOS", "js")
            .env("GOARCH", "wasm");

        tracing::info!(
            compiler = %self.compiler,
            dir = %staging_dir.display(),
            "Compiling to WebAssembly"
        );

        let captured = process::run(command, self.timeout).map_err(|e| match e {
            RunError::TimedOut(limit) => timeout_error("compile", limit),
            RunError::Spawn(source) => Error::ExternalCompile {
                message: format!("failed to start '{}'", self.compiler),
                status: None,
                source: Some(Box::new(source)),
            },
            RunError::Wait(source) => Error::ExternalCompile {
                message: format!("failed waiting for '{}'", self.compiler),
                status: None,
                source: Some(Box::new(source)),
            },
        })?;
        replay(&captured);

        if captured.status.success() {
            Ok(())
        } else {
            let text = captured.diagnostic_text();
            let message = if text.is_empty() {
                format!("compiler exited with {}", captured.status)
            } else {
                text.to_string()
            };
            Err(Error::ExternalCompile {
                message,
                status: captured.status.code(),
                source: None,
            })
        }
    }

    fn goroot(&self) -> Result<PathBuf> {
        let mut command = Command::new(&self.compiler);
        command.arg("env").arg("GOROOT");

        let captured = process::run(command, self.timeout).map_err(|e| match e {
            RunError::TimedOut(limit) => timeout_error("locate GOROOT", limit),
            RunError::Spawn(source) | RunError::Wait(source) => Error::GlueRetrieval {
                message: format!("failed to run '{} env GOROOT'", self.compiler),
                source: Some(Box::new(source)),
            },
        })?;

        let root = captured.stdout.trim();
        if !captured.status.success() || root.is_empty() {
            return Err(Error::GlueRetrieval {
                message: format!(
                    "'{} env GOROOT' did not report a Go installation: {}",
                    self.compiler,
                    captured.diagnostic_text()
                ),
                source: None,
            });
        }
        tracing::debug!(goroot = root, "Resolved GOROOT");
        Ok(PathBuf::from(root))
    }

    fn place_binary(&self, output_dir: &Path, staging_dir: &Path) -> Result<()> {
        let from = staging_dir.join(&self.wasm_name);
        let to = output_dir.join(&self.wasm_name);
        wasmbind_files::copy_file(&from, &to).map_err(|e| Error::ArtifactCopy {
            from,
            to: to.clone(),
            source: Box::new(e),
        })?;
        tracing::debug!(path = %to.display(), "Placed WebAssembly binary");
        Ok(())
    }

    fn place_glue(&self, output_dir: &Path) -> Result<()> {
        let goroot = self.goroot()?;
        let glue = find_glue(&goroot)?;
        let to = output_dir.join(&self.glue_name);
        wasmbind_files::copy_file(&glue, &to).map_err(|e| Error::GlueRetrieval {
            message: format!("failed to copy {} to {}", glue.display(), to.display()),
            source: Some(Box::new(e)),
        })?;
        tracing::debug!(from = %glue.display(), to = %to.display(), "Placed glue script");
        Ok(())
    }
}

impl Toolchain for GoWasmToolchain {
    fn compile(&self, output_dir: &Path, staging_dir: &Path) -> Result<()> {
        self.build(staging_dir)?;
        self.place_binary(output_dir, staging_dir)?;
        self.place_glue(output_dir)
    }
}

/// Locates `wasm_exec.js` inside a Go installation.
///
/// Newer releases ship it under `lib/wasm`, older ones under `misc/wasm`.
///
/// # Errors
///
/// Returns [`Error::GlueRetrieval`] if neither location has the script.
pub fn find_glue(goroot: &Path) -> Result<PathBuf> {
    GLUE_SEARCH_DIRS
        .iter()
        .map(|dir| goroot.join(dir).join(GLUE_SOURCE_NAME))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| Error::GlueRetrieval {
            message: format!(
                "{GLUE_SOURCE_NAME} not found under {} (searched {})",
                goroot.display(),
                GLUE_SEARCH_DIRS.join(", ")
            ),
            source: None,
        })
}

fn timeout_error(operation: &str, limit: Duration) -> Error {
    Error::Timeout {
        operation: operation.to_string(),
        duration_secs: limit.as_secs(),
    }
}

fn replay(captured: &Captured) {
    for line in captured.stdout.lines().filter(|l| !l.trim().is_empty()) {
        tracing::debug!(stream = "stdout", "{line}");
    }
    for line in captured.stderr.lines().filter(|l| !l.trim().is_empty()) {
        if captured.status.success() {
            tracing::debug!(stream = "stderr", "{line}");
        } else {
            tracing::warn!(stream = "stderr", "{line}");
        }
    }
}
