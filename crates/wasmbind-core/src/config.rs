//! Run configuration.
//!
//! Configuration is read from TOML. Every key is optional; missing keys take
//! the defaults shown below.
//!
//! ```toml
//! output_root = "output"
//! staging_dir = ".tmp"
//! exclude = [".git"]
//! module_name = "@wasmbind/bindings"
//! module_version = "1.0.0"
//! keep_staging = false
//!
//! [artifacts]
//! wasm = "main.wasm"
//! glue = "wasm_exec.js"
//!
//! [toolchain]
//! compiler = "go"
//! # timeout_secs = 300
//! ```
//!
//! # Examples
//!
//! ```
//! use wasmbind_core::BindgenConfig;
//!
//! let config = BindgenConfig::from_toml_str("module_name = \"@shop/cart\"")?;
//! assert_eq!(config.module_name, "@shop/cart");
//! assert_eq!(config.staging_dir, ".tmp");
//! # Ok::<(), wasmbind_core::Error>(())
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Configuration for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BindgenConfig {
    /// Directory beside the input holding all generated output
    pub output_root: String,

    /// Transient build directory beside the input, deleted after a successful run
    pub staging_dir: String,

    /// Extra path substrings excluded from the staging copy.
    ///
    /// The output root and staging directory are always excluded.
    pub exclude: Vec<String>,

    /// Module specifier used in the declaration overlay and `package.json`
    pub module_name: String,

    /// Version written to `package.json`
    pub module_version: String,

    /// Keep the staging directory after a successful run
    pub keep_staging: bool,

    /// File names of the build artifacts
    pub artifacts: ArtifactNames,

    /// Native toolchain settings
    pub toolchain: ToolchainConfig,
}

/// File names of the compiled binary and the host glue script.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactNames {
    /// Compiled WebAssembly binary
    pub wasm: String,
    /// Host-runtime glue script shipped with the toolchain
    pub glue: String,
}

/// Native toolchain settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    /// Compiler executable (name on `PATH` or absolute path)
    pub compiler: String,
    /// Deadline for the compile step; `None` waits indefinitely
    pub timeout_secs: Option<u64>,
}

impl Default for BindgenConfig {
    fn default() -> Self {
        Self {
            output_root: "output".to_string(),
            staging_dir: ".tmp".to_string(),
            exclude: vec![".git".to_string()],
            module_name: "@wasmbind/bindings".to_string(),
            module_version: "1.0.0".to_string(),
            keep_staging: false,
            artifacts: ArtifactNames::default(),
            toolchain: ToolchainConfig::default(),
        }
    }
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            wasm: "main.wasm".to_string(),
            glue: "wasm_exec.js".to_string(),
        }
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            compiler: "go".to_string(),
            timeout_secs: None,
        }
    }
}

impl BindgenConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the document is not valid TOML, has
    /// unknown keys, or fails [`validate`](Self::validate).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::ConfigError {
            message: format!("failed to parse config: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::ConfigError {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content)
    }

    /// Serializes the configuration back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ConfigError {
            message: format!("failed to serialize config: {e}"),
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if a directory or artifact name is
    /// empty or contains a path separator, if the output root and staging
    /// directory coincide, if a required string is empty, or if the timeout
    /// is zero.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("output_root", &self.output_root),
            ("staging_dir", &self.staging_dir),
            ("artifacts.wasm", &self.artifacts.wasm),
            ("artifacts.glue", &self.artifacts.glue),
        ] {
            if value.is_empty() || value.contains(['/', '\\']) || value == "." || value == ".." {
                return Err(Error::ConfigError {
                    message: format!("{key} must be a plain file or directory name, got '{value}'"),
                });
            }
        }

        if self.output_root == self.staging_dir {
            return Err(Error::ConfigError {
                message: "output_root and staging_dir must differ".to_string(),
            });
        }

        for (key, value) in [
            ("module_name", &self.module_name),
            ("module_version", &self.module_version),
            ("toolchain.compiler", &self.toolchain.compiler),
        ] {
            if value.trim().is_empty() {
                return Err(Error::ConfigError {
                    message: format!("{key} cannot be empty"),
                });
            }
        }

        if self.exclude.iter().any(String::is_empty) {
            return Err(Error::ConfigError {
                message: "exclude entries cannot be empty (an empty pattern matches every path)"
                    .to_string(),
            });
        }

        if self.toolchain.timeout_secs == Some(0) {
            return Err(Error::ConfigError {
                message: "toolchain.timeout_secs must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Path substrings excluded from the staging copy: the staging directory,
    /// the output root, then the configured extras.
    #[must_use]
    pub fn staging_excludes(&self) -> Vec<String> {
        let mut excludes = vec![self.staging_dir.clone(), self.output_root.clone()];
        for extra in &self.exclude {
            if !excludes.contains(extra) {
                excludes.push(extra.clone());
            }
        }
        excludes
    }

    /// Compile deadline, if one is configured.
    #[must_use]
    pub fn compile_timeout(&self) -> Option<Duration> {
        self.toolchain.timeout_secs.map(Duration::from_secs)
    }
}
