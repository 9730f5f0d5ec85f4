//! Error types for wasmbind.
//!
//! Every fatal condition a generation run can hit has its own variant, and
//! each variant keeps the original cause attached as its `source`. Non-fatal
//! conditions (skipped declarations, unresolved types) are not errors; they
//! are reported as [`Diagnostic`](crate::Diagnostic)s instead.
//!
//! # Examples
//!
//! ```
//! use wasmbind_core::{Error, Result};
//!
//! fn check_namespace(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(Error::ConfigError {
//!             message: "namespace cannot be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = check_namespace("").unwrap_err();
//! assert!(err.is_config_error());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error cause, used where the underlying failure comes from another crate.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for wasmbind.
#[derive(Error, Debug)]
pub enum Error {
    /// An output or staging directory could not be created.
    #[error("failed to create directory {}", path.display())]
    DirectoryCreation {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A generated file could not be written.
    #[error("failed to write {}", path.display())]
    OutputWrite {
        /// File that could not be written
        path: PathBuf,
        /// Underlying error cause
        #[source]
        source: BoxError,
    },

    /// Copying the input tree into the staging directory failed.
    #[error("failed to stage {} into the build directory", path.display())]
    StagingCopy {
        /// Source tree being copied
        path: PathBuf,
        /// Underlying error cause
        #[source]
        source: BoxError,
    },

    /// The native compiler failed or could not be started.
    ///
    /// `status` is `None` when the process never ran to completion (spawn
    /// failure or signal).
    #[error("external compile failed ({}): {message}", status.map_or_else(|| "no exit status".to_string(), |c| format!("exit status {c}")))]
    ExternalCompile {
        /// Summary of the failure, usually the captured stderr
        message: String,
        /// Exit status of the compiler, if it exited
        status: Option<i32>,
        /// Underlying error cause, if any
        #[source]
        source: Option<BoxError>,
    },

    /// The compiled artifact could not be copied into the output directory.
    #[error("failed to copy artifact {} to {}", from.display(), to.display())]
    ArtifactCopy {
        /// Artifact source path
        from: PathBuf,
        /// Artifact destination path
        to: PathBuf,
        /// Underlying error cause
        #[source]
        source: BoxError,
    },

    /// The host-runtime glue script could not be located or read.
    #[error("failed to retrieve host glue script: {message}")]
    GlueRetrieval {
        /// Description of what went wrong
        message: String,
        /// Underlying error cause, if any
        #[source]
        source: Option<BoxError>,
    },

    /// A template could not be registered or rendered.
    #[error("template error in '{template}': {message}")]
    TemplateError {
        /// Template name
        template: String,
        /// Description of the failure
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serialization failure
        message: String,
        /// Underlying serde error
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Source files could not be read or scanned.
    #[error("failed to parse {}: {message}", path.display())]
    ParseError {
        /// File or directory being parsed
        path: PathBuf,
        /// Description of the failure
        message: String,
        /// Underlying I/O error, if any
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Timeout error.
    #[error("Operation timed out after {duration_secs}s: {operation}")]
    Timeout {
        /// Name of the operation that timed out
        operation: String,
        /// Duration in seconds before timeout occurred
        duration_secs: u64,
    },

    /// Invalid argument error.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Returns `true` if the external compiler step failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use wasmbind_core::Error;
    ///
    /// let err = Error::ExternalCompile {
    ///     message: "undefined: Foo".to_string(),
    ///     status: Some(1),
    ///     source: None,
    /// };
    /// assert!(err.is_compile_error());
    /// ```
    #[must_use]
    pub const fn is_compile_error(&self) -> bool {
        matches!(self, Self::ExternalCompile { .. })
    }

    /// Returns `true` if placing a build artifact (binary or glue) failed.
    ///
    /// # Examples
    ///
    /// ```
    /// use wasmbind_core::Error;
    ///
    /// let err = Error::GlueRetrieval {
    ///     message: "wasm_exec.js not found".to_string(),
    ///     source: None,
    /// };
    /// assert!(err.is_artifact_error());
    /// ```
    #[must_use]
    pub const fn is_artifact_error(&self) -> bool {
        matches!(self, Self::ArtifactCopy { .. } | Self::GlueRetrieval { .. })
    }

    /// Returns `true` if a filesystem stage (directories, writes, staging) failed.
    #[must_use]
    pub const fn is_filesystem_error(&self) -> bool {
        matches!(
            self,
            Self::DirectoryCreation { .. } | Self::OutputWrite { .. } | Self::StagingCopy { .. }
        )
    }

    /// Returns `true` if this is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use wasmbind_core::Error;
    ///
    /// let err = Error::ConfigError {
    ///     message: "staging_dir is empty".to_string(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. } | Self::InvalidArgument(_))
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this is a parse error.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }
}

/// Result type alias for wasmbind operations.
///
/// # Examples
///
/// ```
/// use wasmbind_core::{Error, Result};
///
/// fn non_negative(value: i32) -> Result<i32> {
///     if value < 0 {
///         return Err(Error::InvalidArgument("value must be non-negative".to_string()));
///     }
///     Ok(value)
/// }
///
/// assert!(non_negative(5).is_ok());
/// assert!(non_negative(-1).is_err());
/// ```
pub type Result<T> = std::result::Result<T, Error>;
