//! Run outcome types.

use crate::Stage;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use wasmbind_core::{Diagnostic, Error};

/// Summary of a successful run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Packages the parser produced
    pub packages: usize,
    /// Directory holding the generated bindings and artifacts
    pub output_dir: PathBuf,
    /// Staging directory used for the compile
    pub staging_dir: PathBuf,
    /// Output files written by the generator
    pub written: Vec<PathBuf>,
    /// Files copied from the input into staging
    pub staged: usize,
    /// Wrapper sources written into staging
    pub wrappers: Vec<PathBuf>,
    /// Non-fatal degradations raised while generating
    pub diagnostics: Vec<Diagnostic>,
    /// Whether the staging directory was removed
    pub cleaned_up: bool,
}

/// A fatal failure, tagged with the stage that could not be reached.
///
/// # Examples
///
/// ```
/// use wasmbind_core::Error;
/// use wasmbind_pipeline::{PipelineError, Stage};
///
/// let err = PipelineError::new(
///     Stage::Compiled,
///     Error::ExternalCompile {
///         message: "undefined: Foo".to_string(),
///         status: Some(2),
///         source: None,
///     },
/// );
/// assert_eq!(err.stage, Stage::Compiled);
/// assert!(err.error().is_compile_error());
/// assert!(err.to_string().starts_with("stage 'compiled' failed"));
/// ```
#[derive(Debug, Error)]
#[error("stage '{stage}' failed: {source}")]
pub struct PipelineError {
    /// Stage the run was trying to reach
    pub stage: Stage,
    /// Underlying cause
    #[source]
    pub source: Error,
}

impl PipelineError {
    /// Creates a stage failure.
    #[must_use]
    pub const fn new(stage: Stage, source: Error) -> Self {
        Self { stage, source }
    }

    /// The underlying error.
    #[must_use]
    pub const fn error(&self) -> &Error {
        &self.source
    }

    /// Consumes the failure, returning the underlying error.
    #[must_use]
    pub fn into_error(self) -> Error {
        self.source
    }
}
