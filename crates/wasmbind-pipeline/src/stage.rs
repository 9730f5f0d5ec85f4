//! Run stages.

use serde::Serialize;
use std::fmt;

/// Position of a run in the pipeline state machine.
///
/// Stages advance strictly in declaration order. `CleanedUp` is the terminal
/// success state and `Failed` the terminal failure state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing has run yet
    Init,
    /// Declarations obtained (possibly empty)
    Parsed,
    /// Output directory exists
    OutputReady,
    /// Overlay, runtime module and manifest written
    OverlayWritten,
    /// Staging directory exists
    StagingReady,
    /// Input tree copied into staging
    StagingPopulated,
    /// Wrapper sources written into staging
    WrapperWritten,
    /// Toolchain finished
    Compiled,
    /// Binary and glue script are in the output directory
    ArtifactPlaced,
    /// Staging handled; the run succeeded
    CleanedUp,
    /// A stage failed; the run stopped there
    Failed,
}

impl Stage {
    /// Returns `true` for `CleanedUp` and `Failed`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wasmbind_pipeline::Stage;
    ///
    /// assert!(Stage::CleanedUp.is_terminal());
    /// assert!(!Stage::Compiled.is_terminal());
    /// ```
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::CleanedUp | Self::Failed)
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Parsed => "parsed",
            Self::OutputReady => "output_ready",
            Self::OverlayWritten => "overlay_written",
            Self::StagingReady => "staging_ready",
            Self::StagingPopulated => "staging_populated",
            Self::WrapperWritten => "wrapper_written",
            Self::Compiled => "compiled",
            Self::ArtifactPlaced => "artifact_placed",
            Self::CleanedUp => "cleaned_up",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
