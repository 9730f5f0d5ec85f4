//! The run state machine.

use crate::{PipelineError, RunReport, Stage};
use std::fs;
use std::path::{Path, PathBuf};
use wasmbind_codegen::{GeneratedCode, TargetGenerator};
use wasmbind_core::{BindgenConfig, Error};
use wasmbind_parser::SourceParser;
use wasmbind_toolchain::Toolchain;

type StageResult<T> = std::result::Result<T, PipelineError>;

/// Drives one input directory through parsing, generation, staging,
/// compilation and cleanup.
///
/// Stages run strictly in sequence. The first fatal error stops the run,
/// moves it to [`Stage::Failed`] and leaves whatever was already written on
/// disk, including the staging directory.
#[derive(Debug)]
pub struct Pipeline<P, G, T> {
    root: PathBuf,
    config: BindgenConfig,
    parser: P,
    generator: G,
    toolchain: T,
    stage: Stage,
}

impl<P, G, T> Pipeline<P, G, T>
where
    P: SourceParser,
    G: TargetGenerator,
    T: Toolchain,
{
    /// Creates a pipeline for the input directory `root`.
    pub fn new(
        root: impl Into<PathBuf>,
        config: BindgenConfig,
        parser: P,
        generator: G,
        toolchain: T,
    ) -> Self {
        Self {
            root: root.into(),
            config,
            parser,
            generator,
            toolchain,
            stage: Stage::Init,
        }
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Input directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run configuration.
    #[must_use]
    pub const fn config(&self) -> &BindgenConfig {
        &self.config
    }

    /// Executes every stage from the beginning.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] naming the stage that could not be
    /// reached. Parse failures and cleanup failures are logged and never
    /// returned.
    pub fn run(&mut self) -> StageResult<RunReport> {
        self.stage = Stage::Init;
        let result = self.execute();
        match &result {
            Ok(report) => tracing::info!(
                output = %report.output_dir.display(),
                packages = report.packages,
                diagnostics = report.diagnostics.len(),
                "Bindings generated"
            ),
            Err(e) => {
                self.stage = Stage::Failed;
                tracing::error!(stage = %e.stage, error = %e.source, "Run failed");
            }
        }
        result
    }

    fn execute(&mut self) -> StageResult<RunReport> {
        let packages = match self.parser.parse(&self.root) {
            Ok(packages) => packages,
            Err(e) => {
                tracing::warn!(error = %e, "Parsing failed; continuing without declarations");
                Vec::new()
            }
        };
        if packages.is_empty() {
            tracing::warn!(root = %self.root.display(), "No declarations found");
        }
        self.advance(Stage::Parsed);

        let root = std::path::absolute(&self.root).map_err(|source| {
            PipelineError::new(
                Stage::OutputReady,
                Error::DirectoryCreation {
                    path: self.root.clone(),
                    source,
                },
            )
        })?;
        let output_dir = root
            .join(&self.config.output_root)
            .join(self.generator.namespace());
        create_dir(&output_dir).map_err(fail(Stage::OutputReady))?;
        self.advance(Stage::OutputReady);

        let outputs = self
            .generator
            .generate_output_files(&packages)
            .map_err(fail(Stage::OverlayWritten))?;
        let written = write(&outputs, &output_dir).map_err(fail(Stage::OverlayWritten))?;
        self.advance(Stage::OverlayWritten);

        let staging_dir = root.join(&self.config.staging_dir);
        fresh_dir(&staging_dir).map_err(fail(Stage::StagingReady))?;
        self.advance(Stage::StagingReady);

        let copied = wasmbind_files::copy_tree(&root, &staging_dir, &self.config.staging_excludes())
            .map_err(|e| Error::StagingCopy {
                path: root.clone(),
                source: Box::new(e),
            })
            .map_err(fail(Stage::StagingPopulated))?;
        self.advance(Stage::StagingPopulated);

        let sources = self
            .generator
            .generate_source_files(&packages)
            .map_err(fail(Stage::WrapperWritten))?;
        let wrappers = write(&sources, &staging_dir).map_err(fail(Stage::WrapperWritten))?;
        self.advance(Stage::WrapperWritten);

        self.toolchain
            .compile(&output_dir, &staging_dir)
            .map_err(fail(Stage::Compiled))?;
        self.advance(Stage::Compiled);

        // The toolchain places both artifacts itself
        self.advance(Stage::ArtifactPlaced);

        let cleaned_up = self.clean_up(&staging_dir);
        self.advance(Stage::CleanedUp);

        let mut diagnostics = outputs.diagnostics;
        diagnostics.extend(sources.diagnostics);

        Ok(RunReport {
            packages: packages.len(),
            output_dir,
            staging_dir,
            written,
            staged: copied.file_count(),
            wrappers,
            diagnostics,
            cleaned_up,
        })
    }

    fn clean_up(&self, staging_dir: &Path) -> bool {
        if self.config.keep_staging {
            tracing::info!(path = %staging_dir.display(), "Keeping staging directory");
            return false;
        }
        match wasmbind_files::remove_tree(staging_dir) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to remove staging directory");
                false
            }
        }
    }

    fn advance(&mut self, stage: Stage) {
        tracing::debug!(from = %self.stage, to = %stage, "Stage reached");
        self.stage = stage;
    }
}

fn fail(stage: Stage) -> impl FnOnce(Error) -> PipelineError {
    move |source| PipelineError::new(stage, source)
}

fn create_dir(path: &Path) -> wasmbind_core::Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::DirectoryCreation {
        path: path.to_path_buf(),
        source,
    })
}

/// Creates `path` empty, removing leftovers from an earlier failed run.
fn fresh_dir(path: &Path) -> wasmbind_core::Result<()> {
    if path.exists() {
        tracing::debug!(path = %path.display(), "Removing stale staging directory");
        fs::remove_dir_all(path).map_err(|source| Error::DirectoryCreation {
            path: path.to_path_buf(),
            source,
        })?;
    }
    create_dir(path)
}

fn write(code: &GeneratedCode, dir: &Path) -> wasmbind_core::Result<Vec<PathBuf>> {
    wasmbind_files::write_generated(code, dir).map_err(|e| Error::OutputWrite {
        path: dir.to_path_buf(),
        source: Box::new(e),
    })
}
