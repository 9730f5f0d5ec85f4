//! Run orchestration for wasmbind.
//!
//! A [`Pipeline`] takes one input directory through a fixed sequence of
//! [`Stage`]s:
//!
//! ```text
//! Init → Parsed → OutputReady → OverlayWritten → StagingReady →
//! StagingPopulated → WrapperWritten → Compiled → ArtifactPlaced → CleanedUp
//! ```
//!
//! Any fatal error moves the run to [`Stage::Failed`] and is returned as a
//! [`PipelineError`]. The parser, generator and toolchain are injected, so
//! each can be replaced in tests.
//!
//! # Examples
//!
//! ```no_run
//! use wasmbind_codegen::{GeneratorOptions, TypeScriptGenerator};
//! use wasmbind_core::BindgenConfig;
//! use wasmbind_parser::GoSourceParser;
//! use wasmbind_pipeline::Pipeline;
//! use wasmbind_toolchain::GoWasmToolchain;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BindgenConfig::default();
//! let generator = TypeScriptGenerator::with_options(GeneratorOptions::from(&config))?;
//! let toolchain = GoWasmToolchain::new(&config);
//!
//! let mut pipeline = Pipeline::new("./shop", config, GoSourceParser::new(), generator, toolchain);
//! let report = pipeline.run()?;
//! println!("bindings in {}", report.output_dir.display());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod pipeline;
mod report;
mod stage;

pub use pipeline::Pipeline;
pub use report::{PipelineError, RunReport};
pub use stage::Stage;
