//! Generate command implementation.
//!
//! Runs the full pipeline over one Go package directory:
//! 1. Loads configuration and applies command-line overrides
//! 2. Parses the package and writes the TypeScript bindings
//! 3. Stages the package with generated wrappers and compiles it
//! 4. Prints the run report

use super::common::{load_config, report_error};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info};
use wasmbind_codegen::{GeneratorOptions, TypeScriptGenerator};
use wasmbind_core::cli::{ExitCode, OutputFormat};
use wasmbind_core::{BindgenConfig, Error};
use wasmbind_parser::GoSourceParser;
use wasmbind_pipeline::Pipeline;
use wasmbind_toolchain::GoWasmToolchain;

/// Command-line overrides applied on top of the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Overrides<'a> {
    /// Keep the staging directory after success
    pub keep_staging: bool,
    /// Compile deadline in seconds
    pub timeout_secs: Option<u64>,
    /// Module specifier for the bindings
    pub module_name: Option<&'a str>,
}

impl Overrides<'_> {
    /// Applies the overrides to `config`.
    ///
    /// # Examples
    ///
    /// ```
    /// use wasmbind_cli::commands::generate::Overrides;
    /// use wasmbind_core::BindgenConfig;
    ///
    /// let mut config = BindgenConfig::default();
    /// Overrides { keep_staging: true, timeout_secs: Some(60), module_name: Some("@shop/cart") }
    ///     .apply(&mut config);
    /// assert!(config.keep_staging);
    /// assert_eq!(config.toolchain.timeout_secs, Some(60));
    /// assert_eq!(config.module_name, "@shop/cart");
    /// ```
    pub fn apply(&self, config: &mut BindgenConfig) {
        if self.keep_staging {
            config.keep_staging = true;
        }
        if let Some(secs) = self.timeout_secs {
            config.toolchain.timeout_secs = Some(secs);
        }
        if let Some(name) = self.module_name {
            config.module_name = name.to_string();
        }
    }
}

/// Runs the generate command.
///
/// Fatal run failures are logged and reported through the returned exit
/// code rather than as an error.
///
/// # Errors
///
/// Returns an error only if the run report cannot be formatted.
pub fn run(
    path: &Path,
    config_file: Option<&Path>,
    overrides: &Overrides<'_>,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let config = match prepare_config(path, config_file, overrides) {
        Ok(config) => config,
        Err(e) => return Ok(fail(&e, output_format)),
    };

    let generator = match TypeScriptGenerator::with_options(GeneratorOptions::from(&config)) {
        Ok(generator) => generator,
        Err(e) => return Ok(fail(&e, output_format)),
    };
    let toolchain = GoWasmToolchain::new(&config);

    info!("Generating bindings for {}", path.display());
    let mut pipeline = Pipeline::new(path, config, GoSourceParser::new(), generator, toolchain);

    match pipeline.run() {
        Ok(report) => {
            let formatted = crate::formatters::format_output(&report, output_format)
                .context("failed to format run report")?;
            println!("{formatted}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            report_error(&e, output_format);
            Ok(ExitCode::for_error(e.error()))
        }
    }
}

fn prepare_config(
    path: &Path,
    config_file: Option<&Path>,
    overrides: &Overrides<'_>,
) -> wasmbind_core::Result<BindgenConfig> {
    if !path.is_dir() {
        return Err(Error::InvalidArgument(format!(
            "input path {} is not a directory",
            path.display()
        )));
    }
    let (mut config, source) = load_config(path, config_file)?;
    info!("Using configuration: {source:?}");
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn fail(e: &Error, output_format: OutputFormat) -> ExitCode {
    error!("{e}");
    report_error(e, output_format);
    ExitCode::for_error(e)
}
