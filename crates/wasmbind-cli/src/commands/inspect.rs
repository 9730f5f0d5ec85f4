//! Inspect command implementation.
//!
//! Parses a package and shows the declaration overlay a run would write,
//! without touching the filesystem.

use super::common::{load_config, report_error};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::Path;
use tracing::error;
use wasmbind_codegen::{GeneratorOptions, TypeScriptGenerator};
use wasmbind_core::cli::{ExitCode, OutputFormat};
use wasmbind_core::{Diagnostic, Package};
use wasmbind_parser::{GoSourceParser, SourceParser};

/// What a run would generate for a package directory.
#[derive(Debug, Serialize)]
pub struct Inspection {
    /// Per-package declaration counts
    pub packages: Vec<PackageSummary>,
    /// Degradations the overlay would carry
    pub diagnostics: Vec<Diagnostic>,
    /// The `types.d.ts` text
    pub overlay: String,
}

/// Declaration counts for one package.
#[derive(Debug, Serialize)]
pub struct PackageSummary {
    /// Package name
    pub name: String,
    /// Record types
    pub records: usize,
    /// Functions that would be bound
    pub functions: usize,
    /// Type declarations that are not records
    pub skipped_types: usize,
}

impl From<&Package> for PackageSummary {
    fn from(package: &Package) -> Self {
        let records = package.records().count();
        Self {
            name: package.name().to_string(),
            records,
            functions: package.bindable_functions().count(),
            skipped_types: package.types().len() - records,
        }
    }
}

/// Builds the inspection for `path`.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the sources cannot
/// be parsed, or the overlay cannot be rendered.
pub fn inspect(path: &Path, config_file: Option<&Path>) -> wasmbind_core::Result<Inspection> {
    let (config, _) = load_config(path, config_file)?;
    let packages = GoSourceParser::new().parse(path)?;
    let generator = TypeScriptGenerator::with_options(GeneratorOptions::from(&config))?;
    let (overlay, diagnostics) = generator.render_overlay(&packages)?;

    Ok(Inspection {
        packages: packages.iter().map(PackageSummary::from).collect(),
        diagnostics,
        overlay,
    })
}

/// Runs the inspect command.
///
/// JSON output carries the whole [`Inspection`]; text and pretty output
/// print the overlay itself, with diagnostics on stderr.
///
/// # Errors
///
/// Returns an error only if the inspection cannot be formatted.
pub fn run(path: &Path, config_file: Option<&Path>, output_format: OutputFormat) -> Result<ExitCode> {
    let inspection = match inspect(path, config_file) {
        Ok(inspection) => inspection,
        Err(e) => {
            error!("{e}");
            report_error(&e, output_format);
            return Ok(ExitCode::for_error(&e));
        }
    };

    match output_format {
        OutputFormat::Json => {
            let formatted = crate::formatters::format_output(&inspection, output_format)
                .context("failed to format inspection")?;
            println!("{formatted}");
        }
        OutputFormat::Text => {
            print!("{}", inspection.overlay);
            for diagnostic in &inspection.diagnostics {
                eprintln!("warning: {diagnostic}");
            }
        }
        OutputFormat::Pretty => {
            print!("{}", inspection.overlay);
            for diagnostic in &inspection.diagnostics {
                eprintln!("{} {diagnostic}", "warning:".yellow().bold());
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
