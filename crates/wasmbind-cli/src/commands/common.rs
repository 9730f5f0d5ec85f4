//! Configuration lookup and error reporting shared by CLI commands.

use colored::Colorize;
use serde::Serialize;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use wasmbind_core::cli::OutputFormat;
use wasmbind_core::{BindgenConfig, Error, Result};

/// Project-local configuration file name.
pub const PROJECT_CONFIG_FILE: &str = "wasmbind.toml";

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "path", rename_all = "snake_case")]
pub enum ConfigSource {
    /// `--config <file>`
    Explicit(PathBuf),
    /// `<input>/wasmbind.toml`
    Project(PathBuf),
    /// `<user config dir>/wasmbind/config.toml`
    User(PathBuf),
    /// Built-in defaults
    Defaults,
}

/// Returns the per-user configuration file path, if the platform has a
/// configuration directory.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("wasmbind").join("config.toml"))
}

/// Loads configuration for a run over `input`.
///
/// Lookup order: `explicit`, `<input>/wasmbind.toml`, the per-user file,
/// then defaults. An explicit file must exist; the others are optional.
///
/// # Errors
///
/// Returns [`Error::ConfigError`] if the chosen file cannot be read or
/// parsed.
pub fn load_config(input: &Path, explicit: Option<&Path>) -> Result<(BindgenConfig, ConfigSource)> {
    load_config_from(input, explicit, user_config_path().as_deref())
}

/// [`load_config`] with the per-user path supplied by the caller.
///
/// # Errors
///
/// Returns [`Error::ConfigError`] if the chosen file cannot be read or
/// parsed.
pub fn load_config_from(
    input: &Path,
    explicit: Option<&Path>,
    user: Option<&Path>,
) -> Result<(BindgenConfig, ConfigSource)> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(Error::ConfigError {
                message: format!("config file {} does not exist", path.display()),
            });
        }
        return Ok((BindgenConfig::load(path)?, ConfigSource::Explicit(path.to_path_buf())));
    }

    let project = input.join(PROJECT_CONFIG_FILE);
    if project.is_file() {
        return Ok((BindgenConfig::load(&project)?, ConfigSource::Project(project)));
    }

    if let Some(user) = user.filter(|path| path.is_file()) {
        return Ok((BindgenConfig::load(user)?, ConfigSource::User(user.to_path_buf())));
    }

    Ok((BindgenConfig::default(), ConfigSource::Defaults))
}

/// Prints a fatal error and its causes to stderr for pretty output.
///
/// Machine-readable formats keep stderr to the log stream.
pub fn report_error(error: &(dyn StdError + 'static), output_format: OutputFormat) {
    if output_format != OutputFormat::Pretty {
        return;
    }
    eprintln!("{} {error}", "error:".red().bold());
    let mut cause = error.source();
    while let Some(inner) = cause {
        eprintln!("  {} {inner}", "caused by:".dimmed());
        cause = inner.source();
    }
}
