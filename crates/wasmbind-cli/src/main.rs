//! wasmbind CLI.
//!
//! Generates TypeScript bindings and a WebAssembly build for a Go package.
//!
//! # Architecture
//!
//! The CLI is organized around subcommands:
//! - `generate` - Run the full pipeline and write `output/ts/`
//! - `inspect` - Print the declaration overlay without writing anything
//! - `completions` - Generate shell completions
//!
//! # Examples
//!
//! ```bash
//! # Bindings for the package in ./shop
//! wasmbind generate --path ./shop
//!
//! # Preview the TypeScript declarations
//! wasmbind inspect --path ./shop
//! ```

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wasmbind_cli::commands;
use wasmbind_cli::commands::generate::Overrides;
use wasmbind_core::cli::{ExitCode, OutputFormat};

/// wasmbind - Go packages as TypeScript modules backed by WebAssembly.
#[derive(Parser, Debug)]
#[command(name = "wasmbind")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", global = true, default_value = "pretty")]
    format: String,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate bindings and compile the package to WebAssembly.
    ///
    /// Writes `types.d.ts`, `lib.js`, `package.json`, the compiled binary
    /// and `wasm_exec.js` to `<path>/output/ts/`.
    Generate {
        /// Go package directory
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Configuration file (default: <path>/wasmbind.toml, then the user config)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Keep the staging directory after a successful run
        #[arg(long)]
        keep_staging: bool,

        /// Abort the compile after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Module specifier used in the declarations and package.json
        #[arg(long)]
        module_name: Option<String>,
    },

    /// Print the declaration overlay without writing any files.
    Inspect {
        /// Go package directory
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell for completion generation
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let output_format = cli
        .format
        .parse::<OutputFormat>()
        .context("invalid --format value")?;

    let exit_code = execute_command(cli.command, output_format)?;

    std::process::exit(exit_code.as_i32());
}

/// Installs the stderr subscriber; `--verbose` forces debug, otherwise
/// `RUST_LOG` or `info`.
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Routes a command to its handler.
fn execute_command(command: Commands, output_format: OutputFormat) -> Result<ExitCode> {
    match command {
        Commands::Generate {
            path,
            config,
            keep_staging,
            timeout,
            module_name,
        } => {
            let overrides = Overrides {
                keep_staging,
                timeout_secs: timeout,
                module_name: module_name.as_deref(),
            };
            commands::generate::run(&path, config.as_deref(), &overrides, output_format)
        }
        Commands::Inspect { path, config } => {
            commands::inspect::run(&path, config.as_deref(), output_format)
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            Ok(commands::completions::run(shell, &mut cmd))
        }
    }
}
