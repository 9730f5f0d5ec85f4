//! Shell completion generation command.
//!
//! Generates completion scripts for bash, zsh, fish, elvish and `PowerShell`.

use clap::Command;
use clap_complete::{Shell, generate};
use std::io::{self, Write};
use tracing::info;
use wasmbind_core::cli::ExitCode;

/// Writes the completion script for `shell` to `out`.
///
/// # Examples
///
/// ```
/// use clap::Command;
/// use clap_complete::Shell;
/// use wasmbind_cli::commands::completions;
///
/// let mut cmd = Command::new("wasmbind").subcommand(Command::new("generate"));
/// let mut script = Vec::new();
/// completions::write_completions(Shell::Bash, &mut cmd, &mut script);
/// assert!(String::from_utf8(script).unwrap().contains("wasmbind"));
/// ```
pub fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, out);
}

/// Runs the completions command, printing the script to stdout.
pub fn run(shell: Shell, cmd: &mut Command) -> ExitCode {
    info!("Generating {shell} completions");
    write_completions(shell, cmd, &mut io::stdout());
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> Command {
        Command::new("wasmbind")
            .subcommand(Command::new("generate"))
            .subcommand(Command::new("inspect"))
    }

    #[test]
    fn test_every_shell_produces_a_script() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            let mut script = Vec::new();
            write_completions(shell, &mut command(), &mut script);
            let script = String::from_utf8(script).unwrap();
            assert!(script.contains("inspect"), "{shell}");
        }
    }
}
