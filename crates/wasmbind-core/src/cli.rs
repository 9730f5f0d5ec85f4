//! CLI-specific types.
//!
//! # Examples
//!
//! ```
//! use wasmbind_core::cli::{ExitCode, OutputFormat};
//!
//! let format: OutputFormat = "json".parse().unwrap();
//! assert_eq!(format.as_str(), "json");
//!
//! assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
//! ```

use crate::Error;
use std::fmt;
use std::str::FromStr;

/// CLI output format for run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// JSON output for machine parsing
    Json,
    /// Plain text output for scripts
    Text,
    /// Colored output for human reading
    #[default]
    Pretty,
}

impl OutputFormat {
    /// Returns the string representation of the format.
    ///
    /// # Examples
    ///
    /// ```
    /// use wasmbind_core::cli::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Text.as_str(), "text");
    /// ```
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Text => "text",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "pretty" => Ok(Self::Pretty),
            _ => Err(Error::InvalidArgument(format!(
                "invalid output format: '{s}' (expected: json, text, or pretty)"
            ))),
        }
    }
}

/// Process exit code with semantic meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Successful run (exit code 0).
    pub const SUCCESS: Self = Self(0);

    /// General error (exit code 1).
    pub const ERROR: Self = Self(1);

    /// Invalid input, arguments or configuration (exit code 2).
    pub const INVALID_INPUT: Self = Self(2);

    /// Native compile or artifact placement failed (exit code 3).
    pub const COMPILE_ERROR: Self = Self(3);

    /// Compile step exceeded its deadline (exit code 4).
    pub const TIMEOUT: Self = Self(4);

    /// Creates an exit code from an integer value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        Self(code)
    }

    /// Returns the exit code as an integer.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Checks if the exit code represents success.
    ///
    /// # Examples
    ///
    /// ```
    /// use wasmbind_core::cli::ExitCode;
    ///
    /// assert!(ExitCode::SUCCESS.is_success());
    /// assert!(!ExitCode::COMPILE_ERROR.is_success());
    /// ```
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.0 == 0
    }

    /// Picks the exit code describing an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use wasmbind_core::cli::ExitCode;
    /// use wasmbind_core::Error;
    ///
    /// let err = Error::Timeout { operation: "go build".to_string(), duration_secs: 5 };
    /// assert_eq!(ExitCode::for_error(&err), ExitCode::TIMEOUT);
    /// ```
    #[must_use]
    pub const fn for_error(error: &Error) -> Self {
        if error.is_timeout() {
            Self::TIMEOUT
        } else if error.is_compile_error() || error.is_artifact_error() {
            Self::COMPILE_ERROR
        } else if error.is_config_error() {
            Self::INVALID_INPUT
        } else {
            Self::ERROR
        }
    }
}

impl Default for ExitCode {
    fn default() -> Self {
        Self::SUCCESS
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("pretty".parse::<OutputFormat>().unwrap(), OutputFormat::Pretty);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default(), OutputFormat::Pretty);
    }

    #[test]
    fn test_exit_code_for_errors() {
        let compile = Error::ExternalCompile {
            message: "boom".to_string(),
            status: Some(1),
            source: None,
        };
        assert_eq!(ExitCode::for_error(&compile), ExitCode::COMPILE_ERROR);

        let config = Error::ConfigError {
            message: "bad".to_string(),
        };
        assert_eq!(ExitCode::for_error(&config), ExitCode::INVALID_INPUT);

        let io = Error::DirectoryCreation {
            path: "x".into(),
            source: std::io::Error::other("nope"),
        };
        assert_eq!(ExitCode::for_error(&io), ExitCode::ERROR);
    }

    #[test]
    fn test_exit_code_conversions() {
        assert_eq!(i32::from(ExitCode::TIMEOUT), 4);
        assert_eq!(ExitCode::from_i32(3), ExitCode::COMPILE_ERROR);
        assert_eq!(ExitCode::default().to_string(), "0");
    }
}
