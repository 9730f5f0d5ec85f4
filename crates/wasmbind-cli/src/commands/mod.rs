//! Command implementations for the wasmbind CLI.
//!
//! Each command loads what it needs, does its work, and reports through an
//! [`wasmbind_core::cli::ExitCode`] formatted according to the requested
//! output format.

pub mod common;
pub mod completions;
pub mod generate;
pub mod inspect;
