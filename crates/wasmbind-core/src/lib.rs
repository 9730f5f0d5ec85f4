//! Core types for wasmbind.
//!
//! This crate provides the foundation shared by every other crate in the
//! workspace:
//! - the read-only declaration model (`Package`, `TypeDecl`, `FunctionDecl`, `TypeRef`)
//! - the error taxonomy for fatal run failures
//! - non-fatal generation diagnostics
//! - run configuration
//! - CLI strong types (`cli::ExitCode`, `cli::OutputFormat`)

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod cli;
mod config;
mod diagnostics;
mod error;
mod model;

pub use config::{ArtifactNames, BindgenConfig, ToolchainConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use error::{BoxError, Error, Result};
pub use model::{
    ENTRY_POINT, Field, FieldAttributes, FunctionDecl, Package, PackageName, Param,
    PrimitiveKind, SourceImport, SourceType, TypeDecl, TypeKind, TypeRef,
};
