//! Go source parsing for wasmbind.
//!
//! Reads the Go files of a single directory and builds the declaration
//! model from them: struct types become records (with their `json` tags
//! decoded into field attributes), other type declarations are kept by kind,
//! and plain top-level functions become function declarations.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::Path;
//! use wasmbind_parser::{GoSourceParser, SourceParser};
//!
//! let packages = GoSourceParser::new().parse(Path::new("./mypkg"))?;
//! for package in &packages {
//!     println!("{}: {} functions", package.name(), package.functions().len());
//! }
//! # Ok::<(), wasmbind_core::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod lexer;
mod scanner;
mod tags;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wasmbind_core::{Error, FunctionDecl, Package, PackageName, Result, TypeDecl};

/// Marker opening every file wasmbind generates; such files are never parsed.
pub const GENERATED_MARKER: &str = "// Code generated by wasmbind";

/// Lexical or syntactic failure while scanning a single file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScanError {
    #[error("unterminated {what} starting on line {line}")]
    Unterminated { what: &'static str, line: usize },

    #[error("line {line}: expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("unexpected end of file, expected {expected}")]
    UnexpectedEof { expected: String },
}

/// Builds the declaration model from a source directory.
pub trait SourceParser {
    /// Parses every package found directly in `root`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParseError`] if the directory or one of its source
    /// files cannot be read or scanned.
    fn parse(&self, root: &Path) -> Result<Vec<Package>>;
}

/// Parser for a directory of Go source files.
///
/// Only the top level of the directory is read. `_test.go` files and files
/// previously generated by wasmbind are ignored. Files are read in name
/// order; packages are returned in the order they first appear.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoSourceParser;

impl GoSourceParser {
    /// Creates a parser.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn source_files(root: &Path) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(root).map_err(|e| Error::ParseError {
            path: root.to_path_buf(),
            message: "cannot read source directory".to_string(),
            source: Some(e),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::ParseError {
                path: root.to_path_buf(),
                message: "cannot list source directory".to_string(),
                source: Some(e),
            })?;
            let path = entry.path();
            let is_go = path.extension().is_some_and(|ext| ext == "go");
            let is_test = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with("_test.go"));
            if path.is_file() && is_go && !is_test {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl SourceParser for GoSourceParser {
    fn parse(&self, root: &Path) -> Result<Vec<Package>> {
        let mut grouped: Vec<(String, Vec<TypeDecl>, Vec<FunctionDecl>)> = Vec::new();

        for path in Self::source_files(root)? {
            let source = fs::read_to_string(&path).map_err(|e| Error::ParseError {
                path: path.clone(),
                message: "cannot read source file".to_string(),
                source: Some(e),
            })?;
            if source.starts_with(GENERATED_MARKER) {
                tracing::debug!("Ignoring generated file {}", path.display());
                continue;
            }

            let decls = scanner::scan_file(&source).map_err(|e| Error::ParseError {
                path: path.clone(),
                message: e.to_string(),
                source: None,
            })?;
            tracing::debug!(
                "Scanned {}: package {}, {} types, {} functions",
                path.display(),
                decls.package,
                decls.types.len(),
                decls.functions.len()
            );

            match grouped.iter_mut().find(|(name, _, _)| *name == decls.package) {
                Some((_, types, functions)) => {
                    types.extend(decls.types);
                    functions.extend(decls.functions);
                }
                None => grouped.push((decls.package, decls.types, decls.functions)),
            }
        }

        grouped
            .into_iter()
            .map(|(name, types, functions)| {
                Ok(Package::new(PackageName::new(name)?, types, functions))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_error_display() {
        let err = ScanError::Unexpected {
            expected: "'('".to_string(),
            found: "'}'".to_string(),
            line: 7,
        };
        assert_eq!(err.to_string(), "line 7: expected '(', found '}'");
    }

    #[test]
    fn test_missing_directory_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let err = GoSourceParser::new()
            .parse(&temp.path().join("missing"))
            .unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_source_files_filtering() {
        let temp = TempDir::new().unwrap();
        for name in ["b.go", "a.go", "a_test.go", "notes.txt"] {
            fs::write(temp.path().join(name), "package p\n").unwrap();
        }
        fs::create_dir(temp.path().join("sub.go")).unwrap();

        let files = GoSourceParser::source_files(temp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.go", "b.go"]);
    }
}
