//! Generated output containers.
//!
//! # Examples
//!
//! ```
//! use wasmbind_codegen::{GeneratedCode, GeneratedFile};
//!
//! let mut code = GeneratedCode::new();
//! code.add_file(GeneratedFile {
//!     path: "types.d.ts".to_string(),
//!     content: "declare module \"x\" {}\n".to_string(),
//! });
//! assert_eq!(code.file_count(), 1);
//! ```

use serde::Serialize;
use wasmbind_core::Diagnostic;

/// Result of one generation pass: files in emission order plus the
/// diagnostics raised while producing them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GeneratedCode {
    /// Generated files, paths relative to the target directory
    pub files: Vec<GeneratedFile>,
    /// Places where output was degraded instead of failing
    pub diagnostics: Vec<Diagnostic>,
}

impl GeneratedCode {
    /// Creates an empty container.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            files: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Appends a generated file.
    pub fn add_file(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }

    /// Returns the number of generated files.
    #[inline]
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Returns an iterator over the generated files.
    #[inline]
    pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter()
    }

    /// Looks up a file by its relative path.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// A single generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Relative path where the file should be written
    pub path: String,
    /// File content
    pub content: String,
}
