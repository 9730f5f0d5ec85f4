//! Filesystem operations for wasmbind.
//!
//! Copies a project tree into a staging directory, writes generated files
//! to disk, and removes staging trees once a run is done.
//!
//! Exclusion is by substring: an entry is skipped when its path *relative
//! to the copy root* contains any exclusion. A skipped directory is pruned
//! along with everything under it.
//!
//! # Examples
//!
//! ```
//! use wasmbind_files::copy_tree;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let project = tempfile::tempdir()?;
//! std::fs::write(project.path().join("shop.go"), "package main\n")?;
//! std::fs::create_dir(project.path().join(".git"))?;
//! std::fs::write(project.path().join(".git/HEAD"), "ref\n")?;
//!
//! let staging = tempfile::tempdir()?;
//! let report = copy_tree(project.path(), staging.path(), &[".git".to_string()])?;
//! assert_eq!(report.files, vec![std::path::PathBuf::from("shop.go")]);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};
use wasmbind_codegen::GeneratedCode;

/// Errors from filesystem operations.
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// An I/O operation on `path` failed
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Directory traversal failed
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// A walked entry was not under the copy root
    #[error("path {path} is outside the copy root")]
    Prefix {
        /// Offending path
        path: PathBuf,
    },

    /// A generated file path would land outside its target directory
    #[error("generated path '{path}' must be relative and stay inside the target directory")]
    UnsafePath {
        /// Offending path
        path: String,
    },
}

impl FilesError {
    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for filesystem operations.
pub type Result<T> = std::result::Result<T, FilesError>;

/// Summary of a [`copy_tree`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Copied files, relative to the copy root, in traversal order
    pub files: Vec<PathBuf>,
    /// Total bytes copied
    pub bytes: u64,
}

impl CopyReport {
    /// Number of copied files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}

/// Returns `true` when `relative` contains any of `excludes`.
///
/// Empty exclusions never match.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use wasmbind_files::is_excluded;
///
/// let excludes = vec![".tmp".to_string(), "output".to_string()];
/// assert!(is_excluded(Path::new(".tmp/shop.go"), &excludes));
/// assert!(is_excluded(Path::new("web/output/lib.js"), &excludes));
/// assert!(!is_excluded(Path::new("shop.go"), &excludes));
/// ```
#[must_use]
pub fn is_excluded(relative: &Path, excludes: &[String]) -> bool {
    let relative = relative.to_string_lossy();
    excludes
        .iter()
        .filter(|exclude| !exclude.is_empty())
        .any(|exclude| relative.contains(exclude.as_str()))
}

/// Recursively copies `src` into `dest`, skipping excluded entries.
///
/// `dest` and any missing parents are created. Traversal is sorted by file
/// name so the report is deterministic. Symbolic links are followed only
/// when they point at regular files.
///
/// # Errors
///
/// Returns an error if `src` cannot be walked, or if any directory or file
/// cannot be created or copied.
pub fn copy_tree(src: &Path, dest: &Path, excludes: &[String]) -> Result<CopyReport> {
    fs::create_dir_all(dest).map_err(|e| FilesError::io(dest, e))?;

    let keep = |entry: &DirEntry| {
        !entry
            .path()
            .strip_prefix(src)
            .is_ok_and(|relative| is_excluded(relative, excludes))
    };

    let mut report = CopyReport::default();
    for entry in WalkDir::new(src)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(keep)
    {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|_| FilesError::Prefix {
                path: entry.path().to_path_buf(),
            })?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| FilesError::io(&target, e))?;
        } else if entry.file_type().is_file() || entry.path().is_file() {
            report.bytes += copy_file(entry.path(), &target)?;
            report.files.push(relative.to_path_buf());
        } else {
            tracing::debug!(path = %entry.path().display(), "Skipping non-regular entry");
        }
    }

    tracing::debug!(
        src = %src.display(),
        dest = %dest.display(),
        files = report.file_count(),
        bytes = report.bytes,
        "Copied tree"
    );
    Ok(report)
}

/// Copies a single file, creating the destination's parent directories.
///
/// Returns the number of bytes copied.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the copy
/// fails.
pub fn copy_file(src: &Path, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| FilesError::io(parent, e))?;
    }
    fs::copy(src, dest).map_err(|e| FilesError::io(src, e))
}

/// Writes every file in `code` under `dir`, overwriting existing files.
///
/// Returns the written paths in the order the files appear in `code`.
///
/// # Errors
///
/// Returns [`FilesError::UnsafePath`] for absolute paths or paths with `..`
/// components, and [`FilesError::Io`] if a directory or file cannot be
/// written.
pub fn write_generated(code: &GeneratedCode, dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(code.file_count());
    for file in code.files() {
        let relative = Path::new(&file.path);
        if !is_contained(relative) {
            return Err(FilesError::UnsafePath {
                path: file.path.clone(),
            });
        }

        let target = dir.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| FilesError::io(parent, e))?;
        }
        fs::write(&target, &file.content).map_err(|e| FilesError::io(&target, e))?;
        tracing::debug!(path = %target.display(), bytes = file.content.len(), "Wrote generated file");
        written.push(target);
    }
    Ok(written)
}

/// Removes `dir` and everything under it. A missing directory is not an
/// error.
///
/// # Errors
///
/// Returns an error if the directory exists but cannot be removed.
pub fn remove_tree(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            tracing::debug!(path = %dir.display(), "Removed tree");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FilesError::io(dir, e)),
    }
}

fn is_contained(relative: &Path) -> bool {
    relative.components().next().is_some()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
