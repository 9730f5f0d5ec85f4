//! Staging copies and generated writes against real directories.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wasmbind_codegen::{GeneratedCode, GeneratedFile};
use wasmbind_files::{FilesError, copy_tree, remove_tree, write_generated};

fn default_excludes() -> Vec<String> {
    vec![".tmp".to_string(), "output".to_string(), ".git".to_string()]
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "go.mod", "module shop\n");
    write(root, "shop.go", "package main\n");
    write(root, "internal/tax/tax.go", "package tax\n");
    write(root, ".git/HEAD", "ref: refs/heads/main\n");
    write(root, "output/lib.js", "stale\n");
    write(root, ".tmp/wasmbind_main.go", "stale\n");
    temp
}

#[test]
fn test_copy_skips_excluded_entries() {
    let project = project();
    let staging = project.path().join(".tmp");

    let report = copy_tree(project.path(), &staging, &default_excludes()).unwrap();

    assert_eq!(
        report.files,
        vec![
            PathBuf::from("go.mod"),
            PathBuf::from("internal/tax/tax.go"),
            PathBuf::from("shop.go"),
        ]
    );
    for file in &report.files {
        let text = file.to_string_lossy();
        assert!(default_excludes().iter().all(|e| !text.contains(e.as_str())));
    }

    assert_eq!(
        fs::read_to_string(staging.join("internal/tax/tax.go")).unwrap(),
        "package tax\n"
    );
    assert!(!staging.join(".git").exists());
    assert!(!staging.join("output").exists());
    assert!(!staging.join(".tmp").exists());
}

#[test]
fn test_copy_into_own_subdirectory_terminates() {
    let project = project();
    let staging = project.path().join(".tmp");
    copy_tree(project.path(), &staging, &default_excludes()).unwrap();
    // Second run sees the populated staging dir but still prunes it
    let report = copy_tree(project.path(), &staging, &default_excludes()).unwrap();
    assert_eq!(report.file_count(), 3);
}

#[test]
fn test_exclusion_is_relative_to_root() {
    // Excluded substring appears only in the absolute path of the root
    let outer = TempDir::new().unwrap();
    let root = outer.path().join("output-project");
    write(&root, "shop.go", "package main\n");

    let staging = outer.path().join("staging");
    let report = copy_tree(&root, &staging, &default_excludes()).unwrap();
    assert_eq!(report.files, vec![PathBuf::from("shop.go")]);
}

#[test]
fn test_copy_missing_source_fails() {
    let temp = TempDir::new().unwrap();
    let err = copy_tree(&temp.path().join("missing"), &temp.path().join("dest"), &[]).unwrap_err();
    assert!(matches!(err, FilesError::Walk(_)));
}

#[test]
fn test_write_generated_overwrites() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("output");
    let mut code = GeneratedCode::new();
    code.add_file(GeneratedFile {
        path: "types.d.ts".to_string(),
        content: "first".to_string(),
    });

    write_generated(&code, &out).unwrap();
    code.files[0].content = "second".to_string();
    let written = write_generated(&code, &out).unwrap();

    assert_eq!(written, vec![out.join("types.d.ts")]);
    assert_eq!(fs::read_to_string(out.join("types.d.ts")).unwrap(), "second");
}

#[test]
fn test_write_generated_rejects_escaping_paths() {
    let temp = TempDir::new().unwrap();
    let mut code = GeneratedCode::new();
    code.add_file(GeneratedFile {
        path: "../lib.js".to_string(),
        content: String::new(),
    });

    let err = write_generated(&code, temp.path()).unwrap_err();
    assert!(matches!(err, FilesError::UnsafePath { .. }));
    assert!(!temp.path().parent().unwrap().join("lib.js").exists());
}

#[test]
fn test_remove_staging_after_copy() {
    let project = project();
    let staging = project.path().join(".tmp");
    copy_tree(project.path(), &staging, &default_excludes()).unwrap();
    remove_tree(&staging).unwrap();
    assert!(!staging.exists());
    assert!(project.path().join("shop.go").exists());
}
