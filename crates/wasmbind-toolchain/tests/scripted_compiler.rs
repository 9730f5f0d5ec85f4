//! Drives `GoWasmToolchain` against a shell script standing in for `go`.
//!
//! Scenarios run sequentially in one test: writing an executable while
//! another test thread forks can make exec fail with "text file busy".

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wasmbind_core::{BindgenConfig, Error};
use wasmbind_toolchain::{GoWasmToolchain, Toolchain};

struct Fixture {
    _temp: TempDir,
    bin: PathBuf,
    goroot: PathBuf,
    output: PathBuf,
    staging: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let fixture = Self {
            bin: root.join("bin"),
            goroot: root.join("goroot"),
            output: root.join("project/output"),
            staging: root.join("project/.tmp"),
            _temp: temp,
        };
        for dir in [&fixture.bin, &fixture.goroot, &fixture.output, &fixture.staging] {
            fs::create_dir_all(dir).unwrap();
        }
        fixture
    }

    fn with_glue(&self, dir: &str, content: &str) {
        let path = self.goroot.join(dir);
        fs::create_dir_all(&path).unwrap();
        fs::write(path.join("wasm_exec.js"), content).unwrap();
    }

    /// Writes a fake compiler; `build` runs `build_body`, `env GOROOT`
    /// prints the fixture's goroot.
    fn compiler(&self, name: &str, build_body: &str) -> String {
        let script = format!(
            "#!/bin/sh\n\
             if [ \"$1\" = \"env\" ]; then\n  echo '{goroot}'\n  exit 0\nfi\n\
             {build_body}\n",
            goroot = self.goroot.display()
        );
        let path = self.bin.join(name);
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    fn toolchain(&self, compiler: String) -> GoWasmToolchain {
        let mut config = BindgenConfig::default();
        config.toolchain.compiler = compiler;
        GoWasmToolchain::new(&config)
    }

    fn clear_output(&self) {
        fs::remove_dir_all(&self.output).unwrap();
        fs::create_dir_all(&self.output).unwrap();
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_scripted_compiler_scenarios() {
    let fx = Fixture::new();
    fx.with_glue("misc/wasm", "// misc glue");

    // Successful build: env is set, binary written to cwd as the -o name
    let ok = fx.compiler(
        "go-ok",
        "[ \"$GOOS\" = js ] && [ \"$GOARCH\" = wasm ] || { echo 'wrong target' >&2; exit 9; }\n\
         echo \"wasm:$3\" > \"$3\"",
    );
    fx.toolchain(ok.clone()).compile(&fx.output, &fx.staging).unwrap();
    assert_eq!(read(&fx.output.join("main.wasm")).trim(), "wasm:main.wasm");
    assert_eq!(read(&fx.output.join("wasm_exec.js")), "// misc glue");

    // lib/wasm wins over misc/wasm once present
    fx.with_glue("lib/wasm", "// lib glue");
    fx.clear_output();
    fx.toolchain(ok.clone()).compile(&fx.output, &fx.staging).unwrap();
    assert_eq!(read(&fx.output.join("wasm_exec.js")), "// lib glue");

    // Compile failure carries stderr and status; nothing is placed
    fx.clear_output();
    let broken = fx.compiler("go-broken", "echo './shop.go:3:2: undefined: Foo' >&2\nexit 2");
    let err = fx
        .toolchain(broken)
        .compile(&fx.output, &fx.staging)
        .unwrap_err();
    match &err {
        Error::ExternalCompile {
            message, status, ..
        } => {
            assert!(message.contains("undefined: Foo"));
            assert_eq!(*status, Some(2));
        }
        other => panic!("expected ExternalCompile, got {other:?}"),
    }
    assert!(!fx.output.join("main.wasm").exists());

    // Build "succeeds" without producing the binary
    let silent = fx.compiler("go-silent", "exit 0");
    let err = fx
        .toolchain(silent)
        .compile(&fx.output, &fx.staging)
        .unwrap_err();
    assert!(matches!(err, Error::ArtifactCopy { .. }), "{err:?}");

    // Missing glue
    fs::remove_dir_all(&fx.goroot).unwrap();
    fs::create_dir_all(&fx.goroot).unwrap();
    let err = fx
        .toolchain(ok)
        .compile(&fx.output, &fx.staging)
        .unwrap_err();
    assert!(matches!(err, Error::GlueRetrieval { .. }), "{err:?}");

    // Deadline
    let slow = fx.compiler("go-slow", "exec sleep 10");
    let err = fx
        .toolchain(slow)
        .with_timeout(Some(Duration::from_secs(1)))
        .compile(&fx.output, &fx.staging)
        .unwrap_err();
    assert!(err.is_timeout(), "{err:?}");

    // Compiler not installed
    let err = fx
        .toolchain(fx.bin.join("go-missing").display().to_string())
        .compile(&fx.output, &fx.staging)
        .unwrap_err();
    assert!(err.is_compile_error(), "{err:?}");
}
