//! Full runs over temporary projects with the toolchain mocked out.

use mockall::mock;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wasmbind_codegen::TypeScriptGenerator;
use wasmbind_core::{BindgenConfig, DiagnosticKind, Error, Package};
use wasmbind_parser::{GoSourceParser, SourceParser};
use wasmbind_pipeline::{Pipeline, Stage};
use wasmbind_toolchain::Toolchain;

mock! {
    pub Compiler {}
    impl Toolchain for Compiler {
        fn compile(&self, output_dir: &Path, staging_dir: &Path) -> wasmbind_core::Result<()>;
    }
}

mock! {
    pub Parser {}
    impl SourceParser for Parser {
        fn parse(&self, root: &Path) -> wasmbind_core::Result<Vec<Package>>;
    }
}

const SHOP: &str = r#"package main

type Category struct {
	ID   int    `json:"id"`
	Name string `json:"name"`
}

type Product struct {
	ID       int       `json:"id"`
	Name     string    `json:"name"`
	Price    float64   `json:"price,omitempty"`
	Category *Category `json:"category"`
}

func GetSubtotal(products []Product) float64 {
	total := 0.0
	for _, p := range products {
		total += p.Price
	}
	return total
}
"#;

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::write(root.join("go.mod"), "module shop\n\ngo 1.22\n").unwrap();
    fs::write(root.join("shop.go"), SHOP).unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join(".git/HEAD"), "ref: refs/heads/main\n").unwrap();
    temp
}

/// A compiler that places fake artifacts like the real one.
fn placing_compiler() -> MockCompiler {
    let mut compiler = MockCompiler::new();
    compiler.expect_compile().times(1).returning(|output, _| {
        fs::write(output.join("main.wasm"), b"\0asm").unwrap();
        fs::write(output.join("wasm_exec.js"), "// glue").unwrap();
        Ok(())
    });
    compiler
}

fn pipeline<T: Toolchain>(
    root: &Path,
    config: BindgenConfig,
    toolchain: T,
) -> Pipeline<GoSourceParser, TypeScriptGenerator<'static>, T> {
    Pipeline::new(
        root,
        config,
        GoSourceParser::new(),
        TypeScriptGenerator::new().unwrap(),
        toolchain,
    )
}

#[test]
fn test_successful_run() {
    let project = project();
    let root = project.path();
    let mut compiler = MockCompiler::new();
    compiler
        .expect_compile()
        .times(1)
        .returning(|output, staging| {
            assert!(output.ends_with("output/ts"));
            assert!(output.join("types.d.ts").is_file());
            assert!(staging.join("shop.go").is_file());
            assert!(staging.join("go.mod").is_file());
            assert!(staging.join("wasmbind_main.go").is_file());
            assert!(!staging.join(".git").exists());
            assert!(!staging.join("output").exists());
            fs::write(output.join("main.wasm"), b"\0asm").unwrap();
            fs::write(output.join("wasm_exec.js"), "// glue").unwrap();
            Ok(())
        });

    let mut pipeline = pipeline(root, BindgenConfig::default(), compiler);
    assert_eq!(pipeline.stage(), Stage::Init);
    let report = pipeline.run().unwrap();

    assert_eq!(pipeline.stage(), Stage::CleanedUp);
    assert_eq!(report.packages, 1);
    assert_eq!(report.output_dir, root.join("output/ts"));
    assert_eq!(report.written.len(), 3);
    assert_eq!(report.staged, 2);
    assert_eq!(report.wrappers, vec![root.join(".tmp/wasmbind_main.go")]);
    assert!(report.cleaned_up);
    assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
    assert!(!root.join(".tmp").exists());

    let out = root.join("output/ts");
    for file in ["types.d.ts", "lib.js", "package.json", "main.wasm", "wasm_exec.js"] {
        assert!(out.join(file).is_file(), "missing {file}");
    }
    let overlay = fs::read_to_string(out.join("types.d.ts")).unwrap();
    assert!(overlay.contains("GetSubtotal(products: Product[]): number;"));
    assert!(overlay.contains("price?: number;"));
    assert!(overlay.contains("category: Category | null;"));
    // Generated wrappers never reach the output
    assert!(!out.join("wasmbind_main.go").exists());
}

#[test]
fn test_compile_failure_leaves_staging() {
    let project = project();
    let root = project.path();
    let mut compiler = MockCompiler::new();
    compiler.expect_compile().times(1).returning(|_, _| {
        Err(Error::ExternalCompile {
            message: "undefined: Foo".to_string(),
            status: Some(2),
            source: None,
        })
    });

    let mut pipeline = pipeline(root, BindgenConfig::default(), compiler);
    let err = pipeline.run().unwrap_err();

    assert_eq!(err.stage, Stage::Compiled);
    assert!(err.error().is_compile_error());
    assert_eq!(pipeline.stage(), Stage::Failed);
    assert!(root.join(".tmp/wasmbind_main.go").is_file());
    assert!(root.join("output/ts/types.d.ts").is_file());
}

#[test]
fn test_keep_staging() {
    let project = project();
    let root = project.path();
    let config = BindgenConfig {
        keep_staging: true,
        ..BindgenConfig::default()
    };

    let report = pipeline(root, config, placing_compiler()).run().unwrap();
    assert!(!report.cleaned_up);
    assert!(root.join(".tmp/wasmbind_main.go").is_file());
}

#[test]
fn test_cleanup_failure_after_successful_compile() {
    let project = project();
    let root = project.path();
    let mut compiler = MockCompiler::new();
    compiler.expect_compile().times(1).returning(|output, staging| {
        fs::write(output.join("main.wasm"), b"\0asm").unwrap();
        fs::write(output.join("wasm_exec.js"), "// glue").unwrap();
        // A plain file where the staging directory was cannot be removed as a tree
        fs::remove_dir_all(staging).unwrap();
        fs::write(staging, "not a directory").unwrap();
        Ok(())
    });

    let mut pipeline = pipeline(root, BindgenConfig::default(), compiler);
    let report = pipeline.run().unwrap();

    assert!(!report.cleaned_up);
    assert_eq!(pipeline.stage(), Stage::CleanedUp);
    assert!(root.join(".tmp").is_file());
    assert!(root.join("output/ts/main.wasm").is_file());
}

#[test]
fn test_stale_staging_is_replaced() {
    let project = project();
    let root = project.path();
    fs::create_dir_all(root.join(".tmp")).unwrap();
    fs::write(root.join(".tmp/removed.go"), "package main\n").unwrap();

    let mut compiler = MockCompiler::new();
    compiler.expect_compile().times(1).returning(|_, staging| {
        assert!(!staging.join("removed.go").exists());
        Ok(())
    });
    pipeline(root, BindgenConfig::default(), compiler).run().unwrap();
}

#[test]
fn test_parse_failure_is_not_fatal() {
    let project = project();
    let root = project.path();
    let mut parser = MockParser::new();
    parser.expect_parse().times(1).returning(|root| {
        Err(Error::ParseError {
            path: root.join("shop.go"),
            message: "line 1: expected package".to_string(),
            source: None,
        })
    });

    let mut pipeline = Pipeline::new(
        root,
        BindgenConfig::default(),
        parser,
        TypeScriptGenerator::new().unwrap(),
        placing_compiler(),
    );
    let report = pipeline.run().unwrap();

    assert_eq!(report.packages, 0);
    assert!(report.wrappers.is_empty());
    let overlay = fs::read_to_string(root.join("output/ts/types.d.ts")).unwrap();
    assert!(overlay.contains("goBootstrap(): Promise<void>;"));
}

#[test]
fn test_output_dir_failure_stops_early() {
    let project = project();
    let root = project.path();
    // A file where the output root should be
    fs::write(root.join("output"), "not a directory").unwrap();

    let mut compiler = MockCompiler::new();
    compiler.expect_compile().never();

    let mut pipeline = pipeline(root, BindgenConfig::default(), compiler);
    let err = pipeline.run().unwrap_err();
    assert_eq!(err.stage, Stage::OutputReady);
    assert!(matches!(err.error(), Error::DirectoryCreation { .. }));
    assert!(!root.join(".tmp").exists());
}

#[test]
fn test_runs_are_reproducible() {
    let project = project();
    let root = project.path();
    let read = |name: &str| fs::read(root.join("output/ts").join(name)).unwrap();

    pipeline(root, BindgenConfig::default(), placing_compiler()).run().unwrap();
    let first = (read("types.d.ts"), read("lib.js"), read("package.json"));

    pipeline(root, BindgenConfig::default(), placing_compiler()).run().unwrap();
    let second = (read("types.d.ts"), read("lib.js"), read("package.json"));
    assert_eq!(first, second);
}

#[test]
fn test_reserved_entry_point_is_reported() {
    let project = project();
    let root = project.path();
    fs::write(root.join("main.go"), "package main\n\nfunc main() {}\n").unwrap();

    let report = pipeline(root, BindgenConfig::default(), placing_compiler())
        .run()
        .unwrap();
    let kinds: Vec<_> = report.diagnostics.iter().map(|d| d.kind).collect();
    assert_eq!(kinds, vec![DiagnosticKind::ReservedEntryPoint]);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["packages"], 1);
    assert_eq!(json["cleaned_up"], true);
}

#[test]
fn test_custom_directory_names() {
    let project = project();
    let root = project.path();
    let config = BindgenConfig {
        output_root: "dist".to_string(),
        staging_dir: "build-tmp".to_string(),
        ..BindgenConfig::default()
    };

    let mut compiler = MockCompiler::new();
    compiler.expect_compile().times(1).returning(|output, staging| {
        assert!(output.ends_with("dist/ts"));
        assert!(staging.ends_with("build-tmp"));
        assert!(!staging.join("build-tmp").exists());
        Ok(())
    });
    let report = pipeline(root, config, compiler).run().unwrap();
    assert!(report.written.iter().all(|p| p.starts_with(root.join("dist/ts"))));
}
