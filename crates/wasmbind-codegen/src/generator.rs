//! Binding generation.
//!
//! [`TypeScriptGenerator`] turns parsed packages into two sets of files:
//!
//! - output files, shipped to the host: `types.d.ts` (declaration overlay),
//!   `lib.js` (runtime module) and `package.json`
//! - source files, compiled with the package: one Go wrapper file per
//!   package that marshals host calls into native calls
//!
//! Every pass walks declarations in model order, so identical input always
//! produces byte-identical output.
//!
//! # Examples
//!
//! ```
//! use wasmbind_codegen::{TargetGenerator, TypeScriptGenerator};
//! use wasmbind_core::{FunctionDecl, Package, PackageName, Param, PrimitiveKind, TypeRef};
//!
//! let add = FunctionDecl::new(
//!     "Add",
//!     vec![
//!         Param::new("a", TypeRef::Primitive(PrimitiveKind::Int)),
//!         Param::new("b", TypeRef::Primitive(PrimitiveKind::Int)),
//!     ],
//!     Some(TypeRef::Primitive(PrimitiveKind::Int)),
//! )?;
//! let packages = vec![Package::new(PackageName::new("main")?, vec![], vec![add])];
//!
//! let generator = TypeScriptGenerator::new()?;
//! let output = generator.generate_output_files(&packages)?;
//! let overlay = output.file("types.d.ts").unwrap();
//! assert!(overlay.content.contains("export function Add(a: number, b: number): number;"));
//! # Ok::<(), wasmbind_core::Error>(())
//! ```

use crate::golang::{ImportLine, ImportPlan, decode_type};
use crate::manifest::{MANIFEST_FILE, OVERLAY_FILE, PackageManifest, RUNTIME_FILE};
use crate::template_engine::{OVERLAY_TEMPLATE, RUNTIME_TEMPLATE, TemplateEngine, WRAPPER_TEMPLATE};
use crate::types::{GeneratedCode, GeneratedFile};
use crate::typescript::{TypeMapper, escape_identifier, property_key, resolve_field};
use serde::Serialize;
use wasmbind_core::{
    BindgenConfig, Diagnostic, DiagnosticKind, ENTRY_POINT, FunctionDecl, Package, Result,
    TypeDecl,
};

/// A target language binding generator.
///
/// The pipeline drives a generator in two passes: output files go into the
/// namespace directory under the output root, source files go into the
/// staging copy of the input before compilation.
pub trait TargetGenerator {
    /// Name of the output subdirectory for this target.
    fn namespace(&self) -> &str;

    /// Generates the files shipped to the host.
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to render or the manifest cannot
    /// be serialized.
    fn generate_output_files(&self, packages: &[Package]) -> Result<GeneratedCode>;

    /// Generates the wrapper sources compiled together with the packages.
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to render.
    fn generate_source_files(&self, packages: &[Package]) -> Result<GeneratedCode>;
}

/// Settings that end up inside generated files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Module specifier of the overlay and manifest
    pub module_name: String,
    /// Manifest version
    pub module_version: String,
    /// File name of the compiled binary
    pub wasm_binary: String,
    /// File name of the host glue script
    pub glue_script: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self::from(&BindgenConfig::default())
    }
}

impl From<&BindgenConfig> for GeneratorOptions {
    fn from(config: &BindgenConfig) -> Self {
        Self {
            module_name: config.module_name.clone(),
            module_version: config.module_version.clone(),
            wasm_binary: config.artifacts.wasm.clone(),
            glue_script: config.artifacts.glue.clone(),
        }
    }
}

/// Generator for TypeScript bindings over a Go WebAssembly module.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`; it holds no per-run state, every
/// generation call builds its own buffers.
#[derive(Debug)]
pub struct TypeScriptGenerator<'a> {
    engine: TemplateEngine<'a>,
    options: GeneratorOptions,
}

impl TypeScriptGenerator<'_> {
    /// Namespace of the TypeScript target.
    pub const NAMESPACE: &'static str = "ts";

    /// Creates a generator with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if template registration fails.
    pub fn new() -> Result<Self> {
        Self::with_options(GeneratorOptions::default())
    }

    /// Creates a generator with the given options.
    ///
    /// # Errors
    ///
    /// Returns an error if template registration fails.
    pub fn with_options(options: GeneratorOptions) -> Result<Self> {
        let engine = TemplateEngine::new()?;
        Ok(Self { engine, options })
    }

    /// Options baked into generated files.
    #[must_use]
    pub const fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Renders only the declaration overlay, without touching anything else.
    ///
    /// # Errors
    ///
    /// Returns an error if the overlay template fails to render.
    pub fn render_overlay(&self, packages: &[Package]) -> Result<(String, Vec<Diagnostic>)> {
        let mut diagnostics = Vec::new();
        let declarations = self.declarations(packages, &mut diagnostics);
        let overlay = self.engine.render(
            OVERLAY_TEMPLATE,
            &OverlayContext {
                module_name: &self.options.module_name,
                packages: &declarations,
            },
        )?;
        Ok((overlay, diagnostics))
    }

    fn declarations(&self, packages: &[Package], diagnostics: &mut Vec<Diagnostic>) -> Vec<PackageDeclarations> {
        let mapper = TypeMapper::for_packages(packages);

        packages
            .iter()
            .map(|package| {
                tracing::debug!("Generating declarations for package {}", package.name());

                let interfaces = package
                    .types()
                    .iter()
                    .filter_map(|decl| interface_context(&mapper, decl, diagnostics))
                    .collect();

                let functions = package
                    .functions()
                    .iter()
                    .filter(|function| {
                        if function.is_entry_point() {
                            tracing::debug!("Leaving {ENTRY_POINT} out of the bindings");
                        }
                        !function.is_entry_point()
                    })
                    .map(|function| signature_context(&mapper, function, diagnostics))
                    .collect();

                PackageDeclarations {
                    interfaces,
                    functions,
                }
            })
            .collect()
    }
}

impl TargetGenerator for TypeScriptGenerator<'_> {
    fn namespace(&self) -> &str {
        Self::NAMESPACE
    }

    fn generate_output_files(&self, packages: &[Package]) -> Result<GeneratedCode> {
        tracing::info!(
            "Generating TypeScript bindings for {} package(s) as {}",
            packages.len(),
            self.options.module_name
        );

        let mut code = GeneratedCode::new();

        let (overlay, diagnostics) = self.render_overlay(packages)?;
        code.diagnostics = diagnostics;
        code.add_file(GeneratedFile {
            path: OVERLAY_FILE.to_string(),
            content: overlay,
        });

        let runtime_functions: Vec<RuntimeFunction> = packages
            .iter()
            .flat_map(Package::bindable_functions)
            .map(|function| RuntimeFunction {
                name: escape_identifier(function.name()),
                native_name: function.name().to_string(),
                args: function
                    .params()
                    .iter()
                    .map(|p| escape_identifier(p.name()))
                    .collect::<Vec<_>>()
                    .join(", "),
            })
            .collect();
        let blocking_entry_points: Vec<&str> = packages
            .iter()
            .filter(|package| package.declares_entry_point())
            .map(|package| package.name().as_str())
            .collect();
        let runtime = self.engine.render(
            RUNTIME_TEMPLATE,
            &RuntimeContext {
                wasm_binary: &self.options.wasm_binary,
                glue_script: &self.options.glue_script,
                functions: &runtime_functions,
                blocking_entry_points: &blocking_entry_points,
            },
        )?;
        code.add_file(GeneratedFile {
            path: RUNTIME_FILE.to_string(),
            content: runtime,
        });

        let manifest = PackageManifest::new(
            &self.options.module_name,
            &self.options.module_version,
            &self.options.wasm_binary,
            &self.options.glue_script,
        );
        code.add_file(GeneratedFile {
            path: MANIFEST_FILE.to_string(),
            content: manifest.to_json()?,
        });

        for diagnostic in &code.diagnostics {
            tracing::warn!("{diagnostic}");
        }
        tracing::info!(
            "Generated {} output files ({} exported functions)",
            code.file_count(),
            runtime_functions.len()
        );

        Ok(code)
    }

    fn generate_source_files(&self, packages: &[Package]) -> Result<GeneratedCode> {
        let mut code = GeneratedCode::new();

        for package in packages {
            tracing::debug!("Generating function wrappers for package {}", package.name());

            let mut plan = ImportPlan::default();
            let wrappers: Vec<WrapperContext> = package
                .bindable_functions()
                .map(|function| wrapper_context(function, &mut plan))
                .collect();
            let imports = plan.into_lines();

            // A package with its own entry point keeps it; registration moves to init.
            let user_entry_point = package.declares_entry_point();
            if user_entry_point {
                code.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::ReservedEntryPoint,
                    package.name().as_str(),
                    format!(
                        "package declares {ENTRY_POINT}; bindings are registered from init and {ENTRY_POINT} must block (for example with select {{}}) or the bindings stop answering once it returns"
                    ),
                ));
            }

            let content = self.engine.render(
                WRAPPER_TEMPLATE,
                &WrapperFileContext {
                    package: package.name().as_str(),
                    imports: &imports,
                    wrappers: &wrappers,
                    entry: if user_entry_point { "init" } else { ENTRY_POINT },
                    block: !user_entry_point,
                },
            )?;

            code.add_file(GeneratedFile {
                path: wrapper_file_name(package),
                content,
            });
        }

        for diagnostic in &code.diagnostics {
            tracing::warn!("{diagnostic}");
        }
        tracing::info!("Generated {} wrapper file(s)", code.file_count());

        Ok(code)
    }
}

/// File name of the generated wrapper for a package.
#[must_use]
pub fn wrapper_file_name(package: &Package) -> String {
    format!("wasmbind_{}.go", package.name())
}

fn interface_context(
    mapper: &TypeMapper<'_>,
    decl: &TypeDecl,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<InterfaceContext> {
    if !decl.is_record() {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::SkippedType,
            decl.name(),
            format!("{} is not a record; no interface emitted", decl.kind()),
        ));
        return None;
    }

    let fields = decl
        .fields()
        .iter()
        .map(|field| {
            let shape = resolve_field(field);
            let subject = format!("{}.{}", decl.name(), field.name());
            FieldContext {
                name: property_key(&shape.name),
                optional: shape.optional,
                ts_type: mapper.map_reporting(field.ty(), &subject, diagnostics),
            }
        })
        .collect();

    Some(InterfaceContext {
        name: decl.name().to_string(),
        fields,
    })
}

fn signature_context(
    mapper: &TypeMapper<'_>,
    function: &FunctionDecl,
    diagnostics: &mut Vec<Diagnostic>,
) -> SignatureContext {
    let params = function
        .params()
        .iter()
        .map(|param| {
            let subject = format!("{}({})", function.name(), param.name());
            format!(
                "{}: {}",
                escape_identifier(param.name()),
                mapper.map_reporting(param.ty(), &subject, diagnostics)
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    let return_type = function.result().map_or_else(
        || "void".to_string(),
        |result| {
            let subject = format!("{}() result", function.name());
            mapper.map_reporting(result, &subject, diagnostics)
        },
    );

    SignatureContext {
        name: escape_identifier(function.name()),
        params,
        return_type,
    }
}

fn wrapper_context(function: &FunctionDecl, plan: &mut ImportPlan) -> WrapperContext {
    let params: Vec<DecodeContext> = function
        .params()
        .iter()
        .enumerate()
        .map(|(index, param)| DecodeContext {
            var: format!("param{index}"),
            go_type: decode_type(param, plan),
            index,
        })
        .collect();

    let call_args = function
        .params()
        .iter()
        .zip(&params)
        .map(|(param, decoded)| {
            if param.is_variadic() {
                format!("{}...", decoded.var)
            } else {
                decoded.var.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    WrapperContext {
        name: function.name().to_string(),
        wrapper_name: format!("{}Wrapper", function.name()),
        arity: params.len(),
        params,
        has_result: function.result().is_some(),
        call_args,
    }
}

#[derive(Debug, Serialize)]
struct OverlayContext<'a> {
    module_name: &'a str,
    packages: &'a [PackageDeclarations],
}

#[derive(Debug, Serialize)]
struct PackageDeclarations {
    interfaces: Vec<InterfaceContext>,
    functions: Vec<SignatureContext>,
}

#[derive(Debug, Serialize)]
struct InterfaceContext {
    name: String,
    fields: Vec<FieldContext>,
}

#[derive(Debug, Serialize)]
struct FieldContext {
    name: String,
    optional: bool,
    ts_type: String,
}

#[derive(Debug, Serialize)]
struct SignatureContext {
    name: String,
    params: String,
    return_type: String,
}

#[derive(Debug, Serialize)]
struct RuntimeContext<'a> {
    wasm_binary: &'a str,
    glue_script: &'a str,
    functions: &'a [RuntimeFunction],
    blocking_entry_points: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct RuntimeFunction {
    name: String,
    native_name: String,
    args: String,
}

#[derive(Debug, Serialize)]
struct WrapperFileContext<'a> {
    package: &'a str,
    imports: &'a [ImportLine],
    wrappers: &'a [WrapperContext],
    entry: &'a str,
    block: bool,
}

#[derive(Debug, Serialize)]
struct WrapperContext {
    name: String,
    wrapper_name: String,
    arity: usize,
    params: Vec<DecodeContext>,
    has_result: bool,
    call_args: String,
}

#[derive(Debug, Serialize)]
struct DecodeContext {
    var: String,
    go_type: String,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasmbind_core::{Field, PackageName, Param, PrimitiveKind, TypeKind, TypeRef};

    fn package(name: &str, types: Vec<TypeDecl>, functions: Vec<FunctionDecl>) -> Package {
        Package::new(PackageName::new(name).unwrap(), types, functions)
    }

    fn int() -> TypeRef {
        TypeRef::Primitive(PrimitiveKind::Int)
    }

    #[test]
    fn test_namespace() {
        let generator = TypeScriptGenerator::new().unwrap();
        assert_eq!(generator.namespace(), "ts");
    }

    #[test]
    fn test_output_files_in_fixed_order() {
        let generator = TypeScriptGenerator::new().unwrap();
        let code = generator.generate_output_files(&[]).unwrap();
        let paths: Vec<_> = code.files().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["types.d.ts", "lib.js", "package.json"]);
        assert!(code.diagnostics.is_empty());
    }

    #[test]
    fn test_non_records_are_skipped_with_diagnostic() {
        let generator = TypeScriptGenerator::new().unwrap();
        let packages = vec![package(
            "main",
            vec![
                TypeDecl::other("Shape", TypeKind::Interface).unwrap(),
                TypeDecl::record("Point", vec![Field::new("X", int())]).unwrap(),
            ],
            vec![],
        )];
        let (overlay, diagnostics) = generator.render_overlay(&packages).unwrap();
        assert!(overlay.contains("export interface Point {"));
        assert!(!overlay.contains("Shape"));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::SkippedType);
        assert_eq!(diagnostics[0].subject, "Shape");
    }

    #[test]
    fn test_reserved_names_are_escaped_in_js_only() {
        let generator = TypeScriptGenerator::new().unwrap();
        let function = FunctionDecl::new(
            "delete",
            vec![Param::new("new", int())],
            None,
        )
        .unwrap();
        let packages = vec![package("main", vec![], vec![function])];

        let output = generator.generate_output_files(&packages).unwrap();
        let overlay = &output.file("types.d.ts").unwrap().content;
        let runtime = &output.file("lib.js").unwrap().content;
        assert!(overlay.contains("export function delete_(new_: number): void;"));
        assert!(runtime.contains("export function delete_(new_) {"));
        assert!(runtime.contains("global.delete(new_);"));

        let sources = generator.generate_source_files(&packages).unwrap();
        let wrapper = &sources.files[0].content;
        assert!(wrapper.contains("js.Global().Set(\"delete\", js.FuncOf(deleteWrapper))"));
    }

    #[test]
    fn test_variadic_call_spreads_last_argument() {
        let function = FunctionDecl::new(
            "Join",
            vec![
                Param::new("sep", TypeRef::Primitive(PrimitiveKind::String)),
                Param::variadic("parts", TypeRef::array(TypeRef::Primitive(PrimitiveKind::String))),
            ],
            Some(TypeRef::Primitive(PrimitiveKind::String)),
        )
        .unwrap();
        let context = wrapper_context(&function, &mut ImportPlan::default());
        assert_eq!(context.call_args, "param0, param1...");
        assert_eq!(context.params[1].go_type, "[]string");
        assert_eq!(context.arity, 2);
    }

    #[test]
    fn test_wrapper_file_name() {
        let pkg = package("shop", vec![], vec![]);
        assert_eq!(wrapper_file_name(&pkg), "wasmbind_shop.go");
    }

    #[test]
    fn test_options_from_config() {
        let mut config = BindgenConfig::default();
        config.module_name = "@shop/cart".to_string();
        config.artifacts.wasm = "cart.wasm".to_string();
        let options = GeneratorOptions::from(&config);
        assert_eq!(options.module_name, "@shop/cart");
        assert_eq!(options.wasm_binary, "cart.wasm");
        assert_eq!(options.glue_script, "wasm_exec.js");

        let generator = TypeScriptGenerator::with_options(options).unwrap();
        let output = generator.generate_output_files(&[]).unwrap();
        assert!(output.file("types.d.ts").unwrap().content.contains("declare module \"@shop/cart\" {"));
        assert!(output.file("lib.js").unwrap().content.contains("'cart.wasm'"));
    }
}
