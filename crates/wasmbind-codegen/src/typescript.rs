//! Type mapping from the declaration model to TypeScript.
//!
//! Mapping is total: every [`TypeRef`] produces some TypeScript text. Types
//! that cannot be described precisely degrade to `any` and are reported as
//! diagnostics rather than failing generation.
//!
//! | Model type | TypeScript |
//! |---|---|
//! | string, char | `string` |
//! | bool | `boolean` |
//! | every integer and float width | `number` (lossy beyond 53 bits) |
//! | `Array(e)` | `e[]` |
//! | `Map(v)` | `Record<string, v>` |
//! | `Nullable(i)` | `i \| null` |
//! | `Named(n)`, `n` a known record | `n` |
//! | anything else | `any` |
//!
//! # Examples
//!
//! ```
//! use wasmbind_codegen::typescript::TypeMapper;
//! use wasmbind_core::{PrimitiveKind, TypeRef};
//!
//! let mapper = TypeMapper::new(["Product"]);
//! let ty = TypeRef::map(TypeRef::array(TypeRef::named("Product")));
//! assert_eq!(mapper.map(&ty), "Record<string, Product[]>");
//! assert_eq!(mapper.map(&TypeRef::Primitive(PrimitiveKind::Uint64)), "number");
//! ```

use std::collections::HashSet;
use wasmbind_core::{Diagnostic, DiagnosticKind, Field, Package, TypeRef};

/// Maps model types to TypeScript type text.
#[derive(Debug, Clone, Default)]
pub struct TypeMapper<'a> {
    records: HashSet<&'a str>,
}

impl<'a> TypeMapper<'a> {
    /// Creates a mapper that resolves the given record names.
    pub fn new(records: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Creates a mapper resolving every record declared by `packages`.
    #[must_use]
    pub fn for_packages(packages: &'a [Package]) -> Self {
        Self::new(packages.iter().flat_map(Package::records).map(|r| r.name()))
    }

    /// Returns `true` if `name` is a known record.
    #[must_use]
    pub fn is_record(&self, name: &str) -> bool {
        self.records.contains(name)
    }

    /// Maps a type, discarding any diagnostics.
    #[must_use]
    pub fn map(&self, ty: &TypeRef) -> String {
        self.render(ty, &mut |_: DiagnosticKind, _: String| {})
    }

    /// Maps a type, recording a diagnostic against `subject` for every part
    /// that degraded to `any`.
    pub fn map_reporting(
        &self,
        ty: &TypeRef,
        subject: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> String {
        self.render(ty, &mut |kind: DiagnosticKind, message: String| {
            diagnostics.push(Diagnostic::new(kind, subject, message));
        })
    }

    fn render(&self, ty: &TypeRef, report: &mut dyn FnMut(DiagnosticKind, String)) -> String {
        match ty {
            TypeRef::Primitive(kind) if kind.is_textual() => "string".to_string(),
            TypeRef::Primitive(kind) if kind.is_numeric() => "number".to_string(),
            TypeRef::Primitive(_) => "boolean".to_string(),
            TypeRef::Array(elem) => {
                let inner = self.render(elem, report);
                if inner.contains(" | ") {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            TypeRef::Map(value) => format!("Record<string, {}>", self.render(value, report)),
            TypeRef::Nullable(inner) => format!("{} | null", self.render(inner, report)),
            TypeRef::Named(name) if self.is_record(name) => name.clone(),
            TypeRef::Named(name) => {
                report(
                    DiagnosticKind::UnresolvedType,
                    format!("'{name}' is not a known record; mapped to any"),
                );
                "any".to_string()
            }
            TypeRef::Opaque => {
                report(
                    DiagnosticKind::OpaqueType,
                    "type cannot be described; mapped to any".to_string(),
                );
                "any".to_string()
            }
        }
    }
}

/// Public shape of a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldShape {
    /// Name the field has on the host side
    pub name: String,
    /// Field may be absent
    pub optional: bool,
    /// Field value may be `null`
    pub nullable: bool,
}

/// Resolves the public name, optionality and nullability of a field.
///
/// With an alias, the alias is the public name and the field is optional
/// exactly when it is omitted while empty. Without one, the declared name is
/// used and the field is always required. Nullability is independent of both.
///
/// # Examples
///
/// ```
/// use wasmbind_codegen::typescript::resolve_field;
/// use wasmbind_core::{Field, PrimitiveKind, TypeRef};
///
/// let price = Field::new("Price", TypeRef::Primitive(PrimitiveKind::Float64))
///     .with_alias("price")
///     .omit_if_empty();
/// let shape = resolve_field(&price);
/// assert_eq!(shape.name, "price");
/// assert!(shape.optional);
/// assert!(!shape.nullable);
/// ```
#[must_use]
pub fn resolve_field(field: &Field) -> FieldShape {
    let attributes = field.attributes();
    let (name, optional) = match &attributes.alias {
        Some(alias) => (alias.clone(), attributes.omit_if_empty),
        None => (field.name().to_string(), false),
    };
    FieldShape {
        name,
        optional,
        nullable: field.is_nullable(),
    }
}

const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "enum", "eval", "export", "extends", "false", "finally",
    "for", "function", "if", "implements", "import", "in", "instanceof", "interface", "let",
    "new", "null", "package", "private", "protected", "public", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Makes a name usable as a JavaScript binding by suffixing reserved words
/// with `_`.
///
/// # Examples
///
/// ```
/// use wasmbind_codegen::typescript::escape_identifier;
///
/// assert_eq!(escape_identifier("products"), "products");
/// assert_eq!(escape_identifier("new"), "new_");
/// ```
#[must_use]
pub fn escape_identifier(name: &str) -> String {
    if RESERVED_WORDS.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Renders a property key, quoting it when it is not a plain identifier.
///
/// # Examples
///
/// ```
/// use wasmbind_codegen::typescript::property_key;
///
/// assert_eq!(property_key("price"), "price");
/// assert_eq!(property_key("unit-price"), "\"unit-price\"");
/// ```
#[must_use]
pub fn property_key(name: &str) -> String {
    if is_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasmbind_core::PrimitiveKind;

    fn prim(kind: PrimitiveKind) -> TypeRef {
        TypeRef::Primitive(kind)
    }

    #[test]
    fn test_primitive_mapping() {
        let mapper = TypeMapper::default();
        assert_eq!(mapper.map(&prim(PrimitiveKind::String)), "string");
        assert_eq!(mapper.map(&prim(PrimitiveKind::Char)), "string");
        assert_eq!(mapper.map(&prim(PrimitiveKind::Bool)), "boolean");
        for kind in [
            PrimitiveKind::Int,
            PrimitiveKind::Int8,
            PrimitiveKind::Uint64,
            PrimitiveKind::Byte,
            PrimitiveKind::Rune,
            PrimitiveKind::Float32,
            PrimitiveKind::Float64,
        ] {
            assert_eq!(mapper.map(&prim(kind)), "number", "{kind:?}");
        }
    }

    #[test]
    fn test_composite_mapping() {
        let mapper = TypeMapper::new(["Product", "Category"]);
        assert_eq!(
            mapper.map(&TypeRef::array(TypeRef::named("Product"))),
            "Product[]"
        );
        assert_eq!(
            mapper.map(&TypeRef::nullable(TypeRef::named("Category"))),
            "Category | null"
        );
        assert_eq!(
            mapper.map(&TypeRef::array(TypeRef::nullable(TypeRef::named("Product")))),
            "(Product | null)[]"
        );
        assert_eq!(
            mapper.map(&TypeRef::map(TypeRef::nullable(prim(PrimitiveKind::Int)))),
            "Record<string, number | null>"
        );
        assert_eq!(
            mapper.map(&TypeRef::array(TypeRef::array(prim(PrimitiveKind::Bool)))),
            "boolean[][]"
        );
    }

    #[test]
    fn test_unresolved_types_degrade_with_diagnostics() {
        let mapper = TypeMapper::new(["Product"]);
        let mut diagnostics = Vec::new();
        let ty = TypeRef::map(TypeRef::named("time.Time"));
        assert_eq!(
            mapper.map_reporting(&ty, "Order.CreatedAt", &mut diagnostics),
            "Record<string, any>"
        );
        assert_eq!(
            mapper.map_reporting(&TypeRef::Opaque, "Run(callback)", &mut diagnostics),
            "any"
        );

        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::UnresolvedType);
        assert_eq!(diagnostics[0].subject, "Order.CreatedAt");
        assert!(diagnostics[0].message.contains("time.Time"));
        assert_eq!(diagnostics[1].kind, DiagnosticKind::OpaqueType);
    }

    #[test]
    fn test_mapping_is_deterministic() {
        let mapper = TypeMapper::new(["A", "B", "C"]);
        let ty = TypeRef::map(TypeRef::array(TypeRef::nullable(TypeRef::named("B"))));
        let first = mapper.map(&ty);
        for _ in 0..10 {
            assert_eq!(mapper.map(&ty), first);
        }
    }

    #[test]
    fn test_field_resolution() {
        let aliased = Field::new("ID", prim(PrimitiveKind::Int)).with_alias("id");
        assert_eq!(
            resolve_field(&aliased),
            FieldShape {
                name: "id".to_string(),
                optional: false,
                nullable: false
            }
        );

        // omit-if-empty without an alias does not make the field optional
        let bare = Field::new("Notes", prim(PrimitiveKind::String)).omit_if_empty();
        let shape = resolve_field(&bare);
        assert_eq!(shape.name, "Notes");
        assert!(!shape.optional);

        let pointer = Field::new("Category", TypeRef::nullable(TypeRef::named("Category")))
            .with_alias("category")
            .omit_if_empty();
        let shape = resolve_field(&pointer);
        assert!(shape.optional);
        assert!(shape.nullable);
    }

    #[test]
    fn test_identifier_helpers() {
        assert_eq!(escape_identifier("class"), "class_");
        assert_eq!(escape_identifier("Class"), "Class");
        assert_eq!(property_key("_id"), "_id");
        assert_eq!(property_key("$ref"), "$ref");
        assert_eq!(property_key("2fa"), "\"2fa\"");
        assert_eq!(property_key("a\"b"), "\"a\\\"b\"");
    }
}
