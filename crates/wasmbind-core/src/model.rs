//! Declaration model.
//!
//! The model is the parsed, read-only description of a source package: its
//! record types and its functions. It is built once per run by a source
//! parser and consumed by the binding generator, which only ever borrows it.
//!
//! Constructors validate the model invariants (non-empty package name, unique
//! field and parameter names), so a value that exists is well formed.
//!
//! # Examples
//!
//! ```
//! use wasmbind_core::{Field, FunctionDecl, Package, PackageName, Param, PrimitiveKind, TypeDecl, TypeRef};
//!
//! let category = TypeDecl::record(
//!     "Category",
//!     vec![
//!         Field::new("ID", TypeRef::Primitive(PrimitiveKind::Int)).with_alias("id"),
//!         Field::new("Name", TypeRef::Primitive(PrimitiveKind::String)).with_alias("name"),
//!     ],
//! )?;
//!
//! let count = FunctionDecl::new(
//!     "Count",
//!     vec![Param::new("items", TypeRef::array(TypeRef::named("Category")))],
//!     Some(TypeRef::Primitive(PrimitiveKind::Int)),
//! )?;
//!
//! let package = Package::new(PackageName::new("main")?, vec![category], vec![count]);
//! assert_eq!(package.types().len(), 1);
//! assert_eq!(package.functions()[0].name(), "Count");
//! # Ok::<(), wasmbind_core::Error>(())
//! ```

use crate::{Error, Result};
use std::collections::HashSet;
use std::fmt;

/// Name of the function reserved as the program entry point.
pub const ENTRY_POINT: &str = "main";

/// Validated, non-empty package name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PackageName(String);

impl PackageName {
    /// Creates a package name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the name is empty or contains
    /// whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use wasmbind_core::PackageName;
    ///
    /// assert!(PackageName::new("main").is_ok());
    /// assert!(PackageName::new("").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidArgument(
                "package name cannot be empty".to_string(),
            ));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidArgument(format!(
                "package name '{name}' contains whitespace"
            )));
        }
        Ok(Self(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Primitive scalar kinds of the source language.
///
/// All integer and floating point widths collapse to a single host number
/// type. Widths beyond 53 bits of mantissa are not exactly representable on
/// the host; that loss is accepted, not corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// UTF-8 string
    String,
    /// Single character
    Char,
    /// Boolean
    Bool,
    /// Platform-sized signed integer
    Int,
    /// 8-bit signed integer
    Int8,
    /// 16-bit signed integer
    Int16,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// Platform-sized unsigned integer
    Uint,
    /// 8-bit unsigned integer
    Uint8,
    /// 16-bit unsigned integer
    Uint16,
    /// 32-bit unsigned integer
    Uint32,
    /// 64-bit unsigned integer
    Uint64,
    /// Pointer-sized unsigned integer
    Uintptr,
    /// Alias of `Uint8`
    Byte,
    /// Alias of `Int32`, a Unicode code point
    Rune,
    /// 32-bit float
    Float32,
    /// 64-bit float
    Float64,
}

impl PrimitiveKind {
    /// Looks up a primitive kind by its source spelling.
    ///
    /// # Examples
    ///
    /// ```
    /// use wasmbind_core::PrimitiveKind;
    ///
    /// assert_eq!(PrimitiveKind::from_source_name("float64"), Some(PrimitiveKind::Float64));
    /// assert_eq!(PrimitiveKind::from_source_name("Product"), None);
    /// ```
    #[must_use]
    pub fn from_source_name(name: &str) -> Option<Self> {
        let kind = match name {
            "string" => Self::String,
            "char" => Self::Char,
            "bool" => Self::Bool,
            "int" => Self::Int,
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint" => Self::Uint,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            "uintptr" => Self::Uintptr,
            "byte" => Self::Byte,
            "rune" => Self::Rune,
            "float32" | "float" => Self::Float32,
            "float64" => Self::Float64,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns the source spelling of this kind.
    #[must_use]
    pub const fn source_name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Char => "char",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint => "uint",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Uintptr => "uintptr",
            Self::Byte => "byte",
            Self::Rune => "rune",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Returns `true` for textual kinds (`String`, `Char`).
    #[must_use]
    pub const fn is_textual(self) -> bool {
        matches!(self, Self::String | Self::Char)
    }

    /// Returns `true` for every integer and float width.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        !self.is_textual() && !matches!(self, Self::Bool)
    }
}

/// Reference to a type, as written in a field or signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Built-in scalar
    Primitive(PrimitiveKind),
    /// Ordered sequence of elements
    Array(Box<TypeRef>),
    /// String-keyed map; the declared key type is not modeled
    Map(Box<TypeRef>),
    /// Indirect reference that may be absent
    Nullable(Box<TypeRef>),
    /// Reference to a declared type by name (possibly package-qualified)
    Named(String),
    /// Anything the model cannot describe
    Opaque,
}

impl TypeRef {
    /// Creates an array of `elem`.
    #[must_use]
    pub fn array(elem: Self) -> Self {
        Self::Array(Box::new(elem))
    }

    /// Creates a string-keyed map of `value`.
    #[must_use]
    pub fn map(value: Self) -> Self {
        Self::Map(Box::new(value))
    }

    /// Creates a nullable reference to `inner`.
    #[must_use]
    pub fn nullable(inner: Self) -> Self {
        Self::Nullable(Box::new(inner))
    }

    /// Creates a reference to a named type.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns `true` if the outermost layer is a nullable reference.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }
}

/// Serialization attributes attached to a field.
///
/// Populated once when the model is built (for Go, from the `json` struct
/// tag) so generation never has to inspect raw tag strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldAttributes {
    /// Serialized name, when it differs from the declared one
    pub alias: Option<String>,
    /// Field is left out of the serialized form when empty
    pub omit_if_empty: bool,
}

/// A named, typed member of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    ty: TypeRef,
    attributes: FieldAttributes,
}

impl Field {
    /// Creates a field with no serialization attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            attributes: FieldAttributes::default(),
        }
    }

    /// Sets the serialization alias.
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.attributes.alias = Some(alias.into());
        self
    }

    /// Marks the field as omitted from the serialized form when empty.
    #[must_use]
    pub const fn omit_if_empty(mut self) -> Self {
        self.attributes.omit_if_empty = true;
        self
    }

    /// Replaces all serialization attributes.
    #[must_use]
    pub fn with_attributes(mut self, attributes: FieldAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type.
    #[must_use]
    pub const fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Serialization attributes.
    #[must_use]
    pub const fn attributes(&self) -> &FieldAttributes {
        &self.attributes
    }

    /// Whether the declared type is an indirect (nullable) reference.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.ty.is_nullable()
    }
}

/// Kind of a type declaration.
///
/// Only records take part in generation; the other kinds are kept in the
/// model so they can be reported when skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Aggregate with named fields
    Record,
    /// Method-set interface
    Interface,
    /// New named type over another type
    Defined,
    /// Alternate name for another type
    Alias,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Record => "record",
            Self::Interface => "interface",
            Self::Defined => "defined type",
            Self::Alias => "alias",
        })
    }
}

/// A type declared by a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    name: String,
    kind: TypeKind,
    fields: Vec<Field>,
}

impl TypeDecl {
    /// Creates a record declaration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the name is empty or two fields
    /// share a declared name.
    pub fn record(name: impl Into<String>, fields: Vec<Field>) -> Result<Self> {
        let name = non_empty(name.into(), "type")?;
        ensure_unique(&name, fields.iter().map(Field::name), "field")?;
        Ok(Self {
            name,
            kind: TypeKind::Record,
            fields,
        })
    }

    /// Creates a declaration of a non-record kind. Such declarations carry no fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the name is empty.
    pub fn other(name: impl Into<String>, kind: TypeKind) -> Result<Self> {
        let name = non_empty(name.into(), "type")?;
        Ok(Self {
            name,
            kind,
            fields: Vec::new(),
        })
    }

    /// Declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declaration kind.
    #[must_use]
    pub const fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Returns `true` for record declarations.
    #[must_use]
    pub fn is_record(&self) -> bool {
        self.kind == TypeKind::Record
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

/// A package referenced by a qualified name in a source spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceImport {
    /// Qualifier the spelling uses (`time` in `time.Time`)
    pub name: String,
    /// Import path the qualifier resolves to
    pub path: String,
}

impl SourceImport {
    /// Creates an import.
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// A type exactly as the source declares it, with the imports its
/// qualified names need.
///
/// [`TypeRef`] is lossy (array lengths, map key types and opaque types are
/// not kept); generated native code declares values with this spelling
/// instead.
///
/// # Examples
///
/// ```
/// use wasmbind_core::{SourceImport, SourceType};
///
/// let ty = SourceType::new("map[int]time.Time", vec![SourceImport::new("time", "time")]);
/// assert_eq!(ty.spelling(), "map[int]time.Time");
/// assert_eq!(ty.imports()[0].path, "time");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceType {
    spelling: String,
    imports: Vec<SourceImport>,
}

impl SourceType {
    /// Creates a source spelling.
    #[must_use]
    pub fn new(spelling: impl Into<String>, imports: Vec<SourceImport>) -> Self {
        Self {
            spelling: spelling.into(),
            imports,
        }
    }

    /// Type text as written.
    #[must_use]
    pub fn spelling(&self) -> &str {
        &self.spelling
    }

    /// Packages the spelling refers to.
    #[must_use]
    pub fn imports(&self) -> &[SourceImport] {
        &self.imports
    }
}

/// A named, typed function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    ty: TypeRef,
    variadic: bool,
    source: Option<SourceType>,
}

impl Param {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            variadic: false,
            source: None,
        }
    }

    /// Creates a trailing variadic parameter. `ty` is the collected array type.
    #[must_use]
    pub fn variadic(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            variadic: true,
            source: None,
        }
    }

    /// Attaches the declared source type. For a variadic parameter this is
    /// the element type written after `...`.
    #[must_use]
    pub fn with_source(mut self, source: SourceType) -> Self {
        self.source = Some(source);
        self
    }

    /// Declared source type, when the parser recorded one.
    #[must_use]
    pub const fn source(&self) -> Option<&SourceType> {
        self.source.as_ref()
    }

    /// Whether this parameter collects the remaining call arguments.
    #[must_use]
    pub const fn is_variadic(&self) -> bool {
        self.variadic
    }

    /// Parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter type.
    #[must_use]
    pub const fn ty(&self) -> &TypeRef {
        &self.ty
    }
}

/// A function declared by a package.
///
/// Only the first declared result is modeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    name: String,
    params: Vec<Param>,
    result: Option<TypeRef>,
}

impl FunctionDecl {
    /// Creates a function declaration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the name is empty or two
    /// parameters share a name.
    pub fn new(
        name: impl Into<String>,
        params: Vec<Param>,
        result: Option<TypeRef>,
    ) -> Result<Self> {
        let name = non_empty(name.into(), "function")?;
        ensure_unique(&name, params.iter().map(Param::name), "parameter")?;
        Ok(Self {
            name,
            params,
            result,
        })
    }

    /// Function name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// First declared result, if any.
    #[must_use]
    pub const fn result(&self) -> Option<&TypeRef> {
        self.result.as_ref()
    }

    /// Returns `true` if this is the reserved program entry point.
    #[must_use]
    pub fn is_entry_point(&self) -> bool {
        self.name == ENTRY_POINT
    }
}

/// A parsed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    name: PackageName,
    types: Vec<TypeDecl>,
    functions: Vec<FunctionDecl>,
}

impl Package {
    /// Creates a package from its declarations, kept in the given order.
    #[must_use]
    pub const fn new(name: PackageName, types: Vec<TypeDecl>, functions: Vec<FunctionDecl>) -> Self {
        Self {
            name,
            types,
            functions,
        }
    }

    /// Package name.
    #[must_use]
    pub const fn name(&self) -> &PackageName {
        &self.name
    }

    /// Type declarations in declaration order.
    #[must_use]
    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    /// Function declarations in declaration order.
    #[must_use]
    pub fn functions(&self) -> &[FunctionDecl] {
        &self.functions
    }

    /// Iterates over the record declarations.
    pub fn records(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.iter().filter(|t| t.is_record())
    }

    /// Iterates over the functions that get bindings (everything except the entry point).
    pub fn bindable_functions(&self) -> impl Iterator<Item = &FunctionDecl> {
        self.functions.iter().filter(|f| !f.is_entry_point())
    }

    /// Returns `true` if the package declares the reserved entry point.
    #[must_use]
    pub fn declares_entry_point(&self) -> bool {
        self.functions.iter().any(FunctionDecl::is_entry_point)
    }

    /// Returns `true` if the package has no declarations at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.functions.is_empty()
    }
}

fn non_empty(name: String, what: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::InvalidArgument(format!("{what} name cannot be empty")));
    }
    Ok(name)
}

fn ensure_unique<'a>(
    owner: &str,
    names: impl Iterator<Item = &'a str>,
    what: &str,
) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(Error::InvalidArgument(format!(
                "duplicate {what} '{name}' in '{owner}'"
            )));
        }
    }
    Ok(())
}
