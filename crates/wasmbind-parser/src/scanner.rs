//! Declaration scanner.
//!
//! Walks the token stream of one file and collects its exported top-level
//! struct types, other type declarations and plain functions. Function
//! bodies, methods, generic declarations, vars and consts are skipped by
//! bracket matching; nothing inside a body is interpreted. Imports are read
//! so qualified parameter types can name the package they come from.

use crate::lexer::{Token, TokenKind, spell, tokenize};
use crate::tags::{JsonTag, json_tag};
use crate::ScanError;
use std::ops::Range;
use wasmbind_core::{
    ENTRY_POINT, Field, FunctionDecl, Param, PrimitiveKind, SourceImport, SourceType, TypeDecl,
    TypeKind, TypeRef,
};

/// Declarations found in one source file, in source order.
#[derive(Debug, Default)]
pub(crate) struct FileDecls {
    pub package: String,
    pub types: Vec<TypeDecl>,
    pub functions: Vec<FunctionDecl>,
}

/// Scans one Go source file.
pub(crate) fn scan_file(source: &str) -> Result<FileDecls, ScanError> {
    let tokens = tokenize(source)?;
    Scanner {
        tokens,
        pos: 0,
        imports: Vec::new(),
        decls: FileDecls::default(),
    }
    .scan()
}

/// One comma-separated entry of a parameter or result list, before
/// grouped names (`a, b int`) are resolved. Ranges are the token span of
/// the type.
enum ParamEntry {
    /// A lone identifier: either a name awaiting its group's type, or a type
    Bare(String, Range<usize>),
    Named(String, TypeRef, Range<usize>),
    Unnamed(TypeRef, Range<usize>),
}

/// A parameter with its type's token span, before the span is spelled.
struct RawParam {
    name: String,
    ty: TypeRef,
    span: Range<usize>,
    variadic: bool,
}

struct Scanner {
    tokens: Vec<Token>,
    pos: usize,
    imports: Vec<SourceImport>,
    decls: FileDecls,
}

impl Scanner {
    fn scan(mut self) -> Result<FileDecls, ScanError> {
        self.skip_semis();
        self.expect_keyword("package")?;
        self.decls.package = self.expect_ident()?;

        loop {
            self.skip_semis();
            let Some(token) = self.peek().cloned() else {
                break;
            };
            match token.ident() {
                Some("import") => {
                    self.bump();
                    self.import_decl()?;
                }
                Some("var" | "const") => {
                    self.bump();
                    if self.peek_is_punct('(') {
                        self.skip_balanced('(', ')')?;
                    } else {
                        self.skip_statement();
                    }
                }
                Some("type") => {
                    self.bump();
                    if self.peek_is_punct('(') {
                        self.bump();
                        loop {
                            self.skip_semis();
                            if self.peek_is_punct(')') {
                                self.bump();
                                break;
                            }
                            self.type_spec()?;
                        }
                    } else {
                        self.type_spec()?;
                    }
                }
                Some("func") => {
                    self.bump();
                    self.func_decl()?;
                }
                _ => {
                    return Err(ScanError::Unexpected {
                        expected: "top-level declaration".to_string(),
                        found: token.describe(),
                        line: token.line,
                    });
                }
            }
        }

        Ok(self.decls)
    }

    fn import_decl(&mut self) -> Result<(), ScanError> {
        if !self.peek_is_punct('(') {
            return self.import_spec();
        }
        self.bump();
        loop {
            self.skip_semis();
            if self.peek_is_punct(')') {
                self.bump();
                return Ok(());
            }
            self.import_spec()?;
        }
    }

    /// `"path"`, `name "path"`, `. "path"` or `_ "path"`. Dot and blank
    /// imports cannot qualify a name and are not recorded.
    fn import_spec(&mut self) -> Result<(), ScanError> {
        let alias = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Ident(name)) => Some(name.clone()),
            Some(TokenKind::Punct('.')) => Some(".".to_string()),
            _ => None,
        };
        if alias.is_some() {
            self.bump();
        }

        let token = self.next_token("import path")?;
        let path = match token.kind {
            TokenKind::Str(path) | TokenKind::RawStr(path) => path,
            _ => {
                return Err(ScanError::Unexpected {
                    expected: "import path".to_string(),
                    found: token.describe(),
                    line: token.line,
                });
            }
        };

        let name = alias.unwrap_or_else(|| default_package_name(&path));
        if name != "_" && name != "." {
            self.imports.push(SourceImport::new(name, path));
        }
        Ok(())
    }

    fn type_spec(&mut self) -> Result<(), ScanError> {
        let line = self.current_line();
        let name = self.expect_ident()?;
        let exported = is_exported(&name);

        let generic = self.peek_is_punct('[') && self.at_type_params();
        if generic {
            self.skip_balanced('[', ']')?;
        }

        let kind = if self.peek_is_punct('=') {
            self.bump();
            self.parse_type()?;
            TypeKind::Alias
        } else if self.peek_is_keyword("struct") {
            self.bump();
            let fields = self.struct_fields()?;
            if !exported {
                tracing::debug!("Skipping unexported struct {name} (line {line})");
                return Ok(());
            }
            if generic {
                tracing::debug!("Generic struct {name} kept as a non-record type");
                TypeKind::Defined
            } else {
                match TypeDecl::record(&name, fields) {
                    Ok(decl) => self.decls.types.push(decl),
                    Err(e) => tracing::warn!("Skipping struct {name} (line {line}): {e}"),
                }
                return Ok(());
            }
        } else if self.peek_is_keyword("interface") {
            self.bump();
            self.skip_balanced('{', '}')?;
            TypeKind::Interface
        } else {
            self.parse_type()?;
            TypeKind::Defined
        };

        if !exported {
            tracing::debug!("Skipping unexported type {name} (line {line})");
            return Ok(());
        }
        match TypeDecl::other(&name, kind) {
            Ok(decl) => self.decls.types.push(decl),
            Err(e) => tracing::warn!("Skipping type {name} (line {line}): {e}"),
        }
        Ok(())
    }

    /// `type A[T any] ...` versus `type A [N]int`.
    fn at_type_params(&self) -> bool {
        let first = self.peek_at(1);
        let second = self.peek_at(2);
        first.and_then(Token::ident).is_some()
            && second.is_some_and(|t| !t.is_punct(']') && !t.is_punct('.'))
    }

    fn struct_fields(&mut self) -> Result<Vec<Field>, ScanError> {
        self.expect_punct('{')?;
        let mut fields = Vec::new();

        loop {
            self.skip_semis();
            if self.peek_is_punct('}') {
                self.bump();
                break;
            }
            let line = self.current_line();

            if self.at_embedded_field() {
                let ty = self.parse_type()?;
                self.take_tag();
                tracing::warn!("Embedded field {ty:?} (line {line}) is not flattened; skipping it");
                continue;
            }

            let mut names = vec![self.expect_ident()?];
            while self.peek_is_punct(',') {
                self.bump();
                names.push(self.expect_ident()?);
            }
            let ty = self.parse_type()?;
            let tag = self.take_tag();

            for name in names {
                if !is_exported(&name) {
                    tracing::debug!("Field {name} (line {line}) is unexported and never serialized; skipping it");
                    continue;
                }
                let field = Field::new(&name, ty.clone());
                let field = match tag.as_deref().map(|t| json_tag(t, &name)) {
                    None | Some(JsonTag::Absent) => field,
                    Some(JsonTag::Ignored) => {
                        tracing::debug!("Field {name} (line {line}) is never serialized; skipping it");
                        continue;
                    }
                    Some(JsonTag::Present(attributes)) => field.with_attributes(attributes),
                };
                fields.push(field);
            }
        }

        Ok(fields)
    }

    fn at_embedded_field(&self) -> bool {
        let Some(first) = self.peek() else {
            return false;
        };
        if first.is_punct('*') {
            return true;
        }
        first.ident().is_some()
            && self.peek_at(1).is_some_and(|next| {
                matches!(
                    next.kind,
                    TokenKind::Semi | TokenKind::Str(_) | TokenKind::RawStr(_)
                ) || next.is_punct('}')
                    || next.is_punct('.')
            })
    }

    fn take_tag(&mut self) -> Option<String> {
        match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Str(tag) | TokenKind::RawStr(tag)) => {
                let tag = tag.clone();
                self.bump();
                Some(tag)
            }
            _ => None,
        }
    }

    fn func_decl(&mut self) -> Result<(), ScanError> {
        let line = self.current_line();

        if self.peek_is_punct('(') {
            self.skip_balanced('(', ')')?;
            let name = self.expect_ident()?;
            self.skip_signature_and_body()?;
            tracing::debug!("Skipping method {name} (line {line})");
            return Ok(());
        }

        let name = self.expect_ident()?;
        if self.peek_is_punct('[') {
            self.skip_balanced('[', ']')?;
            self.skip_signature_and_body()?;
            tracing::debug!("Skipping generic function {name} (line {line})");
            return Ok(());
        }

        let params = self.param_list()?;
        let result = if self.peek_is_punct('(') {
            self.param_list()?.into_iter().next().map(|p| p.ty)
        } else if self.at_type_start() {
            Some(self.parse_type()?)
        } else {
            None
        };
        if self.peek_is_punct('{') {
            self.skip_balanced('{', '}')?;
        }

        if !is_exported(&name) && name != ENTRY_POINT {
            tracing::debug!("Skipping unexported function {name} (line {line})");
            return Ok(());
        }
        let params = match params
            .into_iter()
            .map(|raw| self.source_param(raw))
            .collect::<Result<Vec<_>, String>>()
        {
            Ok(params) => params,
            Err(reason) => {
                tracing::warn!("Skipping function {name} (line {line}): {reason}");
                return Ok(());
            }
        };

        match FunctionDecl::new(&name, params, result) {
            Ok(decl) => self.decls.functions.push(decl),
            Err(e) => tracing::warn!("Skipping function {name} (line {line}): {e}"),
        }
        Ok(())
    }

    /// Attaches the declared spelling of a parameter's type, with the
    /// imports its qualified names resolve to.
    fn source_param(&self, raw: RawParam) -> Result<Param, String> {
        let declared = &self.tokens[raw.span.clone()];
        let tokens = match declared.split_first() {
            Some((first, rest)) if raw.variadic && first.kind == TokenKind::Ellipsis => rest,
            _ => declared,
        };

        let spelling = spell(tokens)
            .ok_or_else(|| format!("type of parameter {} cannot be reproduced", raw.name))?;
        let imports = qualifiers(tokens)
            .into_iter()
            .map(|qualifier| {
                self.imports
                    .iter()
                    .find(|import| import.name == qualifier)
                    .cloned()
                    .ok_or_else(|| {
                        format!("no import found for '{qualifier}' in the type of parameter {}", raw.name)
                    })
            })
            .collect::<Result<Vec<_>, String>>()?;

        let param = if raw.variadic {
            Param::variadic(raw.name, raw.ty)
        } else {
            Param::new(raw.name, raw.ty)
        };
        Ok(param.with_source(SourceType::new(spelling, imports)))
    }

    fn skip_signature_and_body(&mut self) -> Result<(), ScanError> {
        self.skip_balanced('(', ')')?;
        if self.peek_is_punct('(') {
            self.skip_balanced('(', ')')?;
        } else if self.at_type_start() {
            self.parse_type()?;
        }
        if self.peek_is_punct('{') {
            self.skip_balanced('{', '}')?;
        }
        Ok(())
    }

    fn param_list(&mut self) -> Result<Vec<RawParam>, ScanError> {
        let line = self.current_line();
        self.expect_punct('(')?;
        let mut entries = Vec::new();
        let mut variadic = false;

        loop {
            self.skip_semis();
            if self.peek_is_punct(')') {
                self.bump();
                break;
            }

            variadic = self.peek().is_some_and(|t| t.kind == TokenKind::Ellipsis)
                || self.peek_at(1).is_some_and(|t| t.kind == TokenKind::Ellipsis);
            let start = self.pos;
            let entry = match self.peek().and_then(Token::ident) {
                Some(word) if !is_type_keyword(word) => {
                    let word = word.to_string();
                    let next = self.peek_at(1);
                    if next.is_some_and(|t| t.is_punct(',') || t.is_punct(')')) {
                        self.bump();
                        ParamEntry::Bare(word, start..self.pos)
                    } else if next.is_some_and(|t| t.is_punct('.')) || self.at_type_args(1) {
                        let ty = self.parse_type()?;
                        ParamEntry::Unnamed(ty, start..self.pos)
                    } else {
                        self.bump();
                        let type_start = self.pos;
                        let ty = self.parse_type()?;
                        ParamEntry::Named(word, ty, type_start..self.pos)
                    }
                }
                _ => {
                    let ty = self.parse_type()?;
                    ParamEntry::Unnamed(ty, start..self.pos)
                }
            };
            entries.push(entry);

            if self.peek_is_punct(',') {
                self.bump();
            }
        }

        let any_named = entries.iter().any(|e| matches!(e, ParamEntry::Named(..)));
        let mut resolved: Vec<(Option<String>, TypeRef, Range<usize>)> = Vec::with_capacity(entries.len());

        if any_named {
            // Grouped names take the type of the next named entry: `a, b int`.
            let mut group: Option<(TypeRef, Range<usize>)> = None;
            for entry in entries.into_iter().rev() {
                match entry {
                    ParamEntry::Named(name, ty, span) => {
                        group = Some((ty.clone(), span.clone()));
                        resolved.push((Some(name), ty, span));
                    }
                    ParamEntry::Bare(name, _) => {
                        let (ty, span) = group.clone().ok_or_else(|| ScanError::Unexpected {
                            expected: "parameter type".to_string(),
                            found: format!("'{name}'"),
                            line,
                        })?;
                        resolved.push((Some(name), ty, span));
                    }
                    ParamEntry::Unnamed(..) => {
                        return Err(ScanError::Unexpected {
                            expected: "named parameter".to_string(),
                            found: "a mix of named and unnamed parameters".to_string(),
                            line,
                        });
                    }
                }
            }
            resolved.reverse();
        } else {
            for entry in entries {
                let (ty, span) = match entry {
                    ParamEntry::Bare(word, span) => (ident_type(&word), span),
                    ParamEntry::Named(_, ty, span) | ParamEntry::Unnamed(ty, span) => (ty, span),
                };
                resolved.push((None, ty, span));
            }
        }

        let last = resolved.len().saturating_sub(1);
        Ok(resolved
            .into_iter()
            .enumerate()
            .map(|(i, (name, ty, span))| RawParam {
                name: match name {
                    Some(name) if name != "_" => name,
                    _ => format!("arg{i}"),
                },
                ty,
                span,
                variadic: variadic && i == last,
            })
            .collect())
    }

    /// Whether the `[` at `offset` opens generic type arguments rather
    /// than a slice or array type.
    fn at_type_args(&self, offset: usize) -> bool {
        self.peek_at(offset).is_some_and(|t| t.is_punct('['))
            && self.peek_at(offset + 1).is_some_and(|t| {
                !t.is_punct(']') && !matches!(t.kind, TokenKind::Number(_))
            })
    }

    fn at_type_start(&self) -> bool {
        self.peek().is_some_and(|t| {
            t.ident().is_some()
                || t.is_punct('*')
                || t.is_punct('[')
                || t.is_punct('(')
                || t.kind == TokenKind::Arrow
        })
    }

    fn parse_type(&mut self) -> Result<TypeRef, ScanError> {
        let token = self.next_token("type")?;
        let line = token.line;

        match &token.kind {
            TokenKind::Ident(name) => match name.as_str() {
                "map" => {
                    self.expect_punct('[')?;
                    let key = self.parse_type()?;
                    self.expect_punct(']')?;
                    if key != TypeRef::Primitive(PrimitiveKind::String) {
                        tracing::debug!("Map key {key:?} (line {line}) is treated as a string");
                    }
                    Ok(TypeRef::map(self.parse_type()?))
                }
                "chan" => {
                    if self.peek().is_some_and(|t| t.kind == TokenKind::Arrow) {
                        self.bump();
                    }
                    self.parse_type()?;
                    Ok(TypeRef::Opaque)
                }
                "func" => {
                    self.skip_balanced('(', ')')?;
                    if self.peek_is_punct('(') {
                        self.skip_balanced('(', ')')?;
                    } else if self.at_type_start() && !self.at_field_boundary() {
                        self.parse_type()?;
                    }
                    Ok(TypeRef::Opaque)
                }
                "struct" | "interface" => {
                    self.skip_balanced('{', '}')?;
                    Ok(TypeRef::Opaque)
                }
                _ => {
                    let mut full = name.clone();
                    if self.peek_is_punct('.') {
                        self.bump();
                        full = format!("{full}.{}", self.expect_ident()?);
                    }
                    if self.peek_is_punct('[') {
                        self.skip_balanced('[', ']')?;
                    }
                    Ok(ident_type(&full))
                }
            },
            TokenKind::Punct('*') => Ok(TypeRef::nullable(self.parse_type()?)),
            TokenKind::Punct('[') => {
                // Slice `[]T` or array `[N]T`; both map to arrays.
                let mut depth = 1;
                while depth > 0 {
                    let inner = self.next_token("']'")?;
                    if inner.is_punct('[') {
                        depth += 1;
                    } else if inner.is_punct(']') {
                        depth -= 1;
                    }
                }
                Ok(TypeRef::array(self.parse_type()?))
            }
            TokenKind::Punct('(') => {
                let inner = self.parse_type()?;
                self.expect_punct(')')?;
                Ok(inner)
            }
            TokenKind::Arrow => {
                self.expect_keyword("chan")?;
                self.parse_type()?;
                Ok(TypeRef::Opaque)
            }
            TokenKind::Ellipsis => Ok(TypeRef::array(self.parse_type()?)),
            _ => Err(ScanError::Unexpected {
                expected: "type".to_string(),
                found: token.describe(),
                line,
            }),
        }
    }

    /// A func type used as a struct field type is followed by its tag or
    /// the end of the line, never by a result type on the next field.
    fn at_field_boundary(&self) -> bool {
        self.peek()
            .is_some_and(|t| matches!(t.kind, TokenKind::Semi | TokenKind::Str(_) | TokenKind::RawStr(_)))
    }

    fn skip_balanced(&mut self, open: char, close: char) -> Result<(), ScanError> {
        self.expect_punct(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.next_token(&format!("'{close}'"))?;
            if token.is_punct(open) {
                depth += 1;
            } else if token.is_punct(close) {
                depth -= 1;
            }
        }
        Ok(())
    }

    /// Skips to the end of the current statement, ignoring line ends
    /// inside brackets.
    fn skip_statement(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match &token.kind {
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') => depth = depth.saturating_sub(1),
                TokenKind::Semi if depth == 0 => {
                    self.bump();
                    return;
                }
                _ => {}
            }
            self.bump();
        }
    }

    fn skip_semis(&mut self) {
        while self.peek().is_some_and(|t| t.kind == TokenKind::Semi) {
            self.bump();
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn peek_is_punct(&self, c: char) -> bool {
        self.peek().is_some_and(|t| t.is_punct(c))
    }

    fn peek_is_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.is_keyword(keyword))
    }

    fn current_line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(0, |t| t.line)
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn next_token(&mut self, expected: &str) -> Result<Token, ScanError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| ScanError::UnexpectedEof {
                expected: expected.to_string(),
            })?;
        self.pos += 1;
        Ok(token)
    }

    fn expect_punct(&mut self, c: char) -> Result<(), ScanError> {
        let token = self.next_token(&format!("'{c}'"))?;
        if token.is_punct(c) {
            Ok(())
        } else {
            Err(ScanError::Unexpected {
                expected: format!("'{c}'"),
                found: token.describe(),
                line: token.line,
            })
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<(), ScanError> {
        let token = self.next_token(keyword)?;
        if token.is_keyword(keyword) {
            Ok(())
        } else {
            Err(ScanError::Unexpected {
                expected: format!("'{keyword}'"),
                found: token.describe(),
                line: token.line,
            })
        }
    }

    fn expect_ident(&mut self) -> Result<String, ScanError> {
        let token = self.next_token("identifier")?;
        match token.kind {
            TokenKind::Ident(name) => Ok(name),
            _ => Err(ScanError::Unexpected {
                expected: "identifier".to_string(),
                found: token.describe(),
                line: token.line,
            }),
        }
    }
}

/// Go exports a name by starting it with an upper-case letter.
fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Name a package is referred to by when imported without an alias:
/// the last path element, skipping a major-version element (`/v2`) and
/// dropping a `go-` prefix or a `.vN` suffix (`gopkg.in/yaml.v3`).
fn default_package_name(path: &str) -> String {
    let mut elements = path.rsplit('/');
    let last = elements.next().unwrap_or(path);
    let is_major_version =
        last.len() > 1 && last.starts_with('v') && last[1..].chars().all(|c| c.is_ascii_digit());
    let last = match (is_major_version, elements.next()) {
        (true, Some(previous)) => previous,
        _ => last,
    };
    let last = last.split('.').next().unwrap_or(last);
    last.strip_prefix("go-").unwrap_or(last).to_string()
}

/// Package qualifiers (`time` in `time.Time`) used in a token run, in
/// first-use order.
fn qualifiers(tokens: &[Token]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for (i, window) in tokens.windows(3).enumerate() {
        let Some(qualifier) = window[0].ident() else {
            continue;
        };
        let after_dot = i > 0 && tokens[i - 1].is_punct('.');
        if after_dot || !window[1].is_punct('.') || window[2].ident().is_none() {
            continue;
        }
        if !found.iter().any(|q| q == qualifier) {
            found.push(qualifier.to_string());
        }
    }
    found
}

fn is_type_keyword(word: &str) -> bool {
    matches!(word, "map" | "chan" | "func" | "struct" | "interface")
}

fn ident_type(name: &str) -> TypeRef {
    if name == "any" {
        return TypeRef::Opaque;
    }
    // `char` and `float` are not Go spellings; only the real names count here.
    match PrimitiveKind::from_source_name(name) {
        Some(kind) if name != "char" && name != "float" => TypeRef::Primitive(kind),
        _ => TypeRef::named(name),
    }
}
