//! Go spelling of model types, for the generated wrappers.

use serde::Serialize;
use wasmbind_core::{Param, PrimitiveKind, SourceImport, TypeRef};

/// Packages every wrapper file imports, as `(local name, path)`.
const WRAPPER_IMPORTS: [(&str, &str); 3] = [
    ("json", "encoding/json"),
    ("strconv", "strconv"),
    ("js", "syscall/js"),
];

/// Renders a type as Go source.
///
/// Maps are always keyed by `string`, the only key the wrappers can decode
/// from a JSON object. Opaque types decode into `any`. Used only for
/// parameters that carry no declared spelling.
pub(crate) fn go_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Primitive(PrimitiveKind::Char) => "string".to_string(),
        TypeRef::Primitive(kind) => kind.source_name().to_string(),
        TypeRef::Array(elem) => format!("[]{}", go_type(elem)),
        TypeRef::Map(value) => format!("map[string]{}", go_type(value)),
        TypeRef::Nullable(inner) => format!("*{}", go_type(inner)),
        TypeRef::Named(name) => name.clone(),
        TypeRef::Opaque => "any".to_string(),
    }
}

/// One import line of a wrapper file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ImportLine {
    pub name: String,
    pub path: String,
}

/// Extra imports of one wrapper file, keyed by path.
///
/// A path keeps the first local name it was given. Names already taken by
/// the wrapper's own imports or by another path are renamed.
#[derive(Debug, Default)]
pub(crate) struct ImportPlan {
    lines: Vec<ImportLine>,
}

impl ImportPlan {
    /// Local name under which the wrapper file refers to `import`.
    fn local_name(&mut self, import: &SourceImport) -> String {
        if let Some((name, _)) = WRAPPER_IMPORTS.iter().find(|(_, path)| *path == import.path) {
            return (*name).to_string();
        }
        if let Some(line) = self.lines.iter().find(|line| line.path == import.path) {
            return line.name.clone();
        }

        let mut name = import.name.clone();
        let mut attempt = 1;
        while self.is_taken(&name) {
            name = if attempt == 1 {
                format!("wasmbind_{}", import.name)
            } else {
                format!("wasmbind_{}{attempt}", import.name)
            };
            attempt += 1;
        }
        self.lines.push(ImportLine {
            name: name.clone(),
            path: import.path.clone(),
        });
        name
    }

    fn is_taken(&self, name: &str) -> bool {
        WRAPPER_IMPORTS.iter().any(|(taken, _)| *taken == name)
            || self.lines.iter().any(|line| line.name == name)
    }

    /// Import lines to render, in first-use order.
    pub(crate) fn into_lines(self) -> Vec<ImportLine> {
        self.lines
    }
}

/// Go type a wrapper decodes a parameter into.
///
/// Uses the declared spelling when the parameter carries one, requalified
/// to the wrapper file's import names. A variadic parameter decodes into a
/// slice of its element type.
pub(crate) fn decode_type(param: &Param, plan: &mut ImportPlan) -> String {
    let Some(source) = param.source() else {
        return go_type(param.ty());
    };

    let renames: Vec<(&str, String)> = source
        .imports()
        .iter()
        .filter_map(|import| {
            let local = plan.local_name(import);
            (local != import.name).then_some((import.name.as_str(), local))
        })
        .collect();
    let element = if renames.is_empty() {
        source.spelling().to_string()
    } else {
        requalify(source.spelling(), &renames)
    };

    if param.is_variadic() {
        format!("[]{element}")
    } else {
        element
    }
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replaces package qualifiers in a type spelling, in a single pass.
///
/// Only identifiers directly followed by `.` and not themselves selected
/// count as qualifiers. String literals (struct tags) are copied untouched.
fn requalify(spelling: &str, renames: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(spelling.len());
    let mut chars = spelling.char_indices().peekable();
    let mut prev: Option<char> = None;

    while let Some((start, c)) = chars.next() {
        if c == '"' || c == '`' {
            out.push(c);
            let mut escaped = false;
            for (_, inner) in chars.by_ref() {
                out.push(inner);
                if escaped {
                    escaped = false;
                } else if c == '"' && inner == '\\' {
                    escaped = true;
                } else if inner == c {
                    break;
                }
            }
            prev = Some(c);
            continue;
        }

        if is_ident_char(c) && !prev.is_some_and(|p| is_ident_char(p) || p == '.') {
            let mut end = start + c.len_utf8();
            while let Some(&(at, next)) = chars.peek() {
                if !is_ident_char(next) {
                    break;
                }
                end = at + next.len_utf8();
                chars.next();
            }
            let word = &spelling[start..end];
            let qualifies = chars.peek().is_some_and(|&(_, next)| next == '.');
            match renames.iter().find(|(from, _)| *from == word) {
                Some((_, to)) if qualifies => out.push_str(to),
                _ => out.push_str(word),
            }
            prev = word.chars().last();
            continue;
        }

        out.push(c);
        prev = Some(c);
    }

    out
}
