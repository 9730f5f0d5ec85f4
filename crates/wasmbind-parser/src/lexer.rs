//! Tokenizer for Go source files.
//!
//! Only as much of the lexical grammar as declaration scanning needs:
//! identifiers, literals (so braces inside strings and runes never confuse
//! the scanner), punctuation, and automatic semicolon insertion at line ends.

use crate::ScanError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    /// Interpreted string literal, escapes resolved
    Str(String),
    /// Raw (backquoted) string literal
    RawStr(String),
    /// Numeric literal, as written
    Number(String),
    Rune,
    Ellipsis,
    /// `<-`
    Arrow,
    /// `++` or `--`
    IncDec,
    Punct(char),
    /// Explicit `;` or one inserted at a line end
    Semi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.ident() == Some(keyword)
    }

    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Ident(name) => format!("'{name}'"),
            TokenKind::Str(_) | TokenKind::RawStr(_) => "string literal".to_string(),
            TokenKind::Number(_) => "number".to_string(),
            TokenKind::Rune => "rune literal".to_string(),
            TokenKind::Ellipsis => "'...'".to_string(),
            TokenKind::Arrow => "'<-'".to_string(),
            TokenKind::IncDec => "increment operator".to_string(),
            TokenKind::Punct(c) => format!("'{c}'"),
            TokenKind::Semi => "end of line".to_string(),
        }
    }
}

const SEMI_KEYWORDS: [&str; 4] = ["break", "continue", "fallthrough", "return"];

/// Splits Go source text into tokens.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ScanError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens: Vec<Token> = Vec::new();
    let mut line = 1;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            insert_semi(&mut tokens, line);
            line += 1;
            i += 1;
            continue;
        }
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Comments
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            let start_line = line;
            let mut newline_seen = false;
            i += 2;
            loop {
                match chars.get(i) {
                    None => return Err(ScanError::Unterminated { what: "comment", line: start_line }),
                    Some('*') if chars.get(i + 1) == Some(&'/') => {
                        i += 2;
                        break;
                    }
                    Some('\n') => {
                        newline_seen = true;
                        line += 1;
                        i += 1;
                    }
                    Some(_) => i += 1,
                }
            }
            // A general comment spanning lines acts like a newline.
            if newline_seen {
                insert_semi(&mut tokens, start_line);
            }
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            tokens.push(Token {
                kind: TokenKind::Ident(word),
                line,
            });
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) {
            let start = i;
            while i < chars.len()
                && (chars[i].is_ascii_alphanumeric() || chars[i] == '.' || chars[i] == '_')
            {
                // Exponent signs: 1e-9, 0x1p+3
                if matches!(chars[i], 'e' | 'E' | 'p' | 'P')
                    && matches!(chars.get(i + 1), Some('+' | '-'))
                {
                    i += 1;
                }
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Number(chars[start..i].iter().collect()),
                line,
            });
            continue;
        }

        match c {
            '"' => {
                let start_line = line;
                let mut value = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None | Some('\n') => {
                            return Err(ScanError::Unterminated { what: "string", line: start_line });
                        }
                        Some('"') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => {
                            match chars.get(i + 1) {
                                Some('n') => value.push('\n'),
                                Some('t') => value.push('\t'),
                                Some(other) => value.push(*other),
                                None => {
                                    return Err(ScanError::Unterminated { what: "string", line: start_line });
                                }
                            }
                            i += 2;
                        }
                        Some(other) => {
                            value.push(*other);
                            i += 1;
                        }
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Str(value),
                    line: start_line,
                });
            }
            '`' => {
                let start_line = line;
                let mut value = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(ScanError::Unterminated { what: "raw string", line: start_line }),
                        Some('`') => {
                            i += 1;
                            break;
                        }
                        Some(other) => {
                            if *other == '\n' {
                                line += 1;
                            }
                            if *other != '\r' {
                                value.push(*other);
                            }
                            i += 1;
                        }
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::RawStr(value),
                    line: start_line,
                });
            }
            '\'' => {
                i += 1;
                loop {
                    match chars.get(i) {
                        None | Some('\n') => return Err(ScanError::Unterminated { what: "rune", line }),
                        Some('\'') => {
                            i += 1;
                            break;
                        }
                        Some('\\') => i += 2,
                        Some(_) => i += 1,
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Rune,
                    line,
                });
            }
            '.' if chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') => {
                tokens.push(Token {
                    kind: TokenKind::Ellipsis,
                    line,
                });
                i += 3;
            }
            '<' if chars.get(i + 1) == Some(&'-') => {
                tokens.push(Token {
                    kind: TokenKind::Arrow,
                    line,
                });
                i += 2;
            }
            ';' => {
                tokens.push(Token {
                    kind: TokenKind::Semi,
                    line,
                });
                i += 1;
            }
            '+' | '-' if chars.get(i + 1) == Some(&c) => {
                tokens.push(Token {
                    kind: TokenKind::IncDec,
                    line,
                });
                i += 2;
            }
            _ => {
                tokens.push(Token {
                    kind: TokenKind::Punct(c),
                    line,
                });
                i += 1;
            }
        }
    }

    insert_semi(&mut tokens, line);
    Ok(tokens)
}

/// Renders a token run back into source text.
///
/// Returns `None` when the run holds a token whose text is not kept
/// (runes, `++` and `--`).
pub(crate) fn spell(tokens: &[Token]) -> Option<String> {
    let mut out = String::new();
    let mut prev: Option<&TokenKind> = None;

    for token in tokens {
        let spaced = match (prev, &token.kind) {
            (
                Some(TokenKind::Ident(_) | TokenKind::Number(_)),
                TokenKind::Ident(_) | TokenKind::Number(_) | TokenKind::Str(_) | TokenKind::RawStr(_),
            )
            | (Some(TokenKind::Ident(_)), TokenKind::Punct('*'))
            | (Some(TokenKind::Punct(')')), TokenKind::Ident(_)) => true,
            _ => false,
        };
        if spaced {
            out.push(' ');
        }
        match &token.kind {
            TokenKind::Ident(text) | TokenKind::Number(text) => out.push_str(text),
            TokenKind::Str(text) => push_quoted(&mut out, text),
            TokenKind::RawStr(text) => {
                out.push('`');
                out.push_str(text);
                out.push('`');
            }
            TokenKind::Ellipsis => out.push_str("..."),
            TokenKind::Arrow => out.push_str("<-"),
            TokenKind::Punct(',') => out.push_str(", "),
            TokenKind::Punct(c) => out.push(*c),
            TokenKind::Semi => out.push_str("; "),
            TokenKind::Rune | TokenKind::IncDec => return None,
        }
        prev = Some(&token.kind);
    }
    Some(out)
}

fn push_quoted(out: &mut String, text: &str) {
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

fn insert_semi(tokens: &mut Vec<Token>, line: usize) {
    let needs_semi = tokens.last().is_some_and(|last| match &last.kind {
        TokenKind::Ident(word) => {
            !is_keyword(word) || SEMI_KEYWORDS.contains(&word.as_str())
        }
        TokenKind::Str(_)
        | TokenKind::RawStr(_)
        | TokenKind::Number(_)
        | TokenKind::Rune
        | TokenKind::IncDec => true,
        TokenKind::Punct(c) => matches!(c, ')' | ']' | '}'),
        TokenKind::Ellipsis | TokenKind::Arrow | TokenKind::Semi => false,
    });
    if needs_semi {
        tokens.push(Token {
            kind: TokenKind::Semi,
            line,
        });
    }
}

fn is_keyword(word: &str) -> bool {
    matches!(
        word,
        "break"
            | "case"
            | "chan"
            | "const"
            | "continue"
            | "default"
            | "defer"
            | "else"
            | "fallthrough"
            | "for"
            | "func"
            | "go"
            | "goto"
            | "if"
            | "import"
            | "interface"
            | "map"
            | "package"
            | "range"
            | "return"
            | "select"
            | "struct"
            | "switch"
            | "type"
            | "var"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn ident(s: &str) -> TokenKind {
        TokenKind::Ident(s.to_string())
    }

    #[test]
    fn test_semicolon_insertion() {
        assert_eq!(
            kinds("package main\n\nfunc F() {\n}\n"),
            vec![
                ident("package"),
                ident("main"),
                TokenKind::Semi,
                ident("func"),
                ident("F"),
                TokenKind::Punct('('),
                TokenKind::Punct(')'),
                TokenKind::Punct('{'),
                TokenKind::Punct('}'),
                TokenKind::Semi,
            ]
        );
    }

    #[test]
    fn test_no_semicolon_after_keyword_or_operator() {
        assert_eq!(
            kinds("struct\n{\n"),
            vec![ident("struct"), TokenKind::Punct('{')]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("a // trailing { \n/* block } */ b"),
            vec![ident("a"), TokenKind::Semi, ident("b"), TokenKind::Semi]
        );
    }

    #[test]
    fn test_braces_inside_literals_are_not_punctuation() {
        let tokens = kinds(r#"x := "}{" + '}' + `{`"#);
        assert!(!tokens.contains(&TokenKind::Punct('{')));
        assert!(!tokens.contains(&TokenKind::Punct('}')));
        assert!(tokens.contains(&TokenKind::Str("}{".to_string())));
        assert!(tokens.contains(&TokenKind::RawStr("{".to_string())));
    }

    #[test]
    fn test_escaped_quotes_in_strings() {
        assert_eq!(
            kinds(r#""json:\"id\"""#),
            vec![TokenKind::Str("json:\"id\"".to_string()), TokenKind::Semi]
        );
    }

    #[test]
    fn test_ellipsis_and_arrow() {
        assert_eq!(
            kinds("...T <-chan"),
            vec![TokenKind::Ellipsis, ident("T"), TokenKind::Arrow, ident("chan")]
        );
    }

    #[test]
    fn test_numbers() {
        let number = |text: &str| TokenKind::Number(text.to_string());
        assert_eq!(
            kinds("1e-9 0x1F 3.14"),
            vec![number("1e-9"), number("0x1F"), number("3.14"), TokenKind::Semi]
        );
    }

    #[test]
    fn test_spell_reproduces_type_text() {
        let spelled = |source: &str| {
            let mut tokens = tokenize(source).unwrap();
            if tokens.last().is_some_and(|t| t.kind == TokenKind::Semi) {
                tokens.pop();
            }
            spell(&tokens)
        };
        assert_eq!(spelled("map[int][3]time.Time").unwrap(), "map[int][3]time.Time");
        assert_eq!(spelled("func(a, b int) error").unwrap(), "func(a, b int) error");
        assert_eq!(spelled("<-chan *Item").unwrap(), "<-chan *Item");
        assert_eq!(
            spelled("struct { ID int `json:\"id\"` }").unwrap(),
            "struct{ID int `json:\"id\"`}"
        );
        assert_eq!(
            spelled(r#"struct{ Name string "x\"y" }"#).unwrap(),
            r#"struct{Name string "x\"y"}"#
        );
        assert!(spelled("'a'").is_none());
    }

    #[test]
    fn test_unterminated_string_is_error() {
        assert!(matches!(
            tokenize("x := \"open\n"),
            Err(ScanError::Unterminated { what: "string", line: 1 })
        ));
        assert!(tokenize("/* never closed").is_err());
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("a\nb\n\nc").unwrap();
        let lines: Vec<_> = tokens
            .iter()
            .filter(|t| t.ident().is_some())
            .map(|t| t.line)
            .collect();
        assert_eq!(lines, vec![1, 2, 4]);
    }
}
