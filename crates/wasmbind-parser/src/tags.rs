//! Struct tag decoding.
//!
//! Tags are decoded once, while the model is built, into
//! [`FieldAttributes`]; nothing downstream looks at raw tag text.

use wasmbind_core::FieldAttributes;

/// What a `json` tag says about a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum JsonTag {
    /// No `json` key in the tag
    Absent,
    /// `json:"-"`: never serialized
    Ignored,
    /// Serialized, with the given attributes
    Present(FieldAttributes),
}

/// Looks up `key` in a conventional `key:"value" key2:"value2"` tag string.
///
/// Follows the lookup rules of Go's `reflect.StructTag.Get`: a malformed
/// pair ends the scan.
pub(crate) fn lookup(tag: &str, key: &str) -> Option<String> {
    let mut rest = tag;
    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            return None;
        }

        let name_end = rest
            .find(|c: char| c <= ' ' || c == ':' || c == '"' || c == '\u{7f}')
            .unwrap_or(rest.len());
        if name_end == 0 || !rest[name_end..].starts_with(":\"") {
            return None;
        }
        let name = &rest[..name_end];
        rest = &rest[name_end + 2..];

        // Scan the quoted value up to the closing quote, honoring escapes.
        let mut value = String::new();
        let mut chars = rest.char_indices();
        let mut closed_at = None;
        while let Some((idx, c)) = chars.next() {
            match c {
                '\\' => {
                    if let Some((_, escaped)) = chars.next() {
                        value.push(escaped);
                    }
                }
                '"' => {
                    closed_at = Some(idx);
                    break;
                }
                other => value.push(other),
            }
        }
        let closed_at = closed_at?;
        if name == key {
            return Some(value);
        }
        rest = &rest[closed_at + 1..];
    }
}

/// Decodes the `json` entry of a struct tag.
///
/// An explicit empty name (`json:",omitempty"`) serializes under the
/// declared name, so the alias becomes the declared name.
pub(crate) fn json_tag(tag: &str, declared_name: &str) -> JsonTag {
    let Some(value) = lookup(tag, "json") else {
        return JsonTag::Absent;
    };
    if value == "-" {
        return JsonTag::Ignored;
    }

    let mut parts = value.split(',');
    let name = parts.next().unwrap_or_default();
    let omit_if_empty = parts.any(|opt| opt == "omitempty" || opt == "omitzero");
    let alias = if name.is_empty() { declared_name } else { name };

    JsonTag::Present(FieldAttributes {
        alias: Some(alias.to_string()),
        omit_if_empty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(alias: &str, omit_if_empty: bool) -> JsonTag {
        JsonTag::Present(FieldAttributes {
            alias: Some(alias.to_string()),
            omit_if_empty,
        })
    }

    #[test]
    fn test_lookup_among_several_keys() {
        let tag = r#"xml:"price" json:"price,omitempty" db:"p""#;
        assert_eq!(lookup(tag, "json").as_deref(), Some("price,omitempty"));
        assert_eq!(lookup(tag, "db").as_deref(), Some("p"));
        assert_eq!(lookup(tag, "yaml"), None);
    }

    #[test]
    fn test_lookup_stops_at_malformed_pair() {
        assert_eq!(lookup(r#"json "id""#, "json"), None);
        assert_eq!(lookup(r#"json:"unterminated"#, "json"), None);
    }

    #[test]
    fn test_lookup_handles_escapes() {
        assert_eq!(lookup(r#"json:"a\"b""#, "json").as_deref(), Some("a\"b"));
    }

    #[test]
    fn test_json_tag_variants() {
        assert_eq!(json_tag(r#"json:"id""#, "ID"), attrs("id", false));
        assert_eq!(json_tag(r#"json:"price,omitempty""#, "Price"), attrs("price", true));
        assert_eq!(json_tag(r#"json:",omitempty""#, "Price"), attrs("Price", true));
        assert_eq!(json_tag(r#"json:"when,omitzero""#, "When"), attrs("when", true));
        assert_eq!(json_tag(r#"json:"-""#, "Secret"), JsonTag::Ignored);
        assert_eq!(json_tag(r#"json:"-,""#, "Dash"), attrs("-", false));
        assert_eq!(json_tag(r#"yaml:"x""#, "X"), JsonTag::Absent);
    }

    #[test]
    fn test_option_named_like_a_field_is_not_an_option() {
        // The first element is always the name, even when it reads "omitempty".
        assert_eq!(json_tag(r#"json:"omitempty""#, "X"), attrs("omitempty", false));
    }
}
