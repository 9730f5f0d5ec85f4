//! Output formatters for CLI commands.
//!
//! Reports are serialized once and rendered as JSON, flat `key: value` text,
//! or colorized text for terminals. Keys come out in sorted order.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use wasmbind_core::cli::OutputFormat;

/// Formats `data` according to `format`.
///
/// # Errors
///
/// Returns an error if `data` cannot be serialized.
///
/// # Examples
///
/// ```
/// use serde::Serialize;
/// use wasmbind_cli::formatters::format_output;
/// use wasmbind_core::cli::OutputFormat;
///
/// #[derive(Serialize)]
/// struct Summary {
///     packages: usize,
///     cleaned_up: bool,
/// }
///
/// let summary = Summary { packages: 1, cleaned_up: true };
/// let text = format_output(&summary, OutputFormat::Text)?;
/// assert_eq!(text, "cleaned_up: true\npackages: 1");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// JSON output.
pub mod json {
    use super::{Result, Serialize};

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` cannot be serialized.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

/// Plain text output for scripts.
pub mod text {
    use super::{Result, Serialize, Value};

    /// One `key: value` line per top-level field; lists become indented
    /// `- item` lines. Nested objects are written as compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` cannot be serialized.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let Value::Object(fields) = value else {
            return Ok(scalar(&value));
        };

        let mut lines = Vec::with_capacity(fields.len());
        for (key, value) in &fields {
            match value {
                Value::Array(items) if items.is_empty() => lines.push(format!("{key}: []")),
                Value::Array(items) => {
                    lines.push(format!("{key}:"));
                    lines.extend(items.iter().map(|item| format!("  - {}", scalar(item))));
                }
                other => lines.push(format!("{key}: {}", scalar(other))),
            }
        }
        Ok(lines.join("\n"))
    }

    fn scalar(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => "null".to_string(),
            other => other.to_string(),
        }
    }
}

/// Colorized output for terminals.
pub mod pretty {
    use super::{Colorize, Result, Serialize, Value};

    /// Human-readable rendering with colored keys and values.
    ///
    /// # Errors
    ///
    /// Returns an error if `data` cannot be serialized.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut out = String::new();
        render(&value, 0, &mut out);
        Ok(out.trim_end().to_string())
    }

    fn render(value: &Value, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        match value {
            Value::Object(fields) => {
                for (key, value) in fields {
                    match value {
                        Value::Object(_) | Value::Array(_) if !is_empty(value) => {
                            out.push_str(&format!("{indent}{}\n", key.blue().bold()));
                            render(value, depth + 1, out);
                        }
                        _ => out.push_str(&format!(
                            "{indent}{}: {}\n",
                            key.blue().bold(),
                            paint(value)
                        )),
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    if let Value::Object(_) = item {
                        out.push_str(&format!("{indent}{}\n", "-".dimmed()));
                        render(item, depth + 1, out);
                    } else {
                        out.push_str(&format!("{indent}{} {}\n", "-".dimmed(), paint(item)));
                    }
                }
            }
            scalar => out.push_str(&format!("{indent}{}\n", paint(scalar))),
        }
    }

    fn is_empty(value: &Value) -> bool {
        match value {
            Value::Object(fields) => fields.is_empty(),
            Value::Array(items) => items.is_empty(),
            _ => false,
        }
    }

    fn paint(value: &Value) -> String {
        match value {
            Value::Null => "null".dimmed().to_string(),
            Value::Bool(true) => "true".green().to_string(),
            Value::Bool(false) => "false".yellow().to_string(),
            Value::Number(n) => n.to_string().cyan().to_string(),
            Value::String(s) => s.green().to_string(),
            Value::Array(_) => "[]".dimmed().to_string(),
            Value::Object(_) => "{}".dimmed().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Report {
        packages: usize,
        output_dir: String,
        written: Vec<String>,
        wrappers: Vec<String>,
        cleaned_up: bool,
    }

    fn report() -> Report {
        Report {
            packages: 1,
            output_dir: "/work/shop/output/ts".to_string(),
            written: vec!["types.d.ts".to_string(), "lib.js".to_string()],
            wrappers: vec![],
            cleaned_up: true,
        }
    }

    #[test]
    fn test_json_format() {
        let output = format_output(&report(), OutputFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["packages"], 1);
        assert_eq!(parsed["written"][1], "lib.js");
    }

    #[test]
    fn test_text_format() {
        let output = format_output(&report(), OutputFormat::Text).unwrap();
        assert_eq!(
            output,
            "cleaned_up: true\n\
             output_dir: /work/shop/output/ts\n\
             packages: 1\n\
             written:\n  - types.d.ts\n  - lib.js\n\
             wrappers: []"
        );
    }

    #[test]
    fn test_pretty_format_without_colors() {
        colored::control::set_override(false);
        let output = format_output(&report(), OutputFormat::Pretty).unwrap();
        assert!(output.contains("packages: 1"));
        assert!(output.contains("written\n  - types.d.ts\n  - lib.js"));
        assert!(output.contains("wrappers: []"));
        assert!(output.starts_with("cleaned_up: true"));
    }

    #[test]
    fn test_pretty_nested_objects() {
        colored::control::set_override(false);
        let value = serde_json::json!({
            "diagnostics": [{"kind": "unresolved_type", "subject": "Order.When"}]
        });
        let output = format_output(&value, OutputFormat::Pretty).unwrap();
        assert!(output.contains("diagnostics\n  -\n    kind: unresolved_type\n    subject: Order.When"));
    }
}
