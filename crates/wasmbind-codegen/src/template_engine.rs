//! Template engine for code generation using Handlebars.
//!
//! Wraps Handlebars with the built-in wasmbind templates pre-registered.
//! Output is source code, not HTML, so escaping is disabled.
//!
//! # Examples
//!
//! ```
//! use wasmbind_codegen::TemplateEngine;
//! use serde_json::json;
//!
//! let mut engine = TemplateEngine::new().unwrap();
//! engine.register_template_string("greeting", "export const name = \"{{name}}\";").unwrap();
//! let out = engine.render("greeting", &json!({"name": "<shop>"})).unwrap();
//! assert_eq!(out, "export const name = \"<shop>\";");
//! ```

use handlebars::Handlebars;
use serde::Serialize;
use wasmbind_core::{Error, Result};

/// Name of the declaration overlay template.
pub const OVERLAY_TEMPLATE: &str = "typescript/overlay";
/// Name of the JavaScript runtime module template.
pub const RUNTIME_TEMPLATE: &str = "typescript/runtime";
/// Name of the Go wrapper template.
pub const WRAPPER_TEMPLATE: &str = "go/wrapper";

/// Template engine for code generation.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`, allowing it to be used across
/// thread boundaries safely.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl<'a> TemplateEngine<'a> {
    /// Creates a new template engine with the built-in templates registered.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if a built-in template fails to
    /// register.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Strict mode: fail on missing variables
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        for (name, source) in [
            (OVERLAY_TEMPLATE, include_str!("../templates/types.d.ts.hbs")),
            (RUNTIME_TEMPLATE, include_str!("../templates/lib.js.hbs")),
            (WRAPPER_TEMPLATE, include_str!("../templates/wrapper.go.hbs")),
        ] {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| Error::TemplateError {
                    template: name.to_string(),
                    message: format!("failed to register built-in template: {e}"),
                })?;
        }

        Ok(Self { handlebars })
    }

    /// Renders a template with the given context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if the template is not registered,
    /// the context is missing a referenced value, or rendering fails.
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::TemplateError {
                template: template_name.to_string(),
                message: format!("rendering failed: {e}"),
            })
    }

    /// Registers an additional template, replacing any template of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TemplateError`] if the template string is invalid.
    pub fn register_template_string(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| Error::TemplateError {
                template: name.to_string(),
                message: format!("failed to register template: {e}"),
            })
    }
}
