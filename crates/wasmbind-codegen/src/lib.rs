//! Binding generation for wasmbind.
//!
//! Transforms the declaration model into a TypeScript declaration overlay,
//! a JavaScript runtime module that boots the compiled WebAssembly binary,
//! an npm manifest, and the Go marshalling wrappers compiled into that
//! binary. Rendering goes through Handlebars templates.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod generator;
mod golang;
pub mod manifest;
pub mod template_engine;
pub mod types;
pub mod typescript;

pub use generator::{GeneratorOptions, TargetGenerator, TypeScriptGenerator, wrapper_file_name};
pub use template_engine::TemplateEngine;
pub use types::{GeneratedCode, GeneratedFile};
