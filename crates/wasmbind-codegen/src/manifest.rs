//! `package.json` manifest for the generated module.

use serde::Serialize;
use wasmbind_core::{Error, Result};

/// Runtime module file name.
pub const RUNTIME_FILE: &str = "lib.js";
/// Declaration overlay file name.
pub const OVERLAY_FILE: &str = "types.d.ts";
/// Manifest file name.
pub const MANIFEST_FILE: &str = "package.json";

/// The static npm manifest. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
    /// Module name
    pub name: String,
    /// Module version
    pub version: String,
    /// Runtime entry point
    pub main: String,
    /// Declaration entry point
    pub types: String,
    /// Always `module`: the runtime uses ES module syntax
    #[serde(rename = "type")]
    pub module_type: String,
    /// Files shipped with the module
    pub files: Vec<String>,
}

impl PackageManifest {
    /// Builds the manifest for a module bundling `wasm_binary` and `glue_script`.
    #[must_use]
    pub fn new(name: &str, version: &str, wasm_binary: &str, glue_script: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            main: RUNTIME_FILE.to_string(),
            types: OVERLAY_FILE.to_string(),
            module_type: "module".to_string(),
            files: vec![
                RUNTIME_FILE.to_string(),
                OVERLAY_FILE.to_string(),
                wasm_binary.to_string(),
                glue_script.to_string(),
            ],
        }
    }

    /// Serializes the manifest as pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationError`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self).map_err(|e| Error::SerializationError {
            message: "failed to serialize package.json".to_string(),
            source: Some(e),
        })?;
        json.push('\n');
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_contents() {
        let manifest = PackageManifest::new("@shop/cart", "2.1.0", "main.wasm", "wasm_exec.js");
        let json: serde_json::Value = serde_json::from_str(&manifest.to_json().unwrap()).unwrap();
        assert_eq!(json["name"], "@shop/cart");
        assert_eq!(json["version"], "2.1.0");
        assert_eq!(json["main"], "lib.js");
        assert_eq!(json["types"], "types.d.ts");
        assert_eq!(json["type"], "module");
        assert_eq!(
            json["files"],
            serde_json::json!(["lib.js", "types.d.ts", "main.wasm", "wasm_exec.js"])
        );
    }

    #[test]
    fn test_manifest_key_order_is_fixed() {
        let text = PackageManifest::new("m", "1.0.0", "a.wasm", "g.js")
            .to_json()
            .unwrap();
        let positions: Vec<_> = ["\"name\"", "\"version\"", "\"main\"", "\"types\"", "\"type\"", "\"files\""]
            .iter()
            .map(|key| text.find(key).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.ends_with("}\n"));
    }
}
