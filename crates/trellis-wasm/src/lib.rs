//! WASM bindings for the Trellis compiler.
//!
//! Exposes `convert()` to JavaScript via wasm-bindgen.
//! Returns a JS object `{ markup, stylesheet, behavior, warnings }` or throws on error.

use serde::Deserialize;
use trellis_codegen::{CompilerOutput, ConvertError, ConvertOptions};
use trellis_model::AnalysisConfig;
use wasm_bindgen::prelude::*;

/// Settings object accepted from JavaScript. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConvertRequest {
    options: ConvertOptions,
    config: AnalysisConfig,
    /// Free-text instructions; mentioning "material" enables the widget library.
    instructions: String,
}

fn run(source: &str, request: ConvertRequest) -> Result<CompilerOutput, ConvertError> {
    let mut options = request.options;
    if trellis_model::prefers_structural(&request.instructions) {
        options.use_widget_library = true;
    }
    trellis_codegen::convert_source(source, &options, &request.config)
}

/// Convert a design document (JSON) to an Angular component.
///
/// `settings` is `undefined` or `{ options?, config?, instructions? }`.
/// Returns `{ markup, stylesheet, behavior, warnings }`.
/// Throws a JS error if the document is invalid or structurally broken.
#[wasm_bindgen]
pub fn convert(source: &str, settings: JsValue) -> Result<JsValue, JsError> {
    let request: ConvertRequest = if settings.is_undefined() || settings.is_null() {
        ConvertRequest::default()
    } else {
        serde_wasm_bindgen::from_value(settings).map_err(|e| JsError::new(&e.to_string()))?
    };

    let output = run(source, request).map_err(|e| JsError::new(&e.to_string()))?;

    let warnings = js_sys::Array::new();
    for warning in &output.warnings {
        warnings.push(&JsValue::from_str(warning));
    }

    let js_obj = js_sys::Object::new();
    js_sys::Reflect::set(&js_obj, &"markup".into(), &output.markup.into())
        .map_err(|_| JsError::new("Failed to set markup property"))?;
    js_sys::Reflect::set(&js_obj, &"stylesheet".into(), &output.stylesheet.into())
        .map_err(|_| JsError::new("Failed to set stylesheet property"))?;
    js_sys::Reflect::set(&js_obj, &"behavior".into(), &output.behavior.into())
        .map_err(|_| JsError::new("Failed to set behavior property"))?;
    js_sys::Reflect::set(&js_obj, &"warnings".into(), &warnings.into())
        .map_err(|_| JsError::new("Failed to set warnings property"))?;

    Ok(js_obj.into())
}

/// Get the compiler version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Native tests (non-WASM)
    // =========================================================================

    const BUTTON: &str = r#"[
        { "id": "1", "name": "Toolbar", "type": "FRAME" },
        { "id": "2", "name": "Save Button", "type": "FRAME", "parent_id": "1" }
    ]"#;

    fn native_convert(source: &str) -> CompilerOutput {
        run(source, ConvertRequest::default()).unwrap()
    }

    #[test]
    fn test_empty_document() {
        let output = native_convert("[]");
        assert_eq!(output.markup, "");
        assert_eq!(output.warnings.len(), 1);
    }

    #[test]
    fn test_default_request_uses_material() {
        let output = native_convert(BUTTON);
        assert!(output.markup.starts_with("<mat-toolbar"));
        assert!(output.markup.contains("mat-button"));
        assert!(output.behavior.contains("MatToolbarModule"));
    }

    #[test]
    fn test_instructions_enable_material() {
        let request = ConvertRequest {
            options: ConvertOptions {
                use_widget_library: false,
                ..ConvertOptions::default()
            },
            instructions: "Use Angular Material please".into(),
            ..ConvertRequest::default()
        };
        let output = run(BUTTON, request).unwrap();
        assert!(output.markup.starts_with("<mat-toolbar"));
    }

    #[test]
    fn test_plain_request() {
        let request = ConvertRequest {
            options: ConvertOptions {
                use_widget_library: false,
                ..ConvertOptions::default()
            },
            ..ConvertRequest::default()
        };
        let output = run(BUTTON, request).unwrap();
        assert!(output.markup.starts_with("<nav"));
        assert!(!output.behavior.contains("@angular/material"));
    }

    #[test]
    fn test_structure_error() {
        let err = run(
            r#"[{ "id": "a", "type": "FRAME", "parent_id": "a" }]"#,
            ConvertRequest::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Structure(_)));
    }

    #[test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
        assert!(v.contains('.'));
    }

    #[test]
    fn test_multiple_converts() {
        let first = native_convert(BUTTON);
        let second = native_convert(r#"[{ "id": "9", "name": "Other", "type": "FRAME" }]"#);
        assert!(first.markup.contains("data-node-id=\"2\""));
        assert!(!second.markup.contains("data-node-id=\"2\""));
        assert!(!second.behavior.contains("MatButtonModule"));
    }
}
