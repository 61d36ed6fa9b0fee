//! WASM bindings for browser and Node toolchain hosts.
//!
//! This module exposes the stylesheet transform to JavaScript via
//! wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::preset::{Options, Preset};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Transform a stylesheet with default options.
#[wasm_bindgen]
pub fn transform_css(css: &str) -> Result<String, JsValue> {
    crate::process(css).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Transform a stylesheet with an explicit root font size and px->rem
/// conversion toggle.
#[wasm_bindgen]
pub fn transform_css_with_options(
    css: &str,
    root_font_size: f64,
    auto_rem: bool,
) -> Result<String, JsValue> {
    let options = Options::default()
        .with_root_font_size(root_font_size)
        .with_auto_rem(auto_rem);
    let preset = Preset::new(options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    preset
        .process(css)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Rewrite a single declaration value with default options.
#[wasm_bindgen]
pub fn rewrite_declaration_value(value: &str) -> Result<String, JsValue> {
    let preset =
        Preset::new(Options::default()).map_err(|e| JsValue::from_str(&e.to_string()))?;
    preset
        .rewrite_value(value)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
