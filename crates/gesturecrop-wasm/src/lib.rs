//! Gesturecrop WASM - WebAssembly bindings for the crop surface
//!
//! This crate exposes gesturecrop-core to JavaScript/TypeScript pages that
//! paint the image and crop overlay themselves (canvas, WebGL, DOM).
//!
//! # Module Structure
//!
//! - `surface` - `JsCropSurface`, the interactive crop surface
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSurface } from '@gesturecrop/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const surface = new JsCropSurface();
//! surface.set_viewport(0, 0, 800, 600);
//! surface.set_image(bitmap.width, bitmap.height);
//! ```

use wasm_bindgen::prelude::*;

mod surface;

pub use surface::JsCropSurface;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Rubber-band pass rate for a scroll `distance` px past the edge.
#[wasm_bindgen]
pub fn scroll_passrate(distance: f64, damping_distance: f64) -> f64 {
    gesturecrop_core::compute_scroll_passrate(distance, damping_distance)
}

/// Rubber-band pass rate for a zoom `scale` away from the fit scale.
#[wasm_bindgen]
pub fn scale_passrate(scale: f64, damping_scale: f64) -> f64 {
    gesturecrop_core::compute_scale_passrate(scale, damping_scale)
}
