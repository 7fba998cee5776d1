//! Crop surface WASM bindings.
//!
//! A [`JsCropSurface`] is driven from the page: pointer events go into
//! [`JsCropSurface::touch`], `requestAnimationFrame` calls
//! [`JsCropSurface::tick`] and paints from [`JsCropSurface::frame`] or the
//! cheaper [`JsCropSurface::transform`].
//!
//! # Example
//!
//! ```typescript
//! import { JsCropSurface } from '@gesturecrop/wasm';
//!
//! const surface = new JsCropSurface({ density: devicePixelRatio });
//! surface.set_viewport(0, 0, canvas.width, canvas.height);
//! surface.load_image(new Uint8Array(await file.arrayBuffer()));
//!
//! const loop = () => {
//!   const more = surface.tick();
//!   ctx.setTransform(...surface.transform());
//!   ctx.drawImage(bitmap, 0, 0);
//!   if (more) requestAnimationFrame(loop);
//! };
//! ```

use gesturecrop_core::decode::{probe_image, DecodeError, DecodeEvent, ImageInfo};
use gesturecrop_core::{ConfigError, CropSurface, Pointer, SurfaceConfig, TouchEvent, TouchPhase};
use wasm_bindgen::prelude::*;

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Zip parallel coordinate arrays into pointers. `None` when lengths differ.
fn pointers(xs: &[f64], ys: &[f64], ids: &[u32]) -> Option<Vec<Pointer>> {
    if xs.len() != ys.len() || xs.len() != ids.len() {
        return None;
    }
    Some(
        ids.iter()
            .zip(xs.iter().zip(ys))
            .map(|(&id, (&x, &y))| Pointer::new(id, x, y))
            .collect(),
    )
}

/// Interactive crop surface for JavaScript.
#[wasm_bindgen]
pub struct JsCropSurface {
    inner: CropSurface,
}

#[wasm_bindgen]
impl JsCropSurface {
    /// Create a surface.
    ///
    /// # Arguments
    /// * `config` - Optional partial `SurfaceConfig` object; missing fields
    ///   take their defaults
    ///
    /// # Errors
    /// Returns error if the config cannot be deserialized or is out of range
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsCropSurface, JsValue> {
        let config: SurfaceConfig = if config.is_undefined() || config.is_null() {
            SurfaceConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid surface config: {}", e)))?
        };
        Self::with_config(config).map_err(to_js_error)
    }

    pub fn set_viewport(&mut self, left: f64, top: f64, right: f64, bottom: f64) {
        self.inner.set_viewport(left, top, right, bottom);
    }

    /// Show an already-decoded image of the given size.
    pub fn set_image(&mut self, width: f64, height: f64) -> bool {
        self.inner.set_image(width, height)
    }

    /// Read the size and EXIF orientation from encoded bytes and show the
    /// image upright. Pixels are not decoded here.
    ///
    /// # Errors
    /// Returns error if the bytes are not a supported image
    pub fn load_image(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.begin_decode();
        let event = match probe_image(bytes) {
            Ok(info) => DecodeEvent::Decoded(info),
            Err(e) => DecodeEvent::Failed(e),
        };
        self.inner.on_decode_event(event).map_err(to_js_error)
    }

    /// Start tracking a decode run by the page (e.g. `createImageBitmap`).
    pub fn begin_decode(&mut self) {
        self.inner.begin_decode();
    }

    /// # Errors
    /// Returns error if the decode service reported a failure
    pub fn decode_progress(&mut self, progress: f32) -> Result<(), JsValue> {
        self.inner
            .on_decode_event(DecodeEvent::Progress(progress))
            .map_err(to_js_error)
    }

    /// Show the decoded image. Ignored when the decode already finished.
    ///
    /// # Errors
    /// Returns error if the decode service reported a failure
    pub fn decode_finished(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.inner
            .on_decode_event(DecodeEvent::Decoded(ImageInfo::new(width, height)))
            .map_err(to_js_error)
    }

    /// # Errors
    /// Echoes `message` back as the error once the failure is accepted
    pub fn decode_failed(&mut self, message: String) -> Result<(), JsValue> {
        self.inner
            .on_decode_event(DecodeEvent::Failed(DecodeError::Failed(message)))
            .map_err(to_js_error)
    }

    /// Feed one pointer sample.
    ///
    /// # Arguments
    /// * `phase` - `"down"`, `"move"`, `"up"`, `"cancel"`, `"pointer_down"` or `"pointer_up"`
    /// * `xs`, `ys`, `ids` - Every contact currently on the surface
    /// * `action_index` - Index of the contact that went down or up
    /// * `timestamp_ms` - Event time in milliseconds
    ///
    /// # Errors
    /// Returns error on an unknown phase or mismatched array lengths
    pub fn touch(
        &mut self,
        phase: &str,
        xs: &[f64],
        ys: &[f64],
        ids: &[u32],
        action_index: usize,
        timestamp_ms: f64,
    ) -> Result<bool, JsValue> {
        let phase = TouchPhase::from_name(phase)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown touch phase: {}", phase)))?;
        let pointers = pointers(xs, ys, ids)
            .ok_or_else(|| JsValue::from_str("xs, ys and ids must have the same length"))?;
        let event = TouchEvent::new(phase, pointers, timestamp_ms).with_action_index(action_index);
        Ok(self.inner.on_touch_event(&event))
    }

    /// Advance animations one frame. Returns true while more frames are needed.
    pub fn tick(&mut self) -> bool {
        self.inner.tick()
    }

    /// Full frame state as a plain object.
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn frame(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.frame()).map_err(to_js_error)
    }

    /// Current image transform as `[a, b, c, d, e, f]` for `setTransform`.
    pub fn transform(&self) -> js_sys::Float64Array {
        js_sys::Float64Array::from(&self.inner.frame().transform[..])
    }

    pub fn revert(&mut self, with_animation: bool) {
        self.inner.revert(with_animation);
    }

    pub fn rotate(&mut self, degrees: f64) {
        self.inner.rotate(degrees);
    }

    pub fn rotate_direction(&mut self, clockwise: bool) {
        self.inner.rotate_direction(clockwise);
    }

    /// Fix the crop aspect ratio (width / height); `0` frees it.
    ///
    /// Returns true if the crop frame changed.
    pub fn set_ratio(&mut self, ratio: f64) -> bool {
        self.inner.change_clip_ratio(ratio).is_some()
    }

    /// Crop as `[left, top, right, bottom]` in `[0, 1]` image coordinates.
    pub fn crop_rect(&self) -> Option<Vec<f64>> {
        self.inner
            .crop_rect()
            .map(|r| vec![r.left, r.top, r.right, r.bottom])
    }
}

impl JsCropSurface {
    pub(crate) fn with_config(config: SurfaceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: CropSurface::new(config)?,
        })
    }
}
