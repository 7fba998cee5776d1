//! Tunable constants for the crop surface.
//!
//! All structs deserialize with missing fields taking their defaults, so a
//! host only needs to send the values it wants to override.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected configuration value.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite and positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn in_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Factor and termination threshold of one smoother.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmootherConfig {
    pub factor: f64,
    pub error_threshold: f64,
}

impl SmootherConfig {
    pub const fn new(factor: f64, error_threshold: f64) -> Self {
        Self {
            factor,
            error_threshold,
        }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.factor > 0.0 && self.factor <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field,
                value: self.factor,
                min: f64::MIN_POSITIVE,
                max: 1.0,
            });
        }
        in_range(field, self.error_threshold, 0.0, f64::MAX)
    }
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self::new(1e-2, 1e-3)
    }
}

/// Two-pointer and single-pointer gesture tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    pub smooth_scale: bool,
    pub smooth_rotate: bool,
    /// Use the contacts' midpoint as scale pivot instead of the first contact.
    pub center_pivot_for_scale: bool,
    pub center_pivot_for_rotate: bool,
    pub scale_smoother: SmootherConfig,
    pub rotate_smoother: SmootherConfig,
    /// Lower bound of the reported scale factor.
    pub min_scale_factor: f64,
    /// Movement in px before a single pointer starts scrolling.
    pub touch_slop: f64,
    pub double_tap_timeout_ms: f64,
    pub double_tap_slop: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            smooth_scale: true,
            smooth_rotate: true,
            center_pivot_for_scale: true,
            center_pivot_for_rotate: true,
            scale_smoother: SmootherConfig::new(0.5, 0.05),
            rotate_smoother: SmootherConfig::new(0.5, 0.05),
            min_scale_factor: 0.01,
            touch_slop: 8.0,
            double_tap_timeout_ms: 300.0,
            double_tap_slop: 100.0,
        }
    }
}

impl GestureConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scale_smoother.validate("gesture.scale_smoother")?;
        self.rotate_smoother.validate("gesture.rotate_smoother")?;
        in_range("gesture.min_scale_factor", self.min_scale_factor, 1e-6, 1.0)?;
        in_range("gesture.touch_slop", self.touch_slop, 0.0, f64::MAX)?;
        positive("gesture.double_tap_timeout_ms", self.double_tap_timeout_ms)?;
        in_range("gesture.double_tap_slop", self.double_tap_slop, 0.0, f64::MAX)
    }
}

/// Everything the crop surface needs at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Physical pixels per density-independent pixel.
    pub density: f64,
    pub damping_distance_dp: f64,
    pub damping_scale: f64,
    pub zoom_in_multiplier: f64,
    pub corner_length_dp: f64,
    pub line_width_dp: f64,
    pub clip_smoother: SmootherConfig,
    pub alpha_smoother: SmootherConfig,
    pub enable_rotate_gesture: bool,
    pub enable_scale_gesture: bool,
    pub enable_translate_gesture: bool,
    pub gesture: GestureConfig,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            density: 1.0,
            damping_distance_dp: 100.0,
            damping_scale: 0.2,
            zoom_in_multiplier: 5.0,
            corner_length_dp: 16.0,
            line_width_dp: 2.0,
            clip_smoother: SmootherConfig::new(0.2, 1e-3),
            alpha_smoother: SmootherConfig::new(0.2, 1e-3),
            enable_rotate_gesture: false,
            enable_scale_gesture: true,
            enable_translate_gesture: true,
            gesture: GestureConfig::default(),
        }
    }
}

impl SurfaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("density", self.density)?;
        positive("damping_distance_dp", self.damping_distance_dp)?;
        positive("damping_scale", self.damping_scale)?;
        in_range("zoom_in_multiplier", self.zoom_in_multiplier, 1.0, 1e3)?;
        positive("corner_length_dp", self.corner_length_dp)?;
        in_range("line_width_dp", self.line_width_dp, 0.0, f64::MAX)?;
        self.clip_smoother.validate("clip_smoother")?;
        self.alpha_smoother.validate("alpha_smoother")?;
        self.gesture.validate()
    }

    pub fn damping_distance_px(&self) -> f64 {
        self.damping_distance_dp * self.density
    }

    pub fn corner_length_px(&self) -> f64 {
        self.corner_length_dp * self.density
    }

    pub fn line_width_px(&self) -> f64 {
        self.line_width_dp * self.density
    }
}
