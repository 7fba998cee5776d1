//! Gesturecrop Core - transform and gesture engine for a crop surface
//!
//! This crate turns raw multi-touch input into an animated image transform
//! and a constrained crop rectangle: pan, pinch, rotate, double-tap zoom,
//! rubber-band resistance at the edges, and crop-frame resizing with an
//! optional fixed aspect ratio. It never paints; a host reads
//! [`surface::FrameState`] each frame and draws it.

pub mod animator;
pub mod clip;
pub mod config;
pub mod decode;
pub mod geometry;
pub mod gesture;
pub mod pose;
pub mod smoother;
pub mod surface;

pub use animator::{compute_scale_passrate, compute_scroll_passrate, Animator};
pub use clip::{ClipChangeListener, ClipRectSolver, Handle, FREE_RATIO};
pub use config::{ConfigError, GestureConfig, SmootherConfig, SurfaceConfig};
pub use decode::{probe_image, DecodeError, DecodeEvent, ImageInfo};
pub use geometry::{Point, Rect, Size};
pub use gesture::{Pointer, TouchEvent, TouchPhase};
pub use pose::Pose;
pub use smoother::{Smoother, SmootherN};
pub use surface::{CropSurface, FrameState};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(SurfaceConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_surface_round_trip() {
        let mut surface = CropSurface::new(SurfaceConfig::default()).unwrap();
        surface.set_viewport(0.0, 0.0, 400.0, 300.0);
        surface.set_image(4000.0, 3000.0);
        while surface.tick() {}

        let crop = surface.crop_rect().unwrap();
        assert!(crop.approx_eq(&Rect::new(0.0, 0.0, 1.0, 1.0), 1e-9));
        let pixels = surface.image_crop_rect().unwrap();
        assert!(pixels.approx_eq(&Rect::new(0.0, 0.0, 4000.0, 3000.0), 1e-6));
    }
}
