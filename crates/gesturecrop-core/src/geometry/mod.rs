//! Geometry helpers shared by the animator and the clip solver.
//!
//! The affine primitive is `glam::DAffine2`; everything here works in f64
//! display-space coordinates with the origin at the top-left and y pointing
//! down, so a positive rotation angle turns content clockwise on screen.

mod rect;

pub use rect::{map_rect_bounds, Rect, Size};

use glam::DVec2;

pub type Point = DVec2;

/// Extents at or below this are treated as degenerate.
pub const MIN_EXTENT: f64 = 1e-6;

/// Largest uniform scale such that a `src_w x src_h` box fits entirely inside
/// a `limit_w x limit_h` box.
///
/// Degenerate (zero, negative or non-finite) source sizes yield `1.0` so
/// callers never multiply by infinity.
pub fn fit_inside_scale(src_w: f64, src_h: f64, limit_w: f64, limit_h: f64) -> f64 {
    if !(src_w > MIN_EXTENT && src_h > MIN_EXTENT) || !src_w.is_finite() || !src_h.is_finite() {
        return 1.0;
    }
    let scale = (limit_w / src_w).min(limit_h / src_h);
    if scale.is_finite() {
        scale
    } else {
        1.0
    }
}

/// Foot of the perpendicular dropped from `p` onto the line through `a` and `b`.
///
/// Horizontal and vertical lines project straight across; a zero-length
/// segment has no direction and yields `None`.
pub fn perpendicular_intersection(a: DVec2, b: DVec2, p: DVec2) -> Option<DVec2> {
    let dir = b - a;
    if dir.x == 0.0 && dir.y == 0.0 {
        None
    } else if dir.y == 0.0 {
        Some(DVec2::new(p.x, a.y))
    } else if dir.x == 0.0 {
        Some(DVec2::new(a.x, p.y))
    } else {
        let t = (p - a).dot(dir) / dir.length_squared();
        let foot = a + dir * t;
        foot.is_finite().then_some(foot)
    }
}
