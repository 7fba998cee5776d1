//! Axis-aligned rectangles in display space.

use glam::{DAffine2, DVec2};
use serde::{Deserialize, Serialize};

/// Width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Swap width and height (a quarter turn of the content).
    pub fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// Axis-aligned rectangle stored as edges.
///
/// Rectangles produced by this crate are normalized (`left <= right`,
/// `top <= bottom`). A rectangle with zero or negative extent on either
/// axis is considered empty.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle of the given size centered on `center`.
    pub fn from_center(center: DVec2, width: f64, height: f64) -> Self {
        let half_w = width * 0.5;
        let half_h = height * 0.5;
        Self::new(
            center.x - half_w,
            center.y - half_h,
            center.x + half_w,
            center.y + half_h,
        )
    }

    /// Smallest rectangle containing every point. Returns an empty default
    /// rectangle when the iterator yields nothing.
    pub fn bounding(points: impl IntoIterator<Item = DVec2>) -> Self {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        let mut any = false;
        for p in points {
            min = min.min(p);
            max = max.max(p);
            any = true;
        }
        if !any {
            return Self::default();
        }
        Self::new(min.x, min.y, max.x, max.y)
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    #[inline]
    pub fn center(&self) -> DVec2 {
        DVec2::new(
            (self.left + self.right) * 0.5,
            (self.top + self.bottom) * 0.5,
        )
    }

    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
    }

    /// Swap edges so that `left <= right` and `top <= bottom`.
    pub fn normalized(&self) -> Self {
        Self::new(
            self.left.min(self.right),
            self.top.min(self.bottom),
            self.left.max(self.right),
            self.top.max(self.bottom),
        )
    }

    /// Corners in the order left-top, right-top, left-bottom, right-bottom.
    pub fn corners(&self) -> [DVec2; 4] {
        [
            DVec2::new(self.left, self.top),
            DVec2::new(self.right, self.top),
            DVec2::new(self.left, self.bottom),
            DVec2::new(self.right, self.bottom),
        ]
    }

    pub fn contains_point(&self, p: DVec2) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }

    /// True when `other` lies entirely inside `self` (edges may touch).
    pub fn contains(&self, other: &Rect) -> bool {
        !self.is_empty()
            && other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }

    /// Overlapping region, or `None` when the rectangles do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        (!r.is_empty()).then_some(r)
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Rect {
        Rect::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Translate (never resize) so the rectangle sits inside `bound` on every
    /// axis where it fits. Axes where it is larger than `bound` are left alone.
    pub fn shifted_into(&self, bound: &Rect) -> Rect {
        let mut dx = 0.0;
        let mut dy = 0.0;
        if self.width() <= bound.width() {
            if self.left < bound.left {
                dx = bound.left - self.left;
            } else if self.right > bound.right {
                dx = bound.right - self.right;
            }
        }
        if self.height() <= bound.height() {
            if self.top < bound.top {
                dy = bound.top - self.top;
            } else if self.bottom > bound.bottom {
                dy = bound.bottom - self.bottom;
            }
        }
        self.offset(dx, dy)
    }

    /// Mirror across the main diagonal: x and y swap roles.
    pub fn transposed(&self) -> Rect {
        Rect::new(self.top, self.left, self.bottom, self.right)
    }

    pub fn approx_eq(&self, other: &Rect, precision: f64) -> bool {
        (self.left - other.left).abs() < precision
            && (self.top - other.top).abs() < precision
            && (self.right - other.right).abs() < precision
            && (self.bottom - other.bottom).abs() < precision
    }
}

/// Bounding box of `rect`'s four corners after `transform` is applied.
pub fn map_rect_bounds(transform: &DAffine2, rect: &Rect) -> Rect {
    Rect::bounding(rect.corners().map(|c| transform.transform_point2(c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensions_and_center() {
        let r = Rect::new(10.0, 20.0, 110.0, 70.0);
        assert_eq!(r.width(), 100.0);
        assert_eq!(r.height(), 50.0);
        assert_eq!(r.center(), DVec2::new(60.0, 45.0));
        assert!(!r.is_empty());
    }

    #[test]
    fn test_empty_rect() {
        assert!(Rect::default().is_empty());
        assert!(Rect::new(0.0, 0.0, 10.0, 0.0).is_empty());
        assert!(Rect::new(0.0, 0.0, f64::NAN, 10.0).is_empty());
    }

    #[test]
    fn test_normalized_swaps_edges() {
        let r = Rect::new(10.0, 10.0, 0.0, 0.0).normalized();
        assert_eq!(r, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, -10.0, 150.0, 40.0);
        assert_eq!(a.intersect(&b), Some(Rect::new(50.0, 0.0, 100.0, 40.0)));

        let c = Rect::new(200.0, 200.0, 300.0, 300.0);
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_contains() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains(&Rect::new(10.0, 10.0, 90.0, 90.0)));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&Rect::new(-1.0, 10.0, 90.0, 90.0)));
    }

    #[test]
    fn test_shifted_into() {
        let bound = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r = Rect::new(-20.0, 90.0, 30.0, 120.0).shifted_into(&bound);
        assert_eq!(r, Rect::new(0.0, 70.0, 50.0, 100.0));

        // Too wide to fit horizontally: x untouched
        let wide = Rect::new(-20.0, 10.0, 130.0, 20.0).shifted_into(&bound);
        assert_eq!(wide.left, -20.0);
    }

    #[test]
    fn test_bounding_of_rotated_square() {
        let t = DAffine2::from_angle(std::f64::consts::FRAC_PI_4);
        let b = map_rect_bounds(&t, &Rect::new(-1.0, -1.0, 1.0, 1.0));
        let half_diag = 2.0_f64.sqrt();
        assert!((b.width() - 2.0 * half_diag).abs() < 1e-9);
        assert!((b.height() - 2.0 * half_diag).abs() < 1e-9);
    }

    #[test]
    fn test_transposed_round_trip() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(r.transposed().transposed(), r);
        assert_eq!(r.transposed().width(), r.height());
    }
}
