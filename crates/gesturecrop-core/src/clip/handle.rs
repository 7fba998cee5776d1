//! Crop-frame handles and hit-testing.

use bitflags::bitflags;
use glam::DVec2;

use crate::geometry::Rect;

bitflags! {
    /// Which edges of the crop frame a touch grabbed. Two adjacent bits make
    /// a corner.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Handle: u8 {
        const LEFT = 0b0001;
        const TOP = 0b0010;
        const RIGHT = 0b0100;
        const BOTTOM = 0b1000;

        const LEFT_TOP = Self::LEFT.bits() | Self::TOP.bits();
        const TOP_RIGHT = Self::TOP.bits() | Self::RIGHT.bits();
        const RIGHT_BOTTOM = Self::RIGHT.bits() | Self::BOTTOM.bits();
        const BOTTOM_LEFT = Self::BOTTOM.bits() | Self::LEFT.bits();
    }
}

impl Handle {
    pub fn is_corner(self) -> bool {
        self.intersects(Self::LEFT | Self::RIGHT) && self.intersects(Self::TOP | Self::BOTTOM)
    }

    /// The handle with every edge swapped for its mirror across the main
    /// diagonal (left <-> top, right <-> bottom).
    pub fn transposed(self) -> Self {
        let mut out = Self::empty();
        if self.contains(Self::LEFT) {
            out |= Self::TOP;
        }
        if self.contains(Self::TOP) {
            out |= Self::LEFT;
        }
        if self.contains(Self::RIGHT) {
            out |= Self::BOTTOM;
        }
        if self.contains(Self::BOTTOM) {
            out |= Self::RIGHT;
        }
        out
    }
}

/// Classify a touch against the frame `rect`.
///
/// A touch grabs an edge when it lies within `corner_length` of it and inside
/// the frame grown by `corner_length` on every side. When the frame is so
/// small that both opposite bands overlap, the nearer edge wins.
pub fn detect_handle(rect: &Rect, point: DVec2, corner_length: f64) -> Handle {
    let reach = Rect::new(
        rect.left - corner_length,
        rect.top - corner_length,
        rect.right + corner_length,
        rect.bottom + corner_length,
    );
    if rect.is_empty() || !reach.contains_point(point) {
        return Handle::empty();
    }

    let pick = |pos: f64, lo: f64, hi: f64, lo_flag: Handle, hi_flag: Handle| {
        let near_lo = (pos - lo).abs() <= corner_length;
        let near_hi = (pos - hi).abs() <= corner_length;
        match (near_lo, near_hi) {
            (true, true) if (pos - hi).abs() < (pos - lo).abs() => hi_flag,
            (true, _) => lo_flag,
            (false, true) => hi_flag,
            (false, false) => Handle::empty(),
        }
    };

    pick(point.x, rect.left, rect.right, Handle::LEFT, Handle::RIGHT)
        | pick(point.y, rect.top, rect.bottom, Handle::TOP, Handle::BOTTOM)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Rect {
        Rect::new(100.0, 100.0, 300.0, 200.0)
    }

    #[test]
    fn test_edges() {
        let r = frame();
        assert_eq!(detect_handle(&r, DVec2::new(95.0, 150.0), 16.0), Handle::LEFT);
        assert_eq!(detect_handle(&r, DVec2::new(310.0, 150.0), 16.0), Handle::RIGHT);
        assert_eq!(detect_handle(&r, DVec2::new(200.0, 112.0), 16.0), Handle::TOP);
        assert_eq!(detect_handle(&r, DVec2::new(200.0, 190.0), 16.0), Handle::BOTTOM);
    }

    #[test]
    fn test_corners() {
        let r = frame();
        assert_eq!(detect_handle(&r, DVec2::new(102.0, 98.0), 16.0), Handle::LEFT_TOP);
        assert_eq!(
            detect_handle(&r, DVec2::new(305.0, 210.0), 16.0),
            Handle::RIGHT_BOTTOM
        );
        assert!(Handle::BOTTOM_LEFT.is_corner());
        assert!(!Handle::LEFT.is_corner());
    }

    #[test]
    fn test_interior_and_far_away_miss() {
        let r = frame();
        assert!(detect_handle(&r, DVec2::new(200.0, 150.0), 16.0).is_empty());
        // in the left band horizontally but far below the frame
        assert!(detect_handle(&r, DVec2::new(100.0, 400.0), 16.0).is_empty());
    }

    #[test]
    fn test_tiny_frame_prefers_nearer_edge() {
        let r = Rect::new(0.0, 0.0, 10.0, 100.0);
        assert_eq!(detect_handle(&r, DVec2::new(8.0, 50.0), 16.0), Handle::RIGHT);
        assert_eq!(detect_handle(&r, DVec2::new(2.0, 50.0), 16.0), Handle::LEFT);
    }

    #[test]
    fn test_transposed() {
        assert_eq!(Handle::LEFT.transposed(), Handle::TOP);
        assert_eq!(Handle::TOP_RIGHT.transposed(), Handle::BOTTOM_LEFT);
        assert_eq!(Handle::RIGHT_BOTTOM.transposed(), Handle::RIGHT_BOTTOM);
        assert_eq!(Handle::BOTTOM.transposed(), Handle::RIGHT);
    }
}
