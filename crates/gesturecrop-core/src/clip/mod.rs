//! Crop rectangle: handle hit-testing and constrained resizing.

mod handle;
mod solver;

pub use handle::{detect_handle, Handle};
pub use solver::{ClipRectSolver, FREE_RATIO};

use crate::geometry::Rect;

/// Callbacks fired while the user drags a crop handle.
pub trait ClipChangeListener {
    fn on_clip_start(&mut self, _clip: &Rect) {}

    fn on_clip_changing(&mut self, _clip: &Rect) {}

    /// Called on release. A returned rectangle becomes the new crop frame
    /// and the displayed frame animates toward it.
    fn on_clip_stop(&mut self, _clip: &Rect) -> Option<Rect> {
        None
    }
}

impl ClipChangeListener for () {}
