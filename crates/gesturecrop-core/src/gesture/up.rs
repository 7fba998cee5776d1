//! Reports the end of a touch sequence.

use super::{TouchEvent, TouchPhase, UpListener};

#[derive(Debug, Clone, Copy, Default)]
pub struct UpDetector;

impl UpDetector {
    pub fn new() -> Self {
        Self
    }

    /// Returns `true` for `Up` and `Cancel`, after notifying the listener.
    pub fn on_touch_event(&mut self, event: &TouchEvent, listener: &mut dyn UpListener) -> bool {
        match event.phase {
            TouchPhase::Up | TouchPhase::Cancel => {
                listener.on_up(event.primary().unwrap_or_default());
                true
            }
            _ => false,
        }
    }
}
