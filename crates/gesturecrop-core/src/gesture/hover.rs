//! Hover tracking: reports the contact while it is down.

use super::{HoverListener, TouchEvent, TouchPhase};

#[derive(Debug, Clone, Copy, Default)]
pub struct HoverDetector;

impl HoverDetector {
    pub fn new() -> Self {
        Self
    }

    /// `Down`/`Move` report `on_hover`, `Up`/`Cancel` report `on_hover_leave`.
    pub fn on_touch_event(
        &mut self,
        event: &TouchEvent,
        listener: &mut dyn HoverListener,
    ) -> bool {
        let Some(point) = event.primary() else {
            return false;
        };
        match event.phase {
            TouchPhase::Down | TouchPhase::Move => listener.on_hover(point),
            TouchPhase::Up | TouchPhase::Cancel => listener.on_hover_leave(point),
            TouchPhase::PointerDown | TouchPhase::PointerUp => {}
        }
        true
    }
}
