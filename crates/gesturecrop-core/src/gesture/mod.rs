//! Touch input model and gesture detectors.
//!
//! Each detector consumes [`TouchEvent`]s and reports through one narrow
//! listener trait. Every trait method has a no-op default and `()` implements
//! every trait, so a host wires up only what it needs.

mod hover;
mod scale_rotate;
mod tap_scroll;
mod up;

pub use hover::HoverDetector;
pub use scale_rotate::{ScaleRotateDetector, ScaleRotateSample};
pub use tap_scroll::TapScrollDetector;
pub use up::UpDetector;

use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    /// First contact.
    Down,
    Move,
    /// Last contact lifted.
    Up,
    Cancel,
    /// An additional contact arrived.
    PointerDown,
    /// A contact other than the last one lifted.
    PointerUp,
}

impl TouchPhase {
    /// Parse the snake_case name used by hosts (`"down"`, `"pointer_up"`...).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "down" => Some(Self::Down),
            "move" => Some(Self::Move),
            "up" => Some(Self::Up),
            "cancel" => Some(Self::Cancel),
            "pointer_down" => Some(Self::PointerDown),
            "pointer_up" => Some(Self::PointerUp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub fn new(id: u32, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// One touch sample.
///
/// `pointers` lists every contact on screen, including the one that is
/// lifting during `Up`/`PointerUp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub pointers: Vec<Pointer>,
    pub timestamp_ms: f64,
    /// Index into `pointers` of the contact that went down or up.
    #[serde(default)]
    pub action_index: usize,
}

impl TouchEvent {
    pub fn new(phase: TouchPhase, pointers: Vec<Pointer>, timestamp_ms: f64) -> Self {
        Self {
            phase,
            pointers,
            timestamp_ms,
            action_index: 0,
        }
    }

    pub fn with_action_index(mut self, index: usize) -> Self {
        self.action_index = index;
        self
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    /// Position of the first contact.
    pub fn primary(&self) -> Option<DVec2> {
        self.pointers.first().map(Pointer::position)
    }

    /// Average position of the contacts that stay down after this event.
    pub fn focus(&self) -> Option<DVec2> {
        let skip = match self.phase {
            TouchPhase::PointerUp => Some(self.action_index),
            _ => None,
        };
        let mut sum = DVec2::ZERO;
        let mut count = 0usize;
        for (i, p) in self.pointers.iter().enumerate() {
            if Some(i) != skip {
                sum += p.position();
                count += 1;
            }
        }
        (count > 0).then(|| sum / count as f64)
    }
}

pub trait TapListener {
    fn on_single_tap(&mut self, _point: DVec2) {}

    fn on_double_tap(&mut self, _point: DVec2) {}
}

pub trait ScrollListener {
    /// `distance` follows the `previous - current` convention.
    fn on_scroll(&mut self, _distance: DVec2) {}
}

pub trait ScaleRotateListener {
    fn on_scale_rotate_begin(&mut self, _sample: &ScaleRotateSample) {}

    fn on_scale_rotate(&mut self, _sample: &ScaleRotateSample) {}

    fn on_scale_rotate_end(&mut self, _sample: &ScaleRotateSample) {}
}

pub trait HoverListener {
    fn on_hover(&mut self, _point: DVec2) {}

    fn on_hover_leave(&mut self, _point: DVec2) {}
}

pub trait UpListener {
    fn on_up(&mut self, _point: DVec2) {}
}

impl TapListener for () {}
impl ScrollListener for () {}
impl ScaleRotateListener for () {}
impl HoverListener for () {}
impl UpListener for () {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_names() {
        assert_eq!(TouchPhase::from_name("pointer_down"), Some(TouchPhase::PointerDown));
        assert_eq!(TouchPhase::from_name("up"), Some(TouchPhase::Up));
        assert_eq!(TouchPhase::from_name("tap"), None);
    }

    #[test]
    fn test_focus_skips_lifting_pointer() {
        let event = TouchEvent::new(
            TouchPhase::PointerUp,
            vec![Pointer::new(0, 0.0, 0.0), Pointer::new(1, 100.0, 50.0)],
            0.0,
        )
        .with_action_index(1);
        assert_eq!(event.focus(), Some(DVec2::ZERO));

        let moving = TouchEvent::new(TouchPhase::Move, event.pointers.clone(), 0.0);
        assert_eq!(moving.focus(), Some(DVec2::new(50.0, 25.0)));
    }

    #[test]
    fn test_empty_event() {
        let event = TouchEvent::new(TouchPhase::Cancel, Vec::new(), 0.0);
        assert_eq!(event.primary(), None);
        assert_eq!(event.focus(), None);
    }
}
