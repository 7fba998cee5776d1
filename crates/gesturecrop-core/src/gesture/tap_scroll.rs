//! Tap, double-tap and scroll detection.

use glam::DVec2;

use super::{ScrollListener, TapListener, TouchEvent, TouchPhase};
use crate::config::GestureConfig;

/// Recognizes taps and focus-point scrolls.
///
/// Scroll distances follow the `previous - current` convention. The focus is
/// the average of every contact, so a two-finger pinch also pans the content.
#[derive(Debug, Clone)]
pub struct TapScrollDetector {
    touch_slop: f64,
    double_tap_timeout_ms: f64,
    double_tap_slop: f64,
    down_focus: DVec2,
    last_focus: DVec2,
    in_tap_region: bool,
    in_double_tap: bool,
    /// Position and time of the last completed single tap.
    last_tap: Option<(DVec2, f64)>,
}

impl Default for TapScrollDetector {
    fn default() -> Self {
        Self::new(&GestureConfig::default())
    }
}

impl TapScrollDetector {
    pub fn new(config: &GestureConfig) -> Self {
        Self {
            touch_slop: config.touch_slop,
            double_tap_timeout_ms: config.double_tap_timeout_ms,
            double_tap_slop: config.double_tap_slop,
            down_focus: DVec2::ZERO,
            last_focus: DVec2::ZERO,
            in_tap_region: false,
            in_double_tap: false,
            last_tap: None,
        }
    }

    /// True between the down and up of a touch that has not moved past the slop.
    pub fn is_in_tap_region(&self) -> bool {
        self.in_tap_region
    }

    pub fn on_touch_event<L>(&mut self, event: &TouchEvent, listener: &mut L) -> bool
    where
        L: TapListener + ScrollListener + ?Sized,
    {
        let Some(focus) = event.focus() else {
            return false;
        };

        match event.phase {
            TouchPhase::Down => {
                self.in_double_tap = match self.last_tap.take() {
                    Some((pos, time)) => {
                        event.timestamp_ms - time <= self.double_tap_timeout_ms
                            && pos.distance(focus) <= self.double_tap_slop
                    }
                    None => false,
                };
                if self.in_double_tap {
                    log::trace!("tap: double tap at {focus:?}");
                    listener.on_double_tap(focus);
                }
                self.down_focus = focus;
                self.last_focus = focus;
                self.in_tap_region = true;
            }
            TouchPhase::PointerDown | TouchPhase::PointerUp => {
                // focus jumps when the contact set changes; re-anchor, and a
                // multi-finger touch is never a tap
                self.down_focus = focus;
                self.last_focus = focus;
                self.in_tap_region = false;
                self.last_tap = None;
            }
            TouchPhase::Move => {
                if self.in_double_tap {
                    return true;
                }
                let distance = self.last_focus - focus;
                if self.in_tap_region {
                    if self.down_focus.distance(focus) > self.touch_slop {
                        self.in_tap_region = false;
                        listener.on_scroll(distance);
                        self.last_focus = focus;
                    }
                } else if distance != DVec2::ZERO {
                    listener.on_scroll(distance);
                    self.last_focus = focus;
                }
            }
            TouchPhase::Up => {
                if self.in_tap_region && !self.in_double_tap {
                    listener.on_single_tap(focus);
                    self.last_tap = Some((focus, event.timestamp_ms));
                }
                self.in_tap_region = false;
                self.in_double_tap = false;
            }
            TouchPhase::Cancel => {
                self.in_tap_region = false;
                self.in_double_tap = false;
                self.last_tap = None;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Pointer;

    #[derive(Default)]
    struct Recorder {
        taps: usize,
        double_taps: usize,
        scrolled: Vec<DVec2>,
    }

    impl TapListener for Recorder {
        fn on_single_tap(&mut self, _point: DVec2) {
            self.taps += 1;
        }

        fn on_double_tap(&mut self, _point: DVec2) {
            self.double_taps += 1;
        }
    }

    impl ScrollListener for Recorder {
        fn on_scroll(&mut self, distance: DVec2) {
            self.scrolled.push(distance);
        }
    }

    fn at(phase: TouchPhase, x: f64, y: f64, t: f64) -> TouchEvent {
        TouchEvent::new(phase, vec![Pointer::new(0, x, y)], t)
    }

    #[test]
    fn test_single_tap() {
        let mut d = TapScrollDetector::default();
        let mut rec = Recorder::default();
        d.on_touch_event(&at(TouchPhase::Down, 10.0, 10.0, 0.0), &mut rec);
        d.on_touch_event(&at(TouchPhase::Move, 12.0, 11.0, 10.0), &mut rec);
        d.on_touch_event(&at(TouchPhase::Up, 12.0, 11.0, 20.0), &mut rec);
        assert_eq!(rec.taps, 1);
        assert!(rec.scrolled.is_empty());
    }

    #[test]
    fn test_scroll_past_slop() {
        let mut d = TapScrollDetector::default();
        let mut rec = Recorder::default();
        d.on_touch_event(&at(TouchPhase::Down, 100.0, 100.0, 0.0), &mut rec);
        d.on_touch_event(&at(TouchPhase::Move, 80.0, 100.0, 10.0), &mut rec);
        d.on_touch_event(&at(TouchPhase::Move, 70.0, 105.0, 20.0), &mut rec);
        d.on_touch_event(&at(TouchPhase::Up, 70.0, 105.0, 30.0), &mut rec);

        assert_eq!(
            rec.scrolled,
            vec![DVec2::new(20.0, 0.0), DVec2::new(10.0, -5.0)]
        );
        assert_eq!(rec.taps, 0);
    }

    #[test]
    fn test_double_tap() {
        let mut d = TapScrollDetector::default();
        let mut rec = Recorder::default();
        d.on_touch_event(&at(TouchPhase::Down, 50.0, 50.0, 0.0), &mut rec);
        d.on_touch_event(&at(TouchPhase::Up, 50.0, 50.0, 50.0), &mut rec);
        d.on_touch_event(&at(TouchPhase::Down, 55.0, 52.0, 150.0), &mut rec);
        d.on_touch_event(&at(TouchPhase::Up, 55.0, 52.0, 200.0), &mut rec);
        assert_eq!(rec.double_taps, 1);
        assert_eq!(rec.taps, 1);
    }

    #[test]
    fn test_slow_second_tap_is_not_double() {
        let mut d = TapScrollDetector::default();
        let mut rec = Recorder::default();
        d.on_touch_event(&at(TouchPhase::Down, 50.0, 50.0, 0.0), &mut rec);
        d.on_touch_event(&at(TouchPhase::Up, 50.0, 50.0, 50.0), &mut rec);
        d.on_touch_event(&at(TouchPhase::Down, 50.0, 50.0, 1000.0), &mut rec);
        d.on_touch_event(&at(TouchPhase::Up, 50.0, 50.0, 1050.0), &mut rec);
        assert_eq!(rec.double_taps, 0);
        assert_eq!(rec.taps, 2);
    }

    #[test]
    fn test_second_pointer_reanchors_focus() {
        let mut d = TapScrollDetector::default();
        let mut rec = Recorder::default();
        d.on_touch_event(&at(TouchPhase::Down, 0.0, 0.0, 0.0), &mut rec);
        let both = vec![Pointer::new(0, 0.0, 0.0), Pointer::new(1, 100.0, 0.0)];
        d.on_touch_event(
            &TouchEvent::new(TouchPhase::PointerDown, both, 10.0).with_action_index(1),
            &mut rec,
        );
        // focus moved from (0,0) to (50,0) without any finger moving
        assert!(rec.scrolled.is_empty());
        assert!(!d.is_in_tap_region());

        let moved = vec![Pointer::new(0, 10.0, 0.0), Pointer::new(1, 110.0, 0.0)];
        d.on_touch_event(&TouchEvent::new(TouchPhase::Move, moved, 20.0), &mut rec);
        assert_eq!(rec.scrolled, vec![DVec2::new(-10.0, 0.0)]);
    }
}
