//! Two-pointer scale and rotation detector.
//!
//! Reports the scale factor and rotation accumulated since the second contact
//! went down. Raw values can be eased through a [`Smoother1`] per axis; while
//! an eased value is still catching up the detector keeps a follow-up update
//! scheduled, which the host drains once per frame with
//! [`ScaleRotateDetector::run_pending`] so the gesture comes to rest smoothly
//! even when the fingers stop moving.

use std::f64::consts::{PI, TAU};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::{ScaleRotateListener, TouchEvent, TouchPhase};
use crate::config::GestureConfig;
use crate::smoother::Smoother1;

/// Initial contact distances below this many pixels are raised to it.
const MIN_INITIAL_DISTANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRotateSample {
    pub scale_pivot: DVec2,
    pub rotate_pivot: DVec2,
    /// Scale factor since the gesture began.
    pub scale: f64,
    /// Rotation since the gesture began, clockwise on a y-down display.
    pub rotation_degrees: f64,
}

#[derive(Debug, Clone)]
pub struct ScaleRotateDetector {
    config: GestureConfig,
    active: bool,
    main: DVec2,
    secondary: DVec2,
    initial_distance: f64,
    current_distance: f64,
    initial_angle: f64,
    /// Unwrapped, so a turn past ±180° keeps accumulating.
    current_angle: f64,
    last_raw_angle: f64,
    scale_smoother: Smoother1,
    rotate_smoother: Smoother1,
    pending: Option<u64>,
    next_ticket: u64,
}

impl Default for ScaleRotateDetector {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

impl ScaleRotateDetector {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            scale_smoother: Smoother1::from_config(&config.scale_smoother),
            rotate_smoother: Smoother1::from_config(&config.rotate_smoother),
            config,
            active: false,
            main: DVec2::ZERO,
            secondary: DVec2::ZERO,
            initial_distance: MIN_INITIAL_DISTANCE,
            current_distance: MIN_INITIAL_DISTANCE,
            initial_angle: 0.0,
            current_angle: 0.0,
            last_raw_angle: 0.0,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Raw scale factor since begin, clamped to the configured minimum.
    pub fn scale_factor(&self) -> f64 {
        (self.current_distance / self.initial_distance).max(self.config.min_scale_factor)
    }

    /// Raw rotation since begin, in degrees.
    pub fn rotation_degrees(&self) -> f64 {
        (self.current_angle - self.initial_angle).to_degrees()
    }

    /// Ticket of the scheduled follow-up update, if any.
    pub fn pending_update(&self) -> Option<u64> {
        self.pending
    }

    pub fn has_pending_update(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel_pending(&mut self) {
        if let Some(ticket) = self.pending.take() {
            log::trace!("scale-rotate: cancelled follow-up #{ticket}");
        }
    }

    fn schedule(&mut self) {
        if self.pending.is_none() {
            self.next_ticket += 1;
            self.pending = Some(self.next_ticket);
        }
    }

    /// Feed one touch sample. Returns `true`; the detector observes every
    /// event without claiming it.
    pub fn on_touch_event(
        &mut self,
        event: &TouchEvent,
        listener: &mut dyn ScaleRotateListener,
    ) -> bool {
        self.track(event);
        let count = event.pointer_count();
        match event.phase {
            TouchPhase::Down => {}
            TouchPhase::PointerDown if count == 2 => self.begin(listener),
            TouchPhase::Move if count >= 2 && self.active => {
                self.measure();
                self.update(listener);
            }
            TouchPhase::PointerUp if count == 2 && self.active => {
                self.measure();
                self.end(listener);
            }
            TouchPhase::Up | TouchPhase::Cancel => self.reset(),
            _ => {}
        }
        true
    }

    /// Run the scheduled follow-up, if any, with no new pointer data.
    ///
    /// Returns `true` when another follow-up got scheduled.
    pub fn run_pending(&mut self, listener: &mut dyn ScaleRotateListener) -> bool {
        if self.pending.take().is_none() || !self.active {
            return false;
        }
        self.update(listener);
        self.has_pending_update()
    }

    fn track(&mut self, event: &TouchEvent) {
        if let Some(p) = event.pointers.first() {
            self.main = p.position();
        }
        if let Some(p) = event.pointers.get(1) {
            self.secondary = p.position();
        }
    }

    fn center(&self) -> DVec2 {
        self.main + (self.secondary - self.main) * 0.5
    }

    fn measure(&mut self) {
        let delta = self.secondary - self.main;
        self.current_distance = delta.length();

        let raw = delta.y.atan2(delta.x);
        let mut step = raw - self.last_raw_angle;
        if step > PI {
            step -= TAU;
        } else if step < -PI {
            step += TAU;
        }
        self.current_angle += step;
        self.last_raw_angle = raw;
    }

    fn sample(&self) -> ScaleRotateSample {
        let center = self.center();
        ScaleRotateSample {
            scale_pivot: if self.config.center_pivot_for_scale {
                center
            } else {
                self.main
            },
            rotate_pivot: if self.config.center_pivot_for_rotate {
                center
            } else {
                self.main
            },
            scale: if self.config.smooth_scale {
                self.scale_smoother.value()
            } else {
                self.scale_factor()
            },
            rotation_degrees: if self.config.smooth_rotate {
                self.rotate_smoother.value()
            } else {
                self.rotation_degrees()
            },
        }
    }

    fn begin(&mut self, listener: &mut dyn ScaleRotateListener) {
        let delta = self.secondary - self.main;
        self.initial_distance = delta.length().max(MIN_INITIAL_DISTANCE);
        self.current_distance = self.initial_distance;
        self.initial_angle = delta.y.atan2(delta.x);
        self.current_angle = self.initial_angle;
        self.last_raw_angle = self.initial_angle;
        self.scale_smoother.reset_to([self.scale_factor()]);
        self.rotate_smoother.reset_to([self.rotation_degrees()]);
        self.cancel_pending();
        self.active = true;

        log::debug!(
            "scale-rotate: begin at distance {:.1}, angle {:.1}°",
            self.initial_distance,
            self.initial_angle.to_degrees()
        );
        listener.on_scale_rotate_begin(&self.sample());
    }

    /// Ease both smoothers one step. Returns whether a visible value is still
    /// moving.
    fn advance(&mut self) -> bool {
        self.scale_smoother.set_target(self.scale_factor());
        self.rotate_smoother.set_target(self.rotation_degrees());
        let scale_more = self.scale_smoother.step();
        let rotate_more = self.rotate_smoother.step();
        (self.config.smooth_scale && scale_more) || (self.config.smooth_rotate && rotate_more)
    }

    fn update(&mut self, listener: &mut dyn ScaleRotateListener) {
        let more = self.advance();
        listener.on_scale_rotate(&self.sample());
        if more {
            self.schedule();
        } else {
            self.cancel_pending();
        }
    }

    fn end(&mut self, listener: &mut dyn ScaleRotateListener) {
        self.advance();
        let sample = self.sample();
        self.cancel_pending();
        self.active = false;
        log::debug!(
            "scale-rotate: end at scale {:.3}, rotation {:.1}°",
            sample.scale,
            sample.rotation_degrees
        );
        listener.on_scale_rotate_end(&sample);
    }

    fn reset(&mut self) {
        self.cancel_pending();
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::Pointer;

    #[derive(Default)]
    struct Recorder {
        begins: Vec<ScaleRotateSample>,
        updates: Vec<ScaleRotateSample>,
        ends: Vec<ScaleRotateSample>,
    }

    impl ScaleRotateListener for Recorder {
        fn on_scale_rotate_begin(&mut self, sample: &ScaleRotateSample) {
            self.begins.push(*sample);
        }

        fn on_scale_rotate(&mut self, sample: &ScaleRotateSample) {
            self.updates.push(*sample);
        }

        fn on_scale_rotate_end(&mut self, sample: &ScaleRotateSample) {
            self.ends.push(*sample);
        }
    }

    fn two(phase: TouchPhase, a: (f64, f64), b: (f64, f64)) -> TouchEvent {
        TouchEvent::new(
            phase,
            vec![Pointer::new(0, a.0, a.1), Pointer::new(1, b.0, b.1)],
            0.0,
        )
    }

    fn one(phase: TouchPhase, a: (f64, f64)) -> TouchEvent {
        TouchEvent::new(phase, vec![Pointer::new(0, a.0, a.1)], 0.0)
    }

    fn raw_config() -> GestureConfig {
        GestureConfig {
            smooth_scale: false,
            smooth_rotate: false,
            ..Default::default()
        }
    }

    fn begin(d: &mut ScaleRotateDetector, rec: &mut Recorder, a: (f64, f64), b: (f64, f64)) {
        d.on_touch_event(&one(TouchPhase::Down, a), rec);
        d.on_touch_event(&two(TouchPhase::PointerDown, a, b), rec);
    }

    #[test]
    fn test_sixty_degree_turn() {
        let mut d = ScaleRotateDetector::new(raw_config());
        let mut rec = Recorder::default();
        begin(&mut d, &mut rec, (0.0, 0.0), (100.0, 0.0));
        assert_eq!(rec.begins.len(), 1);
        assert_eq!(rec.begins[0].scale, 1.0);
        assert_eq!(rec.begins[0].rotation_degrees, 0.0);

        d.on_touch_event(&two(TouchPhase::Move, (0.0, 0.0), (50.0, 86.6)), &mut rec);
        let s = rec.updates.last().unwrap();
        assert!((s.scale - 1.0).abs() < 1e-3);
        assert!((s.rotation_degrees - 60.0).abs() < 1e-2);
        assert_eq!(s.scale_pivot, DVec2::new(25.0, 43.3));
        assert!(!d.has_pending_update());
    }

    #[test]
    fn test_pivot_selection() {
        let config = GestureConfig {
            center_pivot_for_scale: false,
            ..raw_config()
        };
        let mut d = ScaleRotateDetector::new(config);
        let mut rec = Recorder::default();
        begin(&mut d, &mut rec, (10.0, 10.0), (110.0, 10.0));
        assert_eq!(rec.begins[0].scale_pivot, DVec2::new(10.0, 10.0));
        assert_eq!(rec.begins[0].rotate_pivot, DVec2::new(60.0, 10.0));
    }

    #[test]
    fn test_smoothing_schedules_follow_ups() {
        let mut d = ScaleRotateDetector::default();
        let mut rec = Recorder::default();
        begin(&mut d, &mut rec, (0.0, 0.0), (100.0, 0.0));
        d.on_touch_event(&two(TouchPhase::Move, (0.0, 0.0), (300.0, 0.0)), &mut rec);

        let first = rec.updates[0].scale;
        assert!(first > 1.0 && first < 3.0, "eased value {first}");
        assert!(d.has_pending_update());

        let mut frames = 0;
        while d.run_pending(&mut rec) {
            frames += 1;
            assert!(frames < 100);
        }
        assert!(!d.has_pending_update());
        assert_eq!(rec.updates.last().unwrap().scale, 3.0);
    }

    #[test]
    fn test_end_cancels_follow_up() {
        let mut d = ScaleRotateDetector::default();
        let mut rec = Recorder::default();
        begin(&mut d, &mut rec, (0.0, 0.0), (100.0, 0.0));
        d.on_touch_event(&two(TouchPhase::Move, (0.0, 0.0), (0.0, 100.0)), &mut rec);
        assert!(d.has_pending_update());

        d.on_touch_event(
            &two(TouchPhase::PointerUp, (0.0, 0.0), (0.0, 100.0)).with_action_index(1),
            &mut rec,
        );
        assert_eq!(rec.ends.len(), 1);
        assert!(!d.has_pending_update());
        assert!(!d.is_active());

        let updates = rec.updates.len();
        assert!(!d.run_pending(&mut rec));
        assert_eq!(rec.updates.len(), updates);
    }

    #[test]
    fn test_up_resets() {
        let mut d = ScaleRotateDetector::default();
        let mut rec = Recorder::default();
        begin(&mut d, &mut rec, (0.0, 0.0), (100.0, 0.0));
        d.on_touch_event(&two(TouchPhase::Move, (0.0, 0.0), (200.0, 0.0)), &mut rec);
        d.on_touch_event(&one(TouchPhase::Cancel, (0.0, 0.0)), &mut rec);
        assert!(!d.is_active());
        assert!(!d.has_pending_update());

        // single-pointer moves after reset do nothing
        d.on_touch_event(&one(TouchPhase::Move, (5.0, 5.0)), &mut rec);
        assert_eq!(rec.updates.len(), 1);
    }

    #[test]
    fn test_coincident_contacts_stay_finite() {
        let mut d = ScaleRotateDetector::new(raw_config());
        let mut rec = Recorder::default();
        begin(&mut d, &mut rec, (50.0, 50.0), (50.0, 50.0));
        d.on_touch_event(&two(TouchPhase::Move, (50.0, 50.0), (100.0, 50.0)), &mut rec);
        assert_eq!(rec.updates[0].scale, 50.0);

        d.on_touch_event(&two(TouchPhase::Move, (50.0, 50.0), (50.0, 50.0)), &mut rec);
        assert_eq!(rec.updates[1].scale, 0.01);
    }

    #[test]
    fn test_rotation_unwraps_past_half_turn() {
        let mut d = ScaleRotateDetector::new(raw_config());
        let mut rec = Recorder::default();
        let r = 100.0;
        let at = |deg: f64| {
            let rad = f64::to_radians(deg);
            (r * rad.cos(), r * rad.sin())
        };
        begin(&mut d, &mut rec, (0.0, 0.0), at(170.0));
        d.on_touch_event(&two(TouchPhase::Move, (0.0, 0.0), at(-170.0)), &mut rec);
        assert!((rec.updates[0].rotation_degrees - 20.0).abs() < 1e-9);
    }
}
