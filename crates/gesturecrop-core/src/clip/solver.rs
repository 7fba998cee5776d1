//! Crop rectangle constraint solver.
//!
//! The solver owns two rectangles: the authoritative crop rectangle, which
//! every drag updates immediately so hit-testing always sees the true value,
//! and an animated copy eased by a [`Smoother4`] for painting.
//!
//! Constraints, in priority order:
//! 1. The frame never gets narrower or shorter than three corner lengths.
//! 2. Dragged edges stay inside the limit rectangle (the display area).
//! 3. In fixed-ratio mode `width / height` equals the effective ratio, which
//!    is the chosen ratio inverted while the image sits at a quarter turn.
//! 4. The frame is never larger than the image's drawing-out bounds.
//!
//! A drag that cannot satisfy 1 and 2 together is rejected and leaves the
//! frame unchanged.

use glam::DVec2;

use super::handle::{detect_handle, Handle};
use super::ClipChangeListener;
use crate::config::SurfaceConfig;
use crate::geometry::{fit_inside_scale, perpendicular_intersection, Rect};
use crate::gesture::{TouchEvent, TouchPhase};
use crate::smoother::{Smoother1, Smoother4};

/// Ratio value meaning "no aspect constraint".
pub const FREE_RATIO: f64 = 0.0;

const SHOW_ALPHA: f64 = 1.0;
const HIDE_ALPHA: f64 = 0.0;

/// Slack for comparisons against the minimum size.
const SIZE_EPSILON: f64 = 1e-9;

/// Geometry a fixed-ratio resize works against. Transposing it turns a
/// vertical edge drag into a horizontal one.
#[derive(Debug, Clone, Copy)]
struct FixedFrame {
    clip: Rect,
    limit: Rect,
    room: Rect,
    ratio: f64,
    min_width: f64,
    min_height: f64,
}

impl FixedFrame {
    fn transposed(self) -> Self {
        Self {
            clip: self.clip.transposed(),
            limit: self.limit.transposed(),
            room: self.room.transposed(),
            ratio: 1.0 / self.ratio,
            min_width: self.min_height,
            min_height: self.min_width,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClipRectSolver {
    clip: Rect,
    limit: Rect,
    drawing: Rect,
    corner_length: f64,
    line_width: f64,
    ratio: f64,
    rotation_degrees: f64,
    handle: Handle,
    last_point: DVec2,
    enabled: bool,
    clip_smoother: Smoother4,
    frame_alpha: Smoother1,
    grid_alpha: Smoother1,
}

impl ClipRectSolver {
    pub fn new(config: &SurfaceConfig) -> Self {
        let mut frame_alpha = Smoother1::from_config(&config.alpha_smoother);
        frame_alpha.reset_to([SHOW_ALPHA]);
        Self {
            clip: Rect::default(),
            limit: Rect::default(),
            drawing: Rect::default(),
            corner_length: config.corner_length_px(),
            line_width: config.line_width_px(),
            ratio: FREE_RATIO,
            rotation_degrees: 0.0,
            handle: Handle::empty(),
            last_point: DVec2::ZERO,
            enabled: true,
            clip_smoother: Smoother4::from_config(&config.clip_smoother),
            frame_alpha,
            grid_alpha: Smoother1::from_config(&config.alpha_smoother),
        }
    }

    /// Authoritative crop rectangle.
    pub fn clip_rect(&self) -> Rect {
        self.clip
    }

    /// Crop rectangle as it should be painted this frame.
    pub fn animated_clip_rect(&self) -> Rect {
        let [left, top, right, bottom] = self.clip_smoother.current();
        Rect::new(left, top, right, bottom)
    }

    pub fn limit_rect(&self) -> Rect {
        self.limit
    }

    pub fn drawing_bounds(&self) -> Rect {
        self.drawing
    }

    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn is_fixed_ratio(&self) -> bool {
        self.ratio != FREE_RATIO
    }

    /// Ratio the frame must currently satisfy, accounting for rotation.
    pub fn effective_ratio(&self) -> f64 {
        if !self.is_fixed_ratio() {
            return FREE_RATIO;
        }
        let quarter_turns = (self.rotation_degrees / 90.0).round() as i64;
        if quarter_turns % 2 == 0 {
            self.ratio
        } else {
            1.0 / self.ratio
        }
    }

    /// `width / height` of the authoritative rectangle, or 0 when empty.
    pub fn clip_rect_ratio(&self) -> f64 {
        if self.clip.is_empty() {
            0.0
        } else {
            self.clip.width() / self.clip.height()
        }
    }

    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// True while a handle is grabbed.
    pub fn is_active(&self) -> bool {
        !self.handle.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.handle = Handle::empty();
        }
    }

    pub fn grid_alpha(&self) -> f64 {
        self.grid_alpha.value()
    }

    pub fn frame_alpha(&self) -> f64 {
        self.frame_alpha.value()
    }

    pub fn show_grid(&mut self) {
        self.grid_alpha.set_target(SHOW_ALPHA);
    }

    pub fn hide_grid(&mut self) {
        self.grid_alpha.set_target(HIDE_ALPHA);
    }

    pub fn set_frame_visible(&mut self, visible: bool) {
        self.frame_alpha
            .set_target(if visible { SHOW_ALPHA } else { HIDE_ALPHA });
    }

    /// Smallest span a drag may leave on either axis.
    pub fn min_span(&self) -> f64 {
        3.0 * self.corner_length
    }

    /// Smallest frame side after a ratio change.
    pub fn min_clip_size(&self) -> f64 {
        3.0 * self.corner_length + self.line_width
    }

    pub fn set_limit_rect(&mut self, rect: Rect) {
        if rect.is_finite() {
            self.limit = rect.normalized();
        }
    }

    pub fn set_drawing_bounds(&mut self, rect: Rect) {
        if rect.is_finite() {
            self.drawing = rect.normalized();
        }
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        if degrees.is_finite() {
            self.rotation_degrees = degrees;
        }
    }

    /// Replace the crop rectangle; the painted frame eases toward it.
    pub fn set_clip_rect(&mut self, rect: Rect) {
        if !rect.is_finite() {
            log::debug!("clip: ignoring non-finite rect {rect:?}");
            return;
        }
        self.clip = rect.normalized();
        self.clip_smoother.set_destination(to_array(&self.clip));
    }

    pub fn zoom_to(&mut self, rect: Rect) {
        self.set_clip_rect(rect);
    }

    /// Snap the painted frame onto the authoritative one.
    pub fn force_finish(&mut self) {
        self.clip_smoother.force_finish();
    }

    /// Advance the frame and alpha animations. Returns `true` while more
    /// frames are needed.
    pub fn step(&mut self) -> bool {
        let clip = self.clip_smoother.step();
        let frame = self.frame_alpha.step();
        let grid = self.grid_alpha.step();
        clip || frame || grid
    }

    /// Region a fixed-ratio frame may grow into.
    fn room(&self) -> Rect {
        self.limit.intersect(&self.drawing).unwrap_or(self.limit)
    }

    /// Minimum width and height honouring both the minimum span and `ratio`.
    fn min_size_for(span: f64, ratio: f64) -> (f64, f64) {
        let width = span.max(span * ratio);
        (width, width / ratio)
    }

    /// Hit-test `point` and remember the grabbed handle.
    pub fn grab(&mut self, point: DVec2) -> Handle {
        self.handle = if self.enabled {
            detect_handle(&self.clip, point, self.corner_length)
        } else {
            Handle::empty()
        };
        self.last_point = point;
        self.handle
    }

    pub fn release(&mut self) {
        self.handle = Handle::empty();
    }

    /// Move the grabbed handle by `delta` (finger movement, display space).
    pub fn drag(&mut self, delta: DVec2) {
        if self.handle.is_empty() || !delta.is_finite() {
            return;
        }

        let next = if !self.is_fixed_ratio() {
            Some(self.drag_free(delta))
        } else {
            let ratio = self.effective_ratio();
            let (min_width, min_height) = Self::min_size_for(self.min_span(), ratio);
            let frame = FixedFrame {
                clip: self.clip,
                limit: self.limit,
                room: self.room(),
                ratio,
                min_width,
                min_height,
            };
            if self.handle.is_corner() {
                resize_corner(&frame, self.handle, delta)
            } else if self.handle.intersects(Handle::LEFT | Handle::RIGHT) {
                resize_edge(&frame, self.handle, delta.x)
            } else {
                resize_edge(&frame.transposed(), self.handle.transposed(), delta.y)
                    .map(|r| r.transposed())
            }
        };

        match next {
            Some(rect) => self.clip = self.clamp_to_drawing(rect),
            None => log::trace!("clip: rejected drag {delta:?} on {:?}", self.handle),
        }
        self.clip_smoother.set_destination(to_array(&self.clip));
        self.clip_smoother.force_finish();
    }

    fn drag_free(&self, delta: DVec2) -> Rect {
        let span = self.min_span();
        let limit = self.limit;
        let mut r = self.clip;
        if self.handle.contains(Handle::LEFT) {
            r.left = clamp_edge(r.left + delta.x, limit.left, r.right - span, r.left);
        }
        if self.handle.contains(Handle::RIGHT) {
            r.right = clamp_edge(r.right + delta.x, r.left + span, limit.right, r.right);
        }
        if self.handle.contains(Handle::TOP) {
            r.top = clamp_edge(r.top + delta.y, limit.top, r.bottom - span, r.top);
        }
        if self.handle.contains(Handle::BOTTOM) {
            r.bottom = clamp_edge(r.bottom + delta.y, r.top + span, limit.bottom, r.bottom);
        }
        r
    }

    /// On any axis where the frame outgrew the visible part of the image,
    /// snap it to that part. The result never leaves the limit rectangle.
    fn clamp_to_drawing(&self, mut rect: Rect) -> Rect {
        if self.drawing.is_empty() {
            return rect;
        }
        let Some(visible) = self.drawing.intersect(&self.limit) else {
            return rect;
        };
        let span = self.min_span();
        if visible.width() + SIZE_EPSILON < rect.width() {
            rect.left = visible.left;
            rect.right = visible.left + visible.width().max(span);
        }
        if visible.height() + SIZE_EPSILON < rect.height() {
            rect.top = visible.top;
            rect.bottom = visible.top + visible.height().max(span);
        }
        rect.shifted_into(&self.limit)
    }

    /// Switch aspect mode. A fixed ratio reshapes the frame about its center,
    /// fitted to the available room and no smaller than the minimum size.
    ///
    /// Returns the new frame when it changed.
    pub fn set_frame_ratio(&mut self, ratio: f64) -> Option<Rect> {
        if !(ratio > 0.0 && ratio.is_finite()) {
            self.ratio = FREE_RATIO;
            return None;
        }
        self.ratio = ratio;
        if self.clip.is_empty() {
            return None;
        }

        let effective = self.effective_ratio();
        let clip = self.clip;
        let (mut width, mut height) = if effective < clip.width() / clip.height() {
            (clip.width(), clip.width() / effective)
        } else {
            (clip.height() * effective, clip.height())
        };

        let room = self.room();
        if !room.is_empty() {
            let fit = fit_inside_scale(width, height, room.width(), room.height()).min(1.0);
            width *= fit;
            height *= fit;
        }

        let (min_width, min_height) = Self::min_size_for(self.min_clip_size(), effective);
        if width < min_width || height < min_height {
            width = min_width;
            height = min_height;
        }

        let next = Rect::from_center(clip.center(), width, height).shifted_into(&room);
        log::debug!("clip: ratio {ratio} (effective {effective}) -> {next:?}");
        self.set_clip_rect(next);
        Some(next)
    }

    /// Fit the frame into the part of the image that is inside the limit
    /// rectangle. A fixed-ratio frame becomes the largest centered rectangle
    /// of that ratio.
    pub fn resize_to_limit_rect(&mut self) {
        let Some(available) = self.drawing.intersect(&self.limit) else {
            log::debug!("clip: image does not overlap the limit rect");
            return;
        };
        let next = if self.is_fixed_ratio() {
            let ratio = self.effective_ratio();
            let fit = fit_inside_scale(ratio, 1.0, available.width(), available.height());
            Rect::from_center(available.center(), ratio * fit, fit)
        } else {
            available
        };
        self.set_clip_rect(next);
    }

    /// Drive grab, drag and release from raw touches.
    ///
    /// Returns `true` when the event belongs to the crop frame and must not
    /// reach the image gestures.
    pub fn on_touch_event(
        &mut self,
        event: &TouchEvent,
        listener: &mut dyn ClipChangeListener,
    ) -> bool {
        let Some(point) = event.primary() else {
            return self.is_active();
        };

        match event.phase {
            TouchPhase::Down => {
                if self.grab(point).is_empty() {
                    return false;
                }
                log::debug!("clip: grabbed {:?}", self.handle);
                self.show_grid();
                listener.on_clip_start(&self.clip);
                true
            }
            TouchPhase::Move => {
                if !self.is_active() {
                    return false;
                }
                self.drag(point - self.last_point);
                self.last_point = point;
                listener.on_clip_changing(&self.clip);
                true
            }
            TouchPhase::Up | TouchPhase::Cancel => {
                if !self.is_active() {
                    return false;
                }
                self.release();
                self.hide_grid();
                listener.on_clip_changing(&self.clip);
                if let Some(dest) = listener.on_clip_stop(&self.clip) {
                    self.zoom_to(dest);
                }
                true
            }
            TouchPhase::PointerDown | TouchPhase::PointerUp => self.is_active(),
        }
    }
}

fn to_array(rect: &Rect) -> [f64; 4] {
    [rect.left, rect.top, rect.right, rect.bottom]
}

/// Clamp `value` into `lo..=hi`, keeping `previous` when the range is empty.
fn clamp_edge(value: f64, lo: f64, hi: f64, previous: f64) -> f64 {
    if lo <= hi {
        value.clamp(lo, hi)
    } else {
        previous
    }
}

/// Fixed-ratio drag of the left or right edge. The height follows the width
/// and stays centered on the old vertical center.
fn resize_edge(frame: &FixedFrame, handle: Handle, dx: f64) -> Option<Rect> {
    let clip = frame.clip;
    let from_left = handle.contains(Handle::LEFT);
    let (left, right) = if from_left {
        let (lo, hi) = (frame.limit.left, clip.right - frame.min_width);
        if !(lo <= hi) {
            return None;
        }
        ((clip.left + dx).clamp(lo, hi), clip.right)
    } else {
        let (lo, hi) = (clip.left + frame.min_width, frame.limit.right);
        if !(lo <= hi) {
            return None;
        }
        (clip.left, (clip.right + dx).clamp(lo, hi))
    };

    let mut width = right - left;
    let mut height = width / frame.ratio;
    if !frame.room.is_empty() {
        let fit = fit_inside_scale(width, height, frame.room.width(), frame.room.height());
        if fit < 1.0 {
            width *= fit;
            height *= fit;
        }
    }
    if width + SIZE_EPSILON < frame.min_width || height + SIZE_EPSILON < frame.min_height {
        return None;
    }

    let (left, right) = if from_left {
        (right - width, right)
    } else {
        (left, left + width)
    };
    let center_y = clip.center().y;
    let half = height * 0.5;
    Some(Rect::new(left, center_y - half, right, center_y + half).shifted_into(&frame.limit))
}

/// Fixed-ratio corner drag. The finger position is projected onto the
/// frame's diagonal so the opposite corner stays put and the ratio is exact.
fn resize_corner(frame: &FixedFrame, handle: Handle, delta: DVec2) -> Option<Rect> {
    let clip = frame.clip;
    let toward_left = handle.contains(Handle::LEFT);
    let toward_top = handle.contains(Handle::TOP);

    let fixed = DVec2::new(
        if toward_left { clip.right } else { clip.left },
        if toward_top { clip.bottom } else { clip.top },
    );
    let moving = DVec2::new(
        if toward_left { clip.left } else { clip.right },
        if toward_top { clip.top } else { clip.bottom },
    );

    let Some(foot) = perpendicular_intersection(fixed, moving, moving + delta) else {
        log::debug!("clip: degenerate diagonal {fixed:?} -> {moving:?}, ignoring drag");
        return None;
    };

    let sign_x = if toward_left { -1.0 } else { 1.0 };
    let sign_y = if toward_top { -1.0 } else { 1.0 };
    let room = frame.room;
    let room_width = if toward_left {
        fixed.x - room.left
    } else {
        room.right - fixed.x
    };
    let room_height = if toward_top {
        fixed.y - room.top
    } else {
        room.bottom - fixed.y
    };
    let max_width = room_width.min(room_height * frame.ratio);
    if !(frame.min_width <= max_width + SIZE_EPSILON) {
        return None;
    }

    let width =
        ((foot.x - fixed.x) * sign_x).clamp(frame.min_width, max_width.max(frame.min_width));
    let height = width / frame.ratio;
    let corner = fixed + DVec2::new(sign_x * width, sign_y * height);
    Some(Rect::bounding([fixed, corner]))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const LIMIT: Rect = Rect {
        left: 0.0,
        top: 0.0,
        right: 1000.0,
        bottom: 800.0,
    };

    fn handle_strategy() -> impl Strategy<Value = Handle> {
        prop_oneof![
            Just(Handle::LEFT),
            Just(Handle::TOP),
            Just(Handle::RIGHT),
            Just(Handle::BOTTOM),
            Just(Handle::LEFT_TOP),
            Just(Handle::TOP_RIGHT),
            Just(Handle::RIGHT_BOTTOM),
            Just(Handle::BOTTOM_LEFT),
        ]
    }

    fn drags_strategy() -> impl Strategy<Value = Vec<(f64, f64)>> {
        prop::collection::vec((-80.0f64..80.0, -80.0f64..80.0), 100)
    }

    fn solver() -> ClipRectSolver {
        let mut s = ClipRectSolver::new(&SurfaceConfig::default());
        s.set_limit_rect(LIMIT);
        s.set_drawing_bounds(LIMIT);
        s.set_clip_rect(Rect::new(200.0, 150.0, 700.0, 550.0));
        s
    }

    fn assert_legal(s: &ClipRectSolver) -> Result<(), TestCaseError> {
        let r = s.clip_rect();
        prop_assert!(r.width() + 1e-6 >= s.min_span(), "too narrow: {r:?}");
        prop_assert!(r.height() + 1e-6 >= s.min_span(), "too short: {r:?}");
        prop_assert!(r.left >= LIMIT.left - 1e-6 && r.right <= LIMIT.right + 1e-6, "{r:?}");
        prop_assert!(r.top >= LIMIT.top - 1e-6 && r.bottom <= LIMIT.bottom + 1e-6, "{r:?}");
        Ok(())
    }

    proptest! {
        /// Property: free edge drags keep the minimum size and the limit.
        #[test]
        fn prop_free_drags_stay_legal(handle in handle_strategy(), drags in drags_strategy()) {
            let mut s = solver();
            s.handle = handle;
            for (dx, dy) in drags {
                s.drag(DVec2::new(dx, dy));
                assert_legal(&s)?;
            }
        }

        /// Property: an image hanging past the display never drags the frame out of it.
        #[test]
        fn prop_free_drags_with_offset_image_stay_legal(
            handle in handle_strategy(),
            ox in -300.0f64..300.0,
            oy in -300.0f64..300.0,
            drags in drags_strategy(),
        ) {
            let mut s = solver();
            s.set_drawing_bounds(Rect::new(ox, oy, ox + 600.0, oy + 500.0));
            s.handle = handle;
            for (dx, dy) in drags {
                s.drag(DVec2::new(dx, dy));
                assert_legal(&s)?;
            }
        }

        /// Property: fixed-ratio drags keep the ratio, the minimum size and the limit.
        #[test]
        fn prop_fixed_drags_keep_ratio(
            ratio in prop_oneof![Just(1.0), Just(4.0 / 3.0), Just(16.0 / 9.0)],
            rotation in prop_oneof![Just(0.0), Just(90.0), Just(180.0), Just(270.0)],
            handle in handle_strategy(),
            drags in drags_strategy(),
        ) {
            let mut s = solver();
            s.set_rotation(rotation);
            s.set_frame_ratio(ratio);
            let effective = s.effective_ratio();
            s.handle = handle;
            for (dx, dy) in drags {
                s.drag(DVec2::new(dx, dy));
                let r = s.clip_rect();
                prop_assert!((r.width() / r.height() - effective).abs() < 1e-3, "{r:?}");
                assert_legal(&s)?;
            }
        }
    }
}
