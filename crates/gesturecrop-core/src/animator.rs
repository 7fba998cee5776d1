//! Image transform animator.
//!
//! Gestures mutate the *final* transform; [`Animator::compute`] eases the
//! *current* transform toward it once per frame through [`Pose`]
//! interpolation. Incremental operations are post-concatenated, so each new
//! scroll/scale/rotate is applied in display space on top of what is already
//! there.

use glam::{DAffine2, DVec2};

use crate::geometry::{fit_inside_scale, map_rect_bounds, Rect};
use crate::pose::{Pose, SCALE_ERROR};

/// Lower bound of both rubber-band pass rates.
pub const MIN_PASSRATE: f64 = 0.01;

/// Default factor applied on top of the fit scale by a double-tap zoom.
pub const DEFAULT_ZOOM_IN_MULTIPLIER: f64 = 5.0;

/// Fraction of a scroll that gets through when the content is already
/// `distance` px past its boundary.
///
/// `0.1^(2|distance| / damping_distance)`, clamped to `[0.01, 1]`. A distance
/// of zero passes everything; a distance equal to `damping_distance` passes 1%.
pub fn compute_scroll_passrate(distance: f64, damping_distance: f64) -> f64 {
    let rate = 0.1f64.powf(distance.abs() * 2.0 / damping_distance);
    if rate.is_nan() {
        return 1.0;
    }
    rate.clamp(MIN_PASSRATE, 1.0)
}

/// Fraction of a scale step that gets through when the content is already
/// `scale` away from its rest size. Reciprocal scales are treated alike.
pub fn compute_scale_passrate(scale: f64, damping_scale: f64) -> f64 {
    if !(scale > 0.0) {
        return MIN_PASSRATE;
    }
    let magnitude = if scale > 1.0 { scale } else { 1.0 / scale };
    let rate = 0.1f64.powf((magnitude - 1.0) / (1.0 + damping_scale) * 2.0);
    if rate.is_nan() {
        return 1.0;
    }
    rate.clamp(MIN_PASSRATE, 1.0)
}

#[derive(Debug, Clone)]
pub struct Animator {
    current: DAffine2,
    final_transform: DAffine2,
    current_pose: Pose,
    final_pose: Pose,
    image_rect: Rect,
    display_rect: Rect,
    zoom_in_multiplier: f64,
    redraw_requested: bool,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(DEFAULT_ZOOM_IN_MULTIPLIER)
    }
}

impl Animator {
    pub fn new(zoom_in_multiplier: f64) -> Self {
        Self {
            current: DAffine2::IDENTITY,
            final_transform: DAffine2::IDENTITY,
            current_pose: Pose::default(),
            final_pose: Pose::default(),
            image_rect: Rect::default(),
            display_rect: Rect::default(),
            zoom_in_multiplier,
            redraw_requested: false,
        }
    }

    pub fn set_image_rect(&mut self, rect: Rect) {
        self.image_rect = rect.normalized();
    }

    pub fn set_display_rect(&mut self, rect: Rect) {
        self.display_rect = rect.normalized();
    }

    pub fn image_rect(&self) -> Rect {
        self.image_rect
    }

    pub fn display_rect(&self) -> Rect {
        self.display_rect
    }

    pub fn display_center(&self) -> DVec2 {
        self.display_rect.center()
    }

    pub fn zoom_in_multiplier(&self) -> f64 {
        self.zoom_in_multiplier
    }

    pub fn current_transform(&self) -> DAffine2 {
        self.current
    }

    pub fn final_transform(&self) -> DAffine2 {
        self.final_transform
    }

    pub fn final_pose(&self) -> &Pose {
        &self.final_pose
    }

    /// Target rotation in degrees.
    pub fn degree(&self) -> f64 {
        self.final_pose.degree()
    }

    /// Target rotation in radians.
    pub fn rotation(&self) -> f64 {
        self.final_pose.rotation()
    }

    /// Target uniform scale.
    pub fn scale_value(&self) -> f64 {
        self.final_pose.scale()
    }

    /// Whether anything changed since the last call.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Back to identity, immediately.
    pub fn reset(&mut self) {
        self.set_final(DAffine2::IDENTITY);
        self.finish();
    }

    /// Jump the current transform onto the final one.
    pub fn finish(&mut self) {
        self.current = self.final_transform;
        self.current_pose = self.final_pose;
        self.redraw_requested = true;
    }

    fn set_final(&mut self, transform: DAffine2) -> bool {
        if !transform.is_finite() {
            log::debug!("animator: rejecting non-finite transform {transform:?}");
            return false;
        }
        self.final_transform = transform;
        self.final_pose.apply(&self.final_transform);
        self.redraw_requested = true;
        true
    }

    fn post_concat(&mut self, op: DAffine2) -> bool {
        self.set_final(op * self.final_transform)
    }

    /// Scroll by a distance in the host's convention (`previous - current`),
    /// so the content moves by `(-dx, -dy)`.
    pub fn scroll(&mut self, dx: f64, dy: f64) -> bool {
        self.post_concat(DAffine2::from_translation(DVec2::new(-dx, -dy)))
    }

    /// Scale the content by `factor` about a display-space pivot.
    pub fn scale(&mut self, factor: f64, pivot_x: f64, pivot_y: f64) -> bool {
        if !(factor > 0.0 && factor.is_finite()) {
            log::debug!("animator: ignoring scale factor {factor}");
            return false;
        }
        let pivot = DVec2::new(pivot_x, pivot_y);
        self.post_concat(about(pivot, DAffine2::from_scale(DVec2::splat(factor))))
    }

    /// Rotate the content by `degrees` (clockwise on a y-down display).
    pub fn rotate(&mut self, degrees: f64, pivot_x: f64, pivot_y: f64) -> bool {
        let pivot = DVec2::new(pivot_x, pivot_y);
        self.post_concat(about(pivot, DAffine2::from_angle(degrees.to_radians())))
    }

    /// Transform that fits the image, rotated by `degrees`, inside the
    /// display at `scale`, centered.
    fn centered(&self, degrees: f64, scale: f64) -> DAffine2 {
        DAffine2::from_translation(self.display_center())
            * DAffine2::from_angle(degrees.to_radians())
            * DAffine2::from_scale(DVec2::splat(scale))
            * DAffine2::from_translation(-self.image_rect.center())
    }

    /// Fit the unrotated image inside the display, centered.
    pub fn revert(&mut self, with_animation: bool) {
        let scale = fit_inside_scale(
            self.image_rect.width(),
            self.image_rect.height(),
            self.display_rect.width(),
            self.display_rect.height(),
        );
        log::debug!("animator: revert to scale {scale}, animated: {with_animation}");
        if self.set_final(self.centered(0.0, scale)) && !with_animation {
            self.finish();
        }
    }

    /// Fit scale for the image at its current rotation.
    pub fn current_suggest_scale(&self) -> f64 {
        let rotated = map_rect_bounds(
            &DAffine2::from_angle(self.rotation()),
            &self.image_rect,
        );
        fit_inside_scale(
            rotated.width(),
            rotated.height(),
            self.display_rect.width(),
            self.display_rect.height(),
        )
    }

    /// Re-fit at the current rotation, centered.
    pub fn zoom_back(&mut self) {
        let scale = self.current_suggest_scale();
        self.set_final(self.centered(self.degree(), scale));
    }

    /// Magnify so `rect` fills the display, and center it.
    ///
    /// Returns where `rect` lands on the display afterwards.
    pub fn zoom_in(&mut self, rect: &Rect) -> Option<Rect> {
        if rect.is_empty() || self.display_rect.is_empty() {
            return None;
        }
        let scale = fit_inside_scale(
            rect.width(),
            rect.height(),
            self.display_rect.width(),
            self.display_rect.height(),
        );
        let center = rect.center();
        if !self.scale(scale, center.x, center.y) {
            return None;
        }
        let shift = center - self.display_center();
        self.scroll(shift.x, shift.y);
        Some(Rect::from_center(
            self.display_center(),
            rect.width() * scale,
            rect.height() * scale,
        ))
    }

    /// Zoom to `zoom_in_multiplier` times the fit scale about the display center.
    pub fn zoom_out(&mut self) {
        let current = self.scale_value();
        if !(current > 0.0) {
            return;
        }
        let target = self.current_suggest_scale() * self.zoom_in_multiplier;
        let center = self.display_center();
        self.scale(target / current, center.x, center.y);
    }

    /// Double-tap behaviour: magnify when at the fit scale, re-fit otherwise.
    pub fn toggle_zoom(&mut self) {
        if (self.scale_value() - self.current_suggest_scale()).abs() < SCALE_ERROR {
            log::debug!("animator: toggle zoom, magnifying");
            self.zoom_out();
        } else {
            log::debug!("animator: toggle zoom, fitting");
            self.zoom_back();
        }
    }

    /// Advance the current transform one step. Returns `true` while more
    /// frames are needed.
    pub fn compute(&mut self) -> bool {
        if self.current_pose == self.final_pose {
            if self.current != self.final_transform {
                self.current = self.final_transform;
                self.current_pose = self.final_pose;
            }
            return false;
        }
        if !self.current_pose.forward(&self.final_pose) {
            self.finish();
            return false;
        }
        self.current_pose.affine(&mut self.current);
        true
    }

    /// Bounding box of the image under the final transform.
    pub fn drawing_out_bound(&self) -> Rect {
        map_rect_bounds(&self.final_transform, &self.image_rect)
    }

    /// Bounding box of the image under the current transform.
    pub fn current_drawing_bound(&self) -> Rect {
        map_rect_bounds(&self.current, &self.image_rect)
    }

    /// Map a display-space crop rectangle into image space, clipped to the image.
    pub fn image_clip_rect(&self, clip: &Rect) -> Option<Rect> {
        if self.final_transform.matrix2.determinant().abs() < f64::EPSILON {
            return None;
        }
        let inverse = self.final_transform.inverse();
        map_rect_bounds(&inverse, clip).intersect(&self.image_rect)
    }

    /// Crop rectangle in `[0, 1]` image-relative coordinates.
    pub fn normalized_clip_rect(&self, clip: &Rect) -> Option<Rect> {
        let image = self.image_rect;
        if image.is_empty() {
            return None;
        }
        let r = self.image_clip_rect(clip)?;
        let nx = |x: f64| ((x - image.left) / image.width()).clamp(0.0, 1.0);
        let ny = |y: f64| ((y - image.top) / image.height()).clamp(0.0, 1.0);
        Some(Rect::new(nx(r.left), ny(r.top), nx(r.right), ny(r.bottom)))
    }
}

fn about(pivot: DVec2, op: DAffine2) -> DAffine2 {
    DAffine2::from_translation(pivot) * op * DAffine2::from_translation(-pivot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator(image: Rect, display: Rect) -> Animator {
        let mut a = Animator::default();
        a.set_image_rect(image);
        a.set_display_rect(display);
        a
    }

    fn settle(a: &mut Animator) -> usize {
        let mut frames = 0;
        while a.compute() {
            frames += 1;
            assert!(frames < 10_000);
        }
        frames
    }

    #[test]
    fn test_revert_fits_wide_image() {
        let mut a = animator(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        a.revert(false);
        assert!((a.scale_value() - 0.5).abs() < 1e-9);
        let t = a.current_transform();
        assert!((t.translation - DVec2::new(0.0, 25.0)).length() < 1e-9);
        assert!(a
            .drawing_out_bound()
            .approx_eq(&Rect::new(0.0, 25.0, 100.0, 75.0), 1e-9));
    }

    #[test]
    fn test_animated_revert_eases() {
        let mut a = animator(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        a.revert(true);
        assert_eq!(a.current_transform(), DAffine2::IDENTITY);
        assert!(settle(&mut a) > 1);
        assert_eq!(a.current_transform(), a.final_transform());
    }

    #[test]
    fn test_scroll_uses_distance_convention() {
        let mut a = Animator::default();
        a.scroll(10.0, -5.0);
        assert_eq!(a.final_transform().translation, DVec2::new(-10.0, 5.0));
        assert!(a.take_redraw_request());
        assert!(!a.take_redraw_request());
    }

    #[test]
    fn test_scale_about_pivot_keeps_pivot() {
        let mut a = Animator::default();
        a.scale(2.0, 50.0, 50.0);
        let p = a.final_transform().transform_point2(DVec2::new(50.0, 50.0));
        assert!((p - DVec2::new(50.0, 50.0)).length() < 1e-9);
        assert!((a.scale_value() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_operations_post_concatenate() {
        let mut a = Animator::default();
        a.scale(2.0, 0.0, 0.0);
        a.scroll(-10.0, 0.0);
        // translation applied after the scale is not itself scaled
        assert_eq!(a.final_transform().translation, DVec2::new(10.0, 0.0));
    }

    #[test]
    fn test_rotate_reports_degree() {
        let mut a = Animator::default();
        a.rotate(90.0, 0.0, 0.0);
        assert!((a.degree() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_operations_are_noops() {
        let mut a = Animator::default();
        assert!(!a.scale(0.0, 0.0, 0.0));
        assert!(!a.scale(f64::INFINITY, 0.0, 0.0));
        assert!(!a.scroll(f64::NAN, 0.0));
        assert_eq!(a.final_transform(), DAffine2::IDENTITY);
    }

    #[test]
    fn test_compute_converges_exactly() {
        let mut a = Animator::default();
        a.scale(3.0, 10.0, 10.0);
        a.rotate(45.0, 10.0, 10.0);
        settle(&mut a);
        assert_eq!(a.current_transform(), a.final_transform());
        assert!(!a.compute());
    }

    #[test]
    fn test_zoom_in_centers_rect() {
        let mut a = animator(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        let landed = a.zoom_in(&Rect::new(10.0, 10.0, 30.0, 30.0)).unwrap();
        assert!(landed.approx_eq(&Rect::new(0.0, 0.0, 100.0, 100.0), 1e-9));

        let t = a.final_transform();
        let mapped = map_rect_bounds(&t, &Rect::new(10.0, 10.0, 30.0, 30.0));
        assert!(mapped.approx_eq(&landed, 1e-9));
    }

    #[test]
    fn test_zoom_in_rejects_empty() {
        let mut a = animator(Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(a.zoom_in(&Rect::default()), None);
    }

    #[test]
    fn test_toggle_zoom() {
        let mut a = animator(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        a.revert(false);
        a.toggle_zoom();
        assert!((a.scale_value() - 0.5 * DEFAULT_ZOOM_IN_MULTIPLIER).abs() < 1e-6);
        a.toggle_zoom();
        assert!((a.scale_value() - 0.5).abs() < 1e-6);
        assert!(a
            .drawing_out_bound()
            .approx_eq(&Rect::new(0.0, 25.0, 100.0, 75.0), 1e-6));
    }

    #[test]
    fn test_suggest_scale_follows_rotation() {
        let mut a = animator(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Rect::new(0.0, 0.0, 100.0, 200.0),
        );
        assert!((a.current_suggest_scale() - 0.5).abs() < 1e-9);
        a.rotate(90.0, 0.0, 0.0);
        assert!((a.current_suggest_scale() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalized_clip_rect() {
        let mut a = animator(
            Rect::new(0.0, 0.0, 200.0, 100.0),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        );
        a.revert(false);
        let n = a
            .normalized_clip_rect(&Rect::new(0.0, 25.0, 50.0, 75.0))
            .unwrap();
        assert!(n.approx_eq(&Rect::new(0.0, 0.0, 0.5, 1.0), 1e-9));
    }

    #[test]
    fn test_scroll_passrate_curve() {
        assert_eq!(compute_scroll_passrate(0.0, 100.0), 1.0);
        assert!((compute_scroll_passrate(100.0, 100.0) - 0.01).abs() < 1e-12);
        assert!((compute_scroll_passrate(-50.0, 100.0) - 0.1).abs() < 1e-12);
        assert_eq!(compute_scroll_passrate(1e9, 100.0), MIN_PASSRATE);
    }

    #[test]
    fn test_scale_passrate_curve() {
        assert_eq!(compute_scale_passrate(1.0, 0.2), 1.0);
        assert_eq!(
            compute_scale_passrate(2.0, 0.2),
            compute_scale_passrate(0.5, 0.2)
        );
        assert!(compute_scale_passrate(2.0, 0.2) < 1.0);
        assert_eq!(compute_scale_passrate(0.0, 0.2), MIN_PASSRATE);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: scroll pass rate stays in range and never grows with distance.
        #[test]
        fn prop_scroll_passrate_monotone(
            a in 0.0f64..1e4,
            b in 0.0f64..1e4,
            damping in 1.0f64..500.0,
        ) {
            let (near, far) = if a <= b { (a, b) } else { (b, a) };
            let r_near = compute_scroll_passrate(near, damping);
            let r_far = compute_scroll_passrate(far, damping);
            prop_assert!((MIN_PASSRATE..=1.0).contains(&r_near));
            prop_assert!((MIN_PASSRATE..=1.0).contains(&r_far));
            prop_assert!(r_far <= r_near);
        }

        /// Property: scale pass rate is symmetric under reciprocal scale.
        #[test]
        fn prop_scale_passrate_reciprocal(scale in 1.0f64..50.0, damping in 0.0f64..2.0) {
            let up = compute_scale_passrate(scale, damping);
            let down = compute_scale_passrate(1.0 / scale, damping);
            prop_assert!((up - down).abs() < 1e-9);
            prop_assert!((MIN_PASSRATE..=1.0).contains(&up));
        }

        /// Property: compute always settles on the final transform.
        #[test]
        fn prop_compute_settles(
            dx in -500.0f64..500.0,
            dy in -500.0f64..500.0,
            scale in 0.1f64..10.0,
            degrees in -360.0f64..360.0,
        ) {
            let mut a = Animator::default();
            a.scroll(dx, dy);
            a.scale(scale, 20.0, 30.0);
            a.rotate(degrees, -5.0, 5.0);
            let mut frames = 0;
            while a.compute() {
                frames += 1;
                prop_assert!(frames < 10_000);
            }
            prop_assert_eq!(a.current_transform(), a.final_transform());
        }
    }
}
