//! Host-neutral crop surface.
//!
//! [`CropSurface`] wires the [`Animator`], the [`ClipRectSolver`] and the
//! gesture detectors together the way an interactive crop view needs them,
//! without doing any painting. A host feeds it touches and decode callbacks,
//! calls [`CropSurface::tick`] once per display frame and paints what
//! [`CropSurface::frame`] reports.
//!
//! Behaviour at the edges of the image:
//! - scrolling past the crop frame is rubber-banded
//! - shrinking below the fit scale is rubber-banded
//! - on release the image grows or slides back until it covers the crop frame

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::animator::{compute_scale_passrate, compute_scroll_passrate, Animator};
use crate::clip::{ClipChangeListener, ClipRectSolver};
use crate::config::{ConfigError, SurfaceConfig};
use crate::decode::{DecodeError, DecodeEvent, DecodeTracker, ImageInfo};
use crate::geometry::{fit_inside_scale, Rect};
use crate::gesture::{
    HoverDetector, HoverListener, ScaleRotateDetector, ScaleRotateListener, ScaleRotateSample,
    ScrollListener, TapListener, TapScrollDetector, TouchEvent, UpDetector, UpListener,
};

/// Everything a host needs to paint one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameState {
    /// Image-to-display transform as `[a, b, c, d, e, f]`, the column order
    /// of a 2D canvas `setTransform`.
    pub transform: [f64; 6],
    /// Crop frame as painted this frame.
    pub clip_rect: Rect,
    /// Crop frame the painted one is easing toward.
    pub target_clip_rect: Rect,
    /// Bounding box of the transformed image.
    pub drawing_bounds: Rect,
    pub grid_alpha: f64,
    pub frame_alpha: f64,
    /// Decode progress in `[0, 1]`.
    pub progress: f32,
    pub has_image: bool,
}

/// Scale/rotate values seen at the previous callback; the detector reports
/// totals since the gesture began, the animator wants increments.
#[derive(Debug, Clone, Copy)]
struct GestureTotals {
    scale: f64,
    rotation_degrees: f64,
}

impl Default for GestureTotals {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation_degrees: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CropSurface {
    config: SurfaceConfig,
    animator: Animator,
    clip: ClipRectSolver,
    tap_scroll: TapScrollDetector,
    scale_rotate: ScaleRotateDetector,
    hover: HoverDetector,
    up: UpDetector,
    decode: DecodeTracker,
    totals: GestureTotals,
    has_image: bool,
}

impl Default for CropSurface {
    fn default() -> Self {
        Self::build(SurfaceConfig::default())
    }
}

impl CropSurface {
    /// # Errors
    ///
    /// Returns the first field of `config` that is out of range.
    pub fn new(config: SurfaceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SurfaceConfig) -> Self {
        let mut clip = ClipRectSolver::new(&config);
        clip.set_enabled(false);
        Self {
            animator: Animator::new(config.zoom_in_multiplier),
            clip,
            tap_scroll: TapScrollDetector::new(&config.gesture),
            scale_rotate: ScaleRotateDetector::new(config.gesture),
            hover: HoverDetector::new(),
            up: UpDetector::new(),
            decode: DecodeTracker::new(),
            totals: GestureTotals::default(),
            has_image: false,
            config,
        }
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn clip(&self) -> &ClipRectSolver {
        &self.clip
    }

    pub fn has_image(&self) -> bool {
        self.has_image
    }

    /// Set the area of the host surface the image may occupy.
    ///
    /// A loaded image is re-fitted to the new area.
    pub fn set_viewport(&mut self, left: f64, top: f64, right: f64, bottom: f64) {
        let display = Rect::new(left, top, right, bottom);
        if !display.is_finite() {
            log::debug!("surface: ignoring non-finite viewport {display:?}");
            return;
        }
        let display = display.normalized();
        if display == self.animator.display_rect() {
            return;
        }
        self.animator.set_display_rect(display);
        self.clip.set_limit_rect(display);
        if self.has_image {
            self.revert(false);
            self.clip.force_finish();
        }
    }

    /// Show an image of the given size, fitted and uncropped.
    pub fn set_image(&mut self, width: f64, height: f64) -> bool {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            log::warn!("surface: ignoring image of size {width}x{height}");
            return false;
        }
        let image = Rect::new(0.0, 0.0, width, height);
        self.clip.set_clip_rect(image);
        self.animator.set_image_rect(image);
        self.has_image = true;
        self.clip.set_enabled(true);
        self.revert(false);
        self.clip.force_finish();
        true
    }

    /// Forget the previous decode; call before starting a new one.
    pub fn begin_decode(&mut self) {
        self.decode.reset();
    }

    /// Feed one decode-service callback.
    ///
    /// A successful decode shows the image upright. A failure is returned
    /// unchanged; everything else, including contract violations, is `Ok`.
    pub fn on_decode_event(&mut self, event: DecodeEvent) -> Result<(), DecodeError> {
        match self.decode.on_event(event) {
            Some(Ok(info)) => {
                self.show_decoded(&info);
                Ok(())
            }
            Some(Err(err)) => {
                log::warn!("surface: decode failed: {err}");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn show_decoded(&mut self, info: &ImageInfo) {
        let (width, height) = info.oriented_size();
        self.set_image(f64::from(width), f64::from(height));
    }

    /// Fit the image back inside the viewport with no rotation, and stretch
    /// the crop frame over it.
    pub fn revert(&mut self, with_animation: bool) {
        self.animator.revert(with_animation);
        let bounds = self.animator.drawing_out_bound();
        self.clip.set_drawing_bounds(bounds);
        self.clip.set_limit_rect(bounds);
        self.clip.set_rotation(self.animator.degree());
        self.clip.resize_to_limit_rect();
    }

    /// Rotate the image by `degrees` about the viewport center.
    pub fn rotate(&mut self, degrees: f64) {
        let center = self.animator.display_center();
        self.animator.rotate(degrees, center.x, center.y);
    }

    /// Quarter turn. The crop frame swaps its sides, is fitted into the
    /// viewport and centered; the image follows it.
    pub fn rotate_direction(&mut self, clockwise: bool) {
        let clip = self.clip.clip_rect();
        let display = self.animator.display_rect();
        if clip.is_empty() || display.is_empty() {
            return;
        }
        let (width, height) = (clip.height(), clip.width());
        let scale = fit_inside_scale(width, height, display.width(), display.height());
        let center = display.center();

        let shift = clip.center() - center;
        self.animator.scroll(shift.x, shift.y);
        self.animator
            .rotate(if clockwise { 90.0 } else { -90.0 }, center.x, center.y);
        self.animator.scale(scale, center.x, center.y);
        self.clip
            .set_clip_rect(Rect::from_center(center, width * scale, height * scale));
        log::debug!("surface: quarter turn (clockwise: {clockwise}), fit scale {scale}");
    }

    /// Switch crop aspect; `FREE_RATIO` (or any non-positive value) frees it.
    ///
    /// A reshaped frame is then zoomed to fill the display, as on the release
    /// of a handle drag. Returns the frame's new destination.
    pub fn change_clip_ratio(&mut self, ratio: f64) -> Option<Rect> {
        let rect = self.clip.set_frame_ratio(ratio)?;
        let dest = ClipFollower {
            animator: &mut self.animator,
        }
        .on_clip_stop(&rect)
        .unwrap_or(rect);
        self.clip.zoom_to(dest);
        Some(dest)
    }

    /// Crop in `[0, 1]` image-relative coordinates.
    pub fn crop_rect(&self) -> Option<Rect> {
        self.animator.normalized_clip_rect(&self.clip.clip_rect())
    }

    /// Crop in image pixels.
    pub fn image_crop_rect(&self) -> Option<Rect> {
        self.animator.image_clip_rect(&self.clip.clip_rect())
    }

    /// Route one touch sample. The crop frame gets first pick; when it does
    /// not claim the event every image gesture sees it.
    pub fn on_touch_event(&mut self, event: &TouchEvent) -> bool {
        if !self.has_image {
            return false;
        }
        let Self {
            config,
            animator,
            clip,
            tap_scroll,
            scale_rotate,
            hover,
            up,
            totals,
            ..
        } = self;

        let mut follower = ClipFollower {
            animator: &mut *animator,
        };
        if clip.on_touch_event(event, &mut follower) {
            return true;
        }

        let mut responder = Responder {
            config: &*config,
            animator,
            clip: clip.clip_rect(),
            totals,
        };
        let tapped = tap_scroll.on_touch_event(event, &mut responder);
        let scaled = scale_rotate.on_touch_event(event, &mut responder);
        let hovered = hover.on_touch_event(event, &mut responder);
        let lifted = up.on_touch_event(event, &mut responder);
        tapped | scaled | hovered | lifted
    }

    /// Advance every animation one frame. Returns `true` while the host
    /// should keep calling.
    pub fn tick(&mut self) -> bool {
        let pending = {
            let mut responder = Responder {
                config: &self.config,
                animator: &mut self.animator,
                clip: self.clip.clip_rect(),
                totals: &mut self.totals,
            };
            self.scale_rotate.run_pending(&mut responder)
        };

        let animating = self.animator.compute();
        if self.has_image {
            self.clip
                .set_drawing_bounds(self.animator.drawing_out_bound());
            self.clip.set_limit_rect(self.animator.display_rect());
            self.clip.set_rotation(self.animator.degree());
        }
        let clip_animating = self.clip.step();
        let redraw = self.animator.take_redraw_request();

        pending || animating || clip_animating || redraw
    }

    pub fn frame(&self) -> FrameState {
        FrameState {
            transform: self.animator.current_transform().to_cols_array(),
            clip_rect: self.clip.animated_clip_rect(),
            target_clip_rect: self.clip.clip_rect(),
            drawing_bounds: self.animator.current_drawing_bound(),
            grid_alpha: self.clip.grid_alpha(),
            frame_alpha: self.clip.frame_alpha(),
            progress: self.decode.progress(),
            has_image: self.has_image,
        }
    }
}

/// Image gestures, applied to the animator relative to the crop frame.
struct Responder<'a> {
    config: &'a SurfaceConfig,
    animator: &'a mut Animator,
    clip: Rect,
    totals: &'a mut GestureTotals,
}

impl TapListener for Responder<'_> {
    fn on_double_tap(&mut self, _point: DVec2) {
        self.animator.toggle_zoom();
    }
}

impl ScrollListener for Responder<'_> {
    fn on_scroll(&mut self, distance: DVec2) {
        if self.config.enable_translate_gesture {
            damping_scroll(
                self.animator,
                &self.clip,
                distance,
                self.config.damping_distance_px(),
            );
        }
    }
}

impl ScaleRotateListener for Responder<'_> {
    fn on_scale_rotate_begin(&mut self, sample: &ScaleRotateSample) {
        self.totals.scale = sample.scale;
        self.totals.rotation_degrees = sample.rotation_degrees;
    }

    fn on_scale_rotate(&mut self, sample: &ScaleRotateSample) {
        if self.config.enable_scale_gesture && self.totals.scale > 0.0 {
            damping_scale(
                self.animator,
                sample.scale / self.totals.scale,
                self.config.damping_scale,
            );
        }
        if self.config.enable_rotate_gesture {
            let center = self.animator.display_center();
            self.animator.rotate(
                sample.rotation_degrees - self.totals.rotation_degrees,
                center.x,
                center.y,
            );
        }
        self.totals.scale = sample.scale;
        self.totals.rotation_degrees = sample.rotation_degrees;
    }
}

impl HoverListener for Responder<'_> {}

impl UpListener for Responder<'_> {
    fn on_up(&mut self, _point: DVec2) {
        scale_image_back(self.animator, &self.clip);
        scroll_image_back(self.animator, &self.clip);
    }
}

/// Keeps the image under the crop frame while a handle is dragged.
struct ClipFollower<'a> {
    animator: &'a mut Animator,
}

impl ClipChangeListener for ClipFollower<'_> {
    fn on_clip_changing(&mut self, clip: &Rect) {
        scroll_image_back(self.animator, clip);
    }

    fn on_clip_stop(&mut self, clip: &Rect) -> Option<Rect> {
        self.animator.zoom_in(clip)
    }
}

/// How far `clip` sticks out of `bounds` on each axis, signed in the
/// direction the image has to move to cover it. Zero where it is covered.
fn overhang(bounds: &Rect, clip: &Rect) -> DVec2 {
    let center = bounds.center() - clip.center();
    let x = if center.x > 0.0 {
        (clip.left - bounds.left).min(0.0)
    } else {
        (clip.right - bounds.right).max(0.0)
    };
    let y = if center.y > 0.0 {
        (clip.top - bounds.top).min(0.0)
    } else {
        (clip.bottom - bounds.bottom).max(0.0)
    };
    DVec2::new(x, y)
}

fn damping_scroll(animator: &mut Animator, clip: &Rect, distance: DVec2, damping: f64) {
    let bounds = animator.drawing_out_bound();
    let mut distance = distance;
    if !bounds.contains(clip) {
        let over = overhang(&bounds, clip);
        distance.x *= compute_scroll_passrate(over.x, damping);
        distance.y *= compute_scroll_passrate(over.y, damping);
    }
    if distance != DVec2::ZERO {
        animator.scroll(distance.x, distance.y);
    }
}

/// Apply an incremental pinch `scale` about the viewport center, resisting
/// once the image is smaller than its fit scale.
fn damping_scale(animator: &mut Animator, scale: f64, damping: f64) {
    let current = animator.scale_value();
    let min = animator.current_suggest_scale();
    let mut delta = scale;
    if current > 0.0 && current < min {
        let passrate = compute_scale_passrate(min / current, damping);
        delta = (scale - 1.0) * passrate + 1.0;
    }
    if delta != 1.0 {
        let center = animator.display_center();
        animator.scale(delta, center.x, center.y);
    }
}

/// Grow the image until it covers `clip`, or shrink it when the crop frame
/// shows less than `1 / zoom_in_multiplier` of it.
fn scale_image_back(animator: &mut Animator, clip: &Rect) {
    let bounds = animator.drawing_out_bound();
    if bounds.is_empty() || clip.is_empty() {
        return;
    }
    let center = animator.display_center();
    if clip.width() > bounds.width() || clip.height() > bounds.height() {
        let grow = (clip.width() / bounds.width())
            .max(clip.height() / bounds.height())
            .max(1.0);
        if grow != 1.0 {
            log::debug!("surface: growing image by {grow} to cover the crop");
            animator.scale(grow, center.x, center.y);
        }
    } else {
        let magnified = (bounds.width() / clip.width()).min(bounds.height() / clip.height());
        let limit = animator.zoom_in_multiplier();
        if magnified > limit {
            log::debug!("surface: zoomed {magnified}x past {limit}x, shrinking");
            animator.scale(limit / magnified, center.x, center.y);
        }
    }
}

/// Slide the image until it contains `clip`.
fn scroll_image_back(animator: &mut Animator, clip: &Rect) {
    let bounds = animator.drawing_out_bound();
    if bounds.contains(clip) {
        return;
    }
    let over = overhang(&bounds, clip);
    if over != DVec2::ZERO {
        animator.scroll(-over.x, -over.y);
    }
}
