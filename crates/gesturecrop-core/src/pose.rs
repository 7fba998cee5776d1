//! Pose: an affine transform tracked through a reference triangle.
//!
//! Blending matrix entries directly distorts rotation and scale, so the
//! animator interpolates the images of three control points instead and
//! solves for the affine map that sends the canonical triangle
//! `{(0,0), (0,1), (1,0)}` onto them.

use glam::{DAffine2, DVec2};

/// Two poses are equal when every polygon coordinate differs by less than this.
pub const EQUAL_ERROR: f64 = 1e-3;

/// Tolerance used when comparing scales (zoom toggling).
pub const SCALE_ERROR: f64 = 1e-3;

/// Fraction of the remaining distance covered by one `forward` step.
pub const FORWARD_FACTOR: f64 = 0.2;

const ORIGIN: DVec2 = DVec2::new(0.0, 0.0);
const UP: DVec2 = DVec2::new(0.0, 1.0);
const RIGHT: DVec2 = DVec2::new(1.0, 0.0);

/// Relative area below which the control triangle counts as collinear.
const DEGENERATE_AREA: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct Pose {
    /// Images of origin, up and right.
    polygon: [DVec2; 3],
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            polygon: [ORIGIN, UP, RIGHT],
        }
    }
}

impl Pose {
    pub fn from_transform(transform: &DAffine2) -> Self {
        let mut pose = Self::default();
        pose.apply(transform);
        pose
    }

    /// Replace the polygon with the canonical triangle mapped through `transform`.
    pub fn apply(&mut self, transform: &DAffine2) {
        let mapped = [ORIGIN, UP, RIGHT].map(|p| transform.transform_point2(p));
        if mapped.iter().all(|p| p.is_finite()) {
            self.polygon = mapped;
        } else {
            log::debug!("pose: ignoring non-finite transform {transform:?}");
        }
    }

    /// Solve for the transform mapping the canonical triangle onto the polygon.
    ///
    /// Returns `None` when the polygon is degenerate.
    pub fn to_affine(&self) -> Option<DAffine2> {
        let [origin, up, right] = self.polygon;
        let x_axis = right - origin;
        let y_axis = up - origin;

        let det = x_axis.perp_dot(y_axis);
        let scale = x_axis.length() * y_axis.length();
        if !det.is_finite() || !scale.is_finite() || det.abs() <= scale * DEGENERATE_AREA {
            return None;
        }
        Some(DAffine2::from_cols(x_axis, y_axis, origin))
    }

    /// Write the solved transform into `out`. On a degenerate polygon `out`
    /// is left untouched and `false` is returned.
    pub fn affine(&self, out: &mut DAffine2) -> bool {
        match self.to_affine() {
            Some(t) => {
                *out = t;
                true
            }
            None => {
                log::debug!("pose: degenerate polygon {:?}, keeping transform", self.polygon);
                false
            }
        }
    }

    /// Move the polygon a fixed fraction toward `dest`.
    ///
    /// Returns `false` (and lands exactly on `dest`) once the two poses are
    /// equal within [`EQUAL_ERROR`].
    pub fn forward(&mut self, dest: &Pose) -> bool {
        for (p, d) in self.polygon.iter_mut().zip(dest.polygon.iter()) {
            *p += (*d - *p) * FORWARD_FACTOR;
        }
        if *self == *dest {
            self.polygon = dest.polygon;
            false
        } else {
            true
        }
    }

    pub fn polygon(&self) -> [DVec2; 3] {
        self.polygon
    }

    /// Image of the origin.
    pub fn translate(&self) -> DVec2 {
        self.polygon[0]
    }

    fn direction(&self) -> DVec2 {
        self.polygon[1] - self.polygon[0]
    }

    /// Rotation in radians relative to the canonical up direction.
    pub fn rotation(&self) -> f64 {
        let dir = self.direction();
        dir.y.atan2(dir.x) - std::f64::consts::FRAC_PI_2
    }

    pub fn degree(&self) -> f64 {
        self.rotation().to_degrees()
    }

    pub fn scale(&self) -> f64 {
        self.direction().length()
    }
}

impl PartialEq for Pose {
    fn eq(&self, other: &Self) -> bool {
        self.polygon
            .iter()
            .zip(other.polygon.iter())
            .all(|(a, b)| (a.x - b.x).abs() < EQUAL_ERROR && (a.y - b.y).abs() < EQUAL_ERROR)
    }
}
