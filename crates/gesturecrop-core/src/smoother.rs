//! Exponential smoothing toward a destination.
//!
//! Every animated quantity in the engine (pose control points, clip rectangle
//! edges, overlay alpha, gesture deltas) converges through the same rule:
//!
//! ```text
//! next = current + (destination - current) * factor
//! ```
//!
//! A step finishes, snapping `current` exactly onto `destination`, when the
//! next value is bit-identical to the current one in every component or when
//! the summed absolute residual drops to `error_threshold` or below.

use crate::config::SmootherConfig;

/// Fixed-arity smoother over `N` components.
#[derive(Debug, Clone, PartialEq)]
pub struct Smoother<const N: usize> {
    current: [f64; N],
    destination: [f64; N],
    factor: f64,
    error_threshold: f64,
    bypassed: bool,
}

pub type Smoother1 = Smoother<1>;
pub type Smoother2 = Smoother<2>;
pub type Smoother3 = Smoother<3>;
pub type Smoother4 = Smoother<4>;

impl<const N: usize> Smoother<N> {
    /// Create a smoother resting at zero.
    ///
    /// `factor` outside `(0, 1]` falls back to `1.0` (instant convergence) and
    /// a negative or non-finite threshold falls back to `0.0`.
    pub fn new(factor: f64, error_threshold: f64) -> Self {
        Self {
            current: [0.0; N],
            destination: [0.0; N],
            factor: sanitize_factor(factor),
            error_threshold: sanitize_threshold(error_threshold),
            bypassed: false,
        }
    }

    pub fn from_config(config: &SmootherConfig) -> Self {
        Self::new(config.factor, config.error_threshold)
    }

    pub fn current(&self) -> [f64; N] {
        self.current
    }

    pub fn destination(&self) -> [f64; N] {
        self.destination
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn error_threshold(&self) -> f64 {
        self.error_threshold
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    /// When bypassed, every step snaps straight to the destination.
    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.bypassed = bypassed;
    }

    /// Set the target. Destinations containing NaN or infinity are ignored.
    pub fn set_destination(&mut self, destination: [f64; N]) {
        if destination.iter().all(|v| v.is_finite()) {
            self.destination = destination;
        } else {
            log::debug!("smoother: ignoring non-finite destination {destination:?}");
        }
    }

    /// Jump both current and destination to `value`.
    pub fn reset_to(&mut self, value: [f64; N]) {
        if value.iter().all(|v| v.is_finite()) {
            self.current = value;
            self.destination = value;
        } else {
            log::debug!("smoother: ignoring non-finite reset {value:?}");
        }
    }

    /// Advance one frame. Returns `true` while more steps are needed.
    pub fn step(&mut self) -> bool {
        step_slices(
            &mut self.current,
            &self.destination,
            self.factor,
            self.error_threshold,
            self.bypassed,
        )
    }

    /// Snap to the destination without waiting for convergence.
    pub fn force_finish(&mut self) {
        self.current = self.destination;
    }

    pub fn is_finished(&self) -> bool {
        self.current == self.destination
    }
}

impl Smoother<1> {
    pub fn value(&self) -> f64 {
        self.current[0]
    }

    pub fn set_target(&mut self, value: f64) {
        self.set_destination([value]);
    }
}

/// Smoother whose dimension is chosen at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct SmootherN {
    current: Vec<f64>,
    destination: Vec<f64>,
    factor: f64,
    error_threshold: f64,
    bypassed: bool,
}

impl SmootherN {
    pub fn new(dimension: usize, factor: f64, error_threshold: f64) -> Self {
        Self {
            current: vec![0.0; dimension],
            destination: vec![0.0; dimension],
            factor: sanitize_factor(factor),
            error_threshold: sanitize_threshold(error_threshold),
            bypassed: false,
        }
    }

    pub fn dimension(&self) -> usize {
        self.current.len()
    }

    pub fn current(&self) -> &[f64] {
        &self.current
    }

    pub fn destination(&self) -> &[f64] {
        &self.destination
    }

    pub fn set_bypassed(&mut self, bypassed: bool) {
        self.bypassed = bypassed;
    }

    /// Set the target. Values of the wrong length or containing non-finite
    /// components are ignored.
    pub fn set_destination(&mut self, destination: &[f64]) {
        if destination.len() != self.current.len() {
            log::debug!(
                "smoother: destination has {} components, expected {}",
                destination.len(),
                self.current.len()
            );
            return;
        }
        if !destination.iter().all(|v| v.is_finite()) {
            log::debug!("smoother: ignoring non-finite destination {destination:?}");
            return;
        }
        self.destination.copy_from_slice(destination);
    }

    pub fn step(&mut self) -> bool {
        step_slices(
            &mut self.current,
            &self.destination,
            self.factor,
            self.error_threshold,
            self.bypassed,
        )
    }

    pub fn force_finish(&mut self) {
        self.current.copy_from_slice(&self.destination);
    }

    pub fn is_finished(&self) -> bool {
        self.current == self.destination
    }
}

fn sanitize_factor(factor: f64) -> f64 {
    if factor > 0.0 && factor <= 1.0 {
        factor
    } else {
        log::debug!("smoother: factor {factor} out of (0, 1], using 1.0");
        1.0
    }
}

fn sanitize_threshold(threshold: f64) -> f64 {
    if threshold >= 0.0 && threshold.is_finite() {
        threshold
    } else {
        0.0
    }
}

fn step_slices(
    current: &mut [f64],
    destination: &[f64],
    factor: f64,
    threshold: f64,
    bypassed: bool,
) -> bool {
    if bypassed {
        current.copy_from_slice(destination);
        return false;
    }

    let mut moved = false;
    let mut residual = 0.0;
    for (cur, &dest) in current.iter_mut().zip(destination) {
        let next = *cur + (dest - *cur) * factor;
        if next != *cur {
            moved = true;
        }
        *cur = next;
        residual += (dest - next).abs();
    }

    if !moved || residual <= threshold {
        current.copy_from_slice(destination);
        false
    } else {
        true
    }
}
