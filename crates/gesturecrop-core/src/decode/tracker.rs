//! Contract enforcement for an asynchronous decode service.

use super::{DecodeError, DecodeEvent, ImageInfo};

/// Filters decode callbacks down to a monotonic progress value and a single
/// terminal outcome.
///
/// Regressing progress and anything arriving after the terminal event are
/// dropped and logged. The tracker never fails; it only tells the caller which
/// events to act on.
#[derive(Debug, Clone, Default)]
pub struct DecodeTracker {
    progress: f32,
    outcome: Option<Result<ImageInfo, DecodeError>>,
}

impl DecodeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous decode before starting a new one.
    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.outcome = None;
    }

    /// Progress in `[0, 1]`; `1.0` once decoded.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&Result<ImageInfo, DecodeError>> {
        self.outcome.as_ref()
    }

    /// Feed one service callback.
    ///
    /// Returns the terminal outcome the first time one arrives, `None` for
    /// progress updates and for anything that breaks the contract.
    pub fn on_event(&mut self, event: DecodeEvent) -> Option<Result<ImageInfo, DecodeError>> {
        if self.outcome.is_some() {
            log::warn!("decode: event after terminal callback dropped: {event:?}");
            return None;
        }
        match event {
            DecodeEvent::Progress(value) => {
                if !value.is_finite() {
                    log::warn!("decode: non-finite progress dropped");
                    return None;
                }
                let value = value.clamp(0.0, 1.0);
                if value < self.progress {
                    log::warn!(
                        "decode: progress regressed from {} to {value}",
                        self.progress
                    );
                } else {
                    self.progress = value;
                }
                None
            }
            DecodeEvent::Decoded(info) => {
                self.progress = 1.0;
                self.finish(Ok(info))
            }
            DecodeEvent::Failed(err) => self.finish(Err(err)),
        }
    }

    fn finish(
        &mut self,
        outcome: Result<ImageInfo, DecodeError>,
    ) -> Option<Result<ImageInfo, DecodeError>> {
        log::debug!("decode: finished with {outcome:?}");
        self.outcome = Some(outcome.clone());
        Some(outcome)
    }
}
