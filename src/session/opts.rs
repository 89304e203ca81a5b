use std::time::Duration;

use crate::authoring::capture::CaptureOpts;
use crate::foundation::error::{ReviewError, ReviewResult};
use crate::index::timeline::DEFAULT_MARKER_WINDOW_S;
use crate::load::retry::RetryPolicy;
use crate::model::batch::DEFAULT_COMMENTARY_SPAN_S;

/// Options controlling a [`crate::ReviewSession`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReviewSessionOpts {
    /// Minimum spacing of coalesced ticks while playing.
    pub tick_interval_ms: u64,
    /// Marker tolerance window (ε), in seconds.
    pub marker_window_s: f64,
    /// Lifetime of a newly drawn overlay unless extended.
    pub default_overlay_duration_s: f64,
    /// Span given to commentary records that carry only a timestamp.
    pub default_commentary_span_s: f64,
    /// Gestures shorter than this are discarded.
    pub min_gesture_px: f64,
    /// Forward jumps beyond this relocate the timeline cursor by binary search.
    pub max_incremental_step_s: f64,
    /// Load retry budget.
    pub retry: RetryPolicy,
}

impl Default for ReviewSessionOpts {
    fn default() -> Self {
        Self {
            tick_interval_ms: 50,
            marker_window_s: DEFAULT_MARKER_WINDOW_S,
            default_overlay_duration_s: 4.0,
            default_commentary_span_s: DEFAULT_COMMENTARY_SPAN_S,
            min_gesture_px: 6.0,
            max_incremental_step_s: 1.0,
            retry: RetryPolicy::default(),
        }
    }
}

impl ReviewSessionOpts {
    /// Parse and validate options; absent keys keep their defaults.
    pub fn from_json_str(s: &str) -> ReviewResult<Self> {
        let opts: Self = serde_json::from_str(s)?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject non-positive windows and durations, negative thresholds, and a zero tick interval.
    pub fn validate(&self) -> ReviewResult<()> {
        let positive = [
            ("marker_window_s", self.marker_window_s),
            ("default_overlay_duration_s", self.default_overlay_duration_s),
            ("default_commentary_span_s", self.default_commentary_span_s),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(ReviewError::validation(format!("{name} must be positive, got {v}")));
            }
        }
        if !(self.min_gesture_px.is_finite() && self.min_gesture_px >= 0.0) {
            return Err(ReviewError::validation("min_gesture_px must be non-negative"));
        }
        if !(self.max_incremental_step_s.is_finite() && self.max_incremental_step_s >= 0.0) {
            return Err(ReviewError::validation(
                "max_incremental_step_s must be non-negative",
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(ReviewError::validation("tick_interval_ms must be at least 1"));
        }
        Ok(())
    }

    /// Tick spacing as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Default overlay lifetime as a [`Duration`].
    pub fn default_overlay_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.default_overlay_duration_s)
            .unwrap_or(crate::authoring::capture::DEFAULT_OVERLAY_DURATION)
    }

    pub(crate) fn capture_opts(&self) -> CaptureOpts {
        CaptureOpts {
            min_gesture_px: self.min_gesture_px,
            default_duration: self.default_overlay_duration(),
            ..CaptureOpts::default()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/opts.rs"]
mod tests;
