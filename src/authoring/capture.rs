//! Pointer-gesture capture of new overlay shapes.
//!
//! Capture is only possible while playback is paused. Pointer positions arrive in surface
//! pixels and are stored normalized, so a resize mid-gesture does not distort the shape.

use std::time::Duration;

use crate::foundation::core::{NormPoint, Point, Rgba8, SurfaceSize, clamp_time};
use crate::foundation::error::{ReviewError, ReviewResult};
use crate::geometry::draw::DrawCommand;
use crate::geometry::resolver::{radius_to_normalized, resolve_overlays, to_normalized, to_pixel};
use crate::model::annotation::{OverlaySegment, OverlayShape, ShapeKind};
use crate::playback::controller::PlaybackMode;

/// Default lifetime of a freshly drawn overlay.
pub const DEFAULT_OVERLAY_DURATION: Duration = Duration::from_secs(4);
/// Gestures whose endpoints are closer than this (in surface pixels) are discarded.
pub const DEFAULT_MIN_GESTURE_PX: f64 = 6.0;

/// The current authoring tool. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum AuthoringTool {
    /// No drawing tool selected.
    #[default]
    Idle,
    /// A shape kind is selected; waiting for pointer down.
    Armed {
        /// Selected shape.
        kind: ShapeKind,
    },
    /// Pointer is down.
    Capturing {
        /// Shape being drawn.
        kind: ShapeKind,
        /// Pointer-down position.
        origin: NormPoint,
        /// Latest pointer position.
        current: NormPoint,
    },
    /// Pointer released; the gesture awaits commit.
    Completed {
        /// Shape drawn.
        kind: ShapeKind,
        /// Pointer-down position.
        origin: NormPoint,
        /// Pointer-up position.
        end: NormPoint,
    },
}

impl AuthoringTool {
    /// Selected shape kind, unless idle.
    pub fn kind(&self) -> Option<ShapeKind> {
        match *self {
            Self::Idle => None,
            Self::Armed { kind } | Self::Capturing { kind, .. } | Self::Completed { kind, .. } => {
                Some(kind)
            }
        }
    }

    /// No tool is selected.
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Result of committing a gesture.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CaptureOutcome {
    /// The gesture became this overlay.
    Committed(OverlaySegment),
    /// Nothing was stored; the tool stays armed with the same shape kind.
    Discarded {
        /// Why the gesture was dropped.
        reason: String,
    },
}

/// Appearance and timing of captured overlays.
#[derive(Clone, Debug)]
pub struct CaptureOpts {
    /// Stroke color of new overlays.
    pub color: Rgba8,
    /// Label attached to new overlays.
    pub label: Option<String>,
    /// Shorter gestures are discarded.
    pub min_gesture_px: f64,
    /// Lifetime of a new overlay unless one is given at commit.
    pub default_duration: Duration,
}

impl Default for CaptureOpts {
    fn default() -> Self {
        Self {
            color: Rgba8::YELLOW,
            label: None,
            min_gesture_px: DEFAULT_MIN_GESTURE_PX,
            default_duration: DEFAULT_OVERLAY_DURATION,
        }
    }
}

/// Authoring-side gesture state machine.
#[derive(Clone, Debug, Default)]
pub struct DrawingCapture {
    tool: AuthoringTool,
    opts: CaptureOpts,
    committed: u64,
}

fn require_paused(mode: PlaybackMode, op: &str) -> ReviewResult<()> {
    if mode == PlaybackMode::Paused {
        Ok(())
    } else {
        Err(ReviewError::authoring_conflict(format!(
            "{op} requires paused playback (current: {mode:?})"
        )))
    }
}

fn normalize(p: Point, surface: SurfaceSize) -> ReviewResult<NormPoint> {
    to_normalized(p, surface).map_err(|e| ReviewError::state(e.to_string()))
}

impl DrawingCapture {
    /// Idle capture using `opts`.
    pub fn new(opts: CaptureOpts) -> Self {
        Self {
            tool: AuthoringTool::Idle,
            opts,
            committed: 0,
        }
    }

    /// Current tool state.
    pub fn tool(&self) -> AuthoringTool {
        self.tool
    }

    /// Appearance and timing options.
    pub fn opts(&self) -> &CaptureOpts {
        &self.opts
    }

    /// Color for subsequent overlays.
    pub fn set_color(&mut self, color: Rgba8) {
        self.opts.color = color;
    }

    /// Label for subsequent overlays; an empty label clears it.
    pub fn set_label(&mut self, label: Option<String>) {
        self.opts.label = label.filter(|l| !l.is_empty());
    }

    fn set_tool(&mut self, tool: AuthoringTool) {
        if self.tool != tool {
            tracing::trace!(from = ?self.tool, to = ?tool, "authoring tool");
            self.tool = tool;
        }
    }

    /// Select a shape kind. Any unfinished gesture is dropped.
    ///
    /// Rejected with `AuthoringConflict` unless playback is paused; the tool is left untouched.
    pub fn start(&mut self, kind: ShapeKind, mode: PlaybackMode) -> ReviewResult<()> {
        require_paused(mode, "start drawing")?;
        self.set_tool(AuthoringTool::Armed { kind });
        Ok(())
    }

    /// Begin a gesture at `p`. Requires an armed tool.
    pub fn pointer_down(&mut self, p: Point, surface: SurfaceSize) -> ReviewResult<()> {
        let kind = match self.tool {
            AuthoringTool::Armed { kind } | AuthoringTool::Completed { kind, .. } => kind,
            AuthoringTool::Capturing { .. } => {
                return Err(ReviewError::state("pointer already down"));
            }
            AuthoringTool::Idle => return Err(ReviewError::state("no drawing tool selected")),
        };
        let origin = normalize(p, surface)?;
        self.set_tool(AuthoringTool::Capturing {
            kind,
            origin,
            current: origin,
        });
        Ok(())
    }

    /// Track the pointer. Ignored unless a gesture is in progress.
    pub fn pointer_move(&mut self, p: Point, surface: SurfaceSize) -> ReviewResult<()> {
        if let AuthoringTool::Capturing { current, .. } = &mut self.tool {
            *current = normalize(p, surface)?;
        }
        Ok(())
    }

    /// Finish the gesture at `p`; it then awaits commit.
    pub fn pointer_up(&mut self, p: Point, surface: SurfaceSize) -> ReviewResult<()> {
        let AuthoringTool::Capturing { kind, origin, .. } = self.tool else {
            return Err(ReviewError::state("pointer up without a gesture in progress"));
        };
        let end = normalize(p, surface)?;
        self.set_tool(AuthoringTool::Completed { kind, origin, end });
        Ok(())
    }

    /// Turn the finished gesture into an overlay anchored at `time`.
    ///
    /// `duration` overrides the default lifetime; the end is clamped to `session_duration`.
    /// A gesture shorter than `min_gesture_px` on `surface` is discarded.
    pub fn commit(
        &mut self,
        mode: PlaybackMode,
        time: f64,
        session_duration: f64,
        surface: SurfaceSize,
        duration: Option<f64>,
    ) -> ReviewResult<CaptureOutcome> {
        require_paused(mode, "commit drawing")?;
        let (kind, origin, end) = match self.tool {
            AuthoringTool::Completed { kind, origin, end } => (kind, origin, end),
            AuthoringTool::Capturing {
                kind,
                origin,
                current,
            } => (kind, origin, current),
            _ => return Err(ReviewError::state("no finished gesture to commit")),
        };
        if !surface.is_available() {
            return Err(ReviewError::state("render surface unavailable"));
        }
        let span = match duration {
            Some(d) if !(d.is_finite() && d > 0.0) => {
                return Err(ReviewError::validation(format!(
                    "overlay duration {d} must be positive"
                )));
            }
            Some(d) => d,
            None => self.opts.default_duration.as_secs_f64(),
        };

        let dist_px = to_pixel(origin, surface).distance(to_pixel(end, surface));
        if dist_px < self.opts.min_gesture_px {
            self.set_tool(AuthoringTool::Armed { kind });
            tracing::debug!(dist_px, min = self.opts.min_gesture_px, "degenerate gesture discarded");
            return Ok(CaptureOutcome::Discarded {
                reason: format!(
                    "gesture of {dist_px:.1}px is below the {}px minimum",
                    self.opts.min_gesture_px
                ),
            });
        }

        let shape = match kind {
            ShapeKind::Circle => {
                let radius = radius_to_normalized(dist_px, surface)
                    .map_err(|e| ReviewError::state(e.to_string()))?;
                OverlayShape::from_anchors(kind, &[origin], Some(radius))?
            }
            _ => OverlayShape::from_anchors(kind, &[origin, end], None)?,
        };

        let start = clamp_time(time, session_duration);
        self.committed += 1;
        let segment = OverlaySegment {
            id: format!("local-{}", self.committed),
            start,
            end: (start + span).min(session_duration),
            shape,
            color: self.opts.color,
            label: self.opts.label.clone(),
            description: String::new(),
        };
        tracing::debug!(id = %segment.id, start, end = segment.end, ?kind, "overlay captured");
        self.set_tool(AuthoringTool::Armed { kind });
        Ok(CaptureOutcome::Committed(segment))
    }

    /// Drop any gesture and deselect the tool.
    pub fn cancel(&mut self) {
        self.set_tool(AuthoringTool::Idle);
    }

    /// Abandon authoring when playback leaves `Paused`. Returns whether anything was dropped.
    pub fn on_mode_change(&mut self, mode: PlaybackMode) -> bool {
        if mode == PlaybackMode::Paused || self.tool.is_idle() {
            return false;
        }
        tracing::debug!(?mode, tool = ?self.tool, "authoring abandoned");
        self.tool = AuthoringTool::Idle;
        true
    }

    /// Draw commands for the gesture in progress, for rubber-band feedback.
    pub fn preview(&self, surface: SurfaceSize) -> Vec<DrawCommand> {
        let (kind, origin, end) = match self.tool {
            AuthoringTool::Capturing {
                kind,
                origin,
                current,
            } => (kind, origin, current),
            AuthoringTool::Completed { kind, origin, end } => (kind, origin, end),
            _ => return Vec::new(),
        };
        if !surface.is_available() {
            return Vec::new();
        }
        let shape = match kind {
            ShapeKind::Circle => {
                let dist_px = to_pixel(origin, surface).distance(to_pixel(end, surface));
                let Ok(radius) = radius_to_normalized(dist_px, surface) else {
                    return Vec::new();
                };
                if radius <= 0.0 {
                    return Vec::new();
                }
                OverlayShape::Circle {
                    center: origin,
                    radius,
                }
            }
            _ => match OverlayShape::from_anchors(kind, &[origin, end], None) {
                Ok(s) => s,
                Err(_) => return Vec::new(),
            },
        };
        let seg = OverlaySegment {
            id: "preview".to_string(),
            start: 0.0,
            end: 0.0,
            shape,
            color: self.opts.color,
            label: None,
            description: String::new(),
        };
        resolve_overlays(&[&seg], surface).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/authoring/capture.rs"]
mod tests;
