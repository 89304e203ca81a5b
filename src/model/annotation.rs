use smallvec::SmallVec;

use crate::foundation::core::{NormPoint, Rgba8};
use crate::foundation::error::{ReviewError, ReviewResult};

/// Performance marker category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerCategory {
    /// Something done well.
    Success,
    /// Something to work on.
    Improvement,
    /// A coaching cue.
    Coaching,
}

/// Point-in-time performance marker.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnnotationMarker {
    /// Record identifier (stable within a session).
    pub id: String,
    /// Position on the session timeline, in seconds.
    pub time: f64,
    /// Marker category.
    pub category: MarkerCategory,
    /// Free-form description.
    pub description: String,
    /// Confidence score in `[0, 100]`.
    pub confidence: f64,
}

impl AnnotationMarker {
    /// Check the record invariants against a session duration.
    pub fn validate(&self, duration: f64) -> ReviewResult<()> {
        if !self.time.is_finite() || self.time < 0.0 || self.time > duration {
            return Err(ReviewError::validation(format!(
                "marker '{}' time {} is outside [0, {duration}]",
                self.id, self.time
            )));
        }
        if !(0.0..=100.0).contains(&self.confidence) {
            return Err(ReviewError::validation(format!(
                "marker '{}' confidence {} is outside [0, 100]",
                self.id, self.confidence
            )));
        }
        Ok(())
    }
}

/// Overlay shape kind as it appears on the wire and in the authoring tool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    /// Two anchors, arrowhead at the end anchor.
    Arrow,
    /// Center anchor plus normalized radius.
    Circle,
    /// Two anchors.
    Line,
    /// Two opposite-corner anchors.
    #[serde(rename = "box")]
    Rect,
}

/// Overlay geometry in normalized frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayShape {
    /// Arrow from `from` to `to`.
    Arrow {
        /// Tail anchor.
        from: NormPoint,
        /// Head anchor.
        to: NormPoint,
    },
    /// Circle around `center`; `radius` is a fraction of the surface's shorter side.
    Circle {
        /// Center anchor.
        center: NormPoint,
        /// Normalized radius.
        radius: f64,
    },
    /// Straight line.
    Line {
        /// First anchor.
        from: NormPoint,
        /// Second anchor.
        to: NormPoint,
    },
    /// Axis-aligned box spanned by two opposite corners.
    #[serde(rename = "box")]
    Rect {
        /// First corner.
        a: NormPoint,
        /// Opposite corner.
        b: NormPoint,
    },
}

impl OverlayShape {
    /// Build a shape from a kind and its anchors. Circles take a radius; the other kinds take
    /// exactly two anchors.
    pub fn from_anchors(
        kind: ShapeKind,
        anchors: &[NormPoint],
        radius: Option<f64>,
    ) -> ReviewResult<Self> {
        let shape = match (kind, anchors) {
            (ShapeKind::Circle, [center]) => {
                let radius = radius.ok_or_else(|| ReviewError::validation("circle needs a radius"))?;
                Self::Circle {
                    center: *center,
                    radius,
                }
            }
            (ShapeKind::Arrow, [from, to]) => Self::Arrow {
                from: *from,
                to: *to,
            },
            (ShapeKind::Line, [from, to]) => Self::Line {
                from: *from,
                to: *to,
            },
            (ShapeKind::Rect, [a, b]) => Self::Rect { a: *a, b: *b },
            (kind, anchors) => {
                return Err(ReviewError::validation(format!(
                    "{kind:?} shape cannot be built from {} anchor(s)",
                    anchors.len()
                )));
            }
        };
        shape.validate()?;
        Ok(shape)
    }

    /// Wire kind of this shape.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Arrow { .. } => ShapeKind::Arrow,
            Self::Circle { .. } => ShapeKind::Circle,
            Self::Line { .. } => ShapeKind::Line,
            Self::Rect { .. } => ShapeKind::Rect,
        }
    }

    /// Anchor the optional label is offset from.
    pub fn primary_anchor(&self) -> NormPoint {
        match *self {
            Self::Arrow { from, .. } | Self::Line { from, .. } => from,
            Self::Circle { center, .. } => center,
            Self::Rect { a, .. } => a,
        }
    }

    /// Anchor points in wire order; circles have one.
    pub fn anchors(&self) -> SmallVec<[NormPoint; 2]> {
        match *self {
            Self::Arrow { from, to } | Self::Line { from, to } => smallvec::smallvec![from, to],
            Self::Circle { center, .. } => smallvec::smallvec![center],
            Self::Rect { a, b } => smallvec::smallvec![a, b],
        }
    }

    /// Every anchor lies in `[0, 1]` and a circle radius lies in `(0, 1]`.
    pub fn validate(&self) -> ReviewResult<()> {
        if let Some(p) = self.anchors().iter().find(|p| !p.is_valid()) {
            return Err(ReviewError::validation(format!(
                "anchor ({}, {}) is outside the normalized range",
                p.x, p.y
            )));
        }
        if let Self::Circle { radius, .. } = *self
            && !(radius.is_finite() && radius > 0.0 && radius <= 1.0)
        {
            return Err(ReviewError::validation(format!(
                "circle radius {radius} must be in (0, 1]"
            )));
        }
        Ok(())
    }
}

/// Time-bound vector overlay drawn over the video.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlaySegment {
    /// Record identifier (stable within a session).
    pub id: String,
    /// Interval start, in seconds.
    pub start: f64,
    /// Interval end (inclusive), in seconds.
    pub end: f64,
    /// Geometry in normalized coordinates.
    pub shape: OverlayShape,
    /// Stroke color.
    pub color: Rgba8,
    /// Optional text label drawn next to the primary anchor.
    pub label: Option<String>,
    /// Free-form description.
    pub description: String,
}

impl OverlaySegment {
    /// Check the interval and shape against a session duration.
    pub fn validate(&self, duration: f64) -> ReviewResult<()> {
        validate_interval("overlay", &self.id, self.start, self.end, duration)?;
        self.shape
            .validate()
            .map_err(|e| ReviewError::validation(format!("overlay '{}': {e}", self.id)))
    }

    /// `start <= t <= end`.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

/// Time-bound spoken or written analysis.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CommentarySegment {
    /// Record identifier (stable within a session).
    pub id: String,
    /// Interval start, in seconds.
    pub start: f64,
    /// Interval end (inclusive), in seconds.
    pub end: f64,
    /// Author display identity.
    pub author: String,
    /// Commentary text.
    pub text: String,
    /// Rating in `[0, 5]`.
    pub rating: f64,
}

impl CommentarySegment {
    /// Check the interval and rating against a session duration.
    pub fn validate(&self, duration: f64) -> ReviewResult<()> {
        validate_interval("commentary", &self.id, self.start, self.end, duration)?;
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(ReviewError::validation(format!(
                "commentary '{}' rating {} is outside [0, 5]",
                self.id, self.rating
            )));
        }
        Ok(())
    }

    /// `start <= t <= end`.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }
}

fn validate_interval(kind: &str, id: &str, start: f64, end: f64, duration: f64) -> ReviewResult<()> {
    if !start.is_finite() || !end.is_finite() {
        return Err(ReviewError::validation(format!(
            "{kind} '{id}' has a non-finite interval"
        )));
    }
    if start > end {
        return Err(ReviewError::validation(format!(
            "{kind} '{id}' has invalid interval (start > end)"
        )));
    }
    if start < 0.0 || start > duration {
        return Err(ReviewError::validation(format!(
            "{kind} '{id}' starts outside the session duration"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/model/annotation.rs"]
mod tests;
