use crate::foundation::core::{BezPath, Circle, Line, Point, Rect, Rgba8};

/// Draw command in absolute surface pixels, emitted by the overlay resolver.
///
/// Commands for one overlay are contiguous and share its `overlay_id`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Straight segment.
    StrokeLine {
        /// Owning overlay.
        overlay_id: String,
        /// Segment in pixels.
        line: Line,
        /// Stroke color.
        color: Rgba8,
        /// Stroke width in pixels.
        width: f64,
    },
    /// Open polyline, used for arrowheads.
    StrokePath {
        /// Owning overlay.
        overlay_id: String,
        /// Path in pixels.
        path: BezPath,
        /// Stroke color.
        color: Rgba8,
        /// Stroke width in pixels.
        width: f64,
    },
    /// Circle outline.
    StrokeCircle {
        /// Owning overlay.
        overlay_id: String,
        /// Circle in pixels.
        circle: Circle,
        /// Stroke color.
        color: Rgba8,
        /// Stroke width in pixels.
        width: f64,
    },
    /// Rectangle outline.
    StrokeRect {
        /// Owning overlay.
        overlay_id: String,
        /// Rectangle in pixels.
        rect: Rect,
        /// Stroke color.
        color: Rgba8,
        /// Stroke width in pixels.
        width: f64,
    },
    /// Text anchored at `origin`.
    Label {
        /// Owning overlay.
        overlay_id: String,
        /// Label text.
        text: String,
        /// Baseline origin in pixels.
        origin: Point,
        /// Text color.
        color: Rgba8,
    },
}

impl DrawCommand {
    /// Id of the overlay this command draws.
    pub fn overlay_id(&self) -> &str {
        match self {
            Self::StrokeLine { overlay_id, .. }
            | Self::StrokePath { overlay_id, .. }
            | Self::StrokeCircle { overlay_id, .. }
            | Self::StrokeRect { overlay_id, .. }
            | Self::Label { overlay_id, .. } => overlay_id,
        }
    }
}
