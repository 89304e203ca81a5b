use smallvec::SmallVec;

use crate::foundation::core::{NormPoint, Rgba8};
use crate::foundation::error::{ReviewError, ReviewResult};
use crate::model::annotation::{
    AnnotationMarker, CommentarySegment, MarkerCategory, OverlaySegment, OverlayShape, ShapeKind,
};

/// Commentary span applied when the wire record carries a timestamp but no end.
pub const DEFAULT_COMMENTARY_SPAN_S: f64 = 5.0;

/// Raw annotation batch as fetched at session open.
///
/// Records are kept as untyped JSON so that one malformed record can be skipped without
/// rejecting its siblings.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationBatchDef {
    /// Raw marker records.
    #[serde(default)]
    pub markers: Vec<serde_json::Value>,
    /// Raw overlay records.
    #[serde(default)]
    pub overlays: Vec<serde_json::Value>,
    /// Raw commentary records.
    #[serde(default)]
    pub commentary: Vec<serde_json::Value>,
}

impl AnnotationBatchDef {
    /// Parse the batch envelope; individual records are decoded later.
    pub fn from_json_str(s: &str) -> ReviewResult<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarkerDef {
    #[serde(default)]
    id: Option<String>,
    time: f64,
    category: MarkerCategory,
    #[serde(default)]
    description: String,
    confidence: f64,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OverlayDef {
    #[serde(default)]
    id: Option<String>,
    start: f64,
    end: f64,
    shape: ShapeKind,
    anchors: SmallVec<[[f64; 2]; 2]>,
    #[serde(default)]
    radius: Option<f64>,
    #[serde(default)]
    color: Rgba8,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    description: String,
}

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentaryDef {
    #[serde(default)]
    id: Option<String>,
    #[serde(alias = "time")]
    start: f64,
    #[serde(default)]
    end: Option<f64>,
    author: String,
    text: String,
    #[serde(default)]
    rating: f64,
}

/// Record family a skipped record belonged to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A performance marker.
    Marker,
    /// A vector overlay.
    Overlay,
    /// A commentary segment.
    Commentary,
}

/// A record dropped while decoding or indexing.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SkippedRecord {
    /// Record family.
    pub kind: RecordKind,
    /// Position of the record within its list in the source batch.
    pub index: usize,
    /// Why the record was dropped.
    pub reason: String,
}

impl SkippedRecord {
    pub(crate) fn log(kind: RecordKind, index: usize, err: &ReviewError) -> Self {
        tracing::warn!(?kind, index, error = %err, "skipping malformed annotation record");
        Self {
            kind,
            index,
            reason: err.to_string(),
        }
    }
}

/// Typed annotation records for one session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationBatch {
    /// Performance markers.
    pub markers: Vec<AnnotationMarker>,
    /// Vector overlays.
    pub overlays: Vec<OverlaySegment>,
    /// Commentary segments.
    pub commentary: Vec<CommentarySegment>,
}

impl AnnotationBatch {
    /// No records of any kind.
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.overlays.is_empty() && self.commentary.is_empty()
    }

    /// Total record count across all kinds.
    pub fn len(&self) -> usize {
        self.markers.len() + self.overlays.len() + self.commentary.len()
    }
}

/// Decode every record of a raw batch independently.
///
/// Records that fail to parse are logged and reported, never fatal. Semantic invariants that
/// depend on the session (duration bounds) are checked later, when the timeline index is built.
#[tracing::instrument(skip(def), fields(
    markers = def.markers.len(),
    overlays = def.overlays.len(),
    commentary = def.commentary.len()
))]
pub fn decode_batch(
    def: AnnotationBatchDef,
    commentary_span_s: f64,
) -> (AnnotationBatch, Vec<SkippedRecord>) {
    let mut batch = AnnotationBatch::default();
    let mut skipped = Vec::new();

    for (i, v) in def.markers.into_iter().enumerate() {
        match decode_marker(v, i) {
            Ok(m) => batch.markers.push(m),
            Err(e) => skipped.push(SkippedRecord::log(RecordKind::Marker, i, &e)),
        }
    }
    for (i, v) in def.overlays.into_iter().enumerate() {
        match decode_overlay(v, i) {
            Ok(o) => batch.overlays.push(o),
            Err(e) => skipped.push(SkippedRecord::log(RecordKind::Overlay, i, &e)),
        }
    }
    for (i, v) in def.commentary.into_iter().enumerate() {
        match decode_commentary(v, i, commentary_span_s) {
            Ok(c) => batch.commentary.push(c),
            Err(e) => skipped.push(SkippedRecord::log(RecordKind::Commentary, i, &e)),
        }
    }

    (batch, skipped)
}

fn decode_marker(v: serde_json::Value, index: usize) -> ReviewResult<AnnotationMarker> {
    let def: MarkerDef = serde_json::from_value(v)?;
    Ok(AnnotationMarker {
        id: def.id.unwrap_or_else(|| format!("marker-{index}")),
        time: def.time,
        category: def.category,
        description: def.description,
        confidence: def.confidence,
    })
}

fn decode_overlay(v: serde_json::Value, index: usize) -> ReviewResult<OverlaySegment> {
    let def: OverlayDef = serde_json::from_value(v)?;
    let anchors = def
        .anchors
        .iter()
        .map(|&[x, y]| NormPoint::new(x, y))
        .collect::<ReviewResult<SmallVec<[NormPoint; 2]>>>()?;
    let shape = OverlayShape::from_anchors(def.shape, &anchors, def.radius)?;
    Ok(OverlaySegment {
        id: def.id.unwrap_or_else(|| format!("overlay-{index}")),
        start: def.start,
        end: def.end,
        shape,
        color: def.color,
        label: def.label.filter(|l| !l.trim().is_empty()),
        description: def.description,
    })
}

fn decode_commentary(
    v: serde_json::Value,
    index: usize,
    span_s: f64,
) -> ReviewResult<CommentarySegment> {
    let def: CommentaryDef = serde_json::from_value(v)?;
    Ok(CommentarySegment {
        id: def.id.unwrap_or_else(|| format!("commentary-{index}")),
        start: def.start,
        end: def.end.unwrap_or(def.start + span_s),
        author: def.author,
        text: def.text,
        rating: def.rating,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/model/batch.rs"]
mod tests;
