use crate::foundation::error::{ReviewError, ReviewResult};

/// How the session is meant to be reviewed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Slowed-down playback with coach commentary.
    SlowMotionCommentary,
    /// Tactical overlays over real-time playback.
    TacticalBreakdown,
}

/// Session descriptor as delivered by the external video/session storage service.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    /// Session identifier.
    pub id: String,
    /// Opaque reference to the playable media.
    pub media_reference: String,
    /// Opaque reference to a poster image.
    #[serde(default)]
    pub thumbnail_reference: Option<String>,
    /// Media duration in seconds.
    pub duration: f64,
    /// Review mode.
    pub analysis_mode: AnalysisMode,
    /// Free-form tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Opaque positional metadata (camera angle, pitch zone, ...), passed through untouched.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub positional_metadata: serde_json::Value,
}

/// A loaded video session. Immutable once constructed.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSession {
    id: String,
    media_reference: String,
    thumbnail_reference: Option<String>,
    duration: f64,
    analysis_mode: AnalysisMode,
    tags: Vec<String>,
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    positional_metadata: serde_json::Value,
}

impl VideoSession {
    /// Validate a descriptor: the id must be non-empty and the duration positive.
    pub fn from_descriptor(desc: SessionDescriptor) -> ReviewResult<Self> {
        if desc.id.trim().is_empty() {
            return Err(ReviewError::validation("session id must be non-empty"));
        }
        if !desc.duration.is_finite() || desc.duration <= 0.0 {
            return Err(ReviewError::validation(format!(
                "session '{}' duration must be > 0 seconds",
                desc.id
            )));
        }
        Ok(Self {
            id: desc.id,
            media_reference: desc.media_reference,
            thumbnail_reference: desc.thumbnail_reference,
            duration: desc.duration,
            analysis_mode: desc.analysis_mode,
            tags: desc.tags,
            positional_metadata: desc.positional_metadata,
        })
    }

    /// Session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Opaque reference to the playable media.
    pub fn media_reference(&self) -> &str {
        &self.media_reference
    }

    /// Opaque reference to a poster image, if any.
    pub fn thumbnail_reference(&self) -> Option<&str> {
        self.thumbnail_reference.as_deref()
    }

    /// Media duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Review mode.
    pub fn analysis_mode(&self) -> AnalysisMode {
        self.analysis_mode
    }

    /// Free-form tags.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Opaque positional metadata; `null` when absent.
    pub fn positional_metadata(&self) -> &serde_json::Value {
        &self.positional_metadata
    }
}

impl TryFrom<SessionDescriptor> for VideoSession {
    type Error = ReviewError;

    fn try_from(desc: SessionDescriptor) -> ReviewResult<Self> {
        Self::from_descriptor(desc)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/session.rs"]
mod tests;
