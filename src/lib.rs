//! reviewsync is a time-indexed annotation and overlay synchronization engine for
//! training-video review.
//!
//! A reviewer plays, pauses, and scrubs a video while the engine keeps three streams of
//! time-bound data aligned to the playback position: performance markers, vector overlays, and
//! commentary. The public API is session-oriented:
//!
//! - Load a [`VideoSession`] and its annotation batch (see [`load_session`])
//! - Open it in a [`ReviewSession`]
//! - Drive the clock with [`ReviewSession::advance`] and render into a [`SyncSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Overlay authoring while paused.
pub mod authoring;
/// Normalized geometry to draw commands.
pub mod geometry;
/// Timeline interval index.
pub mod index;
/// Session loading.
pub mod load;
/// Typed records.
pub mod model;
/// Media clock.
pub mod playback;
/// Session-oriented review API.
pub mod session;
/// Per-tick synchronization.
pub mod sync;

pub use crate::foundation::core::{
    BezPath, Circle, Line, NormPoint, Point, Rect, Rgba8, SurfaceSize, Vec2, clamp_time,
};
pub use crate::foundation::error::{ReviewError, ReviewResult};

pub use crate::authoring::capture::{AuthoringTool, CaptureOutcome, DrawingCapture};
pub use crate::geometry::draw::DrawCommand;
pub use crate::geometry::resolver::{SurfaceUnavailable, resolve_overlays, to_normalized, to_pixel};
pub use crate::index::cursor::TimelineCursor;
pub use crate::index::timeline::{ActiveSet, BuildReport, TimelineIndex};
pub use crate::load::retry::{LoadedSession, RetryPolicy, load_session, thread_sleep};
pub use crate::load::source::{AnnotationStore, JsonDirSource, JsonLinesStore, SessionSource};
pub use crate::model::annotation::{
    AnnotationMarker, CommentarySegment, MarkerCategory, OverlaySegment, OverlayShape, ShapeKind,
};
pub use crate::model::batch::{AnnotationBatch, AnnotationBatchDef, SkippedRecord, decode_batch};
pub use crate::model::session::{AnalysisMode, SessionDescriptor, VideoSession};
pub use crate::playback::controller::{PlaybackController, PlaybackMode, PlaybackState, Tick};
pub use crate::session::opts::ReviewSessionOpts;
pub use crate::session::review_session::{ReviewSession, ReviewSnapshot};
pub use crate::sync::orchestrator::{RenderOutcome, SyncOrchestrator, SyncStats};
pub use crate::sync::sink::{InMemorySyncSink, NullSyncSink, SyncSink};
