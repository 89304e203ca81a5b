use crate::geometry::draw::DrawCommand;
use crate::model::annotation::{AnnotationMarker, CommentarySegment};

/// Consumer of synchronized overlay/commentary/marker updates (the host's UI panels).
///
/// Per rendered tick, `overlays` and `markers` are called once. `commentary` is called only
/// when the current commentary differs from the previously published one.
pub trait SyncSink {
    /// Full replacement of the overlay layer for `time`.
    fn overlays(&mut self, time: f64, commands: &[DrawCommand]);
    /// The current commentary changed (`None` clears the panel).
    fn commentary(&mut self, current: Option<&CommentarySegment>);
    /// Markers near the current time.
    fn markers(&mut self, nearby: &[&AnnotationMarker]);
}

/// Sink that discards every update; the exposed engine state is still maintained.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSyncSink;

impl SyncSink for NullSyncSink {
    fn overlays(&mut self, _time: f64, _commands: &[DrawCommand]) {}
    fn commentary(&mut self, _current: Option<&CommentarySegment>) {}
    fn markers(&mut self, _nearby: &[&AnnotationMarker]) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySyncSink {
    pub(crate) frames: Vec<(f64, Vec<DrawCommand>)>,
    pub(crate) commentary: Vec<Option<CommentarySegment>>,
    pub(crate) markers: Vec<Vec<String>>,
}

impl InMemorySyncSink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay frames in render order.
    pub fn frames(&self) -> &[(f64, Vec<DrawCommand>)] {
        &self.frames
    }

    /// Commentary panel updates in order.
    pub fn commentary_updates(&self) -> &[Option<CommentarySegment>] {
        &self.commentary
    }

    /// Marker ids published per render.
    pub fn marker_updates(&self) -> &[Vec<String>] {
        &self.markers
    }
}

impl SyncSink for InMemorySyncSink {
    fn overlays(&mut self, time: f64, commands: &[DrawCommand]) {
        self.frames.push((time, commands.to_vec()));
    }

    fn commentary(&mut self, current: Option<&CommentarySegment>) {
        self.commentary.push(current.cloned());
    }

    fn markers(&mut self, nearby: &[&AnnotationMarker]) {
        self.markers
            .push(nearby.iter().map(|m| m.id.clone()).collect());
    }
}
