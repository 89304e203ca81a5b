use crate::foundation::core::SurfaceSize;
use crate::geometry::draw::DrawCommand;
use crate::geometry::resolver::resolve_overlays;
use crate::index::cursor::TimelineCursor;
use crate::index::timeline::TimelineIndex;
use crate::model::annotation::{AnnotationMarker, CommentarySegment, MarkerCategory};
use crate::playback::controller::Tick;
use crate::sync::sink::SyncSink;

/// Result of one [`SyncOrchestrator::render`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderOutcome {
    /// The newest pending tick was rendered.
    Rendered,
    /// Nothing was pending.
    Idle,
    /// The surface is unavailable; the tick stays pending until it returns.
    Suppressed,
}

/// Running counters for one [`SyncOrchestrator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SyncStats {
    /// Ticks passed to `submit`.
    pub ticks_received: u64,
    /// Ticks rendered.
    pub rendered: u64,
    /// Pending ticks replaced by a newer tick before they were rendered.
    pub superseded: u64,
    /// Ticks dropped because they belonged to a previous session.
    pub stale_dropped: u64,
    /// Renders skipped because the surface was unavailable.
    pub suppressed: u64,
    /// Commentary panel updates published.
    pub commentary_updates: u64,
}

/// Per-tick glue between the timeline index, the geometry resolver, and the UI panels.
///
/// Ticks are never queued: a single pending slot holds the newest tick and a newer tick
/// replaces it. Rapid scrubbing therefore renders only the latest position, occasionally
/// skipping an intermediate one.
#[derive(Debug)]
pub struct SyncOrchestrator {
    epoch: u64,
    pending: Option<Tick>,
    last_rendered: Option<Tick>,
    cursor: TimelineCursor,
    marker_filter: Option<MarkerCategory>,
    commands: Vec<DrawCommand>,
    // `None` until the first render so the initial state is always published.
    commentary: Option<Option<CommentarySegment>>,
    markers: Vec<AnnotationMarker>,
    stats: SyncStats,
}

impl SyncOrchestrator {
    /// Orchestrator with no pending tick, querying through `cursor`.
    pub fn new(cursor: TimelineCursor) -> Self {
        Self {
            epoch: 0,
            pending: None,
            last_rendered: None,
            cursor,
            marker_filter: None,
            commands: Vec::new(),
            commentary: None,
            markers: Vec::new(),
            stats: SyncStats::default(),
        }
    }

    /// Cancel pending work and forget everything derived from the previous session.
    pub fn reset_for_epoch(&mut self, epoch: u64) {
        if let Some(t) = self.pending.take() {
            tracing::debug!(seq = t.seq, old_epoch = self.epoch, epoch, "pending tick cancelled");
        }
        self.epoch = epoch;
        self.last_rendered = None;
        self.cursor.reset();
        self.commands.clear();
        self.commentary = None;
        self.markers.clear();
    }

    /// Offer a tick. Replaces any pending tick; ticks from another epoch are dropped.
    pub fn submit(&mut self, tick: Tick) {
        self.stats.ticks_received += 1;
        if tick.epoch != self.epoch {
            self.stats.stale_dropped += 1;
            tracing::trace!(seq = tick.seq, tick_epoch = tick.epoch, epoch = self.epoch, "stale tick dropped");
            return;
        }
        if let Some(old) = self.pending.replace(tick) {
            self.stats.superseded += 1;
            tracing::trace!(superseded = old.seq, by = tick.seq, "tick superseded");
        }
    }

    /// Re-render the last rendered position (resize, filter change, index swap) unless a newer
    /// tick is already pending.
    pub fn invalidate(&mut self) {
        if self.pending.is_none()
            && let Some(t) = self.last_rendered
        {
            self.pending = Some(t);
        }
    }

    /// Restrict published markers to one category; `None` publishes all.
    pub fn set_marker_filter(&mut self, filter: Option<MarkerCategory>) {
        self.marker_filter = filter;
    }

    /// Active marker category filter.
    pub fn marker_filter(&self) -> Option<MarkerCategory> {
        self.marker_filter
    }

    /// Render the newest pending tick, if any.
    pub fn render(
        &mut self,
        index: &TimelineIndex,
        surface: SurfaceSize,
        sink: &mut dyn SyncSink,
    ) -> RenderOutcome {
        let Some(tick) = self.pending.take() else {
            return RenderOutcome::Idle;
        };

        let active = self.cursor.query(index, tick.time);
        let commands = match resolve_overlays(&active.overlays, surface) {
            Ok(c) => c,
            Err(e) => {
                self.pending = Some(tick);
                self.stats.suppressed += 1;
                tracing::trace!(error = %e, "render suppressed");
                return RenderOutcome::Suppressed;
            }
        };
        sink.overlays(tick.time, &commands);
        self.commands = commands;

        let current = active.commentary;
        // Whole-record comparison: ids are not guaranteed unique across a batch.
        let changed = self.commentary.as_ref().is_none_or(|prev| prev.as_ref() != current);
        if changed {
            sink.commentary(current);
            self.commentary = Some(current.cloned());
            self.stats.commentary_updates += 1;
        }

        let filter = self.marker_filter;
        let nearby: Vec<&AnnotationMarker> = active
            .markers
            .into_iter()
            .filter(|m| filter.is_none_or(|c| m.category == c))
            .collect();
        sink.markers(&nearby);
        self.markers = nearby.into_iter().cloned().collect();

        self.last_rendered = Some(tick);
        self.stats.rendered += 1;
        RenderOutcome::Rendered
    }

    /// A tick is waiting to be rendered.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Tick applied by the last successful render.
    pub fn last_rendered(&self) -> Option<Tick> {
        self.last_rendered
    }

    /// Overlay draw commands from the last render.
    pub fn draw_commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commentary published by the last render.
    pub fn current_commentary(&self) -> Option<&CommentarySegment> {
        self.commentary.as_ref().and_then(|c| c.as_ref())
    }

    /// Markers published by the last render.
    pub fn nearby_markers(&self) -> &[AnnotationMarker] {
        &self.markers
    }

    /// Counters since construction.
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Timeline cursor serving the queries.
    pub fn cursor(&self) -> &TimelineCursor {
        &self.cursor
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/orchestrator.rs"]
mod tests;
