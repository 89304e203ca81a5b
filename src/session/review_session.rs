use std::time::Duration;

use crate::authoring::capture::{AuthoringTool, CaptureOutcome, DrawingCapture};
use crate::foundation::core::{Point, SurfaceSize};
use crate::foundation::error::{ReviewError, ReviewResult};
use crate::geometry::draw::DrawCommand;
use crate::index::cursor::TimelineCursor;
use crate::index::timeline::{BuildReport, TimelineIndex};
use crate::load::retry::{LoadedSession, load_session};
use crate::load::source::{AnnotationStore, SessionSource};
use crate::model::annotation::{AnnotationMarker, CommentarySegment, MarkerCategory, ShapeKind};
use crate::model::batch::SkippedRecord;
use crate::model::session::VideoSession;
use crate::playback::controller::{PlaybackController, PlaybackState, Tick};
use crate::session::opts::ReviewSessionOpts;
use crate::sync::orchestrator::{RenderOutcome, SyncOrchestrator, SyncStats};
use crate::sync::sink::SyncSink;

/// State exposed to the surrounding application after a render.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSnapshot<'a> {
    /// Clock state.
    pub playback: PlaybackState,
    /// Overlay draw commands from the last render.
    pub draw_commands: &'a [DrawCommand],
    /// Current commentary, if any.
    pub commentary: Option<&'a CommentarySegment>,
    /// Markers near the current time.
    pub markers: &'a [AnnotationMarker],
    /// Authoring tool state.
    pub authoring: AuthoringTool,
}

/// One open review: playback clock, timeline index, sync, and authoring behind a single
/// command surface.
///
/// The host drives it cooperatively: feed wall-clock time through [`ReviewSession::advance`],
/// then call [`ReviewSession::render`] when it is ready to draw. Commands never block on
/// rendering, and only the newest tick is ever rendered.
pub struct ReviewSession {
    opts: ReviewSessionOpts,
    session: Option<VideoSession>,
    index: Option<TimelineIndex>,
    controller: PlaybackController,
    orchestrator: SyncOrchestrator,
    capture: DrawingCapture,
    surface: SurfaceSize,
    store: Option<Box<dyn AnnotationStore>>,
    skipped: Vec<SkippedRecord>,
}

impl ReviewSession {
    /// Empty review with no session open.
    pub fn new(opts: ReviewSessionOpts) -> Self {
        Self {
            controller: PlaybackController::new(opts.tick_interval()),
            orchestrator: SyncOrchestrator::new(TimelineCursor::new(opts.max_incremental_step_s)),
            capture: DrawingCapture::new(opts.capture_opts()),
            opts,
            session: None,
            index: None,
            surface: SurfaceSize::new(0.0, 0.0),
            store: None,
            skipped: Vec::new(),
        }
    }

    /// Persist committed overlays through `store`.
    pub fn with_store(mut self, store: Box<dyn AnnotationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Options this review was created with.
    pub fn opts(&self) -> &ReviewSessionOpts {
        &self.opts
    }

    /// Switch to a loaded session.
    ///
    /// Pending ticks and the previous index are discarded before the new index is built, so
    /// nothing from the old session can render against the new one.
    #[tracing::instrument(skip(self, loaded), fields(session = loaded.session.id()))]
    pub fn open(&mut self, loaded: LoadedSession) -> BuildReport {
        let LoadedSession {
            session,
            batch,
            skipped,
        } = loaded;

        self.index = None;
        self.session = None;
        self.capture.cancel();
        let tick = self.controller.load(&session);
        self.orchestrator.reset_for_epoch(tick.epoch);

        let (index, mut report) = TimelineIndex::build(&session, batch, self.opts.marker_window_s);
        self.skipped = skipped;
        self.skipped.extend(report.skipped.iter().cloned());
        report.skipped = self.skipped.clone();

        self.orchestrator.submit(tick);
        self.index = Some(index);
        self.session = Some(session);
        report
    }

    /// Fetch (with retry) and open a session. On failure the current session stays open.
    pub fn open_from_source(
        &mut self,
        source: &dyn SessionSource,
        session_id: &str,
        sleep: &mut dyn FnMut(Duration),
    ) -> ReviewResult<BuildReport> {
        let loaded = load_session(
            source,
            session_id,
            &self.opts.retry,
            self.opts.default_commentary_span_s,
            sleep,
        )?;
        Ok(self.open(loaded))
    }

    /// Close the current session and return to `Idle`.
    pub fn close(&mut self) {
        self.controller.unload();
        self.orchestrator.reset_for_epoch(self.controller.epoch());
        self.capture.cancel();
        self.index = None;
        self.session = None;
        self.skipped.clear();
    }

    fn after_command(&mut self, tick: Option<Tick>) {
        if let Some(tick) = tick {
            self.orchestrator.submit(tick);
        }
        self.capture.on_mode_change(self.controller.mode());
    }

    /// Start or resume playback; abandons any drawing in progress.
    pub fn play(&mut self) -> ReviewResult<()> {
        let tick = self.controller.play()?;
        self.after_command(tick);
        Ok(())
    }

    /// Pause at the current position.
    pub fn pause(&mut self) -> ReviewResult<()> {
        let tick = self.controller.pause()?;
        self.after_command(tick);
        Ok(())
    }

    /// Start a seek; out-of-range targets are clamped. Call
    /// [`ReviewSession::on_seek_complete`] once the media element has seeked.
    pub fn seek(&mut self, t: f64) -> ReviewResult<()> {
        self.controller.seek(t)?;
        self.after_command(None);
        Ok(())
    }

    /// The media element finished seeking.
    pub fn on_seek_complete(&mut self) {
        let tick = self.controller.complete_seek();
        self.after_command(tick);
    }

    /// Returns the applied (snapped) rate.
    pub fn set_rate(&mut self, rate: f64) -> f64 {
        self.controller.set_rate(rate)
    }

    /// Seek to the start and play.
    pub fn restart(&mut self) -> ReviewResult<()> {
        let tick = self.controller.restart()?;
        self.after_command(Some(tick));
        Ok(())
    }

    fn loaded_index(&self, op: &str) -> ReviewResult<&TimelineIndex> {
        self.index
            .as_ref()
            .ok_or_else(|| ReviewError::state(format!("{op}: no session loaded")))
    }

    /// Seek to the next marker (honouring the marker filter). Returns its time, if any.
    pub fn seek_next_marker(&mut self) -> ReviewResult<Option<f64>> {
        let t = self.controller.current_time();
        let target = self
            .loaded_index("seek next marker")?
            .next_marker_after(t, self.orchestrator.marker_filter())
            .map(|m| m.time);
        if let Some(target) = target {
            self.seek(target)?;
        }
        Ok(target)
    }

    /// Seek to the previous marker (honouring the marker filter). Returns its time, if any.
    pub fn seek_prev_marker(&mut self) -> ReviewResult<Option<f64>> {
        let t = self.controller.current_time();
        let target = self
            .loaded_index("seek previous marker")?
            .prev_marker_before(t, self.orchestrator.marker_filter())
            .map(|m| m.time);
        if let Some(target) = target {
            self.seek(target)?;
        }
        Ok(target)
    }

    /// Restrict the nearby-marker list (and marker navigation) to one category.
    pub fn set_marker_filter(&mut self, filter: Option<MarkerCategory>) {
        self.orchestrator.set_marker_filter(filter);
        self.orchestrator.invalidate();
    }

    /// Arm a drawing tool. Fails with `AuthoringConflict` unless paused.
    pub fn start_drawing(&mut self, kind: ShapeKind) -> ReviewResult<()> {
        self.capture.start(kind, self.controller.mode())
    }

    /// Pointer pressed at surface pixel `p`.
    pub fn pointer_down(&mut self, p: Point) -> ReviewResult<()> {
        self.capture.pointer_down(p, self.surface)
    }

    /// Pointer moved to surface pixel `p`.
    pub fn pointer_move(&mut self, p: Point) -> ReviewResult<()> {
        self.capture.pointer_move(p, self.surface)
    }

    /// Pointer released at surface pixel `p`.
    pub fn pointer_up(&mut self, p: Point) -> ReviewResult<()> {
        self.capture.pointer_up(p, self.surface)
    }

    /// Commit the finished gesture at the current time with the default lifetime.
    pub fn commit_drawing(&mut self) -> ReviewResult<CaptureOutcome> {
        self.commit(None)
    }

    /// Commit with an explicit lifetime in seconds instead of the default.
    pub fn commit_drawing_with_duration(&mut self, duration_s: f64) -> ReviewResult<CaptureOutcome> {
        self.commit(Some(duration_s))
    }

    fn commit(&mut self, duration: Option<f64>) -> ReviewResult<CaptureOutcome> {
        let Some(session) = self.session.as_ref() else {
            return Err(ReviewError::state("commit drawing: no session loaded"));
        };
        let outcome = self.capture.commit(
            self.controller.mode(),
            self.controller.current_time(),
            session.duration(),
            self.surface,
            duration,
        )?;
        let CaptureOutcome::Committed(segment) = &outcome else {
            return Ok(outcome);
        };

        if let Some(next) = self.index.as_ref().map(|i| i.with_overlay(segment.clone())) {
            self.index = Some(next);
        }
        self.orchestrator.invalidate();

        if let Some(store) = self.store.as_mut() {
            store.commit(session.id(), segment).map_err(|e| {
                tracing::warn!(id = %segment.id, error = %e, "overlay persistence failed");
                ReviewError::from(e.context(format!("persist overlay '{}'", segment.id)))
            })?;
        }
        Ok(outcome)
    }

    /// Drop any gesture and deselect the tool.
    pub fn cancel_drawing(&mut self) {
        self.capture.cancel();
    }

    /// Advance the media clock by `wall` of host time. Returns the emitted tick, if any.
    pub fn advance(&mut self, wall: Duration) -> Option<Tick> {
        let tick = self.controller.advance(wall);
        self.after_command(tick);
        tick
    }

    /// Report the drawing surface size. A zero size suppresses rendering.
    pub fn set_surface(&mut self, surface: SurfaceSize) {
        if self.surface != surface {
            tracing::trace!(width = surface.width, height = surface.height, "surface resized");
            self.surface = surface;
            self.orchestrator.invalidate();
        }
    }

    /// Render the newest pending tick into `sink`.
    pub fn render(&mut self, sink: &mut dyn SyncSink) -> RenderOutcome {
        match &self.index {
            Some(index) => self.orchestrator.render(index, self.surface, sink),
            None => RenderOutcome::Idle,
        }
    }

    /// Clock state.
    pub fn playback_state(&self) -> PlaybackState {
        self.controller.state()
    }

    /// Overlay draw commands from the last render.
    pub fn draw_commands(&self) -> &[DrawCommand] {
        self.orchestrator.draw_commands()
    }

    /// Commentary published by the last render.
    pub fn current_commentary(&self) -> Option<&CommentarySegment> {
        self.orchestrator.current_commentary()
    }

    /// Markers published by the last render.
    pub fn nearby_markers(&self) -> &[AnnotationMarker] {
        self.orchestrator.nearby_markers()
    }

    /// Authoring tool state.
    pub fn authoring_tool(&self) -> AuthoringTool {
        self.capture.tool()
    }

    /// Rubber-band draw commands for the gesture in progress.
    pub fn authoring_preview(&self) -> Vec<DrawCommand> {
        self.capture.preview(self.surface)
    }

    /// Serializable view of the exposed state.
    pub fn snapshot(&self) -> ReviewSnapshot<'_> {
        ReviewSnapshot {
            playback: self.playback_state(),
            draw_commands: self.draw_commands(),
            commentary: self.current_commentary(),
            markers: self.nearby_markers(),
            authoring: self.authoring_tool(),
        }
    }

    /// Open session, if any.
    pub fn session(&self) -> Option<&VideoSession> {
        self.session.as_ref()
    }

    /// Timeline index of the open session.
    pub fn index(&self) -> Option<&TimelineIndex> {
        self.index.as_ref()
    }

    /// Last reported surface size.
    pub fn surface(&self) -> SurfaceSize {
        self.surface
    }

    /// Records dropped while decoding or indexing the current session.
    pub fn skipped_records(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    /// Sync counters.
    pub fn sync_stats(&self) -> SyncStats {
        self.orchestrator.stats()
    }
}

impl Default for ReviewSession {
    fn default() -> Self {
        Self::new(ReviewSessionOpts::default())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/review_session.rs"]
mod tests;
