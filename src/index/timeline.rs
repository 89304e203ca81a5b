use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use crate::model::annotation::{
    AnnotationMarker, CommentarySegment, MarkerCategory, OverlaySegment,
};
use crate::model::batch::{AnnotationBatch, RecordKind, SkippedRecord};
use crate::model::session::VideoSession;

/// Default marker tolerance window (seconds either side of the marker time).
pub const DEFAULT_MARKER_WINDOW_S: f64 = 2.0;

// Widens candidate windows so rounding in `t - reach - max_span` can never exclude a match.
// The exact containment test still runs on every candidate.
const WINDOW_SLACK_S: f64 = 1e-6;

// Spans up to this length share class 0; class k holds spans in (base * 2^(k-1), base * 2^k].
const SPAN_CLASS_BASE_S: f64 = 0.5;

static NEXT_INDEX_ID: AtomicU64 = AtomicU64::new(1);

/// Candidate range `[lo, hi)` into each span class of one track.
pub(crate) type Windows = SmallVec<[(usize, usize); 4]>;

/// Covering record positions, ascending.
pub(crate) type Hits = SmallVec<[usize; 8]>;

fn span_class(span: f64) -> u32 {
    if span <= SPAN_CLASS_BASE_S {
        0
    } else {
        ((span / SPAN_CLASS_BASE_S).log2().ceil() as u32).min(63)
    }
}

/// Records of one track whose spans fall in the same power-of-two class.
#[derive(Clone, Debug)]
struct SpanClass {
    /// Positions into the owning track, ascending (so also sorted by start).
    members: Vec<usize>,
    starts: Vec<f64>,
    max_span: f64,
}

/// Records sorted by `(start, insertion order)` with parallel start/end columns.
///
/// A record covers `t` when `start - reach <= t <= end + reach`. Records are grouped by span
/// class; inside a class no record spans more than that class's `max_span`, so candidates for
/// `t` are the class members starting in `[t - reach - max_span, t + reach]`, found by binary
/// search. One long record only widens the window of its own class.
#[derive(Clone, Debug)]
pub(crate) struct IntervalTrack<T> {
    items: Vec<T>,
    starts: Vec<f64>,
    ends: Vec<f64>,
    classes: Vec<SpanClass>,
    reach: f64,
}

impl<T> IntervalTrack<T> {
    fn build(mut entries: Vec<(f64, f64, T)>, reach: f64) -> Self {
        // Stable: equal starts keep insertion order.
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut items = Vec::with_capacity(entries.len());
        let mut starts = Vec::with_capacity(entries.len());
        let mut ends = Vec::with_capacity(entries.len());
        let mut by_class: BTreeMap<u32, SpanClass> = BTreeMap::new();
        for (pos, (start, end, item)) in entries.into_iter().enumerate() {
            let span = end - start;
            let class = by_class.entry(span_class(span)).or_insert_with(|| SpanClass {
                members: Vec::new(),
                starts: Vec::new(),
                max_span: 0.0,
            });
            class.members.push(pos);
            class.starts.push(start);
            class.max_span = class.max_span.max(span);
            starts.push(start);
            ends.push(end);
            items.push(item);
        }

        Self {
            items,
            starts,
            ends,
            classes: by_class.into_values().collect(),
            reach,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn items(&self) -> &[T] {
        &self.items
    }

    pub(crate) fn item(&self, i: usize) -> &T {
        &self.items[i]
    }

    fn lo_floor(&self, class: &SpanClass, t: f64) -> f64 {
        t - self.reach - class.max_span - WINDOW_SLACK_S
    }

    fn hi_ceiling(&self, t: f64) -> f64 {
        t + self.reach + WINDOW_SLACK_S
    }

    /// Position every class window for `t` by binary search.
    pub(crate) fn windows(&self, t: f64) -> Windows {
        let ceiling = self.hi_ceiling(t);
        self.classes
            .iter()
            .map(|c| {
                let floor = self.lo_floor(c, t);
                (
                    c.starts.partition_point(|&s| s < floor),
                    c.starts.partition_point(|&s| s <= ceiling),
                )
            })
            .collect()
    }

    /// Walk `windows` forward to `t`.
    ///
    /// Only valid when `t` is not earlier than the time the windows were last positioned at.
    pub(crate) fn advance_windows(&self, windows: &mut Windows, t: f64) {
        let ceiling = self.hi_ceiling(t);
        for (c, (lo, hi)) in self.classes.iter().zip(windows.iter_mut()) {
            let floor = self.lo_floor(c, t);
            while *lo < c.starts.len() && c.starts[*lo] < floor {
                *lo += 1;
            }
            while *hi < c.starts.len() && c.starts[*hi] <= ceiling {
                *hi += 1;
            }
        }
    }

    pub(crate) fn covers(&self, i: usize, t: f64) -> bool {
        self.starts[i] - self.reach <= t && t <= self.ends[i] + self.reach
    }

    /// Covering records inside `windows`, in track order.
    pub(crate) fn covering(&self, windows: &Windows, t: f64) -> Hits {
        let mut hits: Hits = self
            .classes
            .iter()
            .zip(windows)
            .flat_map(|(c, &(lo, hi))| c.members[lo..hi].iter().copied())
            .filter(|&i| self.covers(i, t))
            .collect();
        hits.sort_unstable();
        hits
    }

    /// Covering records found by checking every record.
    pub(crate) fn scan(&self, t: f64) -> Hits {
        (0..self.len()).filter(|&i| self.covers(i, t)).collect()
    }
}

/// Records active at one point in time.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ActiveSet<'a> {
    /// Query time in seconds.
    pub time: f64,
    /// Every overlay with `start <= time <= end`, ordered by start then insertion.
    pub overlays: Vec<&'a OverlaySegment>,
    /// The single current commentary: earliest start wins, then insertion order.
    pub commentary: Option<&'a CommentarySegment>,
    /// Markers within the tolerance window, ordered by time then insertion.
    pub markers: Vec<&'a AnnotationMarker>,
}

impl ActiveSet<'_> {
    /// Ids of the active overlays, in draw order.
    pub fn overlay_ids(&self) -> Vec<&str> {
        self.overlays.iter().map(|o| o.id.as_str()).collect()
    }

    /// Ids of the nearby markers, in time order.
    pub fn marker_ids(&self) -> Vec<&str> {
        self.markers.iter().map(|m| m.id.as_str()).collect()
    }
}

/// Build-time summary of the records that made it into the index.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct BuildReport {
    /// Records that passed validation and were indexed.
    pub accepted: usize,
    /// Records dropped while decoding or indexing.
    pub skipped: Vec<SkippedRecord>,
}

/// Read-only interval index over one session's annotations.
///
/// Built once per session; a drawing commit produces a new index instead of mutating this one.
#[derive(Clone, Debug)]
pub struct TimelineIndex {
    id: u64,
    duration: f64,
    marker_window: f64,
    pub(crate) overlays: IntervalTrack<OverlaySegment>,
    pub(crate) commentary: IntervalTrack<CommentarySegment>,
    pub(crate) markers: IntervalTrack<AnnotationMarker>,
}

impl TimelineIndex {
    /// Index a batch, skipping (and logging) records that violate their invariants.
    #[tracing::instrument(skip(session, batch), fields(session = session.id(), records = batch.len()))]
    pub fn build(
        session: &VideoSession,
        batch: AnnotationBatch,
        marker_window: f64,
    ) -> (Self, BuildReport) {
        let duration = session.duration();
        let marker_window = if marker_window.is_finite() && marker_window >= 0.0 {
            marker_window
        } else {
            tracing::warn!(marker_window, "invalid marker window, using default");
            DEFAULT_MARKER_WINDOW_S
        };
        let mut report = BuildReport::default();

        let mut overlays = Vec::with_capacity(batch.overlays.len());
        for (i, o) in batch.overlays.into_iter().enumerate() {
            match o.validate(duration) {
                Ok(()) => overlays.push((o.start, o.end, o)),
                Err(e) => report.skipped.push(SkippedRecord::log(RecordKind::Overlay, i, &e)),
            }
        }
        let mut commentary = Vec::with_capacity(batch.commentary.len());
        for (i, c) in batch.commentary.into_iter().enumerate() {
            match c.validate(duration) {
                Ok(()) => commentary.push((c.start, c.end, c)),
                Err(e) => report
                    .skipped
                    .push(SkippedRecord::log(RecordKind::Commentary, i, &e)),
            }
        }
        let mut markers = Vec::with_capacity(batch.markers.len());
        for (i, m) in batch.markers.into_iter().enumerate() {
            match m.validate(duration) {
                Ok(()) => markers.push((m.time, m.time, m)),
                Err(e) => report.skipped.push(SkippedRecord::log(RecordKind::Marker, i, &e)),
            }
        }
        report.accepted = overlays.len() + commentary.len() + markers.len();

        let index = Self {
            id: NEXT_INDEX_ID.fetch_add(1, Ordering::Relaxed),
            duration,
            marker_window,
            overlays: IntervalTrack::build(overlays, 0.0),
            commentary: IntervalTrack::build(commentary, 0.0),
            markers: IntervalTrack::build(markers, marker_window),
        };
        tracing::debug!(
            index_id = index.id,
            accepted = report.accepted,
            skipped = report.skipped.len(),
            "timeline index built"
        );
        (index, report)
    }

    /// Return a new index that additionally contains `overlay`.
    ///
    /// The new overlay sorts after existing overlays with the same start.
    pub fn with_overlay(&self, overlay: OverlaySegment) -> Self {
        let mut entries: Vec<(f64, f64, OverlaySegment)> = self
            .overlays
            .items()
            .iter()
            .map(|o| (o.start, o.end, o.clone()))
            .collect();
        entries.push((overlay.start, overlay.end, overlay));
        Self {
            id: NEXT_INDEX_ID.fetch_add(1, Ordering::Relaxed),
            duration: self.duration,
            marker_window: self.marker_window,
            overlays: IntervalTrack::build(entries, 0.0),
            commentary: self.commentary.clone(),
            markers: self.markers.clone(),
        }
    }

    /// Process-unique identity; a cursor positioned on another index must relocate.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Duration of the indexed session.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Marker tolerance window in seconds.
    pub fn marker_window(&self) -> f64 {
        self.marker_window
    }

    /// Overlays ordered by start, then insertion.
    pub fn overlays(&self) -> &[OverlaySegment] {
        self.overlays.items()
    }

    /// Commentary ordered by start, then insertion.
    pub fn commentary(&self) -> &[CommentarySegment] {
        self.commentary.items()
    }

    /// Markers ordered by time, then insertion.
    pub fn markers(&self) -> &[AnnotationMarker] {
        self.markers.items()
    }

    /// Stateless query: binary-search each track for its candidate windows.
    pub fn query_direct(&self, t: f64) -> ActiveSet<'_> {
        self.collect(
            t,
            &self.overlays.covering(&self.overlays.windows(t), t),
            &self.commentary.covering(&self.commentary.windows(t), t),
            &self.markers.covering(&self.markers.windows(t), t),
        )
    }

    /// Reference query: a full linear scan of every record.
    pub fn query_linear(&self, t: f64) -> ActiveSet<'_> {
        self.collect(
            t,
            &self.overlays.scan(t),
            &self.commentary.scan(t),
            &self.markers.scan(t),
        )
    }

    pub(crate) fn collect(
        &self,
        t: f64,
        overlays: &[usize],
        commentary: &[usize],
        markers: &[usize],
    ) -> ActiveSet<'_> {
        ActiveSet {
            time: t,
            overlays: overlays.iter().map(|&i| self.overlays.item(i)).collect(),
            commentary: commentary.first().map(|&i| self.commentary.item(i)),
            markers: markers.iter().map(|&i| self.markers.item(i)).collect(),
        }
    }

    /// First marker strictly after `t`, optionally restricted to one category.
    pub fn next_marker_after(
        &self,
        t: f64,
        category: Option<MarkerCategory>,
    ) -> Option<&AnnotationMarker> {
        let items = self.markers.items();
        let i = items.partition_point(|m| m.time <= t);
        items[i..]
            .iter()
            .find(|m| category.is_none_or(|c| m.category == c))
    }

    /// Last marker strictly before `t`, optionally restricted to one category.
    pub fn prev_marker_before(
        &self,
        t: f64,
        category: Option<MarkerCategory>,
    ) -> Option<&AnnotationMarker> {
        let items = self.markers.items();
        let i = items.partition_point(|m| m.time < t);
        items[..i]
            .iter()
            .rev()
            .find(|m| category.is_none_or(|c| m.category == c))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/index/timeline.rs"]
pub(crate) mod tests;
