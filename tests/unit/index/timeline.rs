use super::*;
use crate::foundation::core::{NormPoint, Rgba8};
use crate::model::annotation::{MarkerCategory, OverlayShape};
use crate::model::session::{AnalysisMode, SessionDescriptor};

pub(crate) fn session(duration: f64) -> VideoSession {
    VideoSession::from_descriptor(SessionDescriptor {
        id: "s".to_string(),
        media_reference: "m.mp4".to_string(),
        thumbnail_reference: None,
        duration,
        analysis_mode: AnalysisMode::TacticalBreakdown,
        tags: vec![],
        positional_metadata: serde_json::Value::Null,
    })
    .unwrap()
}

pub(crate) fn overlay(id: &str, start: f64, end: f64) -> OverlaySegment {
    OverlaySegment {
        id: id.to_string(),
        start,
        end,
        shape: OverlayShape::Line {
            from: NormPoint::new(0.1, 0.1).unwrap(),
            to: NormPoint::new(0.9, 0.9).unwrap(),
        },
        color: Rgba8::default(),
        label: None,
        description: String::new(),
    }
}

pub(crate) fn commentary(id: &str, start: f64, end: f64) -> CommentarySegment {
    CommentarySegment {
        id: id.to_string(),
        start,
        end,
        author: "coach".to_string(),
        text: format!("comment {id}"),
        rating: 3.0,
    }
}

pub(crate) fn marker(id: &str, time: f64) -> AnnotationMarker {
    AnnotationMarker {
        id: id.to_string(),
        time,
        category: MarkerCategory::Success,
        description: String::new(),
        confidence: 90.0,
    }
}

/// xorshift64*; deterministic pseudo-random fixtures without extra dependencies.
pub(crate) struct Rng(u64);

impl Rng {
    pub(crate) fn new(seed: u64) -> Self {
        Self(seed.max(1))
    }

    pub(crate) fn next_f64(&mut self) -> f64 {
        self.0 ^= self.0 >> 12;
        self.0 ^= self.0 << 25;
        self.0 ^= self.0 >> 27;
        let v = self.0.wrapping_mul(0x2545_f491_4f6c_dd1d);
        (v >> 11) as f64 / (1u64 << 53) as f64
    }
}

pub(crate) fn random_index(seed: u64, duration: f64, n: usize) -> TimelineIndex {
    let mut rng = Rng::new(seed);
    let mut batch = AnnotationBatch::default();
    for i in 0..n {
        let start = (rng.next_f64() * duration * 10.0).round() / 10.0;
        let len = (rng.next_f64() * 8.0 * 10.0).round() / 10.0;
        batch
            .overlays
            .push(overlay(&format!("o{i}"), start, (start + len).min(duration)));
        let cs = (rng.next_f64() * duration).floor();
        batch.commentary.push(commentary(
            &format!("c{i}"),
            cs,
            (cs + rng.next_f64() * 12.0).min(duration),
        ));
        batch
            .markers
            .push(marker(&format!("m{i}"), (rng.next_f64() * duration * 4.0).round() / 4.0));
    }
    TimelineIndex::build(&session(duration), batch, DEFAULT_MARKER_WINDOW_S).0
}

#[test]
fn overlay_query_matches_linear_scan_everywhere() {
    let index = random_index(7, 60.0, 120);
    let mut t = 0.0;
    while t <= 60.0 {
        let direct = index.query_direct(t);
        let linear = index.query_linear(t);
        assert_eq!(direct, linear, "mismatch at t={t}");

        let expected: Vec<&str> = index
            .overlays()
            .iter()
            .filter(|o| o.start <= t && t <= o.end)
            .map(|o| o.id.as_str())
            .collect();
        assert_eq!(direct.overlay_ids(), expected, "overlay mismatch at t={t}");
        t += 0.05;
    }
}

#[test]
fn interval_bounds_are_inclusive() {
    let mut batch = AnnotationBatch::default();
    batch.overlays.push(overlay("a", 5.0, 10.0));
    let (index, _) = TimelineIndex::build(&session(60.0), batch, 2.0);
    assert!(index.query_direct(4.999).overlays.is_empty());
    assert_eq!(index.query_direct(5.0).overlay_ids(), vec!["a"]);
    assert_eq!(index.query_direct(10.0).overlay_ids(), vec!["a"]);
    assert!(index.query_direct(10.001).overlays.is_empty());
}

#[test]
fn commentary_tie_break_is_deterministic() {
    let mut batch = AnnotationBatch::default();
    batch.commentary.push(commentary("late", 5.0, 15.0));
    batch.commentary.push(commentary("early", 0.0, 10.0));
    batch.commentary.push(commentary("early-twin", 0.0, 10.0));
    let (index, _) = TimelineIndex::build(&session(60.0), batch, 2.0);

    for _ in 0..10 {
        assert_eq!(index.query_direct(7.0).commentary.unwrap().id, "early");
        assert_eq!(index.query_linear(7.0).commentary.unwrap().id, "early");
    }
    assert_eq!(index.query_direct(12.0).commentary.unwrap().id, "late");
    assert!(index.query_direct(16.0).commentary.is_none());
}

#[test]
fn marker_tolerance_window() {
    let mut batch = AnnotationBatch::default();
    batch.markers.push(marker("m15", 15.0));
    let (index, _) = TimelineIndex::build(&session(60.0), batch, 2.0);

    assert_eq!(index.query_direct(13.5).marker_ids(), vec!["m15"]);
    assert_eq!(index.query_direct(16.5).marker_ids(), vec!["m15"]);
    assert_eq!(index.query_direct(13.0).marker_ids(), vec!["m15"]);
    assert!(index.query_direct(10.0).markers.is_empty());
    assert!(index.query_direct(20.0).markers.is_empty());
}

#[test]
fn invalid_records_are_skipped_at_build() {
    let mut batch = AnnotationBatch::default();
    batch.overlays.push(overlay("ok", 1.0, 2.0));
    batch.overlays.push(overlay("reversed", 5.0, 2.0));
    batch.commentary.push(commentary("late-start", 70.0, 80.0));
    batch.markers.push(marker("nan", f64::NAN));
    batch.markers.push(marker("ok", 3.0));

    let (index, report) = TimelineIndex::build(&session(60.0), batch, 2.0);
    assert_eq!(report.accepted, 2);
    assert_eq!(report.skipped.len(), 3);
    assert_eq!(index.overlays().len(), 1);
    assert_eq!(index.query_direct(1.5).overlay_ids(), vec!["ok"]);
    assert_eq!(index.query_direct(3.0).marker_ids(), vec!["ok"]);
}

#[test]
fn with_overlay_appends_after_equal_starts() {
    let mut batch = AnnotationBatch::default();
    batch.overlays.push(overlay("a", 2.0, 6.0));
    let (index, _) = TimelineIndex::build(&session(60.0), batch, 2.0);
    let next = index.with_overlay(overlay("b", 2.0, 3.0));

    assert_ne!(index.id(), next.id());
    assert_eq!(index.overlays().len(), 1);
    assert_eq!(next.query_direct(2.5).overlay_ids(), vec!["a", "b"]);
}

#[test]
fn marker_navigation() {
    let mut batch = AnnotationBatch::default();
    for (id, t) in [("a", 5.0), ("b", 15.0), ("c", 40.0)] {
        batch.markers.push(marker(id, t));
    }
    let (index, _) = TimelineIndex::build(&session(60.0), batch, 2.0);

    assert_eq!(index.next_marker_after(0.0, None).unwrap().id, "a");
    assert_eq!(index.next_marker_after(5.0, None).unwrap().id, "b");
    assert!(index.next_marker_after(40.0, None).is_none());
    assert_eq!(index.prev_marker_before(15.0, None).unwrap().id, "a");
    assert_eq!(index.prev_marker_before(60.0, None).unwrap().id, "c");
    assert!(index.prev_marker_before(5.0, None).is_none());
}

#[test]
fn marker_navigation_with_category() {
    let mut batch = AnnotationBatch::default();
    for (id, t, category) in [
        ("a", 5.0, MarkerCategory::Coaching),
        ("b", 15.0, MarkerCategory::Success),
        ("c", 40.0, MarkerCategory::Coaching),
    ] {
        let mut m = marker(id, t);
        m.category = category;
        batch.markers.push(m);
    }
    let (index, _) = TimelineIndex::build(&session(60.0), batch, 2.0);

    let coaching = Some(MarkerCategory::Coaching);
    assert_eq!(index.next_marker_after(5.0, coaching).unwrap().id, "c");
    assert_eq!(index.prev_marker_before(40.0, coaching).unwrap().id, "a");
    assert!(index.next_marker_after(15.0, Some(MarkerCategory::Improvement)).is_none());
}

#[test]
fn invalid_marker_window_falls_back_to_default() {
    let (index, _) = TimelineIndex::build(&session(10.0), AnnotationBatch::default(), -1.0);
    assert_eq!(index.marker_window(), DEFAULT_MARKER_WINDOW_S);
}

pub(crate) fn long_tail_index() -> TimelineIndex {
    let mut batch = AnnotationBatch::default();
    for i in 0..10_000 {
        let start = i as f64 * 0.36;
        batch.overlays.push(overlay(&format!("o{i}"), start, start + 1.0));
    }
    batch.overlays.push(overlay("whole", 0.0, 3600.0));
    TimelineIndex::build(&session(3600.0), batch, DEFAULT_MARKER_WINDOW_S).0
}

#[test]
fn one_long_overlay_does_not_widen_every_window() {
    let index = long_tail_index();
    for t in [0.0, 1234.5, 3000.0, 3599.9] {
        let windows = index.overlays.windows(t);
        let scanned: usize = windows.iter().map(|&(lo, hi)| hi - lo).sum();
        assert!(scanned <= 8, "t={t}: scanned {scanned} of {}", index.overlays.len());

        let direct = index.query_direct(t);
        assert_eq!(direct, index.query_linear(t), "t={t}");
        assert!(direct.overlay_ids().contains(&"whole"));
    }
    assert_eq!(index.query_direct(3000.0).overlays.len(), 4);
}

#[test]
fn span_classes_double() {
    assert_eq!(span_class(0.0), 0);
    assert_eq!(span_class(0.5), 0);
    assert_eq!(span_class(0.6), 1);
    assert_eq!(span_class(1.0), 1);
    assert_eq!(span_class(1.5), 2);
    assert_eq!(span_class(3600.0), 13);
}
