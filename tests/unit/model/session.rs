use super::*;
use serde_json::json;

fn descriptor() -> SessionDescriptor {
    serde_json::from_value(json!({
        "id": "s-1",
        "mediaReference": "media/s-1.mp4",
        "thumbnailReference": "thumbs/s-1.jpg",
        "duration": 60.0,
        "analysisMode": "tactical_breakdown",
        "tags": ["u16", "pressing"],
        "positionalMetadata": { "camera": "wide" }
    }))
    .unwrap()
}

#[test]
fn descriptor_converts_into_session() {
    let s = VideoSession::try_from(descriptor()).unwrap();
    assert_eq!(s.id(), "s-1");
    assert_eq!(s.duration(), 60.0);
    assert_eq!(s.analysis_mode(), AnalysisMode::TacticalBreakdown);
    assert_eq!(s.tags().len(), 2);
    assert_eq!(s.thumbnail_reference(), Some("thumbs/s-1.jpg"));
    assert_eq!(s.positional_metadata()["camera"], "wide");
}

#[test]
fn optional_descriptor_fields_default() {
    let d: SessionDescriptor = serde_json::from_value(json!({
        "id": "s-2",
        "mediaReference": "m",
        "duration": 1.0,
        "analysisMode": "slow_motion_commentary"
    }))
    .unwrap();
    assert!(d.tags.is_empty());
    assert!(d.positional_metadata.is_null());
    assert!(d.thumbnail_reference.is_none());
}

#[test]
fn rejects_bad_duration_and_id() {
    let mut d = descriptor();
    d.duration = 0.0;
    assert!(VideoSession::from_descriptor(d).is_err());

    let mut d = descriptor();
    d.id = "  ".to_string();
    assert!(VideoSession::from_descriptor(d).is_err());
}
