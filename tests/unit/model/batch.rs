use super::*;
use serde_json::json;

fn sample_def() -> AnnotationBatchDef {
    serde_json::from_value(json!({
        "markers": [
            { "id": "m1", "time": 15.0, "category": "success", "description": "clean first touch", "confidence": 92 },
            { "time": 20.0, "category": "not-a-category", "confidence": 50 },
            { "time": 30.0, "category": "coaching", "confidence": 40 }
        ],
        "overlays": [
            { "id": "o1", "start": 1.0, "end": 4.0, "shape": "arrow", "anchors": [[0.1, 0.2], [0.5, 0.6]], "color": "#ff0000", "label": "run" },
            { "id": "o2", "start": 2.0, "end": 5.0, "shape": "circle", "anchors": [[0.5, 0.5]], "radius": 0.1 },
            { "id": "bad-anchor", "start": 2.0, "end": 5.0, "shape": "line", "anchors": [[1.5, 0.5], [0.2, 0.2]] },
            { "id": "bad-arity", "start": 2.0, "end": 5.0, "shape": "box", "anchors": [[0.5, 0.5]] }
        ],
        "commentary": [
            { "id": "c1", "start": 0.0, "end": 10.0, "author": "Coach A", "text": "shape up", "rating": 4 },
            { "id": "c2", "time": 12.0, "author": "Coach B", "text": "timestamp only" },
            { "id": "c3", "start": 1.0, "author": 7, "text": "bad author" }
        ]
    }))
    .unwrap()
}

#[test]
fn malformed_records_are_skipped_not_fatal() {
    let (batch, skipped) = decode_batch(sample_def(), DEFAULT_COMMENTARY_SPAN_S);

    assert_eq!(batch.markers.len(), 2);
    assert_eq!(batch.overlays.len(), 2);
    assert_eq!(batch.commentary.len(), 2);
    assert_eq!(batch.len(), 6);

    let kinds: Vec<(RecordKind, usize)> = skipped.iter().map(|s| (s.kind, s.index)).collect();
    assert_eq!(
        kinds,
        vec![
            (RecordKind::Marker, 1),
            (RecordKind::Overlay, 2),
            (RecordKind::Overlay, 3),
            (RecordKind::Commentary, 2),
        ]
    );
}

#[test]
fn missing_ids_get_positional_defaults() {
    let (batch, _) = decode_batch(sample_def(), DEFAULT_COMMENTARY_SPAN_S);
    assert_eq!(batch.markers[1].id, "marker-2");
}

#[test]
fn commentary_without_end_gets_default_span() {
    let (batch, _) = decode_batch(sample_def(), 3.0);
    let c2 = batch.commentary.iter().find(|c| c.id == "c2").unwrap();
    assert_eq!(c2.start, 12.0);
    assert_eq!(c2.end, 15.0);
    assert_eq!(c2.rating, 0.0);
}

#[test]
fn overlay_fields_decode() {
    let (batch, _) = decode_batch(sample_def(), DEFAULT_COMMENTARY_SPAN_S);
    let o1 = &batch.overlays[0];
    assert_eq!(o1.color, Rgba8::opaque(255, 0, 0));
    assert_eq!(o1.label.as_deref(), Some("run"));
    assert_eq!(o1.shape.kind(), ShapeKind::Arrow);

    let o2 = &batch.overlays[1];
    assert_eq!(o2.color, Rgba8::default());
    assert!(matches!(o2.shape, OverlayShape::Circle { radius, .. } if radius == 0.1));
}

#[test]
fn empty_document_is_an_empty_batch() {
    let def = AnnotationBatchDef::from_json_str("{}").unwrap();
    let (batch, skipped) = decode_batch(def, DEFAULT_COMMENTARY_SPAN_S);
    assert!(batch.is_empty());
    assert!(skipped.is_empty());
}

#[test]
fn non_object_document_is_a_serde_error() {
    let err = AnnotationBatchDef::from_json_str("[1,2,3]").unwrap_err();
    assert!(err.to_string().contains("serialization error:"));
}
