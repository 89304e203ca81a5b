use super::*;

fn p(x: f64, y: f64) -> NormPoint {
    NormPoint::new(x, y).unwrap()
}

fn overlay(start: f64, end: f64) -> OverlaySegment {
    OverlaySegment {
        id: "o1".to_string(),
        start,
        end,
        shape: OverlayShape::Line {
            from: p(0.1, 0.1),
            to: p(0.9, 0.9),
        },
        color: Rgba8::default(),
        label: None,
        description: String::new(),
    }
}

#[test]
fn shape_from_anchors_checks_arity() {
    let arrow = OverlayShape::from_anchors(ShapeKind::Arrow, &[p(0.0, 0.0), p(1.0, 1.0)], None);
    assert_eq!(arrow.unwrap().kind(), ShapeKind::Arrow);

    assert!(OverlayShape::from_anchors(ShapeKind::Arrow, &[p(0.0, 0.0)], None).is_err());
    assert!(OverlayShape::from_anchors(ShapeKind::Circle, &[p(0.5, 0.5)], None).is_err());
    assert!(
        OverlayShape::from_anchors(ShapeKind::Circle, &[p(0.5, 0.5), p(0.6, 0.6)], Some(0.1))
            .is_err()
    );

    let circle = OverlayShape::from_anchors(ShapeKind::Circle, &[p(0.5, 0.5)], Some(0.1)).unwrap();
    assert_eq!(circle.primary_anchor(), p(0.5, 0.5));
    assert_eq!(circle.anchors().len(), 1);
}

#[test]
fn circle_radius_must_be_positive() {
    let shape = OverlayShape::Circle {
        center: p(0.5, 0.5),
        radius: 0.0,
    };
    assert!(shape.validate().is_err());
}

#[test]
fn overlay_interval_validation() {
    assert!(overlay(1.0, 2.0).validate(60.0).is_ok());
    assert!(overlay(2.0, 2.0).validate(60.0).is_ok());
    assert!(overlay(3.0, 2.0).validate(60.0).is_err());
    assert!(overlay(61.0, 62.0).validate(60.0).is_err());
    assert!(overlay(f64::NAN, 2.0).validate(60.0).is_err());
}

#[test]
fn overlay_contains_is_inclusive() {
    let o = overlay(1.0, 2.0);
    assert!(o.contains(1.0));
    assert!(o.contains(2.0));
    assert!(!o.contains(2.0001));
}

#[test]
fn marker_and_commentary_ranges() {
    let mut m = AnnotationMarker {
        id: "m".to_string(),
        time: 15.0,
        category: MarkerCategory::Coaching,
        description: String::new(),
        confidence: 80.0,
    };
    assert!(m.validate(60.0).is_ok());
    m.confidence = 120.0;
    assert!(m.validate(60.0).is_err());

    let mut c = CommentarySegment {
        id: "c".to_string(),
        start: 0.0,
        end: 10.0,
        author: "coach".to_string(),
        text: "watch the hips".to_string(),
        rating: 4.5,
    };
    assert!(c.validate(60.0).is_ok());
    c.rating = 6.0;
    assert!(c.validate(60.0).is_err());
}

#[test]
fn shape_kind_wire_names() {
    assert_eq!(serde_json::to_string(&ShapeKind::Rect).unwrap(), "\"box\"");
    let k: ShapeKind = serde_json::from_str("\"arrow\"").unwrap();
    assert_eq!(k, ShapeKind::Arrow);
}
