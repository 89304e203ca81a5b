use super::*;
use crate::foundation::core::Rgba8;

fn np(x: f64, y: f64) -> NormPoint {
    NormPoint::new(x, y).unwrap()
}

fn seg(id: &str, shape: OverlayShape, label: Option<&str>) -> OverlaySegment {
    OverlaySegment {
        id: id.to_string(),
        start: 0.0,
        end: 5.0,
        shape,
        color: Rgba8::opaque(255, 0, 0),
        label: label.map(str::to_string),
        description: String::new(),
    }
}

fn close(a: Point, b: Point) -> bool {
    (a - b).hypot() < 1e-9
}

#[test]
fn center_maps_to_surface_center() {
    for (w, h) in [(800.0, 450.0), (1920.0, 1080.0), (333.0, 777.0)] {
        let surface = SurfaceSize::new(w, h);
        assert_eq!(to_pixel(np(0.5, 0.5), surface), surface.center());
    }
    assert_eq!(
        to_pixel(np(0.5, 0.5), SurfaceSize::new(800.0, 450.0)),
        Point::new(400.0, 225.0)
    );
    assert_eq!(
        to_pixel(np(0.5, 0.5), SurfaceSize::new(1920.0, 1080.0)),
        Point::new(960.0, 540.0)
    );
}

#[test]
fn pixel_normalized_roundtrip_within_tolerance() {
    let surface = SurfaceSize::new(1280.0, 720.0);
    for p in [
        Point::new(0.0, 0.0),
        Point::new(17.0, 611.0),
        Point::new(640.5, 359.25),
        Point::new(1280.0, 720.0),
    ] {
        let back = to_pixel(to_normalized(p, surface).unwrap(), surface);
        assert!((back - p).hypot() < 1e-6, "{p:?} -> {back:?}");
    }
}

#[test]
fn inverse_clamps_outside_points() {
    let surface = SurfaceSize::new(100.0, 100.0);
    assert_eq!(
        to_normalized(Point::new(-5.0, 250.0), surface).unwrap(),
        NormPoint { x: 0.0, y: 1.0 }
    );
}

#[test]
fn unavailable_surface_is_reported() {
    let shapes = [seg("a", OverlayShape::Line { from: np(0.0, 0.0), to: np(1.0, 1.0) }, None)];
    let refs: Vec<&OverlaySegment> = shapes.iter().collect();
    assert!(resolve_overlays(&refs, SurfaceSize::new(0.0, 0.0)).is_err());
    assert!(to_normalized(Point::ORIGIN, SurfaceSize::new(10.0, 0.0)).is_err());
}

#[test]
fn shapes_resolve_to_pixel_space() {
    let surface = SurfaceSize::new(800.0, 400.0);
    let shapes = [
        seg("line", OverlayShape::Line { from: np(0.0, 0.0), to: np(1.0, 1.0) }, None),
        seg("circle", OverlayShape::Circle { center: np(0.5, 0.5), radius: 0.25 }, None),
        seg("box", OverlayShape::Rect { a: np(0.75, 0.5), b: np(0.25, 0.25) }, None),
    ];
    let refs: Vec<&OverlaySegment> = shapes.iter().collect();
    let cmds = resolve_overlays(&refs, surface).unwrap();
    assert_eq!(cmds.len(), 3);

    match &cmds[0] {
        DrawCommand::StrokeLine { line, .. } => {
            assert_eq!(line.p0, Point::new(0.0, 0.0));
            assert_eq!(line.p1, Point::new(800.0, 400.0));
        }
        other => panic!("unexpected {other:?}"),
    }
    match &cmds[1] {
        DrawCommand::StrokeCircle { circle, .. } => {
            assert_eq!(circle.center, Point::new(400.0, 200.0));
            assert_eq!(circle.radius, 100.0);
        }
        other => panic!("unexpected {other:?}"),
    }
    match &cmds[2] {
        DrawCommand::StrokeRect { rect, .. } => {
            assert_eq!(*rect, Rect::new(200.0, 100.0, 600.0, 200.0));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn arrow_head_barbs_are_thirty_degrees_off_shaft() {
    let tail = Point::new(0.0, 0.0);
    let tip = Point::new(100.0, 0.0);
    let head = arrow_head(tail, tip);
    let els = head.elements();
    assert_eq!(els.len(), 3);

    let (kurbo::PathEl::MoveTo(left), kurbo::PathEl::LineTo(mid), kurbo::PathEl::LineTo(right)) =
        (els[0], els[1], els[2])
    else {
        panic!("unexpected path {els:?}");
    };
    assert!(close(mid, tip));

    let dx = ARROW_HEAD_LEN_PX * ARROW_HEAD_ANGLE_RAD.cos();
    let dy = ARROW_HEAD_LEN_PX * ARROW_HEAD_ANGLE_RAD.sin();
    assert!(close(left, Point::new(100.0 - dx, -dy)));
    assert!(close(right, Point::new(100.0 - dx, dy)));
}

#[test]
fn arrow_emits_shaft_head_and_label() {
    let surface = SurfaceSize::new(200.0, 100.0);
    let arrow = seg(
        "run",
        OverlayShape::Arrow { from: np(0.25, 0.5), to: np(0.75, 0.5) },
        Some("overlap"),
    );
    let cmds = resolve_overlays(&[&arrow], surface).unwrap();
    assert_eq!(cmds.len(), 3);
    assert!(cmds.iter().all(|c| c.overlay_id() == "run"));
    match &cmds[2] {
        DrawCommand::Label { text, origin, .. } => {
            assert_eq!(text, "overlap");
            assert_eq!(*origin, Point::new(50.0, 50.0) + LABEL_OFFSET_PX);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn resize_recomputes_positions() {
    let line = seg("l", OverlayShape::Line { from: np(0.5, 0.5), to: np(1.0, 1.0) }, None);
    let small = resolve_overlays(&[&line], SurfaceSize::new(800.0, 450.0)).unwrap();
    let large = resolve_overlays(&[&line], SurfaceSize::new(1920.0, 1080.0)).unwrap();
    assert_ne!(small, large);
    match &large[0] {
        DrawCommand::StrokeLine { line, .. } => assert_eq!(line.p0, Point::new(960.0, 540.0)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn radius_roundtrip() {
    let surface = SurfaceSize::new(1600.0, 900.0);
    let r = radius_to_normalized(90.0, surface).unwrap();
    assert!((r - 0.1).abs() < 1e-12);
    assert!((radius_to_pixel(r, surface) - 90.0).abs() < 1e-9);
    assert_eq!(radius_to_normalized(5_000.0, surface).unwrap(), 1.0);
}
