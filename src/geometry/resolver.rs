//! Normalized overlay geometry to absolute draw commands.
//!
//! Everything here is a pure function of its inputs. The pixel transform
//! (`pixel = normalized * surface dimension`) is recomputed on every call, so a resize can
//! never leave overlays positioned for a stale surface.

use std::f64::consts::FRAC_PI_6;

use crate::foundation::core::{BezPath, Circle, Line, NormPoint, Point, Rect, SurfaceSize, Vec2};
use crate::geometry::draw::DrawCommand;
use crate::model::annotation::{OverlaySegment, OverlayShape};

/// Arrowhead barbs are drawn at this angle either side of the shaft.
pub const ARROW_HEAD_ANGLE_RAD: f64 = FRAC_PI_6;
/// Length of each arrowhead barb.
pub const ARROW_HEAD_LEN_PX: f64 = 14.0;
/// Stroke width of every overlay shape.
pub const STROKE_WIDTH_PX: f64 = 3.0;
/// Label origin relative to the shape's primary anchor.
pub const LABEL_OFFSET_PX: Vec2 = Vec2::new(8.0, -8.0);

/// The drawing surface is detached, hidden, or zero-sized.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
#[error("render surface unavailable ({width}x{height})")]
pub struct SurfaceUnavailable {
    /// Reported width.
    pub width: f64,
    /// Reported height.
    pub height: f64,
}

fn check_surface(surface: SurfaceSize) -> Result<(), SurfaceUnavailable> {
    if surface.is_available() {
        Ok(())
    } else {
        Err(SurfaceUnavailable {
            width: surface.width,
            height: surface.height,
        })
    }
}

/// Forward transform. The surface must be available.
pub fn to_pixel(p: NormPoint, surface: SurfaceSize) -> Point {
    Point::new(p.x * surface.width, p.y * surface.height)
}

/// Inverse transform; points outside the surface clamp to its edge.
pub fn to_normalized(p: Point, surface: SurfaceSize) -> Result<NormPoint, SurfaceUnavailable> {
    check_surface(surface)?;
    Ok(NormPoint::clamped(p.x / surface.width, p.y / surface.height))
}

/// Circle radius in pixels for a normalized radius.
pub fn radius_to_pixel(radius: f64, surface: SurfaceSize) -> f64 {
    radius * surface.min_side()
}

/// Normalized radius for a pixel radius, capped at 1.
pub fn radius_to_normalized(radius_px: f64, surface: SurfaceSize) -> Result<f64, SurfaceUnavailable> {
    check_surface(surface)?;
    Ok((radius_px / surface.min_side()).clamp(0.0, 1.0))
}

/// Resolve the full active set into draw commands, in input order.
pub fn resolve_overlays(
    shapes: &[&OverlaySegment],
    surface: SurfaceSize,
) -> Result<Vec<DrawCommand>, SurfaceUnavailable> {
    check_surface(surface)?;
    let mut out = Vec::with_capacity(shapes.len() * 2);
    for seg in shapes {
        resolve_one(seg, surface, &mut out);
    }
    Ok(out)
}

fn resolve_one(seg: &OverlaySegment, surface: SurfaceSize, out: &mut Vec<DrawCommand>) {
    let overlay_id = seg.id.clone();
    let color = seg.color;
    let width = STROKE_WIDTH_PX;

    match seg.shape {
        OverlayShape::Arrow { from, to } => {
            let (from, to) = (to_pixel(from, surface), to_pixel(to, surface));
            out.push(DrawCommand::StrokeLine {
                overlay_id: overlay_id.clone(),
                line: Line::new(from, to),
                color,
                width,
            });
            out.push(DrawCommand::StrokePath {
                overlay_id: overlay_id.clone(),
                path: arrow_head(from, to),
                color,
                width,
            });
        }
        OverlayShape::Line { from, to } => {
            out.push(DrawCommand::StrokeLine {
                overlay_id: overlay_id.clone(),
                line: Line::new(to_pixel(from, surface), to_pixel(to, surface)),
                color,
                width,
            });
        }
        OverlayShape::Circle { center, radius } => {
            out.push(DrawCommand::StrokeCircle {
                overlay_id: overlay_id.clone(),
                circle: Circle::new(
                    to_pixel(center, surface),
                    radius_to_pixel(radius, surface),
                ),
                color,
                width,
            });
        }
        OverlayShape::Rect { a, b } => {
            out.push(DrawCommand::StrokeRect {
                overlay_id: overlay_id.clone(),
                rect: Rect::from_points(to_pixel(a, surface), to_pixel(b, surface)),
                color,
                width,
            });
        }
    }

    if let Some(text) = &seg.label {
        out.push(DrawCommand::Label {
            overlay_id,
            text: text.clone(),
            origin: to_pixel(seg.shape.primary_anchor(), surface) + LABEL_OFFSET_PX,
            color,
        });
    }
}

/// Two barbs meeting at `tip`, each `ARROW_HEAD_ANGLE_RAD` off the shaft direction.
pub(crate) fn arrow_head(tail: Point, tip: Point) -> BezPath {
    let shaft = tip - tail;
    let angle = shaft.y.atan2(shaft.x);
    let barb = |offset: f64| {
        let a = angle + offset;
        tip - Vec2::new(a.cos(), a.sin()) * ARROW_HEAD_LEN_PX
    };

    let mut path = BezPath::new();
    path.move_to(barb(ARROW_HEAD_ANGLE_RAD));
    path.line_to(tip);
    path.line_to(barb(-ARROW_HEAD_ANGLE_RAD));
    path
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/resolver.rs"]
mod tests;
