//! Cardinality and identification markers at relationship endpoints.

use crate::draw::{Circle, Primitive, RectMarker, StyleTag, Text};
use crate::geometry::Point;

pub const DOT_RADIUS: f32 = 4.0;
pub const MARKER_SIZE: f32 = 8.0;
const GLYPH_NEAR: f32 = 8.0;
const GLYPH_FAR: f32 = 16.0;

/// Glyph drawn next to the target endpoint for a source attribute's flags.
pub fn cardinality_glyph(optional: bool, many: bool) -> Option<&'static str> {
    match (optional, many) {
        (false, true) => Some("P"),
        (true, false) => Some("Z"),
        (false, false) | (true, true) => None,
    }
}

/// Markers for one relationship, given both connection points.
///
/// When the source attribute is optional or many, a dot lands on `target`
/// and the glyph (if any) is offset outward along the dominant axis of the
/// `source -> target` delta. Optional non-identifying relationships also
/// get a square marker at `source`.
pub fn relationship_symbols(
    target: Point,
    source: Point,
    optional: bool,
    many: bool,
    identifying: bool,
) -> Vec<Primitive> {
    let mut symbols = Vec::new();

    if optional || many {
        symbols.push(Circle::new(target, DOT_RADIUS, StyleTag::CardinalityDot).into());
        if let Some(glyph) = cardinality_glyph(optional, many) {
            let offset = glyph_offset(target, source);
            symbols.push(
                Text::new(
                    target.offset(offset.x, offset.y),
                    glyph,
                    StyleTag::CardinalityLabel,
                )
                .into(),
            );
        }
    }

    if optional && !identifying {
        symbols.push(RectMarker::new(source, MARKER_SIZE, StyleTag::NonIdentifyingOptional).into());
    }

    symbols
}

fn glyph_offset(target: Point, source: Point) -> Point {
    let dx = target.x - source.x;
    let dy = target.y - source.y;
    if dx.abs() > dy.abs() {
        Point::new(-dx.signum() * GLYPH_NEAR, GLYPH_FAR)
    } else {
        Point::new(GLYPH_FAR, -dy.signum() * GLYPH_NEAR)
    }
}
