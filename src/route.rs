//! Boundary anchoring and dogleg routing between two entity rectangles.

use crate::error::GeometryError;
use crate::geometry::{Point, Rect};

/// Pull-back along the crossing axis so a connector never sits on the border.
pub const BORDER_INSET: f32 = 1.0;

/// Where the segment from `from`'s center towards `to`'s center leaves `from`.
///
/// The dominant axis of the center-to-center delta picks the crossed edge;
/// ties go to the top/bottom edges.
pub fn connection_point(from: Rect, to: Rect) -> Result<Point, GeometryError> {
    let fc = ensure_finite(from.center(), "source rectangle")?;
    let tc = ensure_finite(to.center(), "target rectangle")?;
    let dx = tc.x - fc.x;
    let dy = tc.y - fc.y;

    if dx == 0.0 && dy == 0.0 {
        return Err(GeometryError::Degenerate { at: fc });
    }

    let half_w = from.width / 2.0;
    let half_h = from.height / 2.0;
    let point = if dx.abs() > dy.abs() {
        let sign = dx.signum();
        let y = (fc.y + half_h * (dy / dx.abs())).max(from.top()).min(from.bottom());
        Point::new(fc.x + sign * half_w - sign * BORDER_INSET, y)
    } else {
        let sign = dy.signum();
        let x = (fc.x + half_w * (dx / dy.abs())).max(from.left()).min(from.right());
        Point::new(x, fc.y + sign * half_h - sign * BORDER_INSET)
    };

    ensure_finite(point, "connection point")
}

/// A two-bend axis-aligned connector.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Start, both bends, end.
    pub points: [Point; 4],
    /// Lies on the middle segment; relationship labels are centered here.
    pub midpoint: Point,
}

/// Routes `start` to `end` horizontally-vertically-horizontally when the
/// horizontal distance dominates, vertically-horizontally-vertically
/// otherwise.
pub fn route_orthogonal(start: Point, end: Point) -> Result<Route, GeometryError> {
    let dx = end.x - start.x;
    let dy = end.y - start.y;

    let route = if dx.abs() > dy.abs() {
        let mid_x = start.x + dx / 2.0;
        Route {
            points: [start, Point::new(mid_x, start.y), Point::new(mid_x, end.y), end],
            midpoint: Point::new(mid_x, (start.y + end.y) / 2.0),
        }
    } else {
        let mid_y = start.y + dy / 2.0;
        Route {
            points: [start, Point::new(start.x, mid_y), Point::new(end.x, mid_y), end],
            midpoint: Point::new((start.x + end.x) / 2.0, mid_y),
        }
    };

    for p in route.points.iter().chain(std::iter::once(&route.midpoint)) {
        ensure_finite(*p, "orthogonal route")?;
    }
    Ok(route)
}

pub(crate) fn ensure_finite(point: Point, context: &str) -> Result<Point, GeometryError> {
    if point.is_finite() {
        Ok(point)
    } else {
        Err(GeometryError::NonFinite {
            context: context.to_string(),
            point,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn horizontal_neighbour_hits_right_edge() {
        let from = Rect::new(0.0, 0.0, 100.0, 50.0);
        let to = Rect::new(300.0, 0.0, 100.0, 50.0);
        let p = connection_point(from, to).unwrap();
        assert_approx_eq!(f32, p.x, 99.0);
        assert_approx_eq!(f32, p.y, 25.0);
    }

    #[test]
    fn vertical_neighbour_hits_top_edge() {
        let from = Rect::new(0.0, 200.0, 100.0, 50.0);
        let to = Rect::new(0.0, 0.0, 100.0, 50.0);
        let p = connection_point(from, to).unwrap();
        assert_approx_eq!(f32, p.x, 50.0);
        assert_approx_eq!(f32, p.y, 201.0);
    }

    #[test]
    fn diagonal_tie_uses_vertical_edge_rule() {
        let from = Rect::new(0.0, 0.0, 100.0, 100.0);
        let to = Rect::new(200.0, 200.0, 100.0, 100.0);
        let p = connection_point(from, to).unwrap();
        assert_approx_eq!(f32, p.x, 100.0);
        assert_approx_eq!(f32, p.y, 99.0);
    }

    #[test]
    fn perpendicular_coordinate_is_interpolated() {
        let from = Rect::new(0.0, 0.0, 100.0, 40.0);
        let to = Rect::new(400.0, 100.0, 100.0, 40.0);
        // dx = 400, dy = 100 -> y = 20 + 20 * 0.25
        let p = connection_point(from, to).unwrap();
        assert_approx_eq!(f32, p.y, 25.0);
    }

    #[test]
    fn coincident_centers_are_degenerate() {
        let a = Rect::new(10.0, 10.0, 100.0, 50.0);
        let b = Rect::new(35.0, 20.0, 50.0, 30.0);
        assert_eq!(
            connection_point(a, b),
            Err(GeometryError::Degenerate {
                at: Point::new(60.0, 35.0)
            })
        );
    }

    #[test]
    fn non_finite_input_is_reported() {
        let a = Rect::new(f32::NAN, 0.0, 10.0, 10.0);
        let b = Rect::new(100.0, 0.0, 10.0, 10.0);
        assert!(matches!(
            connection_point(a, b),
            Err(GeometryError::NonFinite { .. })
        ));
    }

    #[test]
    fn route_bends_horizontally_first() {
        let route = route_orthogonal(Point::new(0.0, 0.0), Point::new(100.0, 20.0)).unwrap();
        assert_eq!(route.midpoint, Point::new(50.0, 10.0));
        assert_eq!(route.points[1], Point::new(50.0, 0.0));
        assert_eq!(route.points[2], Point::new(50.0, 20.0));
    }

    #[test]
    fn route_bends_vertically_first() {
        let route = route_orthogonal(Point::new(0.0, 0.0), Point::new(20.0, 100.0)).unwrap();
        assert_eq!(route.midpoint, Point::new(10.0, 50.0));
        assert_eq!(route.points[1], Point::new(0.0, 50.0));
        assert_eq!(route.points[2], Point::new(20.0, 50.0));
    }

    #[test]
    fn route_rejects_infinite_endpoint() {
        let err = route_orthogonal(Point::new(0.0, 0.0), Point::new(f32::INFINITY, 0.0));
        assert!(matches!(err, Err(GeometryError::NonFinite { .. })));
    }
}
