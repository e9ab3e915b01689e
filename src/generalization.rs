//! Connector tree for a generalization hierarchy.
//!
//! ```text
//!      +---------+
//!      | generic |
//!      +---------+
//!           |           (gap)
//!          (o)  Role    junction + discriminator
//!        -------        underline, doubled when complete
//!        =======
//!           |
//!      +----+----+      one Z connector per category
//!      |         |
//!  +------+   +------+
//!  | cat1 |   | cat2 |
//!  +------+   +------+
//! ```

use crate::draw::{Alignment, Circle, Line, Path, Primitive, StyleTag, Text};
use crate::error::GeometryError;
use crate::geometry::{Point, Rect};
use crate::route::ensure_finite;

pub const JUNCTION_RADIUS: f32 = 8.0;
pub const JUNCTION_GAP: f32 = 18.0;
pub const UNDERLINE_OFFSET: f32 = 8.0;
pub const UNDERLINE_HALF_WIDTH: f32 = 20.0;
pub const UNDERLINE_SPACING: f32 = 6.0;
const DISCRIMINATOR_GAP: f32 = 12.0;
const DISCRIMINATOR_BASELINE: f32 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneralizationPlan {
    pub junction: Circle,
    pub underlines: Vec<Line>,
    pub discriminator: Option<Text>,
    /// One entry per category, in category order.
    pub connectors: Vec<Result<Path, GeometryError>>,
}

impl GeneralizationPlan {
    /// Where every category connector starts.
    pub fn anchor(&self) -> Point {
        Point::new(self.junction.center.x, self.underlines[0].from.y)
    }

    /// The successfully placed primitives, in drawing order.
    pub fn primitives(&self) -> Vec<Primitive> {
        let mut out: Vec<Primitive> = vec![self.junction.into()];
        out.extend(self.underlines.iter().map(|l| Primitive::from(*l)));
        out.extend(self.discriminator.iter().cloned().map(Primitive::from));
        out.extend(
            self.connectors
                .iter()
                .filter_map(|c| c.as_ref().ok())
                .cloned()
                .map(Primitive::from),
        );
        out
    }
}

/// Lays out the junction, underline(s), optional discriminator label and a
/// connector for every category rectangle.
///
/// A failure in one category connector is kept in [`GeneralizationPlan::connectors`]
/// and does not affect the others; a non-finite generic rectangle fails the
/// whole plan.
pub fn generalization_geometry(
    generic: Rect,
    categories: &[Rect],
    complete: bool,
    discriminator: Option<&str>,
) -> Result<GeneralizationPlan, GeometryError> {
    let center_x = (generic.x + generic.width / 2.0).round();
    let bottom = generic.bottom().round();
    let center = ensure_finite(
        Point::new(center_x, (bottom + JUNCTION_GAP).round()),
        "generalization junction",
    )?;

    let junction = Circle::new(center, JUNCTION_RADIUS, StyleTag::GeneralizationCircle);

    let first_y = center.y + JUNCTION_RADIUS + UNDERLINE_OFFSET;
    let underline = |y: f32| {
        Line::new(
            Point::new(center.x - UNDERLINE_HALF_WIDTH, y),
            Point::new(center.x + UNDERLINE_HALF_WIDTH, y),
            StyleTag::GeneralizationUnderline,
        )
    };
    let mut underlines = vec![underline(first_y)];
    if complete {
        underlines.push(underline(first_y + UNDERLINE_SPACING));
    }

    let discriminator = discriminator.map(|name| {
        Text::new(
            Point::new(
                center.x + JUNCTION_RADIUS + DISCRIMINATOR_GAP,
                center.y + DISCRIMINATOR_BASELINE,
            ),
            name,
            StyleTag::Discriminator,
        )
        .aligned(Alignment::Start)
    });

    let anchor = Point::new(center.x, first_y);
    let connectors = categories
        .iter()
        .map(|rect| category_connector(anchor, *rect))
        .collect();

    Ok(GeneralizationPlan {
        junction,
        underlines,
        discriminator,
        connectors,
    })
}

/// Down from `anchor` to the halfway height, across to the category's
/// horizontal center, then down onto its top edge.
pub fn category_connector(anchor: Point, category: Rect) -> Result<Path, GeometryError> {
    let target = ensure_finite(
        Point::new(
            (category.x + category.width / 2.0).round(),
            category.top().round(),
        ),
        "generalization category",
    )?;
    let mid_y = (anchor.y + (target.y - anchor.y) / 2.0).round();

    Ok(Path::new(
        vec![
            anchor,
            Point::new(anchor.x, mid_y),
            Point::new(target.x, mid_y),
            target,
        ],
        StyleTag::GeneralizationConnector,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn generic() -> Rect {
        Rect::new(100.0, 100.0, 200.0, 100.0)
    }

    #[test]
    fn junction_sits_below_generic() {
        let plan = generalization_geometry(generic(), &[], false, None).unwrap();
        assert_eq!(plan.junction.center, Point::new(200.0, 218.0));
        assert_eq!(plan.junction.radius, 8.0);
        assert_eq!(plan.anchor(), Point::new(200.0, 234.0));
    }

    #[test]
    fn incomplete_has_single_underline() {
        let plan = generalization_geometry(generic(), &[], false, None).unwrap();
        assert_eq!(plan.underlines.len(), 1);
        assert_eq!(plan.underlines[0].from, Point::new(180.0, 234.0));
        assert_eq!(plan.underlines[0].to, Point::new(220.0, 234.0));
    }

    #[test]
    fn complete_has_two_parallel_underlines() {
        let plan = generalization_geometry(generic(), &[], true, None).unwrap();
        assert_eq!(plan.underlines.len(), 2);
        assert_eq!(plan.underlines[1].from.y - plan.underlines[0].from.y, 6.0);
        assert_eq!(plan.underlines[1].from.x, plan.underlines[0].from.x);
        assert_eq!(plan.underlines[1].to.x, plan.underlines[0].to.x);
    }

    #[test]
    fn discriminator_right_of_junction() {
        let plan = generalization_geometry(generic(), &[], false, Some("Role")).unwrap();
        let text = plan.discriminator.unwrap();
        assert_eq!(text.content, "Role");
        assert_eq!(text.at, Point::new(220.0, 222.0));
        assert_eq!(text.alignment, Alignment::Start);
    }

    #[test]
    fn category_connector_is_z_shaped() {
        let category = Rect::new(0.0, 400.0, 100.0, 80.0);
        let plan = generalization_geometry(generic(), &[category], true, None).unwrap();
        let path = plan.connectors[0].as_ref().unwrap();
        assert_eq!(
            path.points,
            vec![
                Point::new(200.0, 234.0),
                Point::new(200.0, 317.0),
                Point::new(50.0, 317.0),
                Point::new(50.0, 400.0),
            ]
        );
    }

    #[test]
    fn bad_category_does_not_affect_others() {
        let good = Rect::new(0.0, 400.0, 100.0, 80.0);
        let bad = Rect::new(f32::NAN, 400.0, 100.0, 80.0);
        let plan = generalization_geometry(generic(), &[bad, good], false, None).unwrap();
        assert!(plan.connectors[0].is_err());
        assert!(plan.connectors[1].is_ok());
        // junction, underline, one connector
        assert_eq!(plan.primitives().len(), 3);
    }

    #[test]
    fn non_finite_generic_fails() {
        let generic = Rect::new(0.0, f32::INFINITY, 10.0, 10.0);
        assert!(generalization_geometry(generic, &[], false, None).is_err());
    }
}
