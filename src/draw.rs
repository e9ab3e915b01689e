//! Draw primitives handed to a rendering surface.
//!
//! Each primitive kind has its own small builder type. A surface only needs
//! to match on [`Primitive`]; none of these types know how they are painted.

use std::fmt;

use crate::geometry::{Point, Rect};

/// Semantic styling hint. The surface decides what each tag looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTag {
    StrongEntity,
    WeakEntity,
    IdentifyingLine,
    NonIdentifyingLine,
    RelationshipLabel,
    CardinalityDot,
    CardinalityLabel,
    NonIdentifyingOptional,
    GeneralizationCircle,
    GeneralizationUnderline,
    GeneralizationConnector,
    Discriminator,
}

impl StyleTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongEntity => "strong-entity",
            Self::WeakEntity => "weak-entity",
            Self::IdentifyingLine => "identifying-line",
            Self::NonIdentifyingLine => "non-identifying-line",
            Self::RelationshipLabel => "relationship-label",
            Self::CardinalityDot => "cardinality-dot",
            Self::CardinalityLabel => "cardinality-label",
            Self::NonIdentifyingOptional => "nonidentifying-optional",
            Self::GeneralizationCircle => "generalization-circle",
            Self::GeneralizationUnderline => "generalization-underline",
            Self::GeneralizationConnector => "generalization-connector",
            Self::Discriminator => "generalization-discriminator",
        }
    }
}

impl fmt::Display for StyleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Start,
    Middle,
    End,
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Middle => "middle",
            Self::End => "end",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Box(EntityBox),
    Path(Path),
    Text(Text),
    Circle(Circle),
    Line(Line),
    RectMarker(RectMarker),
}

/// Entity container. Rows are stacked text; their layout is up to the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityBox {
    pub rect: Rect,
    pub style: StyleTag,
    pub title: String,
    pub key_rows: Vec<String>,
    pub separator: bool,
    pub rows: Vec<String>,
}

impl EntityBox {
    pub fn new(rect: Rect, title: impl Into<String>) -> Self {
        Self {
            rect,
            style: StyleTag::StrongEntity,
            title: title.into(),
            key_rows: Vec::new(),
            separator: false,
            rows: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: StyleTag) -> Self {
        self.style = style;
        self
    }

    pub fn with_key_row(mut self, row: impl Into<String>) -> Self {
        self.key_rows.push(row.into());
        self
    }

    pub fn with_row(mut self, row: impl Into<String>) -> Self {
        self.rows.push(row.into());
        self
    }

    pub fn with_separator(mut self, separator: bool) -> Self {
        self.separator = separator;
        self
    }
}

/// Axis-aligned polyline.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub points: Vec<Point>,
    pub style: StyleTag,
}

impl Path {
    pub fn new(points: Vec<Point>, style: StyleTag) -> Self {
        Self { points, style }
    }

    /// SVG-style path data (`M x y H x V y ...`).
    ///
    /// Consecutive points share one coordinate, so every step is emitted as a
    /// horizontal or vertical move.
    pub fn to_path_data(&self) -> String {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return String::new();
        };
        let mut data = format!("M {} {}", first.x, first.y);
        let mut prev = *first;
        for p in points {
            if p.y == prev.y {
                data.push_str(&format!(" H {}", p.x));
            } else if p.x == prev.x {
                data.push_str(&format!(" V {}", p.y));
            } else {
                data.push_str(&format!(" L {} {}", p.x, p.y));
            }
            prev = *p;
        }
        data
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub at: Point,
    pub content: String,
    pub alignment: Alignment,
    pub style: StyleTag,
}

impl Text {
    pub fn new(at: Point, content: impl Into<String>, style: StyleTag) -> Self {
        Self {
            at,
            content: content.into(),
            alignment: Alignment::Start,
            style,
        }
    }

    pub fn aligned(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f32,
    pub style: StyleTag,
}

impl Circle {
    pub fn new(center: Point, radius: f32, style: StyleTag) -> Self {
        Self {
            center,
            radius,
            style,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub from: Point,
    pub to: Point,
    pub style: StyleTag,
}

impl Line {
    pub fn new(from: Point, to: Point, style: StyleTag) -> Self {
        Self { from, to, style }
    }
}

/// Square marker anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectMarker {
    pub at: Point,
    pub size: f32,
    pub style: StyleTag,
}

impl RectMarker {
    pub fn new(at: Point, size: f32, style: StyleTag) -> Self {
        Self { at, size, style }
    }
}

macro_rules! impl_from_primitive {
    ($($kind:ident),*) => {
        $(
            impl From<$kind> for Primitive {
                fn from(value: $kind) -> Self {
                    Primitive::$kind(value)
                }
            }
        )*
    };
}

impl_from_primitive!(Path, Text, Circle, Line, RectMarker);

impl From<EntityBox> for Primitive {
    fn from(value: EntityBox) -> Self {
        Primitive::Box(value)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Box(b) => {
                write!(f, "box {} {} {:?}", b.style, b.rect, b.title)?;
                for row in &b.key_rows {
                    write!(f, " +{row:?}")?;
                }
                if b.separator {
                    write!(f, " |")?;
                }
                for row in &b.rows {
                    write!(f, " {row:?}")?;
                }
                Ok(())
            }
            Self::Path(p) => write!(f, "path {} {}", p.style, p.to_path_data()),
            Self::Text(t) => write!(f, "text {} {} {} {:?}", t.style, t.alignment, t.at, t.content),
            Self::Circle(c) => write!(f, "circle {} {} r={}", c.style, c.center, c.radius),
            Self::Line(l) => write!(f, "line {} {} {}", l.style, l.from, l.to),
            Self::RectMarker(m) => write!(f, "rect-marker {} {} {}", m.style, m.at, m.size),
        }
    }
}
