//! Full redraw of a model into draw primitives.
//!
//! Nothing is cached between calls: every redraw derives all geometry from
//! the current entity rectangles. Failures are isolated per entity,
//! relationship and generalization category, so one bad edge never hides
//! the rest of the diagram.

use std::fmt;

use log::{trace, warn};

use crate::draw::{Alignment, EntityBox, Path, Primitive, StyleTag, Text};
use crate::error::{ConsistencyError, DrawError, EdgeFailure, EdgeRef, GeometryError};
use crate::generalization::generalization_geometry;
use crate::geometry::Rect;
use crate::model::{Attribute, DomainModel, Entity, Generalization, Relationship};
use crate::route::{connection_point, route_orthogonal};
use crate::symbols::relationship_symbols;

/// Relationship labels sit this far above the route midpoint.
pub const LABEL_LIFT: f32 = 12.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Drawing {
    pub primitives: Vec<Primitive>,
    pub errors: Vec<DrawError>,
}

impl Drawing {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    fn fail(&mut self, edge: EdgeRef, failure: impl Into<EdgeFailure>) {
        let error = DrawError::new(edge, failure);
        warn!(error:% = error; "Skipping diagram element");
        self.errors.push(error);
    }
}

impl fmt::Display for Drawing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, primitive) in self.primitives.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{primitive}")?;
        }
        Ok(())
    }
}

/// Entity boxes first, then relationships, then generalization trees.
pub fn draw(model: &DomainModel) -> Drawing {
    let mut drawing = Drawing::default();

    for entity in &model.entities {
        match entity.rect() {
            Some(rect) => drawing.primitives.push(entity_box(entity, rect).into()),
            None => drawing.fail(
                EdgeRef::Entity {
                    name: entity.name.clone(),
                },
                GeometryError::MissingRect {
                    entity: entity.name.clone(),
                },
            ),
        }
    }

    for rel in &model.relationships {
        match draw_relationship(model, rel) {
            Ok(primitives) => {
                trace!(
                    source = rel.source.entity,
                    target = rel.target.entity,
                    primitives = primitives.len();
                    "Routed relationship"
                );
                drawing.primitives.extend(primitives);
            }
            Err(failure) => drawing.fail(
                EdgeRef::Relationship {
                    source: rel.source.entity.clone(),
                    attribute: rel.source.attribute.clone(),
                    target: rel.target.entity.clone(),
                },
                failure,
            ),
        }
    }

    for generalization in &model.generalizations {
        draw_generalization(model, generalization, &mut drawing);
    }

    drawing
}

pub fn key_row(attr: &Attribute) -> String {
    format!("{} : {}{}", attr.name, attr.attr_type, many_suffix(attr))
}

pub fn attribute_row(attr: &Attribute) -> String {
    let optional = if attr.optional { " (O)" } else { "" };
    format!("{}{optional}: {}{}", attr.name, attr.attr_type, many_suffix(attr))
}

fn many_suffix(attr: &Attribute) -> &'static str {
    if attr.many { "[]" } else { "" }
}

fn entity_box(entity: &Entity, rect: Rect) -> EntityBox {
    let style = if entity.weak {
        StyleTag::WeakEntity
    } else {
        StyleTag::StrongEntity
    };
    let mut entity_box = EntityBox::new(rect, entity.name.clone())
        .with_style(style)
        .with_separator(!entity.primary_key.is_empty() || !entity.attributes.is_empty());
    for attr in &entity.primary_key {
        entity_box = entity_box.with_key_row(key_row(attr));
    }
    for attr in &entity.attributes {
        entity_box = entity_box.with_row(attribute_row(attr));
    }
    entity_box
}

fn entity_rect(model: &DomainModel, name: &str) -> Result<Rect, EdgeFailure> {
    let entity = model
        .entity(name)
        .ok_or_else(|| ConsistencyError::UnknownEntity {
            entity: name.to_string(),
        })?;
    let rect = entity.rect().ok_or_else(|| GeometryError::MissingRect {
        entity: name.to_string(),
    })?;
    Ok(rect)
}

fn draw_relationship(model: &DomainModel, rel: &Relationship) -> Result<Vec<Primitive>, EdgeFailure> {
    let source = entity_rect(model, &rel.source.entity)?;
    let target = entity_rect(model, &rel.target.entity)?;
    let attr = model.source_attribute(rel)?;
    model.target_attribute(rel)?;
    let identifying = model.is_identifying(rel);

    let source_point = connection_point(source, target)?;
    let target_point = connection_point(target, source)?;
    let route = route_orthogonal(source_point, target_point)?;

    let style = if identifying {
        StyleTag::IdentifyingLine
    } else {
        StyleTag::NonIdentifyingLine
    };
    let mut primitives: Vec<Primitive> = vec![Path::new(route.points.to_vec(), style).into()];
    primitives.extend(relationship_symbols(
        target_point,
        source_point,
        attr.optional,
        attr.many,
        identifying,
    ));
    primitives.push(
        Text::new(
            route.midpoint.offset(0.0, -LABEL_LIFT),
            rel.label(),
            StyleTag::RelationshipLabel,
        )
        .aligned(Alignment::Middle)
        .into(),
    );
    Ok(primitives)
}

fn draw_generalization(model: &DomainModel, generalization: &Generalization, drawing: &mut Drawing) {
    let generic = match entity_rect(model, &generalization.generic) {
        Ok(rect) => rect,
        Err(failure) => {
            drawing.fail(
                EdgeRef::Generalization {
                    generic: generalization.generic.clone(),
                },
                failure,
            );
            return;
        }
    };

    let category_edge = |category: &str| EdgeRef::GeneralizationCategory {
        generic: generalization.generic.clone(),
        category: category.to_string(),
    };

    let mut placed = Vec::new();
    for category in &generalization.categories {
        match entity_rect(model, category) {
            Ok(rect) => placed.push((category.as_str(), rect)),
            Err(failure) => drawing.fail(category_edge(category.as_str()), failure),
        }
    }

    let rects: Vec<Rect> = placed.iter().map(|(_, rect)| *rect).collect();
    let plan = match generalization_geometry(
        generic,
        &rects,
        generalization.complete,
        generalization.discriminator.as_deref(),
    ) {
        Ok(plan) => plan,
        Err(failure) => {
            drawing.fail(
                EdgeRef::Generalization {
                    generic: generalization.generic.clone(),
                },
                failure,
            );
            return;
        }
    };

    drawing.primitives.extend(plan.primitives());
    for ((category, _), connector) in placed.iter().zip(&plan.connectors) {
        if let Err(failure) = connector {
            drawing.fail(category_edge(*category), failure.clone());
        }
    }
    trace!(generic = generalization.generic; "Drew generalization");
}
