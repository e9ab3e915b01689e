//! Domain model produced by the parser.
//!
//! Only an entity's `position` and `bounds` change after parsing; names,
//! keys and references are fixed for the lifetime of a model. Everything
//! that depends on keys (such as whether a relationship is identifying) is
//! derived on demand instead of being stored.

use std::collections::HashSet;

use crate::error::ConsistencyError;
use crate::geometry::{Point, Rect, Size};

#[derive(Debug, Clone, PartialEq)]
pub struct DomainModel {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
    pub generalizations: Vec<Generalization>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    pub weak: bool,
    pub primary_key: Vec<Attribute>,
    pub attributes: Vec<Attribute>,
    pub position: Option<Point>,
    /// Measured by the rendering surface, never invented here.
    pub bounds: Option<Size>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub attr_type: String,
    pub optional: bool,
    pub many: bool,
    pub fk_target: Option<FkTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FkTarget {
    pub entity: String,
    pub attribute: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub entity: String,
    pub attribute: String,
}

/// A foreign-key edge from the referencing attribute to the referenced one.
///
/// Cardinality lives on the source attribute and is looked up through
/// [`DomainModel::source_attribute`].
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub source: Endpoint,
    pub target: Endpoint,
    pub rel_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generalization {
    pub generic: String,
    pub categories: Vec<String>,
    pub complete: bool,
    pub discriminator: Option<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weak: true,
            primary_key: Vec::new(),
            attributes: Vec::new(),
            position: None,
            bounds: None,
        }
    }

    /// Looks an attribute up among key and non-key attributes alike.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.primary_key
            .iter()
            .chain(&self.attributes)
            .find(|a| a.name == name)
    }

    pub fn is_key(&self, name: &str) -> bool {
        self.primary_key.iter().any(|a| a.name == name)
    }

    /// The current rectangle, once the entity is both placed and measured.
    pub fn rect(&self) -> Option<Rect> {
        match (self.position, self.bounds) {
            (Some(position), Some(size)) => Some(Rect::from_parts(position, size)),
            _ => None,
        }
    }
}

impl Attribute {
    pub fn new(name: impl Into<String>, attr_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attr_type: attr_type.into(),
            optional: false,
            many: false,
            fk_target: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn many(mut self) -> Self {
        self.many = true;
        self
    }

    pub fn references(mut self, entity: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.fk_target = Some(FkTarget {
            entity: entity.into(),
            attribute: attribute.into(),
        });
        self
    }

    fn points_at(&self, target: &Endpoint) -> bool {
        self.fk_target
            .as_ref()
            .is_some_and(|fk| fk.entity == target.entity && fk.attribute == target.attribute)
    }
}

impl Relationship {
    /// Text drawn at the middle of the connector.
    pub fn label(&self) -> String {
        match &self.rel_name {
            Some(name) => name.clone(),
            None => format!("{} → {}", self.source.attribute, self.target.attribute),
        }
    }
}

impl DomainModel {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.name == name)
    }

    /// A relationship is identifying when the referencing attribute is part
    /// of its own entity's primary key and points at exactly the target.
    pub fn is_identifying(&self, rel: &Relationship) -> bool {
        self.entity(&rel.source.entity).is_some_and(|source| {
            source
                .primary_key
                .iter()
                .any(|pk| pk.name == rel.source.attribute && pk.points_at(&rel.target))
        })
    }

    pub fn source_attribute(&self, rel: &Relationship) -> Result<&Attribute, ConsistencyError> {
        self.resolve(&rel.source)
    }

    pub fn target_attribute(&self, rel: &Relationship) -> Result<&Attribute, ConsistencyError> {
        self.resolve(&rel.target)
    }

    fn resolve(&self, end: &Endpoint) -> Result<&Attribute, ConsistencyError> {
        let entity = self
            .entity(&end.entity)
            .ok_or_else(|| ConsistencyError::UnknownEntity {
                entity: end.entity.clone(),
            })?;
        entity
            .attribute(&end.attribute)
            .ok_or_else(|| ConsistencyError::UnknownAttribute {
                entity: end.entity.clone(),
                attribute: end.attribute.clone(),
            })
    }

    /// Checks the structural invariants for models assembled by hand.
    pub fn validate(&self) -> Result<(), ConsistencyError> {
        let mut seen = HashSet::new();
        for entity in &self.entities {
            if !seen.insert(entity.name.as_str()) {
                return Err(ConsistencyError::DuplicateEntity {
                    entity: entity.name.clone(),
                });
            }
        }

        for rel in &self.relationships {
            self.source_attribute(rel)?;
            self.target_attribute(rel)?;
        }

        for generalization in &self.generalizations {
            for name in std::iter::once(&generalization.generic).chain(&generalization.categories) {
                if !seen.contains(name.as_str()) {
                    return Err(ConsistencyError::UnknownEntity {
                        entity: name.clone(),
                    });
                }
            }
            if generalization.categories.contains(&generalization.generic) {
                return Err(ConsistencyError::SelfGeneralization {
                    entity: generalization.generic.clone(),
                });
            }
        }
        Ok(())
    }
}
