//! Error types for parsing, geometry and the command-line front end.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::geometry::Point;

/// Failure of a whole `parse` call. No partial model is ever returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("syntax error at line {line}, column {column}: {message} (found `{found}`)")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
        found: String,
    },

    #[error("reference error at line {line}: {message}")]
    Reference {
        line: usize,
        name: String,
        message: String,
    },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            Self::Syntax { line, .. } | Self::Reference { line, .. } => *line,
        }
    }
}

/// A coordinate computation that could not produce a drawable result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: both rectangles are centered at {at}")]
    Degenerate { at: Point },

    #[error("non-finite coordinate {point} while computing {context}")]
    NonFinite { context: String, point: Point },

    #[error("entity `{entity}` has no measured rectangle")]
    MissingRect { entity: String },
}

/// A relationship or generalization that names something the model lacks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsistencyError {
    #[error("entity `{entity}` does not exist")]
    UnknownEntity { entity: String },

    #[error("entity `{entity}` has no attribute `{attribute}`")]
    UnknownAttribute { entity: String, attribute: String },

    #[error("entity `{entity}` is declared more than once")]
    DuplicateEntity { entity: String },

    #[error("entity `{entity}` is listed as its own category")]
    SelfGeneralization { entity: String },
}

/// The diagram element whose geometry failed.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeRef {
    Entity {
        name: String,
    },
    Relationship {
        source: String,
        attribute: String,
        target: String,
    },
    Generalization {
        generic: String,
    },
    GeneralizationCategory {
        generic: String,
        category: String,
    },
}

impl fmt::Display for EdgeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity { name } => write!(f, "entity {name}"),
            Self::Relationship {
                source,
                attribute,
                target,
            } => write!(f, "relationship {source}.{attribute} -> {target}"),
            Self::Generalization { generic } => write!(f, "generalization of {generic}"),
            Self::GeneralizationCategory { generic, category } => {
                write!(f, "generalization {generic} -> {category}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EdgeFailure {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Consistency(#[from] ConsistencyError),
}

/// One isolated failure collected during a redraw.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{edge}: {failure}")]
pub struct DrawError {
    pub edge: EdgeRef,
    pub failure: EdgeFailure,
}

impl DrawError {
    pub fn new(edge: EdgeRef, failure: impl Into<EdgeFailure>) -> Self {
        Self {
            edge,
            failure: failure.into(),
        }
    }
}

/// Errors raised by a [`Session`](crate::session::Session) mutation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("entity `{0}` does not exist")]
    UnknownEntity(String),

    #[error("entity `{moving}` is already in motion")]
    AlreadyMoving { moving: String },

    #[error("no entity is in motion")]
    NotMoving,
}

/// Top-level error used by the binary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("missing configuration file: {}", .0.display())]
    MissingConfig(PathBuf),
}
