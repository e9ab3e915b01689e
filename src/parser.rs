use std::collections::{HashMap, HashSet};

use log::debug;
use winnow::ascii::multispace0;
use winnow::combinator::{alt, cut_err, delimited, eof, opt, peek, preceded, repeat};
use winnow::error::{AddContext, ContextError, ErrMode};
use winnow::prelude::*;
use winnow::stream::{LocatingSlice, Location, Stream};
use winnow::token::{take_till, take_while};

use crate::error::ParseError;
use crate::model::*;

/// What the parser expected when it gave up. Becomes the message of a
/// [`ParseError::Syntax`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Expected(&'static str);

type Input<'s> = LocatingSlice<&'s str>;
type PResult<O> = Result<O, ErrMode<ContextError<Expected>>>;

/// Parses DSL source into a [`DomainModel`].
///
/// The whole document is parsed before any reference is resolved, so blocks
/// may appear in any order. The first error aborts the parse.
pub fn parse(source: &str) -> Result<DomainModel, ParseError> {
    let mut input = LocatingSlice::new(source);
    let (entities, generalizations) =
        document(&mut input).map_err(|e| syntax_error(source, input.current_token_start(), e))?;

    let model = resolve(source, entities, generalizations)?;
    debug!(
        entities = model.entities.len(),
        relationships = model.relationships.len(),
        generalizations = model.generalizations.len();
        "Parsed model"
    );
    Ok(model)
}

struct EntityDecl<'s> {
    name: &'s str,
    offset: usize,
    attributes: Vec<AttrDecl<'s>>,
}

struct AttrDecl<'s> {
    offset: usize,
    key: bool,
    optional: bool,
    name: &'s str,
    attr_type: &'s str,
    many: bool,
    fk: Option<FkDecl<'s>>,
}

struct FkDecl<'s> {
    entity: &'s str,
    attribute: &'s str,
    label: Option<&'s str>,
}

struct GeneralizationDecl<'s> {
    generic: &'s str,
    offset: usize,
    categories: Vec<(&'s str, usize)>,
    complete: bool,
    discriminator: Option<&'s str>,
}

enum Block<'s> {
    Entity(EntityDecl<'s>),
    Generalization(GeneralizationDecl<'s>),
}

fn document<'s>(
    input: &mut Input<'s>,
) -> PResult<(Vec<EntityDecl<'s>>, Vec<GeneralizationDecl<'s>>)> {
    let blocks: Vec<Block<'s>> = repeat(0.., preceded(multispace0, block)).parse_next(input)?;
    multispace0.parse_next(input)?;
    cut_err(eof)
        .context(Expected("expected `Entity` or `Generalization`"))
        .parse_next(input)?;

    let mut entities = Vec::new();
    let mut generalizations = Vec::new();
    for block in blocks {
        match block {
            Block::Entity(decl) => entities.push(decl),
            Block::Generalization(decl) => generalizations.push(decl),
        }
    }
    Ok((entities, generalizations))
}

fn block<'s>(input: &mut Input<'s>) -> PResult<Block<'s>> {
    let offset = input.current_token_start();
    alt((
        preceded(
            keyword("Entity"),
            cut_err(|i: &mut Input<'s>| entity_body(i, offset)),
        )
        .map(Block::Entity),
        preceded(
            keyword("Generalization"),
            cut_err(|i: &mut Input<'s>| generalization_body(i, offset)),
        )
        .map(Block::Generalization),
    ))
    .parse_next(input)
}

fn entity_body<'s>(input: &mut Input<'s>, offset: usize) -> PResult<EntityDecl<'s>> {
    let name = preceded(multispace0, identifier)
        .context(Expected("expected entity name after `Entity`"))
        .parse_next(input)?;
    preceded(multispace0, '{')
        .context(Expected("expected `{` after entity name"))
        .parse_next(input)?;
    let attributes = repeat(0.., preceded(multispace0, attribute_line)).parse_next(input)?;
    preceded(multispace0, '}')
        .context(Expected("expected an attribute line or the closing `}`"))
        .parse_next(input)?;

    Ok(EntityDecl {
        name,
        offset,
        attributes,
    })
}

/// `["+"] ["?"] name ":" type ["[]"] [FK -> Entity.attr ["label"]]`
///
/// Backtracks only when the line does not start an attribute at all.
fn attribute_line<'s>(input: &mut Input<'s>) -> PResult<AttrDecl<'s>> {
    let offset = input.current_token_start();
    let key = opt('+').parse_next(input)?.is_some();
    multispace0.parse_next(input)?;
    let optional = opt('?').parse_next(input)?.is_some();
    multispace0.parse_next(input)?;
    let name = if key || optional {
        cut_err(identifier)
            .context(Expected("expected attribute name"))
            .parse_next(input)?
    } else {
        identifier.parse_next(input)?
    };

    cut_err(preceded(multispace0, ':'))
        .context(Expected("expected `:` after attribute name"))
        .parse_next(input)?;
    let attr_type = cut_err(preceded(multispace0, type_name))
        .context(Expected("expected attribute type"))
        .parse_next(input)?;
    let many = opt(many_marker).parse_next(input)?.is_some();
    let fk = opt(foreign_key).parse_next(input)?;
    if fk.is_none() {
        reject_dangling_label(input)?;
    }

    Ok(AttrDecl {
        offset,
        key,
        optional,
        name,
        attr_type,
        many,
        fk,
    })
}

/// Only commits once `FK` is followed by `->`, so an attribute named `FK` on
/// the next line is left alone.
fn foreign_key<'s>(input: &mut Input<'s>) -> PResult<FkDecl<'s>> {
    (multispace0, keyword("FK"), multispace0, "->").parse_next(input)?;
    let (entity, attribute) = cut_err(preceded(multispace0, fk_target))
        .context(Expected(
            "malformed foreign key, expected `FK -> Entity.attribute`",
        ))
        .parse_next(input)?;
    let label = opt(preceded(multispace0, quoted)).parse_next(input)?;
    Ok(FkDecl {
        entity,
        attribute,
        label,
    })
}

fn reject_dangling_label(input: &mut Input<'_>) -> PResult<()> {
    let start = input.checkpoint();
    if opt(preceded(multispace0, peek('"'))).parse_next(input)?.is_some() {
        return Err(ErrMode::Cut(ContextError::new().add_context(
            input,
            &start,
            Expected("a relationship label requires an `FK ->` reference"),
        )));
    }
    input.reset(&start);
    Ok(())
}

fn generalization_body<'s>(
    input: &mut Input<'s>,
    offset: usize,
) -> PResult<GeneralizationDecl<'s>> {
    let generic = preceded(multispace0, identifier)
        .context(Expected("expected generic entity name after `Generalization`"))
        .parse_next(input)?;
    preceded(multispace0, '{')
        .context(Expected("expected `{` after generic entity name"))
        .parse_next(input)?;
    let categories = repeat(
        0..,
        preceded(multispace0, identifier.with_span()).map(|(name, span)| (name, span.start)),
    )
    .parse_next(input)?;
    preceded(multispace0, '}')
        .context(Expected("expected a category name or the closing `}`"))
        .parse_next(input)?;

    let complete = opt(preceded(
        multispace0,
        alt((
            keyword("complete").value(true),
            keyword("incomplete").value(false),
        )),
    ))
    .parse_next(input)?
    .unwrap_or(false);

    let discriminator = opt(preceded(
        (multispace0, keyword("discriminator")),
        cut_err(preceded((multispace0, '=', multispace0), identifier))
            .context(Expected("expected `= name` after `discriminator`")),
    ))
    .parse_next(input)?;

    Ok(GeneralizationDecl {
        generic,
        offset,
        categories,
        complete,
        discriminator,
    })
}

fn keyword<'s>(word: &'static str) -> impl Parser<Input<'s>, &'s str, ErrMode<ContextError<Expected>>> {
    identifier.verify(move |w: &str| w == word)
}

fn identifier<'s>(input: &mut Input<'s>) -> PResult<&'s str> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_').parse_next(input)
}

fn type_name<'s>(input: &mut Input<'s>) -> PResult<&'s str> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, '{' | '}' | '[' | ']' | ':' | '"')
    })
    .parse_next(input)
}

fn many_marker<'s>(input: &mut Input<'s>) -> PResult<&'s str> {
    "[]".parse_next(input)
}

fn fk_target<'s>(input: &mut Input<'s>) -> PResult<(&'s str, &'s str)> {
    let entity = identifier.parse_next(input)?;
    '.'.parse_next(input)?;
    let attribute = identifier.parse_next(input)?;
    Ok((entity, attribute))
}

fn quoted<'s>(input: &mut Input<'s>) -> PResult<&'s str> {
    delimited(
        '"',
        take_till(0.., |c: char| c == '"' || c == '\n'),
        cut_err('"').context(Expected("unterminated relationship label")),
    )
    .map(str::trim)
    .parse_next(input)
}

fn syntax_error(source: &str, offset: usize, err: ErrMode<ContextError<Expected>>) -> ParseError {
    let message = match &err {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e.context().next().map(|Expected(m)| *m),
        ErrMode::Incomplete(_) => None,
    }
    .unwrap_or("unexpected input");

    let token: String = source[offset..]
        .split_whitespace()
        .next()
        .unwrap_or("")
        .chars()
        .take(40)
        .collect();
    let found = if token.is_empty() {
        "end of input".to_string()
    } else {
        token
    };

    let (line, column) = line_column(source, offset);
    ParseError::Syntax {
        line,
        column,
        message: message.to_string(),
        found,
    }
}

/// 1-based line and column (in chars) of a byte offset.
fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let consumed = &source[..offset];
    let line_start = consumed.rfind('\n').map_or(0, |i| i + 1);
    (
        consumed.matches('\n').count() + 1,
        consumed[line_start..].chars().count() + 1,
    )
}

fn reference_error(source: &str, offset: usize, name: &str, message: String) -> ParseError {
    ParseError::Reference {
        line: line_column(source, offset).0,
        name: name.to_string(),
        message,
    }
}

fn resolve(
    source: &str,
    entity_decls: Vec<EntityDecl<'_>>,
    generalization_decls: Vec<GeneralizationDecl<'_>>,
) -> Result<DomainModel, ParseError> {
    let mut declared: HashMap<&str, &EntityDecl<'_>> = HashMap::new();
    for decl in &entity_decls {
        if declared.insert(decl.name, decl).is_some() {
            return Err(reference_error(
                source,
                decl.offset,
                decl.name,
                format!("entity `{}` is declared more than once", decl.name),
            ));
        }
        let mut names = HashSet::new();
        for attr in &decl.attributes {
            if !names.insert(attr.name) {
                return Err(reference_error(
                    source,
                    attr.offset,
                    attr.name,
                    format!("attribute `{}` is declared twice in `{}`", attr.name, decl.name),
                ));
            }
        }
    }

    let mut relationships = Vec::new();
    for decl in &entity_decls {
        for attr in &decl.attributes {
            let Some(fk) = &attr.fk else { continue };
            let Some(target) = declared.get(fk.entity) else {
                return Err(reference_error(
                    source,
                    attr.offset,
                    fk.entity,
                    format!(
                        "foreign key `{}.{}` refers to undeclared entity `{}`",
                        decl.name, attr.name, fk.entity
                    ),
                ));
            };
            if !target.attributes.iter().any(|a| a.name == fk.attribute) {
                return Err(reference_error(
                    source,
                    attr.offset,
                    fk.attribute,
                    format!(
                        "foreign key `{}.{}` refers to undeclared attribute `{}.{}`",
                        decl.name, attr.name, fk.entity, fk.attribute
                    ),
                ));
            }
            relationships.push(Relationship {
                source: Endpoint {
                    entity: decl.name.to_string(),
                    attribute: attr.name.to_string(),
                },
                target: Endpoint {
                    entity: fk.entity.to_string(),
                    attribute: fk.attribute.to_string(),
                },
                rel_name: fk.label.map(str::to_string),
            });
        }
    }

    let mut generalizations = Vec::new();
    for decl in &generalization_decls {
        if !declared.contains_key(decl.generic) {
            return Err(reference_error(
                source,
                decl.offset,
                decl.generic,
                format!("generalization refers to undeclared entity `{}`", decl.generic),
            ));
        }
        let mut seen = HashSet::new();
        for &(category, offset) in &decl.categories {
            if !declared.contains_key(category) {
                return Err(reference_error(
                    source,
                    offset,
                    category,
                    format!("category `{category}` of `{}` is not a declared entity", decl.generic),
                ));
            }
            if category == decl.generic {
                return Err(reference_error(
                    source,
                    offset,
                    category,
                    format!("entity `{category}` cannot be a category of itself"),
                ));
            }
            if !seen.insert(category) {
                return Err(reference_error(
                    source,
                    offset,
                    category,
                    format!("category `{category}` is listed twice under `{}`", decl.generic),
                ));
            }
        }
        generalizations.push(Generalization {
            generic: decl.generic.to_string(),
            categories: decl.categories.iter().map(|(c, _)| c.to_string()).collect(),
            complete: decl.complete,
            discriminator: decl.discriminator.map(str::to_string),
        });
    }
    check_hierarchy_cycles(source, &generalization_decls)?;

    let entities = entity_decls.iter().map(build_entity).collect();

    Ok(DomainModel {
        entities,
        relationships,
        generalizations,
    })
}

fn build_entity(decl: &EntityDecl<'_>) -> Entity {
    let mut entity = Entity::new(decl.name);
    for attr in &decl.attributes {
        let built = Attribute {
            name: attr.name.to_string(),
            attr_type: attr.attr_type.to_string(),
            optional: attr.optional,
            many: attr.many,
            fk_target: attr.fk.as_ref().map(|fk| FkTarget {
                entity: fk.entity.to_string(),
                attribute: fk.attribute.to_string(),
            }),
        };
        if attr.key {
            entity.primary_key.push(built);
        } else {
            entity.attributes.push(built);
        }
    }
    entity.weak = entity.primary_key.is_empty();
    entity
}

/// Rejects generic/category chains that lead back to where they started.
fn check_hierarchy_cycles(source: &str, decls: &[GeneralizationDecl<'_>]) -> Result<(), ParseError> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for decl in decls {
        children
            .entry(decl.generic)
            .or_default()
            .extend(decl.categories.iter().map(|(c, _)| *c));
    }

    for decl in decls {
        let mut stack: Vec<&str> = decl.categories.iter().map(|(c, _)| *c).collect();
        let mut visited = HashSet::new();
        while let Some(node) = stack.pop() {
            if node == decl.generic {
                return Err(reference_error(
                    source,
                    decl.offset,
                    decl.generic,
                    format!("generalization hierarchy of `{}` is cyclic", decl.generic),
                ));
            }
            if visited.insert(node) {
                if let Some(next) = children.get(node) {
                    stack.extend(next.iter().copied());
                }
            }
        }
    }
    Ok(())
}
