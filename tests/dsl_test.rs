use erdraw::ParseError;
use erdraw::model::Endpoint;
use erdraw::parse;
use pretty_assertions::assert_eq;

const LIBRARY: &str = "
Entity Publisher {
    +id: number
    name: string
}

Entity Book {
    +ISBN: string
    title: string
    tags: string[]
    ?publisher_id: number FK -> Publisher.id \"published by\"
}

Entity Copy {
    +book: string FK -> Book.ISBN
    +no: number
    ?shelf: string
}

Entity Loan {
    book: string FK -> Copy.book
    copy_no: number FK -> Copy.no
}

Generalization Book {
    Novel
    Manual
} complete discriminator = Kind

Entity Novel { +ISBN: string }
Entity Manual { +ISBN: string }
";

#[test]
fn counts_match_source() {
    let model = parse(LIBRARY).unwrap();
    assert_eq!(model.entities.len(), LIBRARY.matches("Entity ").count());
    assert_eq!(model.relationships.len(), LIBRARY.matches("FK ->").count());
    assert_eq!(model.generalizations.len(), 1);

    let counts: Vec<(usize, usize)> = model
        .entities
        .iter()
        .map(|e| (e.primary_key.len(), e.attributes.len()))
        .collect();
    assert_eq!(counts, vec![(1, 1), (1, 3), (2, 1), (0, 2), (1, 0), (1, 0)]);
}

#[test]
fn attribute_flags_and_labels() {
    let model = parse(LIBRARY).unwrap();
    let book = model.entity("Book").unwrap();

    let tags = book.attribute("tags").unwrap();
    assert!(tags.many);
    assert_eq!(tags.attr_type, "string");

    let publisher = book.attribute("publisher_id").unwrap();
    assert!(publisher.optional);
    assert!(!publisher.many);

    assert_eq!(model.relationships[0].label(), "published by");
    assert_eq!(model.relationships[1].label(), "book → ISBN");
}

#[test]
fn weak_entities_have_no_key() {
    let model = parse(LIBRARY).unwrap();
    let weak: Vec<&str> = model
        .entities
        .iter()
        .filter(|e| e.weak)
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(weak, vec!["Loan"]);
}

#[test]
fn identifying_is_derived_from_keys() {
    let mut model = parse(LIBRARY).unwrap();
    let copy_to_book = model
        .relationships
        .iter()
        .find(|r| {
            r.source
                == Endpoint {
                    entity: "Copy".into(),
                    attribute: "book".into(),
                }
        })
        .cloned()
        .unwrap();
    assert!(model.is_identifying(&copy_to_book));

    let loan_rels: Vec<_> = model
        .relationships
        .iter()
        .filter(|r| r.source.entity == "Loan")
        .collect();
    assert!(loan_rels.iter().all(|r| !model.is_identifying(r)));

    // demote the key attribute; the stored relationship is untouched
    let copy = model.entity_mut("Copy").unwrap();
    let book = copy.primary_key.remove(0);
    copy.attributes.push(book);
    assert!(!model.is_identifying(&copy_to_book));
    assert!(model.relationships.contains(&copy_to_book));
}

#[test]
fn generalization_fields() {
    let model = parse(LIBRARY).unwrap();
    let generalization = &model.generalizations[0];
    assert_eq!(generalization.generic, "Book");
    assert_eq!(generalization.categories, vec!["Novel", "Manual"]);
    assert!(generalization.complete);
    assert_eq!(generalization.discriminator.as_deref(), Some("Kind"));
}

#[test]
fn duplicate_entity_is_reference_error() {
    let err = parse("Entity A { +id: number }\nEntity A { +id: number }").unwrap_err();
    assert!(matches!(&err, ParseError::Reference { name, line: 2, .. } if name == "A"));
}

#[test]
fn unknown_fk_target_is_reference_error() {
    let err = parse("Entity A {\n  b: number FK -> B.id\n}").unwrap_err();
    assert!(matches!(&err, ParseError::Reference { name, line: 2, .. } if name == "B"));

    let err = parse("Entity B { +id: number }\nEntity A { b: number FK -> B.key }").unwrap_err();
    assert!(matches!(&err, ParseError::Reference { name, .. } if name == "key"));
}

#[test]
fn generalization_cycles_are_rejected() {
    let source = "
        Entity A { } Entity B { } Entity C { }
        Generalization A { B }
        Generalization B { C }
        Generalization C { A }
    ";
    assert!(matches!(parse(source), Err(ParseError::Reference { .. })));

    let own_category = "Entity A { } Generalization A { A }";
    assert!(matches!(parse(own_category), Err(ParseError::Reference { .. })));
}

#[test]
fn syntax_errors_point_at_the_token() {
    let err = parse("Entity A {\n  +id number\n}").unwrap_err();
    assert_eq!(
        err,
        ParseError::Syntax {
            line: 2,
            column: 7,
            message: "expected `:` after attribute name".into(),
            found: "number".into(),
        }
    );

    let err = parse("Entity A {\n  +id: number").unwrap_err();
    assert!(matches!(err, ParseError::Syntax { ref found, .. } if found == "end of input"));
}

#[test]
fn blocks_may_reference_later_blocks() {
    let model = parse("Entity A { b: number FK -> B.id }\nEntity B { +id: number }").unwrap();
    assert_eq!(model.relationships.len(), 1);
}

#[test]
fn attribute_named_fk_follows_plain_attribute() {
    let model = parse("Entity A {\n  +id: number\n  note: string\n  FK: string\n}\n").unwrap();
    let a = model.entity("A").unwrap();
    assert_eq!(a.attribute("FK").unwrap().attr_type, "string");
    assert_eq!(a.attributes.len(), 2);
    assert!(model.relationships.is_empty());
}

mod generated_sources {
    use erdraw::parse;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    struct Attr {
        optional: bool,
        many: bool,
        fk: Option<usize>,
        label: bool,
    }

    fn attr_strategy() -> impl Strategy<Value = Attr> {
        (any::<bool>(), any::<bool>(), proptest::option::of(0usize..64), any::<bool>()).prop_map(
            |(optional, many, fk, label)| Attr {
                optional,
                many,
                fk,
                label,
            },
        )
    }

    fn gap() -> impl Strategy<Value = String> {
        prop_oneof![Just(" "), Just("\n"), Just("\n    "), Just("\t"), Just(" \n\n ")].prop_map(str::to_string)
    }

    /// Entities `E0..En`, each keyed by `id`, with attributes that may point
    /// at any entity's `id`.
    fn source_strategy() -> impl Strategy<Value = (String, Vec<usize>, usize)> {
        prop::collection::vec(prop::collection::vec(attr_strategy(), 0..6), 1..8)
            .prop_flat_map(|entities| {
                let gaps = prop::collection::vec(gap(), entities.iter().map(|a| a.len() + 2).sum::<usize>());
                (Just(entities), gaps)
            })
            .prop_map(|(entities, gaps)| {
                let n = entities.len();
                let mut gaps = gaps.into_iter();
                let mut source = String::new();
                let mut fks = 0;
                for (i, attrs) in entities.iter().enumerate() {
                    source.push_str(&format!("Entity E{i} {{{}+id: number", gaps.next().unwrap_or_default()));
                    for (j, attr) in attrs.iter().enumerate() {
                        source.push_str(&gaps.next().unwrap_or_default());
                        if attr.optional {
                            source.push('?');
                        }
                        source.push_str(&format!("a{j}: number"));
                        if attr.many {
                            source.push_str("[]");
                        }
                        if let Some(k) = attr.fk {
                            source.push_str(&format!(" FK -> E{}.id", k % n));
                            if attr.label {
                                source.push_str(" \"refers to\"");
                            }
                            fks += 1;
                        }
                    }
                    source.push_str(&gaps.next().unwrap_or_default());
                    source.push_str("}\n");
                }
                let attribute_counts = entities.iter().map(Vec::len).collect();
                (source, attribute_counts, fks)
            })
    }

    proptest! {
        #[test]
        fn counts_match_generated_source((source, attribute_counts, fks) in source_strategy()) {
            let model = parse(&source).unwrap();
            prop_assert_eq!(model.entities.len(), attribute_counts.len());
            prop_assert_eq!(model.relationships.len(), fks);
            for (entity, count) in model.entities.iter().zip(&attribute_counts) {
                prop_assert_eq!(entity.primary_key.len(), 1);
                prop_assert_eq!(entity.attributes.len(), *count);
            }
        }
    }
}
