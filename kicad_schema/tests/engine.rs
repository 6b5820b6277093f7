use kicad_schema::*;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;

static DRILL: Lazy<NodeType> = Lazy::new(|| {
    NodeType::new(
        "drill",
        Record::new()
            .positional(
                Field::positional(
                    "size",
                    Pattern::alt([
                        Pattern::Number,
                        Pattern::seq([Pattern::keyword("oval"), Pattern::Number, Pattern::Number]),
                    ]),
                )
                .optional(),
            )
            .field(Field::leaf("offset", Pattern::numbers(2))),
    )
});

#[track_caller]
fn parse(node_type: &NodeType, input: &str) -> Node {
    node_type
        .parse(input)
        .unwrap_or_else(|e| panic!("Failed to parse `{input}`: {e}"))
}

/// Printing then reparsing gives the same node, and printing is stable
#[track_caller]
fn assert_round_trip(node: &Node) {
    let printed = node.serialize().unwrap();
    let reparsed = parse(node.node_type(), &printed);

    assert_eq!(&reparsed, node, "printed as:\n{printed}");
    assert_eq!(reparsed.serialize().unwrap(), printed);
}

fn number(node: &Node, attr: &str) -> f64 {
    node.get(attr).and_then(Value::as_number).unwrap()
}

#[test]
fn test_unicode() {
    let sexpr = NodeType::from_schema("sexpr", Pattern::Text).unwrap();

    let node = parse(&sexpr, "(sexpr ü)");
    assert_eq!(node.get("sexpr"), Some(&Value::from("ü")));
    assert_round_trip(&node);
}

#[test]
fn test_simple_leaf_tag() {
    let sexpr = NodeType::from_schema("sexpr", Pattern::Number).unwrap();

    let node = parse(&sexpr, "(sexpr 1)");
    assert_eq!(number(&node, "sexpr"), 1.0);
    assert_eq!(node.serialize().unwrap(), "(sexpr 1.0000000000)");
    assert_round_trip(&node);
}

#[test]
fn test_composite_leaf_tag() {
    let sexpr = NodeType::from_schema("sexpr", Pattern::numbers(2)).unwrap();

    let node = parse(&sexpr, "(sexpr 1 2)");
    assert_eq!(node.get("sexpr"), Some(&Value::from([1.0, 2.0])));
    assert_round_trip(&node);
}

#[test]
fn test_nested_tags() {
    let sexpr = NodeType::from_schema(
        "sexpr",
        Record::new().field(Field::leaf("sexpr", Pattern::Number)),
    )
    .unwrap();

    let node = parse(&sexpr, "(sexpr (sexpr 1))");
    assert_eq!(number(&node, "sexpr"), 1.0);
    assert_round_trip(&node);

    let node = parse(&sexpr, "(sexpr)");
    assert_eq!(node.get("sexpr"), None);
    assert_eq!(node.serialize().unwrap(), "(sexpr)");
}

#[test]
fn test_multiple_nested_tags_in_any_order() {
    let sexpr = NodeType::from_schema(
        "sexpr",
        Record::new()
            .field(Field::leaf("zero", Pattern::Number))
            .field(Field::leaf("one", Pattern::Number)),
    )
    .unwrap();

    let node = parse(&sexpr, "(sexpr (zero 0) (one 1))");
    assert_eq!(number(&node, "zero"), 0.0);
    assert_eq!(number(&node, "one"), 1.0);
    assert_eq!(node, parse(&sexpr, "(sexpr (one 1) (zero 0))"));
    assert_round_trip(&node);
}

#[test]
fn test_named_positionals() {
    let sexpr = NodeType::from_schema(
        "sexpr",
        Record::new()
            .positional(Field::positional("zero", Pattern::Number))
            .positional(Field::positional("one", Pattern::Number)),
    )
    .unwrap();

    let node = parse(&sexpr, "(sexpr 0 1)");
    assert_eq!(number(&node, "zero"), 0.0);
    assert_eq!(number(&node, "one"), 1.0);
    assert_round_trip(&node);

    let error = sexpr.parse("(sexpr 0)").unwrap_err();
    assert_eq!(
        error,
        Error::Syntax(SyntaxError::new(
            SyntaxErrorKind::MissingField { attr: "one".into() },
            Position::new(1, 1),
        ))
    );
}

#[test]
fn test_optional_tag() {
    let sexpr = NodeType::from_schema(
        "sexpr",
        Record::new()
            .positional(Field::positional("zero", Pattern::Number))
            .field(Field::leaf("sexpr", Pattern::Number)),
    )
    .unwrap();

    let node = parse(&sexpr, "(sexpr 1)");
    assert_eq!(number(&node, "zero"), 1.0);
    assert_eq!(node.get("sexpr"), None);

    let node = parse(&sexpr, "(sexpr 1 (sexpr 2))");
    assert_eq!(number(&node, "zero"), 1.0);
    assert_eq!(number(&node, "sexpr"), 2.0);
    assert_round_trip(&node);
}

#[test]
fn test_drill_sizes() {
    let drill = parse(&DRILL, "(drill 0.8)");
    assert_eq!(number(&drill, "size"), 0.8);
    assert_round_trip(&drill);

    let drill = parse(&DRILL, "(drill oval 0.6 0.8)");
    assert_eq!(drill.get("size"), Some(&Value::from([0.6, 0.8])));
    assert_eq!(
        drill.serialize().unwrap(),
        "(drill oval 0.6000000000 0.8000000000)"
    );
    assert_round_trip(&drill);

    let drill = parse(&DRILL, "(drill 0.8 (offset 0.1 0.2))");
    assert_eq!(number(&drill, "size"), 0.8);
    assert_eq!(drill.get("offset"), Some(&Value::from([0.1, 0.2])));
    assert_eq!(
        drill.serialize().unwrap(),
        "(drill 0.8000000000\n    (offset 0.1000000000 0.2000000000))"
    );
    assert_round_trip(&drill);

    let drill = parse(&DRILL, "(drill (offset 0.1 0.2))");
    assert_eq!(drill.get("size"), None);
    assert_round_trip(&drill);
}

#[test]
fn test_typed_node_field() {
    let pad = NodeType::from_schema(
        "pad",
        Record::new().field(Field::node("drill", &DRILL)),
    )
    .unwrap();

    let node = parse(&pad, "(pad (drill 0.8))");
    let drill = node.get("drill").and_then(Value::as_node).unwrap();

    assert_eq!(drill.tag(), "drill");
    assert_eq!(number(drill, "size"), 0.8);
    assert_round_trip(&node);
}

#[test]
fn test_multiple_promotes_on_second_occurrence() {
    let sexpr = NodeType::from_schema(
        "sexpr",
        Record::new().field(Field::node("drills", &DRILL).multiple()),
    )
    .unwrap();

    let node = parse(&sexpr, "(sexpr (drill 0.8) (drill 0.6))");
    let drills = node.get("drills").unwrap();

    assert_eq!(number(drills.get(0).and_then(Value::as_node).unwrap(), "size"), 0.8);
    assert_eq!(number(drills.get(1).and_then(Value::as_node).unwrap(), "size"), 0.6);
    assert_eq!(node.occurrences("drills").unwrap().len(), 2);
    assert_round_trip(&node);

    // A single occurrence stays a scalar
    let node = parse(&sexpr, "(sexpr (drill 0.8))");
    let drill = node.get("drills").and_then(Value::as_node).unwrap();

    assert_eq!(number(drill, "size"), 0.8);
    assert_eq!(node.occurrences("drills").unwrap().len(), 1);
    assert_round_trip(&node);
}

#[test]
fn test_multiple_interleaved_with_singular() {
    let sexpr = NodeType::from_schema(
        "sexpr",
        Record::new()
            .field(Field::node("drills", &DRILL).multiple())
            .field(Field::leaf("pad", Pattern::Number)),
    )
    .unwrap();

    let node = parse(&sexpr, "(sexpr (drill 1) (pad 1) (drill 2) (drill 3))");
    assert_eq!(number(&node, "pad"), 1.0);

    let sizes = node
        .occurrences("drills")
        .unwrap()
        .into_iter()
        .map(|d| number(d.as_node().unwrap(), "size"))
        .collect::<Vec<_>>();
    assert_eq!(sizes, vec![1.0, 2.0, 3.0]);

    // Declaration order decides the printed order
    assert_eq!(
        node.serialize().unwrap(),
        "(sexpr\n    (drill 1.0000000000)\n    (drill 2.0000000000)\n    (drill 3.0000000000)\n    (pad 1.0000000000))"
    );
    assert_round_trip(&node);
}

#[test]
fn test_repeated_composite_leaf_is_a_list_of_lists() {
    let pts = NodeType::from_schema(
        "pts",
        Record::new().field(Field::leaf("xy", Pattern::numbers(2)).multiple()),
    )
    .unwrap();

    let node = parse(&pts, "(pts (xy 1 2) (xy 3 4) (xy 5 6))");
    assert_eq!(
        node.get("xy"),
        Some(&Value::from(vec![
            Value::from([1.0, 2.0]),
            Value::from([3.0, 4.0]),
            Value::from([5.0, 6.0]),
        ]))
    );
    assert_round_trip(&node);

    let node = parse(&pts, "(pts (xy 1 2))");
    assert_eq!(node.get("xy"), Some(&Value::from([1.0, 2.0])));
    assert_eq!(node.occurrences("xy").unwrap(), vec![&Value::from([1.0, 2.0])]);
    assert_round_trip(&node);
}

#[test]
fn test_multiple_leaf_with_optional_tail() {
    let sexpr = NodeType::from_schema(
        "sexpr",
        Record::new().field(
            Field::leaf("at", Pattern::seq([Pattern::Number, Pattern::optional(Pattern::Number)]))
                .multiple(),
        ),
    )
    .unwrap();

    let node = parse(&sexpr, "(sexpr (at 1 2))");
    assert_eq!(node.get("at"), Some(&Value::from([1.0, 2.0])));
    assert_eq!(node.occurrences("at").unwrap().len(), 1);
    assert_eq!(
        node.serialize().unwrap(),
        "(sexpr\n    (at 1.0000000000 2.0000000000))"
    );
    assert_round_trip(&node);

    let node = parse(&sexpr, "(sexpr (at 1 2) (at 3))");
    assert_eq!(
        node.occurrences("at").unwrap(),
        vec![&Value::from([1.0, 2.0]), &Value::Number(3.0)]
    );
    assert_round_trip(&node);
}

#[test]
fn test_multiple_leaf_with_alternative() {
    let sexpr = NodeType::from_schema(
        "sexpr",
        Record::new().field(
            Field::leaf(
                "size",
                Pattern::alt([
                    Pattern::Number,
                    Pattern::seq([Pattern::keyword("oval"), Pattern::Number, Pattern::Number]),
                ]),
            )
            .multiple(),
        ),
    )
    .unwrap();

    let node = parse(&sexpr, "(sexpr (size oval 0.6 0.8))");
    assert_eq!(node.occurrences("size").unwrap().len(), 1);
    assert_eq!(
        node.serialize().unwrap(),
        "(sexpr\n    (size oval 0.6000000000 0.8000000000))"
    );
    assert_round_trip(&node);

    let node = parse(&sexpr, "(sexpr (size 1) (size oval 0.6 0.8))");
    assert_eq!(
        node.occurrences("size").unwrap(),
        vec![&Value::Number(1.0), &Value::from([0.6, 0.8])]
    );
    assert_round_trip(&node);
}

#[test]
fn test_positional_order_is_load_bearing() {
    let sexpr = NodeType::from_schema(
        "sexpr",
        Record::new()
            .positional(Field::leaf("start", Pattern::numbers(2)))
            .positional(Field::leaf("end", Pattern::numbers(2))),
    )
    .unwrap();

    let node = parse(&sexpr, "(sexpr (start 1 1) (end 2 2))");
    assert_eq!(node.get("start"), Some(&Value::from([1.0, 1.0])));
    assert_eq!(node.get("end"), Some(&Value::from([2.0, 2.0])));
    assert_round_trip(&node);

    let error = sexpr.parse("(sexpr (end 2 2) (start 1 1))").unwrap_err();
    assert_eq!(
        error,
        Error::Syntax(SyntaxError::new(
            SyntaxErrorKind::InvalidToken {
                expected: "(start ...)".into(),
                found: "(end ...)".into(),
            },
            Position::new(1, 8),
        ))
    );
}

#[test]
fn test_tag_and_attr() {
    let sexpr = NodeType::from_schema(
        "sexpr",
        Record::new().positional(Field::leaf("sexpr2", Pattern::Number).attr("attr")),
    )
    .unwrap();

    let node = parse(&sexpr, "(sexpr (sexpr2 1))");
    assert_eq!(number(&node, "attr"), 1.0);
    assert_eq!(node.get("sexpr2"), None);
    assert_round_trip(&node);
}

#[test]
fn test_positional_node() {
    let sexpr = NodeType::from_schema(
        "sexpr",
        Record::new().positional(Field::node("drill", &DRILL)),
    )
    .unwrap();

    let node = parse(&sexpr, "(sexpr (drill 0.8))");
    assert_eq!(number(node.get("drill").and_then(Value::as_node).unwrap(), "size"), 0.8);
    assert_round_trip(&node);

    assert!(sexpr.parse("(sexpr)").is_err());
}

#[test]
fn test_positional_multiple_node() {
    let sexpr = NodeType::from_schema(
        "sexpr",
        Record::new().positional(Field::node("drills", &DRILL).multiple()),
    )
    .unwrap();

    let node = parse(&sexpr, "(sexpr (drill 0.6) (drill 0.8))");
    assert_eq!(node.occurrences("drills").unwrap().len(), 2);
    assert_round_trip(&node);

    let node = parse(&sexpr, "(sexpr)");
    assert_eq!(node.get("drills"), None);
}

#[test]
fn test_flags() {
    let text = NodeType::from_schema(
        "fp_text",
        Record::new()
            .positional(Field::positional("text", Pattern::Text))
            .field(Field::leaf("layer", Pattern::Text))
            .field(Field::flag("hide")),
    )
    .unwrap();

    let hidden = parse(&text, "(fp_text REF** (layer F.SilkS) hide)");
    assert_eq!(hidden.get("hide"), Some(&Value::Bool(true)));
    assert_eq!(
        hidden.serialize().unwrap(),
        "(fp_text REF** hide\n    (layer F.SilkS))"
    );
    assert_round_trip(&hidden);

    let shown = parse(&text, "(fp_text REF** (layer F.SilkS))");
    assert_eq!(shown.get("hide"), Some(&Value::Bool(false)));
    assert_eq!(shown.serialize().unwrap(), "(fp_text REF**\n    (layer F.SilkS))");
    assert_round_trip(&shown);
}

#[test]
fn test_records_are_transparent() {
    let text = NodeType::from_schema(
        "fp_text",
        Record::new()
            .positional(Field::positional("text", Pattern::Text))
            .field(Field::record(
                "effects",
                Record::new()
                    .field(Field::record(
                        "font",
                        Record::new()
                            .field(Field::leaf("size", Pattern::numbers(2)))
                            .field(Field::flag("italic")),
                    ))
                    .field(Field::leaf("justify", Pattern::one_of(["left", "right"]))),
            )),
    )
    .unwrap();

    let node = parse(
        &text,
        "(fp_text \"two words\" (effects (font (size 1 1) italic) (justify left)))",
    );

    assert_eq!(node.get("text"), Some(&Value::from("two words")));
    assert_eq!(node.get("size"), Some(&Value::from([1.0, 1.0])));
    assert_eq!(node.get("italic"), Some(&Value::Bool(true)));
    assert_eq!(node.get("justify"), Some(&Value::from("left")));
    assert_eq!(
        text.resolve("italic").unwrap(),
        Some(&["effects".to_string(), "font".to_string()][..])
    );
    assert_round_trip(&node);

    // Nothing inside the record, so the record is left out
    let bare = Node::new(&text).with("text", "x");
    assert_eq!(bare.serialize().unwrap(), "(fp_text x)");
}

#[test]
fn test_shared_tag_first_match_wins() {
    let title_block = NodeType::from_schema(
        "title_block",
        Record::new()
            .field(Field::leaf("comment", Pattern::seq([Pattern::keyword("1"), Pattern::Text])).attr("comment1"))
            .field(Field::leaf("comment", Pattern::seq([Pattern::keyword("2"), Pattern::Text])).attr("comment2")),
    )
    .unwrap();

    let node = parse(&title_block, "(title_block (comment 2 second) (comment 1 first))");
    assert_eq!(node.get("comment1"), Some(&Value::from("first")));
    assert_eq!(node.get("comment2"), Some(&Value::from("second")));
    assert_eq!(
        node.serialize().unwrap(),
        "(title_block\n    (comment 1 first)\n    (comment 2 second))"
    );

    let error = title_block.parse("(title_block (comment 3 third))").unwrap_err();
    assert!(matches!(
        error,
        Error::Syntax(SyntaxError {
            kind: SyntaxErrorKind::InvalidToken { .. },
            ..
        })
    ));
}

#[test]
fn test_unexpected_element() {
    let error = DRILL.parse("(drill 0.8 (size 1))").unwrap_err();

    assert_eq!(
        error,
        Error::Syntax(SyntaxError::new(
            SyntaxErrorKind::UnexpectedElement {
                found: "(size ...)".into(),
            },
            Position::new(1, 12),
        ))
    );

    // A singular field may only occur once
    assert!(DRILL.parse("(drill (offset 1 1) (offset 2 2))").is_err());
}

#[test]
fn test_malformed_input() {
    assert!(matches!(
        DRILL.parse("(drill 0.8"),
        Err(Error::Syntax(SyntaxError {
            kind: SyntaxErrorKind::Tree(_),
            ..
        }))
    ));

    assert_eq!(
        DRILL.parse("(pad 0.8)").unwrap_err(),
        Error::Syntax(SyntaxError::new(
            SyntaxErrorKind::NonMatchingTag {
                expected: "drill".into(),
                found: "(pad ...)".into(),
            },
            Position::new(1, 1),
        ))
    );

    assert_eq!(
        DRILL.parse("(drill (offset 0.1 x))").unwrap_err(),
        Error::Syntax(SyntaxError::new(
            SyntaxErrorKind::InvalidToken {
                expected: "number number".into(),
                found: "x".into(),
            },
            Position::new(1, 20),
        ))
    );
}

#[test]
fn test_required_named_field() {
    let net_class = NodeType::from_schema(
        "net_class",
        Record::new()
            .positional(Field::positional("name", Pattern::Text))
            .field(Field::leaf("clearance", Pattern::Number).required()),
    )
    .unwrap();

    assert_eq!(
        net_class.parse("(net_class Default)").unwrap_err(),
        Error::Syntax(SyntaxError::new(
            SyntaxErrorKind::MissingField {
                attr: "clearance".into(),
            },
            Position::new(1, 1),
        ))
    );

    let node = Node::new(&net_class).with("clearance", 0.2);
    assert_eq!(
        node.serialize().unwrap_err(),
        SchemaError::MissingAttribute {
            tag: "net_class".into(),
            attr: "name".into(),
        }
    );
}

#[test]
fn test_duplicate_attribute_is_rejected() {
    let error = NodeType::from_schema(
        "sexpr",
        Record::new()
            .field(Field::leaf("layer", Pattern::Text))
            .field(Field::record(
                "effects",
                Record::new().field(Field::leaf("layer", Pattern::Text)),
            )),
    )
    .unwrap_err();

    assert_eq!(
        error,
        SchemaError::DuplicateAttribute {
            tag: "sexpr".into(),
            attr: "layer".into(),
        }
    );
}

#[test]
fn test_unprintable_value() {
    let node = Node::new(&DRILL).with("size", "big");

    assert!(matches!(
        node.serialize(),
        Err(SchemaError::UnprintableValue { attr, .. }) if attr == "size"
    ));
}

fn format_size(value: &Value) -> Result<String, SchemaError> {
    match value.to_numbers().as_deref() {
        Some([w, h]) => Ok(format!("oval {w} {h}")),
        Some([d]) => Ok(format!("{d}")),
        _ => Err(SchemaError::UnprintableValue {
            attr: "size".into(),
            value: format!("{value:?}"),
        }),
    }
}

fn broken_printer(_: &Value) -> Result<String, SchemaError> {
    Ok("(unbalanced".into())
}

#[test]
fn test_custom_printer() {
    let size = Pattern::alt([
        Pattern::Number,
        Pattern::seq([Pattern::keyword("oval"), Pattern::Number, Pattern::Number]),
    ]);

    let drill = NodeType::from_schema(
        "drill",
        Record::new().positional(Field::positional("size", size.clone()).printer(format_size)),
    )
    .unwrap();

    let node = Node::new(&drill).with("size", [0.6, 0.8]);
    assert_eq!(node.serialize().unwrap(), "(drill oval 0.6 0.8)");
    assert_round_trip(&node);

    let broken = NodeType::from_schema(
        "drill",
        Record::new().positional(Field::positional("size", size).printer(broken_printer)),
    )
    .unwrap();

    assert!(matches!(
        Node::new(&broken).with("size", 1.0).serialize(),
        Err(SchemaError::MalformedPrinterOutput { .. })
    ));
}

#[test]
fn test_printing_ignores_insertion_order() {
    let pad = NodeType::from_schema(
        "pad",
        Record::new()
            .positional(Field::positional("name", Pattern::Text))
            .positional(Field::positional("type", Pattern::one_of(["smd", "thru_hole"])))
            .field(Field::leaf("at", Pattern::numbers(2)))
            .field(Field::leaf("size", Pattern::numbers(2)))
            .field(Field::leaf("layers", Pattern::many(Pattern::Text)))
            .field(Field::node("drill", &DRILL))
            .field(Field::flag("locked")),
    )
    .unwrap();

    let mut attributes = vec![
        ("name", Value::from("1")),
        ("type", Value::from("thru_hole")),
        ("at", Value::from([0.1, 0.1])),
        ("size", Value::from([0.2, 0.2])),
        ("layers", Value::from(["*.Cu", "*.Mask"])),
        ("drill", Value::from(Node::new(&DRILL).with("size", 0.8))),
        ("locked", Value::from(true)),
    ];

    let expected = {
        let mut node = Node::new(&pad);
        for (attr, value) in &attributes {
            node.set(*attr, value.clone());
        }
        node.serialize().unwrap()
    };

    let mut rng = rand::thread_rng();

    for _ in 0..20 {
        attributes.shuffle(&mut rng);

        let mut node = Node::new(&pad);
        for (attr, value) in &attributes {
            node.set(*attr, value.clone());
        }

        assert_eq!(node.serialize().unwrap(), expected);
    }

    // Hand-built nodes print idempotently
    let reparsed = parse(&pad, &expected);
    assert_eq!(reparsed.serialize().unwrap(), expected);
}

#[test]
fn test_unknown_attributes_are_not_printed() {
    let node = Node::new(&DRILL).with("size", 0.8).with("colour", "red");
    assert_eq!(node.serialize().unwrap(), "(drill 0.8000000000)");
}

#[test]
fn test_booleans_and_integers() {
    let general = NodeType::from_schema(
        "general",
        Record::new()
            .field(Field::leaf("links", Pattern::Integer))
            .field(Field::leaf("locked", Pattern::YesNo))
            .field(Field::leaf("visible", Pattern::TrueFalse))
            .field(Field::leaf("tstamp", Pattern::Hex)),
    )
    .unwrap();

    let node = parse(&general, "(general (links 12) (locked no) (visible true) (tstamp 5A3B9F0C))");

    assert_eq!(node.get("links"), Some(&Value::Int(12)));
    assert_eq!(node.get("locked"), Some(&Value::Bool(false)));
    assert_eq!(node.get("visible"), Some(&Value::Bool(true)));
    assert_eq!(node.get("tstamp"), Some(&Value::from("5A3B9F0C")));
    assert_eq!(
        node.serialize().unwrap(),
        "(general\n    (links 12)\n    (locked no)\n    (visible true)\n    (tstamp 5A3B9F0C))"
    );
    assert_round_trip(&node);
}

#[test]
fn test_concurrent_first_use() {
    let shared = NodeType::new(
        "net",
        Record::new()
            .positional(Field::positional("code", Pattern::Integer))
            .positional(Field::positional("name", Pattern::Text)),
    );

    let handles = (0..8)
        .map(|i| {
            let net = shared.clone();
            std::thread::spawn(move || net.parse(&format!("(net {i} N{i})")).unwrap())
        })
        .collect::<Vec<_>>();

    for (i, handle) in handles.into_iter().enumerate() {
        let node = handle.join().unwrap();
        assert_eq!(node.get("code"), Some(&Value::Int(i as i64)));
    }
}
