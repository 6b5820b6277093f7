//! Parsing a [`Sexpr`] tree with a compiled schema.

use std::collections::{BTreeMap, HashSet};

use kicad_sexpr::{Position, Sexpr};
use tracing::trace;

use crate::compile::{CompiledField, CompiledRecord, FieldKind};
use crate::pattern::is_atom;
use crate::{Error, Node, NodeType, Pattern, SyntaxError, SyntaxErrorKind, Value};

/// Parses one `(tag ...)` list as a node of the given type
pub(crate) fn parse_node(node_type: &NodeType, sexpr: &Sexpr) -> Result<Node, Error> {
    let compiled = node_type.compiled()?;
    let tag = node_type.tag();

    let Some(list) = sexpr.as_list() else {
        return Err(syntax_error(
            SyntaxErrorKind::ExpectedList {
                found: sexpr.describe(),
            },
            sexpr.position(),
        ));
    };

    match list.first().and_then(Sexpr::as_symbol) {
        Some(head) if head == tag => {}
        _ => {
            return Err(syntax_error(
                SyntaxErrorKind::NonMatchingTag {
                    expected: tag.to_string(),
                    found: sexpr.describe(),
                },
                sexpr.position(),
            ))
        }
    }

    trace!(tag, position = %sexpr.position(), "parsing node");

    let mut attributes = Attributes::default();
    parse_record(&compiled.record, &list[1..], sexpr.position(), &mut attributes)?;

    let mut attributes = attributes.values;

    for flag in &compiled.flags {
        attributes
            .entry(flag.clone())
            .or_insert(Value::Bool(false));
    }

    Ok(Node::from_parts(node_type.clone(), attributes))
}

fn syntax_error(kind: SyntaxErrorKind, position: Position) -> Error {
    Error::Syntax(SyntaxError::new(kind, position))
}

/// Collects parsed values. The first occurrence of an attribute is stored as
/// is; a second one promotes it to a list which later occurrences extend.
#[derive(Debug, Default)]
struct Attributes {
    values: BTreeMap<String, Value>,
    promoted: HashSet<String>,
}

impl Attributes {
    fn push(&mut self, attr: &str, value: Value) {
        let Some(existing) = self.values.get_mut(attr) else {
            self.values.insert(attr.to_string(), value);
            return;
        };

        if self.promoted.contains(attr) {
            if let Value::List(items) = existing {
                items.push(value);
            }
        } else {
            let first = std::mem::replace(existing, Value::List(Vec::new()));
            *existing = Value::List(vec![first, value]);
            self.promoted.insert(attr.to_string());
        }
    }

    fn merge(&mut self, other: Attributes) {
        for (attr, value) in other.values {
            if other.promoted.contains(&attr) {
                self.promoted.insert(attr.clone());
            }
            self.values.insert(attr, value);
        }
    }
}

/// The outcome of trying one field on the element at the cursor
enum Attempt {
    /// The field matched; parsing continues at this index
    Matched(usize),
    /// The element is not one of this field's
    Skipped,
    /// The element carries the field's tag but its contents are wrong
    Failed(Error),
}

fn parse_record(
    record: &CompiledRecord,
    elements: &[Sexpr],
    position: Position,
    attributes: &mut Attributes,
) -> Result<(), Error> {
    let mut cursor = 0;

    // Positional fields, strictly in order
    for field in &record.positional {
        loop {
            match try_field(field, elements, cursor, attributes) {
                Attempt::Matched(next) => {
                    cursor = next;

                    if field.multiple {
                        continue;
                    }
                }
                Attempt::Failed(error) => return Err(error),
                Attempt::Skipped if field.required && !field.multiple => {
                    return Err(missing_positional(field, elements.get(cursor), position));
                }
                Attempt::Skipped => {}
            }

            break;
        }
    }

    // Named fields, in any order
    let mut seen = vec![false; record.named.len()];

    while let Some(element) = elements.get(cursor) {
        let mut failure = None;
        let mut matched = false;

        for &i in &record.match_order {
            let field = &record.named[i];

            if seen[i] && !field.multiple {
                continue;
            }

            match try_field(field, elements, cursor, attributes) {
                Attempt::Matched(next) => {
                    cursor = next;
                    seen[i] = true;
                    matched = true;
                    break;
                }
                Attempt::Failed(error) => {
                    failure.get_or_insert(error);
                }
                Attempt::Skipped => {}
            }
        }

        if !matched {
            return Err(failure.unwrap_or_else(|| {
                syntax_error(
                    SyntaxErrorKind::UnexpectedElement {
                        found: element.describe(),
                    },
                    element.position(),
                )
            }));
        }
    }

    for (field, seen) in record.named.iter().zip(seen) {
        if field.required && !seen {
            return Err(syntax_error(
                SyntaxErrorKind::MissingField {
                    attr: field.attr.clone(),
                },
                position,
            ));
        }
    }

    Ok(())
}

fn missing_positional(field: &CompiledField, found: Option<&Sexpr>, position: Position) -> Error {
    match found {
        Some(element) => syntax_error(
            SyntaxErrorKind::InvalidToken {
                expected: field.describe(),
                found: element.describe(),
            },
            element.position(),
        ),
        None => syntax_error(
            SyntaxErrorKind::MissingField {
                attr: field.attr.clone(),
            },
            position,
        ),
    }
}

fn try_field(
    field: &CompiledField,
    elements: &[Sexpr],
    cursor: usize,
    attributes: &mut Attributes,
) -> Attempt {
    let Some(element) = elements.get(cursor) else {
        return Attempt::Skipped;
    };

    let Some(tag) = &field.tag else {
        // Tagless fields consume atoms inline
        let FieldKind::Pattern(pattern) = &field.kind else {
            return Attempt::Skipped;
        };

        let atoms = inline_atoms(elements, cursor);

        return match pattern
            .matches(atoms, 0)
            .into_iter()
            .find(|m| m.next > 0)
        {
            Some(m) => {
                let next = cursor + m.next;
                attributes.push(&field.attr, m.into_value());
                Attempt::Matched(next)
            }
            None => Attempt::Skipped,
        };
    };

    let Some(list) = element.as_list() else {
        return Attempt::Skipped;
    };

    if list.first().and_then(Sexpr::as_symbol) != Some(tag) {
        return Attempt::Skipped;
    }

    let result = match &field.kind {
        FieldKind::Pattern(pattern) => parse_leaf(pattern, element, &list[1..]),
        FieldKind::Node(node_type) => {
            parse_node(node_type, element).map(|node| Value::Node(Box::new(node)))
        }
        FieldKind::Record(record) => {
            let mut inner = Attributes::default();

            match parse_record(record, &list[1..], element.position(), &mut inner) {
                Ok(()) => {
                    attributes.merge(inner);
                    return Attempt::Matched(cursor + 1);
                }
                Err(error) => return Attempt::Failed(error),
            }
        }
    };

    match result {
        Ok(value) => {
            attributes.push(&field.attr, value);
            Attempt::Matched(cursor + 1)
        }
        Err(error) => Attempt::Failed(error),
    }
}

/// The run of atoms starting at the cursor, up to the next list
fn inline_atoms(elements: &[Sexpr], cursor: usize) -> &[Sexpr] {
    let rest = &elements[cursor..];
    let end = rest.iter().position(|e| !is_atom(e)).unwrap_or(rest.len());
    &rest[..end]
}

/// The atoms after a tag, which must match the pattern completely
fn parse_leaf(pattern: &Pattern, list: &Sexpr, atoms: &[Sexpr]) -> Result<Value, Error> {
    pattern
        .matches(atoms, 0)
        .into_iter()
        .find(|m| m.next == atoms.len())
        .map(|m| m.into_value())
        .ok_or_else(|| {
            // Point at the first atom nothing could get past
            let furthest = pattern.reach(atoms, 0);

            let (found, position) = match atoms.get(furthest) {
                Some(atom) => (atom.describe(), atom.position()),
                None => ("end of list".to_string(), list.position()),
            };

            syntax_error(
                SyntaxErrorKind::InvalidToken {
                    expected: pattern.to_string(),
                    found,
                },
                position,
            )
        })
}
