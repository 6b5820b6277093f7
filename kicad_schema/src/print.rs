//! Printing a [`Node`] by walking its compiled schema.
//!
//! The attribute map is only ever looked up by name, never iterated for
//! output, so the result depends on the schema's field order alone.

use std::collections::BTreeMap;

use kicad_sexpr::{parse_fragment, Sexpr, SexprKind};
use tracing::trace;

use crate::compile::{CompiledField, CompiledRecord, FieldKind};
use crate::{Node, SchemaError, Value};

pub(crate) fn print_node(node: &Node) -> Result<Sexpr, SchemaError> {
    let node_type = node.node_type();
    let compiled = node_type.compiled()?;
    let tag = node_type.tag();

    for attr in node.attributes().keys() {
        if !compiled.index.contains_key(attr) {
            trace!(tag, attr = attr.as_str(), "ignoring unknown attribute");
        }
    }

    let mut items = vec![Sexpr::symbol(tag)];
    print_record(&compiled.record, tag, node.attributes(), &mut items)?;

    Ok(Sexpr::new(SexprKind::List(items)))
}

fn print_record(
    record: &CompiledRecord,
    tag: &str,
    attributes: &BTreeMap<String, Value>,
    out: &mut Vec<Sexpr>,
) -> Result<(), SchemaError> {
    for field in &record.positional {
        print_field(field, tag, attributes, out)?;
    }

    // Tagless fragments stay on the tag's line, before any nested list
    let (inline, tagged): (Vec<_>, Vec<_>) =
        record.named.iter().partition(|field| field.tag.is_none());

    for field in inline.into_iter().chain(tagged) {
        print_field(field, tag, attributes, out)?;
    }

    Ok(())
}

fn print_field(
    field: &CompiledField,
    tag: &str,
    attributes: &BTreeMap<String, Value>,
    out: &mut Vec<Sexpr>,
) -> Result<(), SchemaError> {
    if let FieldKind::Record(record) = &field.kind {
        let mut items = Vec::new();
        print_record(record, tag, attributes, &mut items)?;

        if !items.is_empty() || field.required {
            if let Some(record_tag) = &field.tag {
                items.insert(0, Sexpr::symbol(record_tag.as_str()));
            }
            out.push(Sexpr::new(SexprKind::List(items)));
        }

        return Ok(());
    }

    let Some(value) = attributes.get(&field.attr) else {
        if field.required {
            return Err(SchemaError::MissingAttribute {
                tag: tag.to_string(),
                attr: field.attr.clone(),
            });
        }

        return Ok(());
    };

    let occurrences = if field.multiple {
        occurrences(field, value)
    } else {
        vec![value]
    };

    for value in occurrences {
        print_occurrence(field, value, out)?;
    }

    Ok(())
}

fn print_occurrence(
    field: &CompiledField,
    value: &Value,
    out: &mut Vec<Sexpr>,
) -> Result<(), SchemaError> {
    match &field.kind {
        FieldKind::Node(_) => {
            if field.printer.is_some() {
                out.extend(render_atoms(field, value)?);
                return Ok(());
            }

            let Value::Node(node) = value else {
                return Err(unprintable(field, value));
            };

            out.push(print_node(node)?);
        }
        FieldKind::Pattern(_) => {
            // An absent flag prints nothing at all
            if field.is_flag() && *value == Value::Bool(false) {
                return Ok(());
            }

            let atoms = render_atoms(field, value)?;

            match &field.tag {
                Some(tag) => {
                    let mut items = vec![Sexpr::symbol(tag.as_str())];
                    items.extend(atoms);
                    out.push(Sexpr::new(SexprKind::List(items)));
                }
                None => out.extend(atoms),
            }
        }
        FieldKind::Record(_) => {}
    }

    Ok(())
}

/// The atoms of one occurrence, from the custom printer when there is one
fn render_atoms(field: &CompiledField, value: &Value) -> Result<Vec<Sexpr>, SchemaError> {
    if let Some(printer) = field.printer {
        let text = printer(value)?;

        return parse_fragment(&text).map_err(|e| SchemaError::MalformedPrinterOutput {
            attr: field.attr.clone(),
            reason: e.to_string(),
        });
    }

    match &field.kind {
        FieldKind::Pattern(pattern) => pattern
            .fit(value)
            .ok_or_else(|| unprintable(field, value)),
        _ => Err(unprintable(field, value)),
    }
}

fn unprintable(field: &CompiledField, value: &Value) -> SchemaError {
    SchemaError::UnprintableValue {
        attr: field.attr.clone(),
        value: format!("{value:?}"),
    }
}

/// Splits the value of a repeated field into its occurrences.
///
/// A value the field's pattern accepts as a whole is one occurrence, so
/// `(at 1 2)` stored as `[1, 2]` stays together even though each number
/// would fit `X [Y]` alone. Otherwise a list is several occurrences when each
/// of its elements could be printed as one (`[[1, 2], [3, 4]]` for two `xy`).
pub(crate) fn occurrences<'a>(field: &CompiledField, value: &'a Value) -> Vec<&'a Value> {
    let Value::List(items) = value else {
        return vec![value];
    };

    if let (FieldKind::Pattern(pattern), None) = (&field.kind, field.printer) {
        if !items.is_empty() && pattern.fit(value).is_some() {
            return vec![value];
        }
    }

    let fits_once = |item: &Value| match &field.kind {
        FieldKind::Node(_) if field.printer.is_none() => matches!(item, Value::Node(_)),
        FieldKind::Pattern(pattern) if field.printer.is_none() => pattern.fit(item).is_some(),
        // Custom printers decide for themselves what they accept
        _ => !matches!(item, Value::List(_)),
    };

    if !items.is_empty() && items.iter().all(fits_once) {
        items.iter().collect()
    } else if items.is_empty() {
        Vec::new()
    } else {
        vec![value]
    }
}
