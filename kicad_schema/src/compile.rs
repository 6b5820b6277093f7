//! Turns a declared [`Schema`] into the form the parser and printer walk.
//!
//! Compilation happens once per node type. It validates the declaration,
//! splits named fields into singular and repeated ones (repeated fields are
//! only tried after every singular field has had its chance at an element)
//! and indexes every attribute of the flattened record view.

use std::collections::HashMap;

use tracing::debug;

use crate::{Field, NodeType, Pattern, Printer, Record, Schema, SchemaError};

#[derive(Debug)]
pub(crate) struct Compiled {
    pub record: CompiledRecord,
    /// Attribute name to the tags of the records leading to its field
    pub index: HashMap<String, Vec<String>>,
    /// Every flag in the flattened view, defaulted to `false` after parsing
    pub flags: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct CompiledRecord {
    pub positional: Vec<CompiledField>,
    /// In declaration order
    pub named: Vec<CompiledField>,
    /// Indices into `named`, singular fields first
    pub match_order: Vec<usize>,
}

#[derive(Debug)]
pub(crate) struct CompiledField {
    pub attr: String,
    pub tag: Option<String>,
    pub kind: FieldKind,
    pub printer: Option<Printer>,
    pub multiple: bool,
    pub required: bool,
}

#[derive(Debug)]
pub(crate) enum FieldKind {
    Pattern(Pattern),
    Node(NodeType),
    Record(CompiledRecord),
}

impl CompiledField {
    pub fn is_flag(&self) -> bool {
        self.tag.is_none() && matches!(&self.kind, FieldKind::Pattern(p) if p.is_flag())
    }

    /// How the field looks in the input, for error messages
    pub fn describe(&self) -> String {
        match (&self.tag, &self.kind) {
            (Some(tag), _) => format!("({tag} ...)"),
            (None, FieldKind::Pattern(pattern)) => pattern.to_string(),
            (None, _) => self.attr.clone(),
        }
    }
}

impl CompiledRecord {
    /// Looks a field up by attribute name, following a path of record tags
    pub fn field(&self, path: &[String], attr: &str) -> Option<&CompiledField> {
        let mut fields = self.positional.iter().chain(&self.named);

        match path.split_first() {
            None => {
                fields.find(|f| f.attr == attr && !matches!(f.kind, FieldKind::Record(_)))
            }
            Some((tag, rest)) => fields
                .find_map(|f| match &f.kind {
                    FieldKind::Record(record) if f.tag.as_ref() == Some(tag) => {
                        Some(record)
                    }
                    _ => None,
                })?
                .field(rest, attr),
        }
    }
}

pub(crate) fn compile(tag: &str, schema: &Schema) -> Result<Compiled, SchemaError> {
    let root = match schema {
        Schema::Record(record) => record.clone(),
        Schema::Pattern(pattern) => {
            Record::new().positional(Field::positional(tag, pattern.clone()))
        }
        Schema::Node(node_type) => {
            Record::new().positional(Field::node(node_type.tag(), node_type))
        }
    };

    let mut compiler = Compiler {
        tag,
        index: HashMap::new(),
        flags: Vec::new(),
    };

    let record = compiler.compile_record(&root, &mut Vec::new())?;

    debug!(
        tag,
        attributes = compiler.index.len(),
        flags = compiler.flags.len(),
        "compiled schema"
    );

    Ok(Compiled {
        record,
        index: compiler.index,
        flags: compiler.flags,
    })
}

struct Compiler<'a> {
    /// Tag of the node type being compiled
    tag: &'a str,
    index: HashMap<String, Vec<String>>,
    flags: Vec<String>,
}

impl Compiler<'_> {
    fn compile_record(
        &mut self,
        record: &Record,
        path: &mut Vec<String>,
    ) -> Result<CompiledRecord, SchemaError> {
        let positional = record
            .positional
            .iter()
            .enumerate()
            .map(|(index, field)| self.compile_field(field, index, true, path))
            .collect::<Result<Vec<_>, _>>()?;

        let named = record
            .named
            .iter()
            .enumerate()
            .map(|(index, field)| {
                self.compile_field(field, record.positional.len() + index, false, path)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (singular, multiple): (Vec<usize>, Vec<usize>) =
            (0..named.len()).partition(|&i| !named[i].multiple);

        Ok(CompiledRecord {
            positional,
            named,
            match_order: singular.into_iter().chain(multiple).collect(),
        })
    }

    fn compile_field(
        &mut self,
        field: &Field,
        index: usize,
        positional: bool,
        path: &mut Vec<String>,
    ) -> Result<CompiledField, SchemaError> {
        let Some(attr) = field.attr_name().map(str::to_string) else {
            return Err(SchemaError::UnnamedField {
                tag: self.tag.to_string(),
                index,
            });
        };

        let kind = match &field.schema {
            Schema::Pattern(pattern) => {
                if pattern.has_empty_alternative() {
                    return Err(SchemaError::EmptyAlternative {
                        tag: self.tag.to_string(),
                    });
                }

                FieldKind::Pattern(pattern.clone())
            }
            Schema::Node(node_type) => {
                // A nested node is only recognised by its tag
                if field.tag.is_none() {
                    return Err(SchemaError::TaglessNode {
                        tag: self.tag.to_string(),
                        attr,
                    });
                }

                FieldKind::Node(node_type.clone())
            }
            Schema::Record(record) => {
                let Some(tag) = field.tag.clone().filter(|_| !field.multiple) else {
                    return Err(SchemaError::InvalidRecord {
                        tag: self.tag.to_string(),
                        record: attr,
                    });
                };

                path.push(tag);
                let compiled = self.compile_record(record, path)?;
                path.pop();

                FieldKind::Record(compiled)
            }
        };

        let compiled = CompiledField {
            attr,
            tag: field.tag.clone(),
            kind,
            printer: field.printer,
            multiple: field.multiple,
            required: !field.optional.unwrap_or(!positional),
        };

        // Records are transparent, only their fields carry attributes
        if !matches!(compiled.kind, FieldKind::Record(_)) {
            if self.index.contains_key(&compiled.attr) {
                return Err(SchemaError::DuplicateAttribute {
                    tag: self.tag.to_string(),
                    attr: compiled.attr,
                });
            }

            self.index.insert(compiled.attr.clone(), path.clone());

            if compiled.is_flag() && !compiled.multiple {
                self.flags.push(compiled.attr.clone());
            }
        }

        Ok(compiled)
    }
}
