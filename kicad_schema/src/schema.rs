//! Declarative schema representation.
//!
//! A node type is described by a [`Schema`], which is usually a [`Record`]: an
//! ordered list of positional [`Field`]s followed by a set of named fields
//! which may appear in any order.
//!
//! ```
//! use kicad_schema::{Field, NodeType, Pattern, Record};
//!
//! let net = NodeType::new(
//!     "net",
//!     Record::new()
//!         .positional(Field::positional("code", Pattern::Integer))
//!         .positional(Field::positional("name", Pattern::Text)),
//! );
//!
//! let node = net.parse("(net 1 GND)").unwrap();
//! assert_eq!(node.get("name").and_then(|v| v.as_text()), Some("GND"));
//! ```

use crate::{NodeType, Pattern, SchemaError, Value};

/// Renders the atoms of a field value as text. The engine reads the text back
/// with the S-Expression reader, so anything the reader accepts is allowed.
///
/// For leaves the output replaces the atoms after the tag. For node fields it
/// replaces the whole `(tag ...)` form.
pub type Printer = fn(&Value) -> Result<String, SchemaError>;

#[derive(Debug, Clone)]
pub enum Schema {
    /// A leaf holding the atoms matched by a pattern
    Pattern(Pattern),
    /// Another node type, parsed with its own compiled schema
    Node(NodeType),
    /// A group of fields. Its attributes surface directly on the enclosing
    /// node.
    Record(Record),
}

impl From<Pattern> for Schema {
    fn from(pattern: Pattern) -> Self {
        Schema::Pattern(pattern)
    }
}

impl From<NodeType> for Schema {
    fn from(node_type: NodeType) -> Self {
        Schema::Node(node_type)
    }
}

impl From<Record> for Schema {
    fn from(record: Record) -> Self {
        Schema::Record(record)
    }
}

/// One field of a record
#[derive(Debug, Clone)]
pub struct Field {
    pub schema: Schema,
    /// Attribute name on the node; defaults to the tag
    pub attr: Option<String>,
    /// The symbol heading the field's list, or `None` for a field whose
    /// atoms appear inline in the enclosing list (flags, positional atoms)
    pub tag: Option<String>,
    pub printer: Option<Printer>,
    /// Zero or more occurrences
    pub multiple: bool,
    /// `None` means the default: positional fields are required, named
    /// fields are optional
    pub optional: Option<bool>,
}

impl Field {
    pub fn new(schema: impl Into<Schema>) -> Self {
        Self {
            schema: schema.into(),
            attr: None,
            tag: None,
            printer: None,
            multiple: false,
            optional: None,
        }
    }

    /// `(tag atoms...)` stored under the attribute `tag`
    pub fn leaf(tag: impl Into<String>, pattern: Pattern) -> Self {
        Self::new(pattern).tag(tag)
    }

    /// Atoms inline in the enclosing list, stored under `attr`
    pub fn positional(attr: impl Into<String>, pattern: Pattern) -> Self {
        Self::new(pattern).attr(attr)
    }

    /// A bare keyword meaning `true` when present
    pub fn flag(keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        Self::new(Pattern::Flag(keyword.clone())).attr(keyword)
    }

    /// A nested node of another type, stored under `attr`
    pub fn node(attr: impl Into<String>, node_type: &NodeType) -> Self {
        Self::new(node_type.clone())
            .attr(attr)
            .tag(node_type.tag())
    }

    /// `(tag fields...)` whose fields surface on the enclosing node
    pub fn record(tag: impl Into<String>, record: Record) -> Self {
        Self::new(record).tag(tag)
    }

    pub fn attr(mut self, attr: impl Into<String>) -> Self {
        self.attr = Some(attr.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Drops the wrapping tag, keeping the attribute name it implied
    pub fn tagless(mut self) -> Self {
        self.attr = self.attr.take().or(self.tag.take());
        self.tag = None;
        self
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = Some(true);
        self
    }

    pub fn required(mut self) -> Self {
        self.optional = Some(false);
        self
    }

    pub fn printer(mut self, printer: Printer) -> Self {
        self.printer = Some(printer);
        self
    }

    /// The name the field's value is stored under
    pub fn attr_name(&self) -> Option<&str> {
        self.attr.as_deref().or(self.tag.as_deref())
    }
}

/// Positional fields in a fixed order, then named fields in any order
#[derive(Debug, Clone, Default)]
pub struct Record {
    pub positional: Vec<Field>,
    pub named: Vec<Field>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(mut self, field: Field) -> Self {
        self.positional.push(field);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.named.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.named.extend(fields);
        self
    }
}
