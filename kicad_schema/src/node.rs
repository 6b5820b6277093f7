use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use kicad_sexpr::Sexpr;
use once_cell::sync::OnceCell;
use tracing::trace;

use crate::compile::{compile, Compiled};
use crate::{parse, print, Error, Schema, SchemaError, Value};

/// A kind of node: a tag, its schema and the compiled form of that schema.
///
/// Cloning is cheap and clones share the compiled schema, which is built the
/// first time it is needed. Format crates keep their node types in statics:
///
/// ```
/// use kicad_schema::{Field, NodeType, Pattern, Record};
/// use once_cell::sync::Lazy;
///
/// static OFFSET: Lazy<NodeType> = Lazy::new(|| {
///     NodeType::new(
///         "drill",
///         Record::new().field(Field::leaf("offset", Pattern::numbers(2))),
///     )
/// });
///
/// let drill = OFFSET.parse("(drill (offset 0.1 0.2))").unwrap();
/// assert_eq!(drill.get("offset").and_then(|v| v.to_numbers()), Some(vec![0.1, 0.2]));
/// ```
#[derive(Clone)]
pub struct NodeType {
    inner: Arc<NodeTypeInner>,
}

struct NodeTypeInner {
    tag: String,
    schema: Schema,
    compiled: OnceCell<Compiled>,
}

impl NodeType {
    /// Declares a node type. The schema is checked when it is first used.
    pub fn new(tag: impl Into<String>, schema: impl Into<Schema>) -> Self {
        Self {
            inner: Arc::new(NodeTypeInner {
                tag: tag.into(),
                schema: schema.into(),
                compiled: OnceCell::new(),
            }),
        }
    }

    /// Declares a node type and compiles its schema straight away, for
    /// grammars defined at runtime.
    pub fn from_schema(
        tag: impl Into<String>,
        schema: impl Into<Schema>,
    ) -> Result<Self, SchemaError> {
        let node_type = Self::new(tag, schema);
        node_type.compiled()?;
        Ok(node_type)
    }

    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    pub(crate) fn compiled(&self) -> Result<&Compiled, SchemaError> {
        self.inner
            .compiled
            .get_or_try_init(|| compile(&self.inner.tag, &self.inner.schema))
    }

    /// Parses a whole document, which must be one list of this type.
    pub fn parse(&self, input: &str) -> Result<Node, Error> {
        trace!(tag = self.tag(), len = input.len(), "parsing document");

        let sexpr = kicad_sexpr::from_str(input)?;
        self.parse_sexpr(&sexpr)
    }

    /// Parses an already read tree
    pub fn parse_sexpr(&self, sexpr: &Sexpr) -> Result<Node, Error> {
        parse::parse_node(self, sexpr)
    }

    /// The tags of the nested records which hold the field for `attr`, or
    /// `None` when the schema has no such attribute.
    pub fn resolve(&self, attr: &str) -> Result<Option<&[String]>, SchemaError> {
        Ok(self.compiled()?.index.get(attr).map(Vec::as_slice))
    }

    /// Whether two handles refer to the same declaration
    pub fn same_as(&self, other: &NodeType) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Debug for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeType({})", self.tag())
    }
}

/// A parsed or constructed node: its type and a map of attribute values.
///
/// Two nodes are equal when their attribute maps are equal, counting an
/// absent flag as an unset one.
#[derive(Clone)]
pub struct Node {
    node_type: NodeType,
    attributes: BTreeMap<String, Value>,
}

impl Node {
    pub fn new(node_type: &NodeType) -> Self {
        Self {
            node_type: node_type.clone(),
            attributes: BTreeMap::new(),
        }
    }

    pub(crate) fn from_parts(node_type: NodeType, attributes: BTreeMap<String, Value>) -> Self {
        Self {
            node_type,
            attributes,
        }
    }

    pub fn node_type(&self) -> &NodeType {
        &self.node_type
    }

    pub fn tag(&self) -> &str {
        self.node_type.tag()
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// The value of an attribute; absent attributes are `None`
    pub fn get(&self, attr: &str) -> Option<&Value> {
        self.attributes.get(attr)
    }

    pub fn get_mut(&mut self, attr: &str) -> Option<&mut Value> {
        self.attributes.get_mut(attr)
    }

    pub fn set(&mut self, attr: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(attr.into(), value.into());
    }

    /// Sets the attribute when there is a value, removes it otherwise
    pub fn set_opt(&mut self, attr: impl Into<String>, value: Option<impl Into<Value>>) {
        let attr = attr.into();

        match value {
            Some(value) => {
                self.attributes.insert(attr, value.into());
            }
            None => {
                self.attributes.remove(&attr);
            }
        }
    }

    pub fn with(mut self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(attr, value);
        self
    }

    pub fn remove(&mut self, attr: &str) -> Option<Value> {
        self.attributes.remove(attr)
    }

    /// The occurrences of a repeated field, split the same way the printer
    /// splits them. A field that occurred once yields one element.
    pub fn occurrences(&self, attr: &str) -> Result<Vec<&Value>, SchemaError> {
        let Some(value) = self.attributes.get(attr) else {
            return Ok(Vec::new());
        };

        let compiled = self.node_type.compiled()?;

        let field = compiled
            .index
            .get(attr)
            .and_then(|path| compiled.record.field(path, attr));

        Ok(match field {
            Some(field) if field.multiple => print::occurrences(field, value),
            _ => vec![value],
        })
    }

    pub fn to_sexpr(&self) -> Result<Sexpr, SchemaError> {
        print::print_node(self)
    }

    /// The canonical text of the node
    pub fn serialize(&self) -> Result<String, SchemaError> {
        let sexpr = self.to_sexpr()?;
        trace!(tag = self.tag(), "printed node");
        Ok(kicad_sexpr::to_string(&sexpr))
    }

    /// The attributes which say something: a flag set to `false` reads the
    /// same as a flag left out.
    fn significant_attributes<'a>(
        &'a self,
        flags: &'a [String],
    ) -> impl Iterator<Item = (&'a String, &'a Value)> + 'a {
        self.attributes.iter().filter(move |(attr, value)| {
            !(**value == Value::Bool(false) && flags.contains(*attr))
        })
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let flags = self
            .node_type
            .compiled()
            .map(|compiled| compiled.flags.as_slice())
            .unwrap_or_default();

        self.significant_attributes(flags)
            .eq(other.significant_attributes(flags))
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({} ", self.tag())?;
        f.debug_map().entries(self.attributes.iter()).finish()?;
        write!(f, ")")
    }
}
