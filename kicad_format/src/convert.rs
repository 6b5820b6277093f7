//! Conversion between the generic [`Node`]s of the schema engine and the
//! typed elements of this crate.

use kicad_schema::{Node, NodeType, Value};

use crate::KiCadParseError;

/// A typed element backed by a node type.
///
/// ```
/// use kicad_format::{common::Net, convert::Element};
///
/// let net = Net::parse("(net 1 GND)").unwrap();
/// assert_eq!(net, Net::new(1, "GND"));
/// assert_eq!(net.serialize().unwrap(), "(net 1 GND)");
/// ```
pub trait Element: Sized {
    /// The node type this element is declared as
    fn node_type() -> &'static NodeType;

    fn from_node(node: &Node) -> Result<Self, KiCadParseError>;

    fn to_node(&self) -> Node;

    /// Parses a document consisting of exactly one element
    fn parse(input: &str) -> Result<Self, KiCadParseError> {
        let node = Self::node_type().parse(input)?;
        Self::from_node(&node)
    }

    /// The canonical text of the element
    fn serialize(&self) -> Result<String, KiCadParseError> {
        Ok(self.to_node().serialize()?)
    }
}

/// Conversion from an attribute value. `None` means the value has the wrong
/// shape.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_number()
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Number(*self)
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_int()
    }
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_text().map(str::to_string)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

/// A list, or a scalar read as a list of one
impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_slice().iter().map(T::from_value).collect()
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

fn unexpected<T>(node: &Node, attr: &str, value: &Value) -> KiCadParseError {
    KiCadParseError::UnexpectedValue {
        attr: format!("{}.{attr}", node.tag()),
        expected: std::any::type_name::<T>(),
        found: format!("{value:?}"),
    }
}

fn element_from_value<E: Element>(
    node: &Node,
    attr: &str,
    value: &Value,
) -> Result<E, KiCadParseError> {
    match value.as_node() {
        Some(inner) => E::from_node(inner),
        None => Err(unexpected::<E>(node, attr, value)),
    }
}

/// Typed access to the attributes of a parsed node
#[derive(Debug, Clone, Copy)]
pub struct NodeReader<'a> {
    node: &'a Node,
}

impl<'a> NodeReader<'a> {
    /// Fails unless the node was declared with the given tag
    pub fn new(node: &'a Node, expected: &NodeType) -> Result<Self, KiCadParseError> {
        if node.tag() != expected.tag() {
            return Err(KiCadParseError::NonMatchingNode {
                expected: expected.tag().to_string(),
                found: node.tag().to_string(),
            });
        }

        Ok(Self { node })
    }

    pub fn expect<T: FromValue>(&self, attr: &str) -> Result<T, KiCadParseError> {
        self.maybe(attr)?
            .ok_or_else(|| KiCadParseError::MissingAttribute {
                tag: self.node.tag().to_string(),
                attr: attr.to_string(),
            })
    }

    pub fn maybe<T: FromValue>(&self, attr: &str) -> Result<Option<T>, KiCadParseError> {
        self.node
            .get(attr)
            .map(|value| T::from_value(value).ok_or_else(|| unexpected::<T>(self.node, attr, value)))
            .transpose()
    }

    /// Flags are stored as `false` when absent, but nodes built by hand may
    /// leave them out entirely
    pub fn flag(&self, attr: &str) -> bool {
        self.node
            .get(attr)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Every occurrence of a repeated field
    pub fn many<T: FromValue>(&self, attr: &str) -> Result<Vec<T>, KiCadParseError> {
        self.node
            .occurrences(attr)?
            .into_iter()
            .map(|value| T::from_value(value).ok_or_else(|| unexpected::<T>(self.node, attr, value)))
            .collect()
    }

    pub fn expect_element<E: Element>(&self, attr: &str) -> Result<E, KiCadParseError> {
        self.maybe_element(attr)?
            .ok_or_else(|| KiCadParseError::MissingAttribute {
                tag: self.node.tag().to_string(),
                attr: attr.to_string(),
            })
    }

    pub fn maybe_element<E: Element>(&self, attr: &str) -> Result<Option<E>, KiCadParseError> {
        self.node
            .get(attr)
            .map(|value| element_from_value(self.node, attr, value))
            .transpose()
    }

    pub fn many_elements<E: Element>(&self, attr: &str) -> Result<Vec<E>, KiCadParseError> {
        self.node
            .occurrences(attr)?
            .into_iter()
            .map(|value| element_from_value(self.node, attr, value))
            .collect()
    }
}

/// Builds a node attribute by attribute
#[derive(Debug, Clone)]
pub struct NodeBuilder {
    node: Node,
}

impl NodeBuilder {
    pub fn new(node_type: &NodeType) -> Self {
        Self {
            node: Node::new(node_type),
        }
    }

    pub fn set(mut self, attr: &str, value: &impl ToValue) -> Self {
        self.node.set(attr, value.to_value());
        self
    }

    pub fn set_opt<T: ToValue>(mut self, attr: &str, value: Option<&T>) -> Self {
        self.node.set_opt(attr, value.map(ToValue::to_value));
        self
    }

    pub fn flag(mut self, attr: &str, value: bool) -> Self {
        self.node.set(attr, value);
        self
    }

    /// Sets a repeated field; nothing is stored for no occurrences
    pub fn many<T: ToValue>(mut self, attr: &str, values: &[T]) -> Self {
        let values = values.iter().map(ToValue::to_value).collect();
        self.node.set_opt(attr, collapse(values));
        self
    }

    pub fn element<E: Element>(mut self, attr: &str, element: &E) -> Self {
        self.node.set(attr, element.to_node());
        self
    }

    pub fn maybe_element<E: Element>(mut self, attr: &str, element: Option<&E>) -> Self {
        self.node.set_opt(attr, element.map(Element::to_node));
        self
    }

    pub fn many_elements<E: Element>(mut self, attr: &str, elements: &[E]) -> Self {
        let values = elements
            .iter()
            .map(|e| Value::from(e.to_node()))
            .collect();
        self.node.set_opt(attr, collapse(values));
        self
    }

    pub fn finish(self) -> Node {
        self.node
    }
}

/// Stores repeated values the way the parser does: one occurrence as is,
/// several as a list
fn collapse(mut values: Vec<Value>) -> Option<Value> {
    match values.len() {
        0 => None,
        1 => values.pop(),
        _ => Some(Value::List(values)),
    }
}
