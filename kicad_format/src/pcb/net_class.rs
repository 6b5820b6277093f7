use kicad_schema::{Field, Node, NodeType, Pattern, Record};
use once_cell::sync::Lazy;

use crate::{
    convert::{Element, NodeBuilder, NodeReader},
    KiCadParseError,
};

pub(crate) static NET_CLASS: Lazy<NodeType> = Lazy::new(|| {
    let number = |tag: &str| Field::leaf(tag, Pattern::Number);

    NodeType::new(
        "net_class",
        Record::new()
            .positional(Field::positional("name", Pattern::Text))
            .positional(Field::positional("description", Pattern::Text))
            .fields([
                number("clearance"),
                number("trace_width"),
                number("via_dia"),
                number("via_drill"),
                number("uvia_dia"),
                number("uvia_drill"),
                Field::leaf("add_net", Pattern::Text)
                    .attr("nets")
                    .multiple(),
            ]),
    )
});

/// Design rules shared by a group of nets
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, PartialEq, Clone, Default)]
pub struct NetClass {
    pub name: String,
    pub description: String,
    pub clearance: Option<f64>,
    pub trace_width: Option<f64>,
    pub via_diameter: Option<f64>,
    pub via_drill: Option<f64>,
    pub micro_via_diameter: Option<f64>,
    pub micro_via_drill: Option<f64>,
    /// Names of the member nets
    pub nets: Vec<String>,
}

impl NetClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl Element for NetClass {
    fn node_type() -> &'static NodeType {
        &NET_CLASS
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &NET_CLASS)?;

        Ok(Self {
            name: reader.expect("name")?,
            description: reader.expect("description")?,
            clearance: reader.maybe("clearance")?,
            trace_width: reader.maybe("trace_width")?,
            via_diameter: reader.maybe("via_dia")?,
            via_drill: reader.maybe("via_drill")?,
            micro_via_diameter: reader.maybe("uvia_dia")?,
            micro_via_drill: reader.maybe("uvia_drill")?,
            nets: reader.many("nets")?,
        })
    }

    fn to_node(&self) -> Node {
        NodeBuilder::new(&NET_CLASS)
            .set("name", &self.name)
            .set("description", &self.description)
            .set_opt("clearance", self.clearance.as_ref())
            .set_opt("trace_width", self.trace_width.as_ref())
            .set_opt("via_dia", self.via_diameter.as_ref())
            .set_opt("via_drill", self.via_drill.as_ref())
            .set_opt("uvia_dia", self.micro_via_diameter.as_ref())
            .set_opt("uvia_drill", self.micro_via_drill.as_ref())
            .many("nets", &self.nets)
            .finish()
    }
}
