use kicad_schema::{Field, Node, NodeType, Pattern, Record};
use once_cell::sync::Lazy;

use crate::{
    common::{flip_layer, Position, Vec2D},
    convert::{Element, NodeBuilder, NodeReader},
    simple_to_from_string, KiCadParseError,
};

pub(crate) static TEXT: Lazy<NodeType> = Lazy::new(|| {
    let font = Record::new()
        .field(Field::leaf("size", Pattern::numbers(2)))
        .field(Field::leaf("thickness", Pattern::Number))
        .field(Field::flag("bold"))
        .field(Field::flag("italic"));

    let effects = Record::new()
        .field(Field::record("font", font))
        .field(Field::leaf("justify", Justify::pattern()))
        .field(Field::flag("hide").attr("effects_hide"));

    NodeType::new(
        "fp_text",
        Record::new()
            .positional(Field::positional("type", TextKind::pattern()))
            .positional(Field::positional("text", Pattern::Text))
            .positional(Field::leaf("at", Position::pattern()))
            .field(Field::leaf("layer", Pattern::Text).required())
            .field(Field::flag("hide"))
            .field(Field::record("effects", effects)),
    )
});

/// A text element of a footprint, `(fp_text TYPE TEXT (at ..) (layer ..) ..)`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, PartialEq, Clone)]
pub struct Text {
    pub kind: TextKind,
    pub text: String,
    pub position: Position,
    pub layer: String,
    pub hide: bool,
    pub size: Option<Vec2D>,
    pub thickness: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub justify: Option<Justify>,
    /// `hide` written inside `(effects ..)` rather than after the layer
    pub effects_hide: bool,
}

impl Text {
    /// A text at the origin on `F.SilkS` with the default font
    pub fn new(kind: TextKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            position: Position::default(),
            layer: "F.SilkS".to_string(),
            hide: false,
            size: None,
            thickness: None,
            bold: false,
            italic: false,
            justify: None,
            effects_hide: false,
        }
    }

    pub fn rotate(&mut self, angle: f64) {
        self.position.rotate(angle);
    }

    /// Moves the text to the other side of the board. Mirrored text becomes
    /// readable again and readable text becomes mirrored.
    pub fn flip(&mut self) {
        self.layer = flip_layer(&self.layer);
        self.position.y = -self.position.y;
        self.justify = match self.justify {
            Some(Justify::Mirror) => None,
            _ => Some(Justify::Mirror),
        };
    }
}

impl Element for Text {
    fn node_type() -> &'static NodeType {
        &TEXT
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &TEXT)?;

        Ok(Self {
            kind: reader.expect("type")?,
            text: reader.expect("text")?,
            position: reader.expect("at")?,
            layer: reader.expect("layer")?,
            hide: reader.flag("hide"),
            size: reader.maybe("size")?,
            thickness: reader.maybe("thickness")?,
            bold: reader.flag("bold"),
            italic: reader.flag("italic"),
            justify: reader.maybe("justify")?,
            effects_hide: reader.flag("effects_hide"),
        })
    }

    fn to_node(&self) -> Node {
        NodeBuilder::new(&TEXT)
            .set("type", &self.kind)
            .set("text", &self.text)
            .set("at", &self.position)
            .set("layer", &self.layer)
            .flag("hide", self.hide)
            .set_opt("size", self.size.as_ref())
            .set_opt("thickness", self.thickness.as_ref())
            .flag("bold", self.bold)
            .flag("italic", self.italic)
            .set_opt("justify", self.justify.as_ref())
            .flag("effects_hide", self.effects_hide)
            .finish()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TextKind {
    Reference,
    Value,
    User,
}

simple_to_from_string! {
    TextKind,
    reference <-> Reference,
    value <-> Value,
    user <-> User,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Justify {
    Left,
    Right,
    Top,
    Bottom,
    Mirror,
}

simple_to_from_string! {
    Justify,
    left <-> Left,
    right <-> Right,
    top <-> Top,
    bottom <-> Bottom,
    mirror <-> Mirror,
}
