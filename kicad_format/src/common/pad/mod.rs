//! Common structures related to footprint pads

use kicad_schema::{Field, Node, NodeType, Pattern, Record, SchemaError, Value};
use kicad_sexpr::atom::format_number;
use once_cell::sync::Lazy;

use crate::{
    common::{flip_layer, net::NET, Net, Position, Vec2D},
    convert::{Element, FromValue, NodeBuilder, NodeReader, ToValue},
    simple_to_from_string, KiCadParseError,
};

pub(crate) static DRILL: Lazy<NodeType> = Lazy::new(|| {
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
                .optional()
                .printer(print_drill_size),
            )
            .field(Field::leaf("offset", Pattern::numbers(2))),
    )
});

pub(crate) static PAD: Lazy<NodeType> = Lazy::new(|| {
    let number = |tag: &str| Field::leaf(tag, Pattern::Number);

    NodeType::new(
        "pad",
        Record::new()
            .positional(Field::positional("name", Pattern::Text))
            .positional(Field::positional("type", PadKind::pattern()))
            .positional(Field::positional("shape", PadShape::pattern()))
            .fields([
                Field::leaf("at", Position::pattern()),
                Field::leaf("size", Pattern::numbers(2)),
                Field::leaf("rect_delta", Pattern::numbers(2)),
                number("roundrect_rratio"),
                Field::node("drill", &DRILL),
                Field::leaf("layers", Pattern::many(Pattern::Text)),
                Field::node("net", &NET),
                number("die_length"),
                number("solder_mask_margin"),
                number("solder_paste_margin"),
                number("solder_paste_margin_ratio"),
                number("clearance"),
                Field::leaf("zone_connect", Pattern::Integer),
            ]),
    )
});

/// `0.8` for a round hole, `oval 0.6 0.8` for an oval one
fn print_drill_size(size: &Value) -> Result<String, SchemaError> {
    match DrillSize::from_value(size) {
        Some(DrillSize::Round(diameter)) => Ok(format_number(diameter)),
        Some(DrillSize::Oval(width, height)) => Ok(format!(
            "oval {} {}",
            format_number(width),
            format_number(height)
        )),
        None => Err(SchemaError::UnprintableValue {
            attr: "size".to_string(),
            value: format!("{size:?}"),
        }),
    }
}

/// A footprint pad
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, PartialEq, Clone)]
pub struct Pad {
    pub name: String,
    pub kind: PadKind,
    pub shape: PadShape,
    pub position: Position,
    pub size: Option<Vec2D>,
    pub rect_delta: Option<Vec2D>,
    pub round_rect_radius_ratio: Option<f64>,
    pub drill: Option<Drill>,
    pub layers: Vec<String>,
    pub net: Option<Net>,
    pub die_length: Option<f64>,
    pub solder_mask_margin: Option<f64>,
    pub solder_paste_margin: Option<f64>,
    pub solder_paste_margin_ratio: Option<f64>,
    pub clearance: Option<f64>,
    pub zone_connect: Option<i64>,
}

impl Pad {
    /// A pad at the origin on `F.Cu`
    pub fn new(name: impl Into<String>, kind: PadKind, shape: PadShape) -> Self {
        Self {
            name: name.into(),
            kind,
            shape,
            position: Position::default(),
            size: None,
            rect_delta: None,
            round_rect_radius_ratio: None,
            drill: None,
            layers: vec!["F.Cu".to_string()],
            net: None,
            die_length: None,
            solder_mask_margin: None,
            solder_paste_margin: None,
            solder_paste_margin_ratio: None,
            clearance: None,
            zone_connect: None,
        }
    }

    /// Whether the pad carries everything its kind and shape need: a
    /// trapezoid needs a delta, a rounded rectangle a radius ratio and a
    /// through hole pad a drill.
    pub fn is_valid(&self) -> bool {
        match self.shape {
            PadShape::Trapezoid if self.rect_delta.is_none() => return false,
            PadShape::RoundRect if self.round_rect_radius_ratio.is_none() => return false,
            _ => {}
        }

        !(self.kind.is_through_hole() && self.drill.is_none())
    }

    pub fn rotate(&mut self, angle: f64) {
        self.position.rotate(angle);
    }

    /// Moves the pad to the other side of the board, mirroring it across the
    /// X axis.
    pub fn flip(&mut self) {
        self.layers = self.layers.iter().map(|l| flip_layer(l)).collect();
        self.position.y = -self.position.y;
        self.position.angle = self.position.angle.map(|a| -a);
    }
}

impl Element for Pad {
    fn node_type() -> &'static NodeType {
        &PAD
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &PAD)?;

        Ok(Self {
            name: reader.expect("name")?,
            kind: reader.expect("type")?,
            shape: reader.expect("shape")?,
            position: reader.maybe("at")?.unwrap_or_default(),
            size: reader.maybe("size")?,
            rect_delta: reader.maybe("rect_delta")?,
            round_rect_radius_ratio: reader.maybe("roundrect_rratio")?,
            drill: reader.maybe_element("drill")?,
            layers: reader.maybe("layers")?.unwrap_or_default(),
            net: reader.maybe_element("net")?,
            die_length: reader.maybe("die_length")?,
            solder_mask_margin: reader.maybe("solder_mask_margin")?,
            solder_paste_margin: reader.maybe("solder_paste_margin")?,
            solder_paste_margin_ratio: reader.maybe("solder_paste_margin_ratio")?,
            clearance: reader.maybe("clearance")?,
            zone_connect: reader.maybe("zone_connect")?,
        })
    }

    fn to_node(&self) -> Node {
        NodeBuilder::new(&PAD)
            .set("name", &self.name)
            .set("type", &self.kind)
            .set("shape", &self.shape)
            .set("at", &self.position)
            .set_opt("size", self.size.as_ref())
            .set_opt("rect_delta", self.rect_delta.as_ref())
            .set_opt("roundrect_rratio", self.round_rect_radius_ratio.as_ref())
            .maybe_element("drill", self.drill.as_ref())
            .set_opt("layers", Some(&self.layers).filter(|l| !l.is_empty()))
            .maybe_element("net", self.net.as_ref())
            .set_opt("die_length", self.die_length.as_ref())
            .set_opt("solder_mask_margin", self.solder_mask_margin.as_ref())
            .set_opt("solder_paste_margin", self.solder_paste_margin.as_ref())
            .set_opt("solder_paste_margin_ratio", self.solder_paste_margin_ratio.as_ref())
            .set_opt("clearance", self.clearance.as_ref())
            .set_opt("zone_connect", self.zone_connect.as_ref())
            .finish()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PadKind {
    ThroughHole,
    Smd,
    Connect,
    NpThroughHole,
}

impl PadKind {
    pub fn is_through_hole(&self) -> bool {
        matches!(self, Self::ThroughHole | Self::NpThroughHole)
    }
}

simple_to_from_string! {
    PadKind,
    smd <-> Smd,
    thru_hole <-> ThroughHole,
    np_thru_hole <-> NpThroughHole,
    connect <-> Connect,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PadShape {
    Circle,
    Rect,
    RoundRect,
    Oval,
    Trapezoid,
}

simple_to_from_string! {
    PadShape,
    circle <-> Circle,
    rect <-> Rect,
    roundrect <-> RoundRect,
    oval <-> Oval,
    trapezoid <-> Trapezoid,
}

/// A pad's hole, `(drill [SIZE | oval W H] (offset X Y))`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, PartialEq, Clone)]
pub struct Drill {
    pub size: Option<DrillSize>,
    pub offset: Option<Vec2D>,
}

impl Drill {
    pub fn round(diameter: f64) -> Self {
        Self {
            size: Some(DrillSize::Round(diameter)),
            offset: None,
        }
    }

    pub fn oval(width: f64, height: f64) -> Self {
        Self {
            size: Some(DrillSize::Oval(width, height)),
            offset: None,
        }
    }

    pub fn with_offset(mut self, offset: Vec2D) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn is_oval(&self) -> bool {
        matches!(self.size, Some(DrillSize::Oval(..)))
    }
}

impl Element for Drill {
    fn node_type() -> &'static NodeType {
        &DRILL
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &DRILL)?;

        Ok(Self {
            size: reader.maybe("size")?,
            offset: reader.maybe("offset")?,
        })
    }

    fn to_node(&self) -> Node {
        NodeBuilder::new(&DRILL)
            .set_opt("size", self.size.as_ref())
            .set_opt("offset", self.offset.as_ref())
            .finish()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum DrillSize {
    /// A round hole of the given diameter
    Round(f64),
    /// An oval hole, width then height
    Oval(f64, f64),
}

impl FromValue for DrillSize {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(_) => match value.to_numbers()?.as_slice() {
                [width, height] => Some(Self::Oval(*width, *height)),
                _ => None,
            },
            value => value.as_number().map(Self::Round),
        }
    }
}

impl ToValue for DrillSize {
    fn to_value(&self) -> Value {
        match self {
            Self::Round(diameter) => Value::Number(*diameter),
            Self::Oval(width, height) => Value::from([*width, *height]),
        }
    }
}
