//! Graphical items of a footprint

use kicad_schema::{Field, Node, NodeType, Pattern, Record};
use once_cell::sync::Lazy;

use crate::{
    common::{flip_layer, Vec2D},
    convert::{Element, NodeBuilder, NodeReader},
    KiCadParseError,
};

/// `(layer ..) (width ..)`, shared by every graphical item
fn stroke(layer_required: bool) -> [Field; 2] {
    let layer = Field::leaf("layer", Pattern::Text);
    let layer = if layer_required {
        layer.required()
    } else {
        layer
    };

    [layer, Field::leaf("width", Pattern::Number)]
}

fn point(tag: &str) -> Field {
    Field::leaf(tag, Pattern::numbers(2))
}

pub(crate) static LINE: Lazy<NodeType> = Lazy::new(|| {
    NodeType::new(
        "fp_line",
        Record::new()
            .positional(point("start"))
            .positional(point("end"))
            .fields(stroke(true)),
    )
});

pub(crate) static CIRCLE: Lazy<NodeType> = Lazy::new(|| {
    NodeType::new(
        "fp_circle",
        Record::new()
            .positional(point("center"))
            .positional(point("end"))
            .fields(stroke(true)),
    )
});

pub(crate) static ARC: Lazy<NodeType> = Lazy::new(|| {
    NodeType::new(
        "fp_arc",
        Record::new()
            .positional(point("start"))
            .positional(point("end"))
            .positional(Field::leaf("angle", Pattern::Number))
            .fields(stroke(true)),
    )
});

pub(crate) static POLYGON: Lazy<NodeType> = Lazy::new(|| {
    NodeType::new(
        "fp_poly",
        Record::new()
            .field(
                Field::record(
                    "pts",
                    Record::new().field(point("xy").attr("points").multiple()),
                )
                .required(),
            )
            .fields(stroke(false)),
    )
});

pub(crate) static CURVE: Lazy<NodeType> = Lazy::new(|| {
    let control = |attr: &str| point("xy").attr(attr);

    NodeType::new(
        "fp_curve",
        Record::new()
            .field(
                Field::record(
                    "pts",
                    Record::new()
                        .positional(control("start"))
                        .positional(control("bezier1"))
                        .positional(control("bezier2"))
                        .positional(control("end")),
                )
                .required(),
            )
            .fields(stroke(false)),
    )
});

/// `(fp_line (start X Y) (end X Y) (layer ..) (width ..))`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone)]
pub struct Line {
    pub start: Vec2D,
    pub end: Vec2D,
    pub layer: String,
    pub width: Option<f64>,
}

impl Line {
    pub fn new(start: Vec2D, end: Vec2D, layer: impl Into<String>) -> Self {
        Self {
            start,
            end,
            layer: layer.into(),
            width: None,
        }
    }

    pub fn flip(&mut self) {
        self.layer = flip_layer(&self.layer);
        self.start.flip();
        self.end.flip();
    }
}

impl Element for Line {
    fn node_type() -> &'static NodeType {
        &LINE
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &LINE)?;

        Ok(Self {
            start: reader.expect("start")?,
            end: reader.expect("end")?,
            layer: reader.expect("layer")?,
            width: reader.maybe("width")?,
        })
    }

    fn to_node(&self) -> Node {
        NodeBuilder::new(&LINE)
            .set("start", &self.start)
            .set("end", &self.end)
            .set("layer", &self.layer)
            .set_opt("width", self.width.as_ref())
            .finish()
    }
}

/// `(fp_circle (center X Y) (end X Y) (layer ..) (width ..))`, where `end`
/// is any point on the circle
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone)]
pub struct Circle {
    pub center: Vec2D,
    pub end: Vec2D,
    pub layer: String,
    pub width: Option<f64>,
}

impl Circle {
    pub fn new(center: Vec2D, end: Vec2D, layer: impl Into<String>) -> Self {
        Self {
            center,
            end,
            layer: layer.into(),
            width: None,
        }
    }

    pub fn flip(&mut self) {
        self.layer = flip_layer(&self.layer);
        self.center.flip();
        self.end.flip();
    }
}

impl Element for Circle {
    fn node_type() -> &'static NodeType {
        &CIRCLE
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &CIRCLE)?;

        Ok(Self {
            center: reader.expect("center")?,
            end: reader.expect("end")?,
            layer: reader.expect("layer")?,
            width: reader.maybe("width")?,
        })
    }

    fn to_node(&self) -> Node {
        NodeBuilder::new(&CIRCLE)
            .set("center", &self.center)
            .set("end", &self.end)
            .set("layer", &self.layer)
            .set_opt("width", self.width.as_ref())
            .finish()
    }
}

/// `(fp_arc (start X Y) (end X Y) (angle A) (layer ..) (width ..))`. The arc
/// is centred on `start` and sweeps `angle` degrees from `end`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone)]
pub struct Arc {
    pub start: Vec2D,
    pub end: Vec2D,
    pub angle: f64,
    pub layer: String,
    pub width: Option<f64>,
}

impl Arc {
    pub fn new(start: Vec2D, end: Vec2D, angle: f64, layer: impl Into<String>) -> Self {
        Self {
            start,
            end,
            angle,
            layer: layer.into(),
            width: None,
        }
    }

    /// Mirroring reverses the direction of the sweep
    pub fn flip(&mut self) {
        self.layer = flip_layer(&self.layer);
        self.start.flip();
        self.end.flip();
        self.angle = -self.angle;
    }
}

impl Element for Arc {
    fn node_type() -> &'static NodeType {
        &ARC
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &ARC)?;

        Ok(Self {
            start: reader.expect("start")?,
            end: reader.expect("end")?,
            angle: reader.expect("angle")?,
            layer: reader.expect("layer")?,
            width: reader.maybe("width")?,
        })
    }

    fn to_node(&self) -> Node {
        NodeBuilder::new(&ARC)
            .set("start", &self.start)
            .set("end", &self.end)
            .set("angle", &self.angle)
            .set("layer", &self.layer)
            .set_opt("width", self.width.as_ref())
            .finish()
    }
}

/// `(fp_poly (pts (xy X Y) ...) (layer ..) (width ..))`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone)]
pub struct Polygon {
    pub points: Vec<Vec2D>,
    pub layer: Option<String>,
    pub width: Option<f64>,
}

impl Polygon {
    pub fn new(points: Vec<Vec2D>) -> Self {
        Self {
            points,
            layer: None,
            width: None,
        }
    }

    pub fn flip(&mut self) {
        self.layer = self.layer.as_deref().map(flip_layer);
        self.points.iter_mut().for_each(Vec2D::flip);
    }
}

impl Element for Polygon {
    fn node_type() -> &'static NodeType {
        &POLYGON
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &POLYGON)?;

        Ok(Self {
            points: reader.many("points")?,
            layer: reader.maybe("layer")?,
            width: reader.maybe("width")?,
        })
    }

    fn to_node(&self) -> Node {
        NodeBuilder::new(&POLYGON)
            .many("points", &self.points)
            .set_opt("layer", self.layer.as_ref())
            .set_opt("width", self.width.as_ref())
            .finish()
    }
}

/// A cubic Bézier curve, `(fp_curve (pts (xy ..) (xy ..) (xy ..) (xy ..)) ..)`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone)]
pub struct Curve {
    pub start: Vec2D,
    pub bezier1: Vec2D,
    pub bezier2: Vec2D,
    pub end: Vec2D,
    pub layer: Option<String>,
    pub width: Option<f64>,
}

impl Curve {
    pub fn flip(&mut self) {
        self.layer = self.layer.as_deref().map(flip_layer);

        for point in [
            &mut self.start,
            &mut self.bezier1,
            &mut self.bezier2,
            &mut self.end,
        ] {
            point.flip();
        }
    }
}

impl Element for Curve {
    fn node_type() -> &'static NodeType {
        &CURVE
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &CURVE)?;

        Ok(Self {
            start: reader.expect("start")?,
            bezier1: reader.expect("bezier1")?,
            bezier2: reader.expect("bezier2")?,
            end: reader.expect("end")?,
            layer: reader.maybe("layer")?,
            width: reader.maybe("width")?,
        })
    }

    fn to_node(&self) -> Node {
        NodeBuilder::new(&CURVE)
            .set("start", &self.start)
            .set("bezier1", &self.bezier1)
            .set("bezier2", &self.bezier2)
            .set("end", &self.end)
            .set_opt("layer", self.layer.as_ref())
            .set_opt("width", self.width.as_ref())
            .finish()
    }
}
