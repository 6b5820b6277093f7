//! Footprints (modules) and the elements they are built from.
//!
//! Used both in footprint library files and board files.

use std::path::Path;

use kicad_schema::{Field, Node, NodeType, Pattern, Record};
use once_cell::sync::Lazy;
use tracing::debug;

use self::{
    model::MODEL,
    shape::{ARC, CIRCLE, CURVE, LINE, POLYGON},
    text::TEXT,
};
use super::{flip_layer, layer_side, pad::PAD, Net, Position};
use crate::{
    convert::{Element, NodeBuilder, NodeReader},
    library::LibraryPath,
    simple_to_from_string, KiCadParseError,
};

pub mod model;
pub mod shape;
pub mod text;

pub use self::{
    model::Model,
    shape::{Arc, Circle, Curve, Line, Polygon},
    text::{Justify, Text, TextKind},
};
pub use super::pad::{Drill, DrillSize, Pad, PadKind, PadShape};

pub(crate) static MODULE: Lazy<NodeType> = Lazy::new(|| {
    let number = |tag: &str| Field::leaf(tag, Pattern::Number);
    let integer = |tag: &str| Field::leaf(tag, Pattern::Integer);
    let text = |tag: &str| Field::leaf(tag, Pattern::Text);

    NodeType::new(
        "module",
        Record::new()
            .positional(Field::positional("name", Pattern::Text))
            .fields([
                integer("version"),
                Field::flag("locked"),
                Field::flag("placed"),
                Field::leaf("layer", Pattern::one_of(["F.Cu", "B.Cu"])).required(),
                Field::leaf("tedit", Pattern::Hex),
                Field::leaf("tstamp", Pattern::Hex),
                Field::leaf("at", Position::pattern()),
                text("descr"),
                text("tags"),
                text("path"),
                Field::leaf("attr", ModuleAttribute::pattern()),
                integer("autoplace_cost90"),
                integer("autoplace_cost180"),
                number("solder_mask_margin"),
                number("solder_paste_margin"),
                number("solder_paste_ratio"),
                number("clearance"),
                integer("zone_connect"),
                number("thermal_width"),
                number("thermal_gap"),
                Field::node("texts", &TEXT).multiple(),
                Field::node("lines", &LINE).multiple(),
                Field::node("circles", &CIRCLE).multiple(),
                Field::node("arcs", &ARC).multiple(),
                Field::node("polygons", &POLYGON).multiple(),
                Field::node("curves", &CURVE).multiple(),
                Field::node("pads", &PAD).multiple(),
                Field::node("models", &MODEL).multiple(),
            ]),
    )
});

/// A footprint, `(module NAME ...)`.
///
/// This is the whole content of a `.kicad_mod` file, and also how
/// footprints are placed within a board.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, PartialEq, Clone)]
pub struct Module {
    pub name: String,
    pub version: Option<i64>,
    pub locked: bool,
    pub placed: bool,
    pub layer: String,
    pub tedit: Option<String>,
    pub tstamp: Option<String>,
    pub position: Option<Position>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub path: Option<String>,
    pub attribute: Option<ModuleAttribute>,
    pub autoplace_cost90: Option<i64>,
    pub autoplace_cost180: Option<i64>,
    pub solder_mask_margin: Option<f64>,
    pub solder_paste_margin: Option<f64>,
    pub solder_paste_ratio: Option<f64>,
    pub clearance: Option<f64>,
    pub zone_connect: Option<i64>,
    pub thermal_width: Option<f64>,
    pub thermal_gap: Option<f64>,
    pub texts: Vec<Text>,
    pub lines: Vec<Line>,
    pub circles: Vec<Circle>,
    pub arcs: Vec<Arc>,
    pub polygons: Vec<Polygon>,
    pub curves: Vec<Curve>,
    pub pads: Vec<Pad>,
    pub models: Vec<Model>,
}

/// A borrowed graphical item of a footprint
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum FootprintGraphic<'a> {
    Line(&'a Line),
    Circle(&'a Circle),
    Arc(&'a Arc),
    Curve(&'a Curve),
    Polygon(&'a Polygon),
}

impl FootprintGraphic<'_> {
    pub fn layer(&self) -> Option<&str> {
        match self {
            Self::Line(line) => Some(&line.layer),
            Self::Circle(circle) => Some(&circle.layer),
            Self::Arc(arc) => Some(&arc.layer),
            Self::Curve(curve) => curve.layer.as_deref(),
            Self::Polygon(polygon) => polygon.layer.as_deref(),
        }
    }
}

impl Module {
    /// An empty footprint on the front copper layer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
            locked: false,
            placed: false,
            layer: "F.Cu".to_string(),
            tedit: None,
            tstamp: None,
            position: None,
            description: None,
            tags: None,
            path: None,
            attribute: None,
            autoplace_cost90: None,
            autoplace_cost180: None,
            solder_mask_margin: None,
            solder_paste_margin: None,
            solder_paste_ratio: None,
            clearance: None,
            zone_connect: None,
            thermal_width: None,
            thermal_gap: None,
            texts: Vec::new(),
            lines: Vec::new(),
            circles: Vec::new(),
            arcs: Vec::new(),
            polygons: Vec::new(),
            curves: Vec::new(),
            pads: Vec::new(),
            models: Vec::new(),
        }
    }

    /// Reads a `.kicad_mod` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KiCadParseError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| KiCadParseError::io(path, e))?;

        debug!(path = %path.display(), "read module file");

        Self::parse(&input)
    }

    /// Reads module `name` of library `library` from the search path
    pub fn from_library(
        libraries: &LibraryPath,
        library: &str,
        name: &str,
    ) -> Result<Self, KiCadParseError> {
        Self::parse(&libraries.read_module(library, name)?)
    }

    /// The pads called `name`. Several pads may share a name, and they need
    /// not be next to each other.
    pub fn pads_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Pad> + 'a {
        self.pads.iter().filter(move |pad| pad.name == name)
    }

    pub fn pads_by_name_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut Pad> + 'a {
        self.pads.iter_mut().filter(move |pad| pad.name == name)
    }

    /// Renames the footprint along with its reference texts
    pub fn set_reference(&mut self, name: impl Into<String>) {
        self.name = name.into();

        for text in &mut self.texts {
            if text.kind == TextKind::Reference {
                text.text = self.name.clone();
            }
        }
    }

    /// Updates every value text
    pub fn set_value(&mut self, value: &str) {
        for text in &mut self.texts {
            if text.kind == TextKind::Value {
                text.text = value.to_string();
            }
        }
    }

    /// Every graphical item: lines, circles, arcs, curves and polygons
    pub fn geometry(&self) -> impl Iterator<Item = FootprintGraphic<'_>> {
        let lines = self.lines.iter().map(FootprintGraphic::Line);
        let circles = self.circles.iter().map(FootprintGraphic::Circle);
        let arcs = self.arcs.iter().map(FootprintGraphic::Arc);
        let curves = self.curves.iter().map(FootprintGraphic::Curve);
        let polygons = self.polygons.iter().map(FootprintGraphic::Polygon);

        lines.chain(circles).chain(arcs).chain(curves).chain(polygons)
    }

    pub fn elements_by_layer<'a>(
        &'a self,
        layer: &'a str,
    ) -> impl Iterator<Item = FootprintGraphic<'a>> + 'a {
        self.geometry().filter(move |g| g.layer() == Some(layer))
    }

    /// The graphical items on the courtyard layer of the footprint's side
    pub fn courtyard(&self) -> Vec<FootprintGraphic<'_>> {
        let layer = format!("{}.CrtYd", layer_side(&self.layer));

        self.geometry()
            .filter(|g| g.layer() == Some(layer.as_str()))
            .collect()
    }

    /// Moves the footprint, keeping its rotation
    pub fn place(&mut self, x: f64, y: f64) {
        let position = self.position.get_or_insert_with(Position::default);
        position.x = x;
        position.y = y;
    }

    /// Rotates the footprint along with its pads and texts
    pub fn rotate(&mut self, angle: f64) {
        self.position
            .get_or_insert_with(Position::default)
            .rotate(angle);

        for pad in &mut self.pads {
            pad.rotate(angle);
        }

        for text in &mut self.texts {
            text.rotate(angle);
        }
    }

    /// Connects every pad called `name` to `net`
    pub fn connect(&mut self, name: &str, net: &Net) {
        for pad in self.pads_by_name_mut(name) {
            pad.net = Some(net.clone());
        }
    }

    /// Moves the footprint and everything on it to the other side of the
    /// board
    pub fn flip(&mut self) {
        self.layer = flip_layer(&self.layer);

        self.pads.iter_mut().for_each(Pad::flip);
        self.texts.iter_mut().for_each(Text::flip);
        self.lines.iter_mut().for_each(Line::flip);
        self.circles.iter_mut().for_each(Circle::flip);
        self.arcs.iter_mut().for_each(Arc::flip);
        self.curves.iter_mut().for_each(Curve::flip);
        self.polygons.iter_mut().for_each(Polygon::flip);
    }
}

impl Element for Module {
    fn node_type() -> &'static NodeType {
        &MODULE
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &MODULE)?;

        Ok(Self {
            name: reader.expect("name")?,
            version: reader.maybe("version")?,
            locked: reader.flag("locked"),
            placed: reader.flag("placed"),
            layer: reader.expect("layer")?,
            tedit: reader.maybe("tedit")?,
            tstamp: reader.maybe("tstamp")?,
            position: reader.maybe("at")?,
            description: reader.maybe("descr")?,
            tags: reader.maybe("tags")?,
            path: reader.maybe("path")?,
            attribute: reader.maybe("attr")?,
            autoplace_cost90: reader.maybe("autoplace_cost90")?,
            autoplace_cost180: reader.maybe("autoplace_cost180")?,
            solder_mask_margin: reader.maybe("solder_mask_margin")?,
            solder_paste_margin: reader.maybe("solder_paste_margin")?,
            solder_paste_ratio: reader.maybe("solder_paste_ratio")?,
            clearance: reader.maybe("clearance")?,
            zone_connect: reader.maybe("zone_connect")?,
            thermal_width: reader.maybe("thermal_width")?,
            thermal_gap: reader.maybe("thermal_gap")?,
            texts: reader.many_elements("texts")?,
            lines: reader.many_elements("lines")?,
            circles: reader.many_elements("circles")?,
            arcs: reader.many_elements("arcs")?,
            polygons: reader.many_elements("polygons")?,
            curves: reader.many_elements("curves")?,
            pads: reader.many_elements("pads")?,
            models: reader.many_elements("models")?,
        })
    }

    fn to_node(&self) -> Node {
        NodeBuilder::new(&MODULE)
            .set("name", &self.name)
            .set_opt("version", self.version.as_ref())
            .flag("locked", self.locked)
            .flag("placed", self.placed)
            .set("layer", &self.layer)
            .set_opt("tedit", self.tedit.as_ref())
            .set_opt("tstamp", self.tstamp.as_ref())
            .set_opt("at", self.position.as_ref())
            .set_opt("descr", self.description.as_ref())
            .set_opt("tags", self.tags.as_ref())
            .set_opt("path", self.path.as_ref())
            .set_opt("attr", self.attribute.as_ref())
            .set_opt("autoplace_cost90", self.autoplace_cost90.as_ref())
            .set_opt("autoplace_cost180", self.autoplace_cost180.as_ref())
            .set_opt("solder_mask_margin", self.solder_mask_margin.as_ref())
            .set_opt("solder_paste_margin", self.solder_paste_margin.as_ref())
            .set_opt("solder_paste_ratio", self.solder_paste_ratio.as_ref())
            .set_opt("clearance", self.clearance.as_ref())
            .set_opt("zone_connect", self.zone_connect.as_ref())
            .set_opt("thermal_width", self.thermal_width.as_ref())
            .set_opt("thermal_gap", self.thermal_gap.as_ref())
            .many_elements("texts", &self.texts)
            .many_elements("lines", &self.lines)
            .many_elements("circles", &self.circles)
            .many_elements("arcs", &self.arcs)
            .many_elements("polygons", &self.polygons)
            .many_elements("curves", &self.curves)
            .many_elements("pads", &self.pads)
            .many_elements("models", &self.models)
            .finish()
    }
}

/// How a footprint is counted in the bill of materials and placement files.
/// Footprints without `(attr ..)` only go into the BOM.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ModuleAttribute {
    /// In the BOM and the SMT placement file
    Smd,
    /// Left out of the BOM
    Virtual,
}

simple_to_from_string! {
    ModuleAttribute,
    smd <-> Smd,
    virtual <-> Virtual,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{NetNumbering, Vec2D};

    fn module_with_pads(pads: &str) -> Module {
        Module::parse(&format!("(module name (layer F.Cu) {pads})")).unwrap()
    }

    #[test]
    fn test_module() {
        let module = module_with_pads("");

        assert_eq!(module.name, "name");
        assert_eq!(module.layer, "F.Cu");
        assert_eq!(Module::parse(&module.serialize().unwrap()).unwrap(), module);

        let mut pads = String::new();
        for i in 1..=2 {
            let mut pad = Pad::new(i.to_string(), PadKind::ThroughHole, PadShape::Circle);
            pad.drill = Some(Drill::round(0.8));
            pads.push_str(&pad.serialize().unwrap());
        }

        let module = module_with_pads(&pads);
        assert_eq!(module.pads[0].name, "1");
        assert_eq!(module.pads[0].drill, Some(Drill::round(0.8)));
        assert_eq!(module.pads[1].name, "2");
        assert_eq!(module.pads[1].drill, Some(Drill::round(0.8)));
        assert_eq!(Module::parse(&module.serialize().unwrap()).unwrap(), module);
    }

    #[test]
    fn test_flags_and_children_in_any_order() {
        let module = Module::parse(
            "(module R_0805 locked (layer F.Cu) (tedit 58E0A804)
                (pad 2 smd rect (at 1 0) (size 1 1.3) (layers F.Cu))
                (fp_text reference R1 (at 0 -1.6) (layer F.SilkS))
                (attr smd)
                (pad 1 smd rect (at -1 0) (size 1 1.3) (layers F.Cu))
                (fp_line (start -1 -1) (end 1 -1) (layer F.CrtYd) (width 0.05)))",
        )
        .unwrap();

        assert!(module.locked);
        assert!(!module.placed);
        assert_eq!(module.tedit.as_deref(), Some("58E0A804"));
        assert_eq!(module.attribute, Some(ModuleAttribute::Smd));
        assert_eq!(module.texts.len(), 1);
        assert_eq!(module.lines.len(), 1);

        let names: Vec<_> = module.pads.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["2", "1"]);

        let printed = module.serialize().unwrap();
        assert!(printed.starts_with("(module R_0805 locked\n    (layer F.Cu)\n    (tedit 58E0A804)"));
        assert_eq!(Module::parse(&printed).unwrap(), module);
    }

    #[test]
    fn test_references_and_values() {
        let mut module = Module::new("R1");
        module.texts = vec![
            Text::new(TextKind::Reference, "R1"),
            Text::new(TextKind::Value, "10k"),
            Text::new(TextKind::User, "%R"),
        ];

        module.set_reference("R7");
        module.set_value("4k7");

        assert_eq!(module.name, "R7");
        let texts: Vec<_> = module.texts.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["R7", "4k7", "%R"]);
    }

    #[test]
    fn test_connect_by_name() {
        let mut module = Module::new("U1");
        module.pads = vec![
            Pad::new("1", PadKind::Smd, PadShape::Rect),
            Pad::new("GND", PadKind::Smd, PadShape::Rect),
            Pad::new("GND", PadKind::Smd, PadShape::Rect),
        ];

        let mut numbering = NetNumbering::new();
        let gnd = Net::auto(&mut numbering, "GND");
        module.connect("GND", &gnd);

        assert_eq!(module.pads_by_name("GND").count(), 2);
        assert!(module.pads_by_name("GND").all(|p| p.net.as_ref() == Some(&gnd)));
        assert_eq!(module.pads[0].net, None);
    }

    #[test]
    fn test_place_and_rotate() {
        let mut module = Module::new("U1");
        module.pads = vec![Pad::new("1", PadKind::Smd, PadShape::Rect)];
        module.texts = vec![Text::new(TextKind::Reference, "U1")];

        module.place(10.0, 20.0);
        module.rotate(90.0);
        module.rotate(90.0);

        assert_eq!(module.position, Some(Position::new(10.0, 20.0, Some(180.0))));
        assert_eq!(module.pads[0].position.angle, Some(180.0));
        assert_eq!(module.texts[0].position.angle, Some(180.0));

        module.place(1.0, 2.0);
        assert_eq!(module.position, Some(Position::new(1.0, 2.0, Some(180.0))));
    }

    #[test]
    fn test_courtyard_follows_side() {
        let mut module = Module::new("C1");
        module.lines = vec![
            Line::new(Vec2D::new(0.0, 0.0), Vec2D::new(1.0, 0.0), "F.CrtYd"),
            Line::new(Vec2D::new(0.0, 0.0), Vec2D::new(1.0, 0.0), "F.SilkS"),
        ];
        module.circles = vec![Circle::new(Vec2D::new(0.0, 0.0), Vec2D::new(1.0, 0.0), "F.CrtYd")];

        assert_eq!(module.geometry().count(), 3);
        assert_eq!(module.courtyard().len(), 2);
        assert_eq!(module.elements_by_layer("F.SilkS").count(), 1);

        module.flip();

        assert_eq!(module.layer, "B.Cu");
        assert_eq!(module.courtyard().len(), 2);
        assert!(module
            .courtyard()
            .iter()
            .all(|g| g.layer() == Some("B.CrtYd")));
    }

    #[test]
    fn test_flip() {
        let mut module = module_with_pads(
            "(pad 1 smd rect (at 1 2) (layers F.Cu F.Paste))
             (fp_text reference R1 (at 0 -1) (layer F.SilkS))",
        );

        module.flip();

        assert_eq!(module.pads[0].layers, vec!["B.Cu", "B.Paste"]);
        assert_eq!(module.pads[0].position, Position::new(1.0, -2.0, None));
        assert_eq!(module.texts[0].layer, "B.SilkS");
        assert_eq!(module.texts[0].justify, Some(Justify::Mirror));

        let printed = module.serialize().unwrap();
        assert_eq!(Module::parse(&printed).unwrap(), module);
    }

    #[test]
    fn test_layer_is_a_required_copper_side() {
        assert!(Module::parse("(module name (layer F.SilkS))").is_err());
        assert!(Module::parse("(module name)").is_err());
    }
}
