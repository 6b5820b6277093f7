//! PCB board file format (`.kicad_pcb` files)

use kicad_schema::{Field, Node, NodeType, Pattern, Record, Value};
use once_cell::sync::Lazy;

use crate::{
    common::{
        footprint::{Module, MODULE},
        net::NET,
        Net, NetNumbering,
    },
    convert::{Element, FromValue, NodeBuilder, NodeReader, ToValue},
    KiCadParseError,
};

pub mod net_class;

pub use net_class::NetClass;

use net_class::NET_CLASS;

pub(crate) static PCB: Lazy<NodeType> = Lazy::new(|| {
    let count = |tag: &str| Field::leaf(tag, Pattern::Integer).attr(format!("num_{tag}"));
    let text = |tag: &str| Field::leaf(tag, Pattern::Text);
    let comment = |n: usize| {
        Field::leaf(
            "comment",
            Pattern::seq([Pattern::keyword(n.to_string()), Pattern::Text]),
        )
        .attr(format!("comment{n}"))
    };

    let general = Record::new()
        .field(Field::leaf("thickness", Pattern::Number))
        .fields(["drawings", "tracks", "zones", "modules", "nets"].map(count));

    let title_block = Record::new()
        .fields(["title", "date", "rev", "company"].map(text))
        .fields((1..=4).map(comment));

    NodeType::new(
        "kicad_pcb",
        Record::new()
            .positional(Field::leaf("version", Pattern::Integer))
            .positional(Field::leaf("host", Pattern::seq([Pattern::Text, Pattern::Text])))
            .field(Field::record("general", general))
            .field(
                Field::leaf(
                    "page",
                    Pattern::alt([Pattern::numbers(2), Pattern::Text]),
                )
                .attr("page_type"),
            )
            .field(Field::record("title_block", title_block))
            .field(Field::node("nets", &NET).multiple())
            .field(Field::node("net_classes", &NET_CLASS).multiple())
            .field(Field::node("modules", &MODULE).multiple()),
    )
});

/// A PCB board file (`.kicad_pcb` file).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, PartialEq, Clone)]
pub struct Pcb {
    pub version: i64,
    /// The program that wrote the file and its version
    pub host: (String, String),
    pub general: General,
    pub page: Option<PageSize>,
    pub title_block: TitleBlock,
    pub nets: Vec<Net>,
    pub net_classes: Vec<NetClass>,
    pub modules: Vec<Module>,
}

impl Default for Pcb {
    fn default() -> Self {
        Self {
            version: 4,
            host: (
                "kicad_format".to_string(),
                env!("CARGO_PKG_VERSION").to_string(),
            ),
            general: General::default(),
            page: None,
            title_block: TitleBlock::default(),
            nets: Vec::new(),
            net_classes: Vec::new(),
            modules: Vec::new(),
        }
    }
}

impl Pcb {
    /// Numbering for new nets, continuing after the nets of the board
    pub fn net_numbering(&self) -> NetNumbering {
        NetNumbering::continuing(&self.nets)
    }

    /// Adds a net with the next free code and returns it
    pub fn add_net(&mut self, name: impl Into<String>) -> Net {
        let net = Net::auto(&mut self.net_numbering(), name);
        self.nets.push(net.clone());
        net
    }

    pub fn net_by_name(&self, name: &str) -> Option<&Net> {
        self.nets.iter().find(|net| net.name == name)
    }
}

impl Element for Pcb {
    fn node_type() -> &'static NodeType {
        &PCB
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &PCB)?;

        let [host, host_version]: [String; 2] = reader
            .expect::<Vec<String>>("host")?
            .try_into()
            .map_err(|found: Vec<String>| KiCadParseError::UnexpectedValue {
                attr: "kicad_pcb.host".to_string(),
                expected: "two words",
                found: format!("{found:?}"),
            })?;

        Ok(Self {
            version: reader.expect("version")?,
            host: (host, host_version),
            general: General {
                thickness: reader.maybe("thickness")?,
                drawings: reader.maybe("num_drawings")?,
                tracks: reader.maybe("num_tracks")?,
                zones: reader.maybe("num_zones")?,
                modules: reader.maybe("num_modules")?,
                nets: reader.maybe("num_nets")?,
            },
            page: reader.maybe("page_type")?,
            title_block: TitleBlock {
                title: reader.maybe("title")?,
                date: reader.maybe("date")?,
                revision: reader.maybe("rev")?,
                company: reader.maybe("company")?,
                comments: [
                    reader.maybe("comment1")?,
                    reader.maybe("comment2")?,
                    reader.maybe("comment3")?,
                    reader.maybe("comment4")?,
                ],
            },
            nets: reader.many_elements("nets")?,
            net_classes: reader.many_elements("net_classes")?,
            modules: reader.many_elements("modules")?,
        })
    }

    fn to_node(&self) -> Node {
        let general = &self.general;
        let title_block = &self.title_block;

        let [comment1, comment2, comment3, comment4] = title_block.comments.each_ref();

        NodeBuilder::new(&PCB)
            .set("version", &self.version)
            .set("host", &vec![self.host.0.clone(), self.host.1.clone()])
            .set_opt("thickness", general.thickness.as_ref())
            .set_opt("num_drawings", general.drawings.as_ref())
            .set_opt("num_tracks", general.tracks.as_ref())
            .set_opt("num_zones", general.zones.as_ref())
            .set_opt("num_modules", general.modules.as_ref())
            .set_opt("num_nets", general.nets.as_ref())
            .set_opt("page_type", self.page.as_ref())
            .set_opt("title", title_block.title.as_ref())
            .set_opt("date", title_block.date.as_ref())
            .set_opt("rev", title_block.revision.as_ref())
            .set_opt("company", title_block.company.as_ref())
            .set_opt("comment1", comment1.as_ref())
            .set_opt("comment2", comment2.as_ref())
            .set_opt("comment3", comment3.as_ref())
            .set_opt("comment4", comment4.as_ref())
            .many_elements("nets", &self.nets)
            .many_elements("net_classes", &self.net_classes)
            .many_elements("modules", &self.modules)
            .finish()
    }
}

/// The `(general ..)` block. The counts are informational, KiCad rewrites
/// them on save.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone, Default)]
pub struct General {
    pub thickness: Option<f64>,
    pub drawings: Option<i64>,
    pub tracks: Option<i64>,
    pub zones: Option<i64>,
    pub modules: Option<i64>,
    pub nets: Option<i64>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone, Default)]
pub struct TitleBlock {
    pub title: Option<String>,
    pub date: Option<String>,
    pub revision: Option<String>,
    pub company: Option<String>,
    /// `(comment 1 ..)` through `(comment 4 ..)`
    pub comments: [Option<String>; 4],
}

/// The paper the board is drawn on
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone)]
pub enum PageSize {
    /// A named size such as `A4`
    Standard(String),
    /// Width and height in millimetres
    Custom(f64, f64),
}

impl FromValue for PageSize {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(name) => Some(Self::Standard(name.clone())),
            value => match value.to_numbers()?.as_slice() {
                [width, height] => Some(Self::Custom(*width, *height)),
                _ => None,
            },
        }
    }
}

impl ToValue for PageSize {
    fn to_value(&self) -> Value {
        match self {
            Self::Standard(name) => Value::Text(name.clone()),
            Self::Custom(width, height) => Value::from([*width, *height]),
        }
    }
}
