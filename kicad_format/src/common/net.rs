use kicad_schema::{Field, Node, NodeType, Pattern, Record};
use once_cell::sync::Lazy;

use crate::{
    convert::{Element, NodeBuilder, NodeReader},
    KiCadParseError,
};

pub(crate) static NET: Lazy<NodeType> = Lazy::new(|| {
    NodeType::new(
        "net",
        Record::new()
            .positional(Field::positional("code", Pattern::Integer))
            .positional(Field::positional("name", Pattern::Text)),
    )
});

/// A net connecting pads, `(net CODE NAME)`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone)]
pub struct Net {
    pub code: i64,
    pub name: String,
}

impl Net {
    pub fn new(code: i64, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }

    /// A net with the next free code of `numbering`
    pub fn auto(numbering: &mut NetNumbering, name: impl Into<String>) -> Self {
        Self::new(numbering.next_code(), name)
    }
}

impl Element for Net {
    fn node_type() -> &'static NodeType {
        &NET
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &NET)?;

        Ok(Self {
            code: reader.expect("code")?,
            name: reader.expect("name")?,
        })
    }

    fn to_node(&self) -> Node {
        NodeBuilder::new(&NET)
            .set("code", &self.code)
            .set("name", &self.name)
            .finish()
    }
}

/// Hands out net codes for nets created without one.
///
/// Each board keeps its own numbering, so codes only need to be unique within
/// the context they were created in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetNumbering {
    next: i64,
}

impl NetNumbering {
    /// Numbering starting at 1; code 0 is the unconnected net
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Numbering continuing after the highest code in use
    pub fn continuing(nets: &[Net]) -> Self {
        let highest = nets.iter().map(|net| net.code).max().unwrap_or(0);

        Self {
            next: highest.max(0) + 1,
        }
    }

    pub fn next_code(&mut self) -> i64 {
        let code = self.next;
        self.next += 1;
        code
    }
}

impl Default for NetNumbering {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_auto_numbering() {
        let mut numbering = NetNumbering::new();

        let n1 = Net::auto(&mut numbering, "");
        let n2 = Net::auto(&mut numbering, "");
        let n3 = Net::auto(&mut numbering, "");

        assert_eq!(n1.code, 1);
        assert_eq!(n2.code, 2);
        assert_eq!(n3.code, 3);
    }

    #[test]
    fn test_numbering_is_per_context() {
        let mut a = NetNumbering::new();
        let mut b = NetNumbering::new();

        assert_eq!(a.next_code(), 1);
        assert_eq!(a.next_code(), 2);
        assert_eq!(b.next_code(), 1);
    }

    #[test]
    fn test_continuing() {
        let nets = [Net::new(0, ""), Net::new(7, "GND"), Net::new(3, "VCC")];
        let mut numbering = NetNumbering::continuing(&nets);

        assert_eq!(Net::auto(&mut numbering, "SDA"), Net::new(8, "SDA"));
        assert_eq!(NetNumbering::continuing(&[]), NetNumbering::new());
    }

    #[test]
    fn test_net_round_trip() {
        let net = Net::parse(r#"(net 2 "Net-(R1-Pad1)")"#).unwrap();

        assert_eq!(net, Net::new(2, "Net-(R1-Pad1)"));
        assert_eq!(net.serialize().unwrap(), r#"(net 2 "Net-(R1-Pad1)")"#);

        let unconnected = Net::new(0, "");
        assert_eq!(unconnected.serialize().unwrap(), r#"(net 0 "")"#);
        assert_eq!(Net::parse(&unconnected.serialize().unwrap()).unwrap(), unconnected);
    }
}
