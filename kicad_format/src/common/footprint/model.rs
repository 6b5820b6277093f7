use kicad_schema::{Field, Node, NodeType, Pattern, Record};
use once_cell::sync::Lazy;

use crate::{
    common::Vec3D,
    convert::{Element, NodeBuilder, NodeReader},
    KiCadParseError,
};

pub(crate) static MODEL: Lazy<NodeType> = Lazy::new(|| {
    // `(at (xyz X Y Z))`, stored under the outer tag
    let transform = |tag: &str| {
        Field::record(
            tag,
            Record::new().field(Field::leaf("xyz", Pattern::numbers(3)).attr(tag)),
        )
    };

    NodeType::new(
        "model",
        Record::new()
            .positional(Field::positional("path", Pattern::Text))
            .field(transform("at"))
            .field(transform("scale"))
            .field(transform("rotate")),
    )
});

/// A 3D model attached to a footprint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone)]
pub struct Model {
    pub path: String,
    pub at: Option<Vec3D>,
    pub scale: Option<Vec3D>,
    pub rotate: Option<Vec3D>,
}

impl Model {
    /// A model at the origin, unscaled and unrotated
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            at: Some(Vec3D::default()),
            scale: Some(Vec3D::new(1.0, 1.0, 1.0)),
            rotate: Some(Vec3D::default()),
        }
    }
}

impl Element for Model {
    fn node_type() -> &'static NodeType {
        &MODEL
    }

    fn from_node(node: &Node) -> Result<Self, KiCadParseError> {
        let reader = NodeReader::new(node, &MODEL)?;

        Ok(Self {
            path: reader.expect("path")?,
            at: reader.maybe("at")?,
            scale: reader.maybe("scale")?,
            rotate: reader.maybe("rotate")?,
        })
    }

    fn to_node(&self) -> Node {
        NodeBuilder::new(&MODEL)
            .set("path", &self.path)
            .set_opt("at", self.at.as_ref())
            .set_opt("scale", self.scale.as_ref())
            .set_opt("rotate", self.rotate.as_ref())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model() {
        let model = Model::parse(
            "(model path
                (at (xyz 10 0 0))
                (scale (xyz 0 0 0))
                (rotate (xyz 0 0 0)))",
        )
        .unwrap();

        assert_eq!(model.path, "path");
        assert_eq!(model.at, Some(Vec3D::new(10.0, 0.0, 0.0)));
        assert_eq!(model.scale, Some(Vec3D::new(0.0, 0.0, 0.0)));
        assert_eq!(model.rotate, Some(Vec3D::new(0.0, 0.0, 0.0)));
        assert_eq!(Model::parse(&model.serialize().unwrap()).unwrap(), model);
    }

    #[test]
    fn test_model_layout() {
        let model = Model::new("${KISYS3DMOD}/Resistors_SMD.3dshapes/R_0805.wrl");

        assert_eq!(
            model.serialize().unwrap(),
            "(model ${KISYS3DMOD}/Resistors_SMD.3dshapes/R_0805.wrl\n    \
            (at\n        (xyz 0.0000000000 0.0000000000 0.0000000000))\n    \
            (scale\n        (xyz 1.0000000000 1.0000000000 1.0000000000))\n    \
            (rotate\n        (xyz 0.0000000000 0.0000000000 0.0000000000)))"
        );
    }
}
