//! Common (shared) types within the KiCad Sexpr file format.

use kicad_schema::{Pattern, Value};

use crate::convert::{FromValue, ToValue};

pub mod footprint;
pub mod net;
pub mod pad;

pub use net::{Net, NetNumbering};

/// Generic position type used in many parts of the format.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct Position {
    /// The `X` attribute defines the horizontal position of the object.
    pub x: f64,
    /// The `Y` attribute defines the vertical position of the object.
    pub y: f64,
    /// The optional `ANGLE` attribute defines the rotational angle of the object.
    /// Not all objects have rotational position definitions.
    pub angle: Option<f64>,
}

impl Position {
    pub fn new(x: f64, y: f64, angle: Option<f64>) -> Self {
        Self { x, y, angle }
    }

    /// `X Y [ANGLE]`, as found in `(at ...)`
    pub fn pattern() -> Pattern {
        Pattern::seq([
            Pattern::Number,
            Pattern::Number,
            Pattern::optional(Pattern::Number),
        ])
    }

    /// Adds to the angle, setting it if there was none
    pub fn rotate(&mut self, angle: f64) {
        self.angle = Some(self.angle.unwrap_or(0.0) + angle);
    }
}

impl FromValue for Position {
    fn from_value(value: &Value) -> Option<Self> {
        match value.to_numbers()?.as_slice() {
            [x, y] => Some(Self::new(*x, *y, None)),
            [x, y, angle] => Some(Self::new(*x, *y, Some(*angle))),
            _ => None,
        }
    }
}

impl ToValue for Position {
    fn to_value(&self) -> Value {
        let mut numbers = vec![self.x, self.y];
        numbers.extend(self.angle);
        Value::from(numbers)
    }
}

// ############################################################################

/// A single coordinate pair
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct Vec2D {
    pub x: f64,
    pub y: f64,
}

impl Vec2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Mirrors the point across the X axis
    pub fn flip(&mut self) {
        self.y = -self.y;
    }
}

impl FromValue for Vec2D {
    fn from_value(value: &Value) -> Option<Self> {
        match value.to_numbers()?.as_slice() {
            [x, y] => Some(Self::new(*x, *y)),
            _ => None,
        }
    }
}

impl ToValue for Vec2D {
    fn to_value(&self) -> Value {
        Value::from([self.x, self.y])
    }
}

// ############################################################################

/// A single 3D coordinate pair
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct Vec3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl FromValue for Vec3D {
    fn from_value(value: &Value) -> Option<Self> {
        match value.to_numbers()?.as_slice() {
            [x, y, z] => Some(Self::new(*x, *y, *z)),
            _ => None,
        }
    }
}

impl ToValue for Vec3D {
    fn to_value(&self) -> Value {
        Value::from([self.x, self.y, self.z])
    }
}

// ############################################################################

/// Moves a layer to the other side of the board: `F.Cu` becomes `B.Cu` and
/// back. Layers without a side (`Edge.Cuts`, `*.Cu`) are returned as is.
pub fn flip_layer(layer: &str) -> String {
    match layer.split_once('.') {
        Some(("F", name)) => format!("B.{name}"),
        Some(("B", name)) => format!("F.{name}"),
        _ => layer.to_string(),
    }
}

/// The side prefix of a layer name (`F` for `F.Cu`)
pub fn layer_side(layer: &str) -> &str {
    layer.split('.').next().unwrap_or(layer)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("F.Cu", "B.Cu")]
    #[case("B.SilkS", "F.SilkS")]
    #[case("F.CrtYd", "B.CrtYd")]
    #[case("Edge.Cuts", "Edge.Cuts")]
    #[case("*.Cu", "*.Cu")]
    #[case("Dwgs.User", "Dwgs.User")]
    fn test_flip_layer(#[case] layer: &str, #[case] expected: &str) {
        assert_eq!(flip_layer(layer), expected);
        assert_eq!(flip_layer(&flip_layer(layer)), layer);
    }

    #[test]
    fn test_position_values() {
        let value = Value::from([1.0, 2.0]);
        assert_eq!(Position::from_value(&value), Some(Position::new(1.0, 2.0, None)));

        let value = Value::from([1.0, 2.0, 90.0]);
        let position = Position::from_value(&value).unwrap();
        assert_eq!(position.angle, Some(90.0));
        assert_eq!(position.to_value(), value);

        assert_eq!(Position::from_value(&Value::from(1.0)), None);
    }

    #[test]
    fn test_rotate_sets_missing_angle() {
        let mut position = Position::default();

        position.rotate(45.0);
        assert_eq!(position.angle, Some(45.0));

        position.rotate(45.0);
        assert_eq!(position.angle, Some(90.0));
    }
}
