//! Schemas and typed elements for KiCad footprint (`.kicad_mod`) and board
//! (`.kicad_pcb`) files.
//!
//! Every element is declared once as a [`kicad_schema::NodeType`] and paired
//! with a plain struct implementing [`convert::Element`], which converts
//! between the generic node the engine parses and the typed representation.

use std::path::PathBuf;

use common::footprint::Module;
use convert::Element;
use kicad_schema::SchemaError;
use pcb::Pcb;
use thiserror::Error;

pub mod common;
pub mod convert;
pub mod geometry;
pub mod library;
pub mod pcb;

/// Errors that can occur when reading KiCad files.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum KiCadParseError {
    #[error(transparent)]
    Engine(#[from] kicad_schema::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("Missing attribute `{attr}` on `{tag}`")]
    MissingAttribute { tag: String, attr: String },
    #[error("Unexpected value for `{attr}`. Expected: `{expected}`; Found: `{found}`")]
    UnexpectedValue {
        attr: String,
        expected: &'static str,
        found: String,
    },
    #[error("Non-matching node. Expected: `{expected}`; Found: `{found}`")]
    NonMatchingNode { expected: String, found: String },
    #[error("Invalid value `{value}` for enum `{enum_name}`.")]
    InvalidEnumValue {
        value: String,
        enum_name: &'static str,
    },
    #[error("Could not read `{}`: {message}", path.display())]
    Io { path: PathBuf, message: String },
    #[error("Library search path is not set. Set `KISYSMOD` to a list of footprint directories")]
    MissingLibraryPath,
    #[error("Library `{0}` not found on the search path")]
    LibraryNotFound(String),
    #[error("Module `{module}` not found in library `{library}`")]
    ModuleNotFound { library: String, module: String },
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

impl KiCadParseError {
    pub fn invalid_enum_value<T>(value: impl Into<String>) -> Self {
        Self::InvalidEnumValue {
            value: value.into(),
            enum_name: std::any::type_name::<T>(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: error.to_string(),
        }
    }
}

/// Implements string conversion for an enum of bare keywords, along with the
/// value conversions used by the element readers and the
/// [`kicad_schema::Pattern::OneOf`] matching the keywords.
macro_rules! simple_to_from_string {
    ($name:ident, $( $string:ident <-> $variant:ident ),+ $(,)?) => {
        impl $name {
            pub const KEYWORDS: &'static [&'static str] = &[$( stringify!($string) ),*];

            /// Matches any one of [`Self::KEYWORDS`]
            pub fn pattern() -> ::kicad_schema::Pattern {
                ::kicad_schema::Pattern::one_of(Self::KEYWORDS.iter().copied())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::KiCadParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(match s {
                    $(
                        stringify!($string) => Self::$variant,
                    )*
                    _ => return Err($crate::KiCadParseError::invalid_enum_value::<Self>(s)),
                })
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.to_string()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $(
                        Self::$variant => stringify!($string),
                    )*
                })
            }
        }

        impl $crate::convert::FromValue for $name {
            fn from_value(value: &::kicad_schema::Value) -> Option<Self> {
                value.as_text()?.parse().ok()
            }
        }

        impl $crate::convert::ToValue for $name {
            fn to_value(&self) -> ::kicad_schema::Value {
                ::kicad_schema::Value::Text(self.to_string())
            }
        }
    };
}

pub(crate) use simple_to_from_string;

/* Exposed APIs */

/// Parses a footprint (`.kicad_mod`) file from a string.
pub fn parse_module_file(input: &str) -> Result<Module, KiCadParseError> {
    Module::parse(input)
}

/// Serializes a footprint to the text of a `.kicad_mod` file.
pub fn serialize_module_file(module: &Module) -> Result<String, KiCadParseError> {
    module.serialize()
}

/// Parses a PCB file from a string.
pub fn parse_pcb_file(input: &str) -> Result<Pcb, KiCadParseError> {
    Pcb::parse(input)
}

/// Serializes a PCB file to a string.
pub fn serialize_pcb_file(pcb: &Pcb) -> Result<String, KiCadParseError> {
    pcb.serialize()
}
