//! A schema engine for KiCad-style S-Expression formats.
//!
//! A format is described declaratively, one [`NodeType`] per kind of list:
//! its tag, the positional fields that follow the tag in a fixed order and
//! the named fields that may follow in any order. Each node type compiles its
//! schema once into the structures used both to parse documents into generic
//! [`Node`]s and to print nodes back into canonical text, so that
//! `parse(print(parse(text))) == parse(text)` for every valid document.

pub use error::*;
pub use kicad_sexpr::{Position, Sexpr};
pub use node::{Node, NodeType};
pub use pattern::Pattern;
pub use schema::{Field, Printer, Record, Schema};
pub use value::Value;

mod compile;
mod error;
mod node;
mod parse;
mod pattern;
mod print;
mod schema;
mod value;
