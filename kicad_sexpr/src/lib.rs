//! S-Expression trees for KiCad-style files.
//!
//! This crate sits between the token level ([`kicad_sexpr_lexer`]) and the
//! schema level: it reads a document into a [`Sexpr`] tree whose nodes
//! remember where they came from, recognizes primitive atoms (numbers,
//! integers, hex stamps) and renders trees back into the canonical layout.

pub mod atom;
mod number;
mod sexpr;
mod string;

pub use kicad_sexpr_lexer::{Position, Span};
pub use number::{parse_hex, parse_integer, parse_number};
pub use sexpr::*;
pub use string::{parse_string, unescape};
