//! Whole-atom recognizers and the canonical rendering of atoms.

use nom::combinator::all_consuming;

use crate::number::{parse_hex, parse_integer, parse_number};

/// Number of digits printed after the decimal point. Consumers of the
/// generated files compare the text, so this is fixed.
pub const NUMBER_PRECISION: usize = 10;

/// One level of indentation in the canonical layout
pub const INDENT: &str = "    ";

/// The atom as a number, if the whole atom is one
pub fn to_number(atom: &str) -> Option<f64> {
    all_consuming(parse_number)(atom).ok().map(|(_, n)| n)
}

/// The atom as an integer, if the whole atom is one
pub fn to_integer(atom: &str) -> Option<i64> {
    all_consuming(parse_integer)(atom).ok().map(|(_, n)| n)
}

/// Whether the whole atom is a run of hexadecimal digits
pub fn is_hex(atom: &str) -> bool {
    all_consuming(parse_hex)(atom).is_ok()
}

pub fn format_number(number: f64) -> String {
    format!("{:.*}", NUMBER_PRECISION, number)
}

pub fn format_integer(integer: i64) -> String {
    integer.to_string()
}

/// Whether a piece of text has to be quoted to survive a round trip
pub fn needs_quotes(text: &str) -> bool {
    text.is_empty()
        || text
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '(' | ')' | '"' | '\\'))
}

/// Wraps text in double quotes, escaping `"` and `\`
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);

    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');

    quoted
}

/// Renders text bare when that is unambiguous, quoted otherwise
pub fn format_text(text: &str) -> String {
    if needs_quotes(text) {
        quote(text)
    } else {
        text.to_string()
    }
}
