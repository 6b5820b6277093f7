//! Recognizers for numeric atoms.
//!
//! These run over the text of a single symbol. Callers that need the whole
//! atom to be a number wrap them in [`nom::combinator::all_consuming`], see
//! the helpers in [`crate::atom`].

use nom::{
    bytes::complete::tag,
    character::complete::{digit1, hex_digit1},
    combinator::{map_res, opt, recognize},
    sequence::{pair, tuple},
    IResult,
};

/// `-?[0-9]+(\.[0-9]+)?` as an `f64`
pub fn parse_number(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((opt(tag("-")), digit1, opt(pair(tag("."), digit1))))),
        str::parse::<f64>,
    )(input)
}

/// `-?[0-9]+` as an `i64`
pub fn parse_integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(pair(opt(tag("-")), digit1)), str::parse::<i64>)(input)
}

/// A run of hexadecimal digits, kept as text
pub fn parse_hex(input: &str) -> IResult<&str, &str> {
    hex_digit1(input)
}
