use std::fmt::Display;

/// A token which has been lexed from the input source
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token<'source> {
    #[cfg_attr(feature = "serde", serde(borrow))]
    pub kind: TokenKind<'source>,
    pub span: Span,
}

/// A type of token which we can lex
///
/// Numbers are not distinguished from other symbols here. Whether `0.8` is a
/// number, an integer, a hex stamp or a plain word depends on the grammar
/// rule that consumes it, so that decision is left to the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(rename_all = "snake_case", tag = "type", content = "value")
)]
pub enum TokenKind<'source> {
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,

    /// A bare run of characters which are neither whitespace nor parentheses
    Symbol(&'source str),
    /// The raw (still escaped) contents of a double quoted string, without
    /// the surrounding quotes
    String(&'source str),
}

macro_rules! as_helper {
    ($name:ident, $variant:ident, $ty:ty) => {
        paste::paste! {
            pub fn [<as_ $name>](&self) -> Option<$ty> {
              if let Self::$variant(v) = self {
                  Some(*v)
              } else {
                  None
              }
            }

            #[track_caller]
            pub fn [<expect_ $name>](&self) -> $ty {
                self.[<as_ $name>]().unwrap()
            }
        }
    };
}

impl<'source> TokenKind<'source> {
    as_helper!(symbol, Symbol, &'source str);
    as_helper!(string, String, &'source str);

    /// Returns true for `(` and `)`
    pub fn is_paren(&self) -> bool {
        matches!(self, Self::OpenParen | Self::CloseParen)
    }
}

/// A 1-based line and column within the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A start and end position within the source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// The byte index of the first character (inclusive)
    pub start: usize,
    /// The byte index of the last character (exclusive)
    pub end: usize,
    /// Line and column of the first character
    pub position: Position,
}

impl Span {
    pub fn new(start: usize, end: usize, position: Position) -> Self {
        Self {
            start,
            end,
            position,
        }
    }

    /// Joins two spans into one which covers both of them. The position of
    /// the result is the position of `self`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            position: self.position,
        }
    }
}
