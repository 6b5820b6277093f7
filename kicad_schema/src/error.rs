use std::fmt::Display;

use kicad_sexpr::{Position, SexprParseError};
use thiserror::Error;

/// The input does not match the grammar of the node type being parsed.
///
/// Always fatal to the parse call which produced it.
#[derive(Debug, PartialEq, Clone)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    /// Where in the input the mismatch was found
    pub position: Position,
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum SyntaxErrorKind {
    /// The text could not be read as an S-Expression tree at all
    #[error(transparent)]
    Tree(SexprParseError),
    #[error("Expected a list. Found: `{found}`")]
    ExpectedList { found: String },
    #[error("Non-matching tag. Expected: `{expected}`; Found: `{found}`")]
    NonMatchingTag { expected: String, found: String },
    #[error("Missing required field `{attr}`")]
    MissingField { attr: String },
    #[error("Invalid token. Expected: `{expected}`; Found: `{found}`")]
    InvalidToken { expected: String, found: String },
    #[error("Unexpected element `{found}`")]
    UnexpectedElement { found: String },
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

impl From<SexprParseError> for SyntaxError {
    fn from(error: SexprParseError) -> Self {
        Self {
            position: error.position(),
            kind: SyntaxErrorKind::Tree(error),
        }
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            // Tree errors already carry their position
            SyntaxErrorKind::Tree(e) => write!(f, "{e}"),
            kind => write!(f, "{kind} (at {})", self.position),
        }
    }
}

impl std::error::Error for SyntaxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            SyntaxErrorKind::Tree(e) => Some(e),
            _ => None,
        }
    }
}

/// A schema declaration is malformed, or a node holds a value its schema
/// cannot print. These are programming errors by whoever declared the
/// schema or built the node.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum SchemaError {
    #[error("Attribute `{attr}` is declared more than once in the schema of `{tag}`")]
    DuplicateAttribute { tag: String, attr: String },
    #[error("Field {index} of `{tag}` has neither an attribute name nor a tag")]
    UnnamedField { tag: String, index: usize },
    #[error("Empty alternative in the schema of `{tag}`")]
    EmptyAlternative { tag: String },
    #[error("Record `{record}` in the schema of `{tag}` must have a tag and occur at most once")]
    InvalidRecord { tag: String, record: String },
    #[error("Node field `{attr}` in the schema of `{tag}` must keep its tag")]
    TaglessNode { tag: String, attr: String },
    #[error("Value of `{attr}` does not fit its field. Found: `{value}`")]
    UnprintableValue { attr: String, value: String },
    #[error("Missing attribute `{attr}` required by `{tag}`")]
    MissingAttribute { tag: String, attr: String },
    #[error("Printer for `{attr}` produced malformed output: {reason}")]
    MalformedPrinterOutput { attr: String, reason: String },
}

/// Any error returned while parsing a document with a node type
#[derive(Debug, Error, PartialEq, Clone)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<SexprParseError> for Error {
    fn from(error: SexprParseError) -> Self {
        Self::Syntax(error.into())
    }
}
