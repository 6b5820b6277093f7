//! KiCad S-Expression trees

use std::fmt::Display;

use kicad_sexpr_lexer::{Lexer, Position, Span, Token, TokenKind};
use thiserror::Error;

use crate::atom::{self, INDENT};
use crate::string::unescape;

pub type SexprList = Vec<Sexpr>;

/// One node of an S-expression tree together with the span it was read
/// from. Trees built in code carry a default span.
///
/// Equality only looks at the structure; spans are ignored so that a tree
/// read back from printed output compares equal to the one it came from.
#[derive(Debug, Clone)]
pub struct Sexpr {
    pub kind: SexprKind,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub enum SexprKind {
    List(SexprList),
    /// A bare atom
    Symbol(String),
    /// A double quoted atom, already unescaped
    String(String),
}

impl PartialEq for Sexpr {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Display for Sexpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", to_string(self))
    }
}

macro_rules! sexpr_as {
    ($fn_name:ident, $return_type:ty, $variant:ident) => {
        pub fn $fn_name(&self) -> Option<&$return_type> {
            if let SexprKind::$variant(value) = &self.kind {
                Some(value)
            } else {
                None
            }
        }
    };
}

macro_rules! sexpr_take {
    ($fn_name:ident, $return_type:ty, $variant:ident) => {
        pub fn $fn_name(self) -> Option<$return_type> {
            if let SexprKind::$variant(value) = self.kind {
                Some(value)
            } else {
                None
            }
        }
    };
}

macro_rules! sexpr_construct {
    ($fn_name:ident, $variant:ident) => {
        pub fn $fn_name(value: impl Into<String>) -> Self {
            Self::new(SexprKind::$variant(value.into()))
        }
    };
}

impl Sexpr {
    pub fn new(kind: SexprKind) -> Self {
        Self {
            kind,
            span: Span::default(),
        }
    }

    sexpr_as!(as_list, SexprList, List);
    sexpr_as!(as_symbol, String, Symbol);
    sexpr_as!(as_string, String, String);

    sexpr_take!(take_list, SexprList, List);
    sexpr_take!(take_symbol, String, Symbol);
    sexpr_take!(take_string, String, String);

    sexpr_construct!(symbol, Symbol);
    sexpr_construct!(string, String);

    /// Either kind of atom: the text of a symbol or of a quoted string
    pub fn as_atom(&self) -> Option<&str> {
        match &self.kind {
            SexprKind::Symbol(s) | SexprKind::String(s) => Some(s),
            SexprKind::List(_) => None,
        }
    }

    /// A text atom which is bare when that is unambiguous and quoted
    /// otherwise.
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();

        if atom::needs_quotes(&value) {
            Self::string(value)
        } else {
            Self::symbol(value)
        }
    }

    /// Takes a list of values and constructs a new [`SexprKind::List`].
    /// Crucially, the list argument takes in an array of [`Option`] values,
    /// which makes it very convenient to build a list with optional members.
    ///
    /// # Example
    ///
    /// ```
    /// use kicad_sexpr::Sexpr;
    ///
    /// let width: Option<&str> = None;
    ///
    /// assert_eq!(
    ///     Sexpr::list([
    ///         Some(Sexpr::symbol("1.0")),
    ///         width.map(Sexpr::symbol),
    ///         Some(Sexpr::string("two words")),
    ///     ]),
    ///     kicad_sexpr::from_str(r#"(1.0 "two words")"#).unwrap(),
    /// )
    /// ```
    pub fn list(value: impl Into<Vec<Option<Sexpr>>>) -> Self {
        Self::new(SexprKind::List(
            value.into().into_iter().flatten().collect::<Vec<_>>(),
        ))
    }

    /// Works the same way as [`Sexpr::list`], but puts the given name
    /// as a symbol in the first position of the list.
    ///
    /// # Example
    ///
    /// ```
    /// use kicad_sexpr::Sexpr;
    ///
    /// assert_eq!(
    ///     Sexpr::list_with_name("at", [
    ///         Some(Sexpr::symbol("1")),
    ///         Some(Sexpr::symbol("2")),
    ///     ]).to_string(),
    ///     "(at 1 2)",
    /// )
    /// ```
    pub fn list_with_name(name: impl Into<String>, values: impl Into<Vec<Option<Sexpr>>>) -> Self {
        let mut list = vec![Some(Self::symbol(name))];
        list.extend(values.into());
        Self::list(list)
    }

    /// The symbol at the head of a list, which names the list in KiCad files
    pub fn first_symbol(&self) -> Option<&str> {
        self.as_list()?.first()?.as_symbol().map(String::as_str)
    }

    pub fn position(&self) -> Position {
        self.span.position
    }

    /// A short rendering used in error messages
    pub fn describe(&self) -> String {
        match &self.kind {
            SexprKind::List(_) => match self.first_symbol() {
                Some(name) => format!("({name} ...)"),
                None => "(...)".to_string(),
            },
            SexprKind::Symbol(s) => s.clone(),
            SexprKind::String(s) => atom::quote(s),
        }
    }
}

/* ========= READING ========= */

/// Errors that can occur while reading a tree
#[derive(Debug, Error, PartialEq, Clone)]
pub enum SexprParseError {
    #[error(transparent)]
    Lexer(#[from] kicad_sexpr_lexer::Error),
    #[error("unexpected closing parenthesis (at {0})")]
    UnexpectedCloseParen(Position),
    #[error("list opened at {0} is never closed")]
    UnclosedList(Position),
    #[error("unexpected input after the end of the document (at {0})")]
    TrailingInput(Position),
}

impl SexprParseError {
    pub fn position(&self) -> Position {
        match self {
            Self::Lexer(e) => e.position,
            Self::UnexpectedCloseParen(p) | Self::UnclosedList(p) | Self::TrailingInput(p) => *p,
        }
    }
}

/// Reads a document, which must be exactly one parenthesized list.
pub fn from_str(input: &str) -> Result<Sexpr, SexprParseError> {
    let mut reader = Reader::new(input);

    let open = reader.lexer.expect_open_paren()?;
    let document = reader.read_list(open)?;

    if let Some(token) = reader.lexer.next() {
        return Err(SexprParseError::TrailingInput(token?.span.position));
    }

    Ok(document)
}

/// Reads any number of consecutive S-expressions, lists or atoms.
pub fn parse_fragment(input: &str) -> Result<SexprList, SexprParseError> {
    let mut reader = Reader::new(input);
    let mut result = Vec::new();

    while let Some(token) = reader.lexer.next() {
        result.push(reader.read_from(token?)?);
    }

    Ok(result)
}

struct Reader<'source> {
    lexer: Lexer<'source>,
}

impl<'source> Reader<'source> {
    fn new(input: &'source str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    fn read_from(&mut self, token: Token<'source>) -> Result<Sexpr, SexprParseError> {
        let kind = match token.kind {
            TokenKind::OpenParen => return self.read_list(token),
            TokenKind::CloseParen => {
                return Err(SexprParseError::UnexpectedCloseParen(token.span.position))
            }
            TokenKind::Symbol(symbol) => SexprKind::Symbol(symbol.to_string()),
            TokenKind::String(raw) => SexprKind::String(unescape(raw)),
        };

        Ok(Sexpr {
            kind,
            span: token.span,
        })
    }

    fn read_list(&mut self, open: Token<'source>) -> Result<Sexpr, SexprParseError> {
        let mut children = Vec::new();

        loop {
            let token = self
                .lexer
                .next()
                .ok_or(SexprParseError::UnclosedList(open.span.position))??;

            if token.kind == TokenKind::CloseParen {
                return Ok(Sexpr {
                    kind: SexprKind::List(children),
                    span: open.span.to(token.span),
                });
            }

            children.push(self.read_from(token)?);
        }
    }
}

/* ========= PRINTING ========= */

/// Renders a tree in the canonical layout: atoms are joined by single spaces
/// on the line of the list that holds them, every nested list starts on a
/// new line indented one level deeper than its parent.
pub fn to_string(sexpr: &Sexpr) -> String {
    let mut result = String::new();
    write_recursive(sexpr, 0, &mut result);
    result
}

fn write_recursive(sexpr: &Sexpr, depth: usize, result: &mut String) {
    match &sexpr.kind {
        SexprKind::List(list) => {
            result.push('(');

            for (i, child) in list.iter().enumerate() {
                if let SexprKind::List(_) = child.kind {
                    result.push('\n');
                    result.push_str(&INDENT.repeat(depth + 1));
                    write_recursive(child, depth + 1, result);
                } else {
                    if i != 0 {
                        result.push(' ');
                    }
                    write_recursive(child, depth, result);
                }
            }

            result.push(')');
        }
        SexprKind::Symbol(symbol) => result.push_str(symbol),
        SexprKind::String(string) => result.push_str(&atom::quote(string)),
    }
}
