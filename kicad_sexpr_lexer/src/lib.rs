//! This crate implements a zero-copy lexer for KiCad-style S-Expression
//! files. Every token carries a byte span and a 1-based line/column position
//! so that grammar errors further up the stack can point at the offending
//! input.

use std::{iter::Peekable, str::Chars};

pub use token::*;

mod token;

/// An error that can occur during lexing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (at {position})")]
pub struct Error {
    /// The kind of error which was encountered
    pub kind: ErrorKind,
    /// The position in the source file associated with the error (different
    /// meaning for different error kinds)
    pub position: Position,
}

/// An kind of error which can be encountered while lexing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /* Expectations */
    /// We expected to find a `(` token but found something else
    #[error("expected opening parenthesis")]
    ExpectedOpenParen,
    /// We expected to find a `)` token but found something else
    #[error("expected closing parenthesis")]
    ExpectedCloseParen,
    /// We expected to find a symbol token but found something else
    #[error("expected a symbol")]
    ExpectedSymbol,
    /// We expected to find a delimited string token but found something else
    #[error("expected a string")]
    ExpectedString,
    /* Strings */
    /// A string was opened with a `"`, but we reached the end of the file
    /// before finding a matching unescaped `"`
    #[error("expected string to terminate but reached EOF")]
    UnterminatedString,
}

/// A zero-copy lexer for KiCad-style S-Expressions. Lexer implements
/// [`Iterator`] as well as offering helper functions like
/// [`expect_open_paren`](Self::expect_open_paren) for convenient
/// implementation of tree readers.
pub struct Lexer<'source> {
    source: &'source str,
    /// Byte offset of the next character
    position: usize,
    /// 1-based line of the next character
    line: usize,
    /// 1-based column of the next character
    column: usize,
    chars: Peekable<Chars<'source>>,
    previous: Option<Token<'source>>,
    has_errored: bool,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            position: 0,
            line: 1,
            column: 1,
            previous: None,
            has_errored: false,
        }
    }

    /// Returns true if the lexer has reached the end of it's input stream
    pub fn is_eof(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Returns a reference to the input stream
    pub fn source(&self) -> &'source str {
        self.source
    }

    /// Returns the position of the next character to be lexed
    pub fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Returns the source text covered by a span
    pub fn slice(&self, span: Span) -> &'source str {
        &self.source[span.start..span.end]
    }

    /// Returns the token which was returned by the last call to
    /// [`Self::next`] or `None`.
    pub fn previous(&self) -> Option<&Token<'source>> {
        self.previous.as_ref()
    }
}

/* Helper functions for reader implementations */

macro_rules! expect_helper {
    ($name:ident, $error_kind:ident, $pattern:pat) => {
        paste::paste! {
            pub fn [<expect_ $name>](&mut self) -> Result<Token<'source>, Error> {
                let error = self.create_error(ErrorKind::$error_kind);

                let token = self.next().ok_or(error.clone())??;

                if !matches!(token.kind, TokenKind::$pattern) {
                    return Err(Error {
                        position: token.span.position,
                        ..error
                    });
                }

                Ok(token)
            }
        }
    };
}

impl<'source> Lexer<'source> {
    expect_helper!(open_paren, ExpectedOpenParen, OpenParen);
    expect_helper!(close_paren, ExpectedCloseParen, CloseParen);
    expect_helper!(symbol, ExpectedSymbol, Symbol(_));
    expect_helper!(string, ExpectedString, String(_));
}

/* Helper functions for lexing the input */

impl<'source> Lexer<'source> {
    fn create_error(&self, kind: ErrorKind) -> Error {
        Error {
            kind,
            position: self.current_position(),
        }
    }

    fn create_span(&self, start: usize, position: Position) -> Span {
        Span::new(start, self.position, position)
    }

    fn consume_char(&mut self) -> Option<char> {
        let c = self.chars.next()?;

        self.position += c.len_utf8();
        self.column += 1;

        if c == '\n' {
            self.line += 1;
            self.column = 1;
        }

        Some(c)
    }

    fn ignore_whitespace(&mut self) {
        while let Some(c) = self.chars.peek().copied() {
            if !c.is_whitespace() {
                break;
            }

            self.consume_char();
        }
    }

    fn read_single(&mut self, kind: TokenKind<'source>) -> Token<'source> {
        let start = self.position;
        let position = self.current_position();

        self.consume_char();

        Token {
            kind,
            span: self.create_span(start, position),
        }
    }

    fn read_string(&mut self) -> Result<Token<'source>, Error> {
        let start = self.position;
        let position = self.current_position();

        // Opening quote
        self.consume_char();

        while let Some(c) = self.consume_char() {
            match c {
                // An escape always covers the next character, whatever it is
                '\\' => {
                    self.consume_char();
                }
                '"' => {
                    let span = self.create_span(start, position);
                    let value = &self.source[span.start + 1..span.end - 1];

                    return Ok(Token {
                        kind: TokenKind::String(value),
                        span,
                    });
                }
                _ => {}
            }
        }

        Err(Error {
            kind: ErrorKind::UnterminatedString,
            position,
        })
    }

    fn read_until_separator(&mut self) -> Span {
        let start = self.position;
        let position = self.current_position();

        while let Some(c) = self.chars.peek().copied() {
            if c.is_whitespace() || c == '(' || c == ')' {
                break;
            }

            self.consume_char();
        }

        self.create_span(start, position)
    }
}

impl<'source> Iterator for Lexer<'source> {
    type Item = Result<Token<'source>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_errored {
            return None;
        }

        self.ignore_whitespace();

        let c = self.chars.peek().copied()?;

        let token = match c {
            // List delimiters
            '(' => self.read_single(TokenKind::OpenParen),
            ')' => self.read_single(TokenKind::CloseParen),

            // Try to read a delimited string
            '"' => match self.read_string() {
                Ok(v) => v,
                Err(e) => {
                    self.has_errored = true;
                    return Some(Err(e));
                }
            },

            // All other values
            _ => {
                let span = self.read_until_separator();

                Token {
                    kind: TokenKind::Symbol(&self.source[span.start..span.end]),
                    span,
                }
            }
        };

        self.previous = Some(token.clone());
        Some(Ok(token))
    }
}
