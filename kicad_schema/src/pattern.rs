//! The primitive value grammar.
//!
//! A [`Pattern`] describes the atoms that make up one attribute value, for
//! example the two numbers in `(at 1 2)` or the optional `oval` keyword in
//! `(drill oval 0.6 0.8)`. Patterns are matched against the atoms of a list
//! while parsing, and the values of a node are fitted back onto the same
//! pattern while printing.

use std::fmt::Display;

use kicad_sexpr::{atom, Sexpr, SexprKind};

use crate::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// A bare symbol or a quoted string
    Text,
    /// `-?[0-9]+(\.[0-9]+)?`, printed with a fixed number of decimals
    Number,
    /// `-?[0-9]+`
    Integer,
    /// A run of hexadecimal digits, kept as text
    Hex,
    /// A bare keyword which means `true` when present
    Flag(String),
    /// `yes` or `no`
    YesNo,
    /// `true` or `false`
    TrueFalse,
    /// Exactly one of the given bare words, kept as text
    OneOf(Vec<String>),
    /// A bare keyword which must be present and produces no value
    Keyword(String),
    Seq(Vec<Pattern>),
    /// Ordered choice: the first alternative that matches wins
    Alt(Vec<Pattern>),
    Optional(Box<Pattern>),
    /// One or more repetitions, always producing a list
    Many(Box<Pattern>),
}

impl Pattern {
    pub fn flag(keyword: impl Into<String>) -> Self {
        Self::Flag(keyword.into())
    }

    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self::Keyword(keyword.into())
    }

    pub fn one_of<S: Into<String>>(words: impl IntoIterator<Item = S>) -> Self {
        Self::OneOf(words.into_iter().map(Into::into).collect())
    }

    pub fn seq(items: impl Into<Vec<Pattern>>) -> Self {
        Self::Seq(items.into())
    }

    pub fn alt(items: impl Into<Vec<Pattern>>) -> Self {
        Self::Alt(items.into())
    }

    pub fn optional(pattern: Pattern) -> Self {
        Self::Optional(Box::new(pattern))
    }

    pub fn many(pattern: Pattern) -> Self {
        Self::Many(Box::new(pattern))
    }

    /// Shorthand for a sequence of `count` numbers, the most common composite
    /// leaf (`(at 1 2)`, `(size 0.2 0.2)`, `(xyz 0 0 0)`)
    pub fn numbers(count: usize) -> Self {
        Self::Seq(vec![Self::Number; count])
    }

    pub fn is_flag(&self) -> bool {
        matches!(self, Self::Flag(_))
    }

    /// Whether some part of the pattern is an empty [`Pattern::Alt`]
    pub(crate) fn has_empty_alternative(&self) -> bool {
        match self {
            Self::Alt(items) => items.is_empty() || items.iter().any(Self::has_empty_alternative),
            Self::Seq(items) => items.iter().any(Self::has_empty_alternative),
            Self::Optional(p) | Self::Many(p) => p.has_empty_alternative(),
            _ => false,
        }
    }
}

/* ========= MATCHING ========= */

/// One way a pattern can match the atoms starting at some index
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Matched {
    /// Index of the first atom after the match
    pub next: usize,
    pub values: Vec<Value>,
    /// A repetition took part in the match
    pub plural: bool,
}

impl Matched {
    fn empty(at: usize) -> Self {
        Self {
            next: at,
            values: Vec::new(),
            plural: false,
        }
    }

    fn then(&self, rest: Matched) -> Matched {
        let mut values = self.values.clone();
        values.extend(rest.values);

        Matched {
            next: rest.next,
            values,
            plural: self.plural || rest.plural,
        }
    }

    /// A scalar when exactly one value was matched outside of a repetition,
    /// otherwise a list
    pub fn into_value(mut self) -> Value {
        if self.values.len() == 1 && !self.plural {
            self.values.remove(0)
        } else {
            Value::List(self.values)
        }
    }
}

impl Pattern {
    /// Every way the pattern matches `atoms` starting at index `at`, in order
    /// of preference.
    pub(crate) fn matches(&self, atoms: &[Sexpr], at: usize) -> Vec<Matched> {
        match self {
            Self::Seq(items) => {
                let mut results = vec![Matched::empty(at)];

                for item in items {
                    results = results
                        .into_iter()
                        .flat_map(|m| {
                            item.matches(atoms, m.next)
                                .into_iter()
                                .map(move |rest| m.then(rest))
                        })
                        .collect();
                }

                results
            }
            Self::Alt(items) => items.iter().flat_map(|p| p.matches(atoms, at)).collect(),
            Self::Optional(p) => {
                let mut results = p.matches(atoms, at);
                results.push(Matched::empty(at));
                results
            }
            Self::Many(p) => {
                let mut results = Vec::new();

                for first in p.matches(atoms, at) {
                    if first.next == at {
                        continue;
                    }

                    for rest in self.matches(atoms, first.next) {
                        results.push(first.then(rest));
                    }
                    results.push(first);
                }

                for m in &mut results {
                    m.plural = true;
                }

                results
            }
            primitive => atoms
                .get(at)
                .and_then(|sexpr| primitive.match_atom(sexpr))
                .map(|values| Matched {
                    next: at + 1,
                    values,
                    plural: false,
                })
                .into_iter()
                .collect(),
        }
    }

    /// The index of the first atom no attempt to match could get past.
    /// Used to point syntax errors at the offending atom.
    pub(crate) fn reach(&self, atoms: &[Sexpr], at: usize) -> usize {
        match self {
            Self::Seq(items) => {
                let mut states = vec![Matched::empty(at)];
                let mut furthest = at;

                for item in items {
                    for state in &states {
                        furthest = furthest.max(item.reach(atoms, state.next));
                    }

                    states = states
                        .iter()
                        .flat_map(|m| item.matches(atoms, m.next))
                        .collect();

                    if states.is_empty() {
                        break;
                    }
                }

                states.iter().map(|m| m.next).fold(furthest, usize::max)
            }
            Self::Alt(items) => items.iter().map(|p| p.reach(atoms, at)).fold(at, usize::max),
            Self::Optional(p) => p.reach(atoms, at),
            Self::Many(p) => self
                .matches(atoms, at)
                .iter()
                .map(|m| p.reach(atoms, m.next))
                .fold(p.reach(atoms, at), usize::max),
            _ => self.matches(atoms, at).iter().map(|m| m.next).fold(at, usize::max),
        }
    }

    fn match_atom(&self, sexpr: &Sexpr) -> Option<Vec<Value>> {
        if let Self::Text = self {
            return sexpr.as_atom().map(|s| vec![Value::Text(s.to_string())]);
        }

        // Everything else only ever matches a bare symbol
        let symbol = sexpr.as_symbol()?.as_str();

        let value = match self {
            Self::Number => Value::Number(atom::to_number(symbol)?),
            Self::Integer => Value::Int(atom::to_integer(symbol)?),
            Self::Hex if atom::is_hex(symbol) => Value::Text(symbol.to_string()),
            Self::Flag(keyword) if keyword == symbol => Value::Bool(true),
            Self::YesNo => Value::Bool(parse_bool_pair(symbol, "yes", "no")?),
            Self::TrueFalse => Value::Bool(parse_bool_pair(symbol, "true", "false")?),
            Self::OneOf(words) if words.iter().any(|w| w == symbol) => {
                Value::Text(symbol.to_string())
            }
            Self::Keyword(keyword) if keyword == symbol => return Some(Vec::new()),
            _ => return None,
        };

        Some(vec![value])
    }
}

fn parse_bool_pair(symbol: &str, yes: &str, no: &str) -> Option<bool> {
    match symbol {
        s if s == yes => Some(true),
        s if s == no => Some(false),
        _ => None,
    }
}

/* ========= FITTING ========= */

/// One way a list of values can be printed with a pattern
#[derive(Debug, Clone)]
struct Fitted {
    /// Index of the first value not consumed
    next: usize,
    atoms: Vec<Sexpr>,
    plural: bool,
}

impl Fitted {
    fn empty(at: usize) -> Self {
        Self {
            next: at,
            atoms: Vec::new(),
            plural: false,
        }
    }

    fn then(&self, rest: Fitted) -> Fitted {
        let mut atoms = self.atoms.clone();
        atoms.extend(rest.atoms);

        Fitted {
            next: rest.next,
            atoms,
            plural: self.plural || rest.plural,
        }
    }
}

impl Pattern {
    /// Renders a value as the atoms this pattern would have matched to
    /// produce it, or `None` if no derivation of the pattern produces it.
    ///
    /// The shape has to agree as well: a scalar only fits a derivation which
    /// yields exactly one value outside of a repetition, a list only fits
    /// one which yields a list.
    pub fn fit(&self, value: &Value) -> Option<Vec<Sexpr>> {
        let (items, is_list) = match value {
            Value::List(items) => (items.as_slice(), true),
            value => (std::slice::from_ref(value), false),
        };

        self.fits(items, 0)
            .into_iter()
            .find(|f| f.next == items.len() && is_list == (f.plural || f.next != 1))
            .map(|f| f.atoms)
    }

    fn fits(&self, items: &[Value], at: usize) -> Vec<Fitted> {
        match self {
            Self::Keyword(keyword) => vec![Fitted {
                next: at,
                atoms: vec![Sexpr::symbol(keyword.as_str())],
                plural: false,
            }],
            Self::Seq(patterns) => {
                let mut results = vec![Fitted::empty(at)];

                for pattern in patterns {
                    results = results
                        .into_iter()
                        .flat_map(|f| {
                            pattern
                                .fits(items, f.next)
                                .into_iter()
                                .map(move |rest| f.then(rest))
                        })
                        .collect();
                }

                results
            }
            Self::Alt(patterns) => patterns.iter().flat_map(|p| p.fits(items, at)).collect(),
            Self::Optional(p) => {
                let mut results = p.fits(items, at);
                results.push(Fitted::empty(at));
                results
            }
            Self::Many(p) => {
                let mut results = Vec::new();

                for first in p.fits(items, at) {
                    if first.next == at {
                        continue;
                    }

                    for rest in self.fits(items, first.next) {
                        results.push(first.then(rest));
                    }
                    results.push(first);
                }

                for f in &mut results {
                    f.plural = true;
                }

                results
            }
            primitive => items
                .get(at)
                .and_then(|item| primitive.fit_item(item))
                .map(|atom| Fitted {
                    next: at + 1,
                    atoms: vec![atom],
                    plural: false,
                })
                .into_iter()
                .collect(),
        }
    }

    fn fit_item(&self, item: &Value) -> Option<Sexpr> {
        let atom = match (self, item) {
            (Self::Text, Value::Text(text)) => Sexpr::text(text.as_str()),
            (Self::Number, value) => Sexpr::symbol(atom::format_number(value.as_number()?)),
            (Self::Integer, Value::Int(i)) => Sexpr::symbol(atom::format_integer(*i)),
            (Self::Integer, Value::Number(n)) if n.fract() == 0.0 && n.is_finite() => {
                Sexpr::symbol(atom::format_integer(*n as i64))
            }
            (Self::Hex, Value::Text(text)) if atom::is_hex(text) => Sexpr::symbol(text.as_str()),
            (Self::Flag(keyword), Value::Bool(true)) => Sexpr::symbol(keyword.as_str()),
            (Self::YesNo, Value::Bool(b)) => Sexpr::symbol(if *b { "yes" } else { "no" }),
            (Self::TrueFalse, Value::Bool(b)) => Sexpr::symbol(if *b { "true" } else { "false" }),
            (Self::OneOf(words), Value::Text(text)) if words.contains(text) => {
                Sexpr::symbol(text.as_str())
            }
            _ => return None,
        };

        Some(atom)
    }
}

/// Whether a sexpr is an atom rather than a list
pub(crate) fn is_atom(sexpr: &Sexpr) -> bool {
    !matches!(sexpr.kind, SexprKind::List(_))
}

impl Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let join = |items: &[Pattern], separator: &str| {
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(separator)
        };

        match self {
            Self::Text => write!(f, "text"),
            Self::Number => write!(f, "number"),
            Self::Integer => write!(f, "integer"),
            Self::Hex => write!(f, "hex"),
            Self::Flag(keyword) | Self::Keyword(keyword) => write!(f, "{keyword}"),
            Self::YesNo => write!(f, "yes|no"),
            Self::TrueFalse => write!(f, "true|false"),
            Self::OneOf(words) => write!(f, "{}", words.join("|")),
            Self::Seq(items) => write!(f, "{}", join(items, " ")),
            Self::Alt(items) => write!(f, "({})", join(items, " | ")),
            Self::Optional(p) => write!(f, "[{p}]"),
            Self::Many(p) => write!(f, "{p}..."),
        }
    }
}
