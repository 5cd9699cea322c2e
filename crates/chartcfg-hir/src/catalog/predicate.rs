//! Scope predicates for catalog overrides.
//!
//! ```text
//! predicate := term ("&&" term)*
//! term      := "!" term | "(" predicate ")" | test
//! test      := var ("==" | "!=") value
//!            | var ["not"] "in" "[" value ("," value)* "]"
//! var       := "widget" | "section"
//! value     := 'quoted' | "quoted" | word
//! ```

use logos::Logos;
use smol_str::SmolStr;
use thiserror::Error;

/// The variables an override can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeVar {
    /// `type` of the enclosing widget.
    Widget,
    /// Name of the section the setting is declared in.
    Section,
}

/// Values the predicate is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Scope<'a> {
    /// Section the setting is declared in.
    pub section: &'a str,
    /// Widget type, when known.
    pub widget: Option<&'a str>,
}

impl Scope<'_> {
    fn get(&self, var: ScopeVar) -> Option<&str> {
        match var {
            ScopeVar::Widget => self.widget,
            ScopeVar::Section => Some(self.section),
        }
    }
}

/// A parsed scope predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `var == value`
    Equals(ScopeVar, SmolStr),
    /// `var in [values]`
    In(ScopeVar, Vec<SmolStr>),
    /// `!predicate`
    Not(Box<Predicate>),
    /// `a && b && ...`
    All(Vec<Predicate>),
}

impl Predicate {
    /// Evaluates the predicate. An unknown variable value matches nothing.
    #[must_use]
    pub fn matches(&self, scope: &Scope<'_>) -> bool {
        match self {
            Self::Equals(var, value) => scope
                .get(*var)
                .is_some_and(|actual| actual.eq_ignore_ascii_case(value)),
            Self::In(var, values) => scope
                .get(*var)
                .is_some_and(|actual| values.iter().any(|value| actual.eq_ignore_ascii_case(value))),
            Self::Not(inner) => !inner.matches(scope),
            Self::All(parts) => parts.iter().all(|part| part.matches(scope)),
        }
    }
}

/// Why a predicate could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    /// A character outside the grammar.
    #[error("unexpected character '{0}'")]
    InvalidCharacter(SmolStr),
    /// A token that does not fit at this point.
    #[error("expected {expected}, found '{found}'")]
    Unexpected {
        /// What the parser expected.
        expected: &'static str,
        /// What it found.
        found: SmolStr,
    },
    /// The predicate ended early.
    #[error("unexpected end of predicate, expected {0}")]
    UnexpectedEnd(&'static str),
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum PredicateToken {
    #[regex(r"[ \t]+")]
    Whitespace,
    #[token("widget")]
    Widget,
    #[token("section")]
    Section,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("!")]
    Bang,
    #[token("&&")]
    AndAnd,
    #[token("not")]
    Not,
    #[token("in")]
    In,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[regex(r#"'[^']*'|"[^"]*""#)]
    Quoted,
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_\-]*")]
    Word,
}

type Token<'s> = (PredicateToken, &'s str);

/// Parses a predicate.
pub fn parse_predicate(text: &str) -> Result<Predicate, PredicateError> {
    let mut lexer = PredicateToken::lexer(text);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        match token {
            Ok(PredicateToken::Whitespace) => {}
            Ok(kind) => tokens.push((kind, lexer.slice())),
            Err(()) => return Err(PredicateError::InvalidCharacter(lexer.slice().into())),
        }
    }
    let mut parser = Parser { tokens, pos: 0 };
    let predicate = parser.predicate()?;
    match parser.peek() {
        None => Ok(predicate),
        Some((_, found)) => Err(PredicateError::Unexpected {
            expected: "'&&' or end of predicate",
            found: found.into(),
        }),
    }
}

struct Parser<'s> {
    tokens: Vec<Token<'s>>,
    pos: usize,
}

impl<'s> Parser<'s> {
    fn peek(&self) -> Option<Token<'s>> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token<'s>> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn expect(&mut self, kind: PredicateToken, expected: &'static str) -> Result<(), PredicateError> {
        match self.bump() {
            Some((found, _)) if found == kind => Ok(()),
            Some((_, found)) => Err(PredicateError::Unexpected {
                expected,
                found: found.into(),
            }),
            None => Err(PredicateError::UnexpectedEnd(expected)),
        }
    }

    fn predicate(&mut self) -> Result<Predicate, PredicateError> {
        let mut parts = vec![self.term()?];
        while matches!(self.peek(), Some((PredicateToken::AndAnd, _))) {
            self.bump();
            parts.push(self.term()?);
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            Predicate::All(parts)
        })
    }

    fn term(&mut self) -> Result<Predicate, PredicateError> {
        match self.peek() {
            Some((PredicateToken::Bang, _)) => {
                self.bump();
                Ok(Predicate::Not(Box::new(self.term()?)))
            }
            Some((PredicateToken::LParen, _)) => {
                self.bump();
                let inner = self.predicate()?;
                self.expect(PredicateToken::RParen, "')'")?;
                Ok(inner)
            }
            _ => self.test(),
        }
    }

    fn test(&mut self) -> Result<Predicate, PredicateError> {
        let var = match self.bump() {
            Some((PredicateToken::Widget, _)) => ScopeVar::Widget,
            Some((PredicateToken::Section, _)) => ScopeVar::Section,
            Some((_, found)) => {
                return Err(PredicateError::Unexpected {
                    expected: "'widget' or 'section'",
                    found: found.into(),
                })
            }
            None => return Err(PredicateError::UnexpectedEnd("'widget' or 'section'")),
        };
        match self.bump() {
            Some((PredicateToken::EqEq, _)) => Ok(Predicate::Equals(var, self.value()?)),
            Some((PredicateToken::NotEq, _)) => Ok(Predicate::Not(Box::new(Predicate::Equals(
                var,
                self.value()?,
            )))),
            Some((PredicateToken::In, _)) => Ok(Predicate::In(var, self.list()?)),
            Some((PredicateToken::Not, _)) => {
                self.expect(PredicateToken::In, "'in'")?;
                Ok(Predicate::Not(Box::new(Predicate::In(var, self.list()?))))
            }
            Some((_, found)) => Err(PredicateError::Unexpected {
                expected: "a comparison",
                found: found.into(),
            }),
            None => Err(PredicateError::UnexpectedEnd("a comparison")),
        }
    }

    fn list(&mut self) -> Result<Vec<SmolStr>, PredicateError> {
        self.expect(PredicateToken::LBracket, "'['")?;
        let mut values = vec![self.value()?];
        loop {
            match self.bump() {
                Some((PredicateToken::Comma, _)) => values.push(self.value()?),
                Some((PredicateToken::RBracket, _)) => return Ok(values),
                Some((_, found)) => {
                    return Err(PredicateError::Unexpected {
                        expected: "',' or ']'",
                        found: found.into(),
                    })
                }
                None => return Err(PredicateError::UnexpectedEnd("']'")),
            }
        }
    }

    fn value(&mut self) -> Result<SmolStr, PredicateError> {
        match self.bump() {
            Some((PredicateToken::Quoted, text)) => Ok(text[1..text.len() - 1].into()),
            // Bare words, including the keyword spellings used as values.
            Some((
                PredicateToken::Word
                | PredicateToken::Widget
                | PredicateToken::Section
                | PredicateToken::Not
                | PredicateToken::In,
                text,
            )) => Ok(text.into()),
            Some((_, found)) => Err(PredicateError::Unexpected {
                expected: "a value",
                found: found.into(),
            }),
            None => Err(PredicateError::UnexpectedEnd("a value")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope<'a>(section: &'a str, widget: Option<&'a str>) -> Scope<'a> {
        Scope { section, widget }
    }

    #[test]
    fn test_equality_and_membership() {
        let chart = parse_predicate("widget == 'chart'").unwrap();
        assert!(chart.matches(&scope("widget", Some("Chart"))));
        assert!(!chart.matches(&scope("widget", None)));

        let series = parse_predicate(r#"section in ["series", column]"#).unwrap();
        assert!(series.matches(&scope("column", None)));
        assert!(!series.matches(&scope("widget", None)));
    }

    #[test]
    fn test_negation_and_conjunction() {
        let predicate =
            parse_predicate("!(widget in ['pie', 'gauge']) && section != 'configuration'").unwrap();
        assert!(predicate.matches(&scope("widget", Some("chart"))));
        assert!(!predicate.matches(&scope("widget", Some("pie"))));
        assert!(!predicate.matches(&scope("configuration", Some("chart"))));

        let not_in = parse_predicate("widget not in [table]").unwrap();
        assert!(not_in.matches(&scope("series", Some("chart"))));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            parse_predicate("type == 'chart'"),
            Err(PredicateError::Unexpected {
                expected: "'widget' or 'section'",
                found: "type".into()
            })
        );
        assert_eq!(
            parse_predicate("widget in ['a'"),
            Err(PredicateError::UnexpectedEnd("']'"))
        );
        assert_eq!(
            parse_predicate("widget == chart || true"),
            Err(PredicateError::InvalidCharacter("|".into()))
        );
    }
}
