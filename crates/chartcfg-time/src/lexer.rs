//! Lexer for time expressions.

use logos::Logos;
use smol_str::SmolStr;

use crate::error::TimeError;

/// Time expression token kinds. Input is expected to be lowercase.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeToken {
    /// Spaces and tabs.
    #[regex(r"[ \t]+")]
    Whitespace,

    /// `yyyy-mm`, `yyyy-mm-dd` or a full `yyyy-mm-ddThh:mm[:ss[.f]][offset]`.
    ///
    /// An offset is `z` or `±hh:mm`/`±hhmm`, so a glued `+12 hour` stays a summand.
    #[regex(r"[0-9][0-9][0-9][0-9]-[0-9][0-9](-[0-9][0-9](t[0-9][0-9]:[0-9][0-9](:[0-9][0-9](\.[0-9]+)?)?(z|[+-][0-9][0-9]:?[0-9][0-9])?)?)?")]
    Date,

    /// `hh:mm[:ss[.f]][offset]`.
    #[regex(r"[0-9][0-9]:[0-9][0-9](:[0-9][0-9](\.[0-9]+)?)?(z|[+-][0-9][0-9]:?[0-9][0-9])?")]
    Time,

    /// Integer or decimal count (also a bare year).
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    /// Calendar keyword or unit name.
    #[regex(r"[a-z_]+")]
    Word,

    /// `+`
    #[token("+")]
    Plus,

    /// `-`
    #[token("-")]
    Minus,

    /// `*`
    #[token("*")]
    Star,
}

impl TimeToken {
    /// Returns true for whitespace.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        self == Self::Whitespace
    }
}

/// Splits `text` into significant tokens with their source slices.
pub fn tokenize(text: &str) -> Result<Vec<(TimeToken, &str)>, TimeError> {
    let mut lexer = TimeToken::lexer(text);
    let mut tokens = Vec::new();
    while let Some(kind) = lexer.next() {
        let Ok(kind) = kind else {
            return Err(TimeError::UnexpectedToken(SmolStr::new(lexer.slice())));
        };
        if !kind.is_trivia() {
            tokens.push((kind, lexer.slice()));
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TimeToken> {
        tokenize(text)
            .unwrap()
            .into_iter()
            .map(|(kind, _)| kind)
            .collect()
    }

    #[test]
    fn test_keyword_with_summand() {
        assert_eq!(
            kinds("current_day - 2 * day"),
            vec![
                TimeToken::Word,
                TimeToken::Minus,
                TimeToken::Number,
                TimeToken::Star,
                TimeToken::Word
            ]
        );
    }

    #[test]
    fn test_full_timestamp_is_one_token() {
        let tokens = tokenize("2021-03-28t02:30:00.125+02:00 + 1 hour").unwrap();
        assert_eq!(tokens[0], (TimeToken::Date, "2021-03-28t02:30:00.125+02:00"));
        assert_eq!(tokens[1].0, TimeToken::Plus);
    }

    #[test]
    fn test_glued_summand_is_not_an_offset() {
        let tokens = tokenize("2021-03-28t10:00+12 hour").unwrap();
        assert_eq!(tokens[0], (TimeToken::Date, "2021-03-28t10:00"));
        assert_eq!(tokens[1].0, TimeToken::Plus);
        assert_eq!(tokens[2], (TimeToken::Number, "12"));
        assert_eq!(tokens[3], (TimeToken::Word, "hour"));

        let tokens = tokenize("2021-03-28t10:00+1200").unwrap();
        assert_eq!(tokens, vec![(TimeToken::Date, "2021-03-28t10:00+1200")]);
    }

    #[test]
    fn test_date_then_time() {
        assert_eq!(
            kinds("2021-03-28 10:15z"),
            vec![TimeToken::Date, TimeToken::Time]
        );
    }

    #[test]
    fn test_glued_count_and_unit() {
        assert_eq!(
            kinds("now-15minute"),
            vec![
                TimeToken::Word,
                TimeToken::Minus,
                TimeToken::Number,
                TimeToken::Word
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        assert_eq!(
            tokenize("now / 2"),
            Err(TimeError::UnexpectedToken("/".into()))
        );
    }
}
