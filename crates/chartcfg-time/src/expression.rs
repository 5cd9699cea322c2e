//! Time expressions: `base (sign count [*] unit)*`.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::calendar::CalendarKeyword;
use crate::error::TimeError;
use crate::lexer::{tokenize, TimeToken};
use crate::literal::DateLiteral;
use crate::unit::TimeUnit;
use crate::zoned::{add_minutes, ZonedInstant};

/// The starting point of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    /// A calendar keyword, resolved against "now".
    Keyword(CalendarKeyword),
    /// An explicit date or time.
    Literal(DateLiteral),
}

/// Direction of a summand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    /// `+`
    Plus,
    /// `-`
    Minus,
}

/// One `sign count unit` term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summand {
    /// Direction.
    pub sign: Sign,
    /// Unsigned count.
    pub count: f64,
    /// Unit of the count.
    pub unit: TimeUnit,
}

impl Summand {
    fn signed_count(&self) -> f64 {
        match self.sign {
            Sign::Plus => self.count,
            Sign::Minus => -self.count,
        }
    }
}

/// A parsed time expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeExpression {
    /// Starting point.
    pub base: Base,
    /// Terms applied to the base, left to right.
    pub summands: Vec<Summand>,
}

static PARSE_CACHE: Lazy<RwLock<FxHashMap<SmolStr, Result<Arc<TimeExpression>, TimeError>>>> =
    Lazy::new(|| RwLock::new(FxHashMap::default()));

impl TimeExpression {
    /// Parses `text` (case-insensitive).
    pub fn parse(text: &str) -> Result<Self, TimeError> {
        let lowered = text.trim().to_ascii_lowercase();
        let tokens = tokenize(&lowered)?;
        let mut tokens = tokens.into_iter().peekable();

        let base = match tokens.next() {
            None => return Err(TimeError::Empty),
            Some((TimeToken::Word, word)) => CalendarKeyword::from_name(word)
                .map(Base::Keyword)
                .ok_or_else(|| TimeError::UnknownKeyword(word.into()))?,
            Some((TimeToken::Date, date)) => {
                let time = match tokens.peek() {
                    Some((TimeToken::Time, time)) => {
                        let time = *time;
                        tokens.next();
                        Some(time)
                    }
                    _ => None,
                };
                Base::Literal(DateLiteral::from_date(date, time)?)
            }
            Some((TimeToken::Time, time)) => Base::Literal(DateLiteral::from_time(time)?),
            Some((TimeToken::Number, number)) => Base::Literal(DateLiteral::from_year(number)?),
            Some((_, other)) => return Err(TimeError::UnexpectedToken(other.into())),
        };

        let mut summands = Vec::new();
        while let Some((kind, slice)) = tokens.next() {
            let sign = match kind {
                TimeToken::Plus => Sign::Plus,
                TimeToken::Minus => Sign::Minus,
                _ => return Err(TimeError::UnexpectedToken(slice.into())),
            };
            let count = match tokens.next() {
                Some((TimeToken::Number, number)) => number
                    .parse::<f64>()
                    .map_err(|_| TimeError::MissingCount(slice.into()))?,
                _ => return Err(TimeError::MissingCount(slice.into())),
            };
            if matches!(tokens.peek(), Some((TimeToken::Star, _))) {
                tokens.next();
            }
            let unit = match tokens.next() {
                Some((TimeToken::Word, word)) => {
                    TimeUnit::from_name(word).ok_or_else(|| TimeError::UnknownUnit(word.into()))?
                }
                Some((_, other)) => return Err(TimeError::UnknownUnit(other.into())),
                None => return Err(TimeError::UnknownUnit(SmolStr::default())),
            };
            summands.push(Summand { sign, count, unit });
        }

        Ok(Self { base, summands })
    }

    /// Parses through the process-wide cache keyed by the normalized text.
    pub fn parse_cached(text: &str) -> Result<Arc<Self>, TimeError> {
        let key = SmolStr::new(text.trim().to_ascii_lowercase());
        if let Some(cached) = PARSE_CACHE.read().get(&key) {
            return cached.clone();
        }
        tracing::trace!(expression = %key, "time expression cache miss");
        let parsed = Self::parse(&key).map(Arc::new);
        PARSE_CACHE.write().insert(key, parsed.clone());
        parsed
    }

    /// True when the result changes with the moment of evaluation.
    #[must_use]
    pub fn depends_on_now(&self) -> bool {
        match &self.base {
            Base::Keyword(_) => true,
            Base::Literal(literal) => literal.date.is_none(),
        }
    }

    /// Evaluates the expression at `now` in `zone`.
    pub fn evaluate<Z: TimeZone>(
        &self,
        now: DateTime<Utc>,
        zone: &Z,
    ) -> Result<DateTime<FixedOffset>, TimeError> {
        let mut instant = match &self.base {
            Base::Keyword(CalendarKeyword::Now) => {
                ZonedInstant::from_utc(now.naive_utc(), zone.clone())?
            }
            Base::Keyword(keyword) => {
                let mut instant = ZonedInstant::from_utc(now.naive_utc(), zone.clone())?;
                instant.set_local(keyword.resolve(instant.local()))?;
                instant
            }
            Base::Literal(literal) => {
                let today = ZonedInstant::from_utc(now.naive_utc(), zone.clone())?
                    .local()
                    .date();
                let local = literal.local(today);
                match literal.offset_minutes {
                    Some(offset) => {
                        ZonedInstant::from_utc(add_minutes(local, -offset)?, zone.clone())?
                    }
                    None => ZonedInstant::from_local(local, zone.clone())?,
                }
            }
        };
        for summand in &self.summands {
            instant.shift(summand.unit, summand.signed_count())?;
        }
        instant.to_fixed()
    }

    /// Evaluates the expression in a configured [`Zone`].
    pub fn evaluate_in(
        &self,
        now: DateTime<Utc>,
        zone: &Zone,
    ) -> Result<DateTime<FixedOffset>, TimeError> {
        match zone {
            Zone::Local => self.evaluate(now, &Local),
            Zone::Named(tz) => self.evaluate(now, tz),
        }
    }
}

/// A time zone named by a `timezone` setting or the validator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The zone of the host (`local`, `browser`).
    Local,
    /// A named IANA zone (`utc` included).
    Named(Tz),
}

impl Default for Zone {
    fn default() -> Self {
        Self::Named(Tz::UTC)
    }
}

impl FromStr for Zone {
    type Err = TimeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        parse_zone(text)
    }
}

/// Parses a zone name, ignoring case.
pub fn parse_zone(text: &str) -> Result<Zone, TimeError> {
    let name = text.trim();
    match name.to_ascii_lowercase().as_str() {
        "utc" | "gmt" | "z" => Ok(Zone::Named(Tz::UTC)),
        "local" | "browser" => Ok(Zone::Local),
        _ => Tz::from_str_insensitive(name)
            .map(Zone::Named)
            .map_err(|_| TimeError::UnknownZone(name.into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keyword_with_summands() {
        let expression = TimeExpression::parse("Previous_Day - 2 * hour + 30minute").unwrap();
        assert_eq!(expression.base, Base::Keyword(CalendarKeyword::PreviousDay));
        assert_eq!(
            expression.summands,
            vec![
                Summand {
                    sign: Sign::Minus,
                    count: 2.0,
                    unit: TimeUnit::Hour
                },
                Summand {
                    sign: Sign::Plus,
                    count: 30.0,
                    unit: TimeUnit::Minute
                },
            ]
        );
        assert!(expression.depends_on_now());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(TimeExpression::parse("  "), Err(TimeError::Empty));
        assert_eq!(
            TimeExpression::parse("someday"),
            Err(TimeError::UnknownKeyword("someday".into()))
        );
        assert_eq!(
            TimeExpression::parse("now - day"),
            Err(TimeError::MissingCount("-".into()))
        );
        assert_eq!(
            TimeExpression::parse("now + 1 fortnight"),
            Err(TimeError::UnknownUnit("fortnight".into()))
        );
        assert_eq!(
            TimeExpression::parse("now 1 day"),
            Err(TimeError::UnexpectedToken("1".into()))
        );
    }

    #[test]
    fn test_cache_returns_same_result() {
        let first = TimeExpression::parse_cached("2020-01-01 + 1 day").unwrap();
        let second = TimeExpression::parse_cached(" 2020-01-01 + 1 DAY ").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(TimeExpression::parse_cached("tomorrow +").is_err());
        assert!(TimeExpression::parse_cached("tomorrow +").is_err());
    }

    #[test]
    fn test_zone_names() {
        assert_eq!(parse_zone("UTC"), Ok(Zone::Named(Tz::UTC)));
        assert_eq!(parse_zone("browser"), Ok(Zone::Local));
        assert_eq!(
            parse_zone("europe/berlin"),
            Ok(Zone::Named(chrono_tz::Europe::Berlin))
        );
        assert_eq!(
            parse_zone("mars/olympus"),
            Err(TimeError::UnknownZone("mars/olympus".into()))
        );
    }
}
