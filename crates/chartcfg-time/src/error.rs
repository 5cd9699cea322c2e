//! Errors produced while parsing or evaluating time expressions.

use smol_str::SmolStr;
use thiserror::Error;

/// Time expression errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// Nothing to parse.
    #[error("empty time expression")]
    Empty,

    /// A word in base position that is not a calendar keyword.
    #[error("unknown calendar keyword '{0}'")]
    UnknownKeyword(SmolStr),

    /// A date/time literal with out-of-range components.
    #[error("invalid date '{0}'")]
    InvalidLiteral(SmolStr),

    /// A token that does not fit the grammar at this point.
    #[error("unexpected '{0}'")]
    UnexpectedToken(SmolStr),

    /// A sign that is not followed by a count.
    #[error("expected a count after '{0}'")]
    MissingCount(SmolStr),

    /// A word in unit position that is not a time unit.
    #[error("unknown time unit '{0}'")]
    UnknownUnit(SmolStr),

    /// Months, quarters and years only take whole counts.
    #[error("'{0}' requires a whole count")]
    FractionalCount(SmolStr),

    /// Arithmetic left the representable date range.
    #[error("date out of range")]
    OutOfRange,

    /// Not a recognised time zone name.
    #[error("unknown time zone '{0}'")]
    UnknownZone(SmolStr),

    /// Not `<count> <unit>` or `all`.
    #[error("invalid interval '{0}'")]
    InvalidInterval(SmolStr),
}
