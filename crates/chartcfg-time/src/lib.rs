//! Time expression engine for chartcfg date settings.
//!
//! A date-valued setting holds either an ISO-like literal or a calendar
//! keyword, followed by any number of signed interval summands:
//!
//! ```
//! use chartcfg_time::{TimeExpression, Zone};
//! use chrono::{TimeZone, Utc};
//!
//! let now = Utc.with_ymd_and_hms(2021, 6, 10, 15, 30, 0).unwrap();
//! let start = TimeExpression::parse("current_week - 1 day").unwrap();
//! let instant = start.evaluate_in(now, &Zone::default()).unwrap();
//! assert_eq!(instant.to_rfc3339(), "2021-06-06T00:00:00+00:00");
//! ```
//!
//! Interval settings use [`parse_interval`], which measures variable-length
//! units against a caller-supplied reference instant.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod calendar;
mod error;
mod expression;
mod lexer;
mod literal;
mod unit;
mod zoned;

pub use calendar::{is_vacation_day, is_working_day, CalendarKeyword};
pub use error::TimeError;
pub use expression::{parse_zone, Base, Sign, Summand, TimeExpression, Zone};
pub use lexer::{tokenize, TimeToken};
pub use literal::DateLiteral;
pub use unit::{parse_interval, shift, Interval, IntervalValue, TimeUnit};
pub use zoned::ZonedInstant;
