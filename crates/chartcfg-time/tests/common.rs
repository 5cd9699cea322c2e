//! Shared helpers for time expression tests.
#![allow(dead_code, unused_imports)]

pub use chartcfg_time::{parse_zone, TimeError, TimeExpression, Zone};
use chrono::{DateTime, TimeZone, Utc};

/// A fixed "now": Thursday 2021-06-10 15:30 UTC.
pub fn thursday_afternoon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 6, 10, 15, 30, 0).unwrap()
}

/// Evaluates `text` at `now` in the zone named `zone`, rendered as RFC 3339.
pub fn eval_at(text: &str, now: DateTime<Utc>, zone: &str) -> Result<String, TimeError> {
    let zone = parse_zone(zone)?;
    TimeExpression::parse(text)?
        .evaluate_in(now, &zone)
        .map(|instant| instant.to_rfc3339())
}

/// Renders one `expression => result` line per input.
pub fn render(inputs: &[&str], now: DateTime<Utc>, zone: &str) -> String {
    let mut out = String::new();
    for input in inputs {
        let result = match eval_at(input, now, zone) {
            Ok(instant) => instant,
            Err(err) => format!("error: {err}"),
        };
        out.push_str(&format!("{input} => {result}\n"));
    }
    out
}
