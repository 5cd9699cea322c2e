//! Value grammar checks, one per [`ValueType`].

use chartcfg_syntax::TextRange;
use chartcfg_time::{parse_interval, parse_zone, TimeExpression, Zone};
use chrono::{DateTime, Utc};

use super::Setting;
use crate::catalog::{Bound, SettingDescriptor, ValueType};
use crate::diagnostics::{Diagnostic, DiagnosticCode};

/// Spellings accepted by boolean settings.
pub const BOOLEAN_VALUES: &[&str] = &[
    "true", "false", "yes", "no", "on", "off", "1", "0", "null", "none",
];

/// Settings whose value must name a time zone.
const ZONE_SETTINGS: &[&str] = &["timezone"];

/// The one interval setting that still accepts a bare number of seconds.
const LEGACY_SECONDS_INTERVAL: &str = "update-interval";

/// The moment and zone date values are evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct DateContext {
    /// "Now" for relative expressions.
    pub now: DateTime<Utc>,
    /// Zone in scope at the setting.
    pub zone: Zone,
}

/// Checks one declared value of `setting`.
///
/// Computed values (`${...}`, `@{...}`) are never checked. At most one
/// diagnostic is returned. A date that fails to parse or evaluate marks the
/// setting as broken so later date comparisons skip it.
#[must_use]
pub fn check_value(setting: &Setting, value: &TextRange, dates: &DateContext) -> Option<Diagnostic> {
    let text = value.as_str();
    if super::is_computed(text) {
        return None;
    }
    let descriptor = setting.descriptor.as_ref();
    let name = descriptor.name.as_str();
    if text.is_empty() {
        return Some(Diagnostic::at(
            DiagnosticCode::InvalidValue,
            &setting.name,
            format!("{name} must not be empty"),
        ));
    }

    let invalid = |message: String| Some(Diagnostic::at(DiagnosticCode::InvalidValue, value, message));

    if ZONE_SETTINGS.contains(&name) {
        return match parse_zone(text) {
            Ok(_) => None,
            Err(err) => invalid(format!("{name}: {err}")),
        };
    }

    match descriptor.value_type {
        ValueType::String => check_string(descriptor, text).and_then(invalid),
        ValueType::Number | ValueType::Integer => check_number(descriptor, text).and_then(invalid),
        ValueType::Boolean => {
            if BOOLEAN_VALUES.contains(&text) {
                None
            } else {
                invalid(format!(
                    "{name} must be one of: {}",
                    BOOLEAN_VALUES.join(", ")
                ))
            }
        }
        ValueType::Enum => check_enum(descriptor, value),
        ValueType::Interval => check_interval(descriptor, value),
        ValueType::Date => match TimeExpression::parse_cached(text)
            .and_then(|expression| expression.evaluate_in(dates.now, &dates.zone))
        {
            Ok(_) => None,
            Err(err) => {
                setting.mark_broken();
                Some(Diagnostic::at(
                    DiagnosticCode::InvalidDate,
                    value,
                    format!("{name}: {err}"),
                ))
            }
        },
        ValueType::Object => match serde_json::from_str::<serde_json::Value>(text) {
            Ok(serde_json::Value::Object(_) | serde_json::Value::Array(_)) => None,
            Ok(_) => Some(Diagnostic::at(
                DiagnosticCode::InvalidObject,
                value,
                format!("{name} must be an object or an array"),
            )),
            Err(err) => Some(Diagnostic::at(
                DiagnosticCode::InvalidObject,
                value,
                format!("{name} is not a valid object: {err}"),
            )),
        },
    }
}

fn check_string(descriptor: &SettingDescriptor, text: &str) -> Option<String> {
    let name = &descriptor.name;
    if !descriptor.enum_values.is_empty() {
        let unknown = split_list(text)
            .into_iter()
            .find(|token| !descriptor.enum_contains(token))?;
        return Some(format!(
            "'{unknown}' is not a valid {name}, expected one of: {}",
            descriptor.enum_values.join(", ")
        ));
    }
    let pattern = descriptor.pattern.as_ref()?;
    if pattern.is_match(text) {
        return None;
    }
    Some(match &descriptor.example {
        Some(example) => format!("{name} has an invalid format, for example: {example}"),
        None => format!("{name} has an invalid format"),
    })
}

fn check_number(descriptor: &SettingDescriptor, text: &str) -> Option<String> {
    let name = &descriptor.name;
    let (number, factor) = match text.strip_suffix('%') {
        Some(number) if descriptor.percent => (number.trim_end(), 100.0),
        _ => (text, 1.0),
    };
    let integer = descriptor.value_type == ValueType::Integer;
    let well_formed = if integer {
        is_integer(number)
    } else {
        is_decimal(number)
    };
    let parsed = well_formed.then(|| number.parse::<f64>().ok()).flatten();
    let Some(parsed) = parsed else {
        let expected = if integer { "an integer" } else { "a number" };
        return Some(format!("{name} must be {expected}, found '{text}'"));
    };

    let min = descriptor.min.map(|bound| bound.scaled(factor));
    let max = descriptor.max.map(|bound| bound.scaled(factor));
    let fits = min.map_or(true, |bound| bound.admits_from_below(parsed))
        && max.map_or(true, |bound| bound.admits_from_above(parsed));
    if fits {
        None
    } else {
        Some(format!("{name} must be {}", describe_bounds(min, max)))
    }
}

fn describe_bounds(min: Option<Bound>, max: Option<Bound>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!(
            "in range {}{}, {}{}",
            if min.excluded { '(' } else { '[' },
            min.value,
            max.value,
            if max.excluded { ')' } else { ']' }
        ),
        (Some(min), None) if min.excluded => format!("greater than {}", min.value),
        (Some(min), None) => format!("greater than or equal to {}", min.value),
        (None, Some(max)) if max.excluded => format!("less than {}", max.value),
        (None, Some(max)) => format!("less than or equal to {}", max.value),
        (None, None) => "a number".to_string(),
    }
}

fn check_enum(descriptor: &SettingDescriptor, value: &TextRange) -> Option<Diagnostic> {
    let name = &descriptor.name;
    let text = value.as_str();
    if descriptor.enum_contains(text) {
        return None;
    }
    if descriptor.enum_contains("percentile") {
        if let Some(inner) = text
            .strip_prefix("percentile")
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return check_percentile(inner.trim(), value);
        }
        if let Some(rank) = text.strip_prefix("percentile_") {
            if let Some(diagnostic) = check_percentile(rank, value) {
                return Some(diagnostic);
            }
            return Some(Diagnostic::at(
                DiagnosticCode::DeprecatedSetting,
                value,
                format!("{text} is deprecated, use percentile({rank}) instead"),
            ));
        }
    }
    Some(Diagnostic::at(
        DiagnosticCode::InvalidValue,
        value,
        format!(
            "'{text}' is not a valid {name}, expected one of: {}",
            descriptor.enum_values.join(", ")
        ),
    ))
}

fn check_percentile(rank: &str, value: &TextRange) -> Option<Diagnostic> {
    let in_range = is_decimal(rank)
        && rank
            .parse::<f64>()
            .is_ok_and(|rank| (0.0..=100.0).contains(&rank));
    if in_range {
        None
    } else {
        Some(Diagnostic::at(
            DiagnosticCode::InvalidValue,
            value,
            format!("percentile rank must be between 0 and 100, found '{rank}'"),
        ))
    }
}

fn check_interval(descriptor: &SettingDescriptor, value: &TextRange) -> Option<Diagnostic> {
    let name = &descriptor.name;
    let text = value.as_str();
    if parse_interval(text).is_ok() || descriptor.enum_contains(text) {
        return None;
    }
    if is_integer(text) && name == LEGACY_SECONDS_INTERVAL {
        return Some(Diagnostic::at(
            DiagnosticCode::DeprecatedSetting,
            value,
            format!("{name} without a unit is deprecated, use '{text} second' instead"),
        ));
    }
    let mut message = format!("{name} must be an interval such as '1 hour' or 'all'");
    if !descriptor.enum_values.is_empty() {
        message.push_str(", or one of: ");
        message.push_str(&descriptor.enum_values.join(", "));
    }
    Some(Diagnostic::at(DiagnosticCode::InvalidValue, value, message))
}

/// Splits a comma-separated list, ignoring commas inside parentheses or
/// quotes. Tokens are trimmed; empty tokens are dropped.
#[must_use]
pub fn split_list(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (index, ch) in text.char_indices() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ',' if depth == 0 => {
                    tokens.push(&text[start..index]);
                    start = index + 1;
                }
                _ => {}
            },
        }
    }
    tokens.push(&text[start..]);
    tokens
        .into_iter()
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect()
}

fn strip_sign(text: &str) -> &str {
    text.strip_prefix(['+', '-']).unwrap_or(text)
}

fn is_integer(text: &str) -> bool {
    let digits = strip_sign(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal(text: &str) -> bool {
    let body = strip_sign(text);
    let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
    (!whole.is_empty() || !fraction.is_empty())
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit())
}
