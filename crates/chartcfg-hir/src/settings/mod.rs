//! Setting instances and name resolution.

mod check;
mod suggest;

pub use check::{check_value, split_list, DateContext, BOOLEAN_VALUES};
pub use suggest::{format_suggestion_list, top_ranked_suggestions};

use std::cell::Cell;
use std::sync::Arc;

use chartcfg_syntax::{BlockKeyword, TextRange};
use chartcfg_time::{TimeExpression, Zone};
use chrono::{DateTime, FixedOffset, Utc};

use crate::catalog::{ResourceProvider, Scope, SettingDescriptor};
use crate::sections::SectionKind;

/// One `name = value` occurrence bound to its descriptor.
#[derive(Debug, Clone)]
pub struct Setting {
    /// Descriptor with scope overrides applied.
    pub descriptor: Arc<SettingDescriptor>,
    /// The name as written.
    pub name: TextRange,
    /// The value as written.
    pub value: TextRange,
    /// Values of later declarations that accumulated into this one.
    pub values: Vec<TextRange>,
    broken: Cell<bool>,
    parsed: Cell<Option<DateTime<FixedOffset>>>,
}

impl Setting {
    /// Creates a setting from a resolved descriptor.
    #[must_use]
    pub fn new(descriptor: Arc<SettingDescriptor>, name: TextRange, value: TextRange) -> Self {
        Self {
            descriptor,
            name,
            value,
            values: Vec::new(),
            broken: Cell::new(false),
            parsed: Cell::new(None),
        }
    }

    /// Canonical catalog name.
    #[must_use]
    pub fn canonical_name(&self) -> &str {
        &self.descriptor.name
    }

    /// The first declared value.
    #[must_use]
    pub fn raw_value(&self) -> &str {
        self.value.as_str()
    }

    /// All declared values in order.
    pub fn all_values(&self) -> impl Iterator<Item = &TextRange> {
        std::iter::once(&self.value).chain(self.values.iter())
    }

    /// True when the value is resolved by the host at runtime.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        is_computed(self.raw_value())
    }

    /// Records that the value did not parse.
    pub fn mark_broken(&self) {
        self.broken.set(true);
    }

    /// True if parsing the value already failed.
    #[must_use]
    pub fn is_broken(&self) -> bool {
        self.broken.get()
    }

    /// Evaluates a date-valued setting, memoizing the result.
    ///
    /// Returns `None` for computed, broken or unparsable values; a failure is
    /// remembered so later callers skip the parse.
    #[must_use]
    pub fn date_value(&self, now: DateTime<Utc>, zone: &Zone) -> Option<DateTime<FixedOffset>> {
        if self.is_broken() || self.is_computed() {
            return None;
        }
        if let Some(parsed) = self.parsed.get() {
            return Some(parsed);
        }
        let evaluated = TimeExpression::parse_cached(self.raw_value())
            .and_then(|expression| expression.evaluate_in(now, zone));
        match evaluated {
            Ok(instant) => {
                self.parsed.set(Some(instant));
                Some(instant)
            }
            Err(_) => {
                self.mark_broken();
                None
            }
        }
    }
}

/// True for `${...}` and `@{...}` values.
#[must_use]
pub fn is_computed(value: &str) -> bool {
    value.contains("${") || value.contains("@{")
}

/// Outcome of resolving a setting name.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// A catalog setting, specialized for its scope.
    Known(Arc<SettingDescriptor>),
    /// Accepted without a descriptor.
    Exempt,
    /// Not a known setting.
    Unknown,
}

/// Resolves `name` as declared in `scope`.
///
/// Names with a `column-` prefix, reserved keyword spellings, and anything
/// inside a free-form section are exempt from the catalog.
#[must_use]
pub fn resolve(provider: &dyn ResourceProvider, name: &str, scope: &Scope<'_>) -> Resolution {
    let name = name.trim();
    if name.starts_with("column-")
        || BlockKeyword::ALL
            .iter()
            .any(|keyword| keyword.as_str() == name || keyword.end_keyword() == name)
        || SectionKind::from_name(scope.section).is_some_and(SectionKind::is_free_form)
    {
        return Resolution::Exempt;
    }
    let Some(descriptor) = provider.lookup(name) else {
        return Resolution::Unknown;
    };
    match descriptor.specialize(scope) {
        Some(specialized) => Resolution::Known(Arc::new(specialized)),
        None => Resolution::Known(descriptor),
    }
}
