//! Setting descriptors as loaded from the catalog.

use regex::Regex;
use serde::Deserialize;
use smol_str::SmolStr;
use std::fmt;

use super::predicate::{Predicate, Scope};

/// Value grammar of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Free text, optionally restricted by an enum or a pattern.
    String,
    /// Signed decimal.
    Number,
    /// Signed whole number.
    Integer,
    /// `true`/`false` and friends.
    Boolean,
    /// One of the declared options.
    Enum,
    /// `<count> <unit>` or `all`.
    Interval,
    /// Date literal or calendar expression.
    Date,
    /// Structured literal.
    Object,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Interval => "interval",
            Self::Date => "date",
            Self::Object => "object",
        })
    }
}

/// A numeric bound, open when `excluded` is set.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "BoundRepr")]
pub struct Bound {
    /// Bound value.
    pub value: f64,
    /// The bound itself is not a legal value.
    pub excluded: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BoundRepr {
    Value(f64),
    Detailed {
        value: f64,
        #[serde(default)]
        excluded: bool,
    },
}

impl From<BoundRepr> for Bound {
    fn from(repr: BoundRepr) -> Self {
        match repr {
            BoundRepr::Value(value) => Self {
                value,
                excluded: false,
            },
            BoundRepr::Detailed { value, excluded } => Self { value, excluded },
        }
    }
}

impl Bound {
    /// True if `value` does not fall below this lower bound.
    #[must_use]
    pub fn admits_from_below(&self, value: f64) -> bool {
        if self.excluded {
            value > self.value
        } else {
            value >= self.value
        }
    }

    /// True if `value` does not exceed this upper bound.
    #[must_use]
    pub fn admits_from_above(&self, value: f64) -> bool {
        if self.excluded {
            value < self.value
        } else {
            value <= self.value
        }
    }

    /// The bound multiplied by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> Self {
        Self {
            value: self.value * factor,
            excluded: self.excluded,
        }
    }
}

/// Partial descriptor applied by a matching scope override.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DescriptorPatch {
    /// Replacement value type.
    #[serde(rename = "type")]
    pub value_type: Option<ValueType>,
    /// Replacement enum values.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<SmolStr>>,
    /// Replacement lower bound.
    pub min: Option<Bound>,
    /// Replacement upper bound.
    pub max: Option<Bound>,
    /// Replacement default value.
    #[serde(rename = "default")]
    pub default_value: Option<SmolStr>,
    /// Replacement example.
    pub example: Option<SmolStr>,
    /// Replacement multi-line flag.
    pub multi_line: Option<bool>,
}

/// A patch together with the scope it applies to.
#[derive(Debug, Clone)]
pub struct ScopeOverride {
    /// Where the patch applies.
    pub scope: Predicate,
    /// What changes there.
    pub patch: DescriptorPatch,
}

/// Static description of one setting.
#[derive(Debug, Clone)]
pub struct SettingDescriptor {
    /// Canonical name (`start-time`).
    pub name: SmolStr,
    /// Human readable name.
    pub display_name: SmolStr,
    /// Value grammar.
    pub value_type: ValueType,
    /// Allowed values for enums (and enum-restricted strings/intervals).
    pub enum_values: Vec<SmolStr>,
    /// Lower bound for numbers.
    pub min: Option<Bound>,
    /// Upper bound for numbers.
    pub max: Option<Bound>,
    /// Example value used in messages.
    pub example: Option<SmolStr>,
    /// Value assumed when the setting is absent.
    pub default_value: Option<SmolStr>,
    /// May be declared repeatedly; values accumulate.
    pub multi_line: bool,
    /// Widget types the setting has an effect on (empty means all).
    pub widgets: Vec<SmolStr>,
    /// Sections the setting belongs to (empty means any).
    pub sections: Vec<SmolStr>,
    /// Deprecation notice.
    pub deprecated: Option<SmolStr>,
    /// Accepts an `NN%` form (bounds scaled by 100).
    pub percent: bool,
    /// Structural pattern for string values.
    pub pattern: Option<Regex>,
    /// Scope overrides in table order.
    pub overrides: Vec<ScopeOverride>,
}

impl SettingDescriptor {
    /// Applies one patch in place.
    pub fn apply(&mut self, patch: &DescriptorPatch) {
        if let Some(value_type) = patch.value_type {
            self.value_type = value_type;
        }
        if let Some(enum_values) = &patch.enum_values {
            self.enum_values.clone_from(enum_values);
        }
        if patch.min.is_some() {
            self.min = patch.min;
        }
        if patch.max.is_some() {
            self.max = patch.max;
        }
        if let Some(default_value) = &patch.default_value {
            self.default_value = Some(default_value.clone());
        }
        if let Some(example) = &patch.example {
            self.example = Some(example.clone());
        }
        if let Some(multi_line) = patch.multi_line {
            self.multi_line = multi_line;
        }
    }

    /// The descriptor with every override matching `scope` applied in table
    /// order, or `None` when no override matches.
    #[must_use]
    pub fn specialize(&self, scope: &Scope<'_>) -> Option<Self> {
        let mut matching = self
            .overrides
            .iter()
            .filter(|entry| entry.scope.matches(scope))
            .peekable();
        matching.peek()?;
        let mut specialized = self.clone();
        for entry in matching {
            specialized.apply(&entry.patch);
        }
        Some(specialized)
    }

    /// True if the setting has an effect on widgets of `widget_type`.
    #[must_use]
    pub fn applies_to_widget(&self, widget_type: &str) -> bool {
        self.widgets.is_empty()
            || self
                .widgets
                .iter()
                .any(|widget| widget.eq_ignore_ascii_case(widget_type))
    }

    /// True if `value` matches one of the enum values, ignoring case.
    #[must_use]
    pub fn enum_contains(&self, value: &str) -> bool {
        self.enum_values
            .iter()
            .any(|option| option.eq_ignore_ascii_case(value.trim()))
    }
}

/// Descriptor as written in the catalog file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub(crate) struct RawDescriptor {
    pub name: SmolStr,
    #[serde(default)]
    pub display_name: Option<SmolStr>,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    #[serde(default, rename = "enum")]
    pub enum_values: Vec<SmolStr>,
    #[serde(default)]
    pub min: Option<Bound>,
    #[serde(default)]
    pub max: Option<Bound>,
    #[serde(default)]
    pub example: Option<SmolStr>,
    #[serde(default, rename = "default")]
    pub default_value: Option<SmolStr>,
    #[serde(default)]
    pub multi_line: bool,
    #[serde(default)]
    pub widgets: Vec<SmolStr>,
    #[serde(default)]
    pub sections: Vec<SmolStr>,
    #[serde(default)]
    pub deprecated: Option<SmolStr>,
    #[serde(default)]
    pub percent: bool,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub overrides: Vec<RawOverride>,
}

/// Override as written in the catalog file; `scope` is parsed at load time.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct RawOverride {
    pub scope: String,
    pub patch: DescriptorPatch,
}
