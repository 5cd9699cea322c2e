//! The resource provider contract and the bundled JSON catalog.
//!
//! The catalog is immutable once built. A single process-wide instance is
//! shared by reference between concurrent validations.

mod descriptor;
mod predicate;

pub use descriptor::{Bound, DescriptorPatch, ScopeOverride, SettingDescriptor, ValueType};
pub use predicate::{parse_predicate, Predicate, PredicateError, Scope, ScopeVar};

use descriptor::RawDescriptor;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Read-only dictionary of known settings and structural requirements.
pub trait ResourceProvider: Send + Sync {
    /// Descriptor for a setting name, in any spelling that clears to the
    /// same letters (`start-time`, `starttime`, `START TIME`).
    fn lookup(&self, name: &str) -> Option<Arc<SettingDescriptor>>;

    /// Every known descriptor, in catalog order.
    fn all_descriptors(&self) -> &[Arc<SettingDescriptor>];

    /// Settings each section kind must see, keyed by section name.
    fn required_section_settings(&self) -> &IndexMap<SmolStr, RequirementSpec>;

    /// Child sections a widget must contain, keyed by widget type.
    fn required_sections_by_widget_type(&self) -> &IndexMap<SmolStr, Vec<SmolStr>>;
}

/// Errors from building a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog document is malformed.
    #[error("invalid catalog: {0}")]
    Json(#[from] serde_json::Error),
    /// A structural pattern does not compile.
    #[error("invalid pattern for setting '{setting}': {source}")]
    Pattern {
        /// Setting the pattern belongs to.
        setting: SmolStr,
        /// Compile error.
        source: regex::Error,
    },
    /// Two descriptors clear to the same lookup key.
    #[error("setting '{0}' is declared twice")]
    DuplicateSetting(SmolStr),
}

/// A set of setting names that must all be visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative(pub Vec<SmolStr>);

impl Alternative {
    fn parse(text: &str) -> Self {
        Self(
            text.split('+')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(SmolStr::from)
                .collect(),
        )
    }

    /// True once every name satisfies `visible`.
    pub fn is_satisfied(&self, mut visible: impl FnMut(&str) -> bool) -> bool {
        self.0.iter().all(|name| visible(name))
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, name) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" + ")?;
            }
            f.write_str(name)?;
        }
        Ok(())
    }
}

/// Settings a section kind requires.
///
/// Every group must be satisfied by at least one of its alternatives. When
/// any `unless` name is visible the whole requirement is waived.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequirementSpec {
    /// Groups of alternatives.
    pub groups: Vec<Vec<Alternative>>,
    /// Names that waive the requirement.
    pub unless: Vec<SmolStr>,
}

impl RequirementSpec {
    /// Groups not satisfied under `visible`, or nothing when waived.
    pub fn unmet(&self, visible: impl Fn(&str) -> bool) -> Vec<&[Alternative]> {
        if self.unless.iter().any(|name| visible(name)) {
            return Vec::new();
        }
        self.groups
            .iter()
            .filter(|group| !group.iter().any(|alt| alt.is_satisfied(&visible)))
            .map(Vec::as_slice)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawCatalog {
    settings: Vec<RawDescriptor>,
    #[serde(default)]
    required_section_settings: IndexMap<SmolStr, RawRequirement>,
    #[serde(default)]
    widget_sections: IndexMap<SmolStr, Vec<SmolStr>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRequirement {
    groups: Vec<Vec<String>>,
    #[serde(default)]
    unless: Vec<SmolStr>,
}

/// Strips everything but letters from a lowercased name.
#[must_use]
pub fn clear_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// Catalog-backed [`ResourceProvider`].
#[derive(Debug, Default)]
pub struct Catalog {
    descriptors: Vec<Arc<SettingDescriptor>>,
    by_key: FxHashMap<String, usize>,
    required_settings: IndexMap<SmolStr, RequirementSpec>,
    widget_sections: IndexMap<SmolStr, Vec<SmolStr>>,
}

static BUNDLED: Lazy<Arc<Catalog>> = Lazy::new(|| {
    match Catalog::from_json(include_str!("../../data/catalog.json")) {
        Ok(catalog) => Arc::new(catalog),
        Err(err) => {
            warn!("Failed to load bundled catalog: {err}");
            Arc::new(Catalog::default())
        }
    }
});

impl Catalog {
    /// The catalog shipped with the crate.
    #[must_use]
    pub fn bundled() -> Arc<Catalog> {
        Arc::clone(&BUNDLED)
    }

    /// Builds a catalog from its JSON form.
    ///
    /// Overrides with a scope that does not parse are logged and skipped;
    /// the rest of the catalog still loads.
    pub fn from_json(text: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = serde_json::from_str(text)?;
        let mut catalog = Catalog::default();

        for raw_descriptor in raw.settings {
            let descriptor = build_descriptor(raw_descriptor)?;
            let key = clear_name(&descriptor.name);
            if catalog.by_key.contains_key(&key) {
                return Err(CatalogError::DuplicateSetting(descriptor.name));
            }
            catalog.by_key.insert(key, catalog.descriptors.len());
            catalog.descriptors.push(Arc::new(descriptor));
        }

        catalog.required_settings = raw
            .required_section_settings
            .into_iter()
            .map(|(section, requirement)| {
                let spec = RequirementSpec {
                    groups: requirement
                        .groups
                        .iter()
                        .map(|group| group.iter().map(|alt| Alternative::parse(alt)).collect())
                        .collect(),
                    unless: requirement.unless,
                };
                (section, spec)
            })
            .collect();
        catalog.widget_sections = raw.widget_sections;

        debug!(
            settings = catalog.descriptors.len(),
            requirements = catalog.required_settings.len(),
            widget_types = catalog.widget_sections.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}

fn build_descriptor(raw: RawDescriptor) -> Result<SettingDescriptor, CatalogError> {
    let pattern = raw
        .pattern
        .as_deref()
        .map(Regex::new)
        .transpose()
        .map_err(|source| CatalogError::Pattern {
            setting: raw.name.clone(),
            source,
        })?;

    let mut overrides = Vec::with_capacity(raw.overrides.len());
    for entry in raw.overrides {
        match parse_predicate(&entry.scope) {
            Ok(scope) => overrides.push(ScopeOverride {
                scope,
                patch: entry.patch,
            }),
            Err(err) => warn!(
                setting = %raw.name,
                scope = %entry.scope,
                "skipping override with invalid scope: {err}"
            ),
        }
    }

    Ok(SettingDescriptor {
        display_name: raw.display_name.unwrap_or_else(|| raw.name.clone()),
        name: raw.name,
        value_type: raw.value_type,
        enum_values: raw.enum_values,
        min: raw.min,
        max: raw.max,
        example: raw.example,
        default_value: raw.default_value,
        multi_line: raw.multi_line,
        widgets: raw.widgets,
        sections: raw.sections,
        deprecated: raw.deprecated,
        percent: raw.percent,
        pattern,
        overrides,
    })
}

impl ResourceProvider for Catalog {
    fn lookup(&self, name: &str) -> Option<Arc<SettingDescriptor>> {
        let index = *self.by_key.get(&clear_name(name))?;
        self.descriptors.get(index).cloned()
    }

    fn all_descriptors(&self) -> &[Arc<SettingDescriptor>] {
        &self.descriptors
    }

    fn required_section_settings(&self) -> &IndexMap<SmolStr, RequirementSpec> {
        &self.required_settings
    }

    fn required_sections_by_widget_type(&self) -> &IndexMap<SmolStr, Vec<SmolStr>> {
        &self.widget_sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r#"{
        "settings": [
            {"name": "start-time", "type": "date"},
            {"name": "mode", "type": "enum", "enum": ["default", "stack"],
             "overrides": [
                {"scope": "widget == 'pie'", "patch": {"enum": ["pie", "ring"]}},
                {"scope": "widget === 'bar'", "patch": {"enum": ["row"]}}
             ]}
        ],
        "required-section-settings": {
            "series": {"groups": [["entity"], ["metric", "table + attribute"]], "unless": ["value"]}
        },
        "widget-sections": {"chart": ["series"]}
    }"#;

    #[test]
    fn test_lookup_by_cleared_name() {
        let catalog = Catalog::from_json(SMALL).unwrap();
        for spelling in ["start-time", "starttime", "Start Time", "start_time"] {
            assert_eq!(
                catalog.lookup(spelling).map(|d| d.name.clone()),
                Some("start-time".into()),
                "{spelling}"
            );
        }
        assert!(catalog.lookup("end-time").is_none());
    }

    #[test]
    fn test_invalid_override_is_skipped() {
        let catalog = Catalog::from_json(SMALL).unwrap();
        let mode = catalog.lookup("mode").unwrap();
        assert_eq!(mode.overrides.len(), 1);
        let pie = mode
            .specialize(&Scope {
                section: "widget",
                widget: Some("pie"),
            })
            .unwrap();
        assert_eq!(pie.enum_values, vec!["pie", "ring"]);
        assert!(mode
            .specialize(&Scope {
                section: "widget",
                widget: Some("chart"),
            })
            .is_none());
    }

    #[test]
    fn test_requirements() {
        let catalog = Catalog::from_json(SMALL).unwrap();
        let series = &catalog.required_section_settings()["series"];
        let unmet = series.unmet(|name| name == "entity" || name == "table");
        assert_eq!(unmet.len(), 1);
        assert_eq!(unmet[0][1].to_string(), "table + attribute");
        assert!(series.unmet(|name| name == "value").is_empty());
        assert!(series
            .unmet(|name| matches!(name, "entity" | "table" | "attribute"))
            .is_empty());
    }

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::bundled();
        assert!(catalog.all_descriptors().len() > 50);
        assert!(catalog.lookup("type").is_some());
        assert!(catalog.required_sections_by_widget_type().contains_key("chart"));
    }

    #[test]
    fn test_duplicate_setting_rejected() {
        let text = r#"{"settings": [{"name": "end-time", "type": "date"}, {"name": "endtime", "type": "date"}]}"#;
        assert!(matches!(
            Catalog::from_json(text),
            Err(CatalogError::DuplicateSetting(_))
        ));
    }
}
