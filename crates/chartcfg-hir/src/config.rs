//! Validator configuration, usually loaded from `chartcfg.toml`.

use chartcfg_time::{parse_zone, Zone};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use smol_str::SmolStr;
use thiserror::Error;

use crate::diagnostics::DEFAULT_SOURCE;

/// Errors from parsing a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Not valid TOML or wrong value types.
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
    /// `timezone` names no known zone.
    #[error("invalid timezone '{0}'")]
    Timezone(SmolStr),
    /// `now` is not an RFC 3339 timestamp.
    #[error("invalid 'now' timestamp '{0}'")]
    Now(SmolStr),
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
struct ConfigFile {
    source: String,
    timezone: String,
    now: Option<String>,
    disabled_rules: Vec<String>,
    suggestions: bool,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            timezone: "utc".to_string(),
            now: None,
            disabled_rules: Vec::new(),
            suggestions: true,
        }
    }
}

/// Resolved validator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// `source` stamped on every diagnostic.
    pub source: SmolStr,
    /// Zone used when no `timezone` setting is in scope.
    pub timezone: Zone,
    /// Fixed evaluation instant; the wall clock when unset.
    pub now: Option<DateTime<Utc>>,
    /// Rule names the rule engine skips.
    pub disabled_rules: Vec<SmolStr>,
    /// Append "Did you mean" hints to unknown settings.
    pub suggestions: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            source: SmolStr::new_static(DEFAULT_SOURCE),
            timezone: Zone::default(),
            now: None,
            disabled_rules: Vec::new(),
            suggestions: true,
        }
    }
}

impl ValidatorConfig {
    /// Parses a TOML configuration document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let parsed: ConfigFile = toml::from_str(contents)?;
        let timezone = parse_zone(&parsed.timezone)
            .map_err(|_| ConfigError::Timezone(parsed.timezone.as_str().into()))?;
        let now = parsed
            .now
            .as_deref()
            .map(|text| {
                DateTime::parse_from_rfc3339(text)
                    .map(|instant| instant.with_timezone(&Utc))
                    .map_err(|_| ConfigError::Now(text.into()))
            })
            .transpose()?;
        Ok(Self {
            source: parsed.source.into(),
            timezone,
            now,
            disabled_rules: parsed.disabled_rules.into_iter().map(SmolStr::from).collect(),
            suggestions: parsed.suggestions,
        })
    }

    /// Fixes "now" for deterministic validation.
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Returns true if the named rule should run.
    #[must_use]
    pub fn rule_enabled(&self, name: &str) -> bool {
        !self.disabled_rules.iter().any(|rule| rule == name)
    }
}
