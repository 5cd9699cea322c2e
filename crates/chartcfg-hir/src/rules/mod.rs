//! Cross-setting rules evaluated over the completed section tree.
//!
//! Rules are registered per section kind and run in registration order for
//! every node of that kind. Presence and uselessness rules share the
//! [`PresenceRule`] / [`UselessRule`] combinators; the rest are plain
//! functions over a node.

mod applicability;
mod colors;
mod layout;
mod presence;
mod time;

use chartcfg_time::{parse_zone, Zone};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use smol_str::SmolStr;
use tracing::trace;

use crate::catalog::{ResourceProvider, Scope};
use crate::config::ValidatorConfig;
use crate::diagnostics::DiagnosticBuilder;
use crate::sections::SectionKind;
use crate::tree::{SectionId, SectionTree};

pub use presence::{PresenceRule, UselessRule};

/// Everything a rule may query.
pub struct RuleContext<'a> {
    /// The completed tree.
    pub tree: &'a SectionTree,
    /// Setting catalog.
    pub provider: &'a dyn ResourceProvider,
    /// "Now" for date settings.
    pub now: DateTime<Utc>,
    /// Zone used when no `timezone` setting is in scope.
    pub default_zone: Zone,
}

impl RuleContext<'_> {
    /// Value of `name` visible at `id`, or the catalog default for this
    /// scope when the tree does not declare it.
    #[must_use]
    pub fn scope_value(&self, id: SectionId, name: &str) -> Option<SmolStr> {
        if let Some(setting) = self.tree.get_setting(id, name) {
            return Some(setting.value.text.clone());
        }
        let descriptor = self.provider.lookup(name)?;
        let scope = Scope {
            section: self.tree.section(id).kind.as_str(),
            widget: self.tree.widget_type(id),
        };
        match descriptor.specialize(&scope) {
            Some(specialized) => specialized.default_value,
            None => descriptor.default_value.clone(),
        }
    }

    /// Zone for date settings at `id`.
    #[must_use]
    pub fn zone(&self, id: SectionId) -> Zone {
        self.tree
            .get_setting(id, "timezone")
            .filter(|setting| !setting.is_computed())
            .and_then(|setting| parse_zone(setting.raw_value()).ok())
            .unwrap_or(self.default_zone)
    }
}

/// A predicate over a scope value: the value of `setting` is one of
/// `allowed`, ignoring case.
#[derive(Debug, Clone, Copy)]
pub struct Condition {
    /// Setting whose scope value is tested.
    pub setting: &'static str,
    /// Accepted values.
    pub allowed: &'static [&'static str],
}

impl Condition {
    fn holds(&self, ctx: &RuleContext<'_>, id: SectionId) -> bool {
        ctx.scope_value(id, self.setting).is_some_and(|value| {
            self.allowed
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&value))
        })
    }

    fn describe(&self) -> String {
        match self.allowed {
            [one] => format!("{} is {one}", self.setting),
            many => format!("{} is one of: {}", self.setting, many.join(", ")),
        }
    }
}

/// What a rule does.
#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// A setting that needs another one.
    Presence(PresenceRule),
    /// A setting that only has an effect under some conditions.
    Useless(UselessRule),
    /// Any other check.
    Custom(fn(&RuleContext<'_>, SectionId, &mut DiagnosticBuilder)),
}

/// A registered rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Name used by `disabled-rules`.
    pub name: &'static str,
    /// Section kinds the rule runs for.
    pub kinds: &'static [SectionKind],
    /// The check.
    pub check: Check,
}

/// Sections that hold ordinary settings.
pub(crate) const SETTING_SECTIONS: &[SectionKind] = &[
    SectionKind::Configuration,
    SectionKind::Group,
    SectionKind::Widget,
    SectionKind::Series,
    SectionKind::Dropdown,
    SectionKind::Column,
    SectionKind::Node,
    SectionKind::Link,
    SectionKind::Property,
    SectionKind::Option,
];

static REGISTRY: Lazy<Vec<Rule>> = Lazy::new(|| {
    presence::RULES
        .iter()
        .chain(applicability::RULES)
        .chain(colors::RULES)
        .chain(time::RULES)
        .chain(layout::RULES)
        .copied()
        .collect()
});

/// Every registered rule, in evaluation order.
#[must_use]
pub fn registry() -> &'static [Rule] {
    &REGISTRY
}

/// Runs every enabled rule over every node of `ctx.tree`.
pub fn run_rules(ctx: &RuleContext<'_>, config: &ValidatorConfig, diagnostics: &mut DiagnosticBuilder) {
    let enabled: Vec<&Rule> = registry()
        .iter()
        .filter(|rule| config.rule_enabled(rule.name))
        .collect();
    for id in ctx.tree.ids() {
        let kind = ctx.tree.section(id).kind;
        for rule in enabled.iter().filter(|rule| rule.kinds.contains(&kind)) {
            let before = diagnostics.len();
            match &rule.check {
                Check::Presence(presence) => presence.check(ctx, id, diagnostics),
                Check::Useless(useless) => useless.check(ctx, id, diagnostics),
                Check::Custom(check) => check(ctx, id, diagnostics),
            }
            if diagnostics.len() > before {
                trace!(rule = rule.name, section = %kind, "rule reported");
            }
        }
    }
}
