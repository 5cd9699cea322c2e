//! Presence and uselessness combinators and the rules built from them.

use super::{Check, Condition, Rule, RuleContext, SETTING_SECTIONS};
use crate::diagnostics::{DiagnosticBuilder, DiagnosticCode};
use crate::tree::SectionId;

/// "If `dependent` is visible and every condition holds, one of `required`
/// must be visible too, or declared somewhere below the section that
/// declares `dependent`."
#[derive(Debug, Clone, Copy)]
pub struct PresenceRule {
    /// Setting that triggers the rule.
    pub dependent: &'static str,
    /// Scope conditions; all must hold.
    pub conditions: &'static [Condition],
    /// Alternatives, any one of which satisfies the rule.
    pub required: &'static [&'static str],
}

impl PresenceRule {
    pub(super) fn check(&self, ctx: &RuleContext<'_>, id: SectionId, diagnostics: &mut DiagnosticBuilder) {
        let Some(dependent) = ctx.tree.get_setting(id, self.dependent) else {
            return;
        };
        if !self.conditions.iter().all(|condition| condition.holds(ctx, id)) {
            return;
        }
        // A requirement also counts when declared below the dependent, such
        // as `alert-expression` on each series of an alert-styled widget.
        let owner = ctx
            .tree
            .declaring_section(id, self.dependent)
            .unwrap_or(id);
        if self.required.iter().any(|name| {
            ctx.tree.get_setting(id, name).is_some() || ctx.tree.declared_below(owner, name)
        }) {
            return;
        }
        let mut message = format!(
            "{} is required if {} is specified",
            self.required.join(" or "),
            self.dependent
        );
        if !self.conditions.is_empty() {
            let conditions: Vec<String> = self.conditions.iter().map(Condition::describe).collect();
            message.push_str(" and ");
            message.push_str(&conditions.join(" and "));
        }
        diagnostics.report(DiagnosticCode::MissingDependentSetting, &dependent.name, message);
    }
}

/// "`dependent` only has an effect while every condition holds."
///
/// Checked where the setting is declared, against that section's scope.
#[derive(Debug, Clone, Copy)]
pub struct UselessRule {
    /// Setting that may be useless.
    pub dependent: &'static str,
    /// Conditions under which it has an effect.
    pub conditions: &'static [Condition],
}

impl UselessRule {
    pub(super) fn check(&self, ctx: &RuleContext<'_>, id: SectionId, diagnostics: &mut DiagnosticBuilder) {
        let Some(dependent) = ctx.tree.section(id).local(self.dependent) else {
            return;
        };
        if self.conditions.iter().all(|condition| condition.holds(ctx, id)) {
            return;
        }
        let conditions: Vec<String> = self.conditions.iter().map(Condition::describe).collect();
        diagnostics.report(
            DiagnosticCode::UselessSetting,
            &dependent.name,
            format!(
                "{} has no effect unless {}",
                self.dependent,
                conditions.join(" and ")
            ),
        );
    }
}

const fn presence(
    name: &'static str,
    dependent: &'static str,
    conditions: &'static [Condition],
    required: &'static [&'static str],
) -> Rule {
    Rule {
        name,
        kinds: SETTING_SECTIONS,
        check: Check::Presence(PresenceRule {
            dependent,
            conditions,
            required,
        }),
    }
}

const fn useless(
    name: &'static str,
    dependent: &'static str,
    conditions: &'static [Condition],
) -> Rule {
    Rule {
        name,
        kinds: SETTING_SECTIONS,
        check: Check::Useless(UselessRule {
            dependent,
            conditions,
        }),
    }
}

const PIE: &[Condition] = &[Condition {
    setting: "type",
    allowed: &["pie"],
}];

const TEXT: &[Condition] = &[Condition {
    setting: "type",
    allowed: &["text"],
}];

const COLUMN_MODE: &[Condition] = &[Condition {
    setting: "mode",
    allowed: &["column", "column-stack"],
}];

pub(super) const RULES: &[Rule] = &[
    // Three independent rules for one dependent setting.
    presence("icon-alert-style-pie", "icon-alert-style", PIE, &["icon-alert-expression"]),
    presence("icon-alert-style-text-expression", "icon-alert-style", TEXT, &["alert-expression"]),
    presence("icon-alert-style-text-color", "icon-alert-style", TEXT, &["icon-color"]),
    presence("alert-style", "alert-style", &[], &["alert-expression"]),
    presence("alert-row-style", "alert-row-style", &[], &["alert-expression"]),
    presence("node-alert-style", "node-alert-style", &[], &["node-alert-expression", "alert-expression"]),
    presence("link-alert-style", "link-alert-style", &[], &["link-alert-expression", "alert-expression"]),
    presence("caption-style", "caption-style", &[], &["caption"]),
    presence("batch-size", "batch-size", &[], &["batch-update"]),
    presence("forecast-ssa-groups", "forecast-ssa-group-manual-groups", &[], &["forecast-ssa"]),
    useless("centralize-ticks", "centralize-ticks", COLUMN_MODE),
    useless("centralize-columns", "centralize-columns", COLUMN_MODE),
];
