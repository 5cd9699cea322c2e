//! Warnings for settings declared where they have no effect.

use super::{Check, Rule, RuleContext, SETTING_SECTIONS};
use crate::diagnostics::{DiagnosticBuilder, DiagnosticCode};
use crate::sections::SectionKind;
use crate::tree::SectionId;

pub(super) const RULES: &[Rule] = &[
    Rule {
        name: "widget-applicability",
        kinds: SETTING_SECTIONS,
        check: Check::Custom(check_widget),
    },
    Rule {
        name: "section-applicability",
        kinds: SETTING_SECTIONS,
        check: Check::Custom(check_section),
    },
];

/// A setting limited to some widget types, used under another one.
fn check_widget(ctx: &RuleContext<'_>, id: SectionId, diagnostics: &mut DiagnosticBuilder) {
    let Some(widget_type) = ctx.tree.widget_type(id) else {
        return;
    };
    if widget_type.contains("${") || widget_type.contains("@{") {
        return;
    }
    for setting in &ctx.tree.section(id).settings {
        let descriptor = &setting.descriptor;
        if descriptor.applies_to_widget(widget_type) {
            continue;
        }
        diagnostics.report(
            DiagnosticCode::UselessSetting,
            &setting.name,
            format!(
                "{} has no effect on {widget_type} widgets, it applies to: {}",
                descriptor.name,
                descriptor.widgets.join(", ")
            ),
        );
    }
}

/// A setting limited to some sections, declared below or beside them.
///
/// Declaring it in a shallower section is fine: it is inherited downwards.
fn check_section(ctx: &RuleContext<'_>, id: SectionId, diagnostics: &mut DiagnosticBuilder) {
    let section = ctx.tree.section(id);
    let depth = section.kind.depth();
    for setting in &section.settings {
        let descriptor = &setting.descriptor;
        let listed: Vec<SectionKind> = descriptor
            .sections
            .iter()
            .filter_map(|name| SectionKind::from_name(name))
            .collect();
        let Some(deepest) = listed.iter().map(|kind| kind.depth()).max() else {
            continue;
        };
        let misplaced = depth > deepest
            || (listed.iter().any(|kind| kind.depth() == depth) && !listed.contains(&section.kind));
        if !misplaced {
            continue;
        }
        let names: Vec<String> = listed.iter().map(|kind| format!("[{kind}]")).collect();
        diagnostics.report(
            DiagnosticCode::UselessSetting,
            &setting.name,
            format!(
                "{} has no effect in [{}], it applies to: {}",
                descriptor.name,
                section.kind,
                names.join(", ")
            ),
        );
    }
}
