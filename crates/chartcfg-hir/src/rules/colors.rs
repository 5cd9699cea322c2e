//! `colors` must provide one color per threshold interval.

use super::{Check, Rule, RuleContext, SETTING_SECTIONS};
use crate::diagnostics::{DiagnosticBuilder, DiagnosticCode};
use crate::settings::{split_list, Setting};
use crate::tree::SectionId;

pub(super) const RULES: &[Rule] = &[Rule {
    name: "colors-thresholds",
    kinds: SETTING_SECTIONS,
    check: Check::Custom(check_colors),
}];

fn count(setting: &Setting) -> Option<usize> {
    let mut total = 0;
    for value in setting.all_values() {
        if crate::settings::is_computed(value.as_str()) {
            return None;
        }
        total += split_list(value.as_str()).len();
    }
    Some(total)
}

/// Runs where either setting is declared, so each pair is judged once.
fn check_colors(ctx: &RuleContext<'_>, id: SectionId, diagnostics: &mut DiagnosticBuilder) {
    let section = ctx.tree.section(id);
    if section.local("colors").is_none() && section.local("thresholds").is_none() {
        return;
    }
    let (Some(colors), Some(thresholds)) = (
        ctx.tree.get_setting(id, "colors"),
        ctx.tree.get_setting(id, "thresholds"),
    ) else {
        return;
    };
    let (Some(color_count), Some(threshold_count)) = (count(colors), count(thresholds)) else {
        return;
    };
    if threshold_count == 0 || color_count + 1 == threshold_count {
        return;
    }
    diagnostics.report(
        DiagnosticCode::ColorsMismatch,
        &colors.name,
        format!(
            "incorrect colors count: {threshold_count} thresholds need {} colors, found {color_count}",
            threshold_count - 1
        ),
    );
}
