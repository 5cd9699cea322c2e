//! Ordering between date settings.

use super::{Check, Rule, RuleContext, SETTING_SECTIONS};
use crate::diagnostics::{DiagnosticBuilder, DiagnosticCode};
use crate::tree::SectionId;

pub(super) const RULES: &[Rule] = &[
    Rule {
        name: "start-before-end",
        kinds: SETTING_SECTIONS,
        check: Check::Custom(check_start_end),
    },
    Rule {
        name: "end-before-forecast-horizon",
        kinds: SETTING_SECTIONS,
        check: Check::Custom(check_forecast_horizon),
    },
];

/// Compares `earlier < later` where either is declared at `id`.
fn check_order(
    ctx: &RuleContext<'_>,
    id: SectionId,
    earlier: &str,
    later: &str,
    diagnostics: &mut DiagnosticBuilder,
) {
    let section = ctx.tree.section(id);
    if section.local(earlier).is_none() && section.local(later).is_none() {
        return;
    }
    let (Some(first), Some(second)) = (
        ctx.tree.get_setting(id, earlier),
        ctx.tree.get_setting(id, later),
    ) else {
        return;
    };
    let zone = ctx.zone(id);
    let (Some(first_at), Some(second_at)) = (
        first.date_value(ctx.now, &zone),
        second.date_value(ctx.now, &zone),
    ) else {
        return;
    };
    if first_at < second_at {
        return;
    }
    diagnostics.report(
        DiagnosticCode::InvalidTimeRange,
        &second.name,
        format!("{later} must be greater than {earlier}"),
    );
}

fn check_start_end(ctx: &RuleContext<'_>, id: SectionId, diagnostics: &mut DiagnosticBuilder) {
    check_order(ctx, id, "start-time", "end-time", diagnostics);
}

fn check_forecast_horizon(ctx: &RuleContext<'_>, id: SectionId, diagnostics: &mut DiagnosticBuilder) {
    check_order(ctx, id, "end-time", "forecast-horizon-end-time", diagnostics);
}
