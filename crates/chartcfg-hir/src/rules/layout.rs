//! Grid overflow across the widgets of a group.
//!
//! Widgets of a `[group]` fill rows left to right; a row wraps after
//! `widgets-per-row` widgets when that is set. The grid size comes from
//! `width-units` / `height-units` declared on the group or above it, and is
//! only checked when declared explicitly.

use super::{Check, Rule, RuleContext};
use crate::diagnostics::{DiagnosticBuilder, DiagnosticCode};
use crate::sections::SectionKind;
use crate::settings::Setting;
use crate::tree::{Section, SectionId};

pub(super) const RULES: &[Rule] = &[Rule {
    name: "layout-overflow",
    kinds: &[SectionKind::Group],
    check: Check::Custom(check_layout),
}];

fn numeric(setting: &Setting) -> Option<f64> {
    if setting.is_computed() {
        return None;
    }
    setting.raw_value().parse().ok()
}

/// The widget's own size, or 1 unit.
fn widget_size(widget: &Section, name: &str) -> f64 {
    widget.local(name).and_then(numeric).unwrap_or(1.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn check_layout(ctx: &RuleContext<'_>, id: SectionId, diagnostics: &mut DiagnosticBuilder) {
    let tree = ctx.tree;
    let grid_width = tree.get_setting(id, "width-units").and_then(numeric);
    let grid_height = tree.get_setting(id, "height-units").and_then(numeric);
    if grid_width.is_none() && grid_height.is_none() {
        return;
    }
    let per_row = tree
        .get_setting(id, "widgets-per-row")
        .and_then(numeric)
        .filter(|count| *count >= 1.0)
        .map(|count| count.floor() as usize);

    let widgets: Vec<&Section> = tree
        .section(id)
        .children
        .iter()
        .map(|child| tree.section(*child))
        .filter(|child| child.kind == SectionKind::Widget)
        .collect();
    let rows: Vec<&[&Section]> = match per_row {
        Some(per_row) => widgets.chunks(per_row).collect(),
        None if widgets.is_empty() => Vec::new(),
        None => vec![widgets.as_slice()],
    };

    let mut total_height = 0.0;
    for row in rows {
        let mut row_width = 0.0;
        let mut row_height: f64 = 0.0;
        let mut overflowed = false;
        for widget in row {
            row_width += widget_size(widget, "width-units");
            row_height = row_height.max(widget_size(widget, "height-units"));
            if overflowed {
                continue;
            }
            if let Some(grid_width) = grid_width.filter(|grid| row_width > *grid) {
                overflowed = true;
                diagnostics.report(
                    DiagnosticCode::LayoutOverflow,
                    &widget.name,
                    format!("widgets in this row need {row_width} width-units, the grid has {grid_width}"),
                );
            }
        }
        total_height += row_height;
        if let (Some(grid_height), Some(last)) = (grid_height, row.last()) {
            if total_height > grid_height {
                diagnostics.report(
                    DiagnosticCode::LayoutOverflow,
                    &last.name,
                    format!("widgets in this group need {total_height} height-units, the grid has {grid_height}"),
                );
                break;
            }
        }
    }
}
