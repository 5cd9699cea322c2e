//! End-to-end validation of whole documents.

mod common;

use common::*;
use expect_test::expect;

#[test]
fn test_complete_document_is_clean() {
    check_no_diagnostics(
        r#"[configuration]
  width-units = 2
  height-units = 1
[group]
[widget]
  type = chart
  title = CPU busy
  [series]
    entity = nurswgvml007
    metric = cpu_busy
  [/series]
[widget]
  type = pie
  [series]
    entity = nurswgvml007
    metric = memfree
"#,
    );
}

#[test]
fn test_missing_metric() {
    let found = diagnostics(
        "[configuration]\n[group]\n[widget]\n  type = chart\n  [series]\n    entity = nurswgvml007\n",
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::MissingDependentSetting);
    assert_eq!(found[0].message, "metric or table + attribute is required");
}

#[test]
fn test_series_value_waives_entity_and_metric() {
    check_no_diagnostics(
        "[configuration]\n[group]\n[widget]\n  type = chart\n  [series]\n    value = 1\n",
    );
}

#[test]
fn test_colors_match_thresholds() {
    check_no_diagnostics(&chart_widget("  colors = red, yellow\n  thresholds = 0, 60, 80"));
}

#[test]
fn test_colors_mismatch() {
    let found = diagnostics(&chart_widget("  colors = red, yellow\n  thresholds = 0, 60"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::ColorsMismatch);
    assert_eq!(
        found[0].message,
        "incorrect colors count: 2 thresholds need 1 colors, found 2"
    );
}

#[test]
fn test_multi_line_thresholds_accumulate() {
    check_no_diagnostics(&chart_widget(
        "  colors = red, yellow\n  thresholds = 0, 60\n  thresholds = 80",
    ));
}

#[test]
fn test_end_time_before_start_time() {
    let found = diagnostics(&chart_widget(
        "  start-time = 2020-01-10\n  end-time = 2020-01-01",
    ));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::InvalidTimeRange);
    assert_eq!(found[0].message, "end-time must be greater than start-time");
    assert_eq!(found[0].range.start.line, 5);
}

#[test]
fn test_relative_time_range_is_ordered() {
    check_no_diagnostics(&chart_widget(
        "  start-time = current_day - 1 * day\n  end-time = current_day",
    ));
}

#[test]
fn test_forecast_horizon_before_end_time() {
    let found = diagnostics(
        r#"[configuration]
[group]
[widget]
  type = chart
  [series]
    entity = nurswgvml007
    metric = cpu_busy
    end-time = 2021-01-02
    forecast-horizon-end-time = 2021-01-01
"#,
    );
    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].message,
        "forecast-horizon-end-time must be greater than end-time"
    );
}

#[test]
fn test_invalid_date() {
    let codes = check_codes(&chart_widget("  end-time = someday"));
    assert_eq!(codes, vec![DiagnosticCode::InvalidDate]);
}

#[test]
fn test_unknown_for_collection() {
    let found = diagnostics(
        r#"[configuration]
[group]
for server in servers
[widget]
  type = chart
  [series]
    entity = @{server}
    metric = cpu_busy
endfor
"#,
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::UnknownToken);
    assert_eq!(found[0].message, "unknown name 'servers'");
    assert_eq!(found[0].range.to_string(), "2:14..2:21");
}

#[test]
fn test_declared_for_collection() {
    check_no_diagnostics(
        r#"[configuration]
[group]
list servers = nurswgvml006, nurswgvml007
for server in servers
[widget]
  type = chart
  [series]
    entity = @{server}
    metric = cpu_busy
endfor
"#,
    );
}

#[test]
fn test_missing_endfor() {
    let codes = check_codes(
        r#"[configuration]
[group]
list servers = nurswgvml006, nurswgvml007
for server in servers
[widget]
  type = chart
  [series]
    entity = @{server}
    metric = cpu_busy
"#,
    );
    assert_eq!(codes, vec![DiagnosticCode::UnclosedBlock]);
}

#[test]
fn test_numeric_bounds() {
    check_no_diagnostics(&chart_widget("  fill-opacity = 1\n  width-units = 0.5"));

    let found = diagnostics(&chart_widget("  fill-opacity = 1.01"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "fill-opacity must be in range [0, 1]");

    let found = diagnostics(&chart_widget("  width-units = 0"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "width-units must be greater than 0");
}

#[test]
fn test_percent_values_scale_bounds() {
    check_no_diagnostics(&chart_widget("  fill-opacity = 50%"));
    let codes = check_codes(&chart_widget("  fill-opacity = 150%"));
    assert_eq!(codes, vec![DiagnosticCode::InvalidValue]);
}

#[test]
fn test_computed_values_are_not_checked() {
    check_no_diagnostics(&chart_widget("  fill-opacity = ${opacity}\n  end-time = @{end}"));
}

#[test]
fn test_repeated_setting() {
    let found = diagnostics(&chart_widget("  title = one\n  title = two"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::RepeatedSetting);
    assert_eq!(found[0].message, "title is already defined");
    assert_eq!(found[0].related.len(), 1);
    assert_eq!(found[0].related[0].range.start.line, 4);
}

#[test]
fn test_repeated_setting_in_other_branch() {
    check_no_diagnostics(&chart_widget(
        "  if server == 'nurswgvml007'\n  title = one\n  else\n  title = two\n  endif",
    ));
}

#[test]
fn test_repeated_setting_ignores_name_spelling() {
    let codes = check_codes(&chart_widget("  start-time = 2020-01-01\n  starttime = 2020-01-02"));
    assert_eq!(codes, vec![DiagnosticCode::RepeatedSetting]);
}

#[test]
fn test_unknown_setting_suggestion() {
    let found = diagnostics(&chart_widget("  colour = red"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::UnknownSetting);
    assert!(
        found[0].message.starts_with("unknown setting 'colour', did you mean 'color'"),
        "{}",
        found[0].message
    );
}

#[test]
fn test_unknown_setting_without_suggestions() {
    let mut config = fixed_config();
    config.suggestions = false;
    let found = diagnostics_with(&chart_widget("  colour = red"), config);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].message, "unknown setting 'colour'");
}

#[test]
fn test_free_form_sections_accept_any_name() {
    check_no_diagnostics(
        r#"[configuration]
[group]
[widget]
  type = chart
  [series]
    entity = nurswgvml007
    metric = cpu_busy
    [tags]
      mount_point = /
      file_system = ~.*
"#,
    );
}

#[test]
fn test_unknown_section_skips_its_settings() {
    let codes = check_codes(
        r#"[configuration]
[group]
[widget]
  type = chart
  [series]
    entity = nurswgvml007
    metric = cpu_busy
  [seriess]
    whatever = 1
"#,
    );
    assert_eq!(codes, vec![DiagnosticCode::UnknownSection]);
}

#[test]
fn test_deprecated_setting() {
    let found = diagnostics(&chart_widget("  legend-last-value = true"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::DeprecatedSetting);
    assert_eq!(found[0].severity, DiagnosticSeverity::Warning);
    assert_eq!(
        found[0].message,
        "legend-last-value is deprecated. Use 'legend-value' instead."
    );
}

#[test]
fn test_widget_applicability() {
    let found = diagnostics(&chart_widget("  horizontal = true"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::UselessSetting);
    assert_eq!(
        found[0].message,
        "horizontal has no effect on chart widgets, it applies to: bar, histogram, box"
    );
}

#[test]
fn test_section_applicability() {
    let found = diagnostics(
        "[configuration]\n[group]\n[widget]\n  type = chart\n  [series]\n    entity = nurswgvml007\n    metric = cpu_busy\n    on-change = widget.reload()\n",
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::UselessSetting);
    assert_eq!(
        found[0].message,
        "on-change has no effect in [series], it applies to: [dropdown]"
    );
}

#[test]
fn test_icon_alert_style_needs_expression_on_pie() {
    let found = diagnostics(
        r#"[configuration]
[group]
[widget]
  type = pie
  icon-alert-style = color: red
  icon-color = green
  [series]
    entity = nurswgvml007
    metric = cpu_busy
"#,
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::MissingDependentSetting);
    assert_eq!(
        found[0].message,
        "icon-alert-expression is required if icon-alert-style is specified and type is pie"
    );
}

#[test]
fn test_useless_centralize_ticks() {
    let codes = check_codes(&chart_widget("  centralize-ticks = true"));
    assert_eq!(codes, vec![DiagnosticCode::UselessSetting]);
    check_no_diagnostics(&chart_widget("  mode = column\n  centralize-ticks = true"));
}

#[test]
fn test_layout_overflow() {
    let found = diagnostics(
        r#"[configuration]
  width-units = 2
[group]
[widget]
  type = chart
  width-units = 1.5
  [series]
    entity = nurswgvml007
    metric = cpu_busy
[widget]
  type = chart
  [series]
    entity = nurswgvml007
    metric = cpu_busy
"#,
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::LayoutOverflow);
    assert_eq!(
        found[0].message,
        "widgets in this row need 2.5 width-units, the grid has 2"
    );
    assert_eq!(found[0].range.start.line, 9);
}

#[test]
fn test_disabled_rules() {
    let source = chart_widget("  colors = red, yellow\n  thresholds = 0, 60");
    let mut config = fixed_config();
    config.disabled_rules = vec!["colors-thresholds".into()];
    assert!(diagnostics_with(&source, config).is_empty());
}

#[test]
fn test_source_is_stamped() {
    let mut config = fixed_config();
    config.source = "charts".into();
    let found = diagnostics_with(&chart_widget("  colour = red"), config);
    assert_eq!(found[0].source, "charts");
}

#[test]
fn test_diagnostics_listing() {
    let mut config = fixed_config();
    config.suggestions = false;
    let found = diagnostics_with(
        r#"[configuration]
  width-units = 1
[group]
[widget]
  type = chart
  colour = red
  centralize-ticks = true
  [series]
    entity = nurswgvml007
    metric = cpu_busy
    statistic = percentile_95
[widget]
  type = pie
  mode = stack
  [series]
    entity = nurswgvml007
    value = 1
"#,
        config,
    );
    expect![[r#"
        error[E201]: unknown setting 'colour' (at 5:2..5:8)
        warning[W002]: percentile_95 is deprecated, use percentile(95) instead (at 10:16..10:29)
        error[E203]: 'stack' is not a valid mode, expected one of: pie, ring (at 13:9..13:14)
        warning[W003]: widgets in this row need 2 width-units, the grid has 1 (at 11:1..11:7)
        warning[W001]: centralize-ticks has no effect unless mode is one of: column, column-stack (at 6:2..6:18)
    "#]]
    .assert_eq(&render(&found));
}

#[test]
fn test_alert_expression_on_each_series() {
    check_no_diagnostics(
        r#"[configuration]
[group]
[widget]
  type = chart
  alert-style = color: red
  [series]
    entity = nurswgvml007
    metric = cpu_busy
    alert-expression = value > 1
  [series]
    entity = nurswgvml006
    metric = cpu_busy
    alert-expression = value > 2
"#,
    );
}

#[test]
fn test_alert_style_without_any_expression() {
    let found = diagnostics(&chart_widget("  alert-style = color: red"));
    assert_eq!(found.len(), 1);
    assert_eq!(
        found[0].message,
        "alert-expression is required if alert-style is specified"
    );
    assert_eq!(found[0].range.start.line, 4);
}

#[test]
fn test_date_out_of_range_in_zone() {
    let found = diagnostics(&chart_widget(
        "  timezone = america/new_york\n  start-time = 2020-01-01\n  end-time = 2020-12-31t23:00 + 260122 year",
    ));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].code, DiagnosticCode::InvalidDate);
    assert_eq!(found[0].message, "end-time: date out of range");
}

#[test]
fn test_date_that_fails_to_evaluate() {
    let codes = check_codes(&chart_widget("  end-time = now + 1.5 month"));
    assert_eq!(codes, vec![DiagnosticCode::InvalidDate]);
}
