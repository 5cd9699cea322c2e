//! Shared helpers for validation tests.
#![allow(dead_code, unused_imports)]

pub use chartcfg_hir::{
    Catalog, Diagnostic, DiagnosticCode, DiagnosticSeverity, Validator, ValidatorConfig,
};
use chrono::{TimeZone, Utc};

/// Configuration with "now" fixed at Thursday 2021-06-10 15:30 UTC.
pub fn fixed_config() -> ValidatorConfig {
    ValidatorConfig::default().with_now(Utc.with_ymd_and_hms(2021, 6, 10, 15, 30, 0).unwrap())
}

/// Validates with the bundled catalog and `config`.
pub fn diagnostics_with(source: &str, config: ValidatorConfig) -> Vec<Diagnostic> {
    let catalog = Catalog::bundled();
    Validator::new(catalog.as_ref(), config).validate(source)
}

/// Validates with the bundled catalog and a fixed "now".
pub fn diagnostics(source: &str) -> Vec<Diagnostic> {
    diagnostics_with(source, fixed_config())
}

/// Codes of every diagnostic, in report order.
pub fn check_codes(source: &str) -> Vec<DiagnosticCode> {
    diagnostics(source).iter().map(|d| d.code).collect()
}

/// Helper to assert a document is clean.
pub fn check_no_diagnostics(source: &str) {
    let found = diagnostics(source);
    assert!(found.is_empty(), "Expected no diagnostics, got: {:#?}", found);
}

/// One rendered diagnostic per line.
pub fn render(diagnostics: &[Diagnostic]) -> String {
    let mut out = String::new();
    for diagnostic in diagnostics {
        out.push_str(&diagnostic.to_string());
        out.push('\n');
    }
    out
}

/// Wraps widget settings and one complete series in the required parents.
pub fn chart_widget(widget_settings: &str) -> String {
    format!(
        "[configuration]\n[group]\n[widget]\n  type = chart\n{widget_settings}\n  [series]\n    entity = nurswgvml007\n    metric = cpu_busy\n"
    )
}
