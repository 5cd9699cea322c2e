//! The validation pass: scan, build, then run rules.

mod blocks;

use chartcfg_syntax::{classify_line, LineKind, LineSource, TextRange};
use chartcfg_time::{parse_zone, Zone};
use chrono::{DateTime, Utc};
use smol_str::SmolStr;
use tracing::debug;

use crate::catalog::{Catalog, ResourceProvider, Scope};
use crate::config::ValidatorConfig;
use crate::dependency::DependencyStack;
use crate::diagnostics::{Diagnostic, DiagnosticBuilder, DiagnosticCode};
use crate::rules::{run_rules, RuleContext};
use crate::sections::SectionKind;
use crate::settings::{
    check_value, format_suggestion_list, resolve, top_ranked_suggestions, DateContext, Resolution,
    Setting,
};
use crate::tree::SectionTree;
use blocks::BlockStack;

/// Validates `text` with the bundled catalog and default configuration.
#[must_use]
pub fn validate(text: &str) -> Vec<Diagnostic> {
    let catalog = Catalog::bundled();
    Validator::new(catalog.as_ref(), ValidatorConfig::default()).validate(text)
}

/// Validates documents against a resource provider.
///
/// A validator holds no per-document state; one instance may validate any
/// number of documents, and separate instances may share the provider
/// across threads.
pub struct Validator<'p> {
    provider: &'p dyn ResourceProvider,
    config: ValidatorConfig,
}

impl<'p> Validator<'p> {
    /// Creates a validator.
    #[must_use]
    pub fn new(provider: &'p dyn ResourceProvider, config: ValidatorConfig) -> Self {
        Self { provider, config }
    }

    /// Runs one full pass over `text`.
    #[must_use]
    pub fn validate(&self, text: &str) -> Vec<Diagnostic> {
        let source = LineSource::new(text);
        let mut pass = Pass::new(self);
        for (line_no, line) in source.iter() {
            pass.line(line_no, line);
        }
        pass.finish(source.len())
    }
}

struct PendingSection {
    header: TextRange,
    kind: SectionKind,
    settings: Vec<(Setting, u32)>,
}

/// State of one validation pass.
struct Pass<'v, 'p> {
    validator: &'v Validator<'p>,
    /// "Now" for the whole pass.
    now: DateTime<Utc>,
    diagnostics: DiagnosticBuilder,
    stack: DependencyStack<'p>,
    tree: SectionTree,
    blocks: BlockStack,
    pending: Option<PendingSection>,
    in_unknown_section: bool,
}

impl<'v, 'p> Pass<'v, 'p> {
    fn new(validator: &'v Validator<'p>) -> Self {
        Self {
            validator,
            now: validator.config.now.unwrap_or_else(Utc::now),
            diagnostics: DiagnosticBuilder::new(),
            stack: DependencyStack::new(validator.provider),
            tree: SectionTree::new(),
            blocks: BlockStack::default(),
            pending: None,
            in_unknown_section: false,
        }
    }

    fn line(&mut self, line_no: u32, text: &str) {
        let kind = classify_line(text, line_no);
        if self.blocks.in_opaque_body() {
            match kind {
                LineKind::Close(close) if Some(close.keyword) == self.blocks.innermost() => {
                    self.blocks.close(&close, &mut self.diagnostics);
                }
                _ => self.blocks.body_line(text, line_no, &mut self.diagnostics),
            }
            return;
        }
        match kind {
            LineKind::Blank => {}
            LineKind::Text => self.blocks.check_references(text, line_no, &mut self.diagnostics),
            LineKind::Section(header) => self.section(header),
            LineKind::Open(open) => self.blocks.open(&open, &mut self.diagnostics),
            LineKind::Branch(branch) => self.blocks.branch_line(&branch, &mut self.diagnostics),
            LineKind::Close(close) => self.blocks.close(&close, &mut self.diagnostics),
            LineKind::Setting { name, value } => {
                self.blocks.check_references(text, line_no, &mut self.diagnostics);
                self.setting(name, value);
            }
        }
    }

    fn flush_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            let settings = pending.settings.into_iter().map(|(setting, _)| setting).collect();
            self.tree.add_section(pending.header, pending.kind, settings);
        }
    }

    fn section(&mut self, header: TextRange) {
        self.flush_pending();
        match self.stack.push_section(&header, &mut self.diagnostics) {
            Some(kind) => {
                self.in_unknown_section = false;
                self.pending = Some(PendingSection {
                    header,
                    kind,
                    settings: Vec::new(),
                });
            }
            None => self.in_unknown_section = true,
        }
    }

    fn setting(&mut self, name: TextRange, value: TextRange) {
        if self.in_unknown_section {
            return;
        }
        let validator = self.validator;
        let provider = validator.provider;
        let config = &validator.config;
        let section = self.pending.as_ref().map_or("", |pending| pending.kind.as_str());
        let widget = self.stack.widget_type().map(SmolStr::new);
        let scope = Scope {
            section,
            widget: widget.as_deref(),
        };

        let descriptor = match resolve(provider, name.as_str(), &scope) {
            Resolution::Known(descriptor) => descriptor,
            Resolution::Exempt => return,
            Resolution::Unknown => {
                let mut message = format!("unknown setting '{}'", name.as_str());
                if config.suggestions {
                    let suggestions = top_ranked_suggestions(
                        name.as_str(),
                        provider.all_descriptors().iter().map(|descriptor| &**descriptor),
                    );
                    if !suggestions.is_empty() {
                        message.push_str(", did you mean ");
                        message.push_str(&format_suggestion_list(&suggestions));
                        message.push('?');
                    }
                }
                self.diagnostics
                    .report(DiagnosticCode::UnknownSetting, &name, message);
                return;
            }
        };

        let setting = Setting::new(descriptor, name, value);
        if let Some(notice) = &setting.descriptor.deprecated {
            self.diagnostics.report(
                DiagnosticCode::DeprecatedSetting,
                &setting.name,
                format!("{} is deprecated. {notice}", setting.canonical_name()),
            );
        }
        let dates = DateContext {
            now: self.now,
            zone: self.zone_in_scope(),
        };
        if let Some(diagnostic) = check_value(&setting, &setting.value, &dates) {
            self.diagnostics.add(diagnostic);
        }

        let branch = self.blocks.branch();
        let Some(pending) = self.pending.as_mut() else {
            return;
        };
        let earlier = pending.settings.iter_mut().find(|(existing, existing_branch)| {
            *existing_branch == branch && existing.canonical_name() == setting.canonical_name()
        });
        if let Some((existing, _)) = earlier {
            if existing.descriptor.multi_line {
                existing.values.push(setting.value);
            } else {
                self.diagnostics.add(
                    Diagnostic::at(
                        DiagnosticCode::RepeatedSetting,
                        &setting.name,
                        format!("{} is already defined", setting.canonical_name()),
                    )
                    .with_related(existing.name.range(), "first declared here"),
                );
            }
            return;
        }

        self.stack
            .declare(setting.canonical_name(), setting.raw_value());
        pending.settings.push((setting, branch));
    }

    /// The `timezone` declared on the open path, else the configured zone.
    fn zone_in_scope(&self) -> Zone {
        self.stack
            .visible("timezone")
            .and_then(|name| parse_zone(name).ok())
            .unwrap_or(self.validator.config.timezone)
    }

    fn finish(mut self, lines: usize) -> Vec<Diagnostic> {
        self.flush_pending();
        self.stack.finalize(&mut self.diagnostics);
        let Pass {
            validator,
            now,
            mut diagnostics,
            tree,
            blocks,
            ..
        } = self;
        blocks.finish(&mut diagnostics);

        let config = &validator.config;
        let ctx = RuleContext {
            tree: &tree,
            provider: validator.provider,
            now,
            default_zone: config.timezone,
        };
        run_rules(&ctx, config, &mut diagnostics);

        debug!(
            lines,
            sections = tree.len(),
            diagnostics = diagnostics.len(),
            "validation pass finished"
        );
        diagnostics.finish(&config.source)
    }
}
