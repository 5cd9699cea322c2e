//! Diagnostic types for structural and semantic findings.
//!
//! Every check in the validator reports through these types; nothing in the
//! pipeline aborts on a finding.

use chartcfg_syntax::{Range, TextRange};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

/// Default `source` stamped on every diagnostic.
pub const DEFAULT_SOURCE: &str = "chartcfg";

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticSeverity {
    /// Error - the document will not render as written.
    Error,
    /// Warning - probably a mistake, or will be ignored.
    Warning,
    /// Information - informational message.
    Information,
}

/// A diagnostic code identifying the type of diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // Block keywords (E001-E099)
    /// An opened block keyword without its `end*`.
    UnclosedBlock,
    /// An `end*` that does not close the innermost open block.
    MismatchedBlockEnd,
    /// A keyword line missing a required part (`for` without `in`, ...).
    MalformedKeyword,
    /// A reference to a name that was never declared.
    UnknownToken,

    // Sections (E100-E199)
    /// Section name not in the section table.
    UnknownSection,
    /// Section at the wrong depth or under the wrong parent.
    UnexpectedSection,
    /// A required child section never appeared.
    MissingRequiredSection,

    // Settings (E200-E299)
    /// Setting name not in the catalog.
    UnknownSetting,
    /// A single-valued setting declared twice in one section.
    RepeatedSetting,
    /// Value does not match the setting's type.
    InvalidValue,
    /// Date value that the time expression engine rejects.
    InvalidDate,
    /// Object value that is not a structured literal.
    InvalidObject,

    // Cross-setting rules (E300-E399)
    /// A setting that needs another one which is absent.
    MissingDependentSetting,
    /// `colors` count does not fit `thresholds`.
    ColorsMismatch,
    /// Two date settings in the wrong order.
    InvalidTimeRange,

    // Warnings (W001-W099)
    /// A setting that has no effect in its scope.
    UselessSetting,
    /// A setting kept only for backward compatibility.
    DeprecatedSetting,
    /// Widgets do not fit the declared grid.
    LayoutOverflow,
}

impl DiagnosticCode {
    /// Returns the string code (e.g., "E101").
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            // Block keywords
            Self::UnclosedBlock => "E001",
            Self::MismatchedBlockEnd => "E002",
            Self::MalformedKeyword => "E003",
            Self::UnknownToken => "E004",
            // Sections
            Self::UnknownSection => "E101",
            Self::UnexpectedSection => "E102",
            Self::MissingRequiredSection => "E103",
            // Settings
            Self::UnknownSetting => "E201",
            Self::RepeatedSetting => "E202",
            Self::InvalidValue => "E203",
            Self::InvalidDate => "E204",
            Self::InvalidObject => "E205",
            // Rules
            Self::MissingDependentSetting => "E301",
            Self::ColorsMismatch => "E302",
            Self::InvalidTimeRange => "E303",
            // Warnings
            Self::UselessSetting => "W001",
            Self::DeprecatedSetting => "W002",
            Self::LayoutOverflow => "W003",
        }
    }

    /// Returns the default severity for this diagnostic code.
    #[must_use]
    pub fn severity(&self) -> DiagnosticSeverity {
        match self {
            Self::UnclosedBlock
            | Self::MismatchedBlockEnd
            | Self::MalformedKeyword
            | Self::UnknownToken
            | Self::UnknownSection
            | Self::UnexpectedSection
            | Self::MissingRequiredSection
            | Self::UnknownSetting
            | Self::RepeatedSetting
            | Self::InvalidValue
            | Self::InvalidDate
            | Self::InvalidObject
            | Self::MissingDependentSetting
            | Self::ColorsMismatch
            | Self::InvalidTimeRange => DiagnosticSeverity::Error,

            Self::UselessSetting | Self::DeprecatedSetting | Self::LayoutOverflow => {
                DiagnosticSeverity::Warning
            }
        }
    }
}

/// Related information for a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    /// The location of the related information.
    pub range: Range,
    /// The message.
    pub message: String,
}

/// A diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: DiagnosticCode,
    /// The severity level.
    pub severity: DiagnosticSeverity,
    /// The document range where the diagnostic applies.
    pub range: Range,
    /// The diagnostic message.
    pub message: String,
    /// Fixed producer name.
    pub source: SmolStr,
    /// Related information (e.g., "first declared here").
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    /// Creates a diagnostic with the code's default severity.
    pub fn new(code: DiagnosticCode, range: Range, message: impl Into<String>) -> Self {
        Self {
            severity: code.severity(),
            code,
            range,
            message: message.into(),
            source: SmolStr::new_static(DEFAULT_SOURCE),
            related: Vec::new(),
        }
    }

    /// Creates a diagnostic located at a scanned text range.
    pub fn at(code: DiagnosticCode, text: &TextRange, message: impl Into<String>) -> Self {
        Self::new(code, text.range(), message)
    }

    /// Adds related information to the diagnostic.
    #[must_use]
    pub fn with_related(mut self, range: Range, message: impl Into<String>) -> Self {
        self.related.push(RelatedInfo {
            range,
            message: message.into(),
        });
        self
    }

    /// Returns true if this is an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Information => "info",
        };
        write!(
            f,
            "{severity}[{}]: {} (at {})",
            self.code.code(),
            self.message,
            self.range
        )
    }
}

/// Builder for collecting diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticBuilder {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBuilder {
    /// Creates a new diagnostic builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Adds a diagnostic at a scanned text range.
    pub fn report(&mut self, code: DiagnosticCode, text: &TextRange, message: impl Into<String>) {
        self.add(Diagnostic::at(code, text, message));
    }

    /// Number of diagnostics collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    /// Returns true if nothing was reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Consumes the builder, stamps `source` on every diagnostic and drops
    /// repeats of an earlier diagnostic with the same range and message.
    #[must_use]
    pub fn finish(self, source: &str) -> Vec<Diagnostic> {
        let source = SmolStr::new(source);
        let mut seen = FxHashSet::default();
        self.diagnostics
            .into_iter()
            .filter(|diagnostic| seen.insert((diagnostic.range, diagnostic.message.clone())))
            .map(|mut diagnostic| {
                diagnostic.source = source.clone();
                diagnostic
            })
            .collect()
    }
}
