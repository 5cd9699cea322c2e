//! Single-path structural validation during the scan.
//!
//! The stack holds one frame per open section from the root down to the
//! cursor. Frames carry requirement options: name sets that must all appear
//! below the frame. A frame is satisfied when it has no options or any one
//! option has been fully seen. Frames are checked when they are discarded.

use chartcfg_syntax::TextRange;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::catalog::{Alternative, ResourceProvider};
use crate::diagnostics::{DiagnosticBuilder, DiagnosticCode};
use crate::sections::SectionKind;

#[derive(Debug)]
struct Frame {
    header: Option<TextRange>,
    kind: Option<SectionKind>,
    settings: FxHashMap<SmolStr, SmolStr>,
    options: Vec<Vec<SmolStr>>,
}

impl Frame {
    fn open(header: TextRange, kind: SectionKind) -> Self {
        Self {
            header: Some(header),
            kind: Some(kind),
            settings: FxHashMap::default(),
            options: kind
                .required_children()
                .iter()
                .map(|child| vec![SmolStr::new_static(child)])
                .collect(),
        }
    }

    /// Stands in for a level the document skipped.
    fn implicit() -> Self {
        Self {
            header: None,
            kind: None,
            settings: FxHashMap::default(),
            options: Vec::new(),
        }
    }

    fn is_satisfied(&self) -> bool {
        self.options.is_empty() || self.options.iter().any(Vec::is_empty)
    }
}

/// The open path from the document root to the scan cursor.
pub struct DependencyStack<'p> {
    provider: &'p dyn ResourceProvider,
    frames: Vec<Frame>,
}

impl<'p> DependencyStack<'p> {
    /// Creates an empty stack.
    #[must_use]
    pub fn new(provider: &'p dyn ResourceProvider) -> Self {
        Self {
            provider,
            frames: Vec::new(),
        }
    }

    /// Number of open frames.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Handles a section header. Returns the section kind when it is known.
    pub fn push_section(
        &mut self,
        header: &TextRange,
        diagnostics: &mut DiagnosticBuilder,
    ) -> Option<SectionKind> {
        let Some(kind) = SectionKind::from_name(header.as_str()) else {
            diagnostics.report(
                DiagnosticCode::UnknownSection,
                header,
                format!("unknown section [{}]", header.as_str()),
            );
            return None;
        };

        let mut depth = kind.depth();
        let len = self.frames.len();
        if kind.is_inheritable() && depth > len && len >= kind.min_depth() {
            depth = len;
        }

        if depth > len {
            let expected: Vec<String> = SectionKind::at_depth(len)
                .map(|expected| format!("[{expected}]"))
                .collect();
            diagnostics.report(
                DiagnosticCode::UnexpectedSection,
                header,
                format!(
                    "unexpected section [{kind}], expected {}",
                    join_alternatives(&expected)
                ),
            );
            while self.frames.len() < depth {
                self.frames.push(Frame::implicit());
            }
        } else {
            while self.frames.len() > depth {
                self.pop(diagnostics);
            }
        }

        let parents = kind.parents();
        if !parents.is_empty() {
            let parent = self.frames.last().and_then(|frame| frame.kind);
            if parent.is_some_and(|parent| !kind.accepts_parent(parent)) {
                let names: Vec<String> = parents.iter().map(|p| format!("[{p}]")).collect();
                diagnostics.report(
                    DiagnosticCode::UnexpectedSection,
                    header,
                    format!("[{kind}] must be inside {}", join_alternatives(&names)),
                );
            }
        }

        for frame in &mut self.frames {
            for option in &mut frame.options {
                option.retain(|name| name != kind.as_str());
            }
        }
        self.frames.push(Frame::open(header.clone(), kind));
        Some(kind)
    }

    /// Records a setting declared in the innermost section.
    ///
    /// A widget `type` installs the child sections that widget type needs in
    /// place of the default requirement.
    pub fn declare(&mut self, name: &str, value: &str) {
        let provider = self.provider;
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        if frame.kind == Some(SectionKind::Widget) && name == "type" {
            if let Some(sections) = provider.required_sections_by_widget_type().get(value) {
                frame.options = sections.iter().map(|section| vec![section.clone()]).collect();
            }
        }
        frame.settings.insert(SmolStr::new(name), SmolStr::new(value));
    }

    /// Nearest declared value of `name` on the open path.
    #[must_use]
    pub fn visible(&self, name: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.settings.get(name))
            .map(SmolStr::as_str)
    }

    /// Widget type in effect at the cursor.
    ///
    /// Only `configuration`, `group` and `widget` frames are consulted, so a
    /// nested section's own `type` does not shadow it.
    #[must_use]
    pub fn widget_type(&self) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .filter(|frame| frame.kind.is_some_and(|kind| kind.depth() <= 2))
            .find_map(|frame| frame.settings.get("type"))
            .map(SmolStr::as_str)
    }

    /// Checks and discards every remaining frame.
    pub fn finalize(&mut self, diagnostics: &mut DiagnosticBuilder) {
        while !self.frames.is_empty() {
            self.pop(diagnostics);
        }
    }

    fn pop(&mut self, diagnostics: &mut DiagnosticBuilder) {
        self.check_required_settings(diagnostics);
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let (Some(header), false) = (&frame.header, frame.is_satisfied()) else {
            return;
        };
        let missing: Vec<String> = frame
            .options
            .iter()
            .map(|option| {
                option
                    .iter()
                    .map(|name| format!("[{name}]"))
                    .collect::<Vec<_>>()
                    .join(" + ")
            })
            .collect();
        diagnostics.report(
            DiagnosticCode::MissingRequiredSection,
            header,
            format!(
                "[{}] requires {}",
                header.as_str(),
                join_alternatives(&missing)
            ),
        );
    }

    /// Checks the innermost frame against the settings its kind requires,
    /// looking in the frame and every frame below it.
    fn check_required_settings(&self, diagnostics: &mut DiagnosticBuilder) {
        let Some(frame) = self.frames.last() else {
            return;
        };
        let (Some(kind), Some(header)) = (frame.kind, &frame.header) else {
            return;
        };
        let Some(requirement) = self.provider.required_section_settings().get(kind.as_str())
        else {
            return;
        };
        let visible = |name: &str| {
            self.frames
                .iter()
                .any(|frame| frame.settings.contains_key(name))
        };
        for group in requirement.unmet(visible) {
            let names: Vec<String> = group.iter().map(Alternative::to_string).collect();
            diagnostics.report(
                DiagnosticCode::MissingDependentSetting,
                header,
                format!("{} is required", names.join(" or ")),
            );
        }
    }
}

fn join_alternatives(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [one] => one.clone(),
        [init @ .., last] => format!("{} or {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::diagnostics::Diagnostic;

    fn run(lines: &[&str]) -> Vec<Diagnostic> {
        let catalog = Catalog::bundled();
        let mut stack = DependencyStack::new(catalog.as_ref());
        let mut diagnostics = DiagnosticBuilder::new();
        for (line_no, line) in (0u32..).zip(lines) {
            if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
                stack.push_section(&TextRange::at(name, line_no, 1), &mut diagnostics);
            } else if let Some((name, value)) = line.split_once(" = ") {
                stack.declare(name, value);
            }
        }
        stack.finalize(&mut diagnostics);
        diagnostics.finish("test")
    }

    fn messages(lines: &[&str]) -> Vec<String> {
        run(lines).into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_complete_path_is_clean() {
        assert!(messages(&[
            "[configuration]",
            "[group]",
            "[widget]",
            "type = chart",
            "[series]",
            "entity = x",
            "metric = y",
        ])
        .is_empty());
    }

    #[test]
    fn test_missing_children() {
        assert_eq!(
            messages(&["[configuration]", "[group]", "[widget]", "type = chart"]),
            vec!["[widget] requires [series]"]
        );
        assert_eq!(
            messages(&["[configuration]"]),
            vec!["[configuration] requires [group]"]
        );
    }

    #[test]
    fn test_widget_type_installs_sections() {
        assert!(messages(&["[configuration]", "[group]", "[widget]", "type = page"]).is_empty());
        assert_eq!(
            messages(&["[configuration]", "[group]", "[widget]", "type = property", "[series]", "entity = e", "metric = m"]),
            vec!["[widget] requires [property]"]
        );
    }

    #[test]
    fn test_unexpected_depth() {
        assert_eq!(
            messages(&["[configuration]", "[widget]", "type = page"]),
            vec![
                "unexpected section [widget], expected [group]",
                "[configuration] requires [group]",
            ]
        );
    }

    #[test]
    fn test_option_parent() {
        let found = messages(&[
            "[configuration]",
            "[group]",
            "[widget]",
            "type = page",
            "[series]",
            "entity = e",
            "metric = m",
            "[option]",
        ]);
        assert_eq!(found, vec!["[option] must be inside [dropdown]"]);
    }

    #[test]
    fn test_inheritable_tags_stay_at_depth() {
        assert!(messages(&[
            "[configuration]",
            "[tags]",
            "[group]",
            "[widget]",
            "type = page",
        ])
        .is_empty());
    }

    #[test]
    fn test_required_settings_search_ancestors() {
        assert!(messages(&[
            "[configuration]",
            "entity = e",
            "[group]",
            "[widget]",
            "type = chart",
            "[series]",
            "metric = m",
        ])
        .is_empty());
        assert_eq!(
            messages(&["[configuration]", "[group]", "[widget]", "type = chart", "[series]", "entity = e"]),
            vec!["metric or table + attribute is required"]
        );
        assert!(messages(&["[configuration]", "[group]", "[widget]", "type = chart", "[series]", "value = 1"])
            .is_empty());
    }

    #[test]
    fn test_unknown_section() {
        let found = run(&["[configuration]", "[gruop]", "[group]", "[widget]", "type = page"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].code, DiagnosticCode::UnknownSection);
    }
}
