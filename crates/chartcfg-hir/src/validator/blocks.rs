//! Block keyword state machine: `for`/`if` nesting, opaque bodies, and the
//! names those blocks declare.

use chartcfg_syntax::{BlockKeyword, BranchKeyword, KeywordLine, TextRange};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::diagnostics::{DiagnosticBuilder, DiagnosticCode};

#[derive(Debug)]
struct CsvState {
    columns: usize,
    header_open: bool,
}

#[derive(Debug)]
struct BlockFrame {
    keyword: BlockKeyword,
    range: TextRange,
    /// Branch id of the active `if`/`elseif`/`else` arm.
    branch: u32,
    loop_var: Option<SmolStr>,
    csv: Option<CsvState>,
}

impl BlockFrame {
    fn new(keyword: BlockKeyword, range: TextRange) -> Self {
        Self {
            keyword,
            range,
            branch: 0,
            loop_var: None,
            csv: None,
        }
    }
}

/// Open block keywords plus everything declared so far.
#[derive(Debug, Default)]
pub(crate) struct BlockStack {
    frames: Vec<BlockFrame>,
    declared: FxHashSet<SmolStr>,
    next_branch: u32,
}

impl BlockStack {
    /// True while the cursor is inside a body that is not configuration
    /// (`var`, `list`, `csv`, `sql`, `script`).
    pub(crate) fn in_opaque_body(&self) -> bool {
        self.frames
            .last()
            .is_some_and(|frame| frame.keyword.has_opaque_body())
    }

    /// Keyword of the innermost block.
    pub(crate) fn innermost(&self) -> Option<BlockKeyword> {
        self.frames.last().map(|frame| frame.keyword)
    }

    /// Id of the innermost conditional arm, 0 outside conditionals.
    pub(crate) fn branch(&self) -> u32 {
        self.frames
            .iter()
            .rev()
            .find(|frame| frame.keyword == BlockKeyword::If)
            .map_or(0, |frame| frame.branch)
    }

    fn fresh_branch(&mut self) -> u32 {
        self.next_branch += 1;
        self.next_branch
    }

    fn is_known(&self, name: &str) -> bool {
        self.declared.contains(name)
            || self
                .frames
                .iter()
                .any(|frame| frame.loop_var.as_deref() == Some(name))
    }

    pub(crate) fn open(&mut self, line: &KeywordLine<BlockKeyword>, diagnostics: &mut DiagnosticBuilder) {
        let mut frame = BlockFrame::new(line.keyword, line.range.clone());
        match line.keyword {
            BlockKeyword::For => match parse_for(&line.tail) {
                Some((var, collection)) => {
                    self.check_collection(&collection, diagnostics);
                    frame.loop_var = Some(var.text);
                }
                None => diagnostics.report(
                    DiagnosticCode::MalformedKeyword,
                    &line.range,
                    "for must be followed by '<name> in <collection>'",
                ),
            },
            BlockKeyword::If => {
                if line.tail.as_str().is_empty() {
                    diagnostics.report(
                        DiagnosticCode::MalformedKeyword,
                        &line.range,
                        "if must be followed by a condition",
                    );
                }
                frame.branch = self.fresh_branch();
            }
            BlockKeyword::Var | BlockKeyword::List | BlockKeyword::Csv => {
                let (name, rest) = split_declaration(line.tail.as_str());
                if name.is_empty() {
                    diagnostics.report(
                        DiagnosticCode::MalformedKeyword,
                        &line.range,
                        format!("{} must be followed by a name", line.keyword),
                    );
                } else {
                    self.declared.insert(SmolStr::new(name));
                }
                if line.keyword == BlockKeyword::Csv {
                    let header = rest.trim();
                    frame.csv = Some(CsvState {
                        columns: header_columns(header),
                        header_open: header.is_empty() || header.ends_with(','),
                    });
                }
            }
            BlockKeyword::Sql | BlockKeyword::Script => {}
        }
        if !line.range.can_be_unclosed {
            self.frames.push(frame);
        }
    }

    fn check_collection(&self, collection: &TextRange, diagnostics: &mut DiagnosticBuilder) {
        let text = collection.as_str();
        if text.starts_with('[') || text.contains("@{") {
            return;
        }
        let base_len = text
            .find(|ch: char| !is_identifier_char(ch))
            .unwrap_or(text.len());
        let base = &text[..base_len];
        if base.is_empty() || text[base_len..].trim_start().starts_with('(') {
            return;
        }
        if !self.is_known(base) {
            diagnostics.report(
                DiagnosticCode::UnknownToken,
                &TextRange::new(base, collection.line, collection.start, collection.start + to_u32(base.len())),
                format!("unknown name '{base}'"),
            );
        }
    }

    pub(crate) fn branch_line(
        &mut self,
        line: &KeywordLine<BranchKeyword>,
        diagnostics: &mut DiagnosticBuilder,
    ) {
        if self.innermost() != Some(BlockKeyword::If) {
            diagnostics.report(
                DiagnosticCode::MismatchedBlockEnd,
                &line.range,
                format!("'{}' has no matching 'if'", line.keyword.as_str()),
            );
            return;
        }
        if line.keyword == BranchKeyword::ElseIf && line.tail.as_str().is_empty() {
            diagnostics.report(
                DiagnosticCode::MalformedKeyword,
                &line.range,
                "elseif must be followed by a condition",
            );
        }
        let branch = self.fresh_branch();
        if let Some(frame) = self.frames.last_mut() {
            frame.branch = branch;
        }
    }

    pub(crate) fn close(&mut self, line: &KeywordLine<BlockKeyword>, diagnostics: &mut DiagnosticBuilder) {
        let Some(position) = self
            .frames
            .iter()
            .rposition(|frame| frame.keyword == line.keyword)
        else {
            diagnostics.report(
                DiagnosticCode::MismatchedBlockEnd,
                &line.range,
                format!(
                    "'{}' has no matching '{}'",
                    line.keyword.end_keyword(),
                    line.keyword
                ),
            );
            return;
        };
        for unclosed in self.frames.drain(position..).skip(1) {
            report_unclosed(&unclosed, diagnostics);
        }
    }

    /// A line inside an opaque body that does not close it.
    pub(crate) fn body_line(&mut self, text: &str, line_no: u32, diagnostics: &mut DiagnosticBuilder) {
        let Some(csv) = self.frames.last_mut().and_then(|frame| frame.csv.as_mut()) else {
            return;
        };
        let row = text.trim();
        if row.is_empty() {
            return;
        }
        if csv.header_open {
            csv.columns += header_columns(row);
            csv.header_open = row.ends_with(',');
            return;
        }
        let cells = count_cells(row);
        if cells != csv.columns {
            let start = text.len() - text.trim_start().len();
            diagnostics.report(
                DiagnosticCode::InvalidValue,
                &TextRange::at(row, line_no, start),
                format!("expected {} columns, found {cells}", csv.columns),
            );
        }
    }

    /// Checks bare `@{name}` references on a line inside a loop body.
    pub(crate) fn check_references(&self, text: &str, line_no: u32, diagnostics: &mut DiagnosticBuilder) {
        if !self.frames.iter().any(|frame| frame.keyword == BlockKeyword::For) {
            return;
        }
        let mut offset = 0;
        while let Some(found) = text[offset..].find("@{") {
            let start = offset + found + 2;
            let Some(length) = text[start..].find('}') else {
                return;
            };
            let name = text[start..start + length].trim();
            let leading = text[start..].len() - text[start..].trim_start().len();
            if !name.is_empty() && name.chars().all(is_identifier_char) && !self.is_known(name) {
                diagnostics.report(
                    DiagnosticCode::UnknownToken,
                    &TextRange::at(name, line_no, start + leading),
                    format!("unknown name '{name}'"),
                );
            }
            offset = start + length + 1;
        }
    }

    /// Reports every block still open at the end of the document.
    pub(crate) fn finish(self, diagnostics: &mut DiagnosticBuilder) {
        for frame in &self.frames {
            report_unclosed(frame, diagnostics);
        }
    }
}

fn report_unclosed(frame: &BlockFrame, diagnostics: &mut DiagnosticBuilder) {
    if frame.range.can_be_unclosed {
        return;
    }
    diagnostics.report(
        DiagnosticCode::UnclosedBlock,
        &frame.range,
        format!(
            "'{}' is not closed, expected '{}'",
            frame.keyword,
            frame.keyword.end_keyword()
        ),
    );
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_'
}

/// `<var> in <collection>`, with ranges for both parts.
fn parse_for(tail: &TextRange) -> Option<(TextRange, TextRange)> {
    let text = tail.as_str();
    let var_end = text.find(char::is_whitespace)?;
    let var = &text[..var_end];
    if var.is_empty() || !var.chars().all(is_identifier_char) {
        return None;
    }
    let after_var = &text[var_end..];
    let in_start = var_end + (after_var.len() - after_var.trim_start().len());
    let after_in = text[in_start..].strip_prefix("in")?;
    if !after_in.starts_with(char::is_whitespace) {
        return None;
    }
    let collection_start = in_start + 2 + (after_in.len() - after_in.trim_start().len());
    let collection = text[collection_start..].trim_end();
    if collection.is_empty() {
        return None;
    }
    let base = tail.start as usize;
    Some((
        TextRange::at(var, tail.line, base),
        TextRange::at(collection, tail.line, base + collection_start),
    ))
}

/// Splits `name = rest` or `name from rest` into the name and the rest.
fn split_declaration(tail: &str) -> (&str, &str) {
    let name_end = tail
        .find(|ch: char| ch == '=' || ch.is_whitespace())
        .unwrap_or(tail.len());
    let name = &tail[..name_end];
    let rest = tail[name_end..].trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest);
    (name, rest)
}

/// Cells in one csv line; commas inside double quotes do not separate.
fn count_cells(row: &str) -> usize {
    let mut cells = 1;
    let mut quoted = false;
    for ch in row.chars() {
        match ch {
            '"' => quoted = !quoted,
            ',' if !quoted => cells += 1,
            _ => {}
        }
    }
    cells
}

/// Columns contributed by a header line; a trailing comma continues the
/// header on the next line instead of opening an empty column.
fn header_columns(header: &str) -> usize {
    if header.is_empty() {
        return 0;
    }
    let cells = count_cells(header);
    if header.ends_with(',') {
        cells - 1
    } else {
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartcfg_syntax::{classify_line, LineKind};

    fn run(lines: &[&str]) -> Vec<(DiagnosticCode, String)> {
        let mut blocks = BlockStack::default();
        let mut diagnostics = DiagnosticBuilder::new();
        for (line_no, line) in (0u32..).zip(lines) {
            let kind = classify_line(line, line_no);
            if blocks.in_opaque_body() {
                match kind {
                    LineKind::Close(close) if Some(close.keyword) == blocks.innermost() => {
                        blocks.close(&close, &mut diagnostics);
                    }
                    _ => blocks.body_line(line, line_no, &mut diagnostics),
                }
                continue;
            }
            match kind {
                LineKind::Open(open) => blocks.open(&open, &mut diagnostics),
                LineKind::Branch(branch) => blocks.branch_line(&branch, &mut diagnostics),
                LineKind::Close(close) => blocks.close(&close, &mut diagnostics),
                _ => blocks.check_references(line, line_no, &mut diagnostics),
            }
        }
        blocks.finish(&mut diagnostics);
        diagnostics
            .finish("test")
            .into_iter()
            .map(|diagnostic| (diagnostic.code, diagnostic.message))
            .collect()
    }

    #[test]
    fn test_balanced_blocks() {
        assert!(run(&[
            "list servers = a, b",
            "for s in servers",
            "  if s == 'a'",
            "    entity = @{s}",
            "  else",
            "    entity = b",
            "  endif",
            "endfor",
        ])
        .is_empty());
    }

    #[test]
    fn test_undeclared_collection() {
        let found = run(&["for s in servers", "entity = @{s}", "endfor"]);
        assert_eq!(
            found,
            vec![(DiagnosticCode::UnknownToken, "unknown name 'servers'".to_string())]
        );
    }

    #[test]
    fn test_missing_end() {
        let found = run(&["var hosts = [", "  'a'", "]", "endvar", "for h in hosts"]);
        assert_eq!(
            found,
            vec![(
                DiagnosticCode::UnclosedBlock,
                "'for' is not closed, expected 'endfor'".to_string()
            )]
        );
    }

    #[test]
    fn test_end_closing_outer_block() {
        let found = run(&["if a", "for s in [1, 2]", "endif"]);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, DiagnosticCode::UnclosedBlock);

        let found = run(&["endfor"]);
        assert_eq!(
            found,
            vec![(
                DiagnosticCode::MismatchedBlockEnd,
                "'endfor' has no matching 'for'".to_string()
            )]
        );
    }

    #[test]
    fn test_malformed_keywords() {
        let found: Vec<_> = run(&["for servers", "endfor", "if", "endif"])
            .into_iter()
            .map(|(code, _)| code)
            .collect();
        assert_eq!(
            found,
            vec![DiagnosticCode::MalformedKeyword, DiagnosticCode::MalformedKeyword]
        );
    }

    #[test]
    fn test_csv_rows() {
        let found = run(&[
            "csv rows = name, value,",
            "  weight",
            "a, 1, 2",
            "\"b, c\", 3, 4",
            "d, 5",
            "endcsv",
            "for r in rows",
            "endfor",
        ]);
        assert_eq!(
            found,
            vec![(DiagnosticCode::InvalidValue, "expected 3 columns, found 2".to_string())]
        );
    }

    #[test]
    fn test_unknown_loop_reference() {
        let found = run(&["list xs = a", "for x in xs", "label = @{y} @{x.name}", "endfor"]);
        assert_eq!(
            found,
            vec![(DiagnosticCode::UnknownToken, "unknown name 'y'".to_string())]
        );
    }

    #[test]
    fn test_branch_ids_differ() {
        let mut blocks = BlockStack::default();
        let mut diagnostics = DiagnosticBuilder::new();
        let LineKind::Open(open) = classify_line("if a", 0) else {
            panic!("expected open");
        };
        blocks.open(&open, &mut diagnostics);
        let first = blocks.branch();
        let LineKind::Branch(branch) = classify_line("else", 1) else {
            panic!("expected branch");
        };
        blocks.branch_line(&branch, &mut diagnostics);
        assert_ne!(first, blocks.branch());
        assert_ne!(blocks.branch(), 0);
    }
}
