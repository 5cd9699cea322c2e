//! Per-line classification: section headers, block keywords and settings.

mod tokens;

pub use tokens::HeadToken;

use logos::Logos;
use std::fmt;

use crate::range::TextRange;

/// Keywords that may open a multi-line block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKeyword {
    /// `for <var> in <collection>` ... `endfor`
    For,
    /// `if <condition>` ... `endif`
    If,
    /// `var <name> = <value>`, multi-line until `endvar`
    Var,
    /// `list <name> = <items>`, multi-line until `endlist`
    List,
    /// `csv <name> = <header>` ... `endcsv`
    Csv,
    /// `sql` ... `endsql`
    Sql,
    /// `script` ... `endscript`
    Script,
}

impl BlockKeyword {
    /// All block keywords.
    pub const ALL: [BlockKeyword; 7] = [
        Self::For,
        Self::If,
        Self::Var,
        Self::List,
        Self::Csv,
        Self::Sql,
        Self::Script,
    ];

    /// Keyword spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::For => "for",
            Self::If => "if",
            Self::Var => "var",
            Self::List => "list",
            Self::Csv => "csv",
            Self::Sql => "sql",
            Self::Script => "script",
        }
    }

    /// Spelling of the matching closing keyword.
    #[must_use]
    pub fn end_keyword(self) -> &'static str {
        match self {
            Self::For => "endfor",
            Self::If => "endif",
            Self::Var => "endvar",
            Self::List => "endlist",
            Self::Csv => "endcsv",
            Self::Sql => "endsql",
            Self::Script => "endscript",
        }
    }

    /// Returns true if the block body is opaque text (not settings or sections).
    #[must_use]
    pub fn has_opaque_body(self) -> bool {
        !matches!(self, Self::For | Self::If)
    }
}

impl fmt::Display for BlockKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Branch keywords inside an `if` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKeyword {
    /// `elseif <condition>`
    ElseIf,
    /// `else`
    Else,
}

impl BranchKeyword {
    /// Keyword spelling.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ElseIf => "elseif",
            Self::Else => "else",
        }
    }
}

/// A keyword line split into the keyword token and whatever follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordLine<K> {
    /// Which keyword.
    pub keyword: K,
    /// The keyword token. `can_be_unclosed` is set for single-line forms.
    pub range: TextRange,
    /// Trimmed text after the keyword (possibly empty).
    pub tail: TextRange,
}

/// Classification of one normalized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Nothing but whitespace.
    Blank,
    /// `[name]`; the range covers the name only.
    Section(TextRange),
    /// A block-opening keyword.
    Open(KeywordLine<BlockKeyword>),
    /// `else` / `elseif`.
    Branch(KeywordLine<BranchKeyword>),
    /// `end<keyword>`.
    Close(KeywordLine<BlockKeyword>),
    /// `name = value`.
    Setting {
        /// Setting name as written.
        name: TextRange,
        /// Trimmed value (possibly empty).
        value: TextRange,
    },
    /// Anything else.
    Text,
}

/// Classifies a normalized line.
#[must_use]
pub fn classify_line(line: &str, line_no: u32) -> LineKind {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    let mut lexer = HeadToken::lexer(line);
    let (kind, span) = loop {
        match lexer.next() {
            Some(Ok(HeadToken::Whitespace)) => continue,
            Some(Ok(kind)) => break (kind, lexer.span()),
            Some(Err(())) | None => return LineKind::Text,
        }
    };
    let token = TextRange::at(&line[span.clone()], line_no, span.start);
    let tail = tail_range(line, line_no, span.end);

    let open = |keyword: BlockKeyword| {
        let unclosed = is_single_line(keyword, tail.as_str());
        LineKind::Open(KeywordLine {
            keyword,
            range: token.clone().unclosed(unclosed),
            tail: tail.clone(),
        })
    };
    let close = |keyword: BlockKeyword| {
        LineKind::Close(KeywordLine {
            keyword,
            range: token.clone(),
            tail: tail.clone(),
        })
    };

    match kind {
        HeadToken::KwFor => open(BlockKeyword::For),
        HeadToken::KwIf => open(BlockKeyword::If),
        HeadToken::KwVar => open(BlockKeyword::Var),
        HeadToken::KwList => open(BlockKeyword::List),
        HeadToken::KwCsv => open(BlockKeyword::Csv),
        HeadToken::KwSql => open(BlockKeyword::Sql),
        HeadToken::KwScript => open(BlockKeyword::Script),
        HeadToken::KwEndFor => close(BlockKeyword::For),
        HeadToken::KwEndIf => close(BlockKeyword::If),
        HeadToken::KwEndVar => close(BlockKeyword::Var),
        HeadToken::KwEndList => close(BlockKeyword::List),
        HeadToken::KwEndCsv => close(BlockKeyword::Csv),
        HeadToken::KwEndSql => close(BlockKeyword::Sql),
        HeadToken::KwEndScript => close(BlockKeyword::Script),
        HeadToken::KwElseIf | HeadToken::KwElse => {
            let keyword = if kind == HeadToken::KwElse {
                BranchKeyword::Else
            } else {
                BranchKeyword::ElseIf
            };
            LineKind::Branch(KeywordLine {
                keyword,
                range: token.clone(),
                tail: tail.clone(),
            })
        }
        HeadToken::LBracket => section_header(line, line_no).unwrap_or(LineKind::Text),
        HeadToken::Word | HeadToken::Eq => match setting_parts(line, line_no) {
            Some((name, value)) => LineKind::Setting { name, value },
            None => LineKind::Text,
        },
        HeadToken::Whitespace => LineKind::Text,
    }
}

/// Splits a `name = value` line into name and value ranges.
///
/// The name is the text before the first `=`; it must start with a letter
/// and contain only letters, digits, spaces, `-` and `_`. `==` is not an
/// assignment.
#[must_use]
pub fn setting_parts(line: &str, line_no: u32) -> Option<(TextRange, TextRange)> {
    let eq = line.find('=')?;
    if line[eq + 1..].starts_with('=') {
        return None;
    }
    let raw_name = &line[..eq];
    let name = raw_name.trim();
    let first = name.chars().next()?;
    if !first.is_ascii_lowercase() {
        return None;
    }
    if !name
        .chars()
        .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '-' | '_' | ' ' | '\t'))
    {
        return None;
    }
    let name_start = raw_name.len() - raw_name.trim_start().len();
    let name_range = TextRange::at(name, line_no, name_start);
    Some((name_range, tail_range(line, line_no, eq + 1)))
}

/// Parses `[name]` into a range covering `name`.
fn section_header(line: &str, line_no: u32) -> Option<LineKind> {
    let open = line.find('[')?;
    let close = line[open..].find(']')? + open;
    let inner = &line[open + 1..close];
    let name = inner.trim();
    if name.is_empty() || !name.chars().all(|ch| ch.is_ascii_lowercase() || ch == '-') {
        return None;
    }
    let start = open + 1 + (inner.len() - inner.trim_start().len());
    Some(LineKind::Section(TextRange::at(name, line_no, start)))
}

/// Trimmed remainder of `line` starting at byte `from`.
fn tail_range(line: &str, line_no: u32, from: usize) -> TextRange {
    let rest = &line[from..];
    let trimmed = rest.trim();
    let start = from + (rest.len() - rest.trim_start().len());
    TextRange::at(trimmed, line_no, start)
}

/// Single-line detectors: true when the keyword line is complete on its own
/// and will not be followed by a matching `end*`.
#[must_use]
pub fn is_single_line(keyword: BlockKeyword, tail: &str) -> bool {
    match keyword {
        BlockKeyword::For | BlockKeyword::If => false,
        BlockKeyword::Var => match tail.split_once('=') {
            Some((_, value)) => {
                let value = value.trim();
                !value.is_empty() && bracket_balance(value) <= 0
            }
            None => true,
        },
        BlockKeyword::List => match tail.split_once('=') {
            Some((_, value)) => {
                let value = value.trim();
                !value.is_empty() && !value.ends_with(',')
            }
            None => true,
        },
        BlockKeyword::Csv => {
            tail.split_whitespace().nth(1) == Some("from") || !tail.contains('=')
        }
        BlockKeyword::Sql | BlockKeyword::Script => tail.starts_with('='),
    }
}

/// Opening minus closing brackets outside quoted strings.
fn bracket_balance(text: &str) -> i32 {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    for ch in text.chars() {
        match quote {
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '[' | '{' | '(' => depth += 1,
                ']' | '}' | ')' => depth -= 1,
                _ => {}
            },
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_header() {
        let LineKind::Section(name) = classify_line("  [ series ]", 4) else {
            panic!("expected section");
        };
        assert_eq!(name.as_str(), "series");
        assert_eq!((name.line, name.start, name.end), (4, 4, 10));
    }

    #[test]
    fn test_setting_line() {
        let LineKind::Setting { name, value } = classify_line("  start time = now - 1 * day", 0)
        else {
            panic!("expected setting");
        };
        assert_eq!(name.as_str(), "start time");
        assert_eq!(name.start, 2);
        assert_eq!(value.as_str(), "now - 1 * day");
        assert_eq!(value.start, 15);
    }

    #[test]
    fn test_comparison_is_not_a_setting() {
        assert_eq!(classify_line("a == b", 0), LineKind::Text);
    }

    #[test]
    fn test_open_and_close() {
        let LineKind::Open(open) = classify_line("for s in servers", 1) else {
            panic!("expected open");
        };
        assert_eq!(open.keyword, BlockKeyword::For);
        assert!(!open.range.can_be_unclosed);
        assert_eq!(open.tail.as_str(), "s in servers");
        assert_eq!(open.tail.start, 4);

        let LineKind::Close(close) = classify_line("  endfor", 9) else {
            panic!("expected close");
        };
        assert_eq!(close.keyword, BlockKeyword::For);
        assert_eq!(close.range.start, 2);
    }

    #[test]
    fn test_single_line_forms() {
        assert!(is_single_line(BlockKeyword::Var, "x = 5"));
        assert!(!is_single_line(BlockKeyword::Var, "x = ["));
        assert!(!is_single_line(BlockKeyword::Var, "x ="));
        assert!(is_single_line(BlockKeyword::List, "servers = a, b"));
        assert!(!is_single_line(BlockKeyword::List, "servers = a, b,"));
        assert!(is_single_line(BlockKeyword::Csv, "rows from https://host/rows.csv"));
        assert!(!is_single_line(BlockKeyword::Csv, "rows = name, value"));
        assert!(is_single_line(BlockKeyword::Sql, "= select 1"));
        assert!(!is_single_line(BlockKeyword::Script, ""));
    }

    #[test]
    fn test_script_setting_is_unclosed_open() {
        let LineKind::Open(open) = classify_line("script = widget.reload()", 0) else {
            panic!("expected open");
        };
        assert_eq!(open.keyword, BlockKeyword::Script);
        assert!(open.range.can_be_unclosed);
    }

    #[test]
    fn test_branches() {
        assert!(matches!(
            classify_line("else", 0),
            LineKind::Branch(KeywordLine { keyword: BranchKeyword::Else, .. })
        ));
        assert!(matches!(
            classify_line("elseif x > 1", 0),
            LineKind::Branch(KeywordLine { keyword: BranchKeyword::ElseIf, .. })
        ));
    }
}
