//! Normalized, line-indexed view of a configuration document.
//!
//! Comments are blanked rather than removed: every character of a comment is
//! replaced by a space (line breaks inside block comments are kept), so line
//! numbers and columns of the normalized text match the original document.
//! The text is lowercased with ASCII rules only, which keeps byte offsets
//! stable.

/// Normalized document lines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineSource {
    lines: Vec<String>,
}

impl LineSource {
    /// Normalizes `text` and splits it into lines.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let blanked = blank_comments(text);
        let lines = blanked
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_ascii_lowercase())
            .collect();
        Self { lines }
    }

    /// Returns the line at `index`, or `None` past the end of the document.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// Number of lines (an empty document still has one empty line).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the source holds no lines at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterates over `(line number, text)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(|(index, line)| (crate::range::to_u32(index), line.as_str()))
    }
}

/// Replaces `/* ... */` blocks and `#` line comments with spaces.
///
/// A `#` only starts a comment when it is the first non-blank character of a
/// line, since values such as `color = #ff0000` use it too.
fn blank_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_block = false;
    let mut line_start = true;
    let mut in_line_comment = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\n' {
            out.push('\n');
            line_start = true;
            in_line_comment = false;
            continue;
        }
        if in_line_comment {
            push_blank(&mut out, ch);
            continue;
        }
        if in_block {
            if ch == '*' && chars.peek() == Some(&'/') {
                chars.next();
                out.push_str("  ");
                in_block = false;
            } else {
                push_blank(&mut out, ch);
            }
            continue;
        }
        if ch == '/' && chars.peek() == Some(&'*') {
            chars.next();
            out.push_str("  ");
            in_block = true;
            line_start = false;
            continue;
        }
        if line_start && ch == '#' {
            push_blank(&mut out, ch);
            in_line_comment = true;
            continue;
        }
        if !ch.is_whitespace() {
            line_start = false;
        }
        out.push(ch);
    }
    out
}

/// Pushes as many spaces as `ch` occupies in UTF-8, keeping offsets aligned.
fn push_blank(out: &mut String, ch: char) {
    if ch == '\r' || ch == '\t' {
        out.push(ch);
        return;
    }
    for _ in 0..ch.len_utf8() {
        out.push(' ');
    }
}
