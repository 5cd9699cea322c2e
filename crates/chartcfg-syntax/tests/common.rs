//! Shared helpers for scanner tests.
#![allow(dead_code, unused_imports)]

pub use chartcfg_syntax::{classify_line, LineKind, LineSource};

/// Classifies every line of `text` and renders one line per entry.
pub fn render_lines(text: &str) -> String {
    let source = LineSource::new(text);
    let mut out = String::new();
    for (line_no, line) in source.iter() {
        let rendered = match classify_line(line, line_no) {
            LineKind::Blank => "blank".to_string(),
            LineKind::Text => "text".to_string(),
            LineKind::Section(name) => format!("section {}@{}", name.as_str(), name.start),
            LineKind::Open(open) => format!(
                "open {}{} tail={:?}",
                open.keyword,
                if open.range.can_be_unclosed { " (inline)" } else { "" },
                open.tail.as_str()
            ),
            LineKind::Branch(branch) => format!("branch {}", branch.keyword.as_str()),
            LineKind::Close(close) => format!("close {}", close.keyword),
            LineKind::Setting { name, value } => {
                format!("setting {:?} = {:?}", name.as_str(), value.as_str())
            }
        };
        out.push_str(&format!("{line_no}: {rendered}\n"));
    }
    out
}
