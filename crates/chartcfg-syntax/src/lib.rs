//! `chartcfg-syntax` - Line source and keyword scanner for chartcfg documents.
//!
//! chartcfg documents are line oriented: every line is either a section
//! header (`[widget]`), a block keyword (`for`, `if`, `var`, `list`, `csv`,
//! `sql`, `script` and their `end*` counterparts), a `name = value` setting,
//! or free text. This crate provides:
//!
//! - **Line source**: comment blanking and case normalization that keep
//!   line/column positions valid against the original document
//! - **Keyword scanner**: classification of a single normalized line
//! - **Ranges**: positions and text ranges shared by the analysis crates
//!
//! # Example
//!
//! ```
//! use chartcfg_syntax::{classify_line, LineKind, LineSource};
//!
//! let source = LineSource::new("[Widget]\n  Type = Chart");
//! let kinds: Vec<_> = source
//!     .iter()
//!     .map(|(line_no, line)| classify_line(line, line_no))
//!     .collect();
//!
//! assert!(matches!(&kinds[0], LineKind::Section(name) if name.as_str() == "widget"));
//! assert!(matches!(&kinds[1], LineKind::Setting { name, .. } if name.as_str() == "type"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod keywords;
pub mod range;
pub mod source;

pub use keywords::{
    classify_line, is_single_line, setting_parts, BlockKeyword, BranchKeyword, KeywordLine,
    LineKind,
};
pub use range::{Position, Range, TextRange};
pub use source::LineSource;
