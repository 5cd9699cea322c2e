//! Tokens that can start a line.
//!
//! Only the first meaningful token of a line decides how the line is
//! classified, so the lexer is run lazily and stopped after one or two
//! tokens.

use logos::Logos;

/// Line-head token kinds.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeadToken {
    /// Spaces and tabs.
    #[regex(r"[ \t]+")]
    Whitespace,

    /// `for`
    #[token("for")]
    KwFor,
    /// `if`
    #[token("if")]
    KwIf,
    /// `elseif`
    #[token("elseif")]
    KwElseIf,
    /// `else`
    #[token("else")]
    KwElse,
    /// `var`
    #[token("var")]
    KwVar,
    /// `list`
    #[token("list")]
    KwList,
    /// `csv`
    #[token("csv")]
    KwCsv,
    /// `sql`
    #[token("sql")]
    KwSql,
    /// `script`
    #[token("script")]
    KwScript,

    /// `endfor`
    #[token("endfor")]
    KwEndFor,
    /// `endif`
    #[token("endif")]
    KwEndIf,
    /// `endvar`
    #[token("endvar")]
    KwEndVar,
    /// `endlist`
    #[token("endlist")]
    KwEndList,
    /// `endcsv`
    #[token("endcsv")]
    KwEndCsv,
    /// `endsql`
    #[token("endsql")]
    KwEndSql,
    /// `endscript`
    #[token("endscript")]
    KwEndScript,

    /// A lowercase word that is not a keyword.
    #[regex(r"[a-z_][a-z0-9_\-]*")]
    Word,

    /// `[`
    #[token("[")]
    LBracket,

    /// `=`
    #[token("=")]
    Eq,
}

impl HeadToken {
    /// Returns true for whitespace.
    #[must_use]
    pub fn is_trivia(self) -> bool {
        self == Self::Whitespace
    }
}
