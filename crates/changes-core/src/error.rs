use crate::span::{Position, Span};
use thiserror::Error;

/// Error kinds for categorizing parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A release header was required but the line is not one
    UnrecognizedHeader,
    /// Date opened with `(` or `[` but never closed on that line
    UnclosedDelimiter,
    /// Date text matches none of the supported forms
    InvalidDate,
    /// Bullet glyph differs from the one established in this section
    InconsistentBullet,
    /// Full date separator differs from the one established in this document
    InconsistentDateSeparator,
    /// A line that fits nowhere in the release body
    UnexpectedLine,
}

/// A parse error with its location.
///
/// Parsing stops at the first error; there is no partial document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    /// Human-readable error message
    pub message: String,
    /// Source bytes the error refers to
    pub span: Span,
    /// Error categorization
    pub kind: ParseErrorKind,
    /// 1-based line of `span.start`
    pub line: u32,
    /// 1-based column of `span.start`, in characters
    pub column: u32,
}

impl ParseError {
    /// Create a new parse error. Line and column are filled in by `locate`.
    pub fn new(kind: ParseErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
            line: 0,
            column: 0,
        }
    }

    /// A required release header was not found.
    pub fn unrecognized_header(expected: &str, span: Span) -> Self {
        Self::new(
            ParseErrorKind::UnrecognizedHeader,
            format!("expected release header: {}", expected),
            span,
        )
    }

    /// A date delimiter was opened and not closed.
    pub fn unclosed_delimiter(open: char, close: char, span: Span) -> Self {
        Self::new(
            ParseErrorKind::UnclosedDelimiter,
            format!("unclosed '{}' in release date, expected '{}'", open, close),
            span,
        )
    }

    /// Date text that fits none of the date forms.
    pub fn invalid_date(text: &str, span: Span) -> Self {
        Self::new(
            ParseErrorKind::InvalidDate,
            format!("unrecognized release date '{}'", text),
            span,
        )
    }

    /// Bullet glyph mismatch inside one section.
    pub fn inconsistent_bullet(expected: char, found: char, span: Span) -> Self {
        Self::new(
            ParseErrorKind::InconsistentBullet,
            format!(
                "bullet '{}' does not match '{}' used earlier in this section",
                found, expected
            ),
            span,
        )
    }

    /// Date separator mismatch inside one document.
    pub fn inconsistent_date_separator(expected: char, found: char, span: Span) -> Self {
        Self::new(
            ParseErrorKind::InconsistentDateSeparator,
            format!(
                "date separator '{}' does not match '{}' used earlier in this document",
                found, expected
            ),
            span,
        )
    }

    /// A line that fits nowhere in a release.
    pub fn unexpected_line(reason: &str, span: Span) -> Self {
        Self::new(ParseErrorKind::UnexpectedLine, reason, span)
    }

    /// Resolve `span.start` into a line and column of `input`.
    pub fn locate(mut self, input: &str) -> Self {
        let pos = Position::locate(input, self.span.start as usize);
        self.line = pos.line;
        self.column = pos.column;
        self
    }
}
