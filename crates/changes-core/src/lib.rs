//! # Changes Core
//!
//! A parser and pretty-printer for free-form project changelogs
//! (`CHANGES`, `CHANGELOG.md` and friends).
//!
//! Changelogs in the wild mix heading conventions (`## 1.0.0`, underlined
//! versions, plain `1.0.0:` lines), bullet glyphs and date formats. The
//! parser sniffs which ones a document uses, enforces them consistently, and
//! records them in the document so rendering writes the same markup back.
//!
//! ## Quick Start
//!
//! ```rust
//! use changes_core::Parser;
//!
//! let input = "## 1.1.0 (2024-03-02)\n\n### Fixed\n\n- crash on empty input\n";
//! let doc = Parser::new().parse(input).unwrap();
//!
//! let release = &doc.releases[0];
//! assert_eq!(release.version, "1.1.0");
//! assert_eq!(release.changes().count(), 1);
//! assert_eq!(doc.render(), "## 1.1.0 (2024-03-02)\n\n### Fixed\n- crash on empty input\n");
//! ```
//!
//! ## Errors
//!
//! Parsing is all-or-nothing. Errors carry a kind and a position:
//!
//! ```rust
//! use changes_core::{parse, ParseErrorKind};
//!
//! let err = parse("1.0.0 (2020-01-01):\n1.0.1 (2020/02/02):\n").unwrap_err();
//! assert_eq!(err.kind, ParseErrorKind::InconsistentDateSeparator);
//! assert_eq!(err.line, 2);
//! ```

pub mod ast;
pub mod date;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod span;

pub use ast::{
    Change, DateDelimiter, DateFormat, Document, HeaderFormat, MonthStyle, Release, ReleaseDate,
    Section, Title,
};
pub use error::{ParseError, ParseErrorKind};
pub use parser::{parse, Parser};
pub use render::render;
