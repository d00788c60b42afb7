//! Document model for parsed changelogs.
//!
//! A changelog is an ordered list of releases; a release holds optional
//! sections; a section holds ordered changes. Besides the content, every
//! node records the markup it was written in (heading style, underline
//! length, bullet glyph, date separator and delimiter) so the renderer can
//! write it back the same way.
//!
//! Nodes borrow from the input where possible (`Cow<'a, str>`) and carry no
//! source spans: equality is structural, so a document compares equal to
//! the re-parse of its own rendering.

use std::fmt;

/// Borrowed or owned string type for zero-copy parsing.
pub type CowStr<'a> = std::borrow::Cow<'a, str>;

/// A parsed changelog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document<'a> {
    /// Free text before the first release, when the parser allows it.
    pub preamble: Option<CowStr<'a>>,
    /// Releases in document order (conventionally newest first).
    pub releases: Vec<Release<'a>>,
}

impl<'a> Document<'a> {
    /// Check if the document has neither preamble nor releases.
    pub fn is_empty(&self) -> bool {
        self.preamble.is_none() && self.releases.is_empty()
    }

    /// Find a release by its version text.
    pub fn release(&self, version: &str) -> Option<&Release<'a>> {
        self.releases.iter().find(|r| r.version == version)
    }

    /// Render the document back to changelog text.
    pub fn render(&self) -> String {
        crate::render::render(self)
    }
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// One version's worth of notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release<'a> {
    /// Version text, trimmed (e.g. `1.2.0`, `v0.3.0~beta1`).
    pub version: CowStr<'a>,
    /// Optional release date.
    pub date: Option<ReleaseDate<'a>>,
    /// How the release header was written.
    pub format: HeaderFormat,
    /// Sections in document order. An untitled default section, if present,
    /// comes first.
    pub sections: Vec<Section<'a>>,
}

impl<'a> Release<'a> {
    /// All changes of the release across its sections, in order.
    pub fn changes(&self) -> impl Iterator<Item = &Change<'a>> {
        self.sections.iter().flat_map(|s| s.changes.iter())
    }

    /// Check if the release lists no changes.
    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.changes.is_empty())
    }

    /// Find a titled section by heading text.
    pub fn section(&self, title: &str) -> Option<&Section<'a>> {
        self.sections
            .iter()
            .find(|s| s.title.as_ref().is_some_and(|t| t.text == title))
    }
}

/// Heading markup used for a release header or section title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderFormat {
    /// `#`-prefixed heading (levels 1-6) with an optional trailing separator.
    Atx { level: u8, trailing: Option<char> },
    /// Heading text underlined by a line of `-` or `=`.
    Setext { glyph: char, length: usize },
    /// Plain line with an optional trailing separator such as `:`.
    Ascii { trailing: Option<char> },
}

/// A release date together with its surrounding delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseDate<'a> {
    pub format: DateFormat<'a>,
    pub delimiter: DateDelimiter,
}

impl fmt::Display for ReleaseDate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = self.delimiter.chars();
        write!(f, "{open}")?;
        match &self.format {
            DateFormat::Full {
                year,
                month,
                day,
                separator,
            } => write!(f, "{year}{separator}{month}{separator}{day}")?,
            DateFormat::MonthYear { month, year, style } => match style.name(*month) {
                Some(name) => write!(f, "{name} {year}")?,
                // Out-of-range months fall back to the number.
                None => write!(f, "{month} {year}")?,
            },
            DateFormat::DayMonthYear { day, month, year } => write!(f, "{day} {month} {year}")?,
            DateFormat::Custom(text) => f.write_str(text)?,
        }
        write!(f, "{close}")
    }
}

/// Brackets around a release date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateDelimiter {
    /// `(2020-01-01)`
    Parens,
    /// `[2020-01-01]`
    Brackets,
}

impl DateDelimiter {
    /// Opening and closing characters.
    pub const fn chars(self) -> (char, char) {
        match self {
            DateDelimiter::Parens => ('(', ')'),
            DateDelimiter::Brackets => ('[', ']'),
        }
    }
}

/// The date forms a release header can carry.
///
/// Numeric components are kept as literal text so zero padding survives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFormat<'a> {
    /// `2018-07-10` or `2018/07/10`.
    Full {
        year: CowStr<'a>,
        month: CowStr<'a>,
        day: CowStr<'a>,
        separator: char,
    },
    /// `Jan 2020` or `January 2020`; `month` is 1-based.
    MonthYear {
        month: u8,
        year: CowStr<'a>,
        style: MonthStyle,
    },
    /// `12 March 2019`, month name as written.
    DayMonthYear {
        day: CowStr<'a>,
        month: CowStr<'a>,
        year: CowStr<'a>,
    },
    /// Free-form placeholder such as `unreleased`.
    Custom(CowStr<'a>),
}

/// Whether a month was written as `Jan` or `January`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthStyle {
    Short,
    Long,
}

impl MonthStyle {
    /// Name of a 1-based month in this style.
    ///
    /// ```rust
    /// use changes_core::ast::MonthStyle;
    ///
    /// assert_eq!(MonthStyle::Short.name(9), Some("Sep"));
    /// assert_eq!(MonthStyle::Long.name(13), None);
    /// ```
    pub fn name(self, month: u8) -> Option<&'static str> {
        let table = match self {
            MonthStyle::Short => &crate::date::SHORT_MONTHS,
            MonthStyle::Long => &crate::date::LONG_MONTHS,
        };
        table.get(usize::from(month).checked_sub(1)?).copied()
    }
}

/// A group of changes inside a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    /// Heading, or `None` for the default section.
    pub title: Option<Title<'a>>,
    /// Changes in document order.
    pub changes: Vec<Change<'a>>,
}

/// Section heading text and markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title<'a> {
    pub text: CowStr<'a>,
    pub format: HeaderFormat,
}

/// One bullet item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change<'a> {
    /// Bullet text; continuation lines are joined with `\n`.
    pub description: CowStr<'a>,
    /// The glyph that introduced the item: `*`, `-` or `+`.
    pub bullet: char,
}
