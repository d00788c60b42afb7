//! Recursive-descent parser for changelog documents.
//!
//! Borrows directly from input and reads it line by line, left to right,
//! without backtracking across releases. Formatting choices that vary
//! between changelogs (header style, bullet glyph, date separator) are
//! sniffed on first use and then enforced:
//!
//! - the first full date fixes the date separator for the whole document;
//! - the first bullet of a section fixes the bullet glyph for that section.
//!
//! Parsing is all-or-nothing: the first error aborts with its position.

use std::borrow::Cow;

use tracing::{debug, instrument, trace};

use crate::ast::{
    Change, CowStr, DateFormat, Document, HeaderFormat, Release, ReleaseDate, Section, Title,
};
use crate::date;
use crate::error::ParseError;
use crate::lexer::{trim_blanks, trim_blanks_end, Lexer, Line, BLANKS};
use crate::span::Span;

/// Changelog parser configuration.
///
/// The parser itself is stateless; every call to [`Parser::parse`] gets a
/// fresh scan context, so one `Parser` can be shared across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    allow_preamble: bool,
}

impl Parser {
    /// Create a parser with strict defaults: the first non-blank line must
    /// be a release header.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept free text before the first release header.
    ///
    /// Such text (a `# Changelog` title, an introduction paragraph) is kept
    /// verbatim in [`Document::preamble`].
    pub fn with_preamble(mut self, allow: bool) -> Self {
        self.allow_preamble = allow;
        self
    }

    /// Parse the input, returning an error on first failure.
    #[instrument(skip_all, fields(bytes = input.len()))]
    pub fn parse<'a>(&self, input: &'a str) -> Result<Document<'a>, ParseError> {
        let mut scan = Scan::new(input, self.allow_preamble);
        scan.document().map_err(|e| e.locate(input))
    }
}

/// Parse a changelog with the default configuration.
///
/// ```rust
/// let doc = changes_core::parse("1.0.0 (2020-01-01):\n* first release\n").unwrap();
/// assert_eq!(doc.releases[0].version, "1.0.0");
/// ```
pub fn parse(input: &str) -> Result<Document<'_>, ParseError> {
    Parser::new().parse(input)
}

/// Outcome of looking for a release header on a line.
#[derive(Debug, Clone)]
enum HeaderMatch<'a> {
    Header(HeaderLine<'a>),
    Miss(Miss),
}

/// A recognised release header, not yet committed to the document.
#[derive(Debug, Clone)]
struct HeaderLine<'a> {
    version: &'a str,
    date: Option<(ReleaseDate<'a>, Span)>,
    format: HeaderFormat,
}

/// Where a header match gave up, and what it wanted there.
#[derive(Debug, Clone, Copy)]
struct Miss {
    offset: usize,
    expected: &'static str,
}

/// A bullet line, measured.
#[derive(Debug, Clone, Copy)]
struct Bullet {
    glyph: char,
    /// Byte offset of the glyph within the line.
    glyph_offset: usize,
    /// Byte offset of the item text within the line.
    text_offset: usize,
    /// Continuation lines must be indented at least this far.
    threshold: usize,
}

/// Per-call scan context.
struct Scan<'a> {
    lexer: Lexer<'a>,
    allow_preamble: bool,
    date_separator: Option<char>,
    change_bullet: Option<char>,
    /// ATX level of the first release header, if it was one.
    release_level: Option<u8>,
    releases_seen: usize,
    /// Last header match, keyed by line start.
    header_memo: Option<(u32, Result<HeaderMatch<'a>, ParseError>)>,
}

impl<'a> Scan<'a> {
    fn new(input: &'a str, allow_preamble: bool) -> Self {
        Self {
            lexer: Lexer::new(input),
            allow_preamble,
            date_separator: None,
            change_bullet: None,
            release_level: None,
            releases_seen: 0,
            header_memo: None,
        }
    }

    fn document(&mut self) -> Result<Document<'a>, ParseError> {
        self.lexer.skip_blank_lines();

        let preamble = if self.allow_preamble {
            self.preamble()?
        } else {
            None
        };

        let mut releases = Vec::with_capacity(16);
        loop {
            self.lexer.skip_blank_lines();
            if self.lexer.peek_line().is_none() {
                break;
            }

            match self.peek_header()? {
                HeaderMatch::Header(header) => releases.push(self.release(header)?),
                HeaderMatch::Miss(miss) => return Err(self.missing_header(miss)),
            }
        }

        debug!(releases = releases.len(), "parsed changelog");
        Ok(Document { preamble, releases })
    }

    fn preamble(&mut self) -> Result<Option<CowStr<'a>>, ParseError> {
        let mut start: Option<u32> = None;
        let mut end = 0;

        while let Some(line) = self.lexer.peek_line() {
            if let HeaderMatch::Header(_) = self.peek_header()? {
                break;
            }
            self.lexer.next_line();
            if !line.is_blank() {
                start.get_or_insert(line.span.start);
                end = line.span.end;
            }
        }

        Ok(start.map(|start| {
            Cow::Borrowed(trim_blanks_end(self.lexer.slice(Span::new(start, end))))
        }))
    }

    fn missing_header(&self, miss: Miss) -> ParseError {
        let len = self.lexer.input().len();
        ParseError::unrecognized_header(
            miss.expected,
            Span::from_range(miss.offset, (miss.offset + 1).min(len)),
        )
    }

    // ------------------------------------------------------------------
    // Release headers
    // ------------------------------------------------------------------

    /// Look for a release header on the next line.
    ///
    /// Misses are values; an `Err` means the line committed to being a
    /// header (version and date delimiter seen) and then broke.
    fn peek_header(&mut self) -> Result<HeaderMatch<'a>, ParseError> {
        let Some(line) = self.lexer.peek_line() else {
            return Ok(HeaderMatch::Miss(Miss {
                offset: self.lexer.input().len(),
                expected: "a version number",
            }));
        };

        if let Some((start, found)) = &self.header_memo {
            if *start == line.span.start {
                return found.clone();
            }
        }

        let found = self.scan_header(line);
        self.header_memo = Some((line.span.start, found.clone()));
        found
    }

    fn scan_header(&mut self, line: Line<'a>) -> Result<HeaderMatch<'a>, ParseError> {
        let base = line.span.start as usize;
        let text = line.text;
        let miss = |at: usize, expected: &'static str| -> Result<HeaderMatch<'a>, ParseError> {
            Ok(HeaderMatch::Miss(Miss {
                offset: base + at,
                expected,
            }))
        };

        if line.indent() > 0 {
            return miss(0, "an unindented version number");
        }

        let (level, mut pos) = match atx_level(text) {
            Some((level, hashes)) => (Some(level), hashes + leading_blanks(&text[hashes..])),
            None => (None, 0),
        };

        let rest = &text[pos..];
        let numbered = starts_like_version(rest);
        if !numbered && !rest.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return miss(pos, "a version number");
        }

        let version_len = rest
            .find(|c: char| matches!(c, '(' | '[' | ':'))
            .unwrap_or(rest.len());
        if !numbered && !self.accepts_named(level, &rest[..version_len], &rest[version_len..]) {
            return miss(pos, "a version number");
        }
        if let Some(bad) = rest[..version_len].find(|c: char| !is_version_char(c)) {
            return miss(pos + bad, "a date, ':' or end of line after the version");
        }
        let version = rest[..version_len].trim_end_matches([',', ' ', '\t']);
        pos += version_len;

        let mut date = None;
        if matches!(text.as_bytes().get(pos), Some(b'(' | b'[')) {
            let (parsed, used) = date::parse_date(&text[pos..], base + pos)?;
            date = Some((parsed, Span::from_range(base + pos, base + pos + used)));
            pos += used;
            pos += leading_blanks(&text[pos..]);
        }

        let mut trailing = None;
        if text[pos..].starts_with(':') {
            trailing = Some(':');
            pos += 1;
        }

        let tail = &text[pos..];
        if !trim_blanks(tail).is_empty() {
            let at = pos + leading_blanks(tail);
            if date.is_some() {
                return Err(ParseError::unrecognized_header(
                    "unexpected text after the release date",
                    Span::from_range(base + at, base + trim_blanks_end(text).len()),
                ));
            }
            return miss(at, "end of line after ':'");
        }

        let format = match level {
            Some(level) => HeaderFormat::Atx { level, trailing },
            None => match self.lexer.peek_second().and_then(|l| l.rule()) {
                Some((glyph, length)) => HeaderFormat::Setext { glyph, length },
                None => HeaderFormat::Ascii { trailing },
            },
        };

        Ok(HeaderMatch::Header(HeaderLine {
            version,
            date,
            format,
        }))
    }

    /// Whether a version that does not start with a number still names a
    /// release: an ATX heading at the level of the first release header, an
    /// ATX `Unreleased` heading, or any line followed by a real date.
    fn accepts_named(&self, level: Option<u8>, token: &str, after: &str) -> bool {
        if level.is_some() && level == self.release_level {
            return true;
        }
        if level.is_some() && trim_blanks(token).eq_ignore_ascii_case("unreleased") {
            return true;
        }
        matches!(after.as_bytes().first(), Some(b'(' | b'['))
            && date::parse_date(after, 0)
                .is_ok_and(|(date, _)| !matches!(date.format, DateFormat::Custom(_)))
    }

    fn release(&mut self, header: HeaderLine<'a>) -> Result<Release<'a>, ParseError> {
        if self.releases_seen == 0 {
            if let HeaderFormat::Atx { level, .. } = header.format {
                trace!(level, "release heading level established");
                self.release_level = Some(level);
            }
        }
        self.releases_seen += 1;

        self.lexer.next_line();
        if let HeaderFormat::Setext { .. } = header.format {
            self.lexer.next_line();
        }

        let date = match header.date {
            Some((date, span)) => {
                self.commit_date_separator(&date, span)?;
                Some(date)
            }
            None => None,
        };

        let sections = self.sections()?;
        let release = Release {
            version: Cow::Borrowed(header.version),
            date,
            format: header.format,
            sections,
        };

        debug!(
            version = %release.version,
            sections = release.sections.len(),
            changes = release.changes().count(),
            "parsed release"
        );
        Ok(release)
    }

    fn commit_date_separator(&mut self, date: &ReleaseDate<'a>, span: Span) -> Result<(), ParseError> {
        let &DateFormat::Full { separator, .. } = &date.format else {
            return Ok(());
        };

        match self.date_separator {
            None => {
                trace!(%separator, "date separator established");
                self.date_separator = Some(separator);
                Ok(())
            }
            Some(expected) if expected != separator => Err(
                ParseError::inconsistent_date_separator(expected, separator, span),
            ),
            Some(_) => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Release body
    // ------------------------------------------------------------------

    fn sections(&mut self) -> Result<Vec<Section<'a>>, ParseError> {
        let mut sections = Vec::with_capacity(4);

        loop {
            self.lexer.skip_blank_lines();
            let Some(line) = self.lexer.peek_line() else {
                break;
            };

            let title = if scan_bullet(&line).is_some() {
                None
            } else {
                if let HeaderMatch::Header(_) = self.peek_header()? {
                    break;
                }
                Some(self.title(line)?)
            };

            let changes = self.changes()?;
            sections.push(Section { title, changes });
        }

        Ok(sections)
    }

    fn title(&mut self, line: Line<'a>) -> Result<Title<'a>, ParseError> {
        if line.indent() > 0 {
            return Err(ParseError::unexpected_line(
                "indented text outside of a change",
                line.span,
            ));
        }
        if line.rule().is_some() {
            return Err(ParseError::unexpected_line(
                "underline without a heading above it",
                line.span,
            ));
        }

        self.lexer.next_line();
        let text = trim_blanks_end(line.text);

        let (text, format) = match atx_level(text) {
            Some((level, hashes)) => {
                let (text, trailing) = split_trailing(trim_blanks(&text[hashes..]));
                (text, HeaderFormat::Atx { level, trailing })
            }
            None => match self.lexer.peek_line().and_then(|l| l.rule()) {
                Some((glyph, length)) => {
                    self.lexer.next_line();
                    (text, HeaderFormat::Setext { glyph, length })
                }
                None => {
                    let (text, trailing) = split_trailing(text);
                    (text, HeaderFormat::Ascii { trailing })
                }
            },
        };

        if text.is_empty() {
            return Err(ParseError::unexpected_line("empty section heading", line.span));
        }

        Ok(Title {
            text: Cow::Borrowed(text),
            format,
        })
    }

    fn changes(&mut self) -> Result<Vec<Change<'a>>, ParseError> {
        self.change_bullet = None;
        let mut changes = Vec::with_capacity(8);

        loop {
            self.lexer.skip_blank_lines();
            let Some(line) = self.lexer.peek_line() else {
                break;
            };

            let Some(bullet) = scan_bullet(&line) else {
                if line.indent() > 0 {
                    return Err(ParseError::unexpected_line(
                        "indented text outside of a change",
                        line.span,
                    ));
                }
                break;
            };

            match self.change_bullet {
                None => {
                    trace!(bullet = %bullet.glyph, "bullet glyph established");
                    self.change_bullet = Some(bullet.glyph);
                }
                Some(expected) if expected != bullet.glyph => {
                    let at = line.span.start as usize + bullet.glyph_offset;
                    return Err(ParseError::inconsistent_bullet(
                        expected,
                        bullet.glyph,
                        Span::from_range(at, at + 1),
                    ));
                }
                Some(_) => {}
            }

            changes.push(self.change(line, bullet));
        }

        Ok(changes)
    }

    /// Consume a bullet line and its continuation lines.
    ///
    /// A continuation line is indented at least to the bullet's text column.
    /// Blank lines are kept only when more continuation follows them.
    fn change(&mut self, line: Line<'a>, bullet: Bullet) -> Change<'a> {
        self.lexer.next_line();
        let first = trim_blanks_end(&line.text[bullet.text_offset..]);
        let mut description: Option<String> = None;

        while let Some(next) = self.lexer.peek_line() {
            if next.is_blank() {
                match self.lexer.peek_non_blank() {
                    Some(after) if after.indent() >= bullet.threshold => {}
                    _ => break,
                }
                let text = description.get_or_insert_with(|| first.to_string());
                while self.lexer.peek_line().is_some_and(|l| l.is_blank()) {
                    self.lexer.next_line();
                    text.push('\n');
                }
                continue;
            }

            if next.indent() < bullet.threshold {
                break;
            }

            self.lexer.next_line();
            let text = description.get_or_insert_with(|| first.to_string());
            text.push('\n');
            text.push_str(trim_blanks_end(next.strip_indent(bullet.threshold)));
        }

        Change {
            description: description.map_or(Cow::Borrowed(first), Cow::Owned),
            bullet: bullet.glyph,
        }
    }
}

/// Recognise a bullet line: optional indentation, `*`, `-` or `+`, then
/// whitespace or end of line.
fn scan_bullet(line: &Line) -> Option<Bullet> {
    let glyph_offset = line.content_offset();
    let glyph = match line.text.as_bytes().get(glyph_offset)? {
        b'*' => '*',
        b'-' => '-',
        b'+' => '+',
        _ => return None,
    };

    let after = &line.text[glyph_offset + 1..];
    let blanks = leading_blanks(after);
    if blanks == 0 && !after.is_empty() {
        return None;
    }

    let text_offset = glyph_offset + 1 + blanks;
    let threshold = if trim_blanks(after).is_empty() {
        line.indent() + 2
    } else {
        line.column_at(text_offset)
    };

    Some(Bullet {
        glyph,
        glyph_offset,
        text_offset,
        threshold,
    })
}

/// Count leading `#` for an ATX heading: 1-6 of them, followed by
/// whitespace or end of line. Returns the level and the byte count.
fn atx_level(text: &str) -> Option<(u8, usize)> {
    let hashes = text.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    match text.as_bytes().get(hashes) {
        None | Some(b' ' | b'\t') => Some((hashes as u8, hashes)),
        Some(_) => None,
    }
}

/// A version starts with a digit, or with `v`/`V` and a digit.
fn starts_like_version(text: &str) -> bool {
    match text.as_bytes() {
        [b'0'..=b'9', ..] => true,
        [b'v' | b'V', b'0'..=b'9', ..] => true,
        _ => false,
    }
}

#[inline]
fn is_version_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, ' ' | '\t' | '.' | '~' | '+' | ',' | '"' | '#' | '-' | '_')
}

#[inline]
fn leading_blanks(text: &str) -> usize {
    text.len() - text.trim_start_matches(BLANKS).len()
}

/// Split one trailing `:` off a heading.
fn split_trailing(text: &str) -> (&str, Option<char>) {
    match text.strip_suffix(':') {
        Some(rest) => (trim_blanks_end(rest), Some(':')),
        None => (text, None),
    }
}
