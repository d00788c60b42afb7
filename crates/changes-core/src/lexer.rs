//! Line-based lexer with SIMD-accelerated scanning.
//!
//! Changelogs are line-oriented: every construct the parser recognises
//! (release headers, underlines, section titles, bullets, continuation
//! lines) starts at a line boundary. The lexer splits the input into lines
//! and offers the bounded lookahead the grammar needs.
//!
//! # Performance
//!
//! - Zero-copy: lines borrow directly from input
//! - SIMD-accelerated newline scanning via `memchr`
//! - Peek/consume API for lookahead without allocations

use crate::span::Span;
use memchr::memchr;

/// Tab stops used when measuring indentation.
pub const TAB_WIDTH: usize = 4;

/// Whitespace as far as lines are concerned. Any other Unicode space is
/// line content.
pub const BLANKS: [char; 2] = [' ', '\t'];

/// Strip trailing spaces and tabs.
#[inline]
pub fn trim_blanks_end(text: &str) -> &str {
    text.trim_end_matches(BLANKS)
}

/// Strip leading and trailing spaces and tabs.
#[inline]
pub fn trim_blanks(text: &str) -> &str {
    text.trim_matches(BLANKS)
}

/// A single line from the input with its source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// The line text (without trailing newline).
    pub text: &'a str,
    /// Byte span in the original input.
    pub span: Span,
}

impl<'a> Line<'a> {
    /// Check if this line contains only whitespace.
    #[inline(always)]
    pub fn is_blank(&self) -> bool {
        self.text.bytes().all(|b| b == b' ' || b == b'\t')
    }

    /// Width of the leading whitespace in columns.
    #[inline]
    pub fn indent(&self) -> usize {
        self.column_at(self.content_offset())
    }

    /// Column reached after the first `byte` bytes of the line.
    ///
    /// Only meaningful for ASCII prefixes (indentation, bullet glyphs).
    pub fn column_at(&self, byte: usize) -> usize {
        self.text.as_bytes()[..byte.min(self.text.len())]
            .iter()
            .fold(0, |column, &b| match b {
                b'\t' => column + TAB_WIDTH - column % TAB_WIDTH,
                _ => column + 1,
            })
    }

    /// The line text after its leading whitespace.
    #[inline]
    pub fn content(&self) -> &'a str {
        self.text.trim_start_matches(BLANKS)
    }

    /// Byte offset (relative to the line) where `content` starts.
    #[inline]
    pub fn content_offset(&self) -> usize {
        self.text.len() - self.content().len()
    }

    /// Remove up to `columns` columns of leading whitespace.
    ///
    /// A tab that straddles the boundary is removed whole.
    pub fn strip_indent(&self, columns: usize) -> &'a str {
        let mut column = 0;
        for (i, b) in self.text.bytes().enumerate() {
            if column >= columns {
                return &self.text[i..];
            }
            match b {
                b' ' => column += 1,
                b'\t' => column += TAB_WIDTH - column % TAB_WIDTH,
                _ => return &self.text[i..],
            }
        }
        ""
    }

    /// Recognise an underline: two or more `-` or `=` and nothing else.
    ///
    /// Returns the glyph and the underline length. Trailing whitespace is
    /// ignored; an indented line is never an underline.
    pub fn rule(&self) -> Option<(char, usize)> {
        let text = trim_blanks_end(self.text);
        let first = *text.as_bytes().first()?;
        if first != b'-' && first != b'=' {
            return None;
        }
        if text.len() < 2 || !text.bytes().all(|b| b == first) {
            return None;
        }
        Some((first as char, text.len()))
    }
}

/// Line-based lexer for the changelog parser.
///
/// Provides peek/consume access to lines plus the two extra lookaheads the
/// grammar needs: the line after the next one (Setext underlines) and the
/// next non-blank line (change continuation across blank lines).
pub struct Lexer<'a> {
    /// The complete input text.
    input: &'a str,
    /// Input as bytes for efficient scanning.
    bytes: &'a [u8],
    /// Current byte offset.
    offset: usize,
    /// Peeked line and the offset just past it.
    peeked: Option<(Line<'a>, usize)>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            offset: 0,
            peeked: None,
        }
    }

    /// The complete input text.
    #[inline(always)]
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// Peek at the next line without consuming it.
    ///
    /// Returns `None` if at end of input.
    #[inline]
    pub fn peek_line(&mut self) -> Option<Line<'a>> {
        if self.peeked.is_none() {
            self.peeked = self.read_line_at(self.offset);
        }
        self.peeked.map(|(line, _)| line)
    }

    /// Peek at the line following the next one.
    #[inline]
    pub fn peek_second(&mut self) -> Option<Line<'a>> {
        self.peek_line()?;
        let (_, after) = self.peeked?;
        self.read_line_at(after).map(|(line, _)| line)
    }

    /// Peek at the first non-blank line without consuming anything.
    pub fn peek_non_blank(&self) -> Option<Line<'a>> {
        let mut offset = self.offset;
        while let Some((line, next)) = self.read_line_at(offset) {
            if !line.is_blank() {
                return Some(line);
            }
            offset = next;
        }
        None
    }

    /// Consume and return the next line.
    ///
    /// Returns `None` if at end of input.
    #[inline]
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        let (line, next) = match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.read_line_at(self.offset)?,
        };
        self.offset = next;
        Some(line)
    }

    /// Skip blank lines and return the count skipped.
    #[inline]
    pub fn skip_blank_lines(&mut self) -> usize {
        let mut count = 0;
        while let Some(line) = self.peek_line() {
            if !line.is_blank() {
                break;
            }
            self.next_line();
            count += 1;
        }
        count
    }

    /// Read the line starting at `start`, returning it with the offset of
    /// the following line.
    ///
    /// Uses SIMD-accelerated newline scanning via `memchr`.
    #[inline(always)]
    fn read_line_at(&self, start: usize) -> Option<(Line<'a>, usize)> {
        if start >= self.bytes.len() {
            return None;
        }

        let end = match memchr(b'\n', &self.bytes[start..]) {
            Some(pos) => start + pos,
            None => self.bytes.len(),
        };

        // Handle CRLF: check byte before newline is CR
        let text_end = if end > start && self.bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };

        let next = if end < self.bytes.len() { end + 1 } else { end };

        // Line boundaries sit on ASCII newlines, so both ends are char boundaries.
        let line = Line {
            text: &self.input[start..text_end],
            span: Span::from_range(start, text_end),
        };
        Some((line, next))
    }

    /// Get a slice of the input by span.
    #[inline(always)]
    pub fn slice(&self, span: Span) -> &'a str {
        &self.input[span.start as usize..span.end as usize]
    }
}
