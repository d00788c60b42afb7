//! Source location tracking.
//!
//! The lexer hands out a `Span` for every line, and parse errors carry the
//! span of the offending text. `Position` turns a byte offset back into the
//! line/column pair shown to users.

use memchr::{memchr_iter, memrchr};

/// A byte range in the source text.
///
/// Spans use byte offsets (not character offsets) for efficiency.
/// Both `start` and `end` are inclusive-exclusive: `[start, end)`.
///
/// # Example
///
/// ```rust
/// use changes_core::span::Span;
///
/// let span = Span::new(0, 10);
/// assert_eq!(span.len(), 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Starting byte offset (inclusive).
    pub start: u32,
    /// Ending byte offset (exclusive).
    pub end: u32,
}

impl Span {
    /// Create a new span from byte offsets.
    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Create a span from `usize` offsets.
    #[inline]
    pub fn from_range(start: usize, end: usize) -> Self {
        Self::new(start as u32, end as u32)
    }

    /// Get the length of this span in bytes.
    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span is empty.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// A 1-based line/column position.
///
/// Columns count characters, not bytes, so they line up with what an
/// editor shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    /// Locate a byte offset inside `input`.
    ///
    /// Offsets past the end of input are clamped to the end.
    ///
    /// ```rust
    /// use changes_core::span::Position;
    ///
    /// let pos = Position::locate("1.0:\n* fix", 7);
    /// assert_eq!((pos.line, pos.column), (2, 3));
    /// ```
    pub fn locate(input: &str, offset: usize) -> Self {
        let mut offset = offset.min(input.len());
        while !input.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &input.as_bytes()[..offset];
        let line = memchr_iter(b'\n', before).count() as u32 + 1;
        let line_start = memrchr(b'\n', before).map_or(0, |nl| nl + 1);
        let column = input[line_start..offset].chars().count() as u32 + 1;
        Self { line, column }
    }
}
