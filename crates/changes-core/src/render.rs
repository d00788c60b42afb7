//! Pretty-printer for changelog documents.
//!
//! Replays the markup recorded by the parser: heading styles, underline
//! lengths, trailing separators, date delimiters and separators, bullet
//! glyphs. Layout is normalised: one blank line between releases and
//! between sections, none between changes, and continuation lines of a
//! change indented by two spaces.

use tracing::{debug, instrument};

use crate::ast::{Change, Document, HeaderFormat, Release, Section};

/// Indentation written before continuation lines of a change.
const CONTINUATION_INDENT: &str = "  ";

/// Render a document back to text.
///
/// Every line ends with `\n`; an empty document renders as `""`.
///
/// ```rust
/// let input = "## 0.3.0 (2018-07-10)\n\n- fix the thing\n";
/// let doc = changes_core::parse(input).unwrap();
/// assert_eq!(changes_core::render(&doc), input);
/// ```
#[instrument(skip_all, fields(releases = doc.releases.len()))]
pub fn render(doc: &Document) -> String {
    let mut out = String::with_capacity(256 * doc.releases.len().max(1));

    if let Some(preamble) = &doc.preamble {
        out.push_str(preamble);
        out.push('\n');
        if !doc.releases.is_empty() {
            out.push('\n');
        }
    }

    for (i, release) in doc.releases.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_release(&mut out, release);
    }

    debug!(output_len = out.len(), "changelog rendered");
    out
}

fn render_release(out: &mut String, release: &Release) {
    let line = match &release.date {
        Some(date) => format!("{} {}", release.version, date),
        None => release.version.to_string(),
    };
    render_heading(out, &line, release.format);

    if release.sections.is_empty() {
        return;
    }

    out.push('\n');
    for (i, section) in release.sections.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_section(out, section);
    }
}

fn render_heading(out: &mut String, text: &str, format: HeaderFormat) {
    match format {
        HeaderFormat::Atx { level, trailing } => {
            for _ in 0..level {
                out.push('#');
            }
            out.push(' ');
            out.push_str(text);
            out.extend(trailing);
        }
        HeaderFormat::Setext { glyph, length } => {
            out.push_str(text);
            out.push('\n');
            for _ in 0..length {
                out.push(glyph);
            }
        }
        HeaderFormat::Ascii { trailing } => {
            out.push_str(text);
            out.extend(trailing);
        }
    }
    out.push('\n');
}

fn render_section(out: &mut String, section: &Section) {
    if let Some(title) = &section.title {
        render_heading(out, &title.text, title.format);
    }
    for change in &section.changes {
        render_change(out, change);
    }
}

fn render_change(out: &mut String, change: &Change) {
    let mut lines = change.description.split('\n');
    out.push(change.bullet);
    if let Some(first) = lines.next().filter(|l| !l.is_empty()) {
        out.push(' ');
        out.push_str(first);
    }
    out.push('\n');

    for line in lines {
        if !line.is_empty() {
            out.push_str(CONTINUATION_INDENT);
            out.push_str(line);
        }
        out.push('\n');
    }
}
