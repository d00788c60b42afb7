//! Changes CLI - Parse, validate, and reformat changelogs
//!
//! Usage:
//!   changes [OPTIONS] <COMMAND> <FILE>
//!
//! Commands:
//!   parse     Parse and display changelog structure
//!   validate  Check changelog for errors
//!   fmt       Print the changelog in normalised form
//!   stats     Show changelog statistics

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use changes_core::{Change, DateFormat, Document, HeaderFormat, ParseError, Parser, Release};
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn main() -> Result<()> {
    init_tracing();

    let cli = <Cli as clap::Parser>::parse();
    cli.execute()
}

/// Console logging on stderr, controlled by RUST_LOG (default: warn).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();
}

// =============================================================================
// Command Line
// =============================================================================

/// Changelog parser, validator and formatter
#[derive(Debug, clap::Parser)]
#[command(name = "changes")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Accept free text before the first release header
    #[arg(long, global = true)]
    preamble: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse and display changelog structure
    Parse(ParseArgs),

    /// Check changelog for errors without output
    Validate(ValidateArgs),

    /// Print the changelog in normalised form
    Fmt(FmtArgs),

    /// Show changelog statistics
    Stats(InputArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Changelog file, or `-` for stdin
    file: PathBuf,
}

#[derive(Debug, Args)]
struct ParseArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output the document as JSON
    #[arg(short, long)]
    json: bool,

    /// List every change
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output the result as JSON
    #[arg(short, long)]
    json: bool,
}

#[derive(Debug, Args)]
struct FmtArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Exit with an error instead of printing if formatting would change the file
    #[arg(long)]
    check: bool,
}

impl Cli {
    fn execute(self) -> Result<()> {
        let parser = Parser::new().with_preamble(self.preamble);

        match self.command {
            Command::Parse(ref args) => cmd_parse(&parser, args),
            Command::Validate(ref args) => cmd_validate(&parser, args),
            Command::Fmt(ref args) => cmd_fmt(&parser, args),
            Command::Stats(ref args) => cmd_stats(&parser, args),
        }
    }
}

impl InputArgs {
    fn is_stdin(&self) -> bool {
        self.file == Path::new("-")
    }

    fn name(&self) -> String {
        if self.is_stdin() {
            "<stdin>".to_string()
        } else {
            self.file.display().to_string()
        }
    }

    fn read(&self) -> Result<String> {
        let input = if self.is_stdin() {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        } else {
            fs::read_to_string(&self.file)
                .with_context(|| format!("failed to read '{}'", self.file.display()))?
        };
        debug!(file = %self.name(), bytes = input.len(), "read input");
        Ok(input)
    }
}

fn parse_input<'a>(parser: &Parser, input: &'a str, args: &InputArgs) -> Result<Document<'a>> {
    parser
        .parse(input)
        .with_context(|| format!("failed to parse '{}'", args.name()))
}

// =============================================================================
// Parse Command
// =============================================================================

fn cmd_parse(parser: &Parser, args: &ParseArgs) -> Result<()> {
    let input = args.input.read()?;
    let doc = parse_input(parser, &input, &args.input)?;

    if args.json {
        let json = serde_json::to_string_pretty(&JsonDocument::from(&doc))
            .context("failed to serialize document")?;
        println!("{}", json);
    } else if args.verbose {
        print_document_verbose(&doc);
    } else {
        print_document_summary(&doc);
    }

    Ok(())
}

// =============================================================================
// Validate Command
// =============================================================================

fn cmd_validate(parser: &Parser, args: &ValidateArgs) -> Result<()> {
    let input = args.input.read()?;

    match parser.parse(&input) {
        Ok(doc) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({"valid": true, "releases": doc.releases.len()})
                );
            } else {
                println!("Valid: {} release(s)", doc.releases.len());
            }
            Ok(())
        }
        Err(err) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({"valid": false, "error": JsonError::from(&err)})
                );
            } else {
                eprintln!("Invalid: {}: {}", args.input.name(), err);
            }
            process::exit(1);
        }
    }
}

// =============================================================================
// Fmt Command
// =============================================================================

fn cmd_fmt(parser: &Parser, args: &FmtArgs) -> Result<()> {
    let input = args.input.read()?;
    let doc = parse_input(parser, &input, &args.input)?;
    let output = doc.render();

    if args.check {
        if output != input {
            eprintln!("{}: not formatted", args.input.name());
            process::exit(1);
        }
        return Ok(());
    }

    print!("{}", output);
    Ok(())
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(parser: &Parser, args: &InputArgs) -> Result<()> {
    let input = args.read()?;
    let doc = parse_input(parser, &input, args)?;
    let stats = DocumentStats::from_document(&doc);

    println!("Changelog Statistics");
    println!("--------------------");
    println!("Preamble:       {}", doc.preamble.is_some());
    println!("Releases:       {}", doc.releases.len());
    println!("  Dated:        {}", stats.dated);
    println!("  Empty:        {}", stats.empty);
    println!("Sections:       {}", stats.sections);
    println!("  Titled:       {}", stats.titled);
    println!("Changes:        {}", stats.changes);
    println!("  Multi-line:   {}", stats.multiline);
    println!();
    println!("Header formats:");
    for (format, count) in &stats.formats {
        println!("  {:<14}{}", format, count);
    }
    println!("Bullets:");
    for (bullet, count) in &stats.bullets {
        println!("  {:<14}{}", bullet, count);
    }
    if let Some(latest) = doc.releases.first() {
        println!();
        println!("Latest:         {}", release_heading(latest));
    }

    Ok(())
}

#[derive(Default)]
struct DocumentStats {
    dated: usize,
    empty: usize,
    sections: usize,
    titled: usize,
    changes: usize,
    multiline: usize,
    formats: BTreeMap<&'static str, usize>,
    bullets: BTreeMap<char, usize>,
}

impl DocumentStats {
    fn from_document(doc: &Document) -> Self {
        let mut stats = Self::default();

        for release in &doc.releases {
            if release.date.is_some() {
                stats.dated += 1;
            }
            if release.is_empty() {
                stats.empty += 1;
            }
            *stats.formats.entry(format_name(release.format)).or_default() += 1;

            for section in &release.sections {
                stats.sections += 1;
                if section.title.is_some() {
                    stats.titled += 1;
                }
                for change in &section.changes {
                    stats.count_change(change);
                }
            }
        }

        stats
    }

    fn count_change(&mut self, change: &Change) {
        self.changes += 1;
        if change.description.contains('\n') {
            self.multiline += 1;
        }
        *self.bullets.entry(change.bullet).or_default() += 1;
    }
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonDocument<'a> {
    preamble: Option<&'a str>,
    releases: Vec<JsonRelease<'a>>,
}

#[derive(Serialize)]
struct JsonRelease<'a> {
    version: &'a str,
    date: Option<JsonDate<'a>>,
    format: JsonFormat,
    sections: Vec<JsonSection<'a>>,
}

#[derive(Serialize)]
struct JsonDate<'a> {
    /// The date as written, delimiters included
    text: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    separator: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum JsonFormat {
    Atx { level: u8, trailing: Option<char> },
    Setext { glyph: char, length: usize },
    Ascii { trailing: Option<char> },
}

#[derive(Serialize)]
struct JsonSection<'a> {
    title: Option<&'a str>,
    title_format: Option<JsonFormat>,
    changes: Vec<JsonChange<'a>>,
}

#[derive(Serialize)]
struct JsonChange<'a> {
    bullet: char,
    description: &'a str,
}

#[derive(Serialize)]
struct JsonError<'a> {
    kind: String,
    message: &'a str,
    line: u32,
    column: u32,
    start: u32,
    end: u32,
}

impl<'a> From<&'a Document<'a>> for JsonDocument<'a> {
    fn from(doc: &'a Document<'a>) -> Self {
        JsonDocument {
            preamble: doc.preamble.as_deref(),
            releases: doc.releases.iter().map(JsonRelease::from).collect(),
        }
    }
}

impl<'a> From<&'a Release<'a>> for JsonRelease<'a> {
    fn from(release: &'a Release<'a>) -> Self {
        JsonRelease {
            version: &release.version,
            date: release.date.as_ref().map(|date| JsonDate {
                text: date.to_string(),
                kind: match date.format {
                    DateFormat::Full { .. } => "full",
                    DateFormat::MonthYear { .. } => "month-year",
                    DateFormat::DayMonthYear { .. } => "day-month-year",
                    DateFormat::Custom(_) => "custom",
                },
                separator: match date.format {
                    DateFormat::Full { separator, .. } => Some(separator),
                    _ => None,
                },
                label: match &date.format {
                    DateFormat::Custom(label) => Some(&**label),
                    _ => None,
                },
            }),
            format: release.format.into(),
            sections: release
                .sections
                .iter()
                .map(|section| JsonSection {
                    title: section.title.as_ref().map(|t| &*t.text),
                    title_format: section.title.as_ref().map(|t| t.format.into()),
                    changes: section
                        .changes
                        .iter()
                        .map(|c| JsonChange {
                            bullet: c.bullet,
                            description: &c.description,
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl From<HeaderFormat> for JsonFormat {
    fn from(format: HeaderFormat) -> Self {
        match format {
            HeaderFormat::Atx { level, trailing } => JsonFormat::Atx { level, trailing },
            HeaderFormat::Setext { glyph, length } => JsonFormat::Setext { glyph, length },
            HeaderFormat::Ascii { trailing } => JsonFormat::Ascii { trailing },
        }
    }
}

impl<'a> From<&'a ParseError> for JsonError<'a> {
    fn from(err: &'a ParseError) -> Self {
        JsonError {
            kind: format!("{:?}", err.kind),
            message: &err.message,
            line: err.line,
            column: err.column,
            start: err.span.start,
            end: err.span.end,
        }
    }
}

// =============================================================================
// Text Output
// =============================================================================

fn print_document_summary(doc: &Document) {
    if let Some(preamble) = &doc.preamble {
        println!("Preamble: {} line(s)", preamble.lines().count());
    }

    println!("Releases: {}", doc.releases.len());
    for (i, release) in doc.releases.iter().enumerate() {
        println!(
            "  [{}] {} ({} section(s), {} change(s))",
            i + 1,
            release_heading(release),
            release.sections.len(),
            release.changes().count()
        );
    }
}

fn print_document_verbose(doc: &Document) {
    println!("=== Changelog ===");
    println!();

    if let Some(preamble) = &doc.preamble {
        println!("Preamble:");
        for line in preamble.lines() {
            println!("  | {}", line);
        }
        println!();
    }

    for release in &doc.releases {
        println!(
            "Release {} [{}]",
            release_heading(release),
            format_name(release.format)
        );
        for section in &release.sections {
            match &section.title {
                Some(title) => println!("  {} [{}]", title.text, format_name(title.format)),
                None => println!("  (default section)"),
            }
            for change in &section.changes {
                let mut lines = change.description.lines();
                println!("    {} {}", change.bullet, lines.next().unwrap_or(""));
                for line in lines {
                    println!("      {}", line);
                }
            }
        }
        println!();
    }
}

fn release_heading(release: &Release) -> String {
    match &release.date {
        Some(date) => format!("{} {}", release.version, date),
        None => release.version.to_string(),
    }
}

fn format_name(format: HeaderFormat) -> &'static str {
    match format {
        HeaderFormat::Atx { .. } => "atx",
        HeaderFormat::Setext { .. } => "setext",
        HeaderFormat::Ascii { .. } => "ascii",
    }
}
