//! Benchmarks comparing changelog parsing vs pulldown-cmark (Markdown)
//!
//! Run with: cargo bench -p changes-core

use changes_core::{render, Parser};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pulldown_cmark::{Options, Parser as MdParser};

/// Sample changelog in keep-a-changelog style.
const CHANGELOG_SAMPLE: &str = r#"## 2.1.0 (2024-03-02)

### Added

- `--json` output for the stats command
- configurable tab width, see the
  README for details
- support for `[Jan 2024]` style dates

### Fixed

- crash on empty input
  - reported twice
- wrong column for lines with multi-byte characters
- trailing commas after version numbers

## 2.0.0 (2023-11-20)

### Changed

- renamed the crate
- errors now carry a line and a column

### Removed

- the deprecated `strict` flag

"#;

/// Sample changelog in plain-text style.
const ASCII_SAMPLE: &str = r#"0.9.1 (2019-02-11):
  * handle CRLF line endings
  * skip blank lines between changes

0.9.0 (2019-01-05):
New features:
  * month/year dates
  * day/month/year dates
Bug fixes:
  * off-by-one in column numbers
    when the line starts with a tab

"#;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    // Set throughput for bytes/sec reporting
    group.throughput(Throughput::Bytes(CHANGELOG_SAMPLE.len() as u64));

    group.bench_function("changelog_atx", |b| {
        let parser = Parser::new();
        b.iter(|| {
            let doc = parser.parse(black_box(CHANGELOG_SAMPLE)).unwrap();
            black_box(doc.releases.len())
        })
    });

    group.bench_function("markdown_pulldown", |b| {
        b.iter(|| {
            let parser = MdParser::new_ext(black_box(CHANGELOG_SAMPLE), Options::all());
            let events: Vec<_> = parser.collect();
            black_box(events.len())
        })
    });

    group.throughput(Throughput::Bytes(ASCII_SAMPLE.len() as u64));

    group.bench_function("changelog_ascii", |b| {
        let parser = Parser::new();
        b.iter(|| {
            let doc = parser.parse(black_box(ASCII_SAMPLE)).unwrap();
            black_box(doc.releases.len())
        })
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let doc = Parser::new().parse(CHANGELOG_SAMPLE).unwrap();

    group.bench_function("changelog_atx", |b| {
        b.iter(|| black_box(render(black_box(&doc))).len())
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    // Test with different document sizes
    for size in [1, 10, 100, 1000].iter() {
        let content: String = CHANGELOG_SAMPLE.repeat(*size);

        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(BenchmarkId::new("changelog", size), &content, |b, content| {
            let parser = Parser::new();
            b.iter(|| {
                let doc = parser.parse(black_box(content)).unwrap();
                black_box(doc.releases.len())
            })
        });

        group.bench_with_input(BenchmarkId::new("markdown", size), &content, |b, content| {
            b.iter(|| {
                let parser = MdParser::new_ext(black_box(content), Options::all());
                let events: Vec<_> = parser.collect();
                black_box(events.len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_render, bench_scaling);
criterion_main!(benches);
