//! Mutation tests: damaged changelogs must fail cleanly or round-trip.

use changes_core::{parse, render, Parser};

const VARIANT_COUNT: usize = 200;
const MAX_MUTATION_STEPS: usize = 4;

const SAMPLE: &str = "\
# Changelog

## 2.1.0 (2024-03-02)

### Added

- `--json` output for the stats command
- configurable tab width, see the
  README for details

### Fixed

- crash on empty input
  - reported twice
- wrong column for lines with ünïcödé

## 2.0.0 (2023-11-20)

- breaking: renamed the crate

2.0.0-rc1 [Nov 2023]
--------------------

Known issues:
  * slow on large files

  * no Windows line endings

1.0.0 (unreleased):
+ first release
";

const MUTATIONS: &[&str] = &[
    "drop_blank_line",
    "extra_blank_lines",
    "truncate_tail",
    "dedent_line",
    "indent_noise",
    "swap_bullet",
    "swap_date_separator",
    "drop_close_paren",
    "strip_colon",
    "duplicate_line",
    "crlf",
];

/// Deterministic linear congruential generator.
struct Lcg {
    state: u64,
}

impl Lcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }

    fn choose(&mut self, max: usize) -> usize {
        if max == 0 {
            return 0;
        }
        (self.next_u32() as usize) % max
    }
}

/// Byte offset of the start of a random line.
fn random_line_start(input: &str, rng: &mut Lcg) -> usize {
    let starts: Vec<usize> = std::iter::once(0)
        .chain(input.match_indices('\n').map(|(i, _)| i + 1))
        .filter(|&i| i < input.len())
        .collect();
    if starts.is_empty() {
        return 0;
    }
    starts[rng.choose(starts.len())]
}

fn apply_mutations(mut input: String, rng: &mut Lcg) -> String {
    let steps = rng.choose(MAX_MUTATION_STEPS) + 1;
    for _ in 0..steps {
        match MUTATIONS[rng.choose(MUTATIONS.len())] {
            "drop_blank_line" => {
                if let Some(pos) = input.find("\n\n") {
                    input.replace_range(pos..pos + 2, "\n");
                }
            }
            "extra_blank_lines" => {
                input = input.replace("\n\n", "\n\n\n");
            }
            "truncate_tail" => {
                let len = input.len();
                if len > 8 {
                    let mut cut = len - rng.choose(len / 4).max(1);
                    while !input.is_char_boundary(cut) {
                        cut -= 1;
                    }
                    input.truncate(cut);
                }
            }
            "dedent_line" => {
                let start = random_line_start(&input, rng);
                if input[start..].starts_with("  ") {
                    input.replace_range(start..start + 2, "");
                }
            }
            "indent_noise" => {
                let start = random_line_start(&input, rng);
                input.insert_str(start, " ");
            }
            "swap_bullet" => {
                if let Some(pos) = input.find("\n- ") {
                    input.replace_range(pos + 1..pos + 2, "*");
                }
            }
            "swap_date_separator" => {
                if let Some(pos) = input.find("-03-") {
                    input.replace_range(pos..pos + 4, "/03/");
                }
            }
            "drop_close_paren" => {
                if let Some(pos) = input.find(")\n") {
                    input.remove(pos);
                }
            }
            "strip_colon" => {
                if let Some(pos) = input.find(":\n") {
                    input.remove(pos);
                }
            }
            "duplicate_line" => {
                let start = random_line_start(&input, rng);
                let end = input[start..].find('\n').map_or(input.len(), |i| start + i + 1);
                let line = input[start..end].to_string();
                input.insert_str(start, &line);
            }
            "crlf" => {
                input = input.replace('\n', "\r\n");
            }
            _ => {}
        }
    }
    input
}

fn variants(seed: u64) -> Vec<String> {
    let mut rng = Lcg::new(seed);
    let mut out = vec![SAMPLE.to_string()];
    for _ in 0..VARIANT_COUNT {
        out.push(apply_mutations(SAMPLE.to_string(), &mut rng));
    }
    out
}

fn check(parser: &Parser, input: &str) -> bool {
    match parser.parse(input) {
        Ok(doc) => {
            let rendered = render(&doc);
            let reparsed = parser
                .parse(&rendered)
                .unwrap_or_else(|e| panic!("rendered output rejected: {e}\ninput:\n{input}"));
            assert_eq!(doc, reparsed, "round trip changed document for:\n{input}");
            true
        }
        Err(err) => {
            assert!(err.line >= 1 && err.column >= 1, "unlocated error: {err:?}");
            assert!(err.span.start as usize <= input.len());
            assert!(err.span.end >= err.span.start);
            false
        }
    }
}

#[test]
fn test_sample_parses() {
    let doc = Parser::new().with_preamble(true).parse(SAMPLE).unwrap();
    assert_eq!(doc.preamble.as_deref(), Some("# Changelog"));
    assert_eq!(doc.releases.len(), 4);
    assert_eq!(doc.releases[2].version, "2.0.0-rc1");
    assert_eq!(doc.releases[2].sections[0].changes.len(), 2);
}

#[test]
fn test_strict_parser_rejects_sample_preamble() {
    assert!(parse(SAMPLE).is_err());
}

#[test]
fn test_mutated_inputs_fail_cleanly_or_round_trip() {
    let parser = Parser::new().with_preamble(true);
    let mut accepted = 0;
    let mut rejected = 0;

    for seed in [1, 7, 42] {
        for input in variants(seed) {
            if check(&parser, &input) {
                accepted += 1;
            } else {
                rejected += 1;
            }
        }
    }

    // The generator must exercise both outcomes.
    assert!(accepted > 0);
    assert!(rejected > 0);
}

#[test]
fn test_mutated_inputs_strict_mode() {
    let parser = Parser::new();
    for input in variants(99) {
        let stripped = input.trim_start_matches("# Changelog").to_string();
        check(&parser, &stripped);
    }
}
