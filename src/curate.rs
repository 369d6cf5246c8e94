//! Sequence curation: force raw sequence text onto a fixed alphabet.

use std::io::{BufRead, Write};

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AdError;

/// Set of accepted (uppercase) sequence symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    /// Build an alphabet from `symbols`, uppercased and deduplicated.
    pub fn new<I: IntoIterator<Item = char>>(symbols: I) -> Result<Self, AdError> {
        let mut symbols: Vec<char> = symbols
            .into_iter()
            .map(|c| c.to_ascii_uppercase())
            .collect();
        symbols.sort_unstable();
        symbols.dedup();
        if symbols.is_empty() {
            return Err(AdError::Config("alphabet must not be empty".into()));
        }
        Ok(Self { symbols })
    }

    /// `A C G T N`
    pub fn dna() -> Self {
        Self {
            symbols: vec!['A', 'C', 'G', 'N', 'T'],
        }
    }

    /// The twenty standard amino acids plus selenocysteine.
    pub fn protein() -> Self {
        Self {
            symbols: "ACDEFGHIKLMNPQRSTUVWY".chars().collect(),
        }
    }

    pub fn contains(&self, c: char) -> bool {
        self.symbols.binary_search(&c).is_ok()
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }
}

/// What to put in place of a character outside the alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvalidPolicy {
    Deterministic(char),
    /// Uniform pick from the alphabet.
    Random,
}

impl Default for InvalidPolicy {
    fn default() -> Self {
        InvalidPolicy::Deterministic('A')
    }
}

/// How cured lines are laid out in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineBreaks {
    /// One cured line per input line; blank lines are copied through.
    #[default]
    Keep,
    /// Cured lines are concatenated into a single sequence.
    Join,
}

/// A character that was replaced during curation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    /// 1-based input line.
    pub line: usize,
    /// 1-based character column.
    pub column: usize,
    pub found: char,
    pub replaced_with: char,
}

/// Outcome of curating one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CureReport {
    pub cured_lines: usize,
    pub violations: usize,
    /// Shortest and longest cured line, if any line was cured.
    pub line_lengths: Option<(usize, usize)>,
}

pub struct Curator<R> {
    alphabet: Alphabet,
    policy: InvalidPolicy,
    rng: R,
    violations: Vec<Violation>,
    lines_seen: usize,
    cured_lines: usize,
    min_len: usize,
    max_len: usize,
}

impl<R: Rng> Curator<R> {
    pub fn new(alphabet: Alphabet, policy: InvalidPolicy, rng: R) -> Self {
        Self {
            alphabet,
            policy,
            rng,
            violations: Vec::new(),
            lines_seen: 0,
            cured_lines: 0,
            min_len: usize::MAX,
            max_len: 0,
        }
    }

    /// Cure one line (without its terminator).
    ///
    /// Whitespace-only lines come back unchanged and do not count toward the
    /// length extremes.
    pub fn cure(&mut self, line: &str) -> String {
        self.lines_seen += 1;
        if line.trim().is_empty() {
            return line.to_string();
        }
        let mut out = String::with_capacity(line.len());
        for (i, c) in line.chars().enumerate() {
            let upper = c.to_ascii_uppercase();
            if self.alphabet.contains(upper) {
                out.push(upper);
                continue;
            }
            let replacement = match self.policy {
                InvalidPolicy::Deterministic(d) => d,
                InvalidPolicy::Random => *self
                    .alphabet
                    .symbols()
                    .choose(&mut self.rng)
                    .unwrap_or(&upper),
            };
            warn!(
                line = self.lines_seen,
                column = i + 1,
                found = ?c,
                replacement = ?replacement,
                "invalid sequence character"
            );
            self.violations.push(Violation {
                line: self.lines_seen,
                column: i + 1,
                found: c,
                replaced_with: replacement,
            });
            out.push(replacement);
        }
        let len = out.chars().count();
        self.cured_lines += 1;
        self.min_len = self.min_len.min(len);
        self.max_len = self.max_len.max(len);
        out
    }

    /// Shortest and longest cured line so far.
    pub fn line_lengths(&self) -> Option<(usize, usize)> {
        (self.cured_lines > 0).then_some((self.min_len, self.max_len))
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn take_violations(&mut self) -> Vec<Violation> {
        std::mem::take(&mut self.violations)
    }

    /// Curate a whole sequence file.
    ///
    /// FASTA header lines (`>`) are dropped. Each sequence line is stripped of
    /// surrounding whitespace before curing. Cured data is also copied into
    /// `merged` when given. Line numbers and counters cover this call only.
    pub fn cure_reader<I: BufRead, O: Write>(
        &mut self,
        mut input: I,
        output: &mut O,
        mut merged: Option<&mut dyn Write>,
        breaks: LineBreaks,
    ) -> Result<CureReport, AdError> {
        let before = self.violations.len();
        self.lines_seen = 0;
        let (saved_lines, saved_min, saved_max) = (self.cured_lines, self.min_len, self.max_len);
        self.cured_lines = 0;
        self.min_len = usize::MAX;
        self.max_len = 0;

        let mut line = String::new();
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            if line.starts_with('>') {
                self.lines_seen += 1;
                continue;
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                self.lines_seen += 1;
                if breaks == LineBreaks::Keep {
                    output.write_all(line.as_bytes())?;
                }
                continue;
            }
            let mut cured = self.cure(trimmed);
            if breaks == LineBreaks::Keep {
                cured.push('\n');
            }
            output.write_all(cured.as_bytes())?;
            if let Some(m) = merged.as_mut() {
                m.write_all(cured.as_bytes())?;
            }
        }
        output.flush()?;

        let report = CureReport {
            cured_lines: self.cured_lines,
            violations: self.violations.len() - before,
            line_lengths: self.line_lengths(),
        };
        self.cured_lines += saved_lines;
        self.min_len = self.min_len.min(saved_min);
        self.max_len = self.max_len.max(saved_max);
        Ok(report)
    }
}
