//! Round-trip verification of decompressed output against its source.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// What ordered comparison does once one side runs out of lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingLines {
    /// Extra lines on either side are a mismatch.
    #[default]
    Reject,
    /// Stop at the shorter input and ignore the rest.
    Ignore,
}

/// Comparison policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparePolicy {
    Ordered(TrailingLines),
    /// Equal sets of lines, ignoring order and duplicates.
    Set,
}

impl Default for ComparePolicy {
    fn default() -> Self {
        ComparePolicy::Ordered(TrailingLines::Reject)
    }
}

fn next_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<bool> {
    buf.clear();
    Ok(reader.read_until(b'\n', buf)? > 0)
}

/// Compare two inputs line by line.
///
/// On the first differing pair both line lengths (terminator included) are
/// written to `diag` and `false` is returned.
pub fn compare_ordered<A: BufRead, B: BufRead, W: Write + ?Sized>(
    mut left: A,
    mut right: B,
    trailing: TrailingLines,
    diag: &mut W,
) -> io::Result<bool> {
    let mut a = Vec::new();
    let mut b = Vec::new();
    let mut line_no = 0usize;
    loop {
        let has_a = next_line(&mut left, &mut a)?;
        let has_b = next_line(&mut right, &mut b)?;
        line_no += 1;
        match (has_a, has_b) {
            (false, false) => return Ok(true),
            (true, true) => {
                if a != b {
                    warn!(line = line_no, left_len = a.len(), right_len = b.len(), "line mismatch");
                    writeln!(
                        diag,
                        "Difference at line {line_no}: orig_len : comp_len {} : {}",
                        a.len(),
                        b.len()
                    )?;
                    return Ok(false);
                }
            }
            (extra_left, _) => {
                if trailing == TrailingLines::Ignore {
                    return Ok(true);
                }
                let (side, len) = if extra_left {
                    ("original", a.len())
                } else {
                    ("decompressed", b.len())
                };
                warn!(line = line_no, side, "trailing line");
                writeln!(
                    diag,
                    "Extra line {line_no} in {side} file: length {len}"
                )?;
                return Ok(false);
            }
        }
    }
}

fn line_set<R: BufRead>(mut reader: R) -> io::Result<HashSet<Vec<u8>>> {
    let mut set = HashSet::new();
    let mut buf = Vec::new();
    while next_line(&mut reader, &mut buf)? {
        set.insert(std::mem::take(&mut buf));
    }
    Ok(set)
}

/// `true` iff both inputs contain the same set of lines.
pub fn compare_sets<A: BufRead, B: BufRead>(left: A, right: B) -> io::Result<bool> {
    Ok(line_set(left)? == line_set(right)?)
}

/// Compare two open inputs under `policy`.
pub fn compare_readers<A: BufRead, B: BufRead, W: Write + ?Sized>(
    left: A,
    right: B,
    policy: ComparePolicy,
    diag: &mut W,
) -> io::Result<bool> {
    match policy {
        ComparePolicy::Ordered(trailing) => compare_ordered(left, right, trailing, diag),
        ComparePolicy::Set => {
            let same = compare_sets(left, right)?;
            if !same {
                writeln!(diag, "Line sets differ")?;
            }
            Ok(same)
        }
    }
}

/// Open both files and compare them under `policy`.
pub fn compare_files<W: Write + ?Sized>(
    original: &Path,
    decoded: &Path,
    policy: ComparePolicy,
    diag: &mut W,
) -> io::Result<bool> {
    let left = BufReader::new(File::open(original)?);
    let right = BufReader::new(File::open(decoded)?);
    let same = compare_readers(left, right, policy, diag)?;
    if !same {
        writeln!(
            diag,
            "Difference in files: {} {}",
            original.display(),
            decoded.display()
        )?;
    }
    Ok(same)
}
