//! Synthetic FASTA inputs for runs without a data set.

use std::io::Write;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::curate::Alphabet;
use crate::AdError;

/// Shape of a generated data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomInputs {
    pub num_files: usize,
    pub seqs_per_file: usize,
    /// Inclusive bounds of each sequence's length.
    pub min_seq_len: usize,
    pub max_seq_len: usize,
}

impl Default for RandomInputs {
    fn default() -> Self {
        Self {
            num_files: 100,
            seqs_per_file: 1,
            min_seq_len: 100,
            max_seq_len: 100_000,
        }
    }
}

impl RandomInputs {
    pub fn validate(&self) -> Result<(), AdError> {
        if self.seqs_per_file == 0 {
            return Err(AdError::Config("seqs_per_file must be at least 1".into()));
        }
        if self.min_seq_len == 0 {
            return Err(AdError::Config("min_seq_len must be at least 1".into()));
        }
        if self.min_seq_len > self.max_seq_len {
            return Err(AdError::Config(format!(
                "min_seq_len {} exceeds max_seq_len {}",
                self.min_seq_len, self.max_seq_len
            )));
        }
        Ok(())
    }
}

/// Draws uniformly random sequences over an alphabet.
pub struct SequenceGenerator<R> {
    alphabet: Alphabet,
    rng: R,
}

impl<R: Rng> SequenceGenerator<R> {
    pub fn new(alphabet: Alphabet, rng: R) -> Self {
        Self { alphabet, rng }
    }

    pub fn sequence(&mut self, len: usize) -> String {
        let symbols = self.alphabet.symbols();
        (0..len)
            .map(|_| symbols[self.rng.gen_range(0..symbols.len())])
            .collect()
    }

    /// Write `shape.seqs_per_file` records as `>seq i`, the sequence on one
    /// line, then a blank line. Sequence data alone is also appended to
    /// `merged` when given.
    ///
    /// Returns the shortest and longest sequence written.
    pub fn write_fasta<W: Write + ?Sized>(
        &mut self,
        out: &mut W,
        mut merged: Option<&mut dyn Write>,
        shape: &RandomInputs,
    ) -> Result<(usize, usize), AdError> {
        shape.validate()?;
        let mut lengths = (usize::MAX, 0);
        for i in 0..shape.seqs_per_file {
            let len = self.rng.gen_range(shape.min_seq_len..=shape.max_seq_len);
            let seq = self.sequence(len);
            write!(out, ">seq {i}\n{seq}\n\n")?;
            if let Some(m) = merged.as_mut() {
                m.write_all(seq.as_bytes())?;
            }
            lengths = (lengths.0.min(len), lengths.1.max(len));
        }
        out.flush()?;
        debug!(seqs = shape.seqs_per_file, min = lengths.0, max = lengths.1, "generated");
        Ok(lengths)
    }
}
