use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ad_stream::Profile;
use crate::compare::ComparePolicy;
use crate::curate::{Alphabet, InvalidPolicy, LineBreaks};
use crate::generate::RandomInputs;
use crate::AdError;

/// Symbol set of the experiment, as understood by the external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlphabetKind {
    #[default]
    Dna,
    Protein,
}

impl AlphabetKind {
    pub fn alphabet(self) -> Alphabet {
        match self {
            AlphabetKind::Dna => Alphabet::dna(),
            AlphabetKind::Protein => Alphabet::protein(),
        }
    }

    /// Value of the tool's `-a` flag.
    pub fn tool_arg(self) -> &'static str {
        match self {
            AlphabetKind::Dna => "DNA",
            AlphabetKind::Protein => "PROT",
        }
    }
}

/// Settings of one experiment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Directory holding the raw (usually gzipped) sequence files.
    pub data_dir: PathBuf,
    /// Directory receiving cured files, tool outputs and reports.
    pub result_dir: PathBuf,
    /// Path of the external compressor binary.
    pub tool: PathBuf,
    pub alphabet: AlphabetKind,
    /// Only files in `data_dir` ending with this suffix are used.
    pub data_extension: String,
    pub cured_extension: String,
    pub invalid_policy: InvalidPolicy,
    /// Seed for [`InvalidPolicy::Random`]; entropy when unset.
    pub rng_seed: Option<u64>,
    pub line_breaks: LineBreaks,
    pub compare: ComparePolicy,
    /// Framing of the anti-dictionary file the tool writes.
    pub ad_profile: Profile,
    /// Abort the run at the first failed round trip.
    pub stop_on_mismatch: bool,
    /// Shape of the inputs written by a generated run.
    pub random: RandomInputs,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            result_dir: PathBuf::from("./result"),
            tool: PathBuf::from("./bin/mawcd"),
            alphabet: AlphabetKind::Dna,
            data_extension: ".fa.gz".into(),
            cured_extension: ".cured".into(),
            invalid_policy: InvalidPolicy::default(),
            rng_seed: None,
            line_breaks: LineBreaks::Join,
            compare: ComparePolicy::default(),
            ad_profile: Profile::Summary,
            stop_on_mismatch: true,
            random: RandomInputs::default(),
        }
    }
}

impl ExperimentConfig {
    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AdError> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AdError> {
        if self.data_extension.is_empty() {
            return Err(AdError::Config("data_extension must not be empty".into()));
        }
        if self.cured_extension.is_empty() {
            return Err(AdError::Config("cured_extension must not be empty".into()));
        }
        self.random.validate()?;
        if let InvalidPolicy::Deterministic(c) = self.invalid_policy {
            if !self.alphabet.alphabet().contains(c) {
                return Err(AdError::Config(format!(
                    "substitution character {c:?} is not in the {:?} alphabet",
                    self.alphabet
                )));
            }
        }
        Ok(())
    }

    /// All cured sequences concatenated, input of the anti-dictionary build.
    pub fn merged_file(&self) -> PathBuf {
        self.result_dir.join("sequence.merged")
    }

    pub fn ad_file(&self) -> PathBuf {
        self.result_dir.join("sequence.merged.ad")
    }

    pub fn stats_file(&self) -> PathBuf {
        self.result_dir.join("experiments.stats")
    }

    pub fn ad_stats_file(&self) -> PathBuf {
        self.result_dir.join("ad.stats")
    }

    pub fn log_file(&self) -> PathBuf {
        self.result_dir.join("experiments.log")
    }

    /// `index`-th generated input.
    pub fn generated_file(&self, index: usize) -> PathBuf {
        self.result_dir.join(format!("random.{index}.fa"))
    }

    /// Cured copy of the input named `name` (extension already stripped).
    pub fn cured_file(&self, name: &str) -> PathBuf {
        self.result_dir.join(format!("{name}{}", self.cured_extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: ExperimentConfig =
            serde_json::from_str(r#"{"alphabet": "protein", "rng_seed": 9}"#).unwrap();
        assert_eq!(cfg.alphabet, AlphabetKind::Protein);
        assert_eq!(cfg.rng_seed, Some(9));
        assert_eq!(cfg.data_extension, ".fa.gz");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn substitution_must_be_in_alphabet() {
        let cfg = ExperimentConfig {
            invalid_policy: InvalidPolicy::Deterministic('X'),
            ..ExperimentConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(AdError::Config(_))));
    }

    #[test]
    fn derived_paths() {
        let cfg = ExperimentConfig {
            result_dir: PathBuf::from("/tmp/r"),
            ..ExperimentConfig::default()
        };
        assert_eq!(cfg.ad_file(), PathBuf::from("/tmp/r/sequence.merged.ad"));
        assert_eq!(cfg.cured_file("chr1.fa"), PathBuf::from("/tmp/r/chr1.fa.cured"));
        assert_eq!(cfg.generated_file(3), PathBuf::from("/tmp/r/random.3.fa"));
    }

    #[test]
    fn random_section_is_validated() {
        let cfg: ExperimentConfig =
            serde_json::from_str(r#"{"random": {"min_seq_len": 50, "max_seq_len": 10}}"#)
                .unwrap();
        assert_eq!(cfg.random.seqs_per_file, 1);
        assert!(matches!(cfg.validate(), Err(AdError::Config(_))));
    }
}
