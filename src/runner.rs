//! Sequential experiment driver around the external `mawcd` compressor.
//!
//! Every step runs to completion before the next starts: external processes
//! are waited on before their outputs are read.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ad_stream::{scan_file, Profile, ScanMode};
use crate::aggregate::{aggregate, AdStats};
use crate::compare::compare_files;
use crate::config::{AlphabetKind, ExperimentConfig};
use crate::curate::{CureReport, Curator};
use crate::generate::SequenceGenerator;
use crate::report::{format_hms, write_ad_summary, AdRow, ReportWriter, TimingRow};
use crate::AdError;

/// Operating mode of the external tool (`-m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolMode {
    AntiDictionary,
    Compress,
    Decompress,
}

impl ToolMode {
    fn as_arg(self) -> &'static str {
        match self {
            ToolMode::AntiDictionary => "AD",
            ToolMode::Compress => "COM",
            ToolMode::Decompress => "DECOM",
        }
    }
}

/// One invocation of the external tool.
#[derive(Debug, Clone)]
pub struct ToolCommand {
    pub tool: PathBuf,
    pub mode: ToolMode,
    pub alphabet: AlphabetKind,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub dictionary: PathBuf,
}

impl ToolCommand {
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "-m".to_string(),
            self.mode.as_arg().to_string(),
            "-a".to_string(),
            self.alphabet.tool_arg().to_string(),
            "-i".to_string(),
            self.input.display().to_string(),
        ];
        if let Some(output) = &self.output {
            args.push("-o".into());
            args.push(output.display().to_string());
        }
        args.push("-d".into());
        args.push(self.dictionary.display().to_string());
        args
    }

    /// Run to completion and return the wall-clock time it took.
    pub fn run(&self) -> Result<Duration, AdError> {
        info!(command = %self, "running external tool");
        let start = Instant::now();
        let status = Command::new(&self.tool)
            .args(self.args())
            .stdout(Stdio::null())
            .status()?;
        let elapsed = start.elapsed();
        if !status.success() {
            return Err(AdError::Tool {
                command: self.to_string(),
                status: status.to_string(),
            });
        }
        Ok(elapsed)
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tool.display())?;
        for arg in self.args() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Whether one anti-dictionary serves all files or each file gets its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DictionaryMode {
    /// Build once from the merged sequence; report [`TimingRow`]s.
    #[default]
    Shared,
    /// The compressor writes a stream-profile dictionary per file; report
    /// [`AdRow`]s.
    PerFile,
}

/// A raw input found in the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// File name with a trailing `.gz` removed.
    pub name: String,
    pub path: PathBuf,
}

/// A cured copy of an input.
#[derive(Debug, Clone)]
pub struct CuredFile {
    pub name: String,
    pub path: PathBuf,
    pub report: CureReport,
}

/// Outcome of a full run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub files: Vec<String>,
    pub verified: usize,
    /// First file whose round trip failed, if any.
    pub failed: Option<String>,
}

/// List inputs in `config.data_dir` ending with `config.data_extension`,
/// sorted by name.
pub fn discover_inputs(config: &ExperimentConfig) -> Result<Vec<InputFile>, AdError> {
    let mut inputs = Vec::new();
    for entry in fs::read_dir(&config.data_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if !file_name.ends_with(&config.data_extension) {
            continue;
        }
        let name = file_name
            .strip_suffix(".gz")
            .unwrap_or(&file_name)
            .to_string();
        inputs.push(InputFile {
            name,
            path: entry.path(),
        });
    }
    inputs.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(inputs)
}

/// Open `path`, transparently decompressing gzip input.
pub fn open_sequence(path: &Path) -> Result<Box<dyn BufRead>, AdError> {
    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let n = file.read(&mut magic)?;
    let file = File::open(path)?;
    if n == 2 && magic == [0x1f, 0x8b] {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(BufReader::new(file)))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Size of `path` after gzip compression at the default level.
pub fn gzip_size(path: &Path) -> Result<u64, AdError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    io::copy(&mut File::open(path)?, &mut encoder)?;
    Ok(encoder.finish()?.len() as u64)
}

pub struct Experiment {
    config: ExperimentConfig,
    dictionary: DictionaryMode,
    log: BufWriter<File>,
}

impl Experiment {
    /// Create the result directory and the diagnostics log.
    pub fn new(config: ExperimentConfig, dictionary: DictionaryMode) -> Result<Self, AdError> {
        config.validate()?;
        fs::create_dir_all(&config.result_dir)?;
        let log = BufWriter::new(File::create(config.log_file())?);
        Ok(Self {
            config,
            dictionary,
            log,
        })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    fn command(
        &self,
        mode: ToolMode,
        input: &Path,
        output: Option<PathBuf>,
        dictionary: &Path,
    ) -> ToolCommand {
        ToolCommand {
            tool: self.config.tool.clone(),
            mode,
            alphabet: self.config.alphabet,
            input: input.to_path_buf(),
            output,
            dictionary: dictionary.to_path_buf(),
        }
    }

    fn rng(&self) -> StdRng {
        match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Cure every input, writing per-file copies and the merged sequence.
    pub fn cure_inputs(&mut self, inputs: &[InputFile]) -> Result<Vec<CuredFile>, AdError> {
        let mut curator = Curator::new(
            self.config.alphabet.alphabet(),
            self.config.invalid_policy,
            self.rng(),
        );
        let mut merged = BufWriter::new(File::create(self.config.merged_file())?);
        let mut cured = Vec::with_capacity(inputs.len());

        for input in inputs {
            let path = self.config.cured_file(&input.name);
            let mut out = BufWriter::new(File::create(&path)?);
            let report = curator.cure_reader(
                open_sequence(&input.path)?,
                &mut out,
                Some(&mut merged),
                self.config.line_breaks,
            )?;
            for v in curator.take_violations() {
                writeln!(
                    self.log,
                    "Invalid character {:?} in {} at {}:{}, replaced with {:?}",
                    v.found, input.name, v.line, v.column, v.replaced_with
                )?;
            }
            info!(
                file = %input.name,
                lines = report.cured_lines,
                violations = report.violations,
                "cured"
            );
            cured.push(CuredFile {
                name: input.name.clone(),
                path,
                report,
            });
        }
        merged.flush()?;
        writeln!(self.log, "Number of files: {}", cured.len())?;
        Ok(cured)
    }

    /// Write `config.random.num_files` synthetic inputs and the merged
    /// sequence. Generated data is already on the alphabet, so it is used
    /// as-is in place of cured copies.
    pub fn generate_inputs(&mut self) -> Result<Vec<CuredFile>, AdError> {
        let shape = self.config.random;
        let mut generator = SequenceGenerator::new(self.config.alphabet.alphabet(), self.rng());
        let mut merged = BufWriter::new(File::create(self.config.merged_file())?);
        let mut files = Vec::with_capacity(shape.num_files);

        for i in 0..shape.num_files {
            let path = self.config.generated_file(i);
            let mut out = BufWriter::new(File::create(&path)?);
            let lengths = generator.write_fasta(&mut out, Some(&mut merged), &shape)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            info!(file = %name, min = lengths.0, max = lengths.1, "generated");
            files.push(CuredFile {
                name,
                path,
                report: CureReport {
                    cured_lines: shape.seqs_per_file,
                    violations: 0,
                    line_lengths: Some(lengths),
                },
            });
        }
        merged.flush()?;
        writeln!(self.log, "Number of files: {}", files.len())?;
        Ok(files)
    }

    /// Decode and aggregate the anti-dictionary at `path`.
    pub fn ad_stats(
        &self,
        path: &Path,
        profile: Profile,
        mode: ScanMode,
    ) -> Result<(AdStats, u64), AdError> {
        let blocks = scan_file(path, profile, mode)?;
        let total_keys = blocks.iter().map(|b| b.ad_size()).sum();
        Ok((aggregate(&blocks)?, total_keys))
    }

    /// Build the shared anti-dictionary from the merged sequence.
    pub fn build_shared_dictionary(&mut self) -> Result<AdStats, AdError> {
        let ad_file = self.config.ad_file();
        let elapsed = self
            .command(ToolMode::AntiDictionary, &self.config.merged_file(), None, &ad_file)
            .run()?;
        let (stats, num_keys) = self.ad_stats(&ad_file, self.config.ad_profile, ScanMode::Summary)?;
        let size = fs::metadata(&ad_file)?.len();
        writeln!(
            self.log,
            "Anti-dictionary created: key-size: num-keys: {} : {}",
            stats.max_key_size_class, num_keys
        )?;
        write_ad_summary(
            File::create(self.config.ad_stats_file())?,
            size,
            elapsed,
            stats.max_key_size_class,
            num_keys,
        )?;
        Ok(stats)
    }

    /// Compress, decompress and verify one cured file.
    fn round_trip(&mut self, file: &CuredFile, dictionary: &Path) -> Result<RoundTrip, AdError> {
        let com = append_ext(&file.path, ".com");
        let decom = append_ext(&com, ".decom");

        let comp_time = self
            .command(ToolMode::Compress, &file.path, Some(com.clone()), dictionary)
            .run()?;
        writeln!(self.log, "File compressed")?;
        let decom_time = self
            .command(ToolMode::Decompress, &com, Some(decom.clone()), dictionary)
            .run()?;
        writeln!(self.log, "File decompressed")?;

        let valid = compare_files(&file.path, &decom, self.config.compare, &mut self.log)?;
        Ok(RoundTrip {
            comp_time,
            decom_time,
            comp_size: fs::metadata(&com)?.len(),
            valid,
        })
    }

    /// Run the whole experiment over every input in the data directory.
    pub fn run(&mut self) -> Result<RunSummary, AdError> {
        let inputs = discover_inputs(&self.config)?;
        info!(files = inputs.len(), dir = %self.config.data_dir.display(), "discovered inputs");
        let cured = self.cure_inputs(&inputs)?;
        self.run_files(&cured)
    }

    /// Run the experiment over freshly generated inputs instead of the data
    /// directory.
    pub fn run_generated(&mut self) -> Result<RunSummary, AdError> {
        let files = self.generate_inputs()?;
        self.run_files(&files)
    }

    fn run_files(&mut self, cured: &[CuredFile]) -> Result<RunSummary, AdError> {
        let mut summary = RunSummary {
            files: cured.iter().map(|c| c.name.clone()).collect(),
            ..RunSummary::default()
        };
        let stats_file = self.config.stats_file();
        let mut timing = None;
        let mut ad_rows = None;
        match self.dictionary {
            DictionaryMode::Shared => {
                self.build_shared_dictionary()?;
                timing = Some(ReportWriter::<TimingRow, _>::create(&stats_file)?);
            }
            DictionaryMode::PerFile => {
                ad_rows = Some(ReportWriter::<AdRow, _>::create(&stats_file)?);
            }
        }

        let progress = ProgressBar::new(cured.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        for file in cured {
            progress.set_message(file.name.clone());
            writeln!(self.log, "\n== {} ==", file.name)?;
            let dictionary = match self.dictionary {
                DictionaryMode::Shared => self.config.ad_file(),
                DictionaryMode::PerFile => append_ext(&file.path, ".ad"),
            };
            let trip = self.round_trip(file, &dictionary)?;
            if !trip.valid {
                warn!(file = %file.name, "round trip failed");
                writeln!(self.log, "COMPRESSION WRONG")?;
                summary.failed = Some(file.name.clone());
                if self.config.stop_on_mismatch {
                    break;
                }
                progress.inc(1);
                continue;
            }
            writeln!(self.log, "File Compression Valid.")?;
            summary.verified += 1;

            if let Some(w) = timing.as_mut() {
                w.write(&TimingRow {
                    file_name: file.name.clone(),
                    comp_time: format_hms(trip.comp_time),
                    decom_time: format_hms(trip.decom_time),
                    comp_size: trip.comp_size,
                    gz_size: gzip_size(&file.path)?,
                })?;
            }
            if let Some(w) = ad_rows.as_mut() {
                let (stats, _) = self.ad_stats(&dictionary, Profile::Stream, ScanMode::Full)?;
                let (min_seq, max_seq) = file.report.line_lengths.unwrap_or((0, 0));
                let row = AdRow {
                    file_name: file.name.clone(),
                    min_seq,
                    max_seq,
                    o_file_size: fs::metadata(&file.path)?.len(),
                    c_file_size: trip.comp_size,
                    ad_file_size: fs::metadata(&dictionary)?.len(),
                    comp_time: format_hms(trip.comp_time),
                    decom_time: format_hms(trip.decom_time),
                    min_ad_size: 0,
                    max_ad_size: 0,
                    min_key_size: 0,
                    max_key_size: 0,
                    min_key: None,
                    max_key: None,
                }
                .with_stats(&stats);
                w.write(&row)?;
            }
            progress.inc(1);
        }
        progress.finish_and_clear();
        self.log.flush()?;
        info!(verified = summary.verified, failed = ?summary.failed, "experiment finished");
        Ok(summary)
    }
}

struct RoundTrip {
    comp_time: Duration,
    decom_time: Duration,
    comp_size: u64,
    valid: bool,
}

fn append_ext(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(ext);
    PathBuf::from(s)
}
