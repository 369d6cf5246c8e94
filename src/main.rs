use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;

use adstats::io_utils::{ad_cli_error, io_cli_error, simple_cli_error, CliError};
use adstats::runner::open_sequence;
use adstats::{
    aggregate, compare_readers, scan_file, Alphabet, AlphabetKind, ComparePolicy, Curator,
    DictionaryMode, Experiment, ExperimentConfig, InvalidPolicy, LineBreaks, Profile,
    RandomInputs, ScanMode, SequenceGenerator, TrailingLines,
};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "adstats",
    version,
    about = "Anti-dictionary statistics and mawcd experiment driver"
)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print min/max statistics of an anti-dictionary file
    Stats {
        ad_file: PathBuf,
        /// File holds length-prefixed blocks instead of a single block
        #[arg(long)]
        stream: bool,
        /// Skip key payloads (stream files only)
        #[arg(long)]
        headers_only: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Cure a sequence file against a fixed alphabet
    Cure {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, value_enum, default_value_t = AlphabetArg::Dna)]
        alphabet: AlphabetArg,
        /// Replace invalid characters with a random symbol
        #[arg(long)]
        random: bool,
        /// Replacement for invalid characters
        #[arg(long, default_value_t = 'A')]
        substitute: char,
        /// Seed for --random
        #[arg(long)]
        seed: Option<u64>,
        /// Concatenate cured lines into a single sequence
        #[arg(long)]
        join: bool,
    },
    /// Check that a decompressed file matches its original
    Compare {
        original: PathBuf,
        decoded: PathBuf,
        /// Compare line sets instead of line order
        #[arg(long)]
        set: bool,
        /// Ignore extra lines past the end of the shorter file
        #[arg(long)]
        allow_trailing: bool,
    },
    /// Run the full experiment
    Run {
        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Let the compressor build one dictionary per file
        #[arg(long)]
        per_file: bool,
        /// Generate synthetic inputs instead of reading the data directory
        #[arg(long)]
        random: bool,
    },
    /// Write random FASTA files over an alphabet
    Generate {
        out_dir: PathBuf,
        #[arg(long, default_value_t = 1)]
        files: usize,
        /// Sequences per file
        #[arg(long, default_value_t = 1)]
        seqs: usize,
        #[arg(long, default_value_t = 100)]
        min_len: usize,
        #[arg(long, default_value_t = 100_000)]
        max_len: usize,
        #[arg(long, value_enum, default_value_t = AlphabetArg::Dna)]
        alphabet: AlphabetArg,
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlphabetArg {
    #[value(name = "dna")]
    Dna,
    #[value(name = "protein")]
    Protein,
}

impl From<AlphabetArg> for AlphabetKind {
    fn from(arg: AlphabetArg) -> Self {
        match arg {
            AlphabetArg::Dna => AlphabetKind::Dna,
            AlphabetArg::Protein => AlphabetKind::Protein,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli.command) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Stats {
            ad_file,
            stream,
            headers_only,
            json,
        } => {
            let profile = if stream {
                Profile::Stream
            } else {
                Profile::Summary
            };
            let mode = if headers_only {
                ScanMode::Summary
            } else {
                ScanMode::Full
            };
            let blocks = scan_file(&ad_file, profile, mode)
                .map_err(|e| ad_cli_error("scanning anti-dictionary", e))?;
            let stats = aggregate(&blocks).map_err(|e| ad_cli_error("aggregating", e))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                let key = |k: Option<u32>| k.map_or_else(|| "-".to_string(), |k| k.to_string());
                println!("blocks\t{}", blocks.len());
                println!("min_ad_size\t{}", stats.min_ad_size);
                println!("max_ad_size\t{}", stats.max_ad_size);
                println!("min_key_size\t{}", stats.min_key_size_class);
                println!("max_key_size\t{}", stats.max_key_size_class);
                println!("min_key\t{}", key(stats.min_key));
                println!("max_key\t{}", key(stats.max_key));
            }
        }
        Commands::Cure {
            input,
            output,
            alphabet,
            random,
            substitute,
            seed,
            join,
        } => {
            let alphabet: Alphabet = AlphabetKind::from(alphabet).alphabet();
            let policy = if random {
                InvalidPolicy::Random
            } else {
                if !alphabet.contains(substitute.to_ascii_uppercase()) {
                    return Err(
                        simple_cli_error("substitute character is not in the alphabet").into(),
                    );
                }
                InvalidPolicy::Deterministic(substitute.to_ascii_uppercase())
            };
            let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
            let mut curator = Curator::new(alphabet, policy, rng);
            let reader = open_sequence(&input).map_err(|e| ad_cli_error("opening input", e))?;
            let file =
                File::create(&output).map_err(|e| io_cli_error("creating output", &output, e))?;
            let mut out = BufWriter::new(file);
            let breaks = if join {
                LineBreaks::Join
            } else {
                LineBreaks::Keep
            };
            let report = curator
                .cure_reader(reader, &mut out, None, breaks)
                .map_err(|e| ad_cli_error("curing", e))?;
            let mut stderr = io::stderr().lock();
            for v in curator.violations() {
                writeln!(stderr, "invalid char {:?} at {}:{}", v.found, v.line, v.column)?;
            }
            match report.line_lengths {
                Some((min, max)) => println!("{}\t{}\t{}", report.cured_lines, min, max),
                None => println!("0\t-\t-"),
            }
        }
        Commands::Compare {
            original,
            decoded,
            set,
            allow_trailing,
        } => {
            let policy = if set {
                ComparePolicy::Set
            } else if allow_trailing {
                ComparePolicy::Ordered(TrailingLines::Ignore)
            } else {
                ComparePolicy::Ordered(TrailingLines::Reject)
            };
            let left = File::open(&original).map_err(|e| io_cli_error("opening", &original, e))?;
            let right = File::open(&decoded).map_err(|e| io_cli_error("opening", &decoded, e))?;
            let mut stderr = io::stderr().lock();
            let same = compare_readers(
                BufReader::new(left),
                BufReader::new(right),
                policy,
                &mut stderr,
            )
            .map_err(|e| CliError {
                msg: format!(
                    "Error comparing '{}' with '{}': {e}",
                    original.display(),
                    decoded.display()
                ),
                source: Some(Box::new(e)),
            })?;
            if !same {
                let msg = format!(
                    "files differ: {} {}",
                    original.display(),
                    decoded.display()
                );
                return Err(simple_cli_error(&msg).into());
            }
            println!("files match");
        }
        Commands::Run {
            config,
            per_file,
            random,
        } => {
            let config = match config {
                Some(path) => ExperimentConfig::load(&path)
                    .map_err(|e| ad_cli_error("loading configuration", e))?,
                None => ExperimentConfig::default(),
            };
            let mode = if per_file {
                DictionaryMode::PerFile
            } else {
                DictionaryMode::Shared
            };
            let mut experiment =
                Experiment::new(config, mode).map_err(|e| ad_cli_error("preparing run", e))?;
            let summary = if random {
                experiment.run_generated()
            } else {
                experiment.run()
            }
            .map_err(|e| ad_cli_error("running experiment", e))?;
            println!("{} files, {} verified", summary.files.len(), summary.verified);
            if let Some(name) = summary.failed {
                return Err(simple_cli_error(&format!("round trip failed for {name}")).into());
            }
        }
        Commands::Generate {
            out_dir,
            files,
            seqs,
            min_len,
            max_len,
            alphabet,
            seed,
        } => {
            let shape = RandomInputs {
                num_files: files,
                seqs_per_file: seqs,
                min_seq_len: min_len,
                max_seq_len: max_len,
            };
            shape
                .validate()
                .map_err(|e| ad_cli_error("checking sizes", e))?;
            fs::create_dir_all(&out_dir)
                .map_err(|e| io_cli_error("creating directory", &out_dir, e))?;
            let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
            let alphabet = AlphabetKind::from(alphabet).alphabet();
            let mut generator = SequenceGenerator::new(alphabet, rng);
            for i in 0..files {
                let path = out_dir.join(format!("random.{i}.fa"));
                let file = File::create(&path).map_err(|e| io_cli_error("creating", &path, e))?;
                let (min, max) = generator
                    .write_fasta(&mut BufWriter::new(file), None, &shape)
                    .map_err(|e| ad_cli_error("generating", e))?;
                println!("{}\t{min}\t{max}", path.display());
            }
        }
    }
    Ok(())
}
