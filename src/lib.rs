//! Anti-dictionary statistics and experiment driver for the `mawcd`
//! sequence compressor.
//!
//! The core decodes the binary anti-dictionary files written by the tool
//! ([`ad_block`], [`ad_stream`]) and reduces them to min/max statistics
//! ([`aggregate`]). Around it sit sequence curation ([`curate`]), synthetic
//! inputs ([`generate`]), round-trip verification ([`compare`]),
//! tab-separated reports ([`report`]) and a sequential driver that invokes
//! the external tool ([`runner`]).

pub mod ad_block;
pub mod ad_stream;
pub mod aggregate;
pub mod byte_reader;
pub mod compare;
pub mod config;
pub mod curate;
mod error;
pub mod generate;
pub mod io_utils;
pub mod report;
pub mod runner;

pub use ad_block::{
    decode_block, decode_full, decode_summary, encode_block, AdBlock, BlockHeader, CountField,
};
pub use ad_stream::{scan, scan_file, scan_with, Profile, ScanMode};
pub use aggregate::{aggregate, AdStats};
pub use byte_reader::{ByteReader, ReadError};
pub use compare::{
    compare_files, compare_ordered, compare_readers, compare_sets, ComparePolicy, TrailingLines,
};
pub use config::{AlphabetKind, ExperimentConfig};
pub use curate::{Alphabet, CureReport, Curator, InvalidPolicy, LineBreaks, Violation};
pub use error::AdError;
pub use generate::{RandomInputs, SequenceGenerator};
pub use report::{format_hms, AdRow, ReportWriter, TimingRow};
pub use runner::{DictionaryMode, Experiment, RunSummary, ToolCommand, ToolMode};
