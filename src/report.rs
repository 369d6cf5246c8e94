//! Tab-separated experiment reports.

use std::fs::File;
use std::io::{self, Write};
use std::marker::PhantomData;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::aggregate::AdStats;
use crate::AdError;

/// A row type with a fixed column header.
pub trait ReportRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

/// Per-file timings of the batch experiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingRow {
    pub file_name: String,
    pub comp_time: String,
    pub decom_time: String,
    pub comp_size: u64,
    pub gz_size: u64,
}

impl ReportRow for TimingRow {
    const COLUMNS: &'static [&'static str] =
        &["file_name", "comp_time", "decom_time", "comp_size", "gz_size"];
}

/// Per-file row combining sizes, timings and anti-dictionary statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdRow {
    pub file_name: String,
    pub min_seq: usize,
    pub max_seq: usize,
    pub o_file_size: u64,
    pub c_file_size: u64,
    pub ad_file_size: u64,
    pub comp_time: String,
    pub decom_time: String,
    pub min_ad_size: u64,
    pub max_ad_size: u64,
    pub min_key_size: u8,
    pub max_key_size: u8,
    pub min_key: Option<u32>,
    pub max_key: Option<u32>,
}

impl ReportRow for AdRow {
    const COLUMNS: &'static [&'static str] = &[
        "file_name",
        "min_seq",
        "max_seq",
        "o_file_size",
        "c_file_size",
        "ad_file_size",
        "comp_time",
        "decom_time",
        "min_ad_size",
        "max_ad_size",
        "min_key_size",
        "max_key_size",
        "min_key",
        "max_key",
    ];
}

impl AdRow {
    /// Copy the aggregate fields of `stats` into this row.
    pub fn with_stats(mut self, stats: &AdStats) -> Self {
        self.min_ad_size = stats.min_ad_size;
        self.max_ad_size = stats.max_ad_size;
        self.min_key_size = stats.min_key_size_class;
        self.max_key_size = stats.max_key_size_class;
        self.min_key = stats.min_key;
        self.max_key = stats.max_key;
        self
    }
}

/// Writes a header line on creation, then one tab-separated line per row.
pub struct ReportWriter<R, W: Write> {
    inner: csv::Writer<W>,
    _row: PhantomData<R>,
}

impl<R: ReportRow> ReportWriter<R, File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, AdError> {
        Self::new(File::create(path)?)
    }
}

impl<R: ReportRow, W: Write> ReportWriter<R, W> {
    pub fn new(writer: W) -> Result<Self, AdError> {
        let mut inner = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(writer);
        inner.write_record(R::COLUMNS)?;
        Ok(Self {
            inner,
            _row: PhantomData,
        })
    }

    /// Append a row and flush it so partial runs leave a usable report.
    pub fn write(&mut self, row: &R) -> Result<(), AdError> {
        self.inner.serialize(row)?;
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, AdError> {
        self.inner
            .into_inner()
            .map_err(|e| AdError::Io(io::Error::new(e.error().kind(), e.to_string())))
    }
}

/// Format a duration as `h:mm:ss.ss`.
pub fn format_hms(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    let h = (secs / 3600.0) as u64;
    let m = ((secs % 3600.0) / 60.0) as u64;
    let s = secs % 60.0;
    format!("{h}:{m:02}:{s:05.2}")
}

/// Header-only summary of the shared anti-dictionary.
pub fn write_ad_summary<W: Write>(
    mut out: W,
    ad_file_size: u64,
    creation_time: Duration,
    key_size: u8,
    num_keys: u64,
) -> io::Result<()> {
    writeln!(out, "# AD size :{ad_file_size}")?;
    writeln!(out, "# AD creation time :{}", format_hms(creation_time))?;
    writeln!(out, "# AD key-size :{key_size}")?;
    writeln!(out, "# AD num-keys :{num_keys}")?;
    out.flush()
}
