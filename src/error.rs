use thiserror::Error;

use crate::ad_block::CountField;
use crate::byte_reader::ReadError;

#[derive(Error, Debug)]
pub enum AdError {
    /// A block header (or its stream prefix) was cut short.
    #[error("truncated header in block at offset {offset}: {source}")]
    TruncatedHeader {
        offset: usize,
        #[source]
        source: ReadError,
    },

    /// The key payload held fewer bytes than the header counts require.
    #[error("truncated payload in block at offset {offset}: {source}")]
    TruncatedPayload {
        offset: usize,
        #[source]
        source: ReadError,
    },

    /// Aggregation was asked to reduce an empty block sequence.
    #[error("no anti-dictionary blocks to aggregate")]
    NoData,

    /// A key does not fit the byte width of the field it is stored in.
    #[error("key {key} does not fit field {field}")]
    KeyOutOfRange { field: CountField, key: u32 },

    /// A header count does not fit the byte width of its field.
    #[error("count {count} does not fit field {field}")]
    CountOutOfRange { field: CountField, count: u32 },

    /// The key list length disagrees with the header counts.
    #[error("block declares {expected} keys but carries {actual}")]
    KeyCount { expected: u64, actual: usize },

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// The external compressor exited unsuccessfully.
    #[error("external tool failed ({status}): {command}")]
    Tool { command: String, status: String },

    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("report error: {0}")]
    Csv(#[from] csv::Error),
}
