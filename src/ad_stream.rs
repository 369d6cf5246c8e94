//! Scanning whole anti-dictionary files into block sequences.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ad_block::{decode_block, decode_summary, AdBlock};
use crate::byte_reader::ByteReader;
use crate::AdError;

/// Framing of an anti-dictionary file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// A single block at offset 0 with no prefix.
    Summary,
    /// Zero or more blocks, each behind an 8-byte sequence-size prefix.
    Stream,
}

/// Whether key payloads are decoded or skipped in the stream profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    Summary,
    #[default]
    Full,
}

/// Scan every block in `reader`.
///
/// The summary profile reads exactly one header and returns it as a
/// key-less block. The stream profile decodes blocks until the input ends on
/// a block boundary. Any decode error aborts the scan and nothing decoded so
/// far is returned.
pub fn scan(reader: &mut ByteReader<'_>, profile: Profile) -> Result<Vec<AdBlock>, AdError> {
    scan_with(reader, profile, ScanMode::Full)
}

pub fn scan_with(
    reader: &mut ByteReader<'_>,
    profile: Profile,
    mode: ScanMode,
) -> Result<Vec<AdBlock>, AdError> {
    match profile {
        Profile::Summary => Ok(vec![decode_summary(reader)?.into()]),
        Profile::Stream => {
            let with_keys = mode == ScanMode::Full;
            let mut blocks = Vec::new();
            while let Some(block) = decode_block(reader, true, with_keys)? {
                blocks.push(block);
            }
            debug!(blocks = blocks.len(), "stream scan complete");
            Ok(blocks)
        }
    }
}

/// Open `path` read-only, scan it, and release it before returning.
pub fn scan_file<P: AsRef<Path>>(
    path: P,
    profile: Profile,
    mode: ScanMode,
) -> Result<Vec<AdBlock>, AdError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let len = file.metadata()?.len();
    // Mapping a zero-length file fails on some platforms.
    let blocks = if len == 0 {
        scan_with(&mut ByteReader::from_slice(&[]), profile, mode)?
    } else {
        // SAFETY: read-only mapping of a file the external tool has finished
        // writing; it is dropped before this function returns.
        let mmap = unsafe { Mmap::map(&file)? };
        scan_with(&mut ByteReader::from_slice(&mmap), profile, mode)?
    };
    info!(
        path = %path.display(),
        bytes = len,
        blocks = blocks.len(),
        "scanned anti-dictionary"
    );
    Ok(blocks)
}
