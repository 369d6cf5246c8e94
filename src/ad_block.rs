//! Anti-dictionary block codec.
//!
//! A block is laid out little-endian as:
//!
//! ```text
//! [prefix: u64, stream profile only]
//! [key_size_class: u8]
//! [n0_1: u8][n1_1: u8][n0_2: u16][n1_2: u16][n0_4: u32][n1_4: u32]
//! [keys: n0_1 x 1B, n1_1 x 1B, n0_2 x 2B, n1_2 x 2B, n0_4 x 4B, n1_4 x 4B]
//! ```
//!
//! The prefix carries the size of the sequence the block was built from. It
//! is skipped here. The `key_size_class` byte is informational; the stored
//! key widths are fixed by the field a key belongs to.

use std::fmt;

use tracing::debug;

use crate::byte_reader::ByteReader;
use crate::AdError;

/// Width in bytes of the per-block prefix in the stream profile.
pub const STREAM_PREFIX_SIZE: usize = 8;
/// Size of the encoded block header.
pub const HEADER_SIZE: usize = 1 + 1 + 1 + 2 + 2 + 4 + 4;

/// One of the six count fields of a block header, in stored order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CountField {
    Ad0Width1,
    Ad1Width1,
    Ad0Width2,
    Ad1Width2,
    Ad0Width4,
    Ad1Width4,
}

impl CountField {
    pub const ALL: [CountField; 6] = [
        CountField::Ad0Width1,
        CountField::Ad1Width1,
        CountField::Ad0Width2,
        CountField::Ad1Width2,
        CountField::Ad0Width4,
        CountField::Ad1Width4,
    ];

    /// Byte width of both the count field and the keys it counts.
    pub fn width(self) -> usize {
        match self {
            CountField::Ad0Width1 | CountField::Ad1Width1 => 1,
            CountField::Ad0Width2 | CountField::Ad1Width2 => 2,
            CountField::Ad0Width4 | CountField::Ad1Width4 => 4,
        }
    }

    /// Partition index: 0 for forward (AD0), 1 for reverse complement (AD1).
    pub fn partition(self) -> u8 {
        match self {
            CountField::Ad0Width1 | CountField::Ad0Width2 | CountField::Ad0Width4 => 0,
            CountField::Ad1Width1 | CountField::Ad1Width2 | CountField::Ad1Width4 => 1,
        }
    }

    /// Largest key representable at this field's width.
    pub fn max_key(self) -> u32 {
        match self.width() {
            1 => u8::MAX as u32,
            2 => u16::MAX as u32,
            _ => u32::MAX,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for CountField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}_{}", self.partition(), self.width())
    }
}

/// Header of a block: everything `decode_summary` reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockHeader {
    pub key_size_class: u8,
    /// `(n0_1, n1_1, n0_2, n1_2, n0_4, n1_4)`
    pub counts: [u32; 6],
}

impl BlockHeader {
    /// Total number of keys in the block.
    pub fn ad_size(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    pub fn count(&self, field: CountField) -> u32 {
        self.counts[field.index()]
    }

    /// Number of payload bytes the counts call for.
    pub fn payload_len(&self) -> u64 {
        CountField::ALL
            .iter()
            .map(|&f| self.count(f) as u64 * f.width() as u64)
            .sum()
    }
}

/// A decoded anti-dictionary block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdBlock {
    pub key_size_class: u8,
    /// `(n0_1, n1_1, n0_2, n1_2, n0_4, n1_4)`
    pub counts: [u32; 6],
    /// Keys widened to `u32`, present only after a full decode.
    pub keys: Option<Vec<u32>>,
}

impl AdBlock {
    pub fn header(&self) -> BlockHeader {
        BlockHeader {
            key_size_class: self.key_size_class,
            counts: self.counts,
        }
    }

    pub fn ad_size(&self) -> u64 {
        self.header().ad_size()
    }

    /// Keys stored under `field`, or `None` if the block was decoded without
    /// its payload.
    pub fn keys_of(&self, field: CountField) -> Option<&[u32]> {
        let keys = self.keys.as_deref()?;
        let start: usize = self.counts[..field.index()]
            .iter()
            .map(|&c| c as usize)
            .sum();
        let end = start + self.counts[field.index()] as usize;
        keys.get(start..end)
    }
}

impl From<BlockHeader> for AdBlock {
    fn from(header: BlockHeader) -> Self {
        Self {
            key_size_class: header.key_size_class,
            counts: header.counts,
            keys: None,
        }
    }
}

fn read_header(reader: &mut ByteReader<'_>, offset: usize) -> Result<BlockHeader, AdError> {
    let truncated = |source| AdError::TruncatedHeader { offset, source };
    let key_size_class = reader.read_u8().map_err(truncated)?;
    let mut counts = [0u32; 6];
    for field in CountField::ALL {
        counts[field.index()] = reader.read_uint(field.width()).map_err(truncated)? as u32;
    }
    Ok(BlockHeader {
        key_size_class,
        counts,
    })
}

/// Decode a header at the reader's position without touching the payload.
pub fn decode_summary(reader: &mut ByteReader<'_>) -> Result<BlockHeader, AdError> {
    let offset = reader.position();
    read_header(reader, offset)
}

/// Decode one block, header and keys.
///
/// Returns `Ok(None)` when `stream_profile` is set and the reader is
/// exhausted exactly at a block boundary.
pub fn decode_full(
    reader: &mut ByteReader<'_>,
    stream_profile: bool,
) -> Result<Option<AdBlock>, AdError> {
    decode_block(reader, stream_profile, true)
}

/// Decode one block. With `with_keys` unset the payload is skipped, still
/// bounds-checked, and the returned block carries no keys.
pub fn decode_block(
    reader: &mut ByteReader<'_>,
    stream_profile: bool,
    with_keys: bool,
) -> Result<Option<AdBlock>, AdError> {
    let offset = reader.position();
    if stream_profile {
        if !reader.has_more() {
            return Ok(None);
        }
        reader
            .skip(STREAM_PREFIX_SIZE)
            .map_err(|source| AdError::TruncatedHeader { offset, source })?;
    }
    let header = read_header(reader, offset)?;
    let truncated = |source| AdError::TruncatedPayload { offset, source };

    let keys = if with_keys {
        let capacity = header.ad_size().min(reader.remaining() as u64) as usize;
        let mut keys = Vec::with_capacity(capacity);
        for field in CountField::ALL {
            for _ in 0..header.count(field) {
                keys.push(reader.read_uint(field.width()).map_err(truncated)? as u32);
            }
        }
        Some(keys)
    } else {
        let len = usize::try_from(header.payload_len()).unwrap_or(usize::MAX);
        reader.skip(len).map_err(truncated)?;
        None
    };

    debug!(
        offset,
        key_size_class = header.key_size_class,
        ad_size = header.ad_size(),
        "decoded anti-dictionary block"
    );
    Ok(Some(AdBlock {
        key_size_class: header.key_size_class,
        counts: header.counts,
        keys,
    }))
}

/// Encode a block in the layout read by [`decode_full`].
///
/// `prefix` is written ahead of the header for the stream profile. A block
/// without keys encodes as a bare header, which is what the summary profile
/// reads.
pub fn encode_block(block: &AdBlock, prefix: Option<u64>) -> Result<Vec<u8>, AdError> {
    let header = block.header();
    for field in CountField::ALL {
        let count = header.count(field);
        if count > field.max_key() {
            return Err(AdError::CountOutOfRange { field, count });
        }
    }
    // Reserve only for keys actually present; a header-only block may count
    // far more keys than fit in memory.
    let payload_len = match &block.keys {
        Some(keys) => {
            if keys.len() as u64 != header.ad_size() {
                return Err(AdError::KeyCount {
                    expected: header.ad_size(),
                    actual: keys.len(),
                });
            }
            CountField::ALL
                .iter()
                .map(|&f| header.count(f) as usize * f.width())
                .sum()
        }
        None => 0,
    };

    let mut out = Vec::with_capacity(STREAM_PREFIX_SIZE + HEADER_SIZE + payload_len);
    if let Some(prefix) = prefix {
        out.extend_from_slice(&prefix.to_le_bytes());
    }
    out.push(block.key_size_class);
    for field in CountField::ALL {
        out.extend_from_slice(&header.count(field).to_le_bytes()[..field.width()]);
    }
    if block.keys.is_some() {
        for field in CountField::ALL {
            for &key in block.keys_of(field).unwrap_or_default() {
                if key > field.max_key() {
                    return Err(AdError::KeyOutOfRange { field, key });
                }
                out.extend_from_slice(&key.to_le_bytes()[..field.width()]);
            }
        }
    }
    Ok(out)
}
