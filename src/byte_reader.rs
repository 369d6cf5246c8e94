//! Bounds-checked little-endian reads over an in-memory byte slice.

use thiserror::Error;

/// Errors raised by [`ByteReader`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReadError {
    #[error("wanted {wanted} bytes at offset {offset}, {remaining} left")]
    Truncated {
        offset: usize,
        wanted: usize,
        remaining: usize,
    },
}

/// Cursor over a finite byte source.
///
/// Reads never block and never advance past the end: a failed read leaves
/// the position where it was.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn from_slice(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Read `width` bytes (1..=8) as an unsigned little-endian integer.
    pub fn read_uint(&mut self, width: usize) -> Result<u64, ReadError> {
        debug_assert!((1..=8).contains(&width), "width out of range");
        let bytes = self.take(width)?;
        let mut buf = [0u8; 8];
        buf[..width].copy_from_slice(bytes);
        Ok(u64::from_le_bytes(buf))
    }

    pub fn read_u8(&mut self) -> Result<u8, ReadError> {
        Ok(self.read_uint(1)? as u8)
    }

    /// Advance over `n` bytes without interpreting them.
    pub fn skip(&mut self, n: usize) -> Result<(), ReadError> {
        self.take(n).map(|_| ())
    }

    /// Whether at least one byte remains.
    pub fn has_more(&self) -> bool {
        self.pos < self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], ReadError> {
        let remaining = self.remaining();
        if n > remaining {
            return Err(ReadError::Truncated {
                offset: self.pos,
                wanted: n,
                remaining,
            });
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let data = [0x01, 0x34, 0x12, 0x78, 0x56, 0x34, 0x12];
        let mut r = ByteReader::from_slice(&data);
        assert_eq!(r.read_uint(1).unwrap(), 1);
        assert_eq!(r.read_uint(2).unwrap(), 0x1234);
        assert_eq!(r.read_uint(4).unwrap(), 0x1234_5678);
        assert!(!r.has_more());
    }

    #[test]
    fn short_read_keeps_position() {
        let data = [0xAA, 0xBB, 0xCC];
        let mut r = ByteReader::from_slice(&data);
        r.skip(1).unwrap();
        let err = r.read_uint(4).unwrap_err();
        assert_eq!(
            err,
            ReadError::Truncated {
                offset: 1,
                wanted: 4,
                remaining: 2
            }
        );
        assert_eq!(r.position(), 1);
        assert_eq!(r.read_uint(2).unwrap(), 0xCCBB);
    }

    #[test]
    fn empty_source() {
        let mut r = ByteReader::from_slice(&[]);
        assert!(!r.has_more());
        assert!(r.read_u8().is_err());
    }

    #[test]
    fn eight_byte_read() {
        let data = u64::MAX.to_le_bytes();
        let mut r = ByteReader::from_slice(&data);
        assert_eq!(r.read_uint(8).unwrap(), u64::MAX);
    }
}
