// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounds-checked sequential reader over the raw log buffer.

use crate::error::DecodeError;

/// Sequential reader over a borrowed byte buffer.
///
/// Every read either advances the offset by exactly the requested width
/// or fails with [`DecodeError::TruncatedLog`] without mutating state.
/// All multi-byte integer fields in a TCG event log are little-endian;
/// that is a structural property of the format, not a platform
/// assumption.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at the start of `bytes`.
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Current read offset from the start of the buffer.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes left to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// True if the reader has consumed the whole buffer.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Read the next `n` bytes and advance past them.
    pub fn read(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let window = self
            .offset
            .checked_add(n)
            .and_then(|end| self.bytes.get(self.offset..end));
        match window {
            Some(window) => {
                self.offset += n;
                Ok(window)
            }
            None => Err(DecodeError::TruncatedLog {
                offset: self.offset,
                needed: n,
                remaining: self.remaining(),
            }),
        }
    }

    /// Read a fixed-size byte array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        // OK to unwrap: `read` returned exactly N bytes.
        Ok(self.read(N)?.try_into().unwrap())
    }

    /// Read a single byte.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a little-endian `u16`.
    pub fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a little-endian `u64`.
    pub fn read_u64_le(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07];
        let mut reader = ByteReader::new(&bytes);

        assert_eq!(reader.read_u16_le().unwrap(), 0x0201);
        assert_eq!(reader.read_u32_le().unwrap(), 0x06050403);
        assert_eq!(reader.offset(), 6);
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.read(1).unwrap(), [0x07]);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_failed_read_does_not_advance() {
        let bytes = [0xaa, 0xbb];
        let mut reader = ByteReader::new(&bytes);
        reader.read_u8().unwrap();

        let err = reader.read_u32_le().unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedLog {
                offset: 1,
                needed: 4,
                remaining: 1,
            }
        );

        // The failed read must not have consumed anything.
        assert_eq!(reader.offset(), 1);
        assert_eq!(reader.read_u8().unwrap(), 0xbb);
    }

    #[test]
    fn test_empty_buffer() {
        let mut reader = ByteReader::new(&[]);
        assert!(reader.is_empty());
        assert!(reader.read(1).is_err());
        assert_eq!(reader.read(0).unwrap(), &[] as &[u8]);
    }
}
