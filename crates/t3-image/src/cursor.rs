//! Forward-only binary cursor over an image buffer
//!
//! Every multi-byte integer in a T3 image is little-endian. The cursor never
//! seeks backwards; a failed read leaves the position where it was.

use crate::error::DecodeError;

/// Sequential reader over an immutable byte buffer
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buffer: &'a [u8],
    position: usize,
    /// Absolute offset of `buffer[0]` within the whole image
    base: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `buffer`
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
            base: 0,
        }
    }

    /// Absolute offset of the next byte to be read
    pub fn position(&self) -> usize {
        self.base + self.position
    }

    /// Bytes left before the end of this cursor's window
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// True when every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    // ===== Basic Reading =====

    /// Read exactly `n` bytes
    ///
    /// A zero-length read returns an empty slice and consumes nothing.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.remaining();
        if n > available {
            return Err(DecodeError::UnexpectedEof {
                offset: self.position(),
                needed: n,
                available,
            });
        }
        let start = self.position;
        self.position += n;
        Ok(&self.buffer[start..self.position])
    }

    /// Read a fixed-size byte array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    /// Read a 16-bit unsigned integer (little-endian)
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Read a 32-bit unsigned integer (little-endian)
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Read a 32-bit signed integer (little-endian)
    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Consume `n` bytes of padding
    ///
    /// Unless `allow_noise` is set, every byte must be zero.
    pub fn read_null_padding(
        &mut self,
        n: usize,
        allow_noise: bool,
    ) -> Result<&'a [u8], DecodeError> {
        let start = self.position();
        let padding = self.read_bytes(n)?;
        if !allow_noise {
            if let Some(index) = padding.iter().position(|&b| b != 0) {
                return Err(DecodeError::NonZeroPadding {
                    offset: start + index,
                });
            }
        }
        Ok(padding)
    }

    /// Read a name stored as a one-byte length followed by UTF-8 bytes
    pub fn read_name(&mut self) -> Result<String, DecodeError> {
        let offset = self.position();
        let len = self.read_u8()? as usize;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidName { offset })
    }

    /// Discard `n` bytes
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.read_bytes(n).map(|_| ())
    }

    /// Consume everything left in this cursor's window
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.buffer[self.position..];
        self.position = self.buffer.len();
        rest
    }

    /// Split off a cursor over the next `n` bytes
    ///
    /// This cursor advances past them immediately; the returned cursor keeps
    /// reporting absolute offsets.
    pub fn sub_cursor(&mut self, n: usize) -> Result<ByteCursor<'a>, DecodeError> {
        let base = self.position();
        let buffer = self.read_bytes(n)?;
        Ok(ByteCursor {
            buffer,
            position: 0,
            base,
        })
    }
}
