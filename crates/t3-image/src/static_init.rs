//! Static initializer table (SINI block)

use crate::cursor::ByteCursor;
use crate::error::DecodeError;

/// Size of one initializer record
pub const INITIALIZER_RECORD_SIZE: usize = 6;

/// Header bytes this loader understands: header size, code offset, count
const KNOWN_HEADER_SIZE: u32 = 12;

/// Deferred initializers, run once loading is complete
///
/// Records are kept opaque; a later pass decodes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticInitializers {
    /// Code offset of the static initializer code
    pub static_code_offset: u32,
    /// Number of records
    pub count: u32,
    /// `count * INITIALIZER_RECORD_SIZE` raw bytes
    pub data: Vec<u8>,
}

impl StaticInitializers {
    /// Decode a SINI payload
    ///
    /// Header fields past the first twelve bytes are skipped. Bytes after the
    /// record table are left unread.
    pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let header_size = cursor.read_u32()?;
        let static_code_offset = cursor.read_u32()?;
        let count = cursor.read_u32()?;
        if header_size > KNOWN_HEADER_SIZE {
            cursor.skip((header_size - KNOWN_HEADER_SIZE) as usize)?;
        }

        let table_len = (count as usize).saturating_mul(INITIALIZER_RECORD_SIZE);
        let data = cursor.read_bytes(table_len)?.to_vec();
        Ok(Self {
            static_code_offset,
            count,
            data,
        })
    }

    /// Raw 6-byte records
    pub fn records(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(INITIALIZER_RECORD_SIZE)
    }
}
