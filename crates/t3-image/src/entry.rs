//! Entry point (ENTP block)

use crate::cursor::ByteCursor;
use crate::error::DecodeError;

/// Debug frame size assumed when the ENTP block is too short to carry one
pub const DEFAULT_DEBUG_FRAME_SIZE: u16 = 4;

/// Program entry point plus the layout constants the interpreter needs to
/// read method headers and debug records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    /// Code offset of the entry function
    pub code_offset: u32,
    /// Size of a method header
    pub method_header_size: u16,
    /// Size of one exception table entry
    pub exception_entry_size: u16,
    /// Size of one debug line table entry
    pub line_entry_size: u16,
    /// Size of the debug table header
    pub debug_header_size: u16,
    /// Size of a debug local symbol record header
    pub local_symbol_header_size: u16,
    /// Debug record format version
    pub debug_version: u16,
    /// Size of the debug frame header
    pub debug_frame_size: u16,
}

impl EntryPoint {
    /// Decode an ENTP payload
    ///
    /// `cursor` must cover exactly the block payload: the optional debug
    /// frame size is read only when at least two bytes remain after the
    /// fixed fields. Anything after that is padding and left unread.
    pub fn decode(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let code_offset = cursor.read_u32()?;
        let method_header_size = cursor.read_u16()?;
        let exception_entry_size = cursor.read_u16()?;
        let line_entry_size = cursor.read_u16()?;
        let debug_header_size = cursor.read_u16()?;
        let local_symbol_header_size = cursor.read_u16()?;
        let debug_version = cursor.read_u16()?;

        let debug_frame_size = if cursor.remaining() >= 2 {
            cursor.read_u16()?
        } else {
            DEFAULT_DEBUG_FRAME_SIZE
        };

        Ok(Self {
            code_offset,
            method_header_size,
            exception_entry_size,
            line_entry_size,
            debug_header_size,
            local_symbol_header_size,
            debug_version,
            debug_frame_size,
        })
    }
}
