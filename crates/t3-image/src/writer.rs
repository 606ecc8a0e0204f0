//! Image writer
//!
//! Builds image files in memory. The loader never uses this; it exists for
//! tests, benchmarks and tools that need to synthesize images.

use crate::block::BLOCK_HEADER_SIZE;
use crate::entry::EntryPoint;
use crate::header::{HEADER_PADDING, IMAGE_VERSION, SIGNATURE, TIMESTAMP_LEN};
use crate::static_init::INITIALIZER_RECORD_SIZE;

/// Timestamp written by [`ImageWriter::with_header`]
pub const DEFAULT_TIMESTAMP: &[u8; TIMESTAMP_LEN] = b"Thu Jan 01 00:00:00 1970";

/// Little-endian encoder for block payloads
#[derive(Debug, Clone, Default)]
pub struct PayloadWriter {
    buffer: Vec<u8>,
}

impl PayloadWriter {
    /// Create an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Current length in bytes
    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    /// Emit a single byte
    pub fn emit_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Emit a 16-bit unsigned integer (little-endian)
    pub fn emit_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit a 32-bit unsigned integer (little-endian)
    pub fn emit_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Emit raw bytes
    pub fn emit_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Emit a one-byte length followed by the name (at most 255 bytes are kept)
    pub fn emit_name(&mut self, name: &str) {
        let bytes = &name.as_bytes()[..name.len().min(u8::MAX as usize)];
        self.emit_u8(bytes.len() as u8);
        self.emit_bytes(bytes);
    }

    /// Overwrite a previously emitted 16-bit value
    pub fn patch_u16(&mut self, offset: usize, value: u16) {
        self.buffer[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// Builder for whole image files
#[derive(Debug, Clone, Default)]
pub struct ImageWriter {
    buffer: Vec<u8>,
}

impl ImageWriter {
    /// Create an empty writer (no header)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer that already holds a valid version-1 header
    pub fn with_header() -> Self {
        let mut writer = Self::new();
        writer.header(IMAGE_VERSION, DEFAULT_TIMESTAMP);
        writer
    }

    /// Emit a file header
    pub fn header(&mut self, version: u16, timestamp: &[u8; TIMESTAMP_LEN]) -> &mut Self {
        self.buffer.extend_from_slice(&SIGNATURE);
        self.buffer.extend_from_slice(&version.to_le_bytes());
        self.buffer.extend_from_slice(&[0; HEADER_PADDING]);
        self.buffer.extend_from_slice(timestamp);
        self
    }

    /// Emit raw bytes
    pub fn emit_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buffer.extend_from_slice(bytes);
        self
    }

    /// Emit a block; the tag is space-padded or truncated to four bytes
    pub fn block(&mut self, tag: &str, flags: u16, payload: &[u8]) -> &mut Self {
        let mut raw = [b' '; 4];
        for (dst, src) in raw.iter_mut().zip(tag.bytes()) {
            *dst = src;
        }
        self.buffer.reserve(BLOCK_HEADER_SIZE + payload.len());
        self.buffer.extend_from_slice(&raw);
        self.buffer
            .extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.buffer.extend_from_slice(&flags.to_le_bytes());
        self.buffer.extend_from_slice(payload);
        self
    }

    /// Emit an ENTP block, optionally including the debug frame size
    pub fn entry_point(&mut self, entry: &EntryPoint, with_debug_frame: bool) -> &mut Self {
        let mut w = PayloadWriter::new();
        w.emit_u32(entry.code_offset);
        w.emit_u16(entry.method_header_size);
        w.emit_u16(entry.exception_entry_size);
        w.emit_u16(entry.line_entry_size);
        w.emit_u16(entry.debug_header_size);
        w.emit_u16(entry.local_symbol_header_size);
        w.emit_u16(entry.debug_version);
        if with_debug_frame {
            w.emit_u16(entry.debug_frame_size);
        }
        self.block("ENTP", 0, &w.into_bytes())
    }

    /// Emit a CPDF block for a 0-based pool id
    pub fn pool_definition(&mut self, pool: u16, page_count: u32, page_size: u32) -> &mut Self {
        let mut w = PayloadWriter::new();
        w.emit_u16(pool + 1);
        w.emit_u32(page_count);
        w.emit_u32(page_size);
        self.block("CPDF", 0, &w.into_bytes())
    }

    /// Emit a CPPG block; `pool` is written as given
    pub fn pool_page(&mut self, pool: u16, index: u32, xor_mask: u8, data: &[u8]) -> &mut Self {
        let mut w = PayloadWriter::new();
        w.emit_u16(pool);
        w.emit_u32(index);
        w.emit_u8(xor_mask);
        w.emit_bytes(data);
        self.block("CPPG", 0, &w.into_bytes())
    }

    /// Emit an OBJS block; size fields follow the LARGE_OBJECTS bit of `flags`
    pub fn objects(
        &mut self,
        metaclass: u16,
        flags: u16,
        objects: &[(u32, Vec<u8>)],
    ) -> &mut Self {
        let large = flags & crate::object::flags::LARGE_OBJECTS != 0;
        let mut w = PayloadWriter::new();
        w.emit_u16(objects.len() as u16);
        w.emit_u16(metaclass);
        w.emit_u16(flags);
        for (id, data) in objects {
            w.emit_u32(*id);
            if large {
                w.emit_u32(data.len() as u32);
            } else {
                w.emit_u16(data.len() as u16);
            }
            w.emit_bytes(data);
        }
        self.block("OBJS", 0, &w.into_bytes())
    }

    /// Emit an MCLD block with 2-byte property entries
    pub fn metaclasses(&mut self, entries: &[(&str, Vec<u16>)]) -> &mut Self {
        let mut w = PayloadWriter::new();
        w.emit_u16(entries.len() as u16);
        for (name, properties) in entries {
            let start = w.offset();
            w.emit_u16(0);
            w.emit_name(name);
            w.emit_u16(properties.len() as u16);
            w.emit_u16(2);
            for &prop in properties {
                w.emit_u16(prop);
            }
            let record_size = (w.offset() - start) as u16;
            w.patch_u16(start, record_size);
        }
        self.block("MCLD", 0, &w.into_bytes())
    }

    /// Emit an FNSD block
    pub fn function_sets(&mut self, names: &[&str]) -> &mut Self {
        let mut w = PayloadWriter::new();
        w.emit_u16(names.len() as u16);
        for name in names {
            w.emit_name(name);
        }
        self.block("FNSD", 0, &w.into_bytes())
    }

    /// Emit a SINI block with a 12-byte header
    pub fn static_initializers(
        &mut self,
        static_code_offset: u32,
        records: &[[u8; INITIALIZER_RECORD_SIZE]],
    ) -> &mut Self {
        let mut w = PayloadWriter::new();
        w.emit_u32(12);
        w.emit_u32(static_code_offset);
        w.emit_u32(records.len() as u32);
        for record in records {
            w.emit_bytes(record);
        }
        self.block("SINI", 0, &w.into_bytes())
    }

    /// Emit the EOF block
    pub fn eof(&mut self) -> &mut Self {
        self.block("EOF", 0, &[])
    }

    /// Current length in bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// True when nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the encoded image
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}
