//! Data block headers and tags

use crate::cursor::ByteCursor;
use crate::error::DecodeError;
use std::fmt;

/// Size of a block header: tag (4) + size (4) + flags (2)
pub const BLOCK_HEADER_SIZE: usize = 10;

/// Block header flags
pub mod flags {
    /// The block must be understood; an unknown mandatory block aborts the load
    pub const MANDATORY: u16 = 1 << 0;
}

/// Block type, identified by its four-character tag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BlockTag {
    /// Entry point
    Entp,
    /// Constant pool definition
    Cpdf,
    /// Constant pool page
    Cppg,
    /// Static objects
    Objs,
    /// Multimedia resources
    Mres,
    /// Multimedia resource links
    Mrel,
    /// Metaclass dependency list
    Mcld,
    /// Symbolic names export
    Symd,
    /// Function set dependency list
    Fnsd,
    /// Static initializer list
    Sini,
    /// Source file descriptors (debug)
    Srcf,
    /// Global symbol table (debug)
    Gsym,
    /// Macro symbols (debug)
    Macr,
    /// Method header list (debug)
    Mhls,
    /// End of image
    Eof,
    /// Any other tag, trimmed
    Other(String),
}

impl BlockTag {
    /// Decode a raw tag, trimming trailing ASCII whitespace and NULs
    pub fn from_raw(raw: &[u8; 4]) -> Self {
        let len = raw
            .iter()
            .rposition(|&b| !b.is_ascii_whitespace() && b != 0)
            .map_or(0, |i| i + 1);
        match &raw[..len] {
            b"ENTP" => BlockTag::Entp,
            b"CPDF" => BlockTag::Cpdf,
            b"CPPG" => BlockTag::Cppg,
            b"OBJS" => BlockTag::Objs,
            b"MRES" => BlockTag::Mres,
            b"MREL" => BlockTag::Mrel,
            b"MCLD" => BlockTag::Mcld,
            b"SYMD" => BlockTag::Symd,
            b"FNSD" => BlockTag::Fnsd,
            b"SINI" => BlockTag::Sini,
            b"SRCF" => BlockTag::Srcf,
            b"GSYM" => BlockTag::Gsym,
            b"MACR" => BlockTag::Macr,
            b"MHLS" => BlockTag::Mhls,
            b"EOF" => BlockTag::Eof,
            other => BlockTag::Other(String::from_utf8_lossy(other).into_owned()),
        }
    }

    /// The trimmed tag text
    pub fn as_str(&self) -> &str {
        match self {
            BlockTag::Entp => "ENTP",
            BlockTag::Cpdf => "CPDF",
            BlockTag::Cppg => "CPPG",
            BlockTag::Objs => "OBJS",
            BlockTag::Mres => "MRES",
            BlockTag::Mrel => "MREL",
            BlockTag::Mcld => "MCLD",
            BlockTag::Symd => "SYMD",
            BlockTag::Fnsd => "FNSD",
            BlockTag::Sini => "SINI",
            BlockTag::Srcf => "SRCF",
            BlockTag::Gsym => "GSYM",
            BlockTag::Macr => "MACR",
            BlockTag::Mhls => "MHLS",
            BlockTag::Eof => "EOF",
            BlockTag::Other(tag) => tag,
        }
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Header preceding every block payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block type
    pub tag: BlockTag,
    /// Payload size in bytes
    pub size: u32,
    /// Block flags (see [`flags`])
    pub flags: u16,
    /// Absolute offset of the tag
    pub offset: usize,
}

impl BlockHeader {
    /// Read a block header at the cursor
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, DecodeError> {
        let offset = cursor.position();
        let raw = cursor.read_array::<4>()?;
        let size = cursor.read_u32()?;
        let flags = cursor.read_u16()?;
        Ok(Self {
            tag: BlockTag::from_raw(&raw),
            size,
            flags,
            offset,
        })
    }

    /// Whether a loader that does not understand this block must fail
    pub fn is_mandatory(&self) -> bool {
        self.flags & flags::MANDATORY != 0
    }
}

/// What the loader did with a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Decoded into the image
    Loaded,
    /// Recognized but not decoded; payload skipped
    Unsupported,
    /// Unknown and optional; payload skipped
    Skipped,
    /// End of image
    End,
}

/// Trace entry for one processed block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSummary {
    /// Block type
    pub tag: BlockTag,
    /// Absolute offset of the block header
    pub offset: usize,
    /// Payload size
    pub size: u32,
    /// Block flags
    pub flags: u16,
    /// How the block was handled
    pub outcome: BlockOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_trimming() {
        assert_eq!(BlockTag::from_raw(b"EOF "), BlockTag::Eof);
        assert_eq!(BlockTag::from_raw(b"EOF\0"), BlockTag::Eof);
        assert_eq!(BlockTag::from_raw(b"OBJS"), BlockTag::Objs);
        assert_eq!(BlockTag::from_raw(b"AB  "), BlockTag::Other("AB".to_string()));
        assert_eq!(BlockTag::from_raw(b"    "), BlockTag::Other(String::new()));
        assert_eq!(BlockTag::from_raw(b" EOF"), BlockTag::Other(" EOF".to_string()));
    }

    #[test]
    fn test_tag_trims_trailing_whitespace() {
        assert_eq!(BlockTag::from_raw(b"EOF\t"), BlockTag::Eof);
        assert_eq!(BlockTag::from_raw(b"EOF\r"), BlockTag::Eof);
        assert_eq!(BlockTag::from_raw(b"EOF\n"), BlockTag::Eof);
        assert_eq!(BlockTag::from_raw(b"AB\r\n"), BlockTag::Other("AB".to_string()));
        assert_eq!(BlockTag::from_raw(b"A\tB "), BlockTag::Other("A\tB".to_string()));
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(BlockTag::Cppg.to_string(), "CPPG");
        assert_eq!(BlockTag::Eof.to_string(), "EOF");
        assert_eq!(BlockTag::Other("XYZ".to_string()).to_string(), "XYZ");
    }

    #[test]
    fn test_read_block_header() {
        let mut bytes = b"MCLD".to_vec();
        bytes.extend_from_slice(&300u32.to_le_bytes());
        bytes.extend_from_slice(&flags::MANDATORY.to_le_bytes());

        let mut cursor = ByteCursor::new(&bytes);
        let header = BlockHeader::read(&mut cursor).unwrap();
        assert_eq!(header.tag, BlockTag::Mcld);
        assert_eq!(header.size, 300);
        assert!(header.is_mandatory());
        assert_eq!(header.offset, 0);
        assert_eq!(cursor.position(), BLOCK_HEADER_SIZE);
    }
}
