//! Error types for image decoding and loading

use crate::header::IMAGE_VERSION;
use thiserror::Error;

/// Low-level errors raised by the byte cursor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Fewer bytes remain than a read requested
    #[error("Unexpected end of image at offset {offset}: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        /// Absolute offset of the failed read
        offset: usize,
        /// Bytes requested
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// A byte in a mandatory-zero region was not zero
    #[error("Data found in null padding at offset {offset}")]
    NonZeroPadding {
        /// Absolute offset of the first non-zero byte
        offset: usize,
    },

    /// A length-prefixed name is not valid UTF-8
    #[error("Invalid UTF-8 name at offset {offset}")]
    InvalidName {
        /// Absolute offset of the name's length byte
        offset: usize,
    },
}

/// Errors that abort an image load
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Cursor-level decode error
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The file does not start with the T3 image signature
    #[error("Invalid signature: expected T3 image header, got {0:02x?}")]
    InvalidSignature(Vec<u8>),

    /// The header carries a version this loader cannot read
    #[error("Unsupported image version: {0} (supported: {IMAGE_VERSION})")]
    UnsupportedVersion(u16),

    /// A second ENTP block was found
    #[error("Duplicate ENTP block at offset {offset}")]
    DuplicateEntryPoint {
        /// Offset of the second block's header
        offset: usize,
    },

    /// An unrecognized block has its mandatory flag set
    #[error("Unknown mandatory block '{tag}' at offset {offset}")]
    UnknownMandatoryBlock {
        /// Trimmed block tag
        tag: String,
        /// Offset of the block header
        offset: usize,
    },

    /// A block handler needed more bytes than the block declares
    #[error("Block '{tag}' at offset {offset} reads past its declared size of {size} bytes")]
    BlockOverrun {
        /// Trimmed block tag
        tag: String,
        /// Offset of the block header
        offset: usize,
        /// Declared payload size
        size: u32,
    },

    /// A block left payload bytes unread (strict mode only)
    #[error("Block '{tag}' at offset {offset} left {remaining} bytes unread")]
    UnconsumedBytes {
        /// Trimmed block tag
        tag: String,
        /// Offset of the block header
        offset: usize,
        /// Bytes left over
        remaining: usize,
    },

    /// CPDF declared pool id 0 (ids are stored 1-based)
    #[error("Invalid constant pool id 0 at offset {offset}")]
    InvalidPoolId {
        /// Offset of the pool id field
        offset: usize,
    },

    /// CPPG references a pool no CPDF block has defined
    #[error("Page for undefined constant pool {pool} at offset {offset}")]
    UndefinedPool {
        /// 0-based pool id
        pool: u16,
        /// Offset of the pool id field
        offset: usize,
    },

    /// CPPG page index is outside the pool's page count
    #[error("Page index {index} out of range for constant pool {pool} ({page_count} pages)")]
    PageOutOfRange {
        /// 0-based pool id
        pool: u16,
        /// Page index from the block
        index: u32,
        /// Page count declared by CPDF
        page_count: u32,
    },

    /// A metaclass declares property entries too narrow to hold an id
    #[error("Metaclass '{name}' declares {width}-byte property entries (minimum 2)")]
    PropertyEntryTooNarrow {
        /// Metaclass name
        name: String,
        /// Declared entry width
        width: u16,
    },

    /// A data holder carries a type code the decoder does not know
    #[error("Unknown data holder type {code:#04x} at offset {offset}")]
    UnknownDataHolderType {
        /// Type code byte
        code: u8,
        /// Offset of the type code
        offset: usize,
    },

    /// An object id was defined twice (only when redefinition is rejected)
    #[error("Object {id} redefined at offset {offset}")]
    DuplicateObject {
        /// Object id
        id: u32,
        /// Offset of the second definition
        offset: usize,
    },
}

/// Coarse classification of load failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input ended early
    Eof,
    /// Structurally invalid data
    Format,
    /// Unsupported header version
    Version,
    /// More than one entry point
    DuplicateEntryPoint,
    /// Unknown block that must not be skipped
    UnknownMandatoryBlock,
}

impl LoadError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Decode(DecodeError::UnexpectedEof { .. }) => ErrorKind::Eof,
            LoadError::Decode(_) => ErrorKind::Format,
            LoadError::UnsupportedVersion(_) => ErrorKind::Version,
            LoadError::DuplicateEntryPoint { .. } => ErrorKind::DuplicateEntryPoint,
            LoadError::UnknownMandatoryBlock { .. } => ErrorKind::UnknownMandatoryBlock,
            LoadError::InvalidSignature(_)
            | LoadError::BlockOverrun { .. }
            | LoadError::UnconsumedBytes { .. }
            | LoadError::InvalidPoolId { .. }
            | LoadError::UndefinedPool { .. }
            | LoadError::PageOutOfRange { .. }
            | LoadError::PropertyEntryTooNarrow { .. }
            | LoadError::UnknownDataHolderType { .. }
            | LoadError::DuplicateObject { .. } => ErrorKind::Format,
        }
    }
}
