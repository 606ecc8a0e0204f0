//! Fixed image file header

use crate::cursor::ByteCursor;
use crate::error::LoadError;
use crate::options::LoadOptions;
use tracing::debug;

/// Signature at the start of every image file: "T3-image" CR LF ^Z
pub const SIGNATURE: [u8; 11] = *b"T3-image\r\n\x1a";

/// The only image format version this loader reads
pub const IMAGE_VERSION: u16 = 1;

/// Reserved bytes between the version and the timestamp
pub const HEADER_PADDING: usize = 32;

/// Length of the build timestamp
pub const TIMESTAMP_LEN: usize = 24;

/// Total header length; the first block starts here
pub const HEADER_SIZE: usize = SIGNATURE.len() + 2 + HEADER_PADDING + TIMESTAMP_LEN;

/// Decoded image header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHeader {
    /// Format version (always [`IMAGE_VERSION`] once validated)
    pub version: u16,
    /// Build timestamp, kept verbatim
    pub timestamp: [u8; TIMESTAMP_LEN],
}

impl ImageHeader {
    /// Timestamp as text, for diagnostics only
    pub fn timestamp_text(&self) -> String {
        String::from_utf8_lossy(&self.timestamp)
            .trim_end_matches(['\0', ' '])
            .to_string()
    }

    /// Read and validate the header at the cursor
    ///
    /// Fails before anything past the header is touched if the signature or
    /// version is wrong.
    pub fn read(cursor: &mut ByteCursor<'_>, options: &LoadOptions) -> Result<Self, LoadError> {
        let signature = cursor.read_bytes(SIGNATURE.len())?;
        if signature != SIGNATURE {
            return Err(LoadError::InvalidSignature(signature.to_vec()));
        }

        let version = cursor.read_u16()?;
        if version != IMAGE_VERSION {
            return Err(LoadError::UnsupportedVersion(version));
        }

        cursor.read_null_padding(HEADER_PADDING, options.allow_header_noise)?;
        let timestamp = cursor.read_array::<TIMESTAMP_LEN>()?;

        let header = Self { version, timestamp };
        debug!(version, timestamp = %header.timestamp_text(), "read image header");
        Ok(header)
    }
}
