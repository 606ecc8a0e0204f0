//! Loader options
//!
//! Options can be built in code or read from a TOML file:
//!
//! ```toml
//! allow_header_noise = true
//! strict_block_sizes = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading an options file
#[derive(Debug, Error)]
pub enum OptionsError {
    /// Failed to read the options file
    #[error("Failed to read options file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse options: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Knobs controlling how strictly an image is checked
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadOptions {
    /// Accept non-zero bytes in the header's reserved padding
    pub allow_header_noise: bool,

    /// Reject OBJS, MCLD and FNSD blocks that leave payload bytes unread
    pub strict_block_sizes: bool,

    /// Reject an object id defined more than once instead of overwriting it
    pub reject_object_redefinition: bool,

    /// Treat CPPG pool ids as 1-based, like CPDF
    pub one_based_page_pool_ids: bool,
}

impl LoadOptions {
    /// Read options from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse options from a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(content)?)
    }
}
