//! Subcommand implementations

pub mod blocks;
pub mod check;
pub mod info;
pub mod metaclasses;
pub mod objects;
pub mod pools;

use anyhow::Context;
use std::path::Path;
use t3_image::{Image, LoadOptions};

/// Read an image file and load it
pub fn load(path: &Path, options: LoadOptions) -> anyhow::Result<Image> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    t3_image::load_image_with(&bytes, options)
        .with_context(|| format!("Failed to load {}", path.display()))
}
