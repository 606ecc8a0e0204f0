//! `t3dump info` — Summarize an image.

use serde::Serialize;
use std::path::Path;
use t3_image::{Image, LoadOptions};

#[derive(Serialize)]
struct Summary {
    file: String,
    version: u16,
    timestamp: String,
    entry_point: Option<EntrySummary>,
    blocks: usize,
    pools: usize,
    pages: usize,
    objects: usize,
    transient_objects: usize,
    metaclasses: Vec<String>,
    function_sets: Vec<String>,
    static_initializers: u32,
}

#[derive(Serialize)]
struct EntrySummary {
    code_offset: u32,
    method_header_size: u16,
    exception_entry_size: u16,
    debug_frame_size: u16,
}

impl Summary {
    fn new(path: &Path, image: &Image) -> Self {
        Self {
            file: path.display().to_string(),
            version: image.header.version,
            timestamp: image.header.timestamp_text(),
            entry_point: image.entry_point.map(|entry| EntrySummary {
                code_offset: entry.code_offset,
                method_header_size: entry.method_header_size,
                exception_entry_size: entry.exception_entry_size,
                debug_frame_size: entry.debug_frame_size,
            }),
            blocks: image.blocks.len(),
            pools: image.pools.len(),
            pages: image.pools.iter().map(|pool| pool.loaded_pages()).sum(),
            objects: image.objects.len(),
            transient_objects: image
                .objects
                .iter()
                .filter(|obj| obj.transient)
                .count(),
            metaclasses: image.metaclasses.iter().map(|m| m.name.clone()).collect(),
            function_sets: image.function_sets.iter().map(|f| f.name.clone()).collect(),
            static_initializers: image
                .static_initializers
                .as_ref()
                .map_or(0, |inits| inits.count),
        }
    }
}

pub fn execute(file: &Path, options: LoadOptions, json: bool) -> anyhow::Result<()> {
    let image = super::load(file, options)?;
    let summary = Summary::new(file, &image);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("File:         {}", summary.file);
    println!("Version:      {}", summary.version);
    println!("Timestamp:    {}", summary.timestamp);
    match &summary.entry_point {
        Some(entry) => println!(
            "Entry point:  {:#010x} (method header {} bytes, debug frame {} bytes)",
            entry.code_offset, entry.method_header_size, entry.debug_frame_size
        ),
        None => println!("Entry point:  (none)"),
    }
    println!("Blocks:       {}", summary.blocks);
    println!("Pools:        {} ({} pages)", summary.pools, summary.pages);
    println!(
        "Objects:      {} ({} transient)",
        summary.objects, summary.transient_objects
    );
    println!("Initializers: {}", summary.static_initializers);

    if !summary.metaclasses.is_empty() {
        println!();
        println!("Metaclasses:");
        for name in &summary.metaclasses {
            println!("  {}", name);
        }
    }
    if !summary.function_sets.is_empty() {
        println!();
        println!("Function sets:");
        for name in &summary.function_sets {
            println!("  {}", name);
        }
    }
    Ok(())
}
