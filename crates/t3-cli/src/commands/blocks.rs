//! `t3dump blocks` — List every block in file order.

use std::path::Path;
use t3_image::{BlockOutcome, LoadOptions};

pub fn execute(file: &Path, options: LoadOptions) -> anyhow::Result<()> {
    let image = super::load(file, options)?;

    println!("{:>10}  {:<4}  {:>10}  {:>5}  Outcome", "Offset", "Tag", "Size", "Flags");
    for block in &image.blocks {
        let outcome = match block.outcome {
            BlockOutcome::Loaded => "loaded",
            BlockOutcome::Unsupported => "unsupported",
            BlockOutcome::Skipped => "skipped",
            BlockOutcome::End => "end",
        };
        println!(
            "{:>#10x}  {:<4}  {:>10}  {:>#5x}  {}",
            block.offset, block.tag, block.size, block.flags, outcome
        );
    }
    Ok(())
}
