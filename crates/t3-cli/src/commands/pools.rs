//! `t3dump pools` — List constant pools and their loaded pages.

use std::path::Path;
use t3_image::LoadOptions;

pub fn execute(file: &Path, options: LoadOptions) -> anyhow::Result<()> {
    let image = super::load(file, options)?;

    for pool in image.pools.iter() {
        println!(
            "Pool {}: {} pages of {} bytes ({} loaded, {} missing)",
            pool.id,
            pool.page_count,
            pool.page_size,
            pool.loaded_pages(),
            pool.missing_pages()
        );
        for (index, page) in pool.pages() {
            println!(
                "  page {:>5}: {:>6} bytes, mask {:#04x}",
                index,
                page.data.len(),
                page.xor_mask
            );
        }
    }
    Ok(())
}
