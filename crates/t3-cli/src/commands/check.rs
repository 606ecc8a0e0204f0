//! `t3dump check` — Load images and report success or failure.

use std::path::PathBuf;
use t3_image::LoadOptions;

pub fn execute(files: &[PathBuf], options: LoadOptions) -> anyhow::Result<()> {
    let mut failures = 0;
    for file in files {
        match super::load(file, options.clone()) {
            Ok(image) => println!(
                "ok    {} ({} blocks, {} objects)",
                file.display(),
                image.blocks.len(),
                image.objects.len()
            ),
            Err(err) => {
                failures += 1;
                println!("FAIL  {}: {:#}", file.display(), err);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} images failed to load", failures, files.len());
    }
    Ok(())
}
