//! `t3dump objects` — List static objects.

use std::path::Path;
use t3_image::LoadOptions;

pub fn execute(file: &Path, options: LoadOptions, metaclass: Option<u16>) -> anyhow::Result<()> {
    let image = super::load(file, options)?;
    let objects = match metaclass {
        Some(index) => image.objects.by_metaclass(index),
        None => image.objects.sorted(),
    };

    println!("{:>10}  {:<28}  {:>8}  Flags", "Id", "Metaclass", "Bytes");
    for obj in &objects {
        let metaclass_name = image
            .metaclass_of(obj)
            .map_or_else(|| format!("#{}", obj.metaclass_index), |m| m.base_name().to_string());
        println!(
            "{:>10}  {:<28}  {:>8}  {}",
            obj.id,
            metaclass_name,
            obj.data.len(),
            if obj.transient { "transient" } else { "" }
        );
    }
    println!();
    println!("{} objects", objects.len());
    Ok(())
}
