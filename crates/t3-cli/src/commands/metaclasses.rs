//! `t3dump metaclasses` — List metaclass dependencies.

use std::path::Path;
use t3_image::LoadOptions;

pub fn execute(file: &Path, options: LoadOptions) -> anyhow::Result<()> {
    let image = super::load(file, options)?;

    for metaclass in image.metaclasses.iter() {
        let objects = image.objects.by_metaclass(metaclass.index as u16).len();
        println!(
            "{:>3}  {:<24} {:<8} {:>4} properties  {:>6} objects",
            metaclass.index,
            metaclass.base_name(),
            metaclass.version().unwrap_or("-"),
            metaclass.property_ids.len(),
            objects
        );
    }
    Ok(())
}
