//! Metaclass dependency table (MCLD blocks)
//!
//! The image lists every native metaclass its objects use. Objects refer to
//! a metaclass by its registration index, which is the position at which the
//! metaclass first appeared. Each entry also carries a property table that
//! maps the metaclass's compact property indices to global property ids.

use crate::cursor::ByteCursor;
use crate::error::LoadError;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Split a dependency name of the form `name/version`
pub(crate) fn split_version(name: &str) -> (&str, Option<&str>) {
    match name.split_once('/') {
        Some((base, version)) => (base, Some(version)),
        None => (name, None),
    }
}

/// One metaclass dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaclassRecord {
    /// Registration index
    pub index: usize,
    /// Full name as stored, e.g. `tads-object/030005`
    pub name: String,
    /// Global property ids, indexed by compact property index
    pub property_ids: Vec<u16>,
}

impl MetaclassRecord {
    /// Name without the version suffix
    pub fn base_name(&self) -> &str {
        split_version(&self.name).0
    }

    /// Version suffix, if the name carries one
    pub fn version(&self) -> Option<&str> {
        split_version(&self.name).1
    }

    /// Global property id for a compact property index
    pub fn property_id(&self, compact_index: usize) -> Option<u16> {
        self.property_ids.get(compact_index).copied()
    }
}

/// Metaclasses in registration order
#[derive(Debug, Clone, Default)]
pub struct MetaclassTable {
    records: Vec<MetaclassRecord>,
    by_name: FxHashMap<String, usize>,
}

impl MetaclassTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a metaclass by registration index
    pub fn get(&self, index: usize) -> Option<&MetaclassRecord> {
        self.records.get(index)
    }

    /// Find a metaclass by its full stored name
    pub fn find(&self, name: &str) -> Option<&MetaclassRecord> {
        self.by_name.get(name).map(|&index| &self.records[index])
    }

    /// Number of registered metaclasses
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Metaclasses in registration order
    pub fn iter(&self) -> impl Iterator<Item = &MetaclassRecord> {
        self.records.iter()
    }

    /// Register a metaclass, returning its index
    ///
    /// A name seen before keeps its index and takes the new property table.
    pub fn register(&mut self, name: String, property_ids: Vec<u16>) -> usize {
        if let Some(&index) = self.by_name.get(&name) {
            self.records[index].property_ids = property_ids;
            return index;
        }
        let index = self.records.len();
        self.by_name.insert(name.clone(), index);
        self.records.push(MetaclassRecord {
            index,
            name,
            property_ids,
        });
        index
    }

    /// Decode an MCLD payload, returning the number of entries read
    pub fn load_block(&mut self, cursor: &mut ByteCursor<'_>) -> Result<usize, LoadError> {
        let count = cursor.read_u16()? as usize;
        for _ in 0..count {
            // Record size is advisory; the fields below are self-delimiting.
            let _record_size = cursor.read_u16()?;
            let name = cursor.read_name()?;
            let property_count = cursor.read_u16()? as usize;
            let entry_width = cursor.read_u16()?;
            if entry_width < 2 {
                return Err(LoadError::PropertyEntryTooNarrow {
                    name,
                    width: entry_width,
                });
            }

            let mut property_ids = Vec::with_capacity(property_count);
            for _ in 0..property_count {
                property_ids.push(cursor.read_u16()?);
                cursor.skip(usize::from(entry_width) - 2)?;
            }

            trace!(name = %name, properties = property_count, "metaclass dependency");
            let index = self.register(name, property_ids);
            debug!(index, name = %self.records[index].name, "registered metaclass");
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::PayloadWriter;

    fn entry(w: &mut PayloadWriter, name: &str, width: u16, props: &[u16]) {
        let record_size = 2 + 1 + name.len() + 2 + 2 + usize::from(width) * props.len();
        w.emit_u16(record_size as u16);
        w.emit_name(name);
        w.emit_u16(props.len() as u16);
        w.emit_u16(width);
        for &prop in props {
            w.emit_u16(prop);
            w.emit_bytes(&vec![0; usize::from(width).saturating_sub(2)]);
        }
    }

    #[test]
    fn test_registration_order() {
        let mut w = PayloadWriter::new();
        w.emit_u16(2);
        entry(&mut w, "tads-object/030005", 2, &[10, 11]);
        entry(&mut w, "string/030008", 2, &[]);
        let bytes = w.into_bytes();

        let mut table = MetaclassTable::new();
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(table.load_block(&mut cursor).unwrap(), 2);
        assert!(cursor.is_empty());

        let object = table.get(0).unwrap();
        assert_eq!(object.base_name(), "tads-object");
        assert_eq!(object.version(), Some("030005"));
        assert_eq!(object.property_id(1), Some(11));
        assert_eq!(object.property_id(2), None);
        assert_eq!(table.find("string/030008").unwrap().index, 1);
    }

    #[test]
    fn test_wide_property_entries_skip_padding() {
        let mut w = PayloadWriter::new();
        w.emit_u16(1);
        entry(&mut w, "list", 5, &[0x1234, 0x0042]);
        let bytes = w.into_bytes();

        let mut table = MetaclassTable::new();
        let mut cursor = ByteCursor::new(&bytes);
        table.load_block(&mut cursor).unwrap();
        assert!(cursor.is_empty());
        assert_eq!(table.get(0).unwrap().property_ids, vec![0x1234, 0x0042]);
        assert_eq!(table.get(0).unwrap().version(), None);
    }

    #[test]
    fn test_index_is_first_appearance_across_blocks() {
        let mut table = MetaclassTable::new();

        let mut w = PayloadWriter::new();
        w.emit_u16(2);
        entry(&mut w, "a", 2, &[1]);
        entry(&mut w, "b", 2, &[]);
        table.load_block(&mut ByteCursor::new(&w.into_bytes())).unwrap();

        let mut w = PayloadWriter::new();
        w.emit_u16(2);
        entry(&mut w, "c", 2, &[]);
        entry(&mut w, "a", 2, &[7, 8]);
        table.load_block(&mut ByteCursor::new(&w.into_bytes())).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.find("a").unwrap().index, 0);
        assert_eq!(table.find("a").unwrap().property_ids, vec![7, 8]);
        assert_eq!(table.find("c").unwrap().index, 2);
    }

    #[test]
    fn test_narrow_entry_width() {
        let mut w = PayloadWriter::new();
        w.emit_u16(1);
        w.emit_u16(0);
        w.emit_name("bad");
        w.emit_u16(1);
        w.emit_u16(1);
        w.emit_u8(0);
        let bytes = w.into_bytes();

        let result = MetaclassTable::new().load_block(&mut ByteCursor::new(&bytes));
        assert_eq!(
            result,
            Err(LoadError::PropertyEntryTooNarrow {
                name: "bad".to_string(),
                width: 1,
            })
        );
    }
}
