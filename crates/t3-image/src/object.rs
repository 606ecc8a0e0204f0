//! Static object table (OBJS blocks)

use crate::cursor::ByteCursor;
use crate::error::LoadError;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

/// OBJS block flags
pub mod flags {
    /// Per-object size fields are 32 bits wide instead of 16
    pub const LARGE_OBJECTS: u16 = 1 << 0;
    /// Every object in the block is transient
    pub const TRANSIENT: u16 = 1 << 1;
}

/// A static object as stored in the image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Object id, unique across the image
    pub id: u32,
    /// Index into the metaclass table
    pub metaclass_index: u16,
    /// Excluded from save/restore
    pub transient: bool,
    /// Metaclass-specific payload, uninterpreted
    pub data: Vec<u8>,
}

/// Object id to record map
#[derive(Debug, Clone, Default)]
pub struct ObjectStore {
    objects: FxHashMap<u32, ObjectRecord>,
}

impl ObjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an object by id
    pub fn get(&self, id: u32) -> Option<&ObjectRecord> {
        self.objects.get(&id)
    }

    /// Whether an object id is defined
    pub fn contains(&self, id: u32) -> bool {
        self.objects.contains_key(&id)
    }

    /// Number of objects
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when no object has been loaded
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.objects.values()
    }

    /// Objects in ascending id order
    pub fn sorted(&self) -> Vec<&ObjectRecord> {
        let mut objects: Vec<_> = self.objects.values().collect();
        objects.sort_unstable_by_key(|obj| obj.id);
        objects
    }

    /// Objects of one metaclass, in ascending id order
    pub fn by_metaclass(&self, metaclass_index: u16) -> Vec<&ObjectRecord> {
        let mut objects: Vec<_> = self
            .objects
            .values()
            .filter(|obj| obj.metaclass_index == metaclass_index)
            .collect();
        objects.sort_unstable_by_key(|obj| obj.id);
        objects
    }

    /// Decode an OBJS payload and insert its objects
    ///
    /// Returns the number of objects read. An id that is already present is
    /// overwritten, unless `reject_redefinition` is set.
    pub fn load_block(
        &mut self,
        cursor: &mut ByteCursor<'_>,
        reject_redefinition: bool,
    ) -> Result<usize, LoadError> {
        let count = cursor.read_u16()? as usize;
        let metaclass_index = cursor.read_u16()?;
        let block_flags = cursor.read_u16()?;
        let large = block_flags & flags::LARGE_OBJECTS != 0;
        let transient = block_flags & flags::TRANSIENT != 0;

        for _ in 0..count {
            let offset = cursor.position();
            let id = cursor.read_u32()?;
            let size = if large {
                cursor.read_u32()? as usize
            } else {
                cursor.read_u16()? as usize
            };
            let data = cursor.read_bytes(size)?.to_vec();

            if self.objects.contains_key(&id) {
                if reject_redefinition {
                    return Err(LoadError::DuplicateObject { id, offset });
                }
                warn!(id, offset, "object redefined; keeping the later definition");
            }
            self.objects.insert(
                id,
                ObjectRecord {
                    id,
                    metaclass_index,
                    transient,
                    data,
                },
            );
        }

        debug!(count, metaclass_index, large, transient, "loaded static objects");
        Ok(count)
    }
}
