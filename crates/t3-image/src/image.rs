//! The loaded image

use crate::block::BlockSummary;
use crate::entry::EntryPoint;
use crate::fnset::FunctionSetTable;
use crate::header::ImageHeader;
use crate::metaclass::{MetaclassRecord, MetaclassTable};
use crate::object::{ObjectRecord, ObjectStore};
use crate::pool::PoolTable;
use crate::static_init::StaticInitializers;

/// Everything the loader collected from an image file
#[derive(Debug, Clone)]
pub struct Image {
    /// File header
    pub header: ImageHeader,
    /// Entry point (from the single ENTP block)
    pub entry_point: Option<EntryPoint>,
    /// Constant pools
    pub pools: PoolTable,
    /// Static objects
    pub objects: ObjectStore,
    /// Metaclass dependencies
    pub metaclasses: MetaclassTable,
    /// Function set dependencies
    pub function_sets: FunctionSetTable,
    /// Static initializers
    pub static_initializers: Option<StaticInitializers>,
    /// Every block in file order, including the EOF block
    pub blocks: Vec<BlockSummary>,
}

impl Image {
    /// Create an empty image for a validated header
    pub fn new(header: ImageHeader) -> Self {
        Self {
            header,
            entry_point: None,
            pools: PoolTable::new(),
            objects: ObjectStore::new(),
            metaclasses: MetaclassTable::new(),
            function_sets: FunctionSetTable::new(),
            static_initializers: None,
            blocks: Vec::new(),
        }
    }

    /// Metaclass an object belongs to
    pub fn metaclass_of(&self, object: &ObjectRecord) -> Option<&MetaclassRecord> {
        self.metaclasses.get(usize::from(object.metaclass_index))
    }
}
