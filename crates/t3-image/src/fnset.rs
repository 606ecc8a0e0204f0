//! Function set dependencies (FNSD blocks)

use crate::cursor::ByteCursor;
use crate::error::LoadError;
use crate::metaclass::split_version;
use rustc_hash::FxHashSet;
use tracing::debug;

/// A native built-in function set the program requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSetDep {
    /// Full name as stored, e.g. `t3vm/010006`
    pub name: String,
}

impl FunctionSetDep {
    /// Name without the version suffix
    pub fn base_name(&self) -> &str {
        split_version(&self.name).0
    }

    /// Version suffix, if the name carries one
    pub fn version(&self) -> Option<&str> {
        split_version(&self.name).1
    }
}

/// Required function sets, in the order first listed
#[derive(Debug, Clone, Default)]
pub struct FunctionSetTable {
    sets: Vec<FunctionSetDep>,
    seen: FxHashSet<String>,
}

impl FunctionSetTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a dependency; returns false if it was already present
    pub fn insert(&mut self, name: String) -> bool {
        if !self.seen.insert(name.clone()) {
            return false;
        }
        self.sets.push(FunctionSetDep { name });
        true
    }

    /// Whether a function set (full stored name) is required
    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    /// Required sets in file order
    pub fn iter(&self) -> impl Iterator<Item = &FunctionSetDep> {
        self.sets.iter()
    }

    /// Number of distinct sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// True when nothing is required
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Decode an FNSD payload, returning the number of entries read
    pub fn load_block(&mut self, cursor: &mut ByteCursor<'_>) -> Result<usize, LoadError> {
        let count = cursor.read_u16()? as usize;
        for _ in 0..count {
            let name = cursor.read_name()?;
            debug!(name = %name, "function set dependency");
            self.insert(name);
        }
        Ok(count)
    }
}
