//! Constant pools (CPDF and CPPG blocks)
//!
//! A pool is a paged, byte-addressable store for compiled code or constant
//! data. CPDF declares a pool's geometry; each CPPG block then supplies one
//! page. Page payloads are kept exactly as stored, still XOR-masked.

use crate::cursor::ByteCursor;
use crate::error::LoadError;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

/// One page of a constant pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolPage {
    /// XOR key applied to every payload byte
    pub xor_mask: u8,
    /// Page size inherited from the pool
    pub page_size: u32,
    /// Masked payload
    pub data: Vec<u8>,
}

impl PoolPage {
    /// Payload with the XOR mask undone
    pub fn unmasked(&self) -> Vec<u8> {
        self.data.iter().map(|b| b ^ self.xor_mask).collect()
    }
}

/// A constant pool and whichever of its pages have been loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantPool {
    /// 0-based pool id
    pub id: u16,
    /// Number of page slots
    pub page_count: u32,
    /// Nominal size of each page
    pub page_size: u32,
    pages: BTreeMap<u32, PoolPage>,
}

impl ConstantPool {
    /// Create a pool with every page slot unset
    pub fn new(id: u16, page_count: u32, page_size: u32) -> Self {
        Self {
            id,
            page_count,
            page_size,
            pages: BTreeMap::new(),
        }
    }

    /// Get a loaded page
    pub fn page(&self, index: u32) -> Option<&PoolPage> {
        self.pages.get(&index)
    }

    /// Loaded pages in index order
    pub fn pages(&self) -> impl Iterator<Item = (u32, &PoolPage)> + '_ {
        self.pages.iter().map(|(&index, page)| (index, page))
    }

    /// Number of page slots still unset
    pub fn missing_pages(&self) -> u64 {
        u64::from(self.page_count) - self.pages.len() as u64
    }

    /// Number of pages supplied so far
    pub fn loaded_pages(&self) -> usize {
        self.pages.len()
    }

    /// True once every slot holds a page
    pub fn is_complete(&self) -> bool {
        self.pages.len() as u64 == u64::from(self.page_count)
    }
}

/// All constant pools of an image, keyed by 0-based id
#[derive(Debug, Clone, Default)]
pub struct PoolTable {
    pools: BTreeMap<u16, ConstantPool>,
}

impl PoolTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a pool by 0-based id
    pub fn get(&self, id: u16) -> Option<&ConstantPool> {
        self.pools.get(&id)
    }

    /// Get a page by pool id and page index
    pub fn page(&self, id: u16, index: u32) -> Option<&PoolPage> {
        self.get(id).and_then(|pool| pool.page(index))
    }

    /// Pools in id order
    pub fn iter(&self) -> impl Iterator<Item = &ConstantPool> {
        self.pools.values()
    }

    /// Number of defined pools
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// True when no pool has been defined
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Decode a CPDF payload and define the pool
    ///
    /// The pool id is stored 1-based. Trailing payload bytes are reserved
    /// and left unread.
    pub fn load_definition(&mut self, cursor: &mut ByteCursor<'_>) -> Result<u16, LoadError> {
        let offset = cursor.position();
        let id = cursor
            .read_u16()?
            .checked_sub(1)
            .ok_or(LoadError::InvalidPoolId { offset })?;
        let page_count = cursor.read_u32()?;
        let page_size = cursor.read_u32()?;

        debug!(pool = id, page_count, page_size, "defined constant pool");
        if self
            .pools
            .insert(id, ConstantPool::new(id, page_count, page_size))
            .is_some()
        {
            warn!(pool = id, "constant pool redefined; earlier pages discarded");
        }
        Ok(id)
    }

    /// Decode a CPPG payload and store the page
    ///
    /// Everything after the 7-byte page header is the page payload.
    pub fn load_page(
        &mut self,
        cursor: &mut ByteCursor<'_>,
        one_based_ids: bool,
    ) -> Result<(), LoadError> {
        let offset = cursor.position();
        let raw_id = cursor.read_u16()?;
        let id = if one_based_ids {
            raw_id
                .checked_sub(1)
                .ok_or(LoadError::InvalidPoolId { offset })?
        } else {
            raw_id
        };
        let index = cursor.read_u32()?;
        let xor_mask = cursor.read_u8()?;

        let pool = self
            .pools
            .get_mut(&id)
            .ok_or(LoadError::UndefinedPool { pool: id, offset })?;
        if index >= pool.page_count {
            return Err(LoadError::PageOutOfRange {
                pool: id,
                index,
                page_count: pool.page_count,
            });
        }

        let data = cursor.read_rest().to_vec();
        trace!(pool = id, page = index, len = data.len(), xor_mask, "loaded pool page");
        let page = PoolPage {
            xor_mask,
            page_size: pool.page_size,
            data,
        };
        if pool.pages.insert(index, page).is_some() {
            debug!(pool = id, page = index, "replaced pool page");
        }
        Ok(())
    }
}
