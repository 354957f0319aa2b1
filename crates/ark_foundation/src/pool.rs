//! Ordered, deduplicated, index-stable pools.
//!
//! Instructions refer to symbols and constants only by their pool index, so
//! an index, once handed out, must keep naming the same entry for the rest of
//! the compilation. Pools only grow.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{CompileLimit, Error, Result};

/// A deduplicating pool that assigns stable 16-bit indices in insertion order.
#[derive(Clone, Debug)]
pub struct Pool<T> {
    /// Human-readable pool name for error messages.
    name: &'static str,
    /// Entries in index order.
    entries: Vec<T>,
    /// Map from entry to its index.
    index: HashMap<T, u16>,
}

impl<T: Clone + Eq + Hash> Pool<T> {
    /// Maximum number of entries; the table count is a 16-bit field.
    pub const MAX_ENTRIES: usize = u16::MAX as usize;

    /// Creates an empty pool with a name used in error messages.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Interns a value, returning its stable index.
    ///
    /// Returns the existing index if an equal entry is already present.
    ///
    /// # Errors
    ///
    /// Returns `LimitExceeded(PoolFull)` if a new entry would not fit in the
    /// 16-bit index space.
    pub fn intern(&mut self, value: T) -> Result<u16> {
        if let Some(&idx) = self.index.get(&value) {
            return Ok(idx);
        }

        let idx = u16::try_from(self.entries.len())
            .ok()
            .filter(|&i| usize::from(i) < Self::MAX_ENTRIES)
            .ok_or_else(|| {
                Error::limit_exceeded(CompileLimit::PoolFull {
                    pool: self.name,
                    limit: Self::MAX_ENTRIES,
                })
            })?;
        self.entries.push(value.clone());
        self.index.insert(value, idx);
        Ok(idx)
    }

    /// Returns the index of a value if it has been interned.
    #[must_use]
    pub fn index_of(&self, value: &T) -> Option<u16> {
        self.index.get(value).copied()
    }

    /// Gets an entry by index.
    #[must_use]
    pub fn get(&self, idx: u16) -> Option<&T> {
        self.entries.get(usize::from(idx))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Returns the entries as a slice in index order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.entries
    }

    /// Returns the pool name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}
