//! Identity Map
//!
//! Associates each page with the menu item that represents it. Entries are
//! only ever added: the first association recorded for a page wins, and
//! entries for deleted or unpublished pages are left in place.

use crate::error::StorageError;
use crate::types::{DerivedId, SourceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Page -> menu item index
///
/// Persisted as a flat JSON object with string-encoded page ids as keys,
/// e.g. `{"1":10,"2":11}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityMap {
    entries: BTreeMap<SourceId, DerivedId>,
}

impl IdentityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, source_id: SourceId) -> Option<DerivedId> {
        self.entries.get(&source_id).copied()
    }

    /// Page mapped to a menu item
    ///
    /// Scans the map. Should two pages ever share an item, the lowest page id
    /// is returned.
    pub fn reverse_lookup(&self, derived_id: DerivedId) -> Option<SourceId> {
        self.entries
            .iter()
            .find(|(_, d)| **d == derived_id)
            .map(|(s, _)| *s)
    }

    pub fn contains(&self, source_id: SourceId) -> bool {
        self.entries.contains_key(&source_id)
    }

    /// Record an association
    ///
    /// Returns false and leaves the map untouched when the page is already mapped.
    pub fn insert(&mut self, source_id: SourceId, derived_id: DerivedId) -> bool {
        if self.entries.contains_key(&source_id) {
            return false;
        }
        self.entries.insert(source_id, derived_id);
        true
    }

    /// Insert every entry of `other`, keeping existing associations
    ///
    /// Returns the number of entries added.
    pub fn merge(&mut self, other: &IdentityMap) -> usize {
        other
            .iter()
            .filter(|(source_id, derived_id)| self.insert(*source_id, *derived_id))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all associations in ascending page id order
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, DerivedId)> + '_ {
        self.entries.iter().map(|(s, d)| (*s, *d))
    }

    pub fn serialize(&self) -> Result<Vec<u8>, StorageError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, StorageError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl FromIterator<(SourceId, DerivedId)> for IdentityMap {
    fn from_iter<I: IntoIterator<Item = (SourceId, DerivedId)>>(iter: I) -> Self {
        let mut map = IdentityMap::new();
        for (source_id, derived_id) in iter {
            map.insert(source_id, derived_id);
        }
        map
    }
}
