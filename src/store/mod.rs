//! Store interfaces
//!
//! The sync core talks to three external collaborators: the page store it
//! reads from, the menu store it writes to, and a durable key-value store
//! holding the menu id and the serialized identity map.

pub mod memory;
pub mod persistence;

use crate::error::StorageError;
use crate::tree::{DerivedNode, ItemFields, PageStatus, SourceNode};
use crate::types::{DerivedId, SourceId, StructureId};

/// Read access to the page tree
pub trait PageSource: Send + Sync {
    /// All published pages, in the store's listing order
    fn list_published(&self) -> Result<Vec<SourceNode>, StorageError>;

    /// Current status of a page, `None` if the store does not know it
    fn status(&self, id: SourceId) -> Result<Option<PageStatus>, StorageError>;
}

/// Read/write access to menus and their items
pub trait MenuStore: Send + Sync {
    /// Id of the menu with this name, if one exists
    fn exists(&self, name: &str) -> Result<Option<StructureId>, StorageError>;

    fn create(&self, name: &str) -> Result<StructureId, StorageError>;

    /// Create an item (`item_id == None`) or overwrite an existing one's fields
    fn upsert_item(
        &self,
        structure_id: StructureId,
        item_id: Option<DerivedId>,
        fields: &ItemFields,
    ) -> Result<DerivedId, StorageError>;

    fn set_parent(&self, item_id: DerivedId, parent: Option<DerivedId>)
        -> Result<(), StorageError>;

    fn item(&self, item_id: DerivedId) -> Result<Option<DerivedNode>, StorageError>;

    /// All items of a menu, ordered by item id
    fn items(&self, structure_id: StructureId) -> Result<Vec<DerivedNode>, StorageError>;
}

/// Durable key-value state
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
}
