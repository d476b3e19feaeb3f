//! Sled-backed persistence for menus and key-value state.

use crate::error::StorageError;
use crate::store::{MenuStore, StateStore};
use crate::tree::{DerivedNode, ItemFields};
use crate::types::{DerivedId, StructureId};
use std::path::Path;

const MENUS_TREE: &str = "menus";
const ITEMS_TREE: &str = "menu_items";
const STATE_TREE: &str = "state";

/// Open (or create) the sled database at `path`.
pub fn open_db(path: &Path) -> Result<sled::Db, StorageError> {
    std::fs::create_dir_all(path)?;
    Ok(sled::open(path)?)
}

/// Menu store persisted in two sled trees: menu name -> id, and item id -> item.
///
/// Items are bincode-encoded and keyed by big-endian id so iteration follows
/// creation order.
pub struct SledMenuStore {
    db: sled::Db,
    menus: sled::Tree,
    items: sled::Tree,
}

impl SledMenuStore {
    pub fn from_db(db: sled::Db) -> Result<Self, StorageError> {
        let menus = db.open_tree(MENUS_TREE)?;
        let items = db.open_tree(ITEMS_TREE)?;
        Ok(Self { db, menus, items })
    }

    /// Ids start at 1 so they never collide with hosts that treat 0 as "none".
    fn next_id(&self) -> Result<u64, StorageError> {
        Ok(self.db.generate_id()? + 1)
    }

    fn put_item(&self, item: &DerivedNode) -> Result<(), StorageError> {
        let encoded = bincode::serialize(item)?;
        self.items.insert(item.id.to_be_bytes(), encoded)?;
        Ok(())
    }

    fn load_item(&self, item_id: DerivedId) -> Result<DerivedNode, StorageError> {
        self.item(item_id)?.ok_or_else(|| {
            StorageError::InvalidState(format!("Menu item {} does not exist", item_id))
        })
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }
}

fn decode_id(bytes: &[u8]) -> Result<u64, StorageError> {
    let raw: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StorageError::Codec(format!("Expected 8-byte id, got {}", bytes.len())))?;
    Ok(u64::from_be_bytes(raw))
}

impl MenuStore for SledMenuStore {
    fn exists(&self, name: &str) -> Result<Option<StructureId>, StorageError> {
        self.menus
            .get(name.as_bytes())?
            .map(|raw| decode_id(&raw))
            .transpose()
    }

    fn create(&self, name: &str) -> Result<StructureId, StorageError> {
        if let Some(id) = self.exists(name)? {
            return Ok(id);
        }
        let id = self.next_id()?;
        self.menus.insert(name.as_bytes(), id.to_be_bytes().to_vec())?;
        tracing::debug!(menu = name, structure_id = id, "Created menu");
        Ok(id)
    }

    fn upsert_item(
        &self,
        structure_id: StructureId,
        item_id: Option<DerivedId>,
        fields: &ItemFields,
    ) -> Result<DerivedId, StorageError> {
        let item = match item_id {
            Some(id) => {
                let mut item = self.load_item(id)?;
                item.apply(fields);
                item
            }
            None => DerivedNode::new(self.next_id()?, structure_id, fields),
        };
        self.put_item(&item)?;
        Ok(item.id)
    }

    fn set_parent(
        &self,
        item_id: DerivedId,
        parent: Option<DerivedId>,
    ) -> Result<(), StorageError> {
        let mut item = self.load_item(item_id)?;
        item.parent_id = parent;
        self.put_item(&item)
    }

    fn item(&self, item_id: DerivedId) -> Result<Option<DerivedNode>, StorageError> {
        match self.items.get(item_id.to_be_bytes())? {
            Some(raw) => Ok(Some(bincode::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    fn items(&self, structure_id: StructureId) -> Result<Vec<DerivedNode>, StorageError> {
        let mut items = Vec::new();
        for entry in self.items.iter() {
            let (_, raw) = entry?;
            let item: DerivedNode = bincode::deserialize(&raw)?;
            if item.structure_id == structure_id {
                items.push(item);
            }
        }
        Ok(items)
    }
}

/// Key-value state persisted in a sled tree
pub struct SledStateStore {
    tree: sled::Tree,
}

impl SledStateStore {
    pub fn from_db(db: &sled::Db) -> Result<Self, StorageError> {
        Ok(Self {
            tree: db.open_tree(STATE_TREE)?,
        })
    }
}

impl StateStore for SledStateStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.tree.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.tree.insert(key.as_bytes(), value)?;
        Ok(())
    }
}
