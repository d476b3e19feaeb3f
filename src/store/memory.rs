//! In-memory store adapters
//!
//! Used by tests and by the CLI, which loads its page tree from a JSON export.

use crate::error::{ApiError, StorageError};
use crate::store::{MenuStore, PageSource, StateStore};
use crate::tree::{DerivedNode, ItemFields, PageStatus, SourceNode};
use crate::types::{DerivedId, SourceId, StructureId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Listing order for published pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrder {
    /// Order in which the pages were supplied
    Insertion,
    /// Depth-first from the roots, siblings by title
    #[default]
    Hierarchical,
}

/// Page store backed by a vector
pub struct MemoryPageSource {
    pages: RwLock<Vec<SourceNode>>,
    order: PageOrder,
}

impl MemoryPageSource {
    pub fn new(pages: Vec<SourceNode>, order: PageOrder) -> Self {
        Self {
            pages: RwLock::new(pages),
            order,
        }
    }

    /// Load pages from a JSON array of page objects
    pub fn from_json_file(path: &Path, order: PageOrder) -> Result<Self, ApiError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::InvalidPages(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let pages: Vec<SourceNode> = serde_json::from_str(&content).map_err(|e| {
            ApiError::InvalidPages(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(Self::new(pages, order))
    }

    /// Look up a page regardless of status
    pub fn page(&self, id: SourceId) -> Option<SourceNode> {
        self.pages.read().iter().find(|p| p.id == id).cloned()
    }

    /// Replace a page by id, or append it
    pub fn upsert(&self, page: SourceNode) {
        let mut pages = self.pages.write();
        match pages.iter_mut().find(|p| p.id == page.id) {
            Some(existing) => *existing = page,
            None => pages.push(page),
        }
    }
}

impl PageSource for MemoryPageSource {
    fn list_published(&self) -> Result<Vec<SourceNode>, StorageError> {
        let published: Vec<SourceNode> = self
            .pages
            .read()
            .iter()
            .filter(|p| p.status.is_published())
            .cloned()
            .collect();
        Ok(match self.order {
            PageOrder::Insertion => published,
            PageOrder::Hierarchical => hierarchical_order(published),
        })
    }

    fn status(&self, id: SourceId) -> Result<Option<PageStatus>, StorageError> {
        Ok(self.pages.read().iter().find(|p| p.id == id).map(|p| p.status))
    }
}

/// Arrange pages so every parent is listed before its children.
///
/// Siblings are sorted by title, then id; the order key only sets the menu
/// item position. Pages whose parent is not in the set are treated as roots.
/// Pages caught in a parent cycle are appended afterwards in their original
/// order.
pub fn hierarchical_order(pages: Vec<SourceNode>) -> Vec<SourceNode> {
    let ids: HashSet<SourceId> = pages.iter().map(|p| p.id).collect();
    let mut children: HashMap<Option<SourceId>, Vec<usize>> = HashMap::new();
    for (idx, page) in pages.iter().enumerate() {
        let parent = page.parent_id.filter(|pid| ids.contains(pid));
        children.entry(parent).or_default().push(idx);
    }
    for siblings in children.values_mut() {
        siblings.sort_by(|a, b| {
            let (a, b) = (&pages[*a], &pages[*b]);
            a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id))
        });
    }

    let mut ordered = Vec::with_capacity(pages.len());
    let mut visited = vec![false; pages.len()];
    let mut stack: Vec<usize> = children.get(&None).cloned().unwrap_or_default();
    stack.reverse();
    while let Some(idx) = stack.pop() {
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        ordered.push(idx);
        if let Some(kids) = children.get(&Some(pages[idx].id)) {
            stack.extend(kids.iter().rev().copied());
        }
    }
    ordered.extend((0..pages.len()).filter(|idx| !visited[*idx]));

    let mut slots: Vec<Option<SourceNode>> = pages.into_iter().map(Some).collect();
    ordered
        .into_iter()
        .filter_map(|idx| slots[idx].take())
        .collect()
}

#[derive(Default)]
struct MenuState {
    menus: BTreeMap<String, StructureId>,
    items: BTreeMap<DerivedId, DerivedNode>,
    last_id: u64,
}

impl MenuState {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }
}

/// Menu store held entirely in memory
#[derive(Default)]
pub struct MemoryMenuStore {
    state: RwLock<MenuState>,
}

impl MemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of items across all menus
    pub fn item_count(&self) -> usize {
        self.state.read().items.len()
    }
}

impl MenuStore for MemoryMenuStore {
    fn exists(&self, name: &str) -> Result<Option<StructureId>, StorageError> {
        Ok(self.state.read().menus.get(name).copied())
    }

    fn create(&self, name: &str) -> Result<StructureId, StorageError> {
        let mut state = self.state.write();
        if let Some(id) = state.menus.get(name) {
            return Ok(*id);
        }
        let id = state.next_id();
        state.menus.insert(name.to_string(), id);
        Ok(id)
    }

    fn upsert_item(
        &self,
        structure_id: StructureId,
        item_id: Option<DerivedId>,
        fields: &ItemFields,
    ) -> Result<DerivedId, StorageError> {
        let mut state = self.state.write();
        match item_id {
            Some(id) => {
                let item = state.items.get_mut(&id).ok_or_else(|| {
                    StorageError::InvalidState(format!("Menu item {} does not exist", id))
                })?;
                item.apply(fields);
                Ok(id)
            }
            None => {
                let id = state.next_id();
                state
                    .items
                    .insert(id, DerivedNode::new(id, structure_id, fields));
                Ok(id)
            }
        }
    }

    fn set_parent(
        &self,
        item_id: DerivedId,
        parent: Option<DerivedId>,
    ) -> Result<(), StorageError> {
        let mut state = self.state.write();
        let item = state.items.get_mut(&item_id).ok_or_else(|| {
            StorageError::InvalidState(format!("Menu item {} does not exist", item_id))
        })?;
        item.parent_id = parent;
        Ok(())
    }

    fn item(&self, item_id: DerivedId) -> Result<Option<DerivedNode>, StorageError> {
        Ok(self.state.read().items.get(&item_id).cloned())
    }

    fn items(&self, structure_id: StructureId) -> Result<Vec<DerivedNode>, StorageError> {
        Ok(self
            .state
            .read()
            .items
            .values()
            .filter(|item| item.structure_id == structure_id)
            .cloned()
            .collect())
    }
}

/// Key-value state held in memory
#[derive(Default)]
pub struct MemoryStateStore {
    values: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.values.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
