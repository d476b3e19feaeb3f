//! Page and menu item representations

use crate::types::{DerivedId, SourceId, StructureId};
use serde::{Deserialize, Deserializer, Serialize};

/// Publication status of a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PageStatus {
    Draft,
    Published,
    /// Any status the sync does not act on (pending, private, trash, ...)
    Other,
}

impl PageStatus {
    pub fn is_published(self) -> bool {
        self == PageStatus::Published
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageStatus::Draft => "draft",
            PageStatus::Published => "published",
            PageStatus::Other => "other",
        }
    }
}

impl From<String> for PageStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "draft" => PageStatus::Draft,
            "published" | "publish" => PageStatus::Published,
            _ => PageStatus::Other,
        }
    }
}

impl From<PageStatus> for String {
    fn from(value: PageStatus) -> Self {
        value.as_str().to_string()
    }
}

/// A page in the source tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceNode {
    pub id: SourceId,
    pub title: String,
    /// Parent page; `None` for a root page. A serialized `0` also means root.
    #[serde(default, alias = "parent", deserialize_with = "deserialize_parent")]
    pub parent_id: Option<SourceId>,
    #[serde(default, alias = "menu_order")]
    pub order_key: i64,
    pub status: PageStatus,
}

impl SourceNode {
    /// Create a published page
    pub fn published(
        id: SourceId,
        title: impl Into<String>,
        parent_id: Option<SourceId>,
        order_key: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            parent_id,
            order_key,
            status: PageStatus::Published,
        }
    }

    pub fn with_status(mut self, status: PageStatus) -> Self {
        self.status = status;
        self
    }
}

fn deserialize_parent<'de, D>(deserializer: D) -> Result<Option<SourceId>, D::Error>
where
    D: Deserializer<'de>,
{
    let parent = Option::<SourceId>::deserialize(deserializer)?;
    Ok(parent.filter(|id| *id != 0))
}

/// Kind of object a menu item links to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Page,
}

/// Status of a menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    Published,
}

/// Fields written on every menu item upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFields {
    pub title: String,
    pub object_ref: SourceId,
    pub position: i64,
    pub object_kind: ObjectKind,
}

impl ItemFields {
    pub fn for_page(node: &SourceNode) -> Self {
        Self {
            title: node.title.clone(),
            object_ref: node.id,
            position: node.order_key,
            object_kind: ObjectKind::Page,
        }
    }
}

/// A menu item in the derived tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedNode {
    pub id: DerivedId,
    pub structure_id: StructureId,
    pub title: String,
    pub object_ref: SourceId,
    pub parent_id: Option<DerivedId>,
    pub position: i64,
    pub object_kind: ObjectKind,
    pub item_status: ItemStatus,
}

impl DerivedNode {
    /// Build a fresh, unparented item from upsert fields
    pub fn new(id: DerivedId, structure_id: StructureId, fields: &ItemFields) -> Self {
        Self {
            id,
            structure_id,
            title: fields.title.clone(),
            object_ref: fields.object_ref,
            parent_id: None,
            position: fields.position,
            object_kind: fields.object_kind,
            item_status: ItemStatus::Published,
        }
    }

    /// Overwrite the upsert fields, keeping id, menu and parent linkage
    pub fn apply(&mut self, fields: &ItemFields) {
        self.title = fields.title.clone();
        self.object_ref = fields.object_ref;
        self.position = fields.position;
        self.object_kind = fields.object_kind;
    }
}
