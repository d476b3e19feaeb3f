//! Tree Sync Engine
//!
//! Mirrors the published page tree into a menu. A full sync walks every
//! published page; an incremental sync handles the single page named by a
//! lifecycle event. Both take the identity map as explicit input and hand the
//! updated map back to the caller, which owns persisting it.
//!
//! Pages are processed in the order given. A child listed before its parent
//! cannot resolve the parent's menu item and is left unparented; the engine
//! does not reorder or retry. Unpublished or deleted pages are never removed
//! from the menu or the map.

use crate::error::StorageError;
use crate::identity::IdentityMap;
use crate::store::MenuStore;
use crate::tree::{ItemFields, SourceNode};
use crate::types::{DerivedId, SourceId, StructureId};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why an incremental sync did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The page is not published
    NotPublished,
    /// No menu id was loaded; bootstrap has not run
    MissingStructure,
    /// No identity map was loaded; bootstrap has not run or the map is unreadable
    MissingIdentityMap,
    /// The page is mapped to a menu item the store no longer has
    MissingItem(DerivedId),
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotPublished => "not_published",
            SkipReason::MissingStructure => "missing_structure",
            SkipReason::MissingIdentityMap => "missing_identity_map",
            SkipReason::MissingItem(_) => "missing_item",
        }
    }
}

/// Result of syncing a single page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A new menu item was created and linked
    Created {
        item_id: DerivedId,
        parent: Option<DerivedId>,
    },
    /// An existing menu item had its parent and position rewritten
    Relinked {
        item_id: DerivedId,
        parent: Option<DerivedId>,
    },
    Skipped(SkipReason),
}

/// Identity map and outcome returned by [`TreeSyncEngine::incremental_sync`]
#[derive(Debug, Clone)]
pub struct IncrementalSync {
    /// The map passed in, with any new association merged
    pub identity_map: Option<IdentityMap>,
    pub outcome: SyncOutcome,
}

impl IncrementalSync {
    /// Whether the identity map gained an entry and needs persisting
    pub fn changed(&self) -> bool {
        matches!(self.outcome, SyncOutcome::Created { .. })
    }

    fn skipped(identity_map: Option<IdentityMap>, reason: SkipReason) -> Self {
        Self {
            identity_map,
            outcome: SyncOutcome::Skipped(reason),
        }
    }
}

/// Summary of a full sync
#[derive(Debug, Clone, Default)]
pub struct FullSyncReport {
    pub identity_map: IdentityMap,
    /// Menu items created
    pub created: usize,
    /// Existing menu items rewritten in place
    pub updated: usize,
    /// Unpublished pages ignored
    pub skipped: usize,
    /// Pages whose parent had no menu item when they were processed
    pub unresolved_parents: Vec<SourceId>,
    /// Pages mapped to a menu item the store no longer has; left untouched
    pub missing_items: Vec<SourceId>,
}

/// Synchronizes pages into a menu store
pub struct TreeSyncEngine {
    menus: Arc<dyn MenuStore>,
}

impl TreeSyncEngine {
    pub fn new(menus: Arc<dyn MenuStore>) -> Self {
        Self { menus }
    }

    /// Ensure every published page in `nodes` has a linked menu item.
    ///
    /// Already-mapped pages have their item's fields rewritten in place, so
    /// re-running never duplicates items. A page mapped to an item the store
    /// no longer has is skipped and reported. Parent linkage is rewritten for
    /// every other page on every run.
    pub fn full_sync(
        &self,
        nodes: &[SourceNode],
        structure_id: StructureId,
        identity_map: IdentityMap,
    ) -> Result<FullSyncReport, StorageError> {
        let mut report = FullSyncReport {
            identity_map,
            ..FullSyncReport::default()
        };

        for node in nodes {
            if !node.status.is_published() {
                debug!(page_id = node.id, status = node.status.as_str(), "Skipping unpublished page");
                report.skipped += 1;
                continue;
            }

            let fields = ItemFields::for_page(node);
            let item_id = match report.identity_map.lookup(node.id) {
                Some(existing) => {
                    if self.menus.item(existing)?.is_none() {
                        warn!(page_id = node.id, item_id = existing, "Mapped menu item is missing");
                        report.missing_items.push(node.id);
                        continue;
                    }
                    self.menus
                        .upsert_item(structure_id, Some(existing), &fields)?;
                    report.updated += 1;
                    existing
                }
                None => {
                    let created = self.menus.upsert_item(structure_id, None, &fields)?;
                    report.identity_map.insert(node.id, created);
                    report.created += 1;
                    created
                }
            };

            let (mut parent, mut resolved) = resolve_parent(node, &report.identity_map);
            // a parent mapped to a vanished item cannot be linked to
            if node
                .parent_id
                .is_some_and(|p| report.missing_items.contains(&p))
            {
                parent = None;
                resolved = false;
            }
            if !resolved {
                report.unresolved_parents.push(node.id);
            }
            self.menus.set_parent(item_id, parent)?;
        }

        info!(
            structure_id,
            created = report.created,
            updated = report.updated,
            skipped = report.skipped,
            unresolved = report.unresolved_parents.len(),
            missing = report.missing_items.len(),
            "Full sync complete"
        );
        Ok(report)
    }

    /// Sync a single page after a lifecycle event.
    ///
    /// Does nothing unless the page is published and both the menu id and the
    /// identity map were loaded. A mapped page gets its parent linkage and
    /// position rewritten; its title is left to the menu store's own update
    /// path. An unmapped page gets a new item, created and linked as in
    /// [`full_sync`](Self::full_sync).
    pub fn incremental_sync(
        &self,
        node: &SourceNode,
        structure_id: Option<StructureId>,
        identity_map: Option<IdentityMap>,
    ) -> Result<IncrementalSync, StorageError> {
        if !node.status.is_published() {
            debug!(page_id = node.id, status = node.status.as_str(), "Page not published");
            return Ok(IncrementalSync::skipped(
                identity_map,
                SkipReason::NotPublished,
            ));
        }
        let Some(structure_id) = structure_id else {
            debug!(page_id = node.id, "No menu loaded, skipping sync");
            return Ok(IncrementalSync::skipped(
                identity_map,
                SkipReason::MissingStructure,
            ));
        };
        let Some(mut map) = identity_map else {
            debug!(page_id = node.id, "No identity map loaded, skipping sync");
            return Ok(IncrementalSync::skipped(None, SkipReason::MissingIdentityMap));
        };

        let outcome = match map.lookup(node.id) {
            Some(item_id) => {
                let Some(item) = self.menus.item(item_id)? else {
                    warn!(page_id = node.id, item_id, "Mapped menu item is missing");
                    return Ok(IncrementalSync::skipped(
                        Some(map),
                        SkipReason::MissingItem(item_id),
                    ));
                };
                let fields = ItemFields {
                    title: item.title,
                    position: node.order_key,
                    ..ItemFields::for_page(node)
                };
                self.menus
                    .upsert_item(structure_id, Some(item_id), &fields)?;
                let (parent, _) = resolve_parent(node, &map);
                self.menus.set_parent(item_id, parent)?;
                info!(page_id = node.id, item_id, ?parent, "Relinked menu item");
                SyncOutcome::Relinked { item_id, parent }
            }
            None => {
                let item_id =
                    self.menus
                        .upsert_item(structure_id, None, &ItemFields::for_page(node))?;
                map.insert(node.id, item_id);
                let (parent, _) = resolve_parent(node, &map);
                self.menus.set_parent(item_id, parent)?;
                info!(page_id = node.id, item_id, ?parent, "Created menu item");
                SyncOutcome::Created { item_id, parent }
            }
        };

        Ok(IncrementalSync {
            identity_map: Some(map),
            outcome,
        })
    }
}

/// Resolve a page's parent to a menu item.
///
/// Returns the linkage to write and whether a requested parent was found.
/// Root pages resolve to `None`.
fn resolve_parent(node: &SourceNode, map: &IdentityMap) -> (Option<DerivedId>, bool) {
    let Some(parent_page) = node.parent_id else {
        return (None, true);
    };
    // a page cannot parent itself
    if parent_page == node.id {
        warn!(page_id = node.id, "Page lists itself as parent");
        return (None, false);
    }
    match map.lookup(parent_page) {
        Some(parent_item) => (Some(parent_item), true),
        None => {
            warn!(
                page_id = node.id,
                parent_page, "Parent page has no menu item yet, leaving item unparented"
            );
            (None, false)
        }
    }
}
