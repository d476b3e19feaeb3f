use crate::integration::support::{home_and_about, Harness, MENU};
use menu_sync::store::MenuStore;
use menu_sync::{IdentityMap, PageStatus, SkipReason, SourceNode, SyncOutcome};

fn synced() -> (Harness, u64, IdentityMap) {
    let harness = Harness::new(Vec::new());
    let menu = harness.menus.create(MENU).unwrap();
    let report = harness
        .engine()
        .full_sync(&home_and_about(), menu, IdentityMap::new())
        .unwrap();
    (harness, menu, report.identity_map)
}

#[test]
fn new_grandchild_is_created_under_about() {
    let (harness, menu, map) = synced();
    let b = map.lookup(2).unwrap();

    let contact = SourceNode::published(3, "Team", Some(2), 0);
    let result = harness
        .engine()
        .incremental_sync(&contact, Some(menu), Some(map))
        .unwrap();

    assert!(result.changed());
    let map = result.identity_map.unwrap();
    let c = map.lookup(3).unwrap();
    assert_eq!(result.outcome, SyncOutcome::Created { item_id: c, parent: Some(b) });
    assert_eq!(map.len(), 3);

    let item = harness.item(c);
    assert_eq!(item.object_ref, 3);
    assert_eq!(item.parent_id, Some(b));
    assert_eq!(item.structure_id, menu);
}

#[test]
fn missing_state_is_a_noop() {
    let harness = Harness::new(Vec::new());
    let node = SourceNode::published(1, "Home", None, 0);

    let result = harness.engine().incremental_sync(&node, None, None).unwrap();
    assert_eq!(result.outcome, SyncOutcome::Skipped(SkipReason::MissingStructure));
    assert!(result.identity_map.is_none());

    let map: IdentityMap = [(9, 90)].into_iter().collect();
    let result = harness
        .engine()
        .incremental_sync(&node, None, Some(map.clone()))
        .unwrap();
    assert_eq!(result.identity_map, Some(map));
    assert_eq!(harness.menus.item_count(), 0);
}

#[test]
fn unknown_parent_links_to_none() {
    let (harness, menu, map) = synced();
    let orphan = SourceNode::published(7, "Orphan", Some(42), 0);

    let result = harness
        .engine()
        .incremental_sync(&orphan, Some(menu), Some(map))
        .unwrap();

    let item_id = result.identity_map.as_ref().unwrap().lookup(7).unwrap();
    assert_eq!(
        result.outcome,
        SyncOutcome::Created {
            item_id,
            parent: None
        }
    );
    assert_eq!(harness.item(item_id).parent_id, None);
}

#[test]
fn reparenting_keeps_item_identity() {
    let (harness, menu, map) = synced();
    let a = map.lookup(1).unwrap();
    let b = map.lookup(2).unwrap();

    // Contact arrives at the root, then moves under Home
    let contact = SourceNode::published(3, "Contact", None, 1);
    let created = harness
        .engine()
        .incremental_sync(&contact, Some(menu), Some(map))
        .unwrap();
    let map = created.identity_map.unwrap();
    let c = map.lookup(3).unwrap();

    let moved = SourceNode::published(3, "Contact", Some(1), 4);
    let result = harness
        .engine()
        .incremental_sync(&moved, Some(menu), Some(map.clone()))
        .unwrap();

    assert!(!result.changed());
    assert_eq!(result.identity_map, Some(map));
    assert_eq!(result.outcome, SyncOutcome::Relinked { item_id: c, parent: Some(a) });

    let item = harness.item(c);
    assert_eq!(item.id, c);
    assert_eq!(item.object_ref, 3);
    assert_eq!(item.parent_id, Some(a));
    assert_eq!(item.position, 4);
    assert_eq!(harness.item(b).parent_id, Some(a));
    assert_eq!(harness.menus.items(menu).unwrap().len(), 3);
}

#[test]
fn draft_never_mutates_anything() {
    let (harness, menu, map) = synced();
    let before = harness.menus.items(menu).unwrap();

    for node in [
        SourceNode::published(3, "Draft", Some(2), 0).with_status(PageStatus::Draft),
        SourceNode::published(2, "About", None, 9).with_status(PageStatus::Draft),
    ] {
        let result = harness
            .engine()
            .incremental_sync(&node, Some(menu), Some(map.clone()))
            .unwrap();
        assert_eq!(result.outcome, SyncOutcome::Skipped(SkipReason::NotPublished));
        assert_eq!(result.identity_map.as_ref(), Some(&map));
    }

    assert_eq!(harness.menus.items(menu).unwrap(), before);
}
