use crate::integration::support::{home_and_about, Harness, MENU};
use menu_sync::state::{self, StateKeys};
use menu_sync::store::MenuStore;
use menu_sync::{IdentityMap, SourceNode};
use proptest::prelude::*;

#[test]
fn home_and_about_are_linked() {
    let harness = Harness::new(Vec::new());
    let menu = harness.menus.create(MENU).unwrap();

    let report = harness
        .engine()
        .full_sync(&home_and_about(), menu, IdentityMap::new())
        .unwrap();

    let a = report.identity_map.lookup(1).unwrap();
    let b = report.identity_map.lookup(2).unwrap();
    assert_eq!(report.identity_map.len(), 2);
    assert_eq!(report.created, 2);
    assert!(report.unresolved_parents.is_empty());

    let home = harness.item(a);
    assert_eq!(home.object_ref, 1);
    assert_eq!(home.title, "Home");
    assert_eq!(home.parent_id, None);

    let about = harness.item(b);
    assert_eq!(about.object_ref, 2);
    assert_eq!(about.title, "About");
    assert_eq!(about.parent_id, Some(a));
    assert_eq!(about.structure_id, menu);
}

#[test]
fn second_full_sync_creates_nothing() {
    let harness = Harness::new(Vec::new());
    let menu = harness.menus.create(MENU).unwrap();
    let engine = harness.engine();

    let first = engine
        .full_sync(&home_and_about(), menu, IdentityMap::new())
        .unwrap();
    let second = engine
        .full_sync(&home_and_about(), menu, first.identity_map.clone())
        .unwrap();

    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 2);
    assert_eq!(second.identity_map, first.identity_map);
    assert_eq!(harness.menus.items(menu).unwrap().len(), 2);
}

#[test]
fn child_before_parent_is_left_unparented() {
    let harness = Harness::new(Vec::new());
    let menu = harness.menus.create(MENU).unwrap();
    let nodes = vec![
        SourceNode::published(2, "About", Some(1), 0),
        SourceNode::published(1, "Home", None, 0),
    ];

    let report = harness
        .engine()
        .full_sync(&nodes, menu, IdentityMap::new())
        .unwrap();

    assert_eq!(report.unresolved_parents, vec![2]);
    let about = harness.item(report.identity_map.lookup(2).unwrap());
    assert_eq!(about.parent_id, None);
}

#[test]
fn rerun_repairs_forward_reference() {
    let harness = Harness::new(Vec::new());
    let menu = harness.menus.create(MENU).unwrap();
    let nodes = vec![
        SourceNode::published(2, "About", Some(1), 0),
        SourceNode::published(1, "Home", None, 0),
    ];
    let engine = harness.engine();

    let first = engine.full_sync(&nodes, menu, IdentityMap::new()).unwrap();
    let second = engine.full_sync(&nodes, menu, first.identity_map).unwrap();

    let home = second.identity_map.lookup(1).unwrap();
    let about = harness.item(second.identity_map.lookup(2).unwrap());
    assert_eq!(about.parent_id, Some(home));
    assert!(second.unresolved_parents.is_empty());
}

/// Forest of published pages where every parent precedes its children.
fn ordered_forest() -> impl Strategy<Value = Vec<SourceNode>> {
    proptest::collection::vec(
        (any::<Option<proptest::sample::Index>>(), -5i64..5),
        1..40,
    )
    .prop_map(|slots| {
        slots
            .into_iter()
            .enumerate()
            .map(|(i, (parent, order))| {
                let parent_id = match parent {
                    Some(ix) if i > 0 => Some(100 + ix.index(i) as u64),
                    _ => None,
                };
                SourceNode::published(100 + i as u64, format!("Page {}", i), parent_id, order)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn every_item_links_to_its_parents_item(nodes in ordered_forest()) {
        let harness = Harness::new(Vec::new());
        let menu = harness.menus.create(MENU).unwrap();
        let engine = harness.engine();

        let report = engine.full_sync(&nodes, menu, IdentityMap::new()).unwrap();
        prop_assert_eq!(report.identity_map.len(), nodes.len());
        prop_assert_eq!(harness.menus.items(menu).unwrap().len(), nodes.len());

        for node in &nodes {
            let item = harness.item(report.identity_map.lookup(node.id).unwrap());
            prop_assert_eq!(item.object_ref, node.id);
            prop_assert_eq!(item.position, node.order_key);
            let expected = node.parent_id.and_then(|p| report.identity_map.lookup(p));
            prop_assert_eq!(item.parent_id, expected);
        }

        let again = engine.full_sync(&nodes, menu, report.identity_map.clone()).unwrap();
        prop_assert_eq!(again.created, 0);
        prop_assert_eq!(again.identity_map.len(), nodes.len());
    }
}

#[test]
fn dangling_mapping_does_not_block_new_pages() {
    let harness = Harness::new(vec![SourceNode::published(1, "Home", None, 0)]);
    let controller = harness.controller();
    controller.ensure_structure_exists().unwrap();

    let keys = StateKeys::default();
    let mut map = state::load_identity_map(harness.state.as_ref(), &keys)
        .unwrap()
        .unwrap();
    map.insert(5, 999);
    state::persist_identity_map(harness.state.as_ref(), &keys, &map).unwrap();

    harness.pages.upsert(SourceNode::published(2, "About", Some(1), 0));
    harness.pages.upsert(SourceNode::published(5, "Gone", None, 1));

    let first = controller.resync().unwrap().unwrap();
    assert_eq!(first.missing_items, vec![5]);
    assert_eq!(first.created, 1);
    let second = controller.resync().unwrap().unwrap();
    assert_eq!(second.missing_items, vec![5]);
    assert_eq!(second.created, 0);

    let menu = harness.menus.exists(MENU).unwrap().unwrap();
    let about_items = harness
        .menus
        .items(menu)
        .unwrap()
        .into_iter()
        .filter(|item| item.object_ref == 2)
        .count();
    assert_eq!(about_items, 1);

    let persisted = state::load_identity_map(harness.state.as_ref(), &keys)
        .unwrap()
        .unwrap();
    assert_eq!(persisted, second.identity_map);
    let about = harness.item(persisted.lookup(2).unwrap());
    assert_eq!(about.parent_id, persisted.lookup(1));
}
