use crate::integration::support::{home_and_about, Harness};
use menu_sync::state::DEFAULT_MAP_KEY;
use menu_sync::store::StateStore;
use menu_sync::{IdentityMap, PageEvent, PageStatus, SkipReason, SourceNode, SyncOutcome};

#[test]
fn published_event_after_bootstrap_extends_map() {
    let harness = Harness::new(home_and_about());
    harness.controller().ensure_structure_exists().unwrap();

    let team = SourceNode::published(3, "Team", Some(2), 0);
    harness.pages.upsert(team.clone());
    let outcome = harness.adapter().handle(&PageEvent::Published(team)).unwrap();

    let stored = harness.state.get(DEFAULT_MAP_KEY).unwrap().unwrap();
    let map = IdentityMap::deserialize(&stored).unwrap();
    let about = map.lookup(2).unwrap();
    let team_item = map.lookup(3).unwrap();
    assert_eq!(outcome, SyncOutcome::Created { item_id: team_item, parent: Some(about) });
}

#[test]
fn relink_does_not_rewrite_map() {
    let harness = Harness::new(home_and_about());
    harness.controller().ensure_structure_exists().unwrap();

    // Store the same map pretty-printed; a relink must leave those bytes alone
    let stored = harness.state.get(DEFAULT_MAP_KEY).unwrap().unwrap();
    let map = IdentityMap::deserialize(&stored).unwrap();
    let pretty = serde_json::to_vec_pretty(&map).unwrap();
    harness.state.set(DEFAULT_MAP_KEY, &pretty).unwrap();

    let about = SourceNode::published(2, "About", None, 3);
    harness.pages.upsert(about.clone());
    let outcome = harness.adapter().handle(&PageEvent::Updated(about)).unwrap();

    assert_eq!(
        outcome,
        SyncOutcome::Relinked {
            item_id: map.lookup(2).unwrap(),
            parent: None
        }
    );
    assert_eq!(harness.state.get(DEFAULT_MAP_KEY).unwrap(), Some(pretty));
}

#[test]
fn draft_event_is_ignored() {
    let harness = Harness::new(home_and_about());
    harness.controller().ensure_structure_exists().unwrap();
    let before = harness.menus.item_count();

    let draft = SourceNode::published(5, "Coming Soon", Some(1), 0).with_status(PageStatus::Draft);
    harness.pages.upsert(draft.clone());
    let outcome = harness.adapter().handle(&PageEvent::Created(draft)).unwrap();

    assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::NotPublished));
    assert_eq!(harness.menus.item_count(), before);
}

#[test]
fn unreadable_map_skips_sync() {
    let harness = Harness::new(home_and_about());
    harness.controller().ensure_structure_exists().unwrap();
    let before = harness.menus.item_count();
    harness.state.set(DEFAULT_MAP_KEY, b"not json").unwrap();

    let team = SourceNode::published(3, "Team", Some(2), 0);
    let outcome = harness.adapter().handle(&PageEvent::Published(team)).unwrap();

    assert_eq!(outcome, SyncOutcome::Skipped(SkipReason::MissingIdentityMap));
    assert_eq!(harness.menus.item_count(), before);
}

/// Two saves that load the same snapshot: the later write drops the earlier
/// one's association. The menu item survives but is no longer mapped.
#[test]
fn concurrent_saves_lose_an_association() {
    let harness = Harness::new(home_and_about());
    harness.controller().ensure_structure_exists().unwrap();
    let adapter = harness.adapter();

    let first_snapshot = adapter.load_state().unwrap();
    let second_snapshot = adapter.load_state().unwrap();

    let team = SourceNode::published(3, "Team", Some(2), 0);
    let jobs = SourceNode::published(4, "Jobs", Some(2), 1);
    let first = adapter.sync(&team, first_snapshot).unwrap();
    let second = adapter.sync(&jobs, second_snapshot).unwrap();
    assert!(first.changed() && second.changed());

    adapter.persist_map(first.identity_map.as_ref().unwrap()).unwrap();
    adapter.persist_map(second.identity_map.as_ref().unwrap()).unwrap();

    let persisted = adapter.load_state().unwrap().identity_map.unwrap();
    assert!(!persisted.contains(3), "first writer's association is lost");
    assert!(persisted.contains(4));
    assert_eq!(harness.menus.item_count(), 4);
}
