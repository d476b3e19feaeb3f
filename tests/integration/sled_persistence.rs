use menu_sync::state::StateKeys;
use menu_sync::store::memory::{MemoryPageSource, PageOrder};
use menu_sync::store::persistence::{open_db, SledMenuStore, SledStateStore};
use menu_sync::store::MenuStore;
use menu_sync::{BootstrapController, EventAdapter, PageEvent, SourceNode, SyncOutcome};
use std::sync::Arc;
use tempfile::TempDir;

fn pages() -> Arc<MemoryPageSource> {
    Arc::new(MemoryPageSource::new(
        vec![
            SourceNode::published(1, "Home", None, 0),
            SourceNode::published(2, "About", Some(1), 0),
        ],
        PageOrder::Insertion,
    ))
}

#[test]
fn state_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let store_path = temp_dir.path().join("store");

    let structure_id = {
        let db = open_db(&store_path).unwrap();
        let menus = Arc::new(SledMenuStore::from_db(db.clone()).unwrap());
        let state = Arc::new(SledStateStore::from_db(&db).unwrap());
        let controller =
            BootstrapController::new("Synced Menu", menus.clone(), pages(), state, StateKeys::default());
        let id = controller.ensure_structure_exists().unwrap().structure_id();
        menus.flush().unwrap();
        id
    };

    let db = open_db(&store_path).unwrap();
    let menus = Arc::new(SledMenuStore::from_db(db.clone()).unwrap());
    let state = Arc::new(SledStateStore::from_db(&db).unwrap());
    assert_eq!(menus.exists("Synced Menu").unwrap(), Some(structure_id));

    let source = pages();
    let team = SourceNode::published(3, "Team", Some(2), 0);
    source.upsert(team.clone());
    let adapter = EventAdapter::new(menus.clone(), state, source, StateKeys::default());
    let outcome = adapter.handle(&PageEvent::Published(team)).unwrap();

    let SyncOutcome::Created { item_id, parent } = outcome else {
        panic!("expected a new menu item");
    };
    let item = menus.item(item_id).unwrap().unwrap();
    assert_eq!(item.object_ref, 3);
    assert_eq!(item.parent_id, parent);
    assert!(parent.is_some());
    assert_eq!(menus.items(structure_id).unwrap().len(), 3);
}
