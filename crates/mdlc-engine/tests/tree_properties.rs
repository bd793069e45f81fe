use mdlc_engine::{ItemType, ROOT_ID, TreeError, TreeStore};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

struct Ids {
    docs: String,
    nested: String,
    deep: String,
    note: String,
}

/// root / docs / nested / deep, plus root / note.md
#[fixture]
fn store() -> (TreeStore, Ids) {
    let mut store = TreeStore::new();
    let docs = store.create_item(ItemType::Folder, "docs", ROOT_ID).unwrap();
    let nested = store.create_item(ItemType::Folder, "nested", &docs).unwrap();
    let deep = store.create_item(ItemType::Folder, "deep", &nested).unwrap();
    let note = store.create_item(ItemType::File, "note.md", ROOT_ID).unwrap();
    (
        store,
        Ids {
            docs,
            nested,
            deep,
            note,
        },
    )
}

#[rstest]
#[case::file(ItemType::File)]
#[case::folder(ItemType::Folder)]
fn create_adds_exactly_one_child(store: (TreeStore, Ids), #[case] item_type: ItemType) {
    let (mut store, ids) = store;
    for parent in [ROOT_ID, ids.docs.as_str(), ids.deep.as_str()] {
        let before = store.tree().count();
        let children_before = store.find_node_by_id(parent).unwrap().children().unwrap().len();

        let id = store.create_item(item_type, "new", parent).unwrap();

        assert_eq!(store.tree().count(), before + 1);
        let parent_node = store.find_node_by_id(parent).unwrap();
        assert_eq!(parent_node.children().unwrap().len(), children_before + 1);
        let created = store.find_node_by_id(&id).unwrap();
        assert_eq!(created.name, "new");
        assert_eq!(created.item_type(), item_type);
        assert_eq!(store.parent_of(&id).unwrap().id, parent);
    }
}

#[rstest]
fn invalid_moves_leave_tree_unchanged(store: (TreeStore, Ids)) {
    let (mut store, ids) = store;
    let before = store.tree().clone();

    let attempts = [
        (ids.docs.as_str(), ids.docs.as_str()),
        (ids.docs.as_str(), ids.nested.as_str()),
        (ids.docs.as_str(), ids.deep.as_str()),
        (ids.nested.as_str(), ids.deep.as_str()),
        (ids.deep.as_str(), ids.note.as_str()),
        (ids.note.as_str(), "missing"),
        ("missing", ids.docs.as_str()),
        (ROOT_ID, ids.deep.as_str()),
    ];
    for (item, target) in attempts {
        assert!(store.move_item(item, target).is_err(), "{item} -> {target}");
        assert_eq!(store.tree(), &before);
    }
}

#[rstest]
fn valid_move_keeps_node_count(store: (TreeStore, Ids)) {
    let (mut store, ids) = store;
    let count = store.tree().count();

    store.move_item(&ids.deep, ROOT_ID).unwrap();
    store.move_item(&ids.docs, &ids.deep).unwrap();

    assert_eq!(store.tree().count(), count);
    assert_eq!(store.parent_of(&ids.docs).unwrap().id, ids.deep);
    assert!(store.is_descendant(&ids.deep, &ids.nested));
}

#[rstest]
fn save_after_update_round_trips(store: (TreeStore, Ids)) {
    let (mut store, ids) = store;
    store.open_file(&ids.note).unwrap();

    for content in ["", "one", "# Two\n\n{{block(b1)}}\n", "ünïcødé ✓"] {
        store.update_file_content(content).unwrap();
        store.save_current_file().unwrap();
        let open = store.session().current_file_id().unwrap();
        assert_eq!(store.find_node_by_id(open).unwrap().content(), Some(content));
    }
}

#[rstest]
fn delete_twice_equals_delete_once(store: (TreeStore, Ids)) {
    let (mut once, ids) = store;
    once.delete_item(&ids.nested).unwrap();

    let mut twice = once.clone();
    assert_eq!(
        twice.delete_item(&ids.nested),
        Err(TreeError::NotFound(ids.nested.clone()))
    );
    assert_eq!(twice.tree(), once.tree());
    assert!(twice.find_node_by_id(&ids.deep).is_none());
}
