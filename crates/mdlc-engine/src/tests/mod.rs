//! Shared fixtures for unit tests

use chrono::Utc;
use tempfile::TempDir;

use crate::models::{Block, BlockType, Image, ItemType, ROOT_ID};
use crate::store::TreeStore;

/// Ids of the nodes in [`sample_tree_store`]
pub struct SampleIds {
    pub projects: String,
    pub archive: String,
    pub plan: String,
    pub inbox: String,
}

/// ```text
/// root
/// ├── Projects/
/// │   ├── plan.md   "# Plan"
/// │   └── Archive/
/// └── inbox.md
/// ```
pub fn sample_tree_store() -> (TreeStore, SampleIds) {
    let mut store = TreeStore::new();
    let projects = store
        .create_item(ItemType::Folder, "Projects", ROOT_ID)
        .unwrap();
    let plan = store
        .create_item(ItemType::File, "plan.md", &projects)
        .unwrap();
    let archive = store
        .create_item(ItemType::Folder, "Archive", &projects)
        .unwrap();
    let inbox = store
        .create_item(ItemType::File, "inbox.md", ROOT_ID)
        .unwrap();
    store.set_file_content(&plan, "# Plan".to_string()).unwrap();

    (
        store,
        SampleIds {
            projects,
            archive,
            plan,
            inbox,
        },
    )
}

/// A markdown block named after its id
pub fn block(id: &str, content: &str) -> Block {
    let now = Utc::now();
    Block {
        id: id.to_string(),
        name: id.to_string(),
        content: content.to_string(),
        shortcut: None,
        block_type: BlockType::Markdown,
        created_at: now,
        updated_at: now,
    }
}

pub fn image(id: &str, name: &str, data: Option<&str>, url: Option<&str>) -> Image {
    Image {
        id: id.to_string(),
        name: name.to_string(),
        data: data.map(str::to_string),
        url: url.map(str::to_string),
        created_at: Utc::now(),
    }
}

pub fn create_test_data_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}
