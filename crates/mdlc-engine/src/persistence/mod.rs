//! Serializing the three workspace slices to a key-value store.
//!
//! The tree lives under `files`, the block list under `blocks` and the image
//! list under `images`, each as a JSON document. A missing key loads as the
//! empty default.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::{Block, Image, TreeNode};
use crate::store::{TreeError, validate_tree};

pub mod dir;
pub mod memory;

pub use dir::DirStore;
pub use memory::MemoryStore;

pub const FILES_KEY: &str = "files";
pub const BLOCKS_KEY: &str = "blocks";
pub const IMAGES_KEY: &str = "images";
pub const ALL_KEYS: [&str; 3] = [FILES_KEY, BLOCKS_KEY, IMAGES_KEY];

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Stored {key} data is corrupt: {source}")]
    Corrupt {
        key: String,
        source: serde_json::Error,
    },

    #[error("Failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },

    #[error("Stored tree is invalid: {0}")]
    InvalidTree(#[from] TreeError),
}

/// String storage addressed by key
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistError>;
}

/// Typed load/save of the workspace slices on top of a [`KeyValueStore`]
#[derive(Debug, Default)]
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// The stored tree, or an empty root when nothing is stored
    pub fn load_tree(&self) -> Result<TreeNode, PersistError> {
        let Some(tree) = self.load_json::<TreeNode>(FILES_KEY)? else {
            return Ok(TreeNode::root());
        };
        validate_tree(&tree)?;
        Ok(tree)
    }

    pub fn load_blocks(&self) -> Result<Vec<Block>, PersistError> {
        Ok(self.load_json(BLOCKS_KEY)?.unwrap_or_default())
    }

    pub fn load_images(&self) -> Result<Vec<Image>, PersistError> {
        Ok(self.load_json(IMAGES_KEY)?.unwrap_or_default())
    }

    pub fn save_tree(&mut self, tree: &TreeNode) -> Result<(), PersistError> {
        self.save_json(FILES_KEY, tree)
    }

    pub fn save_blocks(&mut self, blocks: &[Block]) -> Result<(), PersistError> {
        self.save_json(BLOCKS_KEY, blocks)
    }

    pub fn save_images(&mut self, images: &[Image]) -> Result<(), PersistError> {
        self.save_json(IMAGES_KEY, images)
    }

    /// Forget every stored slice
    pub fn clear_all(&mut self) -> Result<(), PersistError> {
        for key in ALL_KEYS {
            self.store.remove(key)?;
        }
        Ok(())
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| PersistError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    fn save_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), PersistError> {
        let raw = serde_json::to_string(value).map_err(|source| PersistError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ROOT_ID;
    use crate::tests::{block, image, sample_tree_store};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_keys_load_defaults() {
        let persistence = Persistence::new(MemoryStore::new());

        assert_eq!(persistence.load_tree().unwrap(), TreeNode::root());
        assert!(persistence.load_blocks().unwrap().is_empty());
        assert!(persistence.load_images().unwrap().is_empty());
    }

    #[test]
    fn test_slices_survive_save_and_load() {
        let (tree_store, _) = sample_tree_store();
        let blocks = vec![block("b1", "**bold**")];
        let images = vec![image("i1", "pic", Some("data:image/png;base64,AA"), None)];

        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save_tree(tree_store.tree()).unwrap();
        persistence.save_blocks(&blocks).unwrap();
        persistence.save_images(&images).unwrap();

        assert_eq!(&persistence.load_tree().unwrap(), tree_store.tree());
        assert_eq!(persistence.load_blocks().unwrap(), blocks);
        assert_eq!(persistence.load_images().unwrap(), images);
    }

    #[test]
    fn test_corrupt_json_is_reported() {
        let mut store = MemoryStore::new();
        store.set(BLOCKS_KEY, "{not json").unwrap();
        let persistence = Persistence::new(store);

        let err = persistence.load_blocks().unwrap_err();
        assert!(matches!(err, PersistError::Corrupt { ref key, .. } if key == BLOCKS_KEY));
    }

    #[test]
    fn test_tree_with_wrong_root_is_rejected() {
        let mut store = MemoryStore::new();
        store
            .set(
                FILES_KEY,
                r#"{"id":"top","name":"top","type":"folder","children":[]}"#,
            )
            .unwrap();
        let persistence = Persistence::new(store);

        assert!(matches!(
            persistence.load_tree(),
            Err(PersistError::InvalidTree(TreeError::InvalidRoot(_)))
        ));
    }

    #[test]
    fn test_clear_all_removes_every_slice() {
        let mut persistence = Persistence::new(MemoryStore::new());
        persistence.save_tree(&TreeNode::root()).unwrap();
        persistence.save_blocks(&[block("b1", "x")]).unwrap();

        persistence.clear_all().unwrap();

        assert!(persistence.store().is_empty());
        assert_eq!(persistence.load_tree().unwrap().id, ROOT_ID);
    }
}
