pub mod blocks;
pub mod images;
pub mod tree;

pub use blocks::{BlockError, BlockStore, BlockUpdate, NewBlock};
pub use images::{ImageError, ImageStore, NewImage};
pub use tree::{EditorSession, TreeError, TreeStore, validate_tree};

/// Outcome of merging imported items into a flat store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Final ids of every imported item, in input order
    pub imported: Vec<String>,
    /// `(incoming id, minted id)` for items whose id was already taken
    pub reassigned_ids: Vec<(String, String)>,
    /// Final ids of imported blocks whose shortcut was dropped
    pub cleared_shortcuts: Vec<String>,
}
