pub mod block;
pub mod ids;
pub mod image;
pub mod tree;

pub use block::{Block, BlockType};
pub use ids::new_id;
pub use image::Image;
pub use tree::{ItemType, NodeKind, ROOT_ID, TreeItem, TreeNode};
