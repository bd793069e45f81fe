pub mod io;
pub mod models;
pub mod persistence;
pub mod placeholder;
pub mod render;
pub mod shortcut;
pub mod store;
pub mod workspace;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use io::{ExportBundle, InterchangeError};
pub use models::{Block, BlockType, Image, ItemType, NodeKind, ROOT_ID, TreeItem, TreeNode};
pub use persistence::{DirStore, KeyValueStore, MemoryStore, PersistError, Persistence};
pub use placeholder::resolve_placeholders;
pub use render::{MarkdownRenderer, PulldownRenderer, RenderError, render_markdown, render_preview};
pub use shortcut::{KeyEvent, Platform};
pub use store::{
    BlockError, BlockStore, BlockUpdate, ImageError, ImageStore, ImportReport, NewBlock, NewImage,
    TreeError, TreeStore,
};
pub use workspace::{Change, Slice, Workspace, WorkspaceError};
