//! State container tying the stores to persistence.
//!
//! Every mutation goes through [`Workspace`]. After a successful mutation the
//! touched slices are written back to the key-value store and every observer
//! registered with [`Workspace::subscribe`] sees the [`Change`]. Write
//! failures are logged and never fail the mutation itself.

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::io::{self, ExportBundle, InterchangeError};
use crate::models::{Block, Image, ItemType, TreeNode};
use crate::persistence::{KeyValueStore, MemoryStore, PersistError, Persistence};
use crate::placeholder::{block_placeholder, image_placeholder, insert_at, resolve_placeholders};
use crate::render::{MarkdownRenderer, PulldownRenderer, render_markdown};
use crate::shortcut::{KeyEvent, Platform};
use crate::store::{
    BlockError, BlockStore, BlockUpdate, ImageError, ImageStore, ImportReport, NewBlock, NewImage,
    TreeError, TreeStore,
};

/// One persisted key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slice {
    Files,
    Blocks,
    Images,
}

/// What a successful mutation did
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    ItemCreated { id: String },
    ItemRenamed { id: String },
    ItemDeleted { id: String },
    ItemMoved { id: String, target: String },
    FileOpened { id: String },
    FileClosed,
    FileEdited { id: String },
    FileSaved { id: String },
    BlockAdded { id: String },
    BlockUpdated { id: String },
    BlockDeleted { id: String },
    BlocksImported(ImportReport),
    ImageAdded { id: String },
    ImageRenamed { id: String },
    ImageDeleted { id: String },
    ImagesCleared { count: usize },
    ImagesImported(ImportReport),
    Restored,
    Cleared,
}

impl Change {
    /// Slices that must be written back after this change
    pub fn slices(&self) -> &'static [Slice] {
        match self {
            Change::ItemCreated { .. }
            | Change::ItemRenamed { .. }
            | Change::ItemDeleted { .. }
            | Change::ItemMoved { .. }
            | Change::FileEdited { .. }
            | Change::FileSaved { .. } => &[Slice::Files],
            Change::FileOpened { .. } | Change::FileClosed | Change::Cleared => &[],
            Change::BlockAdded { .. }
            | Change::BlockUpdated { .. }
            | Change::BlockDeleted { .. }
            | Change::BlocksImported(_) => &[Slice::Blocks],
            Change::ImageAdded { .. }
            | Change::ImageRenamed { .. }
            | Change::ImageDeleted { .. }
            | Change::ImagesCleared { .. }
            | Change::ImagesImported(_) => &[Slice::Images],
            Change::Restored => &[Slice::Files, Slice::Blocks, Slice::Images],
        }
    }

    /// Id of the item the change is about, when there is a single one
    pub fn subject_id(&self) -> Option<&str> {
        match self {
            Change::ItemCreated { id }
            | Change::ItemRenamed { id }
            | Change::ItemDeleted { id }
            | Change::ItemMoved { id, .. }
            | Change::FileOpened { id }
            | Change::FileEdited { id }
            | Change::FileSaved { id }
            | Change::BlockAdded { id }
            | Change::BlockUpdated { id }
            | Change::BlockDeleted { id }
            | Change::ImageAdded { id }
            | Change::ImageRenamed { id }
            | Change::ImageDeleted { id } => Some(id.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Block(#[from] BlockError),
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Interchange(#[from] InterchangeError),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

type Observer = Box<dyn FnMut(&Change)>;

pub struct Workspace<S: KeyValueStore> {
    tree: TreeStore,
    blocks: BlockStore,
    images: ImageStore,
    persistence: Persistence<S>,
    renderer: Box<dyn MarkdownRenderer>,
    platform: Platform,
    observers: Vec<Observer>,
}

impl Workspace<MemoryStore> {
    /// A fresh workspace that forgets everything when dropped
    pub fn in_memory() -> Self {
        Self::open(MemoryStore::new())
    }
}

impl<S: KeyValueStore> Workspace<S> {
    /// Load every slice from `store`; unreadable slices start out empty
    pub fn open(store: S) -> Self {
        let persistence = Persistence::new(store);

        let tree = persistence
            .load_tree()
            .and_then(|tree| TreeStore::from_tree(tree).map_err(PersistError::from))
            .unwrap_or_else(|e| {
                log::error!("Failed to load files, starting with an empty tree: {e}");
                TreeStore::new()
            });
        let blocks = persistence.load_blocks().unwrap_or_else(|e| {
            log::error!("Failed to load blocks, starting with none: {e}");
            Vec::new()
        });
        let images = persistence.load_images().unwrap_or_else(|e| {
            log::error!("Failed to load images, starting with none: {e}");
            Vec::new()
        });

        log::info!(
            "Workspace loaded: {} tree nodes, {} blocks, {} images",
            tree.tree().count(),
            blocks.len(),
            images.len()
        );

        Self {
            tree,
            blocks: BlockStore::from_blocks(blocks),
            images: ImageStore::from_images(images),
            persistence,
            renderer: Box::new(PulldownRenderer::new()),
            platform: Platform::current(),
            observers: Vec::new(),
        }
    }

    pub fn tree(&self) -> &TreeStore {
        &self.tree
    }

    pub fn blocks(&self) -> &BlockStore {
        &self.blocks
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn set_platform(&mut self, platform: Platform) {
        self.platform = platform;
    }

    pub fn set_renderer(&mut self, renderer: Box<dyn MarkdownRenderer>) {
        self.renderer = renderer;
    }

    /// Call `observer` after every successful mutation
    pub fn subscribe(&mut self, observer: impl FnMut(&Change) + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn commit(&mut self, change: Change) -> Change {
        for slice in change.slices() {
            let result = match slice {
                Slice::Files => self.persistence.save_tree(self.tree.tree()),
                Slice::Blocks => self.persistence.save_blocks(self.blocks.blocks()),
                Slice::Images => self.persistence.save_images(self.images.images()),
            };
            if let Err(e) = result {
                log::error!("Failed to persist {slice:?}: {e}");
            }
        }

        for observer in &mut self.observers {
            observer(&change);
        }
        change
    }

    // Tree

    pub fn create_item(
        &mut self,
        item_type: ItemType,
        name: &str,
        parent_id: &str,
    ) -> Result<Change, TreeError> {
        let id = self.tree.create_item(item_type, name, parent_id)?;
        Ok(self.commit(Change::ItemCreated { id }))
    }

    /// Create a file that starts out with `content`
    pub fn create_file_with_content(
        &mut self,
        name: &str,
        content: String,
        parent_id: &str,
    ) -> Result<Change, TreeError> {
        let id = self.tree.create_item(ItemType::File, name, parent_id)?;
        self.tree.set_file_content(&id, content)?;
        Ok(self.commit(Change::ItemCreated { id }))
    }

    /// Import a `.md` file as a new file named after it
    pub fn import_markdown_file(
        &mut self,
        path: &Path,
        parent_id: &str,
    ) -> Result<Change, WorkspaceError> {
        let content = io::import_markdown_file(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "imported.md".to_string());
        Ok(self.create_file_with_content(&name, content, parent_id)?)
    }

    pub fn rename_item(&mut self, id: &str, new_name: &str) -> Result<Change, TreeError> {
        self.tree.rename_item(id, new_name)?;
        Ok(self.commit(Change::ItemRenamed { id: id.to_string() }))
    }

    pub fn delete_item(&mut self, id: &str) -> Result<Change, TreeError> {
        self.tree.delete_item(id)?;
        Ok(self.commit(Change::ItemDeleted { id: id.to_string() }))
    }

    pub fn move_item(&mut self, item_id: &str, target_parent_id: &str) -> Result<Change, TreeError> {
        self.tree.move_item(item_id, target_parent_id)?;
        Ok(self.commit(Change::ItemMoved {
            id: item_id.to_string(),
            target: target_parent_id.to_string(),
        }))
    }

    pub fn open_file(&mut self, id: &str) -> Result<Change, TreeError> {
        self.tree.open_file(id)?;
        Ok(self.commit(Change::FileOpened { id: id.to_string() }))
    }

    pub fn update_file_content(&mut self, content: &str) -> Result<Change, TreeError> {
        self.tree.update_file_content(content)?;
        let id = self.open_file_id()?;
        Ok(self.commit(Change::FileEdited { id }))
    }

    pub fn close_file(&mut self) -> Change {
        self.tree.close_file();
        self.commit(Change::FileClosed)
    }

    /// `None` when no file is open
    pub fn save_current_file(&mut self) -> Result<Option<Change>, TreeError> {
        self.tree.save_current_file()?;
        let Some(id) = self.tree.session().current_file_id().map(str::to_string) else {
            return Ok(None);
        };
        Ok(Some(self.commit(Change::FileSaved { id })))
    }

    fn open_file_id(&self) -> Result<String, TreeError> {
        self.tree
            .session()
            .current_file_id()
            .map(str::to_string)
            .ok_or(TreeError::NoOpenFile)
    }

    /// Replace `selection` of the open file with `insert`, returning the caret
    pub fn insert_into_current(
        &mut self,
        selection: Range<usize>,
        insert: &str,
    ) -> Result<(Change, usize), TreeError> {
        if !self.tree.session().is_open() {
            return Err(TreeError::NoOpenFile);
        }
        let (text, caret) = insert_at(self.tree.session().current_content(), selection, insert);
        let change = self.update_file_content(&text)?;
        Ok((change, caret))
    }

    pub fn insert_block(
        &mut self,
        block_id: &str,
        selection: Range<usize>,
    ) -> Result<(Change, usize), TreeError> {
        self.insert_into_current(selection, &block_placeholder(block_id))
    }

    pub fn insert_image(
        &mut self,
        image_id: &str,
        selection: Range<usize>,
    ) -> Result<(Change, usize), TreeError> {
        self.insert_into_current(selection, &image_placeholder(image_id))
    }

    /// Insert the block bound to the chord `event` triggers, if any
    pub fn insert_block_by_shortcut(
        &mut self,
        event: &KeyEvent,
        selection: Range<usize>,
    ) -> Result<Option<(Change, usize)>, TreeError> {
        let Some(id) = self
            .blocks
            .find_by_event(event, self.platform)
            .map(|b| b.id.clone())
        else {
            return Ok(None);
        };
        self.insert_block(&id, selection).map(Some)
    }

    // Blocks

    pub fn add_block(&mut self, new_block: NewBlock) -> Result<Change, BlockError> {
        let id = self.blocks.add(new_block)?.id.clone();
        Ok(self.commit(Change::BlockAdded { id }))
    }

    pub fn update_block(&mut self, id: &str, update: BlockUpdate) -> Result<Change, BlockError> {
        self.blocks.update(id, update)?;
        Ok(self.commit(Change::BlockUpdated { id: id.to_string() }))
    }

    pub fn delete_block(&mut self, id: &str) -> Result<Change, BlockError> {
        self.blocks.delete(id)?;
        Ok(self.commit(Change::BlockDeleted { id: id.to_string() }))
    }

    pub fn import_blocks(&mut self, blocks: Vec<Block>) -> Change {
        let report = self.blocks.import(blocks);
        self.commit(Change::BlocksImported(report))
    }

    /// Import a `.part.mdlc` or `.parts.mdlc` file
    pub fn import_blocks_from(&mut self, path: &Path) -> Result<Change, WorkspaceError> {
        let is_multi = path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().ends_with(io::BLOCKS_EXTENSION));
        let blocks = if is_multi {
            io::import_blocks_file(path)?
        } else {
            vec![io::import_block_file(path)?]
        };
        Ok(self.import_blocks(blocks))
    }

    // Images

    pub fn add_image(&mut self, new_image: NewImage) -> Change {
        let id = self.images.add(new_image).id.clone();
        self.commit(Change::ImageAdded { id })
    }

    /// Read an image file from disk into the library
    pub fn upload_image(&mut self, path: &Path, name: Option<&str>) -> Result<Change, WorkspaceError> {
        let new_image = io::read_image_upload(path, name)?;
        Ok(self.add_image(new_image))
    }

    pub fn rename_image(&mut self, id: &str, new_name: &str) -> Result<Change, ImageError> {
        self.images.rename(id, new_name)?;
        Ok(self.commit(Change::ImageRenamed { id: id.to_string() }))
    }

    pub fn delete_image(&mut self, id: &str) -> Result<Change, ImageError> {
        self.images.delete(id)?;
        Ok(self.commit(Change::ImageDeleted { id: id.to_string() }))
    }

    pub fn clear_images(&mut self) -> Change {
        let count = self.images.clear();
        self.commit(Change::ImagesCleared { count })
    }

    pub fn import_images(&mut self, images: Vec<Image>) -> Change {
        let report = self.images.import(images);
        self.commit(Change::ImagesImported(report))
    }

    pub fn import_images_from(&mut self, path: &Path) -> Result<Change, WorkspaceError> {
        let images = io::import_images_file(path)?;
        Ok(self.import_images(images))
    }

    // Preview

    /// Substitute block and image tokens in `text`
    pub fn resolve(&self, text: &str) -> String {
        resolve_placeholders(text, self.blocks.blocks(), self.images.images())
    }

    /// Resolve `text` and render it to HTML
    pub fn render(&self, text: &str) -> String {
        render_markdown(self.renderer.as_ref(), &self.resolve(text))
    }

    /// HTML preview of the open file
    pub fn preview(&self) -> Option<String> {
        self.tree
            .session()
            .is_open()
            .then(|| self.render(self.tree.session().current_content()))
    }

    // Export

    /// Write the file `id` as `<name>.md` into `dir`; empty files are refused
    pub fn export_markdown(&self, id: &str, dir: &Path) -> Result<PathBuf, WorkspaceError> {
        let node = self
            .tree
            .find_node_by_id(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        let content = node
            .content()
            .ok_or_else(|| TreeError::NotAFile(id.to_string()))?;
        if content.is_empty() {
            return Err(InterchangeError::EmptyFile(node.name.clone()).into());
        }
        Ok(io::write_export(
            dir,
            &io::markdown_export_filename(&node.name),
            content,
        )?)
    }

    pub fn export_block(&self, id: &str, dir: &Path) -> Result<PathBuf, WorkspaceError> {
        let block = self
            .blocks
            .get(id)
            .ok_or_else(|| BlockError::NotFound(id.to_string()))?;
        let json = io::export_block_json(block)?;
        Ok(io::write_export(dir, &io::block_export_filename(block), &json)?)
    }

    pub fn export_blocks(&self, dir: &Path) -> Result<PathBuf, WorkspaceError> {
        let json = io::export_blocks_json(self.blocks.blocks())?;
        Ok(io::write_export(dir, io::BLOCKS_EXPORT_FILENAME, &json)?)
    }

    pub fn export_bundle(&self) -> ExportBundle {
        ExportBundle::new(
            self.tree.tree().clone(),
            self.blocks.blocks().to_vec(),
            self.images.images().to_vec(),
        )
    }

    pub fn export_bundle_to(&self, dir: &Path) -> Result<PathBuf, WorkspaceError> {
        let json = self.export_bundle().to_json()?;
        Ok(io::write_export(dir, io::BUNDLE_FILENAME, &json)?)
    }

    /// Replace every slice with the bundle's content.
    ///
    /// Blocks and images pass through the same id and shortcut checks as an
    /// import, so the restored slices may differ from the bundle.
    pub fn restore_bundle(&mut self, bundle: ExportBundle) -> Result<Change, TreeError> {
        self.tree.load_tree(bundle.tree)?;
        self.blocks = BlockStore::from_blocks(bundle.blocks);
        self.images = ImageStore::from_images(bundle.images);
        Ok(self.commit(Change::Restored))
    }

    /// Drop all persisted data and start over with an empty workspace
    pub fn clear_all(&mut self) -> Result<Change, PersistError> {
        self.persistence.clear_all()?;
        self.tree = TreeStore::new();
        self.blocks = BlockStore::new();
        self.images = ImageStore::new();
        Ok(self.commit(Change::Cleared))
    }

    pub fn root(&self) -> &TreeNode {
        self.tree.tree()
    }
}
