use chrono::Utc;

use super::ImportReport;
use crate::models::ids::BLOCK_PREFIX;
use crate::models::{Block, BlockType, new_id};
use crate::shortcut::{KeyEvent, Platform, matches_shortcut};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    #[error("Shortcut {0} is already used by another block")]
    ShortcutInUse(String),
    #[error("Block name is required")]
    EmptyName,
    #[error("Block content is required")]
    EmptyContent,
    #[error("No block with id {0}")]
    NotFound(String),
}

/// Fields for a block created from the editor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBlock {
    pub name: String,
    pub content: String,
    pub shortcut: Option<String>,
    pub block_type: BlockType,
}

impl NewBlock {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn with_type(mut self, block_type: BlockType) -> Self {
        self.block_type = block_type;
        self
    }
}

/// Partial update; `None` leaves a field as it is.
///
/// `shortcut: Some(None)` clears the shortcut.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockUpdate {
    pub name: Option<String>,
    pub content: Option<String>,
    pub shortcut: Option<Option<String>>,
    pub block_type: Option<BlockType>,
}

/// Blank shortcuts mean "no shortcut"
fn clean_shortcut(shortcut: Option<String>) -> Option<String> {
    shortcut
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required(value: &str, error: BlockError) -> Result<String, BlockError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(error)
    } else {
        Ok(trimmed.to_string())
    }
}

/// The block library.
///
/// Non-null shortcuts are unique across all blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockStore {
    blocks: Vec<Block>,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a library from stored or restored blocks.
    ///
    /// Duplicate ids are re-minted and repeated shortcuts are dropped from
    /// later holders, the same way [`BlockStore::import`] treats them.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut store = Self::new();
        let report = store.import(blocks);
        if !report.reassigned_ids.is_empty() || !report.cleared_shortcuts.is_empty() {
            log::warn!(
                "Repaired loaded blocks: {} duplicate ids, {} duplicate shortcuts",
                report.reassigned_ids.len(),
                report.cleared_shortcuts.len()
            );
        }
        store
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Block currently holding `shortcut`
    pub fn shortcut_holder(&self, shortcut: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.has_shortcut(shortcut))
    }

    /// Block whose shortcut the key event triggers
    pub fn find_by_event(&self, event: &KeyEvent, platform: Platform) -> Option<&Block> {
        self.blocks.iter().find(|b| {
            b.shortcut
                .as_deref()
                .is_some_and(|s| matches_shortcut(event, s, platform))
        })
    }

    pub fn add(&mut self, new_block: NewBlock) -> Result<&Block, BlockError> {
        let name = required(&new_block.name, BlockError::EmptyName)?;
        let content = required(&new_block.content, BlockError::EmptyContent)?;
        let shortcut = clean_shortcut(new_block.shortcut);

        if let Some(shortcut) = &shortcut
            && self.shortcut_holder(shortcut).is_some()
        {
            return Err(BlockError::ShortcutInUse(shortcut.clone()));
        }

        let now = Utc::now();
        let block = Block {
            id: new_id(BLOCK_PREFIX),
            name,
            content,
            shortcut,
            block_type: new_block.block_type,
            created_at: now,
            updated_at: now,
        };
        log::debug!("Added block {} ({})", block.id, block.name);
        self.blocks.push(block);
        Ok(&self.blocks[self.blocks.len() - 1])
    }

    pub fn update(&mut self, id: &str, update: BlockUpdate) -> Result<&Block, BlockError> {
        let index = self
            .blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| BlockError::NotFound(id.to_string()))?;

        let name = update
            .name
            .map(|n| required(&n, BlockError::EmptyName))
            .transpose()?;
        let content = update
            .content
            .map(|c| required(&c, BlockError::EmptyContent))
            .transpose()?;
        let shortcut = update.shortcut.map(clean_shortcut);

        if let Some(Some(shortcut)) = &shortcut
            && self
                .blocks
                .iter()
                .any(|b| b.id != id && b.has_shortcut(shortcut))
        {
            return Err(BlockError::ShortcutInUse(shortcut.clone()));
        }

        let block = &mut self.blocks[index];
        if let Some(name) = name {
            block.name = name;
        }
        if let Some(content) = content {
            block.content = content;
        }
        if let Some(shortcut) = shortcut {
            block.shortcut = shortcut;
        }
        if let Some(block_type) = update.block_type {
            block.block_type = block_type;
        }
        block.updated_at = Utc::now();
        Ok(&*block)
    }

    pub fn delete(&mut self, id: &str) -> Result<Block, BlockError> {
        let index = self
            .blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| BlockError::NotFound(id.to_string()))?;
        Ok(self.blocks.remove(index))
    }

    /// Merge imported blocks into the library.
    ///
    /// Colliding ids are replaced with fresh ones and colliding shortcuts are
    /// dropped from the incoming copy. Blocks earlier in the same batch count
    /// as existing.
    pub fn import(&mut self, incoming: Vec<Block>) -> ImportReport {
        let mut report = ImportReport::default();

        for mut block in incoming {
            if self.get(&block.id).is_some() {
                let fresh = new_id(BLOCK_PREFIX);
                report.reassigned_ids.push((block.id.clone(), fresh.clone()));
                block.id = fresh;
            }
            if let Some(shortcut) = block.shortcut.as_deref()
                && self.shortcut_holder(shortcut).is_some()
            {
                log::warn!(
                    "Dropping shortcut {shortcut} from imported block {}: already in use",
                    block.name
                );
                report.cleared_shortcuts.push(block.id.clone());
                block.shortcut = None;
            }
            report.imported.push(block.id.clone());
            self.blocks.push(block);
        }

        report
    }
}
