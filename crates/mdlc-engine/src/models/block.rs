use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a block's content is meant to be interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    #[default]
    Markdown,
    Html,
    Mixed,
}

impl BlockType {
    /// Map a free-form type tag onto a known type, falling back to markdown
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "html" => BlockType::Html,
            "mixed" => BlockType::Mixed,
            _ => BlockType::Markdown,
        }
    }
}

/// A named, reusable snippet insertable with `{{block(id)}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub shortcut: Option<String>,
    #[serde(rename = "type", default)]
    pub block_type: BlockType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Block {
    pub fn has_shortcut(&self, shortcut: &str) -> bool {
        self.shortcut.as_deref() == Some(shortcut)
    }
}
