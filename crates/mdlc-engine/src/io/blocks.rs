use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;

use super::{InterchangeError, read_text, require_suffix, sanitize_filename};
use crate::models::ids::BLOCK_PREFIX;
use crate::models::{Block, BlockType, new_id};

pub const BLOCK_EXTENSION: &str = ".part.mdlc";
pub const BLOCKS_EXTENSION: &str = ".parts.mdlc";
pub const BLOCKS_EXPORT_FILENAME: &str = "blocks.parts.mdlc";

/// A block as found in an interchange file, before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockRecord {
    #[serde(default)]
    id: Option<String>,
    name: String,
    content: String,
    #[serde(default)]
    shortcut: Option<String>,
    #[serde(rename = "type", default)]
    block_type: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl BlockRecord {
    fn into_block(self) -> Result<Block, String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }

        let now = Utc::now();
        let created_at = self.created_at.unwrap_or(now);
        Ok(Block {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| new_id(BLOCK_PREFIX)),
            name: self.name,
            content: self.content,
            shortcut: self.shortcut.filter(|s| !s.trim().is_empty()),
            block_type: self
                .block_type
                .as_deref()
                .map(BlockType::from_tag)
                .unwrap_or_default(),
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        })
    }
}

fn block_from_value(value: serde_json::Value) -> Result<Block, String> {
    serde_json::from_value::<BlockRecord>(value)
        .map_err(|e| e.to_string())?
        .into_block()
}

/// Parse the JSON object of a `.part.mdlc` file
pub fn parse_block(json: &str) -> Result<Block, InterchangeError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    block_from_value(value).map_err(InterchangeError::InvalidBlock)
}

/// Parse the JSON array of a `.parts.mdlc` file; all items must be valid
pub fn parse_blocks(json: &str) -> Result<Vec<Block>, InterchangeError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = value else {
        return Err(InterchangeError::NotAnArray("blocks"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            block_from_value(item).map_err(|reason| InterchangeError::InvalidBlockAt { index, reason })
        })
        .collect()
}

pub fn import_block_file(path: &Path) -> Result<Block, InterchangeError> {
    require_suffix(path, BLOCK_EXTENSION)?;
    parse_block(&read_text(path)?)
}

pub fn import_blocks_file(path: &Path) -> Result<Vec<Block>, InterchangeError> {
    require_suffix(path, BLOCKS_EXTENSION)?;
    parse_blocks(&read_text(path)?)
}

pub fn export_block_json(block: &Block) -> Result<String, InterchangeError> {
    Ok(serde_json::to_string_pretty(block)?)
}

pub fn export_blocks_json(blocks: &[Block]) -> Result<String, InterchangeError> {
    Ok(serde_json::to_string_pretty(blocks)?)
}

/// `<name>.part.mdlc`, falling back to `block` for unusable names
pub fn block_export_filename(block: &Block) -> String {
    let stem = sanitize_filename(&block.name);
    let stem = if stem.is_empty() { "block" } else { stem.as_str() };
    format!("{stem}{BLOCK_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{block, create_test_data_dir};
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_parse_minimal_block_fills_defaults() {
        let parsed = parse_block(r#"{"name":"Sig","content":"-- me"}"#).unwrap();

        assert!(parsed.id.starts_with("block-"));
        assert_eq!(parsed.name, "Sig");
        assert_eq!(parsed.content, "-- me");
        assert_eq!(parsed.shortcut, None);
        assert_eq!(parsed.block_type, BlockType::Markdown);
        assert_eq!(parsed.created_at, parsed.updated_at);
    }

    #[test]
    fn test_parse_full_block_keeps_fields() {
        let json = r#"{
            "id": "block-7",
            "name": "Banner",
            "content": "<b>hi</b>",
            "shortcut": "Ctrl+Shift+7",
            "type": "html",
            "createdAt": "2024-01-02T03:04:05Z",
            "updatedAt": "2024-02-02T03:04:05Z"
        }"#;
        let parsed = parse_block(json).unwrap();

        assert_eq!(parsed.id, "block-7");
        assert_eq!(parsed.shortcut.as_deref(), Some("Ctrl+Shift+7"));
        assert_eq!(parsed.block_type, BlockType::Html);
        assert_eq!(parsed.created_at.to_rfc3339(), "2024-01-02T03:04:05+00:00");
        assert_eq!(parsed.updated_at.to_rfc3339(), "2024-02-02T03:04:05+00:00");
    }

    #[test]
    fn test_parse_block_rejects_missing_or_blank_fields() {
        assert!(matches!(
            parse_block(r#"{"content":"x"}"#),
            Err(InterchangeError::InvalidBlock(_))
        ));
        assert!(matches!(
            parse_block(r#"{"name":"  ","content":"x"}"#),
            Err(InterchangeError::InvalidBlock(_))
        ));
        assert!(matches!(
            parse_block(r#"{"name":"x","content":3}"#),
            Err(InterchangeError::InvalidBlock(_))
        ));
        assert!(matches!(
            parse_block("[1, 2"),
            Err(InterchangeError::Json(_))
        ));
    }

    #[test]
    fn test_parse_blocks_names_failing_index() {
        let json = r#"[{"name":"a","content":"1"},{"name":"b"}]"#;
        let err = parse_blocks(json).unwrap_err();

        assert!(matches!(err, InterchangeError::InvalidBlockAt { index: 1, .. }));
        assert!(err.to_string().starts_with("Block at index 1 is invalid"));
    }

    #[test]
    fn test_parse_blocks_requires_array() {
        assert!(matches!(
            parse_blocks(r#"{"name":"a","content":"1"}"#),
            Err(InterchangeError::NotAnArray("blocks"))
        ));
    }

    #[test]
    fn test_parse_blocks_mints_distinct_ids() {
        let blocks = parse_blocks(r#"[{"name":"a","content":"1"},{"name":"b","content":"2"}]"#).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_ne!(blocks[0].id, blocks[1].id);
    }

    #[test]
    fn test_block_file_extension_is_checked() {
        let dir = create_test_data_dir();
        let single = dir.path().join("sig.part.mdlc");
        let multi = dir.path().join("all.parts.mdlc");
        fs::write(&single, r#"{"name":"sig","content":"x"}"#).unwrap();
        fs::write(&multi, r#"[{"name":"sig","content":"x"}]"#).unwrap();

        assert_eq!(import_block_file(&single).unwrap().name, "sig");
        assert_eq!(import_blocks_file(&multi).unwrap().len(), 1);
        assert!(matches!(
            import_block_file(&multi),
            Err(InterchangeError::WrongExtension { .. })
        ));
        assert!(matches!(
            import_blocks_file(&single),
            Err(InterchangeError::WrongExtension { .. })
        ));
    }

    #[test]
    fn test_exported_blocks_import_back() {
        let mut original = block("b1", "**bold**");
        original.shortcut = Some("Ctrl+1".to_string());

        let single = parse_block(&export_block_json(&original).unwrap()).unwrap();
        assert_eq!(single, original);

        let many = parse_blocks(&export_blocks_json(&[original.clone()]).unwrap()).unwrap();
        assert_eq!(many, vec![original]);
    }

    #[test]
    fn test_export_filenames() {
        let mut named = block("b1", "x");
        named.name = "My: Block".to_string();
        assert_eq!(block_export_filename(&named), "My Block.part.mdlc");

        named.name = "???".to_string();
        assert_eq!(block_export_filename(&named), "block.part.mdlc");

        assert!(BLOCKS_EXPORT_FILENAME.ends_with(BLOCKS_EXTENSION));
    }
}
