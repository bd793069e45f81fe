use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{InterchangeError, read_text};
use crate::models::{Block, Image, TreeNode};
use crate::store::validate_tree;

pub const BUNDLE_FILENAME: &str = "mdlc-export.json";

/// Snapshot of every workspace slice, as written by a full export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub tree: TreeNode,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub export_date: DateTime<Utc>,
}

impl ExportBundle {
    pub fn new(tree: TreeNode, blocks: Vec<Block>, images: Vec<Image>) -> Self {
        Self {
            tree,
            blocks,
            images,
            export_date: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, InterchangeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, InterchangeError> {
        let bundle: Self = serde_json::from_str(json)?;
        validate_tree(&bundle.tree)?;
        Ok(bundle)
    }
}

pub fn read_bundle(path: &Path) -> Result<ExportBundle, InterchangeError> {
    ExportBundle::from_json(&read_text(path)?)
}
