//! File interchange: `.md` notes, `.part.mdlc` / `.parts.mdlc` blocks,
//! image arrays, image uploads and the full export bundle.

use std::fs;
use std::path::{Path, PathBuf};

use crate::store::TreeError;

pub mod blocks;
pub mod bundle;
pub mod images;

pub use blocks::{
    BLOCK_EXTENSION, BLOCKS_EXPORT_FILENAME, BLOCKS_EXTENSION, block_export_filename,
    export_block_json, export_blocks_json, import_block_file, import_blocks_file, parse_block,
    parse_blocks,
};
pub use bundle::{BUNDLE_FILENAME, ExportBundle, read_bundle};
pub use images::{
    MAX_IMAGE_BYTES, encode_data_url, image_mime_type, import_images_file, parse_images,
    read_image_upload,
};

pub const MARKDOWN_EXTENSION: &str = ".md";

#[derive(Debug, thiserror::Error)]
pub enum InterchangeError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{path} must be a {expected} file")]
    WrongExtension {
        path: PathBuf,
        expected: &'static str,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a JSON array of {0}")]
    NotAnArray(&'static str),
    #[error("Invalid block, a block needs a name and a content: {0}")]
    InvalidBlock(String),
    #[error("Block at index {index} is invalid: {reason}")]
    InvalidBlockAt { index: usize, reason: String },
    #[error("Image at index {index} is invalid: {reason}")]
    InvalidImageAt { index: usize, reason: String },
    #[error("{0} is not an image")]
    NotAnImage(PathBuf),
    #[error("Image is too large ({size} bytes, max {max})")]
    ImageTooLarge { size: u64, max: u64 },
    #[error("Image name is required")]
    EmptyImageName,
    #[error("Invalid tree: {0}")]
    InvalidTree(#[from] TreeError),
    #[error("{0} is empty, nothing to export")]
    EmptyFile(String),
}

/// Reject paths whose file name does not end with `suffix`
pub(crate) fn require_suffix(path: &Path, suffix: &'static str) -> Result<(), InterchangeError> {
    let matches = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(suffix));
    if matches {
        Ok(())
    } else {
        Err(InterchangeError::WrongExtension {
            path: path.to_path_buf(),
            expected: suffix,
        })
    }
}

/// Read a whole text file
pub fn read_text(path: &Path) -> Result<String, InterchangeError> {
    if !path.exists() {
        return Err(InterchangeError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(InterchangeError::Io)
}

/// Content of a `.md` file
pub fn import_markdown_file(path: &Path) -> Result<String, InterchangeError> {
    require_suffix(path, MARKDOWN_EXTENSION)?;
    read_text(path)
}

/// File name to export a note under: characters that are invalid in file
/// names are dropped and `.md` is appended when missing
pub fn markdown_export_filename(name: &str) -> String {
    let cleaned = sanitize_filename(name);

    if cleaned.is_empty() {
        "document.md".to_string()
    } else if cleaned.ends_with(MARKDOWN_EXTENSION) {
        cleaned
    } else {
        format!("{cleaned}{MARKDOWN_EXTENSION}")
    }
}

/// `name` without the characters most file systems reject, trimmed
pub(crate) fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Write `content` to `dir/filename`, creating `dir` when needed
pub fn write_export(dir: &Path, filename: &str, content: &str) -> Result<PathBuf, InterchangeError> {
    fs::create_dir_all(dir).map_err(InterchangeError::Io)?;
    let path = dir.join(filename);
    fs::write(&path, content).map_err(InterchangeError::Io)?;
    log::info!("Exported {}", path.display());
    Ok(path)
}
