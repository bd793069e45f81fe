use uuid::Uuid;

pub const FILE_PREFIX: &str = "file";
pub const FOLDER_PREFIX: &str = "folder";
pub const BLOCK_PREFIX: &str = "block";
pub const IMAGE_PREFIX: &str = "image";

/// Mint a fresh `<prefix>-<uuid>` identifier
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}
