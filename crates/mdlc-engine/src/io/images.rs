use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::{InterchangeError, read_text};
use crate::models::ids::IMAGE_PREFIX;
use crate::models::{Image, new_id};
use crate::store::NewImage;

/// Largest accepted upload, 5 MiB
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl ImageRecord {
    fn into_image(self) -> Image {
        let now = Utc::now();
        Image {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| new_id(IMAGE_PREFIX)),
            name: self
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| format!("image-{}", now.timestamp_millis())),
            data: self.data.filter(|d| !d.is_empty()),
            url: self.url.filter(|u| !u.is_empty()),
            created_at: self.created_at.unwrap_or(now),
        }
    }
}

/// Parse a JSON array of image-shaped objects, filling in missing fields
pub fn parse_images(json: &str) -> Result<Vec<Image>, InterchangeError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let serde_json::Value::Array(items) = value else {
        return Err(InterchangeError::NotAnArray("images"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<ImageRecord>(item)
                .map(ImageRecord::into_image)
                .map_err(|e| InterchangeError::InvalidImageAt {
                    index,
                    reason: e.to_string(),
                })
        })
        .collect()
}

pub fn import_images_file(path: &Path) -> Result<Vec<Image>, InterchangeError> {
    parse_images(&read_text(path)?)
}

/// MIME type for an image file extension
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime)
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Load an image from disk as an inline data URL.
///
/// `name` overrides the file name as the library name.
pub fn read_image_upload(path: &Path, name: Option<&str>) -> Result<NewImage, InterchangeError> {
    let mime = image_mime_type(path).ok_or_else(|| InterchangeError::NotAnImage(path.to_path_buf()))?;

    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(InterchangeError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(InterchangeError::Io(e)),
    };
    if size > MAX_IMAGE_BYTES {
        return Err(InterchangeError::ImageTooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        });
    }

    let name = name
        .map(str::to_string)
        .or_else(|| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or(InterchangeError::EmptyImageName)?;

    let bytes = fs::read(path)?;
    Ok(NewImage {
        name: Some(name),
        data: Some(encode_data_url(mime, &bytes)),
        url: None,
    })
}
