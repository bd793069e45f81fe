//! `{{block(id)}}` and `{{image(id)}}` token handling.
//!
//! Block tokens are substituted first, in a single pass, so a block's content
//! is never scanned for further block tokens but is scanned for image tokens.
//! Unknown ids resolve to the empty string.

use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::OnceLock;

use crate::models::{Block, Image};

fn block_token() -> &'static Regex {
    static BLOCK_TOKEN: OnceLock<Regex> = OnceLock::new();
    BLOCK_TOKEN
        .get_or_init(|| Regex::new(r"\{\{block\(([^()]+)\)\}\}").expect("Invalid block token regex"))
}

fn image_token() -> &'static Regex {
    static IMAGE_TOKEN: OnceLock<Regex> = OnceLock::new();
    IMAGE_TOKEN
        .get_or_init(|| Regex::new(r"\{\{image\(([^()]+)\)\}\}").expect("Invalid image token regex"))
}

/// Substitute block tokens, then image tokens
pub fn resolve_placeholders(text: &str, blocks: &[Block], images: &[Image]) -> String {
    let with_blocks = replace_block_placeholders(text, blocks);
    replace_image_placeholders(&with_blocks, images)
}

pub fn replace_block_placeholders(text: &str, blocks: &[Block]) -> String {
    block_token()
        .replace_all(text, |caps: &Captures| {
            blocks
                .iter()
                .find(|b| b.id == caps[1])
                .map(|b| b.content.clone())
                .unwrap_or_default()
        })
        .into_owned()
}

pub fn replace_image_placeholders(text: &str, images: &[Image]) -> String {
    image_token()
        .replace_all(text, |caps: &Captures| {
            let Some(image) = images.iter().find(|img| img.id == caps[1]) else {
                return String::new();
            };
            let Some(src) = image.source() else {
                return String::new();
            };
            let alt = if image.name.is_empty() {
                "image"
            } else {
                image.name.as_str()
            };
            format!("![{alt}]({src})")
        })
        .into_owned()
}

/// Ids of every block token, in order of appearance
pub fn extract_block_references(text: &str) -> Vec<&str> {
    block_token()
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .collect()
}

pub fn block_placeholder(id: &str) -> String {
    format!("{{{{block({id})}}}}")
}

pub fn image_placeholder(id: &str) -> String {
    format!("{{{{image({id})}}}}")
}

/// Replace the byte range `selection` of `text` with `insert`.
///
/// Returns the new text and the caret offset just past the inserted text.
/// Bounds past the end are clamped to the end, and bounds inside a
/// multi-byte character are moved back to its start.
pub fn insert_at(text: &str, selection: Range<usize>, insert: &str) -> (String, usize) {
    let start = floor_char_boundary(text, selection.start);
    let end = floor_char_boundary(text, selection.end).max(start);

    let mut result = String::with_capacity(text.len() - (end - start) + insert.len());
    result.push_str(&text[..start]);
    result.push_str(insert);
    result.push_str(&text[end..]);
    (result, start + insert.len())
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
