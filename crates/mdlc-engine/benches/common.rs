// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use chrono::Utc;
use mdlc_engine::{Block, BlockType, Image};

#[allow(dead_code)]
pub fn generate_blocks(count: usize) -> Vec<Block> {
    let now = Utc::now();
    (0..count)
        .map(|i| Block {
            id: format!("block-{i}"),
            name: format!("Block {i}"),
            content: format!("**Block {i}** with an image {{{{image(image-{})}}}}\n", i % 4),
            shortcut: None,
            block_type: BlockType::Markdown,
            created_at: now,
            updated_at: now,
        })
        .collect()
}

#[allow(dead_code)]
pub fn generate_images(count: usize) -> Vec<Image> {
    (0..count)
        .map(|i| Image {
            id: format!("image-{i}"),
            name: format!("pic {i}"),
            data: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
            url: None,
            created_at: Utc::now(),
        })
        .collect()
}

/// A note of `sections` sections, each referencing one of `block_count` blocks
#[allow(dead_code)]
pub fn generate_note(sections: usize, block_count: usize) -> String {
    let mut content = String::new();
    for section in 0..sections {
        content.push_str(&format!("# Section {section}\n\n"));
        content.push_str("Paragraph with *some* content and a [link](https://example.com).\n\n");
        content.push_str(&format!(
            "{{{{block(block-{})}}}}\n\n",
            section % block_count.max(1)
        ));
        content.push_str("- [x] done\n- [ ] todo\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n");
    }
    content
}
