use pulldown_cmark::{Options, Parser, html};
use std::panic::{self, AssertUnwindSafe};

use crate::models::{Block, Image};
use crate::placeholder::resolve_placeholders;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Markdown renderer failed: {0}")]
    Failed(String),
    #[error("Markdown renderer panicked: {0}")]
    Panicked(String),
}

pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

/// CommonMark with tables, strikethrough and task lists
#[derive(Debug, Default)]
pub struct PulldownRenderer;

impl PulldownRenderer {
    pub fn new() -> Self {
        Self
    }

    fn options() -> Options {
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
    }
}

impl MarkdownRenderer for PulldownRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let parser = Parser::new_ext(markdown, Self::options());
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        Ok(out)
    }
}

/// Render through `renderer`, returning `markdown` unchanged on any fault
pub fn render_markdown(renderer: &dyn MarkdownRenderer, markdown: &str) -> String {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| renderer.render(markdown)))
        .unwrap_or_else(|payload| Err(RenderError::Panicked(panic_message(payload.as_ref()))));

    match outcome {
        Ok(html) => html,
        Err(e) => {
            log::warn!("Falling back to raw text: {e}");
            markdown.to_string()
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Resolve placeholders and render the result with the default renderer
pub fn render_preview(text: &str, blocks: &[Block], images: &[Image]) -> String {
    let resolved = resolve_placeholders(text, blocks, images);
    render_markdown(&PulldownRenderer::new(), &resolved)
}
