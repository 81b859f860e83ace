//! Markdown passthrough.
//!
//! Markdown input is already in the target format: it is decoded, line endings
//! are normalized to `\n`, and the text is emitted as one raw block.

use crate::core::config::{ImageConfig, MarkdownConfig};
use crate::types::Block;
use crate::{DocdownError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static IMAGE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"!\[[^\]]*\]\(\s*<?([^)\s>]+)>?(?:\s+"[^"]*")?\s*\)"#)
        .expect("Markdown image link regex pattern is valid and should compile")
});

/// Normalize Markdown text.
///
/// With `strip_external_images` set, image links are removed unless they are
/// `data:` URIs of a type `images` allows.
pub fn normalize_markdown(text: &str, config: &MarkdownConfig, images: &ImageConfig) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    if !config.strip_external_images {
        return normalized;
    }

    IMAGE_LINK
        .replace_all(&normalized, |captures: &regex::Captures<'_>| {
            let keep = captures[1]
                .strip_prefix("data:")
                .and_then(|rest| rest.split([';', ',']).next())
                .is_some_and(|mime_type| images.allows(mime_type));
            if keep { captures[0].to_string() } else { String::new() }
        })
        .into_owned()
}

/// Extract the single raw block of a Markdown document.
pub fn extract_markdown_blocks(data: &[u8], config: &MarkdownConfig, images: &ImageConfig) -> Result<Vec<Block>> {
    let text = std::str::from_utf8(data)
        .map_err(|e| DocdownError::malformed_input_with_source("Markdown input is not valid UTF-8", e))?;

    Ok(vec![Block::Raw {
        markdown: normalize_markdown(text, config, images),
    }])
}
