//! Markdown passthrough.

use super::BlockExtractor;
use crate::Result;
use crate::core::config::ConversionConfig;
use crate::core::format::FileType;
use crate::extraction::extract_markdown_blocks;
use crate::types::Block;
use async_trait::async_trait;

pub struct PassthroughExtractor;

#[async_trait]
impl BlockExtractor for PassthroughExtractor {
    fn name(&self) -> &'static str {
        "passthrough"
    }

    async fn extract(&self, _file_type: FileType, content: &[u8], config: &ConversionConfig) -> Result<Vec<Block>> {
        extract_markdown_blocks(content, &config.markdown, &config.images)
    }
}
