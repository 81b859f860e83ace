//! Paged documents: PDF.

use super::BlockExtractor;
use crate::Result;
use crate::core::config::ConversionConfig;
use crate::core::format::FileType;
use crate::types::Block;
use async_trait::async_trait;

/// Extractor for PDF.
///
/// The text layer is used when any page has one. A PDF without a text layer
/// goes through the configured text command, and fails as unavailable when
/// none is configured.
pub struct PageImageExtractor;

#[async_trait]
impl BlockExtractor for PageImageExtractor {
    fn name(&self) -> &'static str {
        "page-image"
    }

    #[cfg(feature = "pdf")]
    async fn extract(&self, _file_type: FileType, content: &[u8], config: &ConversionConfig) -> Result<Vec<Block>> {
        use super::run_blocking;
        use crate::DocdownError;
        use crate::assets::ImageEmbedder;
        use crate::extraction::{apply_external_text, has_text_layer, pages_to_blocks, read_pdf, run_text_command};

        let data = content.to_vec();
        let extract_images = config.images.embed && config.pdf.extract_images;
        let mut pages = run_blocking("pdf", move || read_pdf(&data, extract_images)).await?;

        if !pages.is_empty() && !has_text_layer(&pages) {
            let Some(command) = &config.pdf.text_command else {
                return Err(DocdownError::conversion_unavailable(
                    "PDF has no text layer and no pdf.text_command is configured",
                ));
            };
            tracing::debug!(pages = pages.len(), "PDF has no text layer, using the text command");
            let text = run_text_command(content, command, config.pdf.timeout_secs).await?;
            apply_external_text(&mut pages, &text);
        }

        let embedder = ImageEmbedder::new(config.images.clone());
        run_blocking("pdf", move || pages_to_blocks(pages, &embedder)).await
    }

    #[cfg(not(feature = "pdf"))]
    async fn extract(&self, file_type: FileType, _content: &[u8], _config: &ConversionConfig) -> Result<Vec<Block>> {
        Err(super::feature_disabled(file_type, "pdf"))
    }
}
