//! Flow documents: DOCX, PPTX and legacy PPT.

use super::BlockExtractor;
use crate::Result;
use crate::core::config::ConversionConfig;
use crate::core::format::FileType;
use crate::types::Block;
use async_trait::async_trait;

/// Extractor for word-processing documents and presentations.
///
/// A `.ppt` that is really a ZIP container is read as PPTX. Any other `.ppt`
/// is normalized to PPTX through LibreOffice first.
pub struct FlowDocumentExtractor;

#[async_trait]
impl BlockExtractor for FlowDocumentExtractor {
    fn name(&self) -> &'static str {
        "flow-document"
    }

    #[cfg(feature = "office")]
    async fn extract(&self, file_type: FileType, content: &[u8], config: &ConversionConfig) -> Result<Vec<Block>> {
        use super::run_blocking;
        use crate::assets::ImageEmbedder;
        use crate::core::format::looks_like_zip;
        use crate::extraction::{extract_docx_blocks, extract_pptx_blocks, normalize_with_libreoffice};

        let embedder = ImageEmbedder::new(config.images.clone());

        match file_type {
            FileType::Docx => {
                let data = content.to_vec();
                run_blocking("docx", move || extract_docx_blocks(&data, &embedder)).await
            }
            FileType::Pptx => {
                let data = content.to_vec();
                run_blocking("pptx", move || extract_pptx_blocks(&data, &embedder)).await
            }
            FileType::Ppt => {
                let data = if looks_like_zip(content) {
                    tracing::debug!("Legacy .ppt is an OOXML container, reading it directly");
                    content.to_vec()
                } else {
                    normalize_with_libreoffice(content, "ppt", "pptx", &config.libreoffice).await?
                };
                run_blocking("pptx", move || extract_pptx_blocks(&data, &embedder)).await
            }
            other => Err(crate::DocdownError::UnsupportedFormat(format!(
                "{} is not a flow document",
                other.as_str()
            ))),
        }
    }

    #[cfg(not(feature = "office"))]
    async fn extract(&self, file_type: FileType, _content: &[u8], _config: &ConversionConfig) -> Result<Vec<Block>> {
        Err(super::feature_disabled(file_type, "office"))
    }
}
