//! Spreadsheets: XLSX, XLSM and XLS.

use super::BlockExtractor;
use crate::Result;
use crate::core::config::ConversionConfig;
use crate::core::format::FileType;
use crate::types::Block;
use async_trait::async_trait;

/// Extractor for workbooks.
///
/// `.xls` and `.xlsm` are read directly first. When the workbook itself cannot
/// be parsed they are normalized to XLSX through LibreOffice and read again.
/// Image failures are returned as is, and a failing `.xlsx` is reported as malformed.
pub struct SpreadsheetExtractor;

#[async_trait]
impl BlockExtractor for SpreadsheetExtractor {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    #[cfg(feature = "excel")]
    async fn extract(&self, file_type: FileType, content: &[u8], config: &ConversionConfig) -> Result<Vec<Block>> {
        use super::run_blocking;
        use crate::assets::ImageEmbedder;
        use crate::extraction::{extract_workbook_blocks, normalize_with_libreoffice};

        let embedder = ImageEmbedder::new(config.images.clone());

        let data = content.to_vec();
        let direct_embedder = embedder.clone();
        let direct = run_blocking("workbook", move || extract_workbook_blocks(&data, file_type, &direct_embedder)).await;

        match direct {
            Ok(blocks) => Ok(blocks),
            Err(err)
                if matches!(file_type, FileType::Xls | FileType::Xlsm)
                    && err.kind() == crate::error::ErrorKind::MalformedInput =>
            {
                tracing::debug!(
                    file_type = file_type.as_str(),
                    error = %err,
                    "Direct workbook read failed, normalizing with LibreOffice"
                );
                let converted =
                    normalize_with_libreoffice(content, file_type.as_str(), "xlsx", &config.libreoffice).await?;
                run_blocking("workbook", move || {
                    extract_workbook_blocks(&converted, FileType::Xlsx, &embedder)
                })
                .await
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(feature = "excel"))]
    async fn extract(&self, file_type: FileType, _content: &[u8], _config: &ConversionConfig) -> Result<Vec<Block>> {
        Err(super::feature_disabled(file_type, "excel"))
    }
}
