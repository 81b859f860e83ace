//! Format-family extractors.
//!
//! One extractor per [`FormatFamily`]. Extractors run the synchronous readers
//! from [`crate::extraction`] on the blocking pool and drive the external
//! collaborators (LibreOffice, the PDF text command) when a reader cannot
//! handle the input directly.

use crate::core::config::ConversionConfig;
use crate::core::format::{FileType, FormatFamily};
use crate::types::Block;
use crate::{DocdownError, Result};
use async_trait::async_trait;

pub mod flow;
pub mod markdown;
pub mod pdf;
pub mod spreadsheet;

pub use flow::FlowDocumentExtractor;
pub use markdown::PassthroughExtractor;
pub use pdf::PageImageExtractor;
pub use spreadsheet::SpreadsheetExtractor;

/// Turns the bytes of one format family into blocks.
#[async_trait]
pub trait BlockExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Extract blocks from `content`, whose format has already been detected as `file_type`.
    async fn extract(&self, file_type: FileType, content: &[u8], config: &ConversionConfig) -> Result<Vec<Block>>;
}

/// The extractor responsible for a family.
pub fn extractor_for(family: FormatFamily) -> &'static dyn BlockExtractor {
    match family {
        FormatFamily::FlowDocument => &FlowDocumentExtractor,
        FormatFamily::Spreadsheet => &SpreadsheetExtractor,
        FormatFamily::PageImage => &PageImageExtractor,
        FormatFamily::Passthrough => &PassthroughExtractor,
    }
}

/// Run a reader on the blocking pool, keeping the caller's span.
///
/// A panicking reader is reported as malformed input.
pub(crate) async fn run_blocking<T, F>(label: &'static str, reader: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let span = tracing::Span::current();
    tokio::task::spawn_blocking(move || {
        let _guard = span.entered();
        reader()
    })
    .await
    .map_err(|e| {
        if e.is_panic() {
            tracing::error!(reader = label, "Reader panicked");
            DocdownError::malformed_input(format!("{} reader panicked on this input", label))
        } else {
            DocdownError::Other(format!("{} reader task was cancelled", label))
        }
    })?
}

/// Error for a family whose crate feature is compiled out.
#[allow(dead_code)]
pub(crate) fn feature_disabled(file_type: FileType, feature: &str) -> DocdownError {
    DocdownError::conversion_unavailable(format!(
        "{} support requires the '{}' feature",
        file_type.as_str(),
        feature
    ))
}
