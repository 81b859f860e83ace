//! Conversion entry points.
//!
//! Format detection, extractor selection, rendering and timing. Every error
//! leaving this module carries the filename and the detected (or attempted)
//! format.

use crate::core::config::ConversionConfig;
use crate::core::format::{FileType, attempted_extension};
use crate::extractors::extractor_for;
use crate::render::render_markdown;
use crate::types::ConversionResult;
use crate::{DocdownError, Result};
use once_cell::sync::Lazy;
use std::path::Path;
use std::time::Instant;

/// Runtime behind the blocking wrappers, created on first use.
static GLOBAL_RUNTIME: Lazy<std::io::Result<tokio::runtime::Runtime>> =
    Lazy::new(|| tokio::runtime::Builder::new_multi_thread().enable_all().build());

/// Convert a document to Markdown.
///
/// The format is chosen from the extension of `filename`.
///
/// # Errors
///
/// Any [`DocdownError`], wrapped with the filename and format. Use
/// [`DocdownError::kind`] to classify it.
///
/// # Example
///
/// ```rust,no_run
/// use docdown::{ConversionConfig, convert};
///
/// # async fn example() -> docdown::Result<()> {
/// let result = convert("notes.md", b"# Title\ntext", &ConversionConfig::default()).await?;
/// assert_eq!(result.markdown, "# Title\ntext");
/// # Ok(())
/// # }
/// ```
#[tracing::instrument(skip(content, config), fields(size = content.len()))]
pub async fn convert(filename: &str, content: &[u8], config: &ConversionConfig) -> Result<ConversionResult> {
    let file_type =
        FileType::from_filename(filename).map_err(|e| e.with_context(filename, attempted_extension(filename)))?;

    let started = Instant::now();
    let extractor = extractor_for(file_type.family());
    tracing::debug!(extractor = extractor.name(), file_type = file_type.as_str(), "Selected extractor");

    let blocks = extractor
        .extract(file_type, content, config)
        .await
        .map_err(|e| e.with_context(filename, file_type.as_str()))?;
    let markdown = render_markdown(&blocks);
    let elapsed = started.elapsed().as_secs_f64();

    tracing::info!(
        file_type = file_type.as_str(),
        blocks = blocks.len(),
        elapsed_ms = (elapsed * 1000.0).round() as u64,
        "Converted document"
    );

    Ok(ConversionResult::new(filename, file_type, markdown, elapsed))
}

/// Read a file and convert it. The result carries the file name without its directory.
pub async fn convert_file(path: impl AsRef<Path>, config: &ConversionConfig) -> Result<ConversionResult> {
    let path = path.as_ref();
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let file_type =
        FileType::from_filename(&filename).map_err(|e| e.with_context(&filename, attempted_extension(&filename)))?;

    let content = tokio::fs::read(path)
        .await
        .map_err(|e| DocdownError::from(e).with_context(&filename, file_type.as_str()))?;

    convert(&filename, &content, config).await
}

/// Blocking wrapper for [`convert`].
///
/// Must not be called from inside an async runtime.
pub fn convert_sync(filename: &str, content: &[u8], config: &ConversionConfig) -> Result<ConversionResult> {
    runtime()?.block_on(convert(filename, content, config))
}

/// Blocking wrapper for [`convert_file`].
pub fn convert_file_sync(path: impl AsRef<Path>, config: &ConversionConfig) -> Result<ConversionResult> {
    runtime()?.block_on(convert_file(path, config))
}

fn runtime() -> Result<&'static tokio::runtime::Runtime> {
    GLOBAL_RUNTIME
        .as_ref()
        .map_err(|e| DocdownError::Other(format!("Failed to create Tokio runtime: {}", e)))
}
