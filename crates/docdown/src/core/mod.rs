//! Conversion orchestration.
//!
//! Entry points ([`convert`], [`convert_file`] and their blocking wrappers),
//! format detection and configuration loading.
//!
//! # Example
//!
//! ```rust,no_run
//! use docdown::core::config::ConversionConfig;
//! use docdown::core::converter::convert_file;
//!
//! # async fn example() -> docdown::Result<()> {
//! let config = ConversionConfig::discover()?.unwrap_or_default();
//! let result = convert_file("report.xlsx", &config).await?;
//! println!("{}", result.markdown);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod converter;
pub mod format;

pub use config::{
    ConversionConfig, ExternalCommand, ImageConfig, ImageFailurePolicy, LibreOfficeConfig, MarkdownConfig, PdfConfig,
};
pub use converter::{convert, convert_file, convert_file_sync, convert_sync};
pub use format::{FileType, FormatFamily, SUPPORTED_EXTENSIONS};
