//! docdown - document to Markdown conversion
//!
//! docdown turns office documents, spreadsheets, PDFs and Markdown into a
//! single normalized Markdown string. Images found in the source are embedded
//! inline as base64 `data:` URIs, so the output is self-contained.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docdown::{ConversionConfig, convert_file_sync};
//!
//! # fn main() -> docdown::Result<()> {
//! let config = ConversionConfig::default();
//! let result = convert_file_sync("quarterly.xlsx", &config)?;
//! println!("{}", result.markdown);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core** (`core`): entry points, format detection and configuration
//! - **Extractors** (`extractors`): one extractor per format family, each
//!   producing a list of [`Block`]s
//! - **Extraction** (`extraction`): the format readers behind the extractors,
//!   plus the LibreOffice and external-command plumbing
//! - **Rendering** (`render`): blocks to Markdown
//! - **Assets** (`assets`): image encoding and the embedding policy
//!
//! # Features
//!
//! - `office` (default): DOCX, PPTX and PPT
//! - `excel` (default): XLSX, XLSM and XLS
//! - `pdf` (default): PDF text layer and embedded images
//! - `api`: HTTP server exposing `POST /v1/parse-file`

#![deny(unsafe_code)]

pub mod assets;
pub mod core;
pub mod error;
pub mod extraction;
pub mod extractors;
pub mod render;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

pub use error::{DocdownError, ErrorKind, Result};

pub use core::config::{
    ConversionConfig, ExternalCommand, ImageConfig, ImageFailurePolicy, LibreOfficeConfig, MarkdownConfig, PdfConfig,
};
pub use core::converter::{convert, convert_file, convert_file_sync, convert_sync};
pub use core::format::{FileType, FormatFamily, SUPPORTED_EXTENSIONS};

pub use assets::{ImageEmbedder, encode_image};
pub use render::render_markdown;
pub use types::{Block, ConversionResult, EncodedImage, InlineRun, Table};
