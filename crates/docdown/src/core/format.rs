//! File type detection.
//!
//! Maps a filename extension to one of the supported [`FileType`]s and groups
//! those into the four [`FormatFamily`] variants the extractors are built for.

use crate::{DocdownError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

pub const DOCX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const POWER_POINT_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation";
pub const LEGACY_POWERPOINT_MIME_TYPE: &str = "application/vnd.ms-powerpoint";
pub const EXCEL_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const EXCEL_BINARY_MIME_TYPE: &str = "application/vnd.ms-excel";
pub const EXCEL_MACRO_MIME_TYPE: &str = "application/vnd.ms-excel.sheet.macroEnabled.12";
pub const PDF_MIME_TYPE: &str = "application/pdf";
pub const MARKDOWN_MIME_TYPE: &str = "text/markdown";

/// Every extension the detector accepts, lowercase and without the dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["docx", "xlsx", "xls", "xlsm", "pptx", "ppt", "pdf", "md", "markdown"];

/// Structural category an extractor is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatFamily {
    FlowDocument,
    Spreadsheet,
    PageImage,
    Passthrough,
}

/// A supported input file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Docx,
    Xlsx,
    Xls,
    Xlsm,
    Pptx,
    Ppt,
    Pdf,
    Markdown,
}

impl FileType {
    /// Detect the file type from a filename or path. Matching is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns `DocdownError::UnsupportedFormat` when the extension is missing or unknown.
    pub fn from_filename(filename: impl AsRef<Path>) -> Result<Self> {
        let path = filename.as_ref();
        let extension = path.extension().and_then(|ext| ext.to_str()).ok_or_else(|| {
            DocdownError::UnsupportedFormat(format!("Could not determine extension of '{}'", path.display()))
        })?;

        Self::from_extension(extension)
    }

    /// Resolve an extension with or without the leading dot.
    pub fn from_extension(extension: &str) -> Result<Self> {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();

        let file_type = match normalized.as_str() {
            "docx" => FileType::Docx,
            "xlsx" => FileType::Xlsx,
            "xls" => FileType::Xls,
            "xlsm" => FileType::Xlsm,
            "pptx" => FileType::Pptx,
            "ppt" => FileType::Ppt,
            "pdf" => FileType::Pdf,
            "md" | "markdown" => FileType::Markdown,
            _ => {
                return Err(DocdownError::UnsupportedFormat(format!(
                    "Unknown extension: .{} (supported: {})",
                    normalized,
                    SUPPORTED_EXTENSIONS.join(", ")
                )));
            }
        };

        Ok(file_type)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Docx => "docx",
            FileType::Xlsx => "xlsx",
            FileType::Xls => "xls",
            FileType::Xlsm => "xlsm",
            FileType::Pptx => "pptx",
            FileType::Ppt => "ppt",
            FileType::Pdf => "pdf",
            FileType::Markdown => "markdown",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            FileType::Docx => DOCX_MIME_TYPE,
            FileType::Xlsx => EXCEL_MIME_TYPE,
            FileType::Xls => EXCEL_BINARY_MIME_TYPE,
            FileType::Xlsm => EXCEL_MACRO_MIME_TYPE,
            FileType::Pptx => POWER_POINT_MIME_TYPE,
            FileType::Ppt => LEGACY_POWERPOINT_MIME_TYPE,
            FileType::Pdf => PDF_MIME_TYPE,
            FileType::Markdown => MARKDOWN_MIME_TYPE,
        }
    }

    pub fn family(self) -> FormatFamily {
        match self {
            FileType::Docx | FileType::Pptx | FileType::Ppt => FormatFamily::FlowDocument,
            FileType::Xlsx | FileType::Xls | FileType::Xlsm => FormatFamily::Spreadsheet,
            FileType::Pdf => FormatFamily::PageImage,
            FileType::Markdown => FormatFamily::Passthrough,
        }
    }

    /// Binary formats that may need normalization by an external converter.
    pub fn is_legacy(self) -> bool {
        matches!(self, FileType::Ppt | FileType::Xls)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best-effort extension of a filename, used to label errors for unsupported input.
pub fn attempted_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "unknown".to_string())
}

/// True when the bytes start with a local ZIP file header (every OOXML container does).
pub fn looks_like_zip(content: &[u8]) -> bool {
    content.starts_with(b"PK\x03\x04")
}
