//! Format readers.
//!
//! Each reader turns the bytes of one format into blocks. They are synchronous
//! and stateless; the async extractors in [`crate::extractors`] schedule them
//! and run the external collaborators.

pub mod markdown;
pub mod process;

#[cfg(feature = "office")]
pub mod ooxml;

#[cfg(feature = "office")]
pub mod docx;

#[cfg(feature = "office")]
pub mod pptx;

#[cfg(feature = "office")]
pub mod libreoffice;

#[cfg(feature = "excel")]
pub mod excel;

#[cfg(feature = "pdf")]
pub mod pdf;

pub use markdown::{extract_markdown_blocks, normalize_markdown};
pub use process::{ScratchDir, run_with_timeout};

#[cfg(feature = "office")]
pub use docx::extract_docx_blocks;

#[cfg(feature = "office")]
pub use pptx::extract_pptx_blocks;

#[cfg(feature = "office")]
pub use libreoffice::{locate_soffice_binary, normalize_with_libreoffice};

#[cfg(feature = "excel")]
pub use excel::{SheetData, extract_workbook_blocks, format_cell_value, read_workbook};

#[cfg(feature = "pdf")]
pub use pdf::{PdfImage, PdfPage, apply_external_text, has_text_layer, pages_to_blocks, read_pdf, run_text_command};
