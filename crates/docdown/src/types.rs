//! Document model shared by every extractor and the renderer.

use crate::core::format::FileType;
use serde::{Deserialize, Serialize};

/// A styled span of text inside a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineRun {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl InlineRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
            italic: false,
        }
    }

    pub fn styled(text: impl Into<String>, bold: bool, italic: bool) -> Self {
        Self {
            text: text.into(),
            bold,
            italic,
        }
    }

    pub fn same_style(&self, other: &InlineRun) -> bool {
        self.bold == other.bold && self.italic == other.italic
    }
}

/// Table cells are run sequences, like paragraphs.
pub type TableCell = Vec<InlineRun>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub rows: Vec<Vec<TableCell>>,
    /// The first row is a header row.
    #[serde(default)]
    pub header: bool,
}

impl Table {
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// A base64 image ready to be written as a `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedImage {
    pub mime_type: String,
    pub base64_payload: String,
}

impl EncodedImage {
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64_payload)
    }
}

/// One unit of the intermediate representation, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        runs: Vec<InlineRun>,
    },
    Paragraph {
        runs: Vec<InlineRun>,
    },
    /// A list entry. `depth` starts at 0 for top-level items.
    ListItem {
        depth: u8,
        ordered: bool,
        runs: Vec<InlineRun>,
    },
    Table(Table),
    Image {
        image: EncodedImage,
        alt: String,
    },
    PageBreak,
    /// Already-valid Markdown, emitted verbatim.
    Raw {
        markdown: String,
    },
}

impl Block {
    /// Heading with the level clamped to 1..=6.
    pub fn heading(level: u8, runs: Vec<InlineRun>) -> Self {
        Block::Heading {
            level: level.clamp(1, 6),
            runs,
        }
    }

    pub fn paragraph(runs: Vec<InlineRun>) -> Self {
        Block::Paragraph { runs }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Block::Paragraph {
            runs: vec![InlineRun::plain(text)],
        }
    }
}

/// Outcome of one conversion. Serialized with the wire name `parsed_md_content` for the Markdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    pub filename: String,
    pub file_type: FileType,
    #[serde(rename = "parsed_md_content")]
    pub markdown: String,
    /// Seconds, rounded to milliseconds.
    pub processing_time: f64,
}

impl ConversionResult {
    pub fn new(filename: impl Into<String>, file_type: FileType, markdown: String, elapsed_secs: f64) -> Self {
        let processing_time = if elapsed_secs.is_finite() && elapsed_secs > 0.0 {
            (elapsed_secs * 1000.0).round() / 1000.0
        } else {
            0.0
        };

        Self {
            filename: filename.into(),
            file_type,
            markdown,
            processing_time,
        }
    }
}
