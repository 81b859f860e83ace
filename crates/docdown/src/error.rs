//! Error types for docdown.
//!
//! Every fallible operation returns [`DocdownError`]. Extractors raise the bare
//! taxonomy variants (`MalformedInput`, `ConversionUnavailable`, ...) and the
//! conversion orchestrator wraps whatever escapes with [`DocdownError::Conversion`]
//! so the caller always learns which file and which format failed.
//!
//! # Example
//!
//! ```rust
//! use docdown::{DocdownError, ErrorKind};
//!
//! let err = DocdownError::malformed_input("truncated central directory")
//!     .with_context("deck.pptx", "pptx");
//!
//! assert_eq!(err.kind(), ErrorKind::MalformedInput);
//! assert_eq!(err.filename(), Some("deck.pptx"));
//! assert!(err.kind().is_client_error());
//! ```
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using `DocdownError`.
pub type Result<T> = std::result::Result<T, DocdownError>;

/// Main error type for all docdown operations.
#[derive(Debug, Error)]
pub enum DocdownError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Malformed input: {message}")]
    MalformedInput {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Conversion unavailable: {message}")]
    ConversionUnavailable {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Conversion timed out after {timeout_secs}s: {message}")]
    ConversionTimeout { message: String, timeout_secs: u64 },

    #[error("Encoding failure: {message}")]
    EncodingFailure {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Failed to convert '{filename}' ({format}): {source}")]
    Conversion {
        filename: String,
        format: String,
        #[source]
        source: Box<DocdownError>,
    },

    #[error("{0}")]
    Other(String),
}

/// Flat classification of a [`DocdownError`], independent of context wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedFormat,
    MalformedInput,
    ConversionUnavailable,
    ConversionTimeout,
    EncodingFailure,
    Io,
    Validation,
    Serialization,
    Other,
}

impl ErrorKind {
    /// Errors caused by what the caller sent rather than by the server's capabilities.
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            ErrorKind::UnsupportedFormat | ErrorKind::MalformedInput | ErrorKind::Validation
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UnsupportedFormat => "UnsupportedFormat",
            ErrorKind::MalformedInput => "MalformedInput",
            ErrorKind::ConversionUnavailable => "ConversionUnavailable",
            ErrorKind::ConversionTimeout => "ConversionTimeout",
            ErrorKind::EncodingFailure => "EncodingFailure",
            ErrorKind::Io => "Io",
            ErrorKind::Validation => "Validation",
            ErrorKind::Serialization => "Serialization",
            ErrorKind::Other => "Other",
        }
    }
}

#[cfg(feature = "excel")]
impl From<calamine::Error> for DocdownError {
    fn from(err: calamine::Error) -> Self {
        DocdownError::MalformedInput {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "office")]
impl From<zip::result::ZipError> for DocdownError {
    fn from(err: zip::result::ZipError) -> Self {
        // Archives are always read from memory, so an IO error here means a corrupt container.
        DocdownError::MalformedInput {
            message: format!("Invalid archive: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "office")]
impl From<roxmltree::Error> for DocdownError {
    fn from(err: roxmltree::Error) -> Self {
        DocdownError::MalformedInput {
            message: format!("Invalid XML: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "pdf")]
impl From<lopdf::Error> for DocdownError {
    fn from(err: lopdf::Error) -> Self {
        DocdownError::MalformedInput {
            message: format!("Invalid PDF: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for DocdownError {
    fn from(err: serde_json::Error) -> Self {
        DocdownError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        paste::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl DocdownError {
    error_constructor!(malformed_input, MalformedInput);
    error_constructor!(conversion_unavailable, ConversionUnavailable);
    error_constructor!(encoding_failure, EncodingFailure);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);

    pub fn timeout<S: Into<String>>(message: S, timeout_secs: u64) -> Self {
        Self::ConversionTimeout {
            message: message.into(),
            timeout_secs,
        }
    }

    /// Attach the filename and format. An error that already carries context is returned unchanged.
    pub fn with_context(self, filename: impl Into<String>, format: impl Into<String>) -> Self {
        match self {
            already @ DocdownError::Conversion { .. } => already,
            other => DocdownError::Conversion {
                filename: filename.into(),
                format: format.into(),
                source: Box::new(other),
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DocdownError::Io(_) => ErrorKind::Io,
            DocdownError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            DocdownError::MalformedInput { .. } => ErrorKind::MalformedInput,
            DocdownError::ConversionUnavailable { .. } => ErrorKind::ConversionUnavailable,
            DocdownError::ConversionTimeout { .. } => ErrorKind::ConversionTimeout,
            DocdownError::EncodingFailure { .. } => ErrorKind::EncodingFailure,
            DocdownError::Validation { .. } => ErrorKind::Validation,
            DocdownError::Serialization { .. } => ErrorKind::Serialization,
            DocdownError::Conversion { source, .. } => source.kind(),
            DocdownError::Other(_) => ErrorKind::Other,
        }
    }

    pub fn filename(&self) -> Option<&str> {
        match self {
            DocdownError::Conversion { filename, .. } => Some(filename),
            _ => None,
        }
    }

    pub fn format(&self) -> Option<&str> {
        match self {
            DocdownError::Conversion { format, .. } => Some(format),
            _ => None,
        }
    }

    /// The innermost error, with any context wrapper peeled off.
    pub fn root(&self) -> &DocdownError {
        match self {
            DocdownError::Conversion { source, .. } => source.root(),
            other => other,
        }
    }
}
