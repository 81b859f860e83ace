//! Inline image encoding.
//!
//! [`encode_image`] turns raw bytes into an [`EncodedImage`]. [`ImageEmbedder`]
//! wraps it with the configured MIME filter and failure policy and is what the
//! extractors call.

use crate::core::config::{ImageConfig, ImageFailurePolicy};
use crate::error::ErrorKind;
use crate::types::{Block, EncodedImage};
use crate::{DocdownError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encode image bytes.
///
/// `mime_hint` is trusted when it is an `image/*` type. Otherwise the type is
/// sniffed from the magic bytes. Input that is already a base64 `data:` URI is
/// validated and reused instead of being encoded a second time.
///
/// # Errors
///
/// `EncodingFailure` for empty input, an undetectable type, or a broken data URI.
pub fn encode_image(bytes: &[u8], mime_hint: Option<&str>) -> Result<EncodedImage> {
    if bytes.is_empty() {
        return Err(DocdownError::encoding_failure("image payload is empty"));
    }

    if let Some((mime_type, payload)) = split_data_uri(bytes) {
        return EncodedImage::from_base64(mime_type, payload);
    }

    let mime_type = match mime_hint.map(str::trim).filter(|hint| is_image_mime(hint)) {
        Some(hint) => hint.to_ascii_lowercase(),
        None => sniff_image_mime(bytes).ok_or_else(|| {
            DocdownError::encoding_failure(format!(
                "could not determine image type ({} bytes, hint {:?})",
                bytes.len(),
                mime_hint
            ))
        })?,
    };

    Ok(EncodedImage {
        mime_type,
        base64_payload: STANDARD.encode(bytes),
    })
}

impl EncodedImage {
    /// Wrap a payload that is already base64. The payload is validated, never re-encoded.
    pub fn from_base64(mime_type: impl Into<String>, payload: impl Into<String>) -> Result<Self> {
        let mime_type = mime_type.into();
        let payload: String = payload.into().chars().filter(|c| !c.is_ascii_whitespace()).collect();

        if !is_image_mime(&mime_type) {
            return Err(DocdownError::encoding_failure(format!(
                "'{}' is not an image MIME type",
                mime_type
            )));
        }
        if payload.is_empty() {
            return Err(DocdownError::encoding_failure("base64 payload is empty"));
        }
        STANDARD
            .decode(payload.as_bytes())
            .map_err(|e| DocdownError::encoding_failure_with_source("invalid base64 payload", e))?;

        Ok(Self {
            mime_type,
            base64_payload: payload,
        })
    }

    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.base64_payload.as_bytes())
            .map_err(|e| DocdownError::encoding_failure_with_source("invalid base64 payload", e))
    }
}

fn is_image_mime(mime: &str) -> bool {
    let lower = mime.to_ascii_lowercase();
    lower.len() > "image/".len() && lower.starts_with("image/")
}

fn split_data_uri(bytes: &[u8]) -> Option<(&str, &str)> {
    let text = std::str::from_utf8(bytes).ok()?.trim();
    let rest = text.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    Some((mime_type, payload))
}

/// Detect an image MIME type from magic bytes.
pub fn sniff_image_mime(bytes: &[u8]) -> Option<String> {
    if let Some(kind) = infer::get(bytes)
        && kind.matcher_type() == infer::MatcherType::Image
    {
        return Some(kind.mime_type().to_string());
    }

    // EMF and WMF are not covered by infer.
    if bytes.len() >= 44 && bytes[..4] == [0x01, 0x00, 0x00, 0x00] && &bytes[40..44] == b" EMF" {
        return Some("image/x-emf".to_string());
    }
    if bytes.starts_with(&[0xD7, 0xCD, 0xC6, 0x9A]) || bytes.starts_with(&[0x01, 0x00, 0x09, 0x00]) {
        return Some("image/x-wmf".to_string());
    }
    None
}

/// MIME type for an image path inside a container, from its extension.
pub fn mime_from_path(path: &str) -> Option<&'static str> {
    let extension = path.rsplit_once('.')?.1.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => return None,
    };
    Some(mime)
}

/// Applies [`ImageConfig`] to images found by an extractor.
#[derive(Debug, Clone)]
pub struct ImageEmbedder {
    config: ImageConfig,
}

impl ImageEmbedder {
    pub fn new(config: ImageConfig) -> Self {
        Self { config }
    }

    /// Turn an embedded image into a block.
    ///
    /// Returns `Ok(None)` when embedding is disabled or the type is not allowed.
    /// An encoding failure becomes a paragraph holding the alt text under
    /// [`ImageFailurePolicy::Skip`] and an error under [`ImageFailurePolicy::Fail`].
    pub fn embed(&self, bytes: &[u8], mime_hint: Option<&str>, alt: &str) -> Result<Option<Block>> {
        if !self.config.embed {
            return Ok(None);
        }

        match encode_image(bytes, mime_hint) {
            Ok(image) => {
                if !self.config.allows(&image.mime_type) {
                    tracing::debug!(mime_type = %image.mime_type, alt, "Dropping image with disallowed type");
                    return Ok(None);
                }
                Ok(Some(Block::Image {
                    image,
                    alt: alt.to_string(),
                }))
            }
            Err(err) => self.on_failure(err, alt),
        }
    }

    /// Apply the failure policy to an image that could not be prepared before encoding.
    ///
    /// Under [`ImageFailurePolicy::Fail`] the error is always reported as `EncodingFailure`,
    /// whatever stopped the image from being read.
    pub fn on_failure(&self, err: DocdownError, alt: &str) -> Result<Option<Block>> {
        match self.config.on_failure {
            ImageFailurePolicy::Fail if err.kind() == ErrorKind::EncodingFailure => Err(err),
            ImageFailurePolicy::Fail => Err(DocdownError::encoding_failure_with_source(
                format!("Image '{}' could not be read", alt),
                err,
            )),
            ImageFailurePolicy::Skip => {
                tracing::warn!(alt, error = %err, "Skipping image that could not be encoded");
                if alt.trim().is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(Block::text(alt)))
                }
            }
        }
    }
}
