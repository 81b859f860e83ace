//! PDF extraction using `lopdf`.
//!
//! Each page contributes its text layer, split into paragraphs on blank lines,
//! followed by the images painted on it. Pages are separated by page breaks.
//! No reading-order or heading inference is attempted.
//!
//! A PDF without any text layer can only be converted through a configured
//! external text command; its stdout is split into pages on form feeds.

use crate::assets::ImageEmbedder;
use crate::core::config::ExternalCommand;
use crate::extraction::process::{ScratchDir, run_with_timeout};
use crate::types::{Block, InlineRun};
use crate::{DocdownError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::io::Cursor;

/// What was read from one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfPage {
    pub number: u32,
    pub text: String,
    pub images: Vec<PdfImage>,
}

/// An image XObject, either in a directly embeddable encoding or as raw samples.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfImage {
    Encoded {
        bytes: Vec<u8>,
        mime_type: &'static str,
    },
    Raw {
        width: u32,
        height: u32,
        channels: u8,
        pixels: Vec<u8>,
    },
}

/// Parse a PDF and read every page's text and (optionally) images.
pub fn read_pdf(data: &[u8], extract_images: bool) -> Result<Vec<PdfPage>> {
    let document = Document::load_mem(data)?;
    let pages = document.get_pages();

    let mut result = Vec::with_capacity(pages.len());
    for (number, page_id) in pages {
        let text = match document.extract_text(&[number]) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(page = number, error = %e, "Failed to extract page text, treating page as empty");
                String::new()
            }
        };
        let images = if extract_images {
            page_images(&document, page_id, number)
        } else {
            Vec::new()
        };
        result.push(PdfPage { number, text, images });
    }

    Ok(result)
}

/// True when at least one page has non-whitespace text.
pub fn has_text_layer(pages: &[PdfPage]) -> bool {
    pages.iter().any(|page| !page.text.trim().is_empty())
}

/// Replace page text with collaborator output, one form-feed separated chunk per page.
pub fn apply_external_text(pages: &mut [PdfPage], output: &str) {
    let mut chunks = output.split('\u{c}');
    for page in pages.iter_mut() {
        page.text = chunks.next().unwrap_or_default().to_string();
    }
}

/// Run the configured text command on the PDF and return its stdout.
///
/// # Errors
///
/// `ConversionTimeout` past the deadline, `ConversionUnavailable` when the
/// command fails or prints nothing.
pub async fn run_text_command(content: &[u8], command: &ExternalCommand, timeout_secs: u64) -> Result<String> {
    let scratch = ScratchDir::new("pdftext").await?;
    let input = scratch.stage("input.pdf", content).await?;
    let args = command.args_for(&input);

    tracing::debug!(program = %command.program, "Running PDF text command");
    let output = run_with_timeout(&command.program, &args, timeout_secs, "PDF text command").await?;

    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    if text.trim().is_empty() {
        return Err(DocdownError::conversion_unavailable(
            "PDF text command produced no text",
        ));
    }
    Ok(text)
}

/// Build blocks from read pages.
pub fn pages_to_blocks(pages: Vec<PdfPage>, embedder: &ImageEmbedder) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();

    for (index, page) in pages.into_iter().enumerate() {
        if index > 0 {
            blocks.push(Block::PageBreak);
        }

        for paragraph in text_to_paragraphs(&page.text) {
            blocks.push(Block::paragraph(vec![InlineRun::plain(paragraph)]));
        }

        for (image_index, image) in page.images.into_iter().enumerate() {
            let alt = format!("page {} image {}", page.number, image_index + 1);
            let block = match image {
                PdfImage::Encoded { bytes, mime_type } => embedder.embed(&bytes, Some(mime_type), &alt)?,
                PdfImage::Raw {
                    width,
                    height,
                    channels,
                    pixels,
                } => match raw_to_png(width, height, channels, pixels) {
                    Ok(png) => embedder.embed(&png, Some("image/png"), &alt)?,
                    Err(err) => embedder.on_failure(err, &alt)?,
                },
            };
            blocks.extend(block);
        }
    }

    Ok(blocks)
}

/// Split page text into paragraphs on blank lines, trimming every line.
fn text_to_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Resources of a page, inherited from the page tree when the page has none.
fn page_resources(document: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut current = document.get_dictionary(page_id).ok()?;
    for _ in 0..32 {
        if let Ok(resources) = current.get(b"Resources")
            && let Some(Object::Dictionary(dictionary)) = resolve(document, resources)
        {
            return Some(dictionary);
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = document.get_dictionary(parent).ok()?;
    }
    None
}

fn page_images(document: &Document, page_id: ObjectId, page_number: u32) -> Vec<PdfImage> {
    let Some(resources) = page_resources(document, page_id) else {
        return Vec::new();
    };
    let Some(Object::Dictionary(xobjects)) = resources.get(b"XObject").ok().and_then(|o| resolve(document, o)) else {
        return Vec::new();
    };

    let mut images = Vec::new();
    for (name, object) in xobjects.iter() {
        let Some(Object::Stream(stream)) = resolve(document, object) else {
            continue;
        };
        if !matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(subtype)) if subtype.as_slice() == b"Image") {
            continue;
        }
        match image_from_stream(stream) {
            Some(image) => images.push(image),
            None => tracing::debug!(
                page = page_number,
                xobject = %String::from_utf8_lossy(name),
                "Skipping image with unsupported encoding"
            ),
        }
    }
    images
}

fn name_of(object: &Object) -> Option<&[u8]> {
    match object {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(items) if items.len() == 1 => name_of(&items[0]),
        _ => None,
    }
}

fn image_from_stream(stream: &Stream) -> Option<PdfImage> {
    let filter = match stream.dict.get(b"Filter") {
        Ok(object) => Some(name_of(object)?),
        Err(_) => None,
    };

    match filter {
        Some(b"DCTDecode") => Some(PdfImage::Encoded {
            bytes: stream.content.clone(),
            mime_type: "image/jpeg",
        }),
        Some(b"JPXDecode") => Some(PdfImage::Encoded {
            bytes: stream.content.clone(),
            mime_type: "image/jp2",
        }),
        Some(b"FlateDecode") | None => {
            let dict = &stream.dict;
            if integer(dict, b"BitsPerComponent") != Some(8) {
                return None;
            }
            let channels = match dict.get(b"ColorSpace").ok().and_then(name_of)? {
                b"DeviceRGB" => 3,
                b"DeviceGray" => 1,
                _ => return None,
            };
            let width = u32::try_from(integer(dict, b"Width")?).ok()?;
            let height = u32::try_from(integer(dict, b"Height")?).ok()?;
            let pixels = if filter.is_some() {
                stream.decompressed_content().ok()?
            } else {
                stream.content.clone()
            };
            Some(PdfImage::Raw {
                width,
                height,
                channels,
                pixels,
            })
        }
        Some(_) => None,
    }
}

fn integer(dict: &Dictionary, key: &[u8]) -> Option<i64> {
    dict.get(key).ok().and_then(|o| o.as_i64().ok())
}

/// Encode 8-bit gray or RGB samples as PNG.
fn raw_to_png(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Result<Vec<u8>> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|samples| samples.checked_mul(usize::from(channels)))
        .ok_or_else(|| {
            DocdownError::encoding_failure(format!("image dimensions {}x{}x{} are too large", width, height, channels))
        })?;
    if expected == 0 || pixels.len() < expected {
        return Err(DocdownError::encoding_failure(format!(
            "image data too short: {} bytes for {}x{}x{}",
            pixels.len(),
            width,
            height,
            channels
        )));
    }

    let mut pixels = pixels;
    pixels.truncate(expected);
    let image = match channels {
        1 => image::GrayImage::from_raw(width, height, pixels).map(image::DynamicImage::ImageLuma8),
        3 => image::RgbImage::from_raw(width, height, pixels).map(image::DynamicImage::ImageRgb8),
        _ => None,
    }
    .ok_or_else(|| DocdownError::encoding_failure(format!("unsupported sample layout ({} channels)", channels)))?;

    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, image::ImageFormat::Png)
        .map_err(|e| DocdownError::encoding_failure_with_source("failed to encode PNG", e))?;
    Ok(png.into_inner())
}
