//! Spreadsheet extraction using `calamine`.
//!
//! Every sheet becomes a `## <sheet name>` heading followed by its used range
//! as a table whose first row is the header. Cells are rendered the way a
//! spreadsheet displays them: integral numbers without a fractional part,
//! dates as ISO dates, booleans as `TRUE`/`FALSE`. Images anchored on a sheet
//! (XLSX/XLSM only) follow the sheet's table with their anchor cell as alt text.

use crate::Result;
use crate::assets::{ImageEmbedder, mime_from_path};
use crate::core::format::FileType;
use crate::extraction::ooxml::{A_NAMESPACE, OoxmlPackage, child, descendant, relationship_id, resolve_target};
use crate::types::{Block, InlineRun, Table};
use crate::DocdownError;
use calamine::{Data, Range, Reader};
use std::collections::HashMap;
use std::io::Cursor;

const XDR_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing";
const WORKBOOK_PART: &str = "xl/workbook.xml";

/// Cell text of one sheet, trimmed to the used area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetData {
    pub name: String,
    /// `None` when the reader could not load the sheet.
    pub rows: Option<Vec<Vec<String>>>,
}

/// An image anchored at a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AnchoredImage {
    cell: String,
    path: String,
}

/// Read the sheets of a workbook.
///
/// `Xls` data that is actually a ZIP container is read as XLSX.
pub fn read_workbook(data: &[u8], file_type: FileType) -> Result<Vec<SheetData>> {
    let cursor = Cursor::new(data);

    match file_type {
        FileType::Xls if !crate::core::format::looks_like_zip(data) => {
            let workbook = calamine::Xls::new(cursor)
                .map_err(|e| DocdownError::malformed_input(format!("Failed to parse XLS: {}", e)))?;
            Ok(process_workbook(workbook))
        }
        FileType::Xlsx | FileType::Xlsm | FileType::Xls => {
            let workbook = calamine::Xlsx::new(cursor)
                .map_err(|e| DocdownError::malformed_input(format!("Failed to parse XLSX: {}", e)))?;
            Ok(process_workbook(workbook))
        }
        other => Err(DocdownError::UnsupportedFormat(format!(
            "{} is not a spreadsheet format",
            other.as_str()
        ))),
    }
}

fn process_workbook<RS, R>(mut workbook: R) -> Vec<SheetData>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
{
    let sheet_names = workbook.sheet_names();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in &sheet_names {
        let rows = match workbook.worksheet_range(name) {
            Ok(range) => Some(trim_grid(range_to_grid(&range))),
            Err(e) => {
                tracing::warn!(sheet = %name, error = ?e, "Sheet could not be read");
                None
            }
        };
        sheets.push(SheetData {
            name: name.clone(),
            rows,
        });
    }

    sheets
}

fn range_to_grid(range: &Range<Data>) -> Vec<Vec<String>> {
    range
        .rows()
        .map(|row| row.iter().map(format_cell_value).collect())
        .collect()
}

/// Drop leading and trailing empty rows and columns.
fn trim_grid(grid: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let is_blank_row = |row: &Vec<String>| row.iter().all(|cell| cell.is_empty());

    let Some(first_row) = grid.iter().position(|row| !is_blank_row(row)) else {
        return Vec::new();
    };
    let last_row = grid.iter().rposition(|row| !is_blank_row(row)).unwrap_or(first_row);
    let rows = &grid[first_row..=last_row];

    let first_col = rows
        .iter()
        .filter_map(|row| row.iter().position(|cell| !cell.is_empty()))
        .min()
        .unwrap_or(0);
    let last_col = rows
        .iter()
        .filter_map(|row| row.iter().rposition(|cell| !cell.is_empty()))
        .max()
        .unwrap_or(first_col);

    rows.iter()
        .map(|row| {
            (first_col..=last_col)
                .map(|col| row.get(col).cloned().unwrap_or_default())
                .collect()
        })
        .collect()
}

/// Display text of a cell.
pub fn format_cell_value(data: &Data) -> String {
    match data {
        Data::Empty => String::new(),
        Data::String(s) => s.trim_end().to_string(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                match dt.as_duration() {
                    Some(duration) => format_duration(duration.num_seconds()),
                    None => format_number(dt.as_f64()),
                }
            } else {
                match dt.as_datetime() {
                    Some(datetime) => {
                        let time = datetime.format("%H:%M:%S").to_string();
                        if time == "00:00:00" {
                            datetime.format("%Y-%m-%d").to_string()
                        } else {
                            format!("{} {}", datetime.format("%Y-%m-%d"), time)
                        }
                    }
                    None => format_number(dt.as_f64()),
                }
            }
        }
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

fn format_duration(total_seconds: i64) -> String {
    let sign = if total_seconds < 0 { "-" } else { "" };
    let seconds = total_seconds.unsigned_abs();
    format!("{}{}:{:02}:{:02}", sign, seconds / 3600, (seconds / 60) % 60, seconds % 60)
}

/// Blocks for already-read sheets, with anchored images looked up by sheet name.
fn sheets_to_blocks(
    sheets: Vec<SheetData>,
    mut images: HashMap<String, Vec<AnchoredImage>>,
    mut package: Option<&mut OoxmlPackage<'_>>,
    embedder: &ImageEmbedder,
) -> Result<Vec<Block>> {
    let mut blocks = Vec::new();

    for sheet in sheets {
        blocks.push(Block::heading(2, vec![InlineRun::plain(sheet.name.clone())]));

        match sheet.rows {
            None => blocks.push(Block::paragraph(vec![InlineRun::styled(
                "Sheet could not be read",
                false,
                true,
            )])),
            Some(rows) if rows.is_empty() => {
                blocks.push(Block::paragraph(vec![InlineRun::styled("Empty sheet", false, true)]))
            }
            Some(rows) => {
                let rows = rows
                    .into_iter()
                    .map(|row| row.into_iter().map(|cell| vec![InlineRun::plain(cell)]).collect())
                    .collect();
                blocks.push(Block::Table(Table { rows, header: true }));
            }
        }

        let anchored = images.remove(&sheet.name).unwrap_or_default();
        if let Some(package) = package.as_deref_mut() {
            for image in anchored {
                let alt = format!("{}!{}", sheet.name, image.cell);
                let block = match package.read_part(&image.path) {
                    Ok(bytes) => embedder.embed(&bytes, mime_from_path(&image.path), &alt)?,
                    Err(err) => embedder.on_failure(err, &alt)?,
                };
                blocks.extend(block);
            }
        }
    }

    Ok(blocks)
}

/// Extract blocks from a workbook.
pub fn extract_workbook_blocks(data: &[u8], file_type: FileType, embedder: &ImageEmbedder) -> Result<Vec<Block>> {
    let sheets = read_workbook(data, file_type)?;

    if !crate::core::format::looks_like_zip(data) {
        return sheets_to_blocks(sheets, HashMap::new(), None, embedder);
    }

    let mut package = OoxmlPackage::open(data)?;
    let images = match sheet_images(&mut package) {
        Ok(images) => images,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read sheet drawings, continuing without images");
            HashMap::new()
        }
    };
    sheets_to_blocks(sheets, images, Some(&mut package), embedder)
}

/// Images per sheet name, in drawing anchor order.
fn sheet_images(package: &mut OoxmlPackage<'_>) -> Result<HashMap<String, Vec<AnchoredImage>>> {
    let mut images = HashMap::new();
    let Some(workbook_xml) = package.read_optional_text(WORKBOOK_PART)? else {
        return Ok(images);
    };
    let workbook_rels = package.relationships_of(WORKBOOK_PART)?;
    let workbook = roxmltree::Document::parse(&workbook_xml)?;

    for sheet in workbook.descendants().filter(|n| n.is_element() && n.tag_name().name() == "sheet") {
        let (Some(name), Some(rel)) = (
            sheet.attribute("name"),
            relationship_id(sheet, "id").and_then(|id| workbook_rels.get(id)),
        ) else {
            continue;
        };
        let sheet_path = resolve_target(WORKBOOK_PART, &rel.target);

        let sheet_rels = package.relationships_of(&sheet_path)?;
        let mut anchored = Vec::new();
        for drawing in sheet_rels.values().filter(|r| r.rel_type.ends_with("/drawing") && !r.external) {
            let drawing_path = resolve_target(&sheet_path, &drawing.target);
            anchored.extend(drawing_images(package, &drawing_path)?);
        }

        if !anchored.is_empty() {
            images.insert(name.to_string(), anchored);
        }
    }

    Ok(images)
}

fn drawing_images(package: &mut OoxmlPackage<'_>, drawing_path: &str) -> Result<Vec<AnchoredImage>> {
    let Some(xml) = package.read_optional_text(drawing_path)? else {
        return Ok(Vec::new());
    };
    let drawing_rels = package.relationships_of(drawing_path)?;
    let drawing = roxmltree::Document::parse(&xml)?;

    let mut images = Vec::new();
    for anchor in drawing.root_element().children().filter(|n| {
        n.tag_name().namespace() == Some(XDR_NAMESPACE)
            && matches!(n.tag_name().name(), "twoCellAnchor" | "oneCellAnchor")
    }) {
        let Some(from) = child(anchor, XDR_NAMESPACE, "from") else {
            continue;
        };
        let coordinate = |name: &str| {
            child(from, XDR_NAMESPACE, name)
                .and_then(|n| n.text())
                .and_then(|t| t.trim().parse::<u32>().ok())
        };
        let (Some(col), Some(row)) = (coordinate("col"), coordinate("row")) else {
            continue;
        };

        let Some(pic) = child(anchor, XDR_NAMESPACE, "pic") else {
            continue;
        };
        let Some(rel) = descendant(pic, A_NAMESPACE, "blip")
            .and_then(|blip| relationship_id(blip, "embed"))
            .and_then(|id| drawing_rels.get(id))
            .filter(|rel| !rel.external)
        else {
            continue;
        };

        images.push(AnchoredImage {
            cell: format!("{}{}", column_name(col), row + 1),
            path: resolve_target(drawing_path, &rel.target),
        });
    }

    Ok(images)
}

/// Zero-based column index to its letter name: 0 → A, 26 → AA.
fn column_name(index: u32) -> String {
    let mut name = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}
