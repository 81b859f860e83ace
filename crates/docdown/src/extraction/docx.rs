//! DOCX (Word) structure extraction.
//!
//! Walks `word/document.xml` in body order. Paragraph styles decide headings,
//! numbering properties decide list items and `word/numbering.xml` tells ordered
//! from bulleted lists. Explicit page breaks and inline images split the
//! surrounding paragraph so the block order follows the source. Images inside
//! table cells follow the table they sit in.

use crate::Result;
use crate::assets::{ImageEmbedder, mime_from_path};
use crate::extraction::ooxml::{
    A_NAMESPACE, OoxmlPackage, Relationship, child, children, descendant, is_on, relationship_id, resolve_target,
};
use crate::types::{Block, InlineRun, Table, TableCell};
use roxmltree::Node;
use std::collections::HashMap;

const W_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const WP_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const VML_NAMESPACE: &str = "urn:schemas-microsoft-com:vml";

const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

/// Word's own limit on table grid columns.
const MAX_GRID_COLUMNS: usize = 63;

/// Wrapper elements whose children are walked as if they were inline in the paragraph.
const TRANSPARENT_INLINE: &[&str] = &[
    "hyperlink",
    "ins",
    "moveTo",
    "smartTag",
    "sdt",
    "sdtContent",
    "fldSimple",
    "customXml",
    "dir",
    "bdo",
];

/// Extract blocks from DOCX bytes.
pub fn extract_docx_blocks(data: &[u8], embedder: &ImageEmbedder) -> Result<Vec<Block>> {
    let mut package = OoxmlPackage::open(data)?;
    let document_part = main_document_part(&mut package)?;

    let styles = match package.read_optional_text("word/styles.xml")? {
        Some(xml) => parse_styles(&xml)?,
        None => HashMap::new(),
    };
    let numbering = match package.read_optional_text("word/numbering.xml")? {
        Some(xml) => parse_numbering(&xml)?,
        None => HashMap::new(),
    };
    let relationships = package.relationships_of(&document_part)?;

    let xml = package.read_text(&document_part)?;
    let document = roxmltree::Document::parse(&xml)?;
    let body = descendant(document.root(), W_NAMESPACE, "body")
        .ok_or_else(|| crate::DocdownError::malformed_input("DOCX document has no <w:body>"))?;

    let mut walker = DocxWalker {
        package: &mut package,
        part: &document_part,
        relationships: &relationships,
        styles: &styles,
        numbering: &numbering,
        embedder,
        blocks: Vec::new(),
        cell_images: Vec::new(),
    };
    walker.walk_body(body)?;

    tracing::debug!(blocks = walker.blocks.len(), "Extracted DOCX blocks");
    Ok(walker.blocks)
}

fn main_document_part(package: &mut OoxmlPackage<'_>) -> Result<String> {
    let root_relationships = package.relationships_of("")?;
    let target = root_relationships
        .values()
        .find(|rel| rel.rel_type.ends_with("/officeDocument"))
        .map(|rel| resolve_target("", &rel.target));

    Ok(match target {
        Some(path) if package.has_part(&path) => path,
        _ => DEFAULT_DOCUMENT_PART.to_string(),
    })
}

/// styleId → display name.
fn parse_styles(xml: &str) -> Result<HashMap<String, String>> {
    let document = roxmltree::Document::parse(xml)?;
    let mut styles = HashMap::new();

    for style in document.descendants().filter(|n| is_w(n, "style")) {
        let (Some(id), Some(name)) = (
            style.attribute((W_NAMESPACE, "styleId")),
            child(style, W_NAMESPACE, "name").and_then(|n| n.attribute((W_NAMESPACE, "val"))),
        ) else {
            continue;
        };
        styles.insert(id.to_string(), name.to_string());
    }

    Ok(styles)
}

/// numId → (level → ordered).
type NumberingMap = HashMap<String, HashMap<u8, bool>>;

fn parse_numbering(xml: &str) -> Result<NumberingMap> {
    let document = roxmltree::Document::parse(xml)?;

    let mut abstract_levels: HashMap<String, HashMap<u8, bool>> = HashMap::new();
    for abstract_num in document.descendants().filter(|n| is_w(n, "abstractNum")) {
        let Some(id) = abstract_num.attribute((W_NAMESPACE, "abstractNumId")) else {
            continue;
        };
        let mut levels = HashMap::new();
        for level in children(abstract_num, W_NAMESPACE, "lvl") {
            let Some(ilvl) = level.attribute((W_NAMESPACE, "ilvl")).and_then(|v| v.parse::<u8>().ok()) else {
                continue;
            };
            let format = child(level, W_NAMESPACE, "numFmt")
                .and_then(|n| n.attribute((W_NAMESPACE, "val")))
                .unwrap_or("bullet");
            levels.insert(ilvl, !matches!(format, "bullet" | "none"));
        }
        abstract_levels.insert(id.to_string(), levels);
    }

    let mut numbering = HashMap::new();
    for num in document.descendants().filter(|n| is_w(n, "num")) {
        let Some(num_id) = num.attribute((W_NAMESPACE, "numId")) else {
            continue;
        };
        let levels = child(num, W_NAMESPACE, "abstractNumId")
            .and_then(|n| n.attribute((W_NAMESPACE, "val")))
            .and_then(|abstract_id| abstract_levels.get(abstract_id))
            .cloned()
            .unwrap_or_default();
        numbering.insert(num_id.to_string(), levels);
    }

    Ok(numbering)
}

/// "heading 2", "Heading2" → 2.
fn heading_level_from_name(name: &str) -> Option<u8> {
    let compact: String = name
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    let level: u8 = compact.strip_prefix("heading")?.parse().ok()?;
    (level > 0).then(|| level.min(6))
}

fn is_w(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(W_NAMESPACE)
}

fn w_val<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    child(node, W_NAMESPACE, name).and_then(|n| n.attribute((W_NAMESPACE, "val")))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParagraphKind {
    Body,
    Heading(u8),
    List { depth: u8, ordered: bool },
}

impl ParagraphKind {
    fn block(self, runs: Vec<InlineRun>) -> Block {
        match self {
            ParagraphKind::Body => Block::paragraph(runs),
            ParagraphKind::Heading(level) => Block::heading(level, runs),
            ParagraphKind::List { depth, ordered } => Block::ListItem { depth, ordered, runs },
        }
    }
}

/// Where inline content goes: a body paragraph can be split, a table cell collects text
/// and defers its images until after the table.
enum InlineTarget {
    Paragraph(ParagraphKind),
    Cell,
}

struct DocxWalker<'w, 'a> {
    package: &'w mut OoxmlPackage<'a>,
    part: &'w str,
    relationships: &'w HashMap<String, Relationship>,
    styles: &'w HashMap<String, String>,
    numbering: &'w NumberingMap,
    embedder: &'w ImageEmbedder,
    blocks: Vec<Block>,
    cell_images: Vec<Block>,
}

impl DocxWalker<'_, '_> {
    fn walk_body(&mut self, container: Node<'_, '_>) -> Result<()> {
        for node in container.children().filter(Node::is_element) {
            if node.tag_name().namespace() != Some(W_NAMESPACE) {
                continue;
            }
            match node.tag_name().name() {
                "p" => self.paragraph(node)?,
                "tbl" => {
                    let table = self.table(node)?;
                    if !table.rows.is_empty() {
                        self.blocks.push(Block::Table(table));
                    }
                    let images = std::mem::take(&mut self.cell_images);
                    self.blocks.extend(images);
                }
                "sdt" => {
                    if let Some(content) = child(node, W_NAMESPACE, "sdtContent") {
                        self.walk_body(content)?;
                    }
                }
                "customXml" | "ins" | "moveTo" => self.walk_body(node)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn paragraph_kind(&self, paragraph: Node<'_, '_>) -> ParagraphKind {
        let Some(properties) = child(paragraph, W_NAMESPACE, "pPr") else {
            return ParagraphKind::Body;
        };

        if let Some(style_id) = w_val(properties, "pStyle")
            && let Some(level) = self.heading_level(style_id)
        {
            return ParagraphKind::Heading(level);
        }

        if let Some(numbering) = child(properties, W_NAMESPACE, "numPr") {
            let num_id = w_val(numbering, "numId").unwrap_or("0");
            if num_id != "0" {
                let depth = w_val(numbering, "ilvl").and_then(|v| v.parse::<u8>().ok()).unwrap_or(0);
                let ordered = self
                    .numbering
                    .get(num_id)
                    .and_then(|levels| levels.get(&depth))
                    .copied()
                    .unwrap_or(false);
                return ParagraphKind::List { depth, ordered };
            }
        }

        ParagraphKind::Body
    }

    /// Heading level of a paragraph style, from its own name or, without one, its id.
    fn heading_level(&self, style_id: &str) -> Option<u8> {
        match self.styles.get(style_id) {
            Some(name) => heading_level_from_name(name),
            None => heading_level_from_name(style_id),
        }
    }

    fn paragraph(&mut self, paragraph: Node<'_, '_>) -> Result<()> {
        let kind = self.paragraph_kind(paragraph);
        let mut runs = Vec::new();
        self.inline(paragraph, &InlineTarget::Paragraph(kind), &mut runs)?;
        self.flush(kind, &mut runs);
        Ok(())
    }

    fn flush(&mut self, kind: ParagraphKind, runs: &mut Vec<InlineRun>) {
        if runs.iter().any(|run| !run.text.trim().is_empty()) {
            self.blocks.push(kind.block(std::mem::take(runs)));
        } else {
            runs.clear();
        }
    }

    fn inline(&mut self, node: Node<'_, '_>, target: &InlineTarget, runs: &mut Vec<InlineRun>) -> Result<()> {
        for item in node.children().filter(Node::is_element) {
            if item.tag_name().namespace() != Some(W_NAMESPACE) {
                continue;
            }
            let name = item.tag_name().name();
            if name == "r" {
                self.run(item, target, runs)?;
            } else if TRANSPARENT_INLINE.contains(&name) {
                self.inline(item, target, runs)?;
            }
        }
        Ok(())
    }

    fn run(&mut self, run: Node<'_, '_>, target: &InlineTarget, runs: &mut Vec<InlineRun>) -> Result<()> {
        let (bold, italic) = match child(run, W_NAMESPACE, "rPr") {
            Some(properties) => (toggle(properties, "b"), toggle(properties, "i")),
            None => (false, false),
        };

        for item in run.children().filter(Node::is_element) {
            if item.tag_name().namespace() != Some(W_NAMESPACE) {
                continue;
            }
            match item.tag_name().name() {
                "t" => runs.push(InlineRun::styled(item.text().unwrap_or_default(), bold, italic)),
                "tab" => runs.push(InlineRun::styled("\t", bold, italic)),
                "noBreakHyphen" => runs.push(InlineRun::styled("-", bold, italic)),
                "cr" => runs.push(InlineRun::plain("\n")),
                "br" => {
                    let page_break = item.attribute((W_NAMESPACE, "type")) == Some("page");
                    match target {
                        InlineTarget::Paragraph(kind) if page_break => {
                            self.flush(*kind, runs);
                            self.blocks.push(Block::PageBreak);
                        }
                        _ if page_break => {}
                        _ => runs.push(InlineRun::plain("\n")),
                    }
                }
                "drawing" | "pict" | "object" => match target {
                    InlineTarget::Paragraph(kind) => {
                        let images = self.images_in(item)?;
                        if !images.is_empty() {
                            self.flush(*kind, runs);
                            self.blocks.extend(images);
                        }
                    }
                    InlineTarget::Cell => {
                        let images = self.images_in(item)?;
                        self.cell_images.extend(images);
                    }
                },
                _ => {}
            }
        }
        Ok(())
    }

    fn images_in(&mut self, container: Node<'_, '_>) -> Result<Vec<Block>> {
        let mut images = Vec::new();

        let alt = descendant(container, WP_NAMESPACE, "docPr")
            .and_then(|doc_pr| {
                doc_pr
                    .attribute("descr")
                    .filter(|d| !d.trim().is_empty())
                    .or_else(|| doc_pr.attribute("name"))
            })
            .unwrap_or("image")
            .to_string();

        for blip in container.descendants().filter(|n| n.has_tag_name((A_NAMESPACE, "blip"))) {
            if let Some(id) = relationship_id(blip, "embed")
                && let Some(block) = self.embed_relationship(id, &alt)?
            {
                images.push(block);
            }
        }

        for image_data in container
            .descendants()
            .filter(|n| n.has_tag_name((VML_NAMESPACE, "imagedata")))
        {
            let alt = image_data.attribute("title").filter(|t| !t.trim().is_empty()).unwrap_or("image");
            if let Some(id) = relationship_id(image_data, "id")
                && let Some(block) = self.embed_relationship(id, alt)?
            {
                images.push(block);
            }
        }

        Ok(images)
    }

    fn embed_relationship(&mut self, id: &str, alt: &str) -> Result<Option<Block>> {
        let Some(relationship) = self.relationships.get(id) else {
            tracing::debug!(id, "Image relationship not found");
            return Ok(None);
        };
        if relationship.external {
            tracing::debug!(target = %relationship.target, "Skipping linked external image");
            return Ok(None);
        }

        let path = resolve_target(self.part, &relationship.target);
        match self.package.read_part(&path) {
            Ok(bytes) => self.embedder.embed(&bytes, mime_from_path(&path), alt),
            Err(err) => self.embedder.on_failure(err, alt),
        }
    }

    fn table(&mut self, table: Node<'_, '_>) -> Result<Table> {
        let mut rows = Vec::new();
        let mut header = false;
        let grid_columns = child(table, W_NAMESPACE, "tblGrid")
            .map(|grid| children(grid, W_NAMESPACE, "gridCol").count())
            .filter(|&count| count > 0)
            .unwrap_or(MAX_GRID_COLUMNS)
            .min(MAX_GRID_COLUMNS);

        for (index, row) in children(table, W_NAMESPACE, "tr").enumerate() {
            if index == 0 {
                header = child(row, W_NAMESPACE, "trPr")
                    .and_then(|properties| child(properties, W_NAMESPACE, "tblHeader"))
                    .is_some_and(|flag| is_on(flag.attribute((W_NAMESPACE, "val"))));
            }

            let mut cells: Vec<TableCell> = Vec::new();
            for cell in row_cells(row) {
                let span = child(cell, W_NAMESPACE, "tcPr")
                    .and_then(|properties| w_val(properties, "gridSpan"))
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(1)
                    .clamp(1, grid_columns);
                cells.push(self.cell_runs(cell)?);
                cells.extend(std::iter::repeat_n(Vec::new(), span - 1));
            }
            rows.push(cells);
        }

        Ok(Table { rows, header })
    }

    fn cell_runs(&mut self, cell: Node<'_, '_>) -> Result<TableCell> {
        let mut runs = Vec::new();
        for paragraph in cell.descendants().filter(|n| is_w(n, "p")) {
            let mut paragraph_runs = Vec::new();
            self.inline(paragraph, &InlineTarget::Cell, &mut paragraph_runs)?;
            if paragraph_runs.iter().all(|run| run.text.trim().is_empty()) {
                continue;
            }
            if !runs.is_empty() {
                runs.push(InlineRun::plain("\n"));
            }
            runs.extend(paragraph_runs);
        }
        Ok(runs)
    }
}

/// Cells of a row, looking through content controls and custom XML wrappers.
fn row_cells<'a, 'input>(row: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    let mut cells = Vec::new();
    for node in row.children().filter(Node::is_element) {
        if is_w(&node, "tc") {
            cells.push(node);
        } else if is_w(&node, "sdt") {
            if let Some(content) = child(node, W_NAMESPACE, "sdtContent") {
                cells.extend(row_cells(content));
            }
        } else if is_w(&node, "customXml") {
            cells.extend(row_cells(node));
        }
    }
    cells
}

fn toggle(properties: Node<'_, '_>, name: &str) -> bool {
    child(properties, W_NAMESPACE, name).is_some_and(|flag| is_on(flag.attribute((W_NAMESPACE, "val"))))
}
