//! PPTX (PowerPoint) structure extraction.
//!
//! Slides are visited in presentation order. Each slide opens with a
//! `Slide N: <title>` heading, then its shapes follow in document order with
//! groups flattened: text bodies become paragraphs or list items, table
//! frames become tables and pictures become images. Speaker notes are not
//! part of the output.

use crate::Result;
use crate::assets::{ImageEmbedder, mime_from_path};
use crate::extraction::ooxml::{
    A_NAMESPACE, OoxmlPackage, Relationship, child, children, descendant, is_on, relationship_id, resolve_target,
};
use crate::types::{Block, InlineRun, Table, TableCell};
use roxmltree::{Document, Node};
use std::collections::HashMap;

const P_NAMESPACE: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const MC_NAMESPACE: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";
const TABLE_URI: &str = "http://schemas.openxmlformats.org/drawingml/2006/table";
const PRESENTATION_PART: &str = "ppt/presentation.xml";

#[derive(Debug, Clone, PartialEq)]
struct TextParagraph {
    list: Option<(u8, bool)>,
    runs: Vec<InlineRun>,
}

#[derive(Debug, Clone, PartialEq)]
enum SlideElement {
    Title(String),
    Text(Vec<TextParagraph>),
    Table(Table),
    Image { id: String, alt: String },
}

/// Extract blocks from PPTX bytes.
pub fn extract_pptx_blocks(data: &[u8], embedder: &ImageEmbedder) -> Result<Vec<Block>> {
    let mut package = OoxmlPackage::open(data)?;
    let slide_paths = slide_paths(&mut package)?;

    let mut blocks = Vec::new();
    for (index, slide_path) in slide_paths.iter().enumerate() {
        let xml = package.read_text(slide_path)?;
        let elements = parse_slide_xml(&xml)?;
        let relationships = package.relationships_of(slide_path)?;
        let mut slide = SlideBuilder {
            package: &mut package,
            slide_path,
            relationships: &relationships,
            embedder,
        };
        slide.emit(index + 1, elements, &mut blocks)?;
    }

    tracing::debug!(slides = slide_paths.len(), blocks = blocks.len(), "Extracted PPTX blocks");
    Ok(blocks)
}

/// Slide parts in presentation order.
///
/// `p:sldIdLst` is authoritative. Packages without it fall back to the slide
/// relationships, then to every `ppt/slides/slideN.xml` sorted by N.
fn slide_paths(package: &mut OoxmlPackage<'_>) -> Result<Vec<String>> {
    let relationships = package.relationships_of(PRESENTATION_PART)?;

    let mut paths = Vec::new();
    if let Some(xml) = package.read_optional_text(PRESENTATION_PART)? {
        let document = Document::parse(&xml)?;
        for slide_id in document.descendants().filter(|n| n.has_tag_name((P_NAMESPACE, "sldId"))) {
            if let Some(rel) = relationship_id(slide_id, "id").and_then(|id| relationships.get(id)) {
                let path = resolve_target(PRESENTATION_PART, &rel.target);
                if package.has_part(&path) {
                    paths.push(path);
                }
            }
        }
    }

    if paths.is_empty() {
        paths = relationships
            .values()
            .filter(|rel| rel.rel_type.ends_with("/slide"))
            .map(|rel| resolve_target(PRESENTATION_PART, &rel.target))
            .filter(|path| package.has_part(path))
            .collect();
        paths.sort_by_key(|path| slide_number(path));
    }

    if paths.is_empty() {
        paths = package
            .part_names()
            .into_iter()
            .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
            .collect();
        paths.sort_by_key(|path| slide_number(path));
    }

    Ok(paths)
}

fn slide_number(path: &str) -> u32 {
    path.rsplit('/')
        .next()
        .and_then(|file| file.strip_prefix("slide"))
        .and_then(|file| file.strip_suffix(".xml"))
        .and_then(|number| number.parse().ok())
        .unwrap_or(u32::MAX)
}

fn parse_slide_xml(xml: &str) -> Result<Vec<SlideElement>> {
    let document = Document::parse(xml)?;

    let Some(sp_tree) = descendant(document.root(), P_NAMESPACE, "spTree") else {
        return Err(crate::DocdownError::malformed_input("Slide has no <p:spTree>"));
    };

    let mut elements = Vec::new();
    for node in sp_tree.children().filter(Node::is_element) {
        parse_group(node, &mut elements);
    }
    Ok(elements)
}

fn parse_group(node: Node<'_, '_>, elements: &mut Vec<SlideElement>) {
    let namespace = node.tag_name().namespace();

    if namespace == Some(MC_NAMESPACE) && node.tag_name().name() == "AlternateContent" {
        let branch = child(node, MC_NAMESPACE, "Fallback").or_else(|| child(node, MC_NAMESPACE, "Choice"));
        if let Some(branch) = branch {
            for inner in branch.children().filter(Node::is_element) {
                parse_group(inner, elements);
            }
        }
        return;
    }

    if namespace != Some(P_NAMESPACE) {
        return;
    }

    match node.tag_name().name() {
        "sp" => {
            if let Some(element) = parse_sp(node) {
                elements.push(element);
            }
        }
        "graphicFrame" => {
            if let Some(table) = parse_graphic_frame(node) {
                elements.push(SlideElement::Table(table));
            }
        }
        "pic" => {
            if let Some(image) = parse_pic(node) {
                elements.push(image);
            }
        }
        "grpSp" => {
            for inner in node.children().filter(Node::is_element) {
                parse_group(inner, elements);
            }
        }
        _ => {}
    }
}

fn is_title_shape(sp: Node<'_, '_>) -> bool {
    child(sp, P_NAMESPACE, "nvSpPr")
        .and_then(|nv| child(nv, P_NAMESPACE, "nvPr"))
        .and_then(|nv| child(nv, P_NAMESPACE, "ph"))
        .and_then(|ph| ph.attribute("type"))
        .is_some_and(|kind| matches!(kind, "title" | "ctrTitle"))
}

fn parse_sp(sp: Node<'_, '_>) -> Option<SlideElement> {
    let tx_body = child(sp, P_NAMESPACE, "txBody")?;

    if is_title_shape(sp) {
        let title = children(tx_body, A_NAMESPACE, "p")
            .map(|p| plain_text(&parse_paragraph(p)))
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        return Some(SlideElement::Title(title));
    }

    let paragraphs: Vec<TextParagraph> = children(tx_body, A_NAMESPACE, "p")
        .map(|p| TextParagraph {
            list: parse_list_properties(p),
            runs: parse_paragraph(p),
        })
        .collect();
    Some(SlideElement::Text(paragraphs))
}

fn parse_graphic_frame(node: Node<'_, '_>) -> Option<Table> {
    let graphic_data = node
        .descendants()
        .find(|n| n.has_tag_name((A_NAMESPACE, "graphicData")) && n.attribute("uri") == Some(TABLE_URI))?;
    let table = child(graphic_data, A_NAMESPACE, "tbl")?;

    let header = child(table, A_NAMESPACE, "tblPr")
        .and_then(|properties| properties.attribute("firstRow"))
        .is_some_and(|flag| is_on(Some(flag)));

    let rows = children(table, A_NAMESPACE, "tr")
        .map(|row| children(row, A_NAMESPACE, "tc").map(parse_table_cell).collect())
        .collect();

    Some(Table { rows, header })
}

fn parse_table_cell(tc: Node<'_, '_>) -> TableCell {
    let mut runs = Vec::new();
    if let Some(tx_body) = child(tc, A_NAMESPACE, "txBody") {
        for p in children(tx_body, A_NAMESPACE, "p") {
            let paragraph = parse_paragraph(p);
            if paragraph.iter().all(|run| run.text.trim().is_empty()) {
                continue;
            }
            if !runs.is_empty() {
                runs.push(InlineRun::plain("\n"));
            }
            runs.extend(paragraph);
        }
    }
    runs
}

fn parse_pic(pic: Node<'_, '_>) -> Option<SlideElement> {
    let blip = descendant(pic, A_NAMESPACE, "blip")?;
    let id = relationship_id(blip, "embed")?;

    let properties = child(pic, P_NAMESPACE, "nvPicPr").and_then(|nv| child(nv, P_NAMESPACE, "cNvPr"));
    let alt = properties
        .and_then(|p| p.attribute("descr").filter(|d| !d.trim().is_empty()).or_else(|| p.attribute("name")))
        .unwrap_or("image");

    Some(SlideElement::Image {
        id: id.to_string(),
        alt: alt.to_string(),
    })
}

/// `Some((depth, ordered))` when the paragraph carries bullet or level properties.
fn parse_list_properties(p: Node<'_, '_>) -> Option<(u8, bool)> {
    let properties = child(p, A_NAMESPACE, "pPr")?;
    if child(properties, A_NAMESPACE, "buNone").is_some() {
        return None;
    }

    let ordered = child(properties, A_NAMESPACE, "buAutoNum").is_some();
    let bulleted = ordered || child(properties, A_NAMESPACE, "buChar").is_some();
    let level = properties.attribute("lvl").and_then(|lvl| lvl.parse::<u8>().ok());

    if !bulleted && level.is_none() {
        return None;
    }
    Some((level.unwrap_or(0), ordered))
}

fn parse_paragraph(p: Node<'_, '_>) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    for node in p.children().filter(Node::is_element) {
        if node.tag_name().namespace() != Some(A_NAMESPACE) {
            continue;
        }
        match node.tag_name().name() {
            "r" | "fld" => runs.push(parse_run(node)),
            "br" => runs.push(InlineRun::plain("\n")),
            _ => {}
        }
    }
    runs
}

fn parse_run(r: Node<'_, '_>) -> InlineRun {
    let (bold, italic) = match child(r, A_NAMESPACE, "rPr") {
        Some(properties) => (
            properties.attribute("b").is_some_and(|b| b == "1" || b.eq_ignore_ascii_case("true")),
            properties.attribute("i").is_some_and(|i| i == "1" || i.eq_ignore_ascii_case("true")),
        ),
        None => (false, false),
    };

    let text = child(r, A_NAMESPACE, "t").and_then(|t| t.text()).unwrap_or_default();
    InlineRun::styled(text, bold, italic)
}

fn plain_text(runs: &[InlineRun]) -> String {
    runs.iter().map(|run| run.text.as_str()).collect::<String>().replace('\n', " ")
}

struct SlideBuilder<'s, 'a> {
    package: &'s mut OoxmlPackage<'a>,
    slide_path: &'s str,
    relationships: &'s HashMap<String, Relationship>,
    embedder: &'s ImageEmbedder,
}

impl SlideBuilder<'_, '_> {
    fn emit(&mut self, number: usize, elements: Vec<SlideElement>, blocks: &mut Vec<Block>) -> Result<()> {
        let title_index = elements
            .iter()
            .position(|e| matches!(e, SlideElement::Title(title) if !title.is_empty()));

        let heading = match title_index.map(|i| &elements[i]) {
            Some(SlideElement::Title(title)) => format!("Slide {}: {}", number, title),
            _ => format!("Slide {}", number),
        };
        blocks.push(Block::heading(2, vec![InlineRun::plain(heading)]));

        for (index, element) in elements.into_iter().enumerate() {
            if Some(index) == title_index {
                continue;
            }
            match element {
                SlideElement::Title(title) => {
                    if !title.is_empty() {
                        blocks.push(Block::text(title));
                    }
                }
                SlideElement::Text(paragraphs) => {
                    for paragraph in paragraphs {
                        if paragraph.runs.iter().all(|run| run.text.trim().is_empty()) {
                            continue;
                        }
                        blocks.push(match paragraph.list {
                            Some((depth, ordered)) => Block::ListItem {
                                depth,
                                ordered,
                                runs: paragraph.runs,
                            },
                            None => Block::paragraph(paragraph.runs),
                        });
                    }
                }
                SlideElement::Table(table) => {
                    if !table.rows.is_empty() {
                        blocks.push(Block::Table(table));
                    }
                }
                SlideElement::Image { id, alt } => {
                    if let Some(block) = self.image(&id, &alt)? {
                        blocks.push(block);
                    }
                }
            }
        }
        Ok(())
    }

    fn image(&mut self, id: &str, alt: &str) -> Result<Option<Block>> {
        let Some(relationship) = self.relationships.get(id).filter(|rel| !rel.external) else {
            tracing::debug!(slide = self.slide_path, id, "Picture relationship missing or external");
            return Ok(None);
        };

        let path = resolve_target(self.slide_path, &relationship.target);
        match self.package.read_part(&path) {
            Ok(bytes) => self.embedder.embed(&bytes, mime_from_path(&path), alt),
            Err(err) => self.embedder.on_failure(err, alt),
        }
    }
}
