//! Shared plumbing for Office Open XML containers (DOCX, PPTX, XLSX).
//!
//! Parts are read from an in-memory ZIP, relationship files are parsed into
//! id → target maps and relative targets are resolved against the part that
//! references them.

use crate::{DocdownError, Result};
use roxmltree::Node;
use std::collections::HashMap;
use std::io::{Cursor, Read};
use zip::ZipArchive;

pub const RELS_NAMESPACE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub const A_NAMESPACE: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// One `<Relationship>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// An OOXML package opened from memory.
pub struct OoxmlPackage<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> OoxmlPackage<'a> {
    pub fn open(data: &'a [u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| DocdownError::malformed_input_with_source("Failed to read OOXML archive (invalid format)", e))?;
        Ok(Self { archive })
    }

    pub fn has_part(&self, path: &str) -> bool {
        self.archive.index_for_name(path).is_some()
    }

    /// Read a part. A missing part is `MalformedInput`.
    pub fn read_part(&mut self, path: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(path).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => {
                DocdownError::malformed_input(format!("Part '{}' not found in archive", path))
            }
            other => DocdownError::from(other),
        })?;
        let mut contents = Vec::with_capacity(usize::try_from(file.size()).unwrap_or(0));
        file.read_to_end(&mut contents)
            .map_err(|e| DocdownError::malformed_input_with_source(format!("Failed to read part '{}'", path), e))?;
        Ok(contents)
    }

    /// Read a part as UTF-8 text, or `None` when it does not exist.
    pub fn read_optional_text(&mut self, path: &str) -> Result<Option<String>> {
        if !self.has_part(path) {
            return Ok(None);
        }
        self.read_text(path).map(Some)
    }

    pub fn read_text(&mut self, path: &str) -> Result<String> {
        let bytes = self.read_part(path)?;
        String::from_utf8(bytes)
            .map_err(|e| DocdownError::malformed_input_with_source(format!("Invalid UTF-8 in '{}'", path), e))
    }

    /// Relationships of a part, keyed by id. A part without a rels file has none.
    pub fn relationships_of(&mut self, part_path: &str) -> Result<HashMap<String, Relationship>> {
        match self.read_optional_text(&rels_path_for(part_path))? {
            Some(xml) => parse_relationships(&xml),
            None => Ok(HashMap::new()),
        }
    }

    pub fn part_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }
}

pub fn parse_relationships(xml: &str) -> Result<HashMap<String, Relationship>> {
    let doc = roxmltree::Document::parse(xml)?;
    let mut relationships = HashMap::new();

    for node in doc.descendants() {
        if node.has_tag_name("Relationship")
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
        {
            relationships.insert(
                id.to_string(),
                Relationship {
                    rel_type: node.attribute("Type").unwrap_or_default().to_string(),
                    target: target.to_string(),
                    external: node.attribute("TargetMode") == Some("External"),
                },
            );
        }
    }

    Ok(relationships)
}

/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_path_for(part_path: &str) -> String {
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_path),
    }
}

/// Resolve a relationship target against the part that owns the relationship.
pub fn resolve_target(part_path: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match part_path.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').filter(|s| !s.is_empty()).collect(),
        None => Vec::new(),
    };

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// True for `w:val`-style toggles: absent value or anything except 0/false/off means on.
pub fn is_on(value: Option<&str>) -> bool {
    !matches!(value, Some("0") | Some("false") | Some("off") | Some("none"))
}

pub fn child<'a, 'input>(node: Node<'a, 'input>, namespace: &str, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name && n.tag_name().namespace() == Some(namespace))
}

pub fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    namespace: &'a str,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name && n.tag_name().namespace() == Some(namespace))
}

pub fn descendant<'a, 'input>(node: Node<'a, 'input>, namespace: &str, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| n.is_element() && n.tag_name().name() == name && n.tag_name().namespace() == Some(namespace))
}

/// The `r:embed` (or `r:id`) attribute of a node.
pub fn relationship_id<'a>(node: Node<'a, '_>, local_name: &str) -> Option<&'a str> {
    node.attribute((RELS_NAMESPACE, local_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rels_path_for() {
        assert_eq!(rels_path_for("ppt/slides/slide1.xml"), "ppt/slides/_rels/slide1.xml.rels");
        assert_eq!(rels_path_for("word/document.xml"), "word/_rels/document.xml.rels");
        assert_eq!(rels_path_for("root.xml"), "_rels/root.xml.rels");
    }

    #[test]
    fn test_resolve_target_relative() {
        assert_eq!(resolve_target("ppt/slides/slide1.xml", "../media/image1.png"), "ppt/media/image1.png");
        assert_eq!(resolve_target("word/document.xml", "media/image1.png"), "word/media/image1.png");
        assert_eq!(
            resolve_target("xl/drawings/drawing1.xml", "../media/image2.jpeg"),
            "xl/media/image2.jpeg"
        );
        assert_eq!(resolve_target("xl/workbook.xml", "worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn test_resolve_target_absolute() {
        assert_eq!(resolve_target("ppt/presentation.xml", "/ppt/slides/slide2.xml"), "ppt/slides/slide2.xml");
    }

    #[test]
    fn test_parse_relationships() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="../media/image1.png"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;

        let rels = parse_relationships(xml).unwrap();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels["rId1"].target, "../media/image1.png");
        assert!(rels["rId1"].rel_type.ends_with("/image"));
        assert!(!rels["rId1"].external);
        assert!(rels["rId2"].external);
    }

    #[test]
    fn test_is_on() {
        assert!(is_on(None));
        assert!(is_on(Some("1")));
        assert!(is_on(Some("true")));
        assert!(!is_on(Some("0")));
        assert!(!is_on(Some("false")));
    }

    #[test]
    fn test_open_rejects_non_zip() {
        let err = OoxmlPackage::open(b"not a zip").err().unwrap();
        assert_eq!(err.kind(), crate::error::ErrorKind::MalformedInput);
    }
}
