//! End-to-end conversions of every supported format family.

mod common;

use docdown::{ConversionConfig, ErrorKind, FileType, convert};

fn config() -> ConversionConfig {
    ConversionConfig::default()
}

#[tokio::test]
async fn test_markdown_is_passed_through() {
    let result = convert("notes.md", b"# Notes\r\n\r\n- one\r\n- two", &config()).await.unwrap();

    assert_eq!(result.filename, "notes.md");
    assert_eq!(result.file_type, FileType::Markdown);
    assert_eq!(result.markdown, "# Notes\n\n- one\n- two");
}

#[tokio::test]
async fn test_markdown_rejects_invalid_utf8() {
    let err = convert("notes.md", &[0xff, 0xfe, 0x00], &config()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
    assert_eq!(err.format(), Some("markdown"));
}

#[cfg(feature = "office")]
#[tokio::test]
async fn test_docx_headings_table_and_text() {
    let body = r#"
<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Report</w:t></w:r></w:p>
<w:p><w:r><w:t xml:space="preserve">Sales were </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>up</w:t></w:r></w:p>
<w:tbl>
<w:tr><w:tc><w:p><w:r><w:t>Region</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>Total</w:t></w:r></w:p></w:tc></w:tr>
<w:tr><w:tc><w:p><w:r><w:t>EU</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>12</w:t></w:r></w:p></w:tc></w:tr>
</w:tbl>
<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Outlook</w:t></w:r></w:p>"#;
    let styles = common::docx_styles();
    let data = common::docx(body, &[("word/styles.xml", styles.as_bytes())]);

    let result = convert("report.docx", &data, &config()).await.unwrap();

    assert_eq!(result.file_type, FileType::Docx);
    assert_eq!(
        result.markdown,
        "# Report\n\nSales were **up**\n\n| Region | Total |\n| --- | --- |\n| EU | 12 |\n\n## Outlook"
    );
}

#[cfg(feature = "office")]
#[tokio::test]
async fn test_docx_image_is_inlined() {
    let data = common::docx_with_image("image1.png", common::PNG_1X1);

    let result = convert("logo.docx", &data, &config()).await.unwrap();

    let parts: Vec<&str> = result.markdown.split("\n\n").collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "Before");
    assert!(parts[1].starts_with("![Logo](data:image/png;base64,"));
    assert_eq!(parts[2], "After");
}

#[cfg(feature = "office")]
#[tokio::test]
async fn test_pptx_slides_in_order() {
    let slides = vec![
        common::pptx_slide(&format!("{}{}", common::pptx_title("Welcome"), common::pptx_text("Agenda"))),
        common::pptx_slide(&common::pptx_text("Numbers")),
    ];
    let data = common::pptx(&slides);

    let result = convert("deck.pptx", &data, &config()).await.unwrap();

    assert_eq!(result.file_type, FileType::Pptx);
    assert_eq!(result.markdown, "## Slide 1: Welcome\n\nAgenda\n\n## Slide 2\n\nNumbers");
}

#[cfg(feature = "office")]
#[tokio::test]
async fn test_ppt_holding_an_ooxml_container_is_read_directly() {
    let slides = vec![common::pptx_slide(&common::pptx_title("Renamed"))];
    let data = common::pptx(&slides);

    let mut config = config();
    config.libreoffice.binary = Some("/nonexistent/soffice".into());

    let result = convert("renamed.ppt", &data, &config).await.unwrap();
    assert_eq!(result.file_type, FileType::Ppt);
    assert_eq!(result.markdown, "## Slide 1: Renamed");
}

#[cfg(feature = "office")]
#[tokio::test]
async fn test_legacy_ppt_without_libreoffice_is_unavailable() {
    let mut config = config();
    config.libreoffice.binary = Some("/nonexistent/soffice".into());

    let err = convert("legacy.ppt", b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1 not really", &config)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConversionUnavailable);
    assert_eq!(err.filename(), Some("legacy.ppt"));
    assert_eq!(err.format(), Some("ppt"));
}

#[cfg(feature = "excel")]
#[tokio::test]
async fn test_xlsx_sheets_become_sections() {
    let q1: &[&[&str]] = &[&["Region", "Sales"], &["EU", "100"], &["US", "250.5"]];
    let data = common::xlsx(&[("Q1", q1), ("Blank", &[])]);

    let result = convert("report.xlsx", &data, &config()).await.unwrap();

    assert_eq!(result.file_type, FileType::Xlsx);
    assert_eq!(
        result.markdown,
        "## Q1\n\n| Region | Sales |\n| --- | --- |\n| EU | 100 |\n| US | 250.5 |\n\n## Blank\n\n*Empty sheet*"
    );
}

#[cfg(feature = "excel")]
#[tokio::test]
async fn test_xlsm_is_read_like_xlsx() {
    let rows: &[&[&str]] = &[&["a", "b"], &["1", "2"]];
    let data = common::xlsx(&[("Data", rows)]);

    let result = convert("macros.xlsm", &data, &config()).await.unwrap();
    assert_eq!(result.markdown, "## Data\n\n| a | b |\n| --- | --- |\n| 1 | 2 |");
}

#[cfg(feature = "excel")]
#[tokio::test]
async fn test_xlsx_anchored_image_follows_its_sheet_table() {
    let rows: &[&[&str]] = &[&["A", "B"], &["1", "2"]];
    let data = common::xlsx_with_image("Q1", rows, common::PNG_1X1);

    let result = convert("chart.xlsx", &data, &config()).await.unwrap();

    let (table, image) = result.markdown.split_once("\n\n![").unwrap();
    assert_eq!(table, "## Q1\n\n| A | B |\n| --- | --- |\n| 1 | 2 |");
    assert!(image.starts_with("Q1!B3](data:image/png;base64,iVBORw0KGgo"));
    assert!(image.ends_with(')'));
}

#[cfg(feature = "excel")]
#[tokio::test]
async fn test_xlsm_image_failure_is_not_sent_to_libreoffice() {
    let rows: &[&[&str]] = &[&["A"]];
    let data = common::xlsx_with_image("Q1", rows, b"");
    let mut config = config();
    config.images.on_failure = docdown::ImageFailurePolicy::Fail;
    config.libreoffice.binary = Some("/nonexistent/soffice".into());

    for filename in ["book.xlsx", "book.xlsm"] {
        let err = convert(filename, &data, &config).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EncodingFailure, "{filename}: {err}");
        assert_eq!(err.filename(), Some(filename));
    }
}

#[cfg(feature = "excel")]
#[tokio::test]
async fn test_unreadable_xls_falls_back_to_libreoffice() {
    let mut config = config();
    config.libreoffice.binary = Some("/nonexistent/soffice".into());

    let err = convert("old.xls", b"definitely not a workbook", &config).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConversionUnavailable);
    assert_eq!(err.format(), Some("xls"));
}

#[cfg(feature = "excel")]
#[tokio::test]
async fn test_broken_xlsx_is_malformed() {
    let err = convert("broken.xlsx", b"PK\x03\x04 truncated", &config()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
    assert!(err.kind().is_client_error());
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn test_pdf_pages_are_separated() {
    let data = common::pdf(&["Hello World", "Second page"]);

    let result = convert("paper.pdf", &data, &config()).await.unwrap();

    assert_eq!(result.file_type, FileType::Pdf);
    assert_eq!(result.markdown, "Hello World\n\n---\n\nSecond page");
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn test_pdf_without_pages_is_empty() {
    let data = common::pdf(&[]);

    let result = convert("empty.pdf", &data, &config()).await.unwrap();
    assert_eq!(result.markdown, "");
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn test_scanned_pdf_without_text_command_is_unavailable() {
    let data = common::pdf(&["", ""]);

    let err = convert("scan.pdf", &data, &config()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConversionUnavailable);
    assert_eq!(err.filename(), Some("scan.pdf"));
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn test_garbage_pdf_is_malformed() {
    let err = convert("junk.pdf", b"%PDF-1.7 nothing else", &config()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedInput);
    assert_eq!(err.format(), Some("pdf"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_conversions_do_not_interfere() {
    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..16 {
        tasks.spawn(async move {
            let filename = format!("doc{i}.md");
            let content = format!("# Document {i}");
            let result = convert(&filename, content.as_bytes(), &ConversionConfig::default())
                .await
                .unwrap();
            (i, result)
        });
    }

    let mut seen = 0;
    while let Some(joined) = tasks.join_next().await {
        let (i, result) = joined.unwrap();
        assert_eq!(result.filename, format!("doc{i}.md"));
        assert_eq!(result.markdown, format!("# Document {i}"));
        seen += 1;
    }
    assert_eq!(seen, 16);
}
