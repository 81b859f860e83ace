//! Conversions that go through external programs, exercised with small `sh` stand-ins.

#![cfg(unix)]

mod common;

#[cfg(any(feature = "office", feature = "pdf"))]
use docdown::{ConversionConfig, ErrorKind, convert};

#[cfg(feature = "pdf")]
fn text_command(script: &str) -> docdown::ExternalCommand {
    docdown::ExternalCommand {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
    }
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn test_text_command_fills_pages_without_text_layer() {
    let mut config = ConversionConfig::default();
    config.pdf.text_command = Some(text_command(r"printf 'Page one\fPage two'"));

    let result = convert("scan.pdf", &common::pdf(&["", ""]), &config).await.unwrap();

    assert_eq!(result.markdown, "Page one\n\n---\n\nPage two");
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn test_text_command_receives_the_pdf_path() {
    let mut config = ConversionConfig::default();
    config.pdf.text_command = Some(docdown::ExternalCommand {
        program: "sh".to_string(),
        args: vec![
            "-c".to_string(),
            r#"head -c 5 "$1""#.to_string(),
            "sh".to_string(),
            "{input}".to_string(),
        ],
    });

    let result = convert("scan.pdf", &common::pdf(&[""]), &config).await.unwrap();

    assert_eq!(result.markdown, "%PDF-");
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn test_text_command_timeout() {
    let mut config = ConversionConfig::default();
    config.pdf.text_command = Some(text_command("sleep 5"));
    config.pdf.timeout_secs = 1;

    let err = convert("slow.pdf", &common::pdf(&[""]), &config).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConversionTimeout);
    assert!(!err.kind().is_client_error());
    assert_eq!(err.filename(), Some("slow.pdf"));
    assert!(matches!(err.root(), docdown::DocdownError::ConversionTimeout { timeout_secs: 1, .. }));
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn test_text_command_failure_is_unavailable_not_empty() {
    let mut config = ConversionConfig::default();
    config.pdf.text_command = Some(text_command("echo broken >&2; exit 3"));

    let err = convert("scan.pdf", &common::pdf(&[""]), &config).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ConversionUnavailable);
    assert!(err.to_string().contains("broken"));
}

#[cfg(feature = "pdf")]
#[tokio::test]
async fn test_text_command_with_no_output_is_unavailable() {
    let mut config = ConversionConfig::default();
    config.pdf.text_command = Some(text_command("true"));

    let err = convert("scan.pdf", &common::pdf(&[""]), &config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConversionUnavailable);
}

#[cfg(feature = "office")]
fn fake_soffice(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("soffice");
    std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[cfg(feature = "office")]
#[tokio::test]
async fn test_legacy_ppt_is_normalized_then_read() {
    let dir = tempfile::tempdir().unwrap();
    let converted = dir.path().join("converted.pptx");
    let slides = vec![common::pptx_slide(&common::pptx_title("From PPT"))];
    std::fs::write(&converted, common::pptx(&slides)).unwrap();

    let script = fake_soffice(
        dir.path(),
        &format!(
            "while [ \"$1\" != \"--outdir\" ]; do shift; done\ncp \"{}\" \"$2/input.pptx\"",
            converted.display()
        ),
    );

    let mut config = ConversionConfig::default();
    config.libreoffice.binary = Some(script);

    let result = convert("legacy.ppt", b"\xD0\xCF\x11\xE0 binary deck", &config).await.unwrap();
    assert_eq!(result.markdown, "## Slide 1: From PPT");
}

#[cfg(feature = "office")]
#[tokio::test]
async fn test_libreoffice_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let script = fake_soffice(dir.path(), "sleep 5");

    let mut config = ConversionConfig::default();
    config.libreoffice.binary = Some(script);
    config.libreoffice.timeout_secs = 1;

    let err = convert("legacy.ppt", b"\xD0\xCF\x11\xE0", &config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConversionTimeout);
    assert_eq!(err.format(), Some("ppt"));
}

#[cfg(feature = "office")]
#[tokio::test]
async fn test_libreoffice_without_output_is_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let script = fake_soffice(dir.path(), "exit 0");

    let mut config = ConversionConfig::default();
    config.libreoffice.binary = Some(script);

    let err = convert("legacy.ppt", b"\xD0\xCF\x11\xE0", &config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConversionUnavailable);
}
