//! Normalization of legacy Office formats through headless LibreOffice.
//!
//! Legacy `.ppt` decks, and `.xls`/`.xlsm` workbooks that cannot be read
//! directly, are converted to their OOXML equivalent with
//! `soffice --headless --convert-to` and then go through the normal path.
//!
//! # System Requirement
//!
//! LibreOffice must be installed:
//! - **macOS**: `brew install --cask libreoffice`
//! - **Linux**: `apt install libreoffice` or `dnf install libreoffice`
//! - **Windows**: `winget install LibreOffice.LibreOffice`
//!
//! A binary configured through [`LibreOfficeConfig::binary`] is used as-is and
//! never replaced by a search.

use crate::core::config::LibreOfficeConfig;
use crate::extraction::process::{ScratchDir, run_with_timeout};
use crate::{DocdownError, Result};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

fn libreoffice_install_message() -> String {
    "LibreOffice (soffice/libreoffice) is required to read legacy Office formats (.ppt, .xls). \
Install: macOS: 'brew install --cask libreoffice', \
Linux: 'apt install libreoffice', \
Windows: 'winget install LibreOffice.LibreOffice'. \
If LibreOffice is installed in a custom location, set DOCDOWN_LIBREOFFICE_PATH or `libreoffice.binary` in the config file."
        .to_string()
}

fn soffice_candidates() -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let mut push_candidate = |path: PathBuf| {
        if seen.insert(path.clone()) {
            candidates.push(path);
        }
    };

    for var in ["DOCDOWN_LIBREOFFICE_PATH", "SOFFICE_PATH", "LIBREOFFICE_PATH"] {
        if let Some(value) = env::var_os(var).filter(|v| !v.is_empty()) {
            push_candidate(PathBuf::from(value));
        }
    }

    if cfg!(target_os = "macos") {
        push_candidate(PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/soffice"));
        push_candidate(PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/libreoffice"));
    }

    if cfg!(target_os = "windows") {
        push_candidate(PathBuf::from("C:\\Program Files\\LibreOffice\\program\\soffice.exe"));
    }

    if let Some(prefix) = env::var_os("HOMEBREW_PREFIX") {
        let prefix_path = PathBuf::from(prefix);
        push_candidate(prefix_path.join("bin/soffice"));
        push_candidate(prefix_path.join("bin/libreoffice"));
    }

    if let Some(path_env) = env::var_os("PATH") {
        for dir in env::split_paths(&path_env) {
            push_candidate(dir.join("soffice"));
            push_candidate(dir.join("libreoffice"));
            push_candidate(dir.join("soffice.exe"));
        }
    }

    candidates
}

fn is_executable_file(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.is_file()).unwrap_or(false)
}

/// Find the soffice binary to use.
///
/// # Errors
///
/// `ConversionUnavailable` when the configured binary does not exist or no
/// installation can be found.
pub fn locate_soffice_binary(config: &LibreOfficeConfig) -> Result<PathBuf> {
    if let Some(configured) = &config.binary {
        if is_executable_file(configured) {
            return Ok(configured.clone());
        }
        return Err(DocdownError::conversion_unavailable(format!(
            "Configured LibreOffice binary '{}' does not exist",
            configured.display()
        )));
    }

    soffice_candidates()
        .into_iter()
        .find(|candidate| is_executable_file(candidate))
        .ok_or_else(|| DocdownError::conversion_unavailable(libreoffice_install_message()))
}

/// Convert `content` (a `.{source_extension}` file) to `target_extension`.
///
/// Returns the bytes of the converted file.
pub async fn normalize_with_libreoffice(
    content: &[u8],
    source_extension: &str,
    target_extension: &str,
    config: &LibreOfficeConfig,
) -> Result<Vec<u8>> {
    let soffice_path = locate_soffice_binary(config)?;

    let scratch = ScratchDir::new("libreoffice").await?;
    let input_path = scratch.stage(&format!("input.{}", source_extension), content).await?;
    let output_dir = scratch.path().join("out");
    let profile_dir = scratch.path().join("profile");

    // A private profile lets several conversions run at once.
    let args: Vec<std::ffi::OsString> = vec![
        format!("-env:UserInstallation=file://{}", profile_dir.display()).into(),
        "--headless".into(),
        "--convert-to".into(),
        target_extension.into(),
        "--outdir".into(),
        output_dir.clone().into_os_string(),
        input_path.into_os_string(),
    ];

    tracing::debug!(
        soffice = %soffice_path.display(),
        from = source_extension,
        to = target_extension,
        "Normalizing legacy document with LibreOffice"
    );
    run_with_timeout(&soffice_path, &args, config.timeout_secs, "LibreOffice").await?;

    let converted_path = output_dir.join(format!("input.{}", target_extension));
    let converted = tokio::fs::read(&converted_path).await.map_err(|e| {
        DocdownError::conversion_unavailable_with_source(
            format!(
                "LibreOffice did not produce '{}' output for the .{} input",
                target_extension, source_extension
            ),
            e,
        )
    })?;

    if converted.is_empty() {
        return Err(DocdownError::conversion_unavailable(format!(
            "LibreOffice produced an empty .{} file",
            target_extension
        )));
    }

    Ok(converted)
}
