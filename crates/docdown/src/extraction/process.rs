//! External collaborator processes.
//!
//! Collaborators (LibreOffice, a PDF text command) run as child processes with a
//! hard timeout. Input is staged in a per-call scratch directory that is removed
//! when the guard drops, so concurrent conversions never share files.

use crate::{DocdownError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio::time::{Duration, timeout};

/// RAII guard for a uniquely named scratch directory.
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub async fn new(label: &str) -> Result<Self> {
        let path = std::env::temp_dir().join(format!("docdown_{}_{}", label, uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&path).await.map_err(|e| {
            DocdownError::conversion_unavailable_with_source(
                format!("Failed to create scratch directory '{}'", path.display()),
                e,
            )
        })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `content` to `name` inside the directory and return its path.
    pub async fn stage(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        let target = self.path.join(name);
        tokio::fs::write(&target, content).await.map_err(|e| {
            DocdownError::conversion_unavailable_with_source(
                format!("Failed to stage input at '{}'", target.display()),
                e,
            )
        })?;
        Ok(target)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        // Synchronous so cleanup also happens when no runtime is left to spawn on.
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            tracing::debug!(path = %self.path.display(), error = %e, "Failed to remove scratch directory");
        }
    }
}

/// Run `program` with `args`, waiting at most `timeout_secs`.
///
/// The child is killed when the deadline passes.
///
/// # Errors
///
/// - `ConversionTimeout` when the deadline passes
/// - `ConversionUnavailable` when the program cannot be started or exits non-zero
pub async fn run_with_timeout<S: AsRef<OsStr>>(
    program: impl AsRef<OsStr>,
    args: &[S],
    timeout_secs: u64,
    label: &str,
) -> Result<Output> {
    let program = program.as_ref();
    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            DocdownError::conversion_unavailable_with_source(
                format!("Failed to execute {} at '{}'", label, program.to_string_lossy()),
                e,
            )
        })?;

    let child_id = child.id();
    tracing::debug!(label, pid = ?child_id, timeout_secs, "Started collaborator process");

    let output = match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(DocdownError::conversion_unavailable_with_source(
                format!("Failed to wait for {}", label),
                e,
            ));
        }
        Err(_) => {
            // The cancelled future drops the child, and kill_on_drop terminates it.
            tracing::warn!(label, pid = ?child_id, timeout_secs, "Collaborator process timed out");
            return Err(DocdownError::timeout(
                format!("{} did not finish within {} seconds", label, timeout_secs),
                timeout_secs,
            ));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() { stdout } else { stderr };
        return Err(DocdownError::conversion_unavailable(format!(
            "{} exited with code {}: {}",
            label,
            output.status.code().unwrap_or(-1),
            detail.trim()
        )));
    }

    Ok(output)
}
