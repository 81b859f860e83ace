//! Configuration loading and management.
//!
//! [`ConversionConfig`] can be built in code, loaded from TOML, YAML or JSON,
//! or discovered by walking up from the current directory.

use crate::{DocdownError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Names searched by [`ConversionConfig::discover`], in order, in each directory.
pub const CONFIG_FILE_NAMES: &[&str] = &["docdown.toml", "docdown.yaml", "docdown.yml", "docdown.json"];

/// Main conversion configuration.
///
/// # Example
///
/// ```rust
/// use docdown::{ConversionConfig, ImageFailurePolicy};
///
/// let mut config = ConversionConfig::default();
/// config.images.on_failure = ImageFailurePolicy::Fail;
/// config.libreoffice.timeout_secs = 60;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionConfig {
    #[serde(default)]
    pub images: ImageConfig,

    #[serde(default)]
    pub libreoffice: LibreOfficeConfig,

    #[serde(default)]
    pub pdf: PdfConfig,

    #[serde(default)]
    pub markdown: MarkdownConfig,
}

/// What to do when an embedded image cannot be encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFailurePolicy {
    /// Replace the image with a paragraph holding its alt text and keep converting.
    #[default]
    Skip,
    /// Abort the whole conversion with `EncodingFailure`.
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Embed images as data URIs. When false, images are dropped.
    #[serde(default = "default_true")]
    pub embed: bool,

    /// MIME types that are embedded. Anything else is dropped silently.
    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,

    #[serde(default)]
    pub on_failure: ImageFailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibreOfficeConfig {
    /// Explicit soffice binary. When set, no other location is tried.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<PathBuf>,

    #[serde(default = "default_libreoffice_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfConfig {
    #[serde(default = "default_true")]
    pub extract_images: bool,

    /// Command that prints the text of a PDF without a text layer, pages separated by `\f`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_command: Option<ExternalCommand>,

    #[serde(default = "default_pdf_timeout")]
    pub timeout_secs: u64,
}

/// An external program invocation. `{input}` in any argument is replaced by the input path;
/// when no argument contains it, the path is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Remove image links whose target is not an inline `data:` URI.
    #[serde(default)]
    pub strip_external_images: bool,
}

fn default_true() -> bool {
    true
}
fn default_allowed_mime_types() -> Vec<String> {
    vec!["image/png".to_string(), "image/jpeg".to_string(), "image/gif".to_string()]
}
fn default_libreoffice_timeout() -> u64 {
    300
}
fn default_pdf_timeout() -> u64 {
    120
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            embed: true,
            allowed_mime_types: default_allowed_mime_types(),
            on_failure: ImageFailurePolicy::default(),
        }
    }
}

impl Default for LibreOfficeConfig {
    fn default() -> Self {
        Self {
            binary: None,
            timeout_secs: default_libreoffice_timeout(),
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            extract_images: true,
            text_command: None,
            timeout_secs: default_pdf_timeout(),
        }
    }
}

impl ImageConfig {
    pub fn allows(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    }
}

impl ExternalCommand {
    /// Arguments with the input path substituted or appended.
    pub fn args_for(&self, input: &Path) -> Vec<String> {
        let input = input.to_string_lossy();
        let mut substituted = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                if arg.contains("{input}") {
                    substituted = true;
                    arg.replace("{input}", &input)
                } else {
                    arg.clone()
                }
            })
            .collect();

        if !substituted {
            args.push(input.into_owned());
        }
        args
    }
}

impl ConversionConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `DocdownError::Validation` if the file cannot be read or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| DocdownError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| DocdownError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| DocdownError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, choosing the parser from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(DocdownError::validation(format!(
                "Unsupported config file format: {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Discover a configuration file in the current directory or its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(DocdownError::Io)?;

        loop {
            for name in CONFIG_FILE_NAMES {
                let candidate = current.join(name);
                if candidate.is_file() {
                    tracing::debug!(path = %candidate.display(), "Discovered configuration file");
                    return Ok(Some(Self::from_file(candidate)?));
                }
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    pub fn validate(&self) -> Result<()> {
        if self.libreoffice.timeout_secs == 0 {
            return Err(DocdownError::validation("libreoffice.timeout_secs must be greater than 0"));
        }
        if self.pdf.timeout_secs == 0 {
            return Err(DocdownError::validation("pdf.timeout_secs must be greater than 0"));
        }
        if let Some(command) = &self.pdf.text_command
            && command.program.trim().is_empty()
        {
            return Err(DocdownError::validation("pdf.text_command.program must not be empty"));
        }
        if let Some(bad) = self
            .images
            .allowed_mime_types
            .iter()
            .find(|mime| !mime.to_ascii_lowercase().starts_with("image/"))
        {
            return Err(DocdownError::validation(format!(
                "images.allowed_mime_types entry '{}' is not an image type",
                bad
            )));
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DocdownError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
