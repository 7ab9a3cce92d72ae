//! Text extraction from uploaded files.
//!
//! Only plain-text formats are extracted here; binary document formats need
//! format-specific parsers and are rejected with the supported list.

use corpusdb_core::ExtractError;
use std::path::Path;
use tokio::fs;

/// Extensions read as plain text. Extensionless files default to `txt`.
const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "json", "html", "htm", "csv", "xml", "yaml", "yml",
];

/// Return the lowercased extension for `path`, validating support.
pub fn detect_extension(path: &Path) -> Result<String, ExtractError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_else(|| "txt".to_string());

    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(ExtractError::UnsupportedType(format!(
            "'.{ext}'. Supported: {}",
            TEXT_EXTENSIONS.join(", ")
        )))
    }
}

/// Check whether `path` has a supported extension.
#[must_use]
pub fn is_supported(path: &Path) -> bool {
    detect_extension(path).is_ok()
}

/// Read a supported file and return its text content.
pub async fn read_text(path: &Path) -> Result<String, ExtractError> {
    detect_extension(path)?;
    Ok(fs::read_to_string(path).await?)
}
