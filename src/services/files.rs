//! File content extraction
//!
//! Turns downloaded document bytes into text suitable for AI analysis.
//! Extraction never fails with an error: unsupported, oversized or
//! unreadable files produce a marker-prefixed message instead, which the
//! message router treats as a terminal user-facing reply.

use serde_json::Value;
use tracing::{debug, warn};

use crate::config::settings::FilesConfig;

/// Prefix carried by every extraction failure message
pub const FAILURE_MARKER: &str = "❌";

/// Longest extracted content forwarded to the AI backend, in characters
const MAX_EXTRACT_CHARS: usize = 50_000;

/// Metadata about a processed file
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub filename: String,
    pub extension: String,
    pub size: u64,
    pub mime_type: String,
}

/// File processing service
#[derive(Debug, Clone)]
pub struct FileProcessor {
    config: FilesConfig,
}

impl FileProcessor {
    pub fn new(config: FilesConfig) -> Self {
        Self { config }
    }

    /// Lowercased extension without the dot, empty when absent
    pub fn extension_of(filename: &str) -> String {
        std::path::Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default()
    }

    pub fn is_supported_file(&self, filename: &str) -> bool {
        self.config
            .supported_extensions
            .contains(&Self::extension_of(filename))
    }

    pub fn is_supported_image(&self, filename: &str) -> bool {
        self.config
            .supported_image_extensions
            .contains(&Self::extension_of(filename))
    }

    /// Extract analyzable text from raw file bytes.
    ///
    /// Returns the extracted content (or a [`FAILURE_MARKER`] message) plus
    /// file metadata. The caller decides whether to forward the content to
    /// the AI backend by checking [`extraction_failed`].
    pub fn extract_content(&self, bytes: &[u8], filename: &str) -> (String, FileInfo) {
        let extension = Self::extension_of(filename);
        let info = FileInfo {
            filename: filename.to_string(),
            extension: extension.clone(),
            size: bytes.len() as u64,
            mime_type: mime_guess::from_path(filename)
                .first_or_octet_stream()
                .to_string(),
        };

        if info.size > self.config.max_file_size {
            warn!(filename = filename, size = info.size, "File exceeds size limit");
            let msg = format!(
                "{} File too large ({:.1} MB). Maximum size is {:.0} MB.",
                FAILURE_MARKER,
                info.size as f64 / 1_048_576.0,
                self.config.max_file_size as f64 / 1_048_576.0
            );
            return (msg, info);
        }

        if !self.config.supported_extensions.contains(&extension) {
            let msg = format!(
                "{} Unsupported file type '.{}'. Supported: {}",
                FAILURE_MARKER,
                extension,
                self.config.supported_extensions.join(", ")
            );
            return (msg, info);
        }

        let content = if extension == "json" {
            extract_json(bytes)
        } else {
            extract_text(bytes)
        };

        match content {
            Some(text) => {
                debug!(filename = filename, chars = text.len(), "Extracted file content");
                (text, info)
            }
            None => (
                format!(
                    "{} Could not read content from '{}'. The file may be corrupted or binary.",
                    FAILURE_MARKER, filename
                ),
                info,
            ),
        }
    }
}

/// Whether extracted content is a failure message rather than real content
pub fn extraction_failed(content: &str) -> bool {
    content.starts_with(FAILURE_MARKER)
}

/// Parse JSON and prepend a structure summary to the pretty-printed body
fn extract_json(bytes: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    let structure = match &value {
        Value::Object(map) => format!(
            "JSON object with {} keys: {}",
            map.len(),
            map.keys().take(20).cloned().collect::<Vec<_>>().join(", ")
        ),
        Value::Array(items) => format!("JSON array with {} items", items.len()),
        other => format!("JSON scalar ({})", json_type_name(other)),
    };
    let pretty = serde_json::to_string_pretty(&value).ok()?;
    Some(cap_chars(
        &format!("Structure: {}\n\n{}", structure, pretty),
        MAX_EXTRACT_CHARS,
    ))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode text-family files, appending basic line/word/char counts.
/// NUL bytes mean the payload is binary despite its extension.
fn extract_text(bytes: &[u8]) -> Option<String> {
    if bytes.contains(&0) {
        return None;
    }
    let text = String::from_utf8_lossy(bytes);
    let lines = text.lines().count();
    let words = text.split_whitespace().count();
    let chars = text.chars().count();
    Some(cap_chars(
        &format!(
            "{}\n\n[{} lines, {} words, {} characters]",
            text, lines, words, chars
        ),
        MAX_EXTRACT_CHARS,
    ))
}

fn cap_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}
