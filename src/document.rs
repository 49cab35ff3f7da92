//! Document descriptors and upstream input constraints.
//!
//! The UI layer gates file type and size before handing files over, but the
//! orchestrator re-checks so it stays safely reusable without that gate:
//! a violating descriptor fails loudly instead of being silently truncated.
//! Type checks go by magic bytes, not extensions — extensions can be wrong.

use std::path::Path;

use crate::error::{PipelineError, Result};

/// MIME types the remote pipeline accepts.
pub const ACCEPTED_MIME_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png"];

/// Per-file size cap enforced upstream and re-checked here.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MiB

/// Immutable description of one file to process. Owned by the batch run that
/// references it and discarded when the run completes.
#[derive(Debug, Clone)]
pub struct DocumentDescriptor {
    pub name: String,
    pub byte_size: u64,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl DocumentDescriptor {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: sanitize_filename(&name.into()),
            byte_size: content.len() as u64,
            mime_type: mime_type.into(),
            content,
        }
    }

    /// Build a descriptor from a file on disk. The MIME type comes from the
    /// content's magic bytes, falling back to the extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document");

        let content = std::fs::read(path)
            .map_err(|e| PipelineError::validation(name, format!("could not read file: {e}")))?;

        let mime_type = sniff_mime(&content)
            .map(str::to_string)
            .unwrap_or_else(|| {
                mime_guess::from_path(path)
                    .first_or_octet_stream()
                    .essence_str()
                    .to_string()
            });

        Ok(Self::new(name, mime_type, content))
    }

    /// Enforce the upstream constraints: accepted MIME type, size cap, and
    /// content that actually matches the declared type.
    pub fn validate(&self) -> Result<()> {
        if self.content.is_empty() {
            return Err(PipelineError::validation(&self.name, "file is empty"));
        }

        if self.byte_size > MAX_FILE_SIZE {
            return Err(PipelineError::validation(
                &self.name,
                format!(
                    "{:.1} MiB exceeds the {} MiB limit",
                    self.byte_size as f64 / (1024.0 * 1024.0),
                    MAX_FILE_SIZE / (1024 * 1024)
                ),
            ));
        }

        if !ACCEPTED_MIME_TYPES.contains(&self.mime_type.as_str()) {
            return Err(PipelineError::validation(
                &self.name,
                format!(
                    "unsupported type '{}' (accepted: {})",
                    self.mime_type,
                    ACCEPTED_MIME_TYPES.join(", ")
                ),
            ));
        }

        match sniff_mime(&self.content) {
            Some(sniffed) if sniffed == self.mime_type => Ok(()),
            Some(sniffed) => Err(PipelineError::validation(
                &self.name,
                format!(
                    "content looks like {sniffed} but descriptor declares {}",
                    self.mime_type
                ),
            )),
            None => Err(PipelineError::validation(
                &self.name,
                format!("content does not match any accepted type (declared {})", self.mime_type),
            )),
        }
    }
}

/// Detect an accepted MIME type from the file header.
fn sniff_mime(content: &[u8]) -> Option<&'static str> {
    match content {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => Some("application/pdf"),
        // JPEG: starts with FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        // PNG: starts with 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        _ => None,
    }
}

/// Sanitize a filename — strip path components, limit length.
pub fn sanitize_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");

    let clean: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .take(255)
        .collect();

    if clean.is_empty() {
        "document".to_string()
    } else {
        clean
    }
}
