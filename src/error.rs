//! Error taxonomy for the ingestion pipeline.
//!
//! Four distinguishable kinds so a consumer can decide retry-ability:
//! transport and processing failures are plausibly transient, validation and
//! state errors are not. The normalizer has no variant here — it is total and
//! never fails.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The document descriptor violates the upstream input constraints
    /// (size, MIME type, or content that contradicts the declared type).
    #[error("Invalid document '{document}': {reason}")]
    Validation { document: String, reason: String },

    /// The ingestion endpoint was unreachable or rejected the upload.
    #[error("Upload failed for '{document}': {message}")]
    Transport { document: String, message: String },

    /// The analysis endpoint was unreachable or rejected the request.
    #[error("Processing failed for document {document_id}: {message}")]
    Processing { document_id: String, message: String },

    /// `run()` was called while a batch was already running.
    #[error("A batch is already running on this orchestrator")]
    InvalidState,
}

impl PipelineError {
    /// Whether the failure is plausibly transient. Retry policy itself is out
    /// of scope — callers wrap the transport seams if they want backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Processing { .. })
    }

    pub(crate) fn validation(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            document: document.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn transport(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            document: document.into(),
            message: message.into(),
        }
    }

    pub(crate) fn processing(document_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Processing {
            document_id: document_id.into(),
            message: message.into(),
        }
    }
}

/// Pipeline result type.
pub type Result<T> = std::result::Result<T, PipelineError>;
