//! Seams to the remote analysis pipeline.
//!
//! Two traits define the boundary the orchestrator depends on:
//! - `UploadTransport`: one outbound upload per call, returns an opaque id
//! - `ProcessingInvoker`: triggers analysis for an id, returns raw JSON verbatim
//!
//! Neither retries; transient-failure recovery belongs in a decorator around
//! an implementation, not in the orchestrator's contract.

pub mod http;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::DocumentDescriptor;
use crate::error::Result;

pub use http::HttpAnalysisClient;

/// Opaque identifier assigned by the ingestion endpoint. Valid only for the
/// remote processing session; never reused across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sends one document to the ingestion endpoint.
pub trait UploadTransport: Send + Sync {
    /// Upload a document, returning the id the pipeline assigned to it.
    /// One outbound request per call, no retries.
    fn upload(
        &self,
        doc: &DocumentDescriptor,
    ) -> impl Future<Output = Result<DocumentId>> + Send;
}

/// Triggers the analysis pipeline for an uploaded document.
pub trait ProcessingInvoker: Send + Sync {
    /// Run analysis and return the raw multi-section payload verbatim —
    /// no validation or shaping, that is the normalizer's job.
    fn process(&self, id: &DocumentId) -> impl Future<Output = Result<Value>> + Send;
}
