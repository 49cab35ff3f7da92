//! Types shared by the batch orchestrator and its observers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::normalize::NormalizedResult;
use crate::remote::DocumentId;

/// How the orchestrator reacts when one document fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop at the first failure; remaining documents are never uploaded.
    #[default]
    FailFast,
    /// Record the failure and move on to the next document.
    ContinueOnError,
}

/// Terminal disposition of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every document processed successfully.
    Completed,
    /// Some documents succeeded, some failed (continue-on-error only).
    PartiallyCompleted,
    /// No document succeeded.
    Failed,
    /// Stopped by a cancellation request; completed documents keep their results.
    Cancelled,
}

/// Successful outcome for one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    pub document: String,
    pub document_id: DocumentId,
    pub result: NormalizedResult,
    pub duration_ms: u64,
}

/// Failure record for one document (continue-on-error keeps processing).
#[derive(Debug)]
pub struct DocumentFailure {
    /// Zero-based position in the submitted batch.
    pub index: usize,
    pub document: String,
    pub error: PipelineError,
}

/// Everything a caller gets back from a finished run.
#[derive(Debug)]
pub struct BatchOutcome {
    pub batch_id: String,
    pub status: BatchStatus,
    pub results: Vec<DocumentResult>,
    pub failures: Vec<DocumentFailure>,
    pub duration_ms: u64,
    pub finished_at: chrono::NaiveDateTime,
}

impl BatchOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == BatchStatus::Completed
    }
}

/// Progress events, emitted in document order, exactly one terminal
/// `DocumentDone`/`DocumentFailed` per attempted document.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BatchEvent {
    Started {
        batch_id: String,
        document_count: usize,
    },
    DocumentDone {
        /// Zero-based position in the batch.
        index: usize,
        /// Overall progress in (0, 1]: (index + 1) / document_count.
        fraction: f64,
        document: String,
        result: NormalizedResult,
    },
    DocumentFailed {
        index: usize,
        fraction: f64,
        document: String,
        error: String,
    },
    Completed {
        processed: usize,
        failed: usize,
        duration_ms: u64,
    },
    Failed {
        document: String,
        error: String,
    },
    Cancelled {
        completed: usize,
        total: usize,
    },
}

/// Receives progress events during a run. Implementations must be fast;
/// the orchestrator calls them inline between documents.
pub trait ProgressSink: Send + Sync {
    fn on_event(&self, event: &BatchEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(&BatchEvent) + Send + Sync,
{
    fn on_event(&self, event: &BatchEvent) {
        self(event)
    }
}

/// Sink that discards all events.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_event(&self, _event: &BatchEvent) {}
}

/// Cooperative cancellation flag, checked between documents. The document
/// in flight when `cancel` is called still finishes.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub(crate) fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Fresh identifier for a batch run.
pub fn new_batch_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
