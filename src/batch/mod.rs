//! Batch ingestion orchestration.

pub mod runner;
pub mod types;

pub use runner::BatchOrchestrator;
pub use types::{
    new_batch_id, BatchEvent, BatchOutcome, BatchStatus, CancelHandle, DocumentFailure,
    DocumentResult, ErrorPolicy, NullSink, ProgressSink,
};
