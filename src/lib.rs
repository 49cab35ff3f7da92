//! invoiceflow — batch invoice ingestion and result normalization.
//!
//! Feeds local invoice files (PDF/JPEG/PNG scans) through a remote analysis
//! pipeline one at a time and turns the pipeline's loosely-shaped responses
//! into a canonical, fully-populated record.
//!
//! Modules:
//! - `document`: descriptors and input constraints (type, size, magic bytes)
//! - `remote`: transport seams and the HTTP client behind them
//! - `normalize`: total mapping from raw payloads to the canonical record
//! - `batch`: the sequential orchestrator, progress events, cancellation
//! - `config`: endpoint, timeout, and error-policy settings
//! - `error`: the pipeline error taxonomy
//!
//! ```no_run
//! use invoiceflow::{BatchOrchestrator, DocumentDescriptor, HttpAnalysisClient, NullSink};
//!
//! # async fn demo() -> invoiceflow::Result<()> {
//! let client = HttpAnalysisClient::new("http://localhost:8000", 120);
//! let orchestrator = BatchOrchestrator::new(client.clone(), client);
//!
//! let docs = vec![DocumentDescriptor::from_path("invoice_march.pdf".as_ref())?];
//! let outcome = orchestrator.run(docs, &NullSink).await?;
//! println!("{:?}: {} processed", outcome.status, outcome.results.len());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod normalize;
pub mod remote;

pub use batch::{
    BatchEvent, BatchOrchestrator, BatchOutcome, BatchStatus, CancelHandle, ErrorPolicy, NullSink,
    ProgressSink,
};
pub use config::PipelineConfig;
pub use document::DocumentDescriptor;
pub use error::{PipelineError, Result};
pub use normalize::{normalize, NormalizedResult};
pub use remote::{DocumentId, HttpAnalysisClient, ProcessingInvoker, UploadTransport};

/// Initialize the tracing subscriber. Honors `RUST_LOG`, with a default
/// filter that keeps this crate at debug and everything else at info.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter()));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
