use crate::batch::ErrorPolicy;

/// Library-level constants
pub const APP_NAME: &str = "invoiceflow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default analysis pipeline endpoint (local development backend).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default per-request timeout. The remote pipeline runs OCR on scans, so
/// individual requests can legitimately take a while.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default `RUST_LOG`-style filter used when the environment sets none.
pub fn default_log_filter() -> String {
    format!("info,{APP_NAME}=debug")
}

/// Configuration for one orchestrator instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Base URL of the remote analysis pipeline.
    pub base_url: String,
    /// Per-request timeout for upload and process calls.
    pub timeout_secs: u64,
    /// What to do when a document fails mid-batch.
    pub error_policy: ErrorPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            error_policy: ErrorPolicy::FailFast,
        }
    }
}
