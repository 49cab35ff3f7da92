//! HTTP implementation of the remote pipeline seams.
//!
//! Wire contract:
//! - `POST {base}/invoices/upload` — multipart form with a `file` part;
//!   success body carries `{ "documentId": "..." }`. The backend also reports
//!   per-file failures inside an HTTP-200 body (`"status": "error" | "failed"`
//!   with a `message` or `errors` field), so the body is checked too.
//! - `POST {base}/invoices/{id}/process` — returns the raw multi-section
//!   JSON, passed through verbatim.

use serde_json::Value;

use super::{DocumentId, ProcessingInvoker, UploadTransport};
use crate::config::PipelineConfig;
use crate::document::DocumentDescriptor;
use crate::error::{PipelineError, Result};

/// Client for the remote analysis pipeline. Implements both seams; cloning is
/// cheap (the underlying connection pool is shared).
#[derive(Clone)]
pub struct HttpAnalysisClient {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpAnalysisClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.base_url, config.timeout_secs)
    }

    fn request_failure(&self, e: &reqwest::Error) -> String {
        if e.is_connect() {
            format!("cannot reach analysis pipeline at {}", self.base_url)
        } else if e.is_timeout() {
            format!("request timed out after {}s", self.timeout_secs)
        } else {
            e.to_string()
        }
    }
}

impl UploadTransport for HttpAnalysisClient {
    fn upload(
        &self,
        doc: &DocumentDescriptor,
    ) -> impl std::future::Future<Output = Result<DocumentId>> + Send {
        async move {
            let url = format!("{}/invoices/upload", self.base_url);

            let part = reqwest::multipart::Part::bytes(doc.content.clone())
                .file_name(doc.name.clone())
                .mime_str(&doc.mime_type)
                .map_err(|e| PipelineError::transport(&doc.name, e.to_string()))?;
            let form = reqwest::multipart::Form::new().part("file", part);

            tracing::debug!(document = %doc.name, bytes = doc.byte_size, "Uploading document");

            let response = self
                .client
                .post(&url)
                .multipart(form)
                .send()
                .await
                .map_err(|e| PipelineError::transport(&doc.name, self.request_failure(&e)))?;

            let status = response.status();
            let body: Value = response.json().await.unwrap_or(Value::Null);

            if !status.is_success() {
                let message = failure_message(&body)
                    .unwrap_or_else(|| format!("server returned {status}"));
                return Err(PipelineError::transport(&doc.name, message));
            }

            if let Some(message) = failure_message(&body) {
                return Err(PipelineError::transport(&doc.name, message));
            }

            extract_document_id(&body)
                .ok_or_else(|| {
                    PipelineError::transport(&doc.name, "response is missing documentId")
                })
                .map(DocumentId::new)
        }
    }
}

impl ProcessingInvoker for HttpAnalysisClient {
    fn process(&self, id: &DocumentId) -> impl std::future::Future<Output = Result<Value>> + Send {
        async move {
            let url = format!("{}/invoices/{}/process", self.base_url, id);

            tracing::debug!(document_id = %id, "Invoking analysis pipeline");

            let response = self
                .client
                .post(&url)
                .send()
                .await
                .map_err(|e| PipelineError::processing(id.as_str(), self.request_failure(&e)))?;

            let status = response.status();
            if !status.is_success() {
                let body: Value = response.json().await.unwrap_or(Value::Null);
                let message = failure_message(&body)
                    .unwrap_or_else(|| format!("server returned {status}"));
                return Err(PipelineError::processing(id.as_str(), message));
            }

            response
                .json()
                .await
                .map_err(|e| PipelineError::processing(id.as_str(), format!("invalid JSON: {e}")))
        }
    }
}

/// Pull the failure message out of an error body, if the body is one.
/// Recognized shapes: `{"status": "error"|"failed", "message": ...}`,
/// `{"errors": [...]}`, and a bare `{"detail": ...}` (HTTP error bodies).
fn failure_message(body: &Value) -> Option<String> {
    let status = body.get("status").and_then(Value::as_str);
    let failed = matches!(status, Some("error") | Some("failed"));

    if failed {
        if let Some(message) = body.get("message").and_then(Value::as_str) {
            return Some(message.to_string());
        }
        if let Some(errors) = body.get("errors").and_then(Value::as_array) {
            let joined: Vec<&str> = errors.iter().filter_map(Value::as_str).collect();
            if !joined.is_empty() {
                return Some(joined.join("; "));
            }
        }
        return Some(format!("server reported status '{}'", status.unwrap_or_default()));
    }

    body.get("detail")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// The id assigned by the ingestion endpoint, wherever the body put it.
fn extract_document_id(body: &Value) -> Option<String> {
    body.get("documentId")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_body_is_not_a_failure() {
        let body = json!({ "status": "success", "documentId": "doc-1" });
        assert_eq!(failure_message(&body), None);
        assert_eq!(extract_document_id(&body), Some("doc-1".to_string()));
    }

    #[test]
    fn error_status_with_message_surfaces_it() {
        let body = json!({ "status": "error", "message": "OCR engine unavailable" });
        assert_eq!(
            failure_message(&body),
            Some("OCR engine unavailable".to_string())
        );
    }

    #[test]
    fn failed_status_joins_errors_list() {
        let body = json!({ "status": "failed", "errors": ["missing GSTIN", "bad date"] });
        assert_eq!(
            failure_message(&body),
            Some("missing GSTIN; bad date".to_string())
        );
    }

    #[test]
    fn failed_status_without_message_still_fails() {
        let body = json!({ "status": "failed" });
        let message = failure_message(&body).unwrap();
        assert!(message.contains("failed"));
    }

    #[test]
    fn http_error_detail_body_surfaces() {
        let body = json!({ "detail": "file too large" });
        assert_eq!(failure_message(&body), Some("file too large".to_string()));
    }

    #[test]
    fn missing_document_id_is_none() {
        assert_eq!(extract_document_id(&json!({ "status": "success" })), None);
        assert_eq!(extract_document_id(&Value::Null), None);
        assert_eq!(extract_document_id(&json!({ "documentId": 42 })), None);
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let client = HttpAnalysisClient::new("http://localhost:8000/", 5);
        assert_eq!(client.base_url, "http://localhost:8000");
    }
}
