//! Sequential batch orchestration.
//!
//! One document at a time: validate, upload, trigger processing, normalize.
//! Events go to the caller's sink in document order, exactly one terminal
//! event per attempted document. A single orchestrator instance accepts one
//! run at a time; a second `run` while one is in flight returns
//! `InvalidState` without touching the in-flight batch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::document::DocumentDescriptor;
use crate::error::{PipelineError, Result};
use crate::normalize::{normalize, NormalizedResult};
use crate::remote::{DocumentId, ProcessingInvoker, UploadTransport};

use super::types::{
    new_batch_id, BatchEvent, BatchOutcome, BatchStatus, CancelHandle, DocumentFailure,
    DocumentResult, ErrorPolicy, ProgressSink,
};

pub struct BatchOrchestrator<U, P> {
    uploader: U,
    processor: P,
    policy: ErrorPolicy,
    cancel: CancelHandle,
    running: AtomicBool,
}

impl<U, P> BatchOrchestrator<U, P>
where
    U: UploadTransport,
    P: ProcessingInvoker,
{
    pub fn new(uploader: U, processor: P) -> Self {
        Self::with_policy(uploader, processor, ErrorPolicy::default())
    }

    pub fn with_policy(uploader: U, processor: P, policy: ErrorPolicy) -> Self {
        Self {
            uploader,
            processor,
            policy,
            cancel: CancelHandle::new(),
            running: AtomicBool::new(false),
        }
    }

    /// Handle for requesting cancellation of the current run. The flag is
    /// checked between documents; the document in flight still finishes.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Run a batch to completion, reporting progress through `sink`.
    ///
    /// Documents are processed strictly in submission order. Under the
    /// fail-fast policy the first failure stops the run and later documents
    /// are never uploaded; under continue-on-error every document is
    /// attempted and failures are collected in the outcome.
    pub async fn run(
        &self,
        documents: Vec<DocumentDescriptor>,
        sink: &dyn ProgressSink,
    ) -> Result<BatchOutcome> {
        // Single-run guard: released on every exit path by RunGuard's Drop.
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(PipelineError::InvalidState);
        }
        let _guard = RunGuard(&self.running);
        self.cancel.reset();

        let batch_id = new_batch_id();
        let total = documents.len();
        let start = Instant::now();

        tracing::info!(batch_id = %batch_id, documents = total, policy = ?self.policy, "Starting batch");
        sink.on_event(&BatchEvent::Started {
            batch_id: batch_id.clone(),
            document_count: total,
        });

        let mut results: Vec<DocumentResult> = Vec::new();
        let mut failures: Vec<DocumentFailure> = Vec::new();
        let mut status = None;

        for (index, doc) in documents.iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(batch_id = %batch_id, completed = results.len(), "Batch cancelled");
                sink.on_event(&BatchEvent::Cancelled {
                    completed: results.len(),
                    total,
                });
                status = Some(BatchStatus::Cancelled);
                break;
            }

            let fraction = (index + 1) as f64 / total as f64;
            let doc_start = Instant::now();

            match self.process_document(doc).await {
                Ok((document_id, result)) => {
                    let duration_ms = doc_start.elapsed().as_millis() as u64;
                    tracing::debug!(
                        document = %doc.name,
                        document_id = %document_id,
                        duration_ms,
                        "Document processed"
                    );
                    sink.on_event(&BatchEvent::DocumentDone {
                        index,
                        fraction,
                        document: doc.name.clone(),
                        result: result.clone(),
                    });
                    results.push(DocumentResult {
                        document: doc.name.clone(),
                        document_id,
                        result,
                        duration_ms,
                    });
                }
                Err(error) => {
                    tracing::warn!(document = %doc.name, %error, "Document failed");
                    sink.on_event(&BatchEvent::DocumentFailed {
                        index,
                        fraction,
                        document: doc.name.clone(),
                        error: error.to_string(),
                    });

                    if self.policy == ErrorPolicy::FailFast {
                        sink.on_event(&BatchEvent::Failed {
                            document: doc.name.clone(),
                            error: error.to_string(),
                        });
                        failures.push(DocumentFailure {
                            index,
                            document: doc.name.clone(),
                            error,
                        });
                        status = Some(BatchStatus::Failed);
                        break;
                    }

                    failures.push(DocumentFailure {
                        index,
                        document: doc.name.clone(),
                        error,
                    });
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let status = status.unwrap_or_else(|| {
            sink.on_event(&BatchEvent::Completed {
                processed: results.len(),
                failed: failures.len(),
                duration_ms,
            });
            match (results.is_empty(), failures.is_empty()) {
                (_, true) => BatchStatus::Completed,
                (true, false) => BatchStatus::Failed,
                (false, false) => BatchStatus::PartiallyCompleted,
            }
        });

        tracing::info!(
            batch_id = %batch_id,
            ?status,
            processed = results.len(),
            failed = failures.len(),
            duration_ms,
            "Batch finished"
        );

        Ok(BatchOutcome {
            batch_id,
            status,
            results,
            failures,
            duration_ms,
            finished_at: chrono::Utc::now().naive_utc(),
        })
    }

    async fn process_document(
        &self,
        doc: &DocumentDescriptor,
    ) -> Result<(DocumentId, NormalizedResult)> {
        doc.validate()?;
        let id = self.uploader.upload(doc).await?;
        let raw = self.processor.process(&id).await?;
        Ok((id, normalize(&raw)))
    }
}

struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::NullSink;
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use serde_json::{json, Value};
    use tokio::sync::Notify;

    fn pdf(name: &str) -> DocumentDescriptor {
        DocumentDescriptor::new(name, "application/pdf", b"%PDF-1.4 test".to_vec())
    }

    #[derive(Default, Clone)]
    struct MockUploader {
        uploaded: Arc<Mutex<Vec<String>>>,
        fail: Arc<HashSet<String>>,
    }

    impl MockUploader {
        fn failing(names: &[&str]) -> Self {
            Self {
                uploaded: Arc::default(),
                fail: Arc::new(names.iter().map(|n| n.to_string()).collect()),
            }
        }

        fn uploads(&self) -> Vec<String> {
            self.uploaded.lock().unwrap().clone()
        }
    }

    impl UploadTransport for MockUploader {
        fn upload(
            &self,
            doc: &DocumentDescriptor,
        ) -> impl std::future::Future<Output = Result<DocumentId>> + Send {
            let name = doc.name.clone();
            async move {
                if self.fail.contains(&name) {
                    return Err(PipelineError::transport(&name, "connection refused"));
                }
                self.uploaded.lock().unwrap().push(name.clone());
                Ok(DocumentId::new(format!("id-{name}")))
            }
        }
    }

    #[derive(Clone)]
    struct MockProcessor {
        payload: Value,
    }

    impl Default for MockProcessor {
        fn default() -> Self {
            Self {
                payload: json!({ "ocr": { "invoiceNumber": "INV-1" } }),
            }
        }
    }

    impl ProcessingInvoker for MockProcessor {
        fn process(
            &self,
            _id: &DocumentId,
        ) -> impl std::future::Future<Output = Result<Value>> + Send {
            let payload = self.payload.clone();
            async move { Ok(payload) }
        }
    }

    /// Processor that parks until released, to hold a run in flight.
    struct BlockingProcessor {
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    impl ProcessingInvoker for BlockingProcessor {
        fn process(
            &self,
            _id: &DocumentId,
        ) -> impl std::future::Future<Output = Result<Value>> + Send {
            async move {
                self.entered.notify_one();
                self.release.notified().await;
                Ok(Value::Null)
            }
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<BatchEvent>>,
    }

    impl ProgressSink for RecordingSink {
        fn on_event(&self, event: &BatchEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    impl RecordingSink {
        fn events(&self) -> Vec<BatchEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn processes_in_order_with_monotonic_fractions() {
        let orchestrator = BatchOrchestrator::new(MockUploader::default(), MockProcessor::default());
        let sink = RecordingSink::default();

        let docs = vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")];
        let outcome = orchestrator.run(docs, &sink).await.unwrap();

        assert_eq!(outcome.status, BatchStatus::Completed);
        assert!(outcome.succeeded());
        assert_eq!(outcome.results.len(), 3);
        assert!(outcome.failures.is_empty());
        assert_eq!(outcome.results[0].document, "a.pdf");
        assert_eq!(outcome.results[2].document, "c.pdf");
        assert_eq!(outcome.results[0].result.ocr.invoice_number, "INV-1");

        let events = sink.events();
        assert_eq!(events.len(), 5); // started + 3 done + completed
        assert!(matches!(&events[0], BatchEvent::Started { document_count: 3, .. }));
        let fractions: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                BatchEvent::DocumentDone { fraction, .. } => Some(*fraction),
                _ => None,
            })
            .collect();
        assert_eq!(fractions, vec![1.0 / 3.0, 2.0 / 3.0, 1.0]);
        assert!(matches!(
            &events[4],
            BatchEvent::Completed { processed: 3, failed: 0, .. }
        ));
    }

    #[tokio::test]
    async fn fail_fast_stops_before_uploading_later_documents() {
        let uploader = MockUploader::failing(&["b.pdf"]);
        let orchestrator = BatchOrchestrator::new(uploader.clone(), MockProcessor::default());
        let sink = RecordingSink::default();

        let docs = vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")];
        let outcome = orchestrator.run(docs, &sink).await.unwrap();

        assert_eq!(outcome.status, BatchStatus::Failed);
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 1);
        assert_eq!(outcome.failures[0].document, "b.pdf");

        // c.pdf was never uploaded
        assert_eq!(uploader.uploads(), vec!["a.pdf"]);

        let events = sink.events();
        assert!(matches!(events.last(), Some(BatchEvent::Failed { document, .. }) if document == "b.pdf"));
    }

    #[tokio::test]
    async fn continue_on_error_attempts_every_document() {
        let uploader = MockUploader::failing(&["b.pdf"]);
        let orchestrator = BatchOrchestrator::with_policy(
            uploader.clone(),
            MockProcessor::default(),
            ErrorPolicy::ContinueOnError,
        );
        let sink = RecordingSink::default();

        let docs = vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")];
        let outcome = orchestrator.run(docs, &sink).await.unwrap();

        assert_eq!(outcome.status, BatchStatus::PartiallyCompleted);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(uploader.uploads(), vec!["a.pdf", "c.pdf"]);
        assert!(matches!(
            sink.events().last(),
            Some(BatchEvent::Completed { processed: 2, failed: 1, .. })
        ));
    }

    #[tokio::test]
    async fn continue_on_error_with_no_successes_is_failed() {
        let uploader = MockUploader::failing(&["a.pdf", "b.pdf"]);
        let orchestrator = BatchOrchestrator::with_policy(
            uploader,
            MockProcessor::default(),
            ErrorPolicy::ContinueOnError,
        );

        let outcome = orchestrator
            .run(vec![pdf("a.pdf"), pdf("b.pdf")], &NullSink)
            .await
            .unwrap();
        assert_eq!(outcome.status, BatchStatus::Failed);
        assert_eq!(outcome.failures.len(), 2);
    }

    #[tokio::test]
    async fn invalid_descriptor_fails_without_upload() {
        let uploader = MockUploader::default();
        let orchestrator = BatchOrchestrator::new(uploader.clone(), MockProcessor::default());

        let bad = DocumentDescriptor::new("notes.txt", "text/plain", b"hello".to_vec());
        let outcome = orchestrator
            .run(vec![bad], &NullSink)
            .await
            .unwrap();

        assert_eq!(outcome.status, BatchStatus::Failed);
        assert!(matches!(
            outcome.failures[0].error,
            PipelineError::Validation { .. }
        ));
        assert!(uploader.uploads().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_completes_immediately() {
        let orchestrator = BatchOrchestrator::new(MockUploader::default(), MockProcessor::default());
        let sink = RecordingSink::default();

        let outcome = orchestrator.run(vec![], &sink).await.unwrap();
        assert_eq!(outcome.status, BatchStatus::Completed);
        assert!(outcome.results.is_empty());

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], BatchEvent::Started { document_count: 0, .. }));
        assert!(matches!(&events[1], BatchEvent::Completed { processed: 0, .. }));
    }

    #[tokio::test]
    async fn concurrent_run_returns_invalid_state() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let orchestrator = Arc::new(BatchOrchestrator::new(
            MockUploader::default(),
            BlockingProcessor {
                entered: entered.clone(),
                release: release.clone(),
            },
        ));

        let first = {
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator
                    .run(vec![pdf("a.pdf")], &NullSink)
                    .await
            })
        };

        // Wait until the first run is parked inside process()
        entered.notified().await;

        let err = orchestrator
            .run(vec![pdf("b.pdf")], &NullSink)
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidState));

        release.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome.status, BatchStatus::Completed);

        // Guard released, the orchestrator accepts a new run
        release.notify_one(); // pre-arm the processor for the next document
        let outcome = orchestrator.run(vec![pdf("c.pdf")], &NullSink).await.unwrap();
        assert_eq!(outcome.status, BatchStatus::Completed);
    }

    #[tokio::test]
    async fn cancellation_stops_between_documents() {
        let uploader = MockUploader::default();
        let orchestrator = BatchOrchestrator::new(uploader.clone(), MockProcessor::default());
        let cancel = orchestrator.cancel_handle();

        // Cancel as soon as the first document finishes
        let sink = move |event: &BatchEvent| {
            if matches!(event, BatchEvent::DocumentDone { index: 0, .. }) {
                cancel.cancel();
            }
        };

        let docs = vec![pdf("a.pdf"), pdf("b.pdf"), pdf("c.pdf")];
        let outcome = orchestrator.run(docs, &sink).await.unwrap();

        assert_eq!(outcome.status, BatchStatus::Cancelled);
        assert_eq!(outcome.results.len(), 1);
        assert!(outcome.failures.is_empty());
        assert_eq!(uploader.uploads(), vec!["a.pdf"]);
    }

    #[tokio::test]
    async fn cancel_flag_resets_between_runs() {
        let orchestrator = BatchOrchestrator::new(MockUploader::default(), MockProcessor::default());
        orchestrator.cancel_handle().cancel();

        // A fresh run starts clean rather than inheriting the stale flag
        let outcome = orchestrator
            .run(vec![pdf("a.pdf")], &NullSink)
            .await
            .unwrap();
        assert_eq!(outcome.status, BatchStatus::Completed);
    }
}
