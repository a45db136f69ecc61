//! Rate limited document API.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, instrument, warn};

use crate::client::{DocumentSubmitter, SubmitResponse};
use crate::document::Document;
use crate::error::Result;
use crate::ratelimit::{GateSnapshot, SubmissionGate};

/// Document API client that never exceeds its configured submission rate.
///
/// Clones share the same gate and submitter.
pub struct DocumentApi<S: DocumentSubmitter> {
    gate: Arc<SubmissionGate>,
    submitter: Arc<S>,
}

impl<S: DocumentSubmitter> Clone for DocumentApi<S> {
    fn clone(&self) -> Self {
        Self {
            gate: self.gate.clone(),
            submitter: self.submitter.clone(),
        }
    }
}

impl<S: DocumentSubmitter> DocumentApi<S> {
    /// Create a new API client from a gate and a submitter.
    pub fn new(gate: SubmissionGate, submitter: S) -> Self {
        Self {
            gate: Arc::new(gate),
            submitter: Arc::new(submitter),
        }
    }

    /// Submit a signed document, waiting for the rate limit if necessary.
    ///
    /// Any HTTP status is returned as a [`SubmitResponse`]; only transport
    /// failures become errors.
    #[instrument(skip(self, document, signature), fields(doc_id = %document.doc_id))]
    pub async fn create_document(
        &self,
        document: &Document,
        signature: &str,
    ) -> Result<SubmitResponse> {
        let outcome = self
            .gate
            .run(|| self.submitter.submit(document, signature))
            .await;
        report(outcome)
    }

    /// Like [`create_document`](Self::create_document), but give up with
    /// [`GateError::Cancelled`](crate::error::GateError::Cancelled) if the rate
    /// limit does not admit the call within `timeout`.
    #[instrument(skip(self, document, signature), fields(doc_id = %document.doc_id))]
    pub async fn create_document_with_timeout(
        &self,
        document: &Document,
        signature: &str,
        timeout: Duration,
    ) -> Result<SubmitResponse> {
        let outcome = self
            .gate
            .run_with_timeout(timeout, || self.submitter.submit(document, signature))
            .await;
        report(outcome)
    }

    /// Current gate counters.
    pub async fn gate_snapshot(&self) -> GateSnapshot {
        self.gate.snapshot().await
    }
}

fn report(outcome: Result<SubmitResponse>) -> Result<SubmitResponse> {
    match &outcome {
        Ok(response) if response.is_created() => {
            info!(status = response.status, body = %response.body, "Document created");
        }
        Ok(response) => {
            warn!(status = response.status, body = %response.body, "Document not created");
        }
        Err(e) => {
            error!(error = %e, "Document submission failed");
        }
    }
    outcome
}
