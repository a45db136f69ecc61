//! reqwest-backed document submitter.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use super::{DocumentSubmitter, SubmitResponse};
use crate::config::ClientConfig;
use crate::document::Document;
use crate::error::TransportError;

/// Header carrying the document signature.
const SIGNATURE_HEADER: &str = "Signature";

/// Posts documents as JSON to the document creation endpoint.
pub struct HttpSubmitter {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSubmitter {
    /// Create a submitter from client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// The endpoint documents are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DocumentSubmitter for HttpSubmitter {
    #[instrument(skip(self, document, signature), fields(endpoint = %self.endpoint, doc_id = %document.doc_id))]
    async fn submit(
        &self,
        document: &Document,
        signature: &str,
    ) -> Result<SubmitResponse, TransportError> {
        let body = document.to_json()?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status = status, body_len = body.len(), "Document API responded");

        Ok(SubmitResponse { status, body })
    }
}
