//! Downstream document submission.

mod http;

pub use http::HttpSubmitter;

use async_trait::async_trait;

use crate::document::Document;
use crate::error::TransportError;

/// HTTP status returned when a document was created.
pub const STATUS_CREATED: u16 = 201;

/// Status and body returned by the document API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl SubmitResponse {
    /// Whether the API reported the document as created.
    pub fn is_created(&self) -> bool {
        self.status == STATUS_CREATED
    }
}

/// Trait for document submission backends.
///
/// This abstracts the HTTP client so the rate limited API can run against any
/// transport, including in-memory fakes.
#[async_trait]
pub trait DocumentSubmitter: Send + Sync {
    /// Submit a signed document.
    async fn submit(
        &self,
        document: &Document,
        signature: &str,
    ) -> Result<SubmitResponse, TransportError>;
}
