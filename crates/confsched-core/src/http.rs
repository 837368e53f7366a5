//! HTTP client collaborator contract
//!
//! The data-access layer never talks to the network directly; it goes
//! through this minimal contract so that tests (and offline runs) can
//! inject a scripted client.

use async_trait::async_trait;
use thiserror::Error;

/// Response of a GET request: status code plus the raw body text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Transport-level failure below the facade.
///
/// Connection management (pooling, retries, TLS) is the implementation's
/// concern; all of it surfaces here as an opaque error.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// The contract the REST facade and the lazy loader require from an
/// HTTP client implementation.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a GET request and return the status code and body.
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    /// POST a URL-encoded form body and return the status code.
    async fn post_form(&self, url: &str, body: &str) -> Result<u16, TransportError>;
}
