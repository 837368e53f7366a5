//! reqwest-backed implementation of the HTTP client contract

use async_trait::async_trait;
use confsched_core::{HttpClient, HttpResponse, TransportError};
use reqwest::Client;
use tracing::debug;

/// Default HTTP client used by the facade outside of tests.
pub struct ReqwestHttpClient {
    client: Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }

    async fn post_form(&self, url: &str, body: &str) -> Result<u16, TransportError> {
        debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        Ok(response.status().as_u16())
    }
}
