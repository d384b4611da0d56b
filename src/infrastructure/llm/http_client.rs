use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tokio_util::sync::CancellationToken;

use crate::config::HttpConfig;
use crate::domain::DomainError;

/// Stream type for HTTP responses
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, DomainError>> + Send>>;

/// Trait for HTTP client operations (for mocking)
#[async_trait]
pub trait HttpClientTrait: Send + Sync + std::fmt::Debug {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, DomainError>;

    /// Returns once the response head arrived; dropping the stream closes the connection
    async fn post_json_stream(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<ByteStream, DomainError>;
}

/// Real HTTP client using reqwest
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self, DomainError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| {
                DomainError::configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    async fn send(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, DomainError> {
        let mut request = self.client.post(url);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(DomainError::Cancelled),
            response = request.json(body).send() => response.map_err(transport_error)?,
        };

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let error_body = response.text().await.unwrap_or_default();
            return Err(DomainError::upstream_status("http", status, error_body));
        }

        Ok(response)
    }
}

fn transport_error(e: reqwest::Error) -> DomainError {
    if e.is_timeout() {
        DomainError::upstream_status("http", 504, format!("Request timed out: {}", e))
    } else {
        DomainError::upstream("http", format!("Request failed: {}", e))
    }
}

#[async_trait]
impl HttpClientTrait for HttpClient {
    async fn post_json(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value, DomainError> {
        let response = self.send(url, headers, body, cancel).await?;

        tokio::select! {
            _ = cancel.cancelled() => Err(DomainError::Cancelled),
            json = response.json() => json.map_err(|e| {
                DomainError::upstream("http", format!("Failed to parse response: {}", e))
            }),
        }
    }

    async fn post_json_stream(
        &self,
        url: &str,
        headers: Vec<(&str, &str)>,
        body: &serde_json::Value,
        cancel: &CancellationToken,
    ) -> Result<ByteStream, DomainError> {
        let response = self.send(url, headers, body, cancel).await?;

        let stream = response.bytes_stream().map(|result| {
            result.map_err(|e| DomainError::stream(format!("Stream read failed: {}", e)))
        });

        Ok(Box::pin(stream))
    }
}
