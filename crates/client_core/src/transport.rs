//! Single-shot HTTP execution on a worker task.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::debug;

use crate::request::RequestDescriptor;

/// Status line and fully-read body of one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportFailure {
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("transport i/o error: {0}")]
    Io(String),
    #[error("request could not be built: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Io(err.to_string())
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes exactly one request. Implementations never retry.
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportFailure>;
}

pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, TransportFailure> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: RequestDescriptor) -> Result<RawResponse, TransportFailure> {
        let RequestDescriptor { method, url, body } = request;
        debug!(method = %method, url = %url, "transport: sending request");

        let mut call = self.http.request(method, url);
        if let Some(body) = &body {
            call = call.json(body);
        }

        let response = call.send().await?;
        let status = response.status().as_u16();
        // Reading to the end hands the connection back to the pool.
        let body = response.bytes().await?.to_vec();
        debug!(status, bytes = body.len(), "transport: response received");

        Ok(RawResponse { status, body })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
