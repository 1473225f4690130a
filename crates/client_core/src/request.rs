//! Request descriptors: method, fully encoded URL, optional JSON body.

use reqwest::Method;
use serde::Serialize;
use shared::protocol::PARAM_USER;
use thiserror::Error;
use tracing::warn;
use url::{form_urlencoded, Url};

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid endpoint '{endpoint}': {source}")]
    InvalidEndpoint {
        endpoint: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to encode request body: {0}")]
    Body(#[from] serde_json::Error),
}

/// A ready-to-execute request. Building one has no side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    pub body: Option<serde_json::Value>,
}

/// Identifier plus extra query parameters for one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    user: String,
    extra: Vec<(String, String)>,
}

impl RequestContext {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            extra: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((name.into(), value.into()));
        self
    }

    /// Identifier first, then extras in insertion order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        std::iter::once((PARAM_USER, self.user.as_str())).chain(
            self.extra
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str())),
        )
    }
}

pub struct RequestBuilder {
    method: Method,
    endpoint: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl RequestBuilder {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn param(mut self, name: &str, value: impl AsRef<[u8]>) -> Self {
        let name = encode_value(name.as_bytes());
        let value = encode_value(value.as_ref());
        self.query.push((name, value));
        self
    }

    pub fn context(self, context: &RequestContext) -> Self {
        context
            .params()
            .fold(self, |builder, (name, value)| builder.param(name, value))
    }

    pub fn json_body<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, RequestError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn build(self) -> Result<RequestDescriptor, RequestError> {
        let mut url = Url::parse(&self.endpoint).map_err(|source| {
            RequestError::InvalidEndpoint {
                endpoint: self.endpoint.clone(),
                source,
            }
        })?;

        if !self.query.is_empty() {
            let query = self
                .query
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query));
        }

        Ok(RequestDescriptor {
            method: self.method,
            url,
            body: self.body,
        })
    }
}

/// Joins a base address and a path without losing any path prefix on the base.
pub fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Percent-encodes a query value. Bytes that are not UTF-8 text encode to an
/// empty string instead of failing the request.
pub fn encode_value(value: &[u8]) -> String {
    match std::str::from_utf8(value) {
        Ok(text) => form_urlencoded::byte_serialize(text.as_bytes()).collect(),
        Err(err) => {
            warn!("query value is not valid UTF-8, substituting empty string: {err}");
            String::new()
        }
    }
}

#[cfg(test)]
#[path = "tests/request_tests.rs"]
mod tests;
