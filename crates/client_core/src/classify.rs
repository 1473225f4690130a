//! Turns raw transport outcomes into the typed results the view state consumes.
//!
//! Classification runs on the worker task, so only finished, immutable
//! [`ClassifiedResult`] values ever cross into the consumer context.

use shared::{
    error::ErrorBody,
    protocol::{CategorizedMovies, MovieList},
};
use tracing::debug;

use crate::transport::{RawResponse, TransportFailure};

pub const DECODE_FAILURE_MESSAGE: &str = "Received an unreadable response from the server.";

const STATUS_BAD_REQUEST: u16 = 400;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    List(MovieList),
    Categories(CategorizedMovies),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedResult {
    Success(Payload),
    Empty,
    DomainError(String),
    TransportError(TransportFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    List,
    Categories,
}

/// Recognized `400` rejection: matched by message prefix, optionally shown
/// with a friendlier text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainErrorRule {
    prefix: String,
    substitute: Option<String>,
}

impl DomainErrorRule {
    pub fn verbatim(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            substitute: None,
        }
    }

    pub fn substituted(prefix: impl Into<String>, substitute: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            substitute: Some(substitute.into()),
        }
    }

    fn apply(&self, body: &ErrorBody) -> Option<String> {
        if !body.starts_with(&self.prefix) {
            return None;
        }
        self.substitute
            .clone()
            .or_else(|| body.message().map(str::to_string))
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    shape: PayloadShape,
    rules: Vec<DomainErrorRule>,
}

impl Classifier {
    pub fn new(shape: PayloadShape) -> Self {
        Self {
            shape,
            rules: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: DomainErrorRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// `None` means the outcome is deliberately not surfaced: a non-success
    /// status without a recognized domain error.
    pub fn classify(
        &self,
        outcome: Result<RawResponse, TransportFailure>,
    ) -> Option<ClassifiedResult> {
        let response = match outcome {
            Ok(response) => response,
            Err(failure) => return Some(ClassifiedResult::TransportError(failure)),
        };

        if response.is_success() {
            return Some(self.classify_success(&response.body));
        }

        if response.status == STATUS_BAD_REQUEST {
            if let Some(result) = self.classify_rejection(&response.body) {
                return Some(result);
            }
        }

        debug!(
            status = response.status,
            "classifier: dropping unrecognized error response"
        );
        None
    }

    fn classify_success(&self, body: &[u8]) -> ClassifiedResult {
        if body.iter().all(u8::is_ascii_whitespace) {
            return ClassifiedResult::Empty;
        }

        let decoded = match self.shape {
            PayloadShape::List => serde_json::from_slice::<Option<MovieList>>(body)
                .map(|list| list.map(Payload::List)),
            PayloadShape::Categories => serde_json::from_slice::<Option<CategorizedMovies>>(body)
                .map(|categories| categories.map(Payload::Categories)),
        };

        match decoded {
            Ok(Some(payload)) if payload_is_empty(&payload) => ClassifiedResult::Empty,
            Ok(Some(payload)) => ClassifiedResult::Success(payload),
            Ok(None) => ClassifiedResult::Empty,
            Err(err) => {
                debug!("classifier: success body failed to decode: {err}");
                ClassifiedResult::DomainError(DECODE_FAILURE_MESSAGE.to_string())
            }
        }
    }

    fn classify_rejection(&self, body: &[u8]) -> Option<ClassifiedResult> {
        let body: ErrorBody = match serde_json::from_slice(body) {
            Ok(body) => body,
            Err(err) => {
                debug!("classifier: 400 body is not an error object: {err}");
                return None;
            }
        };

        self.rules
            .iter()
            .find_map(|rule| rule.apply(&body))
            .map(ClassifiedResult::DomainError)
    }
}

fn payload_is_empty(payload: &Payload) -> bool {
    match payload {
        Payload::List(movies) => movies.is_empty(),
        Payload::Categories(categories) => categories.values().all(Vec::is_empty),
    }
}

#[cfg(test)]
#[path = "tests/classify_tests.rs"]
mod tests;
