use serde::{Deserialize, Serialize};

/// Prefix the recommender uses when a user has no favourites to recommend from.
pub const NO_FAVOURITES_PREFIX: &str = "No favourite";
/// Prefix the recommender uses when none of the submitted titles matched.
pub const MOVIES_NOT_FOUND_PREFIX: &str = "Movies not found";

/// Body of a `400 Bad Request` answer, e.g. `{"error": "No favourite movies found."}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.message()
            .is_some_and(|message| message.starts_with(prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_known_prefix() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"error":"Movies not found: Foo."}"#).expect("body");
        assert!(body.starts_with(MOVIES_NOT_FOUND_PREFIX));
        assert!(!body.starts_with(NO_FAVOURITES_PREFIX));
    }

    #[test]
    fn missing_error_field_matches_nothing() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail":"x"}"#).expect("body");
        assert_eq!(body.message(), None);
        assert!(!body.starts_with(""));
    }
}
