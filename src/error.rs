use indexmap::IndexMap;
use std::fmt;
use thiserror::Error;

/// Inline field errors collected by form validation, in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(IndexMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Ok when nothing was collected, otherwise a validation error.
    pub fn into_result(self) -> Result<(), ConsoleError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ConsoleError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.values().map(String::as_str).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// Every failure the console can surface. All of them end up as a display
/// string in front of the user; nothing is retried.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}: {message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Validation(FieldErrors),

    #[error("not signed in")]
    Unauthenticated,

    #[error("{0}")]
    NotFound(String),

    #[error("failed to render document: {0}")]
    Document(String),

    #[error("failed to write spreadsheet: {0}")]
    Export(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ConsoleError {
    /// Shortcut for a single-field validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.add(field, message);
        ConsoleError::Validation(errors)
    }

    /// True for failures of the remote collaborators rather than the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ConsoleError::Network { .. } | ConsoleError::Api { .. } | ConsoleError::Decode { .. }
        )
    }
}

impl From<lopdf::Error> for ConsoleError {
    fn from(e: lopdf::Error) -> Self {
        ConsoleError::Document(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_keep_first_message_per_field() {
        let mut errors = FieldErrors::new();
        errors.add("subject", "Subject is required");
        errors.add("day", "Day is required");
        errors.add("subject", "ignored");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("subject"), Some("Subject is required"));
        assert_eq!(
            ConsoleError::Validation(errors).to_string(),
            "Subject is required; Day is required"
        );
    }

    #[test]
    fn empty_field_errors_are_ok() {
        assert!(FieldErrors::new().into_result().is_ok());
    }
}
