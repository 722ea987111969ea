//! Error types shared by the ports and the services.

use scribe_shared::ErrorBody;
use thiserror::Error;

/// `name` carried by normalized data-service errors.
pub const ERROR_NAME: &str = "Error";

/// `name` carried by normalized auth errors.
pub const AUTH_ERROR_NAME: &str = "AuthError";

/// Data backend errors, as reported by a `DataStore`.
#[derive(Debug, Clone, Error)]
pub enum DataError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("{message}")]
    Remote {
        code: Option<String>,
        message: String,
    },

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("Row not found")]
    NotFound,

    #[error("Expected a single row, got {0}")]
    MultipleRows(usize),
}

/// Failures raised inside a service, before they cross the service boundary.
#[derive(Debug, Error)]
pub enum ServiceFailure {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Data(#[from] DataError),
}

impl ServiceFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceFailure::Validation(_) => "validation",
            ServiceFailure::NotFound(_) => "not_found",
            ServiceFailure::Data(_) => "remote",
        }
    }
}

/// The normalized error every service returns.
///
/// Callers only see a name and a human-readable message; the underlying
/// failure has already been logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceError {
    pub name: &'static str,
    pub message: String,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            name: ERROR_NAME,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self {
            name: AUTH_ERROR_NAME,
            message: message.into(),
        }
    }
}

impl From<ServiceError> for ErrorBody {
    fn from(err: ServiceError) -> Self {
        ErrorBody::new(err.name, err.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_displays_backend_message() {
        let err = DataError::Remote {
            code: Some("PGRST116".to_string()),
            message: "JSON object requested, multiple (or no) rows returned".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "JSON object requested, multiple (or no) rows returned"
        );
    }

    #[test]
    fn test_service_error_into_body() {
        let body: ErrorBody = ServiceError::auth("No user found").into();
        assert_eq!(body, ErrorBody::new("AuthError", "No user found"));
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(ServiceFailure::Validation("x".into()).kind(), "validation");
        assert_eq!(ServiceFailure::from(DataError::NotFound).kind(), "remote");
    }
}
