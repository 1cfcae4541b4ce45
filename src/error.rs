use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use miette::Diagnostic;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Invalid request: {0}")]
    #[diagnostic(code(varaamo::validation))]
    Validation(String),

    #[error("{0} not found")]
    #[diagnostic(code(varaamo::not_found))]
    NotFound(String),

    #[error("Requested time is no longer available")]
    #[diagnostic(code(varaamo::slot_taken))]
    SlotUnavailable,

    #[error("Store error: {0}")]
    #[diagnostic(code(varaamo::store))]
    Store(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(varaamo::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(varaamo::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(varaamo::serialization))]
    Serialization(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create validation errors
pub fn validation_error(message: &str) -> Error {
    Error::Validation(message.to_string())
}

/// Helper to create not-found errors
pub fn not_found(what: &str) -> Error {
    Error::NotFound(what.to_string())
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::SlotUnavailable => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Internal failures are logged in full but reach the client as a
        // generic message
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Internal error: {:?}", self);
            return (
                status,
                Json(json!({ "success": false, "error": "Internal server error" })),
            )
                .into_response();
        }

        (
            status,
            Json(json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}
