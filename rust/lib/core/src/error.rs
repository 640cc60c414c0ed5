use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Codes carried in the `code` field of an error body. Clients match on
/// these rather than on `message`.
pub mod error_code {
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Error returned by repository operations and HTTP handlers.
///
/// Absence is not an error here: a lookup for a zombie that does not exist
/// yields `null`, and deletes report faults in their outcome. What remains
/// is rendered as
///
/// ```json
/// {"code": "ALREADY_EXISTS", "message": "name 'Zombie1' already exists"}
/// ```
#[derive(Error, Debug)]
pub enum ServiceError {
    /// A unique field such as a zombie's `name` collides. HTTP 409.
    #[error("{0}")]
    Conflict(String),

    /// Malformed request body, filter or patch. HTTP 400.
    #[error("{0}")]
    Validation(String),

    /// The document store failed. HTTP 500.
    #[error("{0}")]
    Storage(String),

    /// Stored data could not be decoded, or some other bug. HTTP 500.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Conflict(_) => error_code::ALREADY_EXISTS,
            ServiceError::Validation(_) => error_code::VALIDATION_FAILED,
            ServiceError::Storage(_) => error_code::STORAGE_ERROR,
            ServiceError::Internal(_) => error_code::INTERNAL,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Storage(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Any body the JSON extractor refuses (missing or mistyped field, bad
/// syntax, wrong content type) is a validation failure.
impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::Validation(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = serde_json::json!({
            "code": self.error_code(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
