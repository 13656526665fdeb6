//! Uniform `{ data, error }` response envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pet_clinic_core::{StoreError, ValidationErrors};
use serde::Serialize;
use tracing::warn;

/// Error half of the envelope.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

/// Response body: exactly one of `data` / `error` is non-null.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// Successful response with `data` set.
pub fn success<T: Serialize>(status: StatusCode, data: T) -> Response {
    let body = Envelope {
        data: Some(data),
        error: None,
    };
    (status, Json(body)).into_response()
}

/// A request that ends in an error envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub error: ApiError,
}

impl ApiFailure {
    pub fn new(
        status: StatusCode,
        message: impl Into<String>,
        details: Option<Vec<String>>,
    ) -> Self {
        Self {
            status,
            error: ApiError {
                message: message.into(),
                details,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>, details: Option<Vec<String>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, details)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Client not found", None)
    }

    pub fn invalid_json() -> Self {
        Self::bad_request("Invalid JSON body", None)
    }

    pub fn validation(errors: ValidationErrors) -> Self {
        Self::bad_request("Validation failed", Some(errors.into_messages()))
    }

    /// Map a store error. `message` is the user-facing text for storage
    /// failures, e.g. "Failed to fetch clients".
    pub fn from_store(err: StoreError, message: &str) -> Self {
        match err {
            StoreError::InvalidId(id) => {
                warn!(%id, "rejected malformed client id");
                Self::bad_request("Invalid client id", None)
            }
            err @ StoreError::Storage { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                message,
                Some(vec![err.to_string()]),
            ),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body: Envelope<()> = Envelope {
            data: None,
            error: Some(self.error),
        };
        (self.status, Json(body)).into_response()
    }
}
