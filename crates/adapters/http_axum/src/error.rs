//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use relayhub_domain::error::{RelayHubError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps failures to an HTTP response with the appropriate status code.
#[derive(Debug)]
pub enum ApiError {
    Domain(RelayHubError),
    /// The request body is not valid JSON.
    InvalidBody(serde_json::Error),
}

impl From<RelayHubError> for ApiError {
    fn from(err: RelayHubError) -> Self {
        Self::Domain(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Domain(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Domain(RelayHubError::Validation(err)) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(RelayHubError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Domain(RelayHubError::Integration(err)) => {
                tracing::error!(error = %error_chain(&**err), "integration error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::InvalidBody(err) => (StatusCode::BAD_REQUEST, format!("invalid body: {err}")),
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

/// Render an error followed by each of its sources, separated by `: `.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}
