//! Error responses for the HTTP layer.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use questiongraph_storage::{ErrorKind, StorageError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum ApiError {
    /// The graph store failed or found nothing
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The request could not be turned into typed parameters
    #[error("{0}")]
    BadRequest(String),
}

/// JSON body returned on error.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Storage(e) => match e.kind {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Connection => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::QueryExecution | ErrorKind::Decode | ErrorKind::Config => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            debug!("Request rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.to_string(),
            code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (StorageError::successor_not_found("q1", "'x'"), StatusCode::NOT_FOUND),
            (StorageError::store_closed(), StatusCode::SERVICE_UNAVAILABLE),
            (
                StorageError::query_execution("syntax"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (StorageError::decode("bad row"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
        assert_eq!(
            ApiError::BadRequest("id must not be empty".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_error_message_passes_through() {
        let err = ApiError::from(StorageError::query_execution("Invalid input"));
        assert_eq!(err.to_string(), "[query_execution] Invalid input");
    }
}
