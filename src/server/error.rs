//! HTTP error mapping for the upload service.

use crate::error::DeckError;
use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Errors a handler can return.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The pipeline refused the batch or failed to build the deck.
    #[error(transparent)]
    Deck(#[from] DeckError),

    /// The multipart body was malformed or exceeded the size limit.
    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    /// The request was not `multipart/form-data` at all.
    #[error("Invalid upload: {}", .0.body_text())]
    Rejection(#[from] MultipartRejection),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Deck(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Deck(_) => StatusCode::INTERNAL_SERVER_ERROR,
            // 413 when the body limit tripped, 400 for garbage.
            ApiError::Multipart(e) => e.status(),
            ApiError::Rejection(e) => e.status(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Deck(e) if !e.is_client_error() => {
                format!("An internal error occurred: {}", e)
            }
            other => other.to_string(),
        };

        if status.is_server_error() {
            error!("{}", message);
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
