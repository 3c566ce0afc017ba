//! Handler errors and their `TodoError` rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use todo_core::{ContractError, TodoError, ValidationError};
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    /// Path parameter or body failed its schema, or the body was not JSON.
    #[error("invalid input: {0}")]
    InvalidInput(ValidationError),

    #[error("todo item {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Contract(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_body(&self) -> TodoError {
        match self {
            Self::InvalidInput(err) => TodoError::invalid_input(err),
            Self::NotFound(_) => TodoError::not_found(),
            Self::Store(_) | Self::Contract(_) => TodoError::new(500, "Internal server error"),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_renders_uniform_body() {
        let err = ServerError::NotFound(Uuid::nil());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_body(), TodoError::not_found());
    }

    #[test]
    fn invalid_input_is_400() {
        let err = ServerError::InvalidInput(ValidationError::single("id", "Invalid uuid"));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let body = err.to_body();
        assert_eq!(body.code, 400);
        assert_eq!(body.message, "Invalid input: id: Invalid uuid");
    }

    #[test]
    fn store_failures_are_500() {
        let err = ServerError::from(StoreError::DuplicateId(Uuid::nil()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_body().code, 500);
    }
}
