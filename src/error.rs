//! Request-level error taxonomy.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde_json::json;
use thiserror::Error;

use crate::middleware::logging::with_outcome;

#[derive(Clone, Debug, Error)]
pub enum ApiError {
    /// Missing, malformed or expired identity.
    #[error("{0}")]
    Unauthorized(String),
    /// Valid identity without the required role.
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    NotFound(String),
    /// Empty cart, insufficient stock, duplicate email.
    #[error("{0}")]
    InvalidState(String),
    /// Store, filesystem or mail failure. The detail is logged, never returned.
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidState(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "Internal server error".to_owned(),
            other => other.to_string(),
        }
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        Self::Internal(format!("Database error: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = (
            self.status(),
            Json(json!({
                "error": self.public_message()
            })),
        );

        with_outcome(body, Err(self))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
