use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use contable_executor::{Envelope, FailureKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("'{0}' is not a plain SQL identifier")]
    InvalidIdentifier(String),
    #[error("invalid database configuration: {0}")]
    Database(String),
    #[error("http server failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Request rejected before any database call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Parameter '{0}' is required")]
    MissingParam(&'static str),
    #[error("Parameter '{name}' must be an integer, got '{value}'")]
    InvalidParam { name: &'static str, value: String },
    #[error("View '{0}' not found")]
    UnknownView(String),
    #[error("Invalid query string: {0}")]
    MalformedQuery(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParam(_)
            | ApiError::InvalidParam { .. }
            | ApiError::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::UnknownView(_) => StatusCode::NOT_FOUND,
        }
    }

    fn kind(&self) -> FailureKind {
        match self {
            ApiError::UnknownView(_) => FailureKind::ObjectNotFound,
            _ => FailureKind::Sql,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::MalformedQuery(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "rejected request");
        let status = self.status();
        let envelope = Envelope::error(self.kind(), self.to_string(), None);
        (status, Json(envelope)).into_response()
    }
}
