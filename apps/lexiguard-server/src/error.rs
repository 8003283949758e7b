//! Error types for the LexiGuard server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use compliance_engine::{EngineError, RuleStoreError};
use serde::Serialize;
use thiserror::Error;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    #[error("Flag not found: {0}")]
    FlagNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed rule set: {0}")]
    MalformedRules(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::RuleNotFound(_) => (StatusCode::NOT_FOUND, "RULE_NOT_FOUND"),
            ServerError::FlagNotFound(_) => (StatusCode::NOT_FOUND, "FLAG_NOT_FOUND"),
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
            ServerError::MalformedRules(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "MALFORMED_RULES")
            }
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RuleStoreError> for ServerError {
    fn from(err: RuleStoreError) -> Self {
        match err {
            RuleStoreError::NotFound(id) => ServerError::RuleNotFound(id),
            RuleStoreError::Malformed(e) => ServerError::MalformedRules(e.to_string()),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<EngineError> for ServerError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Rules(e) => e.into(),
            EngineError::InvalidRequest(msg) => ServerError::InvalidRequest(msg),
        }
    }
}
