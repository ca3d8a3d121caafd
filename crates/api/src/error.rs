//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use contracts::ContractError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Handler error, rendered as `{"detail": ...}`
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Work order {0} not found")]
    NotFound(String),

    #[error("Work order {0} already exists")]
    Conflict(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("{status}: {message}")]
    BadRequest { status: StatusCode, message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ContractError> for ApiError {
    fn from(err: ContractError) -> Self {
        match err {
            ContractError::NotFound { order_id } => Self::NotFound(order_id),
            ContractError::Conflict { order_id } => Self::Conflict(order_id),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for ApiError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        Self::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_keys().map(|k| k.to_string()).collect();
        fields.sort();
        Self::Unprocessable(format!("invalid fields: {}", fields.join(", ")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            Self::BadRequest { message, .. } => message.clone(),
            Self::Internal(message) => {
                error!(error = %message, "request failed");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
