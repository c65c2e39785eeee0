// HTTP API Error Types
use std::collections::BTreeMap;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::database::DatabaseError;

/// Message sent for every failure whose detail must stay server-side
const INTERNAL_MESSAGE: &str = "Internal Server Error";

/// Everything a handler or interceptor can fail with.
///
/// All variants but `Internal` are request errors: they carry a status and a
/// message meant for the client. `Internal` wraps anything unexpected; its
/// detail is logged and never rendered.
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    // 400 Bad Request, one message per offending field
    #[error("{message}")]
    ValidationFailed {
        message: String,
        fields: BTreeMap<String, String>,
    },

    // 401 Unauthorized
    #[error("{0}")]
    Unauthorized(String),

    // 403 Forbidden
    #[error("{0}")]
    Forbidden(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 500 Internal Server Error
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Wire shape of every error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe body
    pub fn to_body(&self) -> ErrorResponse {
        match self {
            ApiError::ValidationFailed { message, fields } => ErrorResponse {
                error: message.clone(),
                fields: fields.clone(),
            },
            ApiError::Internal(_) => ErrorResponse {
                error: INTERNAL_MESSAGE.to_string(),
                fields: BTreeMap::new(),
            },
            other => ErrorResponse {
                error: other.to_string(),
                fields: BTreeMap::new(),
            },
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ApiError::Internal(_))
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_failed(fields: BTreeMap<String, String>) -> Self {
        ApiError::ValidationFailed {
            message: "field validation error".to_string(),
            fields,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(anyhow::anyhow!(message.into()))
    }
}

// Known persistence conditions become request errors; anything else is internal
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::InvalidId => ApiError::bad_request(err.to_string()),
            DatabaseError::NotFound(_) => ApiError::not_found(err.to_string()),
            DatabaseError::Forbidden => ApiError::forbidden(err.to_string()),
            DatabaseError::AuthenticationFailure => ApiError::unauthorized(err.to_string()),
            DatabaseError::InvalidUser(errors) => ApiError::from(errors),
            other => ApiError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
            .collect();

        ApiError::validation_failed(fields)
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match serde_json::to_vec(&self.to_body()) {
            Ok(body) => (
                status,
                [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize error body: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}
