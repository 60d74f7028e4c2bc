//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"success": false, "message": ...}`.
//! Internal details are logged, not returned.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use folio_core::{ServiceError, UploadError};
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

const INTERNAL_MESSAGE: &str = "Internal server error";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(details) => {
                error!("event=http_error module=api status=error code=500 details={details}");
                INTERNAL_MESSAGE.to_string()
            }
            other => {
                warn!(
                    "event=http_error module=api status=error code={} message={}",
                    status.as_u16(),
                    other
                );
                other.to_string()
            }
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(value: ServiceError) -> Self {
        match value {
            ServiceError::Validation(err) => Self::BadRequest(err.to_string()),
            ServiceError::NotFound(kind, _) => Self::NotFound(not_found_message(kind)),
            ServiceError::Conflict(message) => Self::Conflict(message),
            ServiceError::InvalidCredentials => {
                Self::Unauthorized("Invalid email or password".to_string())
            }
            ServiceError::Unauthorized(_) => Self::Unauthorized("Token is not valid".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(value: UploadError) -> Self {
        match &value {
            UploadError::NoFile
            | UploadError::UnsupportedType(_)
            | UploadError::InvalidFilename(_) => Self::BadRequest(value.to_string()),
            UploadError::TooLarge { .. } => Self::PayloadTooLarge(value.to_string()),
            UploadError::NotFound(_) => Self::NotFound("File not found".to_string()),
            UploadError::Io(err) => Self::Internal(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(value: QueryRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(value: PathRejection) -> Self {
        Self::BadRequest(format!("Invalid id: {}", value.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(value: MultipartRejection) -> Self {
        Self::BadRequest(value.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(value: MultipartError) -> Self {
        if value.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge("File is too large".to_string())
        } else {
            Self::BadRequest(value.body_text())
        }
    }
}

fn not_found_message(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => format!("{}{} not found", first.to_uppercase(), chars.as_str()),
        None => "Not found".to_string(),
    }
}
