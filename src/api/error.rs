//! JSON envelope and HTTP error mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::services::ServiceError;

/// Result alias for handlers.
pub type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

/// Successful response body.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    success: bool,
    data: T,
}

/// Wraps data in a success envelope.
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope {
        success: true,
        data,
    }))
}

/// Failed request, rendered as `{"success": false, "error": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<Value>,
}

impl ApiError {
    /// 400 with a message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            details: None,
        }
    }

    /// 401 with a message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
            details: None,
        }
    }

    /// 500. The cause is logged, not returned.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!(error = %cause, "Request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Internal server error".to_string(),
            details: None,
        }
    }

    /// Status code of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let (status, details) = match &err {
            ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, None),
            ServiceError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, None),
            ServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, None),
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            ServiceError::Conflict(_) => (StatusCode::CONFLICT, None),
            ServiceError::GamesLocked(ids) => {
                (StatusCode::BAD_REQUEST, Some(json!({ "locked_games": ids })))
            }
            ServiceError::GamesMissing(ids) => {
                (StatusCode::BAD_REQUEST, Some(json!({ "missing_games": ids })))
            }
            ServiceError::Internal(_) | ServiceError::Database(_) => {
                return Self::internal(&err);
            }
        };
        warn!(status = status.as_u16(), error = %err, "Request rejected");
        Self {
            status,
            message: err.to_string(),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "success": false, "error": self.message });
        if let (Some(details), Some(map)) = (self.details, body.as_object_mut()) {
            map.insert("details".to_string(), details);
        }
        (self.status, Json(body)).into_response()
    }
}
