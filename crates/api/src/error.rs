use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use classhub_db::StoreError;
use classhub_services::dao::DaoError;
use classhub_services::notifications::NotificationError;
use classhub_services::reminders::ReminderError;
use serde::Serialize;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Unavailable(String),
    Internal(String),
    Validation(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, "unavailable", msg),
            ApiError::Internal(msg) => {
                error!(%msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => ApiError::Unavailable(msg),
            StoreError::Rejected(msg) => ApiError::Conflict(msg),
            StoreError::Decode(e) => ApiError::Internal(e.to_string()),
            StoreError::Io(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<DaoError> for ApiError {
    fn from(err: DaoError) -> Self {
        match err {
            DaoError::NotFound => ApiError::NotFound("Resource not found".to_string()),
            DaoError::Rejected(msg) => ApiError::Conflict(msg),
            DaoError::Validation(msg) => ApiError::Validation(msg),
            DaoError::Store(e) => e.into(),
            DaoError::Serde(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<NotificationError> for ApiError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::NotFound(id) => {
                ApiError::NotFound(format!("Notification {id} not found"))
            }
            NotificationError::Storage(e) => ApiError::Internal(e.to_string()),
            NotificationError::Serde(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ReminderError> for ApiError {
    fn from(err: ReminderError) -> Self {
        match err {
            ReminderError::Dao(e) => e.into(),
            ReminderError::Notification(e) => e.into(),
            ReminderError::InvalidWindow(_) => ApiError::BadRequest("Invalid days".to_string()),
        }
    }
}
