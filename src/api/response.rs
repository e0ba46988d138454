use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// The response envelope every endpoint returns: `data` on success,
/// `message` on failure, a status code mirrored into the body either way.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            status_code: StatusCode::OK.as_u16(),
            data: Some(data),
            message: None,
            timestamp: Utc::now(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: status.as_u16(),
            data: None,
            message: Some(message.into()),
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
