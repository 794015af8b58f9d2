use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

/// Success envelope: `{success, code, message, responses}`.
pub struct ApiResponse<T> {
    status: StatusCode,
    message: String,
    payload: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, payload: T) -> Self {
        Self {
            status: StatusCode::OK,
            message: message.into(),
            payload,
        }
    }

    pub fn created(message: impl Into<String>, payload: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            message: message.into(),
            payload,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = json!({
            "success": true,
            "code": self.status.as_u16(),
            "message": self.message,
            "responses": self.payload,
        });
        (self.status, Json(body)).into_response()
    }
}
