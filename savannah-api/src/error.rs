use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use savannah_core::CoreError;
use serde_json::{json, Value};

const INTERNAL_MESSAGE: &str = "Internal Server Error";

/// Cause of a 500, kept on the response extensions and out of the body.
#[derive(Debug, Clone)]
pub struct InternalDetail(pub String);

#[derive(Debug)]
pub enum AppError {
    Core(CoreError),
    /// Malformed request shape: bad JSON, bad query string, broken multipart.
    BadRequest(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Core(err) => core_status(err),
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::Validation(_)
        | CoreError::InvalidFields(_)
        | CoreError::InvalidRange(_)
        | CoreError::InvalidReference(_)
        | CoreError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::Unauthorized(_) | CoreError::StaleToken => StatusCode::UNAUTHORIZED,
        CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
        CoreError::Conflict(_) => StatusCode::CONFLICT,
        CoreError::PaymentNotSuccessful(_)
        | CoreError::AmountMismatch { .. }
        | CoreError::Gateway(_) => StatusCode::PAYMENT_REQUIRED,
        CoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut internal = None;
        let (message, details): (String, Option<Value>) = match self {
            AppError::Core(CoreError::InvalidFields(errors)) => {
                ("Validation error".to_string(), Some(json!(errors)))
            }
            AppError::Core(CoreError::AmountMismatch { expected, reported }) => (
                "Payment amount does not match invoice".to_string(),
                Some(json!({ "expected": expected, "reported": reported })),
            ),
            AppError::Core(CoreError::Internal(msg)) => {
                tracing::error!("Internal Server Error: {}", msg);
                internal = Some(msg);
                (INTERNAL_MESSAGE.to_string(), None)
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                internal = Some(format!("{:#}", err));
                (INTERNAL_MESSAGE.to_string(), None)
            }
            AppError::Core(err) => (err.to_string(), None),
            AppError::BadRequest(msg) => (msg, None),
        };

        let mut response = (status, Json(envelope(status, &message, details))).into_response();
        if let Some(detail) = internal {
            response.extensions_mut().insert(InternalDetail(detail));
        }
        response
    }
}

fn envelope(status: StatusCode, message: &str, details: Option<Value>) -> Value {
    let mut body = json!({
        "success": false,
        "code": status.as_u16(),
        "message": message,
    });
    if let Some(details) = details {
        body["details"] = details;
    }
    body
}

/// Re-renders a 500 with its cause under `details`. Other responses pass through.
pub fn expose_internal_detail(mut response: Response) -> Response {
    let Some(InternalDetail(detail)) = response.extensions_mut().remove::<InternalDetail>() else {
        return response;
    };
    let status = response.status();
    let body = envelope(status, INTERNAL_MESSAGE, Some(Value::String(detail)));
    (status, Json(body)).into_response()
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::Core(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Anyhow(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::BadRequest(format!("Upload error: {}", err.body_text()))
    }
}
