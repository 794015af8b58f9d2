use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use savannah_core::CoreError;
use savannah_order::ReconcileOutcome;
use savannah_shared::FieldError;
use savannah_store::UploadedObject;
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::extract::UploadForm;
use crate::middleware::require_staff;
use crate::response::ApiResponse;
use crate::state::AppState;

pub const UPLOAD_BODY_LIMIT: usize = 25 * 1024 * 1024;
const DEFAULT_FOLDER: &str = "others";

#[derive(Debug, Default, Deserialize)]
struct WebhookQuery {
    reference: Option<String>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let uploads = Router::new()
        .route("/extensions/file/upload", post(upload_file))
        .route("/extensions/file/upload-multiple", post(upload_multiple))
        .route_layer(from_fn_with_state(state, require_staff))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    Router::new()
        .route(
            "/extensions/callback/check-paystack-payment",
            get(payment_webhook).post(payment_webhook),
        )
        .merge(uploads)
}

// ============================================================================
// Uploads
// ============================================================================

async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<UploadedObject>, AppError> {
    let form = UploadForm::read(multipart).await?;

    let Some(file) = form.files_named("file").next() else {
        return Err(CoreError::Validation("No files uploaded".into()).into());
    };
    let Some(file_name) = form.text("file_name") else {
        return Err(CoreError::InvalidFields(vec![FieldError::new("file_name", "is required")]).into());
    };
    let folder = form.text("folder").unwrap_or(DEFAULT_FOLDER);

    let uploaded = state
        .uploader
        .upload(file_name, Some(folder), file.bytes.clone())
        .await?;
    Ok(ApiResponse::ok("Files uploaded successfully", uploaded))
}

/// Every `files` part is stored. `file_name`, when given, names all of them.
async fn upload_multiple(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<ApiResponse<Vec<UploadedObject>>, AppError> {
    let form = UploadForm::read(multipart).await?;
    let folder = form.text("folder").unwrap_or(DEFAULT_FOLDER);
    let shared_name = form.text("file_name");

    let mut uploaded = Vec::new();
    for file in form.files_named("files") {
        let name = shared_name.unwrap_or(file.file_name.as_str());
        uploaded.push(
            state
                .uploader
                .upload(name, Some(folder), file.bytes.clone())
                .await?,
        );
    }

    if uploaded.is_empty() {
        return Err(CoreError::Validation("No files uploaded".into()).into());
    }
    Ok(ApiResponse::ok("Files uploaded successfully", uploaded))
}

// ============================================================================
// Payment webhook
// ============================================================================

/// Paystack event bodies carry the reference under `data.reference`.
fn reference_from_body(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .pointer("/data/reference")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Plain-text replies. Business outcomes answer 200 so the gateway stops retrying;
/// only a failed verify call asks for redelivery.
async fn payment_webhook(
    State(state): State<AppState>,
    Query(query): Query<WebhookQuery>,
    body: Bytes,
) -> (StatusCode, String) {
    let reference = query
        .reference
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .or_else(|| reference_from_body(&body));

    let Some(reference) = reference else {
        return (StatusCode::BAD_REQUEST, "Missing reference".to_string());
    };

    match state.lifecycle.reconcile_payment(&reference).await {
        Ok(outcome) => {
            state.metrics.reconciliation(outcome.label());
            let text = match outcome {
                ReconcileOutcome::Paid { .. } => "Payment confirmed",
                ReconcileOutcome::AlreadyPaid { .. } => "Payment already processed",
                ReconcileOutcome::UnknownReference => "Reference not recognised",
            };
            (StatusCode::OK, text.to_string())
        }
        Err(CoreError::PaymentNotSuccessful(status)) => {
            state.metrics.reconciliation("not_successful");
            info!(%reference, %status, "Webhook acknowledged for unsuccessful payment");
            (StatusCode::OK, format!("Payment not successful: {}", status))
        }
        Err(err @ CoreError::AmountMismatch { .. }) => {
            state.metrics.reconciliation("amount_mismatch");
            warn!(%reference, "Webhook acknowledged with amount mismatch");
            (StatusCode::OK, err.to_string())
        }
        Err(CoreError::Gateway(msg)) => {
            state.metrics.reconciliation("gateway_error");
            state.metrics.gateway_failure();
            error!(%reference, "Payment verification failed: {}", msg);
            (StatusCode::BAD_GATEWAY, "Payment verification failed".to_string())
        }
        Err(err) => {
            state.metrics.reconciliation("error");
            error!(%reference, "Webhook processing failed: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Webhook processing failed".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_from_event_body() {
        let body = br#"{"event":"charge.success","data":{"reference":"abc-123","amount":12200}}"#;
        assert_eq!(reference_from_body(body).as_deref(), Some("abc-123"));
        assert_eq!(reference_from_body(b"not json"), None);
        assert_eq!(reference_from_body(br#"{"data":{}}"#), None);
    }
}
