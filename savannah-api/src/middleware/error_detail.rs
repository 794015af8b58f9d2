use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::expose_internal_detail;
use crate::state::AppState;

/// Puts the cause of a 500 back into the body outside production.
pub async fn internal_detail_middleware(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;
    if state.expose_internal_errors {
        expose_internal_detail(response)
    } else {
        response
    }
}
