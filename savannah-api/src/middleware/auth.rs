use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use savannah_core::identity::Role;
use savannah_core::CoreError;

use crate::error::AppError;
use crate::state::AppState;
use crate::tokens::{Claims, TokenKind};

// ============================================================================
// Bearer extraction
// ============================================================================

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Decodes the access token and checks the role. Claims land in request extensions.
async fn authorize(
    state: &AppState,
    mut req: Request,
    next: Next,
    allowed: fn(&Role) -> bool,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| CoreError::Unauthorized("Missing Authentication".into()))?;

    let claims: Claims = state.tokens.verify(token, TokenKind::Access)?;

    if !allowed(&claims.role) {
        tracing::debug!(sub = %claims.sub, role = %claims.role, path = %req.uri().path(), "Role not allowed");
        return Err(CoreError::Forbidden("Forbidden".into()).into());
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// ============================================================================
// Role gates
// ============================================================================

/// Admin, operations, finance and support.
pub async fn require_staff(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, req, next, Role::is_staff).await
}

pub async fn require_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, req, next, |role| *role == Role::Admin).await
}

/// Dashboard figures are for admin and finance.
pub async fn require_kpi_access(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, req, next, |role| {
        matches!(role, Role::Admin | Role::Finance)
    })
    .await
}
