use axum::{
    extract::State,
    http::HeaderMap,
    middleware::from_fn_with_state,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use savannah_core::identity::{Role, User, UserView};
use savannah_core::CoreError;
use savannah_shared::validation::{require_email, require_non_empty};
use savannah_shared::{FieldError, Masked};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::AppJson;
use crate::middleware::{bearer_token, require_admin};
use crate::password::{hash_password, verify_password};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::tokens::{TokenKind, TokenPair};

pub const REFRESH_COOKIE: &str = "refresh_token";
const REFRESH_PATH: &str = "/auth/refresh";
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Default, Deserialize)]
struct RefreshRequest {
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require_email(&mut errors, "email", &self.email);
        require_non_empty(&mut errors, "password", &self.password);
        if !self.password.is_empty() && self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionResponse {
    user: UserView,
    #[serde(flatten)]
    tokens: TokenPair,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let admin = Router::new()
        .route("/auth/create-user", post(create_user))
        .route_layer(from_fn_with_state(state, require_admin));

    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .merge(admin)
}

fn refresh_cookie(state: &AppState, token: &str) -> Result<Cookie<'static>, AppError> {
    let secure = if state.auth.cookie_secure { "; Secure" } else { "" };
    let raw = format!(
        "{}={}; HttpOnly; SameSite=Strict; Path={}; Max-Age={}{}",
        REFRESH_COOKIE, token, REFRESH_PATH, state.auth.refresh_ttl_seconds, secure
    );
    Cookie::parse(raw)
        .map(Cookie::into_owned)
        .map_err(|e| CoreError::Internal(format!("refresh cookie: {}", e)).into())
}

fn cleared_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(REFRESH_COOKIE, "");
    cookie.set_path(REFRESH_PATH);
    cookie
}

fn build_session(state: &AppState, user: &User) -> Result<SessionResponse, AppError> {
    let tokens = state.tokens.issue_pair(user, Utc::now())?;
    Ok(SessionResponse {
        user: user.view(),
        tokens,
    })
}

async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<SessionResponse>), AppError> {
    let email = req.email.trim().to_lowercase();
    let invalid = || AppError::from(CoreError::Unauthorized("Invalid email or password".into()));

    let Some(user) = state.users.find_by_email(&email).await? else {
        tracing::info!(email = %Masked(&email), "Login for unknown account");
        return Err(invalid());
    };
    if !verify_password(&req.password, &user.password_hash) {
        tracing::info!(user = %user.id, "Login with wrong password");
        return Err(invalid());
    }

    let session = build_session(&state, &user)?;
    let jar = jar.add(refresh_cookie(&state, &session.tokens.refresh_token)?);
    tracing::info!(user = %user.id, role = %user.role, "User logged in");
    Ok((jar, ApiResponse::ok("Login successful", session)))
}

/// Rotates the pair. The refresh token comes from the cookie, or the JSON body for scripts.
async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, ApiResponse<SessionResponse>), AppError> {
    let from_body = body.and_then(|Json(b)| b.refresh_token);
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or(from_body)
        .ok_or_else(|| CoreError::Unauthorized("Missing refresh token".into()))?;

    let claims = state.tokens.verify(&token, TokenKind::Refresh)?;
    let user = state
        .users
        .get_user(claims.user_id()?)
        .await?
        .ok_or_else(|| CoreError::Unauthorized("Invalid token".into()))?;

    if claims.tv != user.token_version {
        tracing::info!(user = %user.id, presented = claims.tv, current = user.token_version, "Stale refresh token");
        return Err(CoreError::StaleToken.into());
    }

    let session = build_session(&state, &user)?;
    let jar = jar.add(refresh_cookie(&state, &session.tokens.refresh_token)?);
    Ok((jar, ApiResponse::ok("Token refreshed", session)))
}

/// Clears the cookie and, when the caller can be identified, bumps their token version
/// so every outstanding refresh token dies.
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<(CookieJar, ApiResponse<()>), AppError> {
    let refresh = jar
        .get(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
        .or_else(|| body.and_then(|Json(b)| b.refresh_token));

    let user_id: Option<Uuid> = match (refresh, bearer_token(&headers)) {
        (Some(token), _) => state
            .tokens
            .verify(&token, TokenKind::Refresh)
            .ok()
            .and_then(|c| c.user_id().ok()),
        (None, Some(token)) => state
            .tokens
            .verify(token, TokenKind::Access)
            .ok()
            .and_then(|c| c.user_id().ok()),
        (None, None) => None,
    };

    if let Some(id) = user_id {
        match state.users.increment_token_version(id).await {
            Ok(version) => tracing::info!(user = %id, version, "Logged out everywhere"),
            Err(CoreError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok((jar.remove(cleared_cookie()), ApiResponse::ok("Logout successful", ())))
}

async fn create_user(
    State(state): State<AppState>,
    AppJson(req): AppJson<CreateUserRequest>,
) -> Result<ApiResponse<UserView>, AppError> {
    req.validate().map_err(CoreError::from)?;
    let user = new_user(req)?;
    state.users.create_user(&user).await?;
    tracing::info!(user = %user.id, role = %user.role, "User created");
    Ok(ApiResponse::created("User created successfully", user.view()))
}

pub fn new_user(req: CreateUserRequest) -> Result<User, AppError> {
    Ok(User {
        id: Uuid::now_v7(),
        email: req.email.trim().to_lowercase(),
        name: req.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        role: req.role,
        permissions: req.permissions,
        password_hash: hash_password(&req.password)?,
        token_version: 0,
        created_at: Utc::now(),
    })
}

/// Creates the configured admin when no account holds that email yet.
pub async fn bootstrap_admin(state: &AppState, email: &str, password: &str) -> Result<(), AppError> {
    let email = email.trim().to_lowercase();
    if state.users.find_by_email(&email).await?.is_some() {
        return Ok(());
    }

    let req = CreateUserRequest {
        email: email.clone(),
        password: password.to_string(),
        name: Some("Administrator".to_string()),
        role: Role::Admin,
        permissions: Vec::new(),
    };
    req.validate().map_err(CoreError::from)?;
    let user = new_user(req)?;
    match state.users.create_user(&user).await {
        Ok(()) => {
            tracing::info!(email = %Masked(&email), "Bootstrap admin created");
            Ok(())
        }
        // Another instance won the race.
        Err(CoreError::Conflict(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_user_validation() {
        let req: CreateUserRequest = serde_json::from_value(serde_json::json!({
            "email": "not-an-email",
            "password": "short",
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["email", "password"]);
        assert_eq!(req.role, Role::Support);
    }
}
