use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use savannah_core::identity::{Role, User};
use savannah_core::{CoreError, CoreResult};
use savannah_store::app_config::AuthConfig;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub perms: Vec<String>,
    /// Token version of the user at issue time.
    pub tv: i64,
    pub kind: TokenKind,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn user_id(&self) -> CoreResult<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| CoreError::Unauthorized("Invalid token".into()))
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.perms.iter().any(|p| p == permission)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

// ============================================================================
// Signer
// ============================================================================

pub struct TokenSigner {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenSigner {
    pub fn new(config: &AuthConfig) -> CoreResult<Self> {
        let algorithm = Algorithm::from_str(&config.algorithm)
            .map_err(|_| CoreError::Internal(format!("unsupported JWT algorithm {}", config.algorithm)))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(CoreError::Internal(format!(
                "JWT algorithm {} needs a key pair, only HMAC secrets are configured",
                config.algorithm
            )));
        }
        if config.jwt_secret.is_empty() {
            return Err(CoreError::Internal("auth.jwt_secret is empty".into()));
        }

        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::seconds(config.access_ttl_seconds as i64),
            refresh_ttl: Duration::days(config.refresh_ttl_days as i64),
        })
    }

    pub fn issue(&self, user: &User, kind: TokenKind, now: DateTime<Utc>) -> CoreResult<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            perms: user.permissions.clone(),
            tv: user.token_version,
            kind,
            iat: now.timestamp().max(0) as usize,
            exp: (now + ttl).timestamp().max(0) as usize,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| CoreError::Internal(format!("Token encoding failed: {}", e)))
    }

    pub fn issue_pair(&self, user: &User, now: DateTime<Utc>) -> CoreResult<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue(user, TokenKind::Access, now)?,
            refresh_token: self.issue(user, TokenKind::Refresh, now)?,
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    /// Checks signature, expiry and kind. Token version is the caller's concern.
    pub fn verify(&self, token: &str, kind: TokenKind) -> CoreResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(self.algorithm))
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected token");
                CoreError::Unauthorized("Invalid token".into())
            })?;

        if data.claims.kind != kind {
            return Err(CoreError::Unauthorized("Wrong token type".into()));
        }
        Ok(data.claims)
    }
}
