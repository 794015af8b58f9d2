use async_trait::async_trait;
use chrono::{DateTime, Utc};
use savannah_core::identity::User;
use savannah_core::repository::UserRepository;
use savannah_core::{CoreError, CoreResult};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{db_error, from_json, parse_column, to_json};

pub struct StoreUserRepository {
    pool: PgPool,
}

impl StoreUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: Option<String>,
    role: String,
    permissions: Value,
    password_hash: String,
    token_version: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = CoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            role: parse_column("role", &row.role)?,
            permissions: from_json("permissions", row.permissions)?,
            password_hash: row.password_hash,
            token_version: row.token_version,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, name, role, permissions, password_hash, token_version, created_at";

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn create_user(&self, user: &User) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, permissions, password_hash, token_version, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(to_json(&user.permissions)?)
        .bind(&user.password_hash)
        .bind(user.token_version)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| match db_error(err) {
            CoreError::Conflict(_) => CoreError::Conflict(format!("User {} already exists", user.email)),
            other => other,
        })?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(User::try_from).transpose()
    }

    async fn get_user(&self, id: Uuid) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(User::try_from).transpose()
    }

    async fn increment_token_version(&self, id: Uuid) -> CoreResult<i64> {
        let version: Option<i64> = sqlx::query_scalar(
            "UPDATE users SET token_version = token_version + 1 WHERE id = $1 RETURNING token_version",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        version.ok_or_else(|| CoreError::NotFound(format!("User {id}")))
    }
}
