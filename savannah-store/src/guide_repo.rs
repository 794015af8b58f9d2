use async_trait::async_trait;
use chrono::{DateTime, Utc};
use savannah_catalog::{AvailabilityOverride, Guide, GuideFilter, GuideStatus};
use savannah_core::repository::GuideRepository;
use savannah_core::{CoreError, CoreResult};
use savannah_shared::{Page, PageRequest};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{db_error, from_json, parse_column, to_json};
use crate::sort_clause;

pub struct StoreGuideRepository {
    pool: PgPool,
}

impl StoreGuideRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct GuideRow {
    id: Uuid,
    name: String,
    email: String,
    phone: String,
    bio: String,
    photo_url: Option<String>,
    languages: Value,
    specialties: Value,
    status: String,
    availability: Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<GuideRow> for Guide {
    type Error = CoreError;

    fn try_from(row: GuideRow) -> Result<Self, Self::Error> {
        Ok(Guide {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            bio: row.bio,
            photo_url: row.photo_url,
            languages: from_json("languages", row.languages)?,
            specialties: from_json("specialties", row.specialties)?,
            status: parse_column("status", &row.status)?,
            availability: from_json::<Vec<AvailabilityOverride>>("availability", row.availability)?,
            created_at: row.created_at,
        })
    }
}

const GUIDE_COLUMNS: &str =
    "id, name, email, phone, bio, photo_url, languages, specialties, status, availability, created_at";

/// `name` is matched as a case-insensitive substring.
const GUIDE_FILTER: &str = "($1::TEXT IS NULL OR status = $1) \
     AND ($2::TEXT IS NULL OR name ILIKE '%' || $2 || '%')";

#[async_trait]
impl GuideRepository for StoreGuideRepository {
    async fn create_guide(&self, guide: &Guide) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO guides (id, name, email, phone, bio, photo_url, languages, specialties,
                                status, availability, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(guide.id)
        .bind(&guide.name)
        .bind(&guide.email)
        .bind(&guide.phone)
        .bind(&guide.bio)
        .bind(&guide.photo_url)
        .bind(to_json(&guide.languages)?)
        .bind(to_json(&guide.specialties)?)
        .bind(guide.status.as_str())
        .bind(to_json(&guide.availability)?)
        .bind(guide.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn get_guide(&self, id: Uuid) -> CoreResult<Option<Guide>> {
        let row = sqlx::query_as::<_, GuideRow>(&format!("SELECT {GUIDE_COLUMNS} FROM guides WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.map(Guide::try_from).transpose()
    }

    async fn list_guides(&self, filter: &GuideFilter, page: &PageRequest) -> CoreResult<Page<Guide>> {
        let status = filter.status.map(|s| s.as_str());
        let name = filter
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(escape_like);
        let order = sort_clause(page, &["id", "name", "created_at"]);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM guides WHERE {GUIDE_FILTER}"))
            .bind(status)
            .bind(&name)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let rows = sqlx::query_as::<_, GuideRow>(&format!(
            "SELECT {GUIDE_COLUMNS} FROM guides WHERE {GUIDE_FILTER} ORDER BY {order} LIMIT $3 OFFSET $4"
        ))
        .bind(status)
        .bind(&name)
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let items = rows.into_iter().map(Guide::try_from).collect::<CoreResult<Vec<_>>>()?;
        Ok(Page::new(items, total as u64, page))
    }

    async fn update_guide(&self, guide: &Guide) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE guides
            SET name = $2, email = $3, phone = $4, bio = $5, photo_url = $6, languages = $7,
                specialties = $8, status = $9, availability = $10
            WHERE id = $1
            "#,
        )
        .bind(guide.id)
        .bind(&guide.name)
        .bind(&guide.email)
        .bind(&guide.phone)
        .bind(&guide.bio)
        .bind(&guide.photo_url)
        .bind(to_json(&guide.languages)?)
        .bind(to_json(&guide.specialties)?)
        .bind(guide.status.as_str())
        .bind(to_json(&guide.availability)?)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Guide {}", guide.id)));
        }
        Ok(())
    }

    async fn guides_with_status(&self, status: GuideStatus) -> CoreResult<Vec<Guide>> {
        let rows = sqlx::query_as::<_, GuideRow>(&format!(
            "SELECT {GUIDE_COLUMNS} FROM guides WHERE status = $1 ORDER BY id DESC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.into_iter().map(Guide::try_from).collect()
    }
}

pub(crate) fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
