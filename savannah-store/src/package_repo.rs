use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use savannah_catalog::{Addon, Package, PackageStatus};
use savannah_core::repository::PackageRepository;
use savannah_core::{CoreError, CoreResult};
use savannah_shared::{Page, PageRequest};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{db_error, from_json, parse_column, to_json};
use crate::sort_clause;

pub struct StorePackageRepository {
    pool: PgPool,
}

impl StorePackageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    title: String,
    slug: String,
    description: String,
    base_price: f64,
    guest_limit: i32,
    extra_guest_fee: f64,
    duration_hours: i32,
    images: Value,
    addons: Value,
    available_dates: Value,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PackageRow> for Package {
    type Error = CoreError;

    fn try_from(row: PackageRow) -> Result<Self, Self::Error> {
        Ok(Package {
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            base_price: row.base_price,
            guest_limit: row.guest_limit,
            extra_guest_fee: row.extra_guest_fee,
            duration_hours: row.duration_hours,
            images: from_json::<Vec<String>>("images", row.images)?,
            addons: from_json::<Vec<Addon>>("addons", row.addons)?,
            available_dates: from_json::<Vec<NaiveDate>>("available_dates", row.available_dates)?,
            status: parse_column("status", &row.status)?,
            created_at: row.created_at,
        })
    }
}

const PACKAGE_COLUMNS: &str = "id, title, slug, description, base_price, guest_limit, extra_guest_fee, \
     duration_hours, images, addons, available_dates, status, created_at";

#[async_trait]
impl PackageRepository for StorePackageRepository {
    async fn create_package(&self, package: &Package) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO packages (id, title, slug, description, base_price, guest_limit, extra_guest_fee,
                                  duration_hours, images, addons, available_dates, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(package.id)
        .bind(&package.title)
        .bind(&package.slug)
        .bind(&package.description)
        .bind(package.base_price)
        .bind(package.guest_limit)
        .bind(package.extra_guest_fee)
        .bind(package.duration_hours)
        .bind(to_json(&package.images)?)
        .bind(to_json(&package.addons)?)
        .bind(to_json(&package.available_dates)?)
        .bind(package.status.as_str())
        .bind(package.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn get_package(&self, id: Uuid) -> CoreResult<Option<Package>> {
        let row = sqlx::query_as::<_, PackageRow>(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;
        row.map(Package::try_from).transpose()
    }

    async fn list_packages(
        &self,
        status: Option<PackageStatus>,
        page: &PageRequest,
    ) -> CoreResult<Page<Package>> {
        let status = status.map(|s| s.as_str());
        let order = sort_clause(page, &["id", "title", "base_price", "created_at"]);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM packages WHERE ($1::TEXT IS NULL OR status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        let rows = sqlx::query_as::<_, PackageRow>(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM packages WHERE ($1::TEXT IS NULL OR status = $1) \
             ORDER BY {order} LIMIT $2 OFFSET $3"
        ))
        .bind(status)
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let items = rows
            .into_iter()
            .map(Package::try_from)
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Page::new(items, total as u64, page))
    }

    async fn update_package(&self, package: &Package) -> CoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE packages
            SET title = $2, slug = $3, description = $4, base_price = $5, guest_limit = $6,
                extra_guest_fee = $7, duration_hours = $8, images = $9, addons = $10,
                available_dates = $11, status = $12
            WHERE id = $1
            "#,
        )
        .bind(package.id)
        .bind(&package.title)
        .bind(&package.slug)
        .bind(&package.description)
        .bind(package.base_price)
        .bind(package.guest_limit)
        .bind(package.extra_guest_fee)
        .bind(package.duration_hours)
        .bind(to_json(&package.images)?)
        .bind(to_json(&package.addons)?)
        .bind(to_json(&package.available_dates)?)
        .bind(package.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(format!("Package {}", package.id)));
        }
        Ok(())
    }
}
