use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use savannah_core::kpi::DailyKpi;
use savannah_core::repository::KpiRepository;
use savannah_core::CoreResult;
use sqlx::PgPool;

use crate::database::db_error;

pub struct StoreKpiRepository {
    pool: PgPool,
}

impl StoreKpiRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DailyKpiRow {
    date: NaiveDate,
    bookings_today: i64,
    revenue_today: f64,
    pending_payments: i64,
    total_bookings: i64,
    total_revenue: f64,
    conversion_rate: f64,
    average_booking_value: f64,
    computed_at: DateTime<Utc>,
}

#[async_trait]
impl KpiRepository for StoreKpiRepository {
    async fn upsert_daily(&self, kpi: &DailyKpi) -> CoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO dashboard_kpis (date, bookings_today, revenue_today, pending_payments, total_bookings,
                                        total_revenue, conversion_rate, average_booking_value, computed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (date) DO UPDATE SET
                bookings_today = EXCLUDED.bookings_today,
                revenue_today = EXCLUDED.revenue_today,
                pending_payments = EXCLUDED.pending_payments,
                total_bookings = EXCLUDED.total_bookings,
                total_revenue = EXCLUDED.total_revenue,
                conversion_rate = EXCLUDED.conversion_rate,
                average_booking_value = EXCLUDED.average_booking_value,
                computed_at = EXCLUDED.computed_at
            "#,
        )
        .bind(kpi.date)
        .bind(kpi.bookings_today as i64)
        .bind(kpi.revenue_today)
        .bind(kpi.pending_payments as i64)
        .bind(kpi.total_bookings as i64)
        .bind(kpi.total_revenue)
        .bind(kpi.conversion_rate)
        .bind(kpi.average_booking_value)
        .bind(kpi.computed_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn get_daily(&self, date: NaiveDate) -> CoreResult<Option<DailyKpi>> {
        let row = sqlx::query_as::<_, DailyKpiRow>(
            r#"
            SELECT date, bookings_today, revenue_today, pending_payments, total_bookings, total_revenue,
                   conversion_rate, average_booking_value, computed_at
            FROM dashboard_kpis WHERE date = $1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.map(|r| DailyKpi {
            date: r.date,
            bookings_today: r.bookings_today as u64,
            revenue_today: r.revenue_today,
            pending_payments: r.pending_payments as u64,
            total_bookings: r.total_bookings as u64,
            total_revenue: r.total_revenue,
            conversion_rate: r.conversion_rate,
            average_booking_value: r.average_booking_value,
            computed_at: r.computed_at,
        }))
    }
}
