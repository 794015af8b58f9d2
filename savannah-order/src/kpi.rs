use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use savannah_core::kpi::{BookingSummary, DailyKpi, DashboardKpis};
use savannah_core::repository::{BookingRepository, KpiRepository};
use savannah_core::CoreResult;
use savannah_shared::DateWindow;

const DEFAULT_LOOKBACK_DAYS: i64 = 30;

pub struct KpiService {
    bookings: Arc<dyn BookingRepository>,
    kpis: Arc<dyn KpiRepository>,
}

impl KpiService {
    pub fn new(bookings: Arc<dyn BookingRepository>, kpis: Arc<dyn KpiRepository>) -> Self {
        Self { bookings, kpis }
    }

    /// Dashboard numbers over bookings created between the two days, inclusive.
    /// Missing bounds default to the last thirty days ending today.
    pub async fn dashboard(
        &self,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> CoreResult<DashboardKpis> {
        let today = now.date_naive();
        let to = date_to.unwrap_or(today);
        let from = date_from.unwrap_or_else(|| today - Duration::days(DEFAULT_LOOKBACK_DAYS));
        let window = DateWindow::days_inclusive(from, to)?;

        let summary = self.bookings.booking_summary(Some(&window)).await?;
        Ok(DashboardKpis {
            total_revenue: summary.revenue,
            total_bookings: summary.bookings,
            occupancy_rate: 0.0,
            average_booking_value: average(&summary),
        })
    }

    /// Computes and stores the rollup row for one calendar day.
    pub async fn rollup_day(&self, date: NaiveDate, now: DateTime<Utc>) -> CoreResult<DailyKpi> {
        let day = self.bookings.booking_summary(Some(&DateWindow::day(date)?)).await?;
        let all_time = self.bookings.booking_summary(None).await?;

        let conversion_rate = if day.bookings > 0 {
            day.successful_payments as f64 / day.bookings as f64
        } else {
            0.0
        };

        let kpi = DailyKpi {
            date,
            bookings_today: day.bookings,
            revenue_today: day.revenue,
            pending_payments: day.pending_payments,
            total_bookings: all_time.bookings,
            total_revenue: all_time.revenue,
            conversion_rate,
            average_booking_value: average(&day),
            computed_at: now,
        };
        self.kpis.upsert_daily(&kpi).await?;
        tracing::info!(%date, bookings = kpi.bookings_today, revenue = kpi.revenue_today, "Daily KPIs stored");
        Ok(kpi)
    }

    pub async fn daily(&self, date: NaiveDate) -> CoreResult<Option<DailyKpi>> {
        self.kpis.get_daily(date).await
    }
}

fn average(summary: &BookingSummary) -> f64 {
    if summary.successful_payments > 0 {
        summary.revenue / summary.successful_payments as f64
    } else {
        0.0
    }
}
