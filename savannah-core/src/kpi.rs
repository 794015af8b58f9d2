use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Headline numbers for `GET /dashboard/kpis`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardKpis {
    pub total_revenue: f64,
    pub total_bookings: u64,
    pub occupancy_rate: f64,
    pub average_booking_value: f64,
}

/// Raw counts a KPI computation starts from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BookingSummary {
    pub bookings: u64,
    pub successful_payments: u64,
    pub pending_payments: u64,
    pub revenue: f64,
}

/// One row of the daily rollup table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyKpi {
    pub date: NaiveDate,
    pub bookings_today: u64,
    pub revenue_today: f64,
    pub pending_payments: u64,
    pub total_bookings: u64,
    pub total_revenue: f64,
    pub conversion_rate: f64,
    pub average_booking_value: f64,
    pub computed_at: DateTime<Utc>,
}
