use std::sync::Arc;

use chrono::{DateTime, Days, Utc};
use savannah_core::kpi::DailyKpi;
use savannah_core::{CoreError, CoreResult};
use savannah_order::KpiService;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

/// Rolls up the previous UTC day shortly after every midnight. Runs until the process exits.
pub async fn start_kpi_worker(kpis: Arc<KpiService>) {
    info!("KPI rollup worker started");

    loop {
        let wait = until_next_midnight(Utc::now());
        sleep(wait).await;

        if let Err(e) = rollup_previous_day(&kpis, Utc::now()).await {
            error!("Daily KPI rollup failed: {}", e);
        }
    }
}

pub fn until_next_midnight(now: DateTime<Utc>) -> Duration {
    let next = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc());

    match next {
        Some(next) => (next - now).to_std().unwrap_or(Duration::from_secs(60)),
        None => Duration::from_secs(24 * 60 * 60),
    }
}

pub async fn rollup_previous_day(kpis: &KpiService, now: DateTime<Utc>) -> CoreResult<DailyKpi> {
    let yesterday = now
        .date_naive()
        .pred_opt()
        .ok_or_else(|| CoreError::Internal("no previous day".into()))?;
    kpis.rollup_day(yesterday, now).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use savannah_store::MemoryStore;

    #[test]
    fn test_until_next_midnight() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 23, 30, 0).unwrap();
        assert_eq!(until_next_midnight(now), Duration::from_secs(30 * 60));

        let midnight = Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(until_next_midnight(midnight), Duration::from_secs(24 * 60 * 60));
    }

    #[tokio::test]
    async fn test_rollup_targets_yesterday() {
        let store = Arc::new(MemoryStore::new());
        let kpis = KpiService::new(store.clone(), store);

        let now = Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 5).unwrap();
        let kpi = rollup_previous_day(&kpis, now).await.unwrap();
        assert_eq!(kpi.date, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
        assert_eq!(kpi.bookings_today, 0);

        let stored = kpis.daily(kpi.date).await.unwrap().unwrap();
        assert_eq!(stored, kpi);
    }
}
