use axum::{extract::State, middleware::from_fn_with_state, routing::get, Router};
use chrono::{NaiveDate, Utc};
use savannah_core::kpi::{DailyKpi, DashboardKpis};
use savannah_core::CoreError;
use serde::Deserialize;

use crate::error::AppError;
use crate::extract::AppQuery;
use crate::middleware::require_kpi_access;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct KpiQuery {
    date_from: Option<NaiveDate>,
    date_to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
struct DailyQuery {
    date: Option<NaiveDate>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard/kpis", get(kpis))
        .route("/dashboard/kpis/daily", get(daily_kpi))
        .route_layer(from_fn_with_state(state, require_kpi_access))
}

async fn kpis(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<KpiQuery>,
) -> Result<ApiResponse<DashboardKpis>, AppError> {
    let kpis = state
        .kpis
        .dashboard(query.date_from, query.date_to, Utc::now())
        .await?;
    Ok(ApiResponse::ok("Dashboard KPIs retrieved successfully", kpis))
}

/// Stored rollup row for a day, yesterday by default.
async fn daily_kpi(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<DailyQuery>,
) -> Result<ApiResponse<DailyKpi>, AppError> {
    let date = match query.date {
        Some(date) => date,
        None => Utc::now()
            .date_naive()
            .pred_opt()
            .ok_or_else(|| CoreError::Validation("date out of range".into()))?,
    };
    let kpi = state
        .kpis
        .daily(date)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("KPI rollup for {}", date)))?;
    Ok(ApiResponse::ok("Daily KPIs retrieved successfully", kpi))
}
