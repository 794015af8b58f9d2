use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use savannah_core::booking::{
    Booking, BookingFilter, BookingStatus, BookingUpdate, BookingView, NewBooking, PaymentStatus,
};
use savannah_core::CoreError;
use savannah_order::CreatedBooking;
use savannah_shared::{parse_instant, DateWindow, Page, SortDir};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::extract::{parse_id, AppJson, AppQuery};
use crate::middleware::require_staff;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct BookingListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    sort_dir: Option<SortDir>,
    guest_name: Option<String>,
    guest_email: Option<String>,
    package_id: Option<String>,
    payment_status: Option<PaymentStatus>,
    booking_status: Option<BookingStatus>,
    tour_date: Option<String>,
}

impl BookingListQuery {
    fn filter(&self) -> Result<BookingFilter, AppError> {
        let text = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let package_id = match text(&self.package_id) {
            Some(raw) => Some(parse_id(&raw)?),
            None => None,
        };
        let tour_date = match text(&self.tour_date) {
            Some(raw) => {
                let instant: DateTime<Utc> =
                    parse_instant("tour_date", &raw).map_err(CoreError::from)?;
                Some(DateWindow::day(instant.date_naive()).map_err(CoreError::from)?)
            }
            None => None,
        };

        Ok(BookingFilter {
            guest_name: text(&self.guest_name),
            guest_email: text(&self.guest_email),
            package_id,
            payment_status: self.payment_status,
            booking_status: self.booking_status,
            tour_date,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReassignRequest {
    guide_id: Option<String>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let staff = Router::new()
        .route("/bookings", get(list_bookings))
        .route("/bookings/{id}", get(get_booking))
        .route("/bookings/update/{id}", put(update_booking))
        .route("/bookings/delete/{id}", delete(delete_booking))
        .route("/bookings/{id}/reassign-guide", post(reassign_guide))
        .route_layer(from_fn_with_state(state, require_staff));

    Router::new()
        .route("/bookings/create", post(create_booking))
        .merge(staff)
}

async fn list_bookings(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BookingListQuery>,
) -> Result<ApiResponse<Page<BookingView>>, AppError> {
    let filter = query.filter()?;
    let page = state
        .page_request(query.page, query.limit)
        .sorted("id", query.sort_dir.unwrap_or_default());

    let bookings = state.lifecycle.list_bookings(&filter, &page).await?;
    Ok(ApiResponse::ok("Bookings retrieved successfully", bookings))
}

/// Public checkout entry point: booking, invoice and gateway session in one call.
async fn create_booking(
    State(state): State<AppState>,
    AppJson(input): AppJson<NewBooking>,
) -> Result<ApiResponse<CreatedBooking>, AppError> {
    match state.lifecycle.create_booking(input).await {
        Ok(created) => {
            state.metrics.booking_created();
            info!(
                booking = %created.booking.id,
                reference = %created.booking.reference,
                "Booking created via API"
            );
            Ok(ApiResponse::created("Booking created successfully", created))
        }
        Err(err @ CoreError::Gateway(_)) => {
            // The booking and its invoice were persisted before the gateway call.
            state.metrics.booking_created();
            state.metrics.gateway_failure();
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<BookingView>, AppError> {
    let booking = state.lifecycle.get_booking(parse_id(&id)?).await?;
    Ok(ApiResponse::ok("Booking retrieved successfully", booking))
}

async fn update_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(update): AppJson<BookingUpdate>,
) -> Result<ApiResponse<Booking>, AppError> {
    let booking = state.lifecycle.update_booking(parse_id(&id)?, update).await?;
    Ok(ApiResponse::ok("Booking updated successfully", booking))
}

async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    state.lifecycle.delete_booking(parse_id(&id)?).await?;
    Ok(ApiResponse::ok("Booking deleted successfully", ()))
}

async fn reassign_guide(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(req): AppJson<ReassignRequest>,
) -> Result<ApiResponse<Booking>, AppError> {
    let guide_id: Uuid = match req.guide_id.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => parse_id(raw)?,
        _ => return Err(CoreError::Validation("Guide ID is required".into()).into()),
    };

    let booking = state.lifecycle.reassign_guide(parse_id(&id)?, guide_id).await?;
    Ok(ApiResponse::ok("Guide reassigned successfully", booking))
}
