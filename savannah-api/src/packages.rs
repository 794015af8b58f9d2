use axum::{
    extract::{Path, State},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use savannah_catalog::{NewPackage, Package, PackageStatus, PackageUpdate};
use savannah_core::CoreError;
use savannah_shared::{Page, SortDir};
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::extract::{parse_id, AppJson, AppQuery};
use crate::middleware::require_staff;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct PackageListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    sort_by: Option<String>,
    sort_dir: Option<SortDir>,
    status: Option<PackageStatus>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let staff = Router::new()
        .route("/packages/create", post(create_package))
        .route("/packages/{id}", put(update_package).delete(delete_package))
        .route_layer(from_fn_with_state(state, require_staff));

    Router::new()
        .route("/packages", get(list_packages))
        .route("/packages/{id}", get(get_package))
        .merge(staff)
}

async fn list_packages(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<PackageListQuery>,
) -> Result<ApiResponse<Page<Package>>, AppError> {
    let page = state.page_request(query.page, query.limit).sorted(
        query.sort_by.unwrap_or_else(|| "id".to_string()),
        query.sort_dir.unwrap_or_default(),
    );
    let packages = state.packages.list_packages(query.status, &page).await?;
    Ok(ApiResponse::ok("Packages retrieved successfully", packages))
}

async fn get_package(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Package>, AppError> {
    let package = state
        .packages
        .get_package(parse_id(&id)?)
        .await?
        .ok_or_else(|| CoreError::NotFound("Package".into()))?;
    Ok(ApiResponse::ok("Package retrieved successfully", package))
}

async fn create_package(
    State(state): State<AppState>,
    AppJson(input): AppJson<NewPackage>,
) -> Result<ApiResponse<Package>, AppError> {
    input.validate().map_err(CoreError::from)?;
    let package = Package::create(input, Utc::now());
    state.packages.create_package(&package).await?;
    info!(package = %package.id, slug = %package.slug, "Package created");
    Ok(ApiResponse::created("Package created successfully", package))
}

async fn update_package(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(update): AppJson<PackageUpdate>,
) -> Result<ApiResponse<Package>, AppError> {
    update.validate().map_err(CoreError::from)?;
    let mut package = state
        .packages
        .get_package(parse_id(&id)?)
        .await?
        .ok_or_else(|| CoreError::NotFound("Package".into()))?;

    package.apply(update);
    state.packages.update_package(&package).await?;
    info!(package = %package.id, "Package updated");
    Ok(ApiResponse::ok("Package updated successfully", package))
}

/// Soft delete: the package goes inactive and keeps backing existing bookings.
async fn delete_package(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Package>, AppError> {
    let mut package = state
        .packages
        .get_package(parse_id(&id)?)
        .await?
        .ok_or_else(|| CoreError::NotFound("Package".into()))?;

    package.status = PackageStatus::Inactive;
    state.packages.update_package(&package).await?;
    info!(package = %package.id, "Package deactivated");
    Ok(ApiResponse::ok("Package deleted successfully", package))
}
