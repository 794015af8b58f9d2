use axum::{
    extract::{DefaultBodyLimit, Path, State},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use chrono::Utc;
use savannah_catalog::{Guide, GuideFilter, GuideStatus, GuideUpdate, NewGuide};
use savannah_core::CoreError;
use savannah_shared::{DateWindow, Page, PageRequest, SortDir};
use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::extensions::UPLOAD_BODY_LIMIT;
use crate::extract::{parse_id, AppQuery, JsonOrMultipart, UploadFile};
use crate::middleware::require_staff;
use crate::response::ApiResponse;
use crate::state::AppState;

const PHOTO_FOLDER: &str = "guides";

#[derive(Debug, Default, Deserialize)]
struct GuideListQuery {
    page: Option<u32>,
    limit: Option<u32>,
    sort_by: Option<String>,
    sort_dir: Option<SortDir>,
    status: Option<GuideStatus>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AvailabilityQuery {
    date: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    status: Option<GuideStatus>,
    page: Option<u32>,
    limit: Option<u32>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    let staff = Router::new()
        .route("/guides", post(create_guide))
        .route("/guides/{id}", put(update_guide).delete(delete_guide))
        .route_layer(from_fn_with_state(state, require_staff))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT));

    Router::new()
        .route("/guides", get(list_guides))
        .route("/guides/available", get(available_guides))
        .route("/guides/{id}", get(get_guide))
        .merge(staff)
}

async fn list_guides(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<GuideListQuery>,
) -> Result<ApiResponse<Page<Guide>>, AppError> {
    let filter = GuideFilter {
        status: query.status,
        name: query.name.filter(|n| !n.trim().is_empty()),
    };
    let page = state.page_request(query.page, query.limit).sorted(
        query.sort_by.unwrap_or_else(|| "id".to_string()),
        query.sort_dir.unwrap_or_default(),
    );

    let guides = state.guides.list_guides(&filter, &page).await?;
    Ok(ApiResponse::ok("Guides retrieved successfully", guides))
}

/// `?date=` for one UTC day, or `?start_date=&end_date=` for `[start, end)`.
async fn available_guides(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<AvailabilityQuery>,
) -> Result<ApiResponse<Page<Guide>>, AppError> {
    let window = DateWindow::from_query(
        query.date.as_deref(),
        query.start_date.as_deref(),
        query.end_date.as_deref(),
    )
    .map_err(CoreError::from)?;

    let rules = &state.business_rules;
    let page = PageRequest::new(
        query.page,
        query.limit,
        rules.availability_page_limit,
        rules.max_page_limit,
    );
    let status = query.status.unwrap_or(GuideStatus::Active);

    let guides = state
        .availability
        .find_available_guides(&window, status, &page)
        .await?;
    Ok(ApiResponse::ok("Available guides retrieved successfully", guides))
}

async fn get_guide(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Guide>, AppError> {
    let guide = state
        .guides
        .get_guide(parse_id(&id)?)
        .await?
        .ok_or_else(|| CoreError::NotFound("Guide".into()))?;
    Ok(ApiResponse::ok("Guide retrieved successfully", guide))
}

async fn upload_photo(state: &AppState, image: UploadFile) -> Result<String, AppError> {
    let uploaded = state
        .uploader
        .upload(&image.file_name, Some(PHOTO_FOLDER), image.bytes)
        .await?;
    Ok(uploaded.url)
}

/// JSON body, or multipart with the guide as a `data` JSON field and an optional `image`.
async fn create_guide(
    State(state): State<AppState>,
    body: JsonOrMultipart<NewGuide>,
) -> Result<ApiResponse<Guide>, AppError> {
    let JsonOrMultipart { data: mut input, image } = body;
    input.validate().map_err(CoreError::from)?;

    if let Some(image) = image {
        input.photo_url = Some(upload_photo(&state, image).await?);
    }

    let guide = Guide::create(input, Utc::now());
    state.guides.create_guide(&guide).await?;
    info!(guide = %guide.id, status = %guide.status, "Guide created");
    Ok(ApiResponse::created("Guide created successfully", guide))
}

async fn update_guide(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: JsonOrMultipart<GuideUpdate>,
) -> Result<ApiResponse<Guide>, AppError> {
    let JsonOrMultipart { data: mut update, image } = body;
    update.validate().map_err(CoreError::from)?;

    let mut guide = state
        .guides
        .get_guide(parse_id(&id)?)
        .await?
        .ok_or_else(|| CoreError::NotFound("Guide".into()))?;

    if let Some(image) = image {
        update.photo_url = Some(upload_photo(&state, image).await?);
    }

    guide.apply(update);
    state.guides.update_guide(&guide).await?;
    info!(guide = %guide.id, "Guide updated");
    Ok(ApiResponse::ok("Guide updated successfully", guide))
}

/// Soft delete: the guide goes inactive, which also drops them from availability.
async fn delete_guide(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Guide>, AppError> {
    let mut guide = state
        .guides
        .get_guide(parse_id(&id)?)
        .await?
        .ok_or_else(|| CoreError::NotFound("Guide".into()))?;

    guide.status = GuideStatus::Inactive;
    state.guides.update_guide(&guide).await?;
    info!(guide = %guide.id, "Guide deactivated");
    Ok(ApiResponse::ok("Guide deleted successfully", guide))
}
