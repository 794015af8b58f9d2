use axum::{http::Method, middleware::from_fn_with_state, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod bookings;
pub mod dashboard;
pub mod error;
pub mod extensions;
pub mod extract;
pub mod guides;
pub mod health;
pub mod metrics;
pub mod middleware;
pub mod packages;
pub mod password;
pub mod response;
pub mod state;
pub mod tokens;
pub mod worker;

pub use state::{AppState, Repositories};

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .merge(auth::routes(state.clone()))
        .merge(bookings::routes(state.clone()))
        .merge(guides::routes(state.clone()))
        .merge(packages::routes(state.clone()))
        .merge(extensions::routes(state.clone()))
        .merge(dashboard::routes(state.clone()))
        .merge(health::routes())
        .merge(metrics::routes())
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), middleware::internal_detail_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(state.clone(), middleware::rate_limit_middleware))
        .with_state(state)
}

async fn not_found() -> error::AppError {
    error::AppError::Core(savannah_core::CoreError::NotFound("Route".into()))
}
