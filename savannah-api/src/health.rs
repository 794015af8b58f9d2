use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// `database` reports the Postgres pool; the in-memory store is always up.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match &state.db {
        Some(db) => db.ping().await,
        None => true,
    };
    Json(json!({ "ok": true, "database": database }))
}
