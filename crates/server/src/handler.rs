//! HTTP routes.
//!
//! - `POST /search` runs a coalesced catalog search through the [`Coordinator`].
//! - `GET /ping` answers `{"message": "pong"}`.
//! - Anything else falls through to the static directory, when one is configured.

use std::path::Path;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use vitrine_client::SERVICE_NAME;
use vitrine_core::{Coordinator, Item};

use crate::error::ApiError;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    coordinator: Coordinator,
}

/// Build the application router.
pub fn router(coordinator: Coordinator, static_dir: Option<&Path>) -> Router {
    let app = Router::new()
        .route("/ping", get(ping))
        .route("/search", post(search))
        .with_state(AppState { coordinator });

    let app = match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };

    app.layer(TraceLayer::new_for_http())
}

async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

async fn search(
    State(state): State<AppState>, body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<Item>>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected search body");
        ApiError::BadInput
    })?;
    let (query, limit) = search_params(&body).ok_or(ApiError::BadInput)?;

    let items = state.coordinator.get(SERVICE_NAME, query, limit).await?;
    Ok(Json(items))
}

/// Pull `search` (a string) and `limit` (an integral number) out of the body.
fn search_params(body: &Value) -> Option<(&str, i64)> {
    let query = body.get("search")?.as_str()?;
    let limit = body.get("limit")?;
    let limit = limit
        .as_i64()
        .or_else(|| limit.as_f64().filter(|n| n.fract() == 0.0).map(|n| n as i64))?;
    Some((query, limit))
}
