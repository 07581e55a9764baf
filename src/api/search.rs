use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_cookies::Cookies;

use ember_backend::search::{search as run_search, SearchResults};

use crate::auth::current_user;
use crate::state::AppState;

use super::apps::{configured_order, load_apps};
use super::categories::load_categories;
use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
}

/// POST /api/search - run one quick-search pass over both collections.
///
/// An empty query is not an error: it means "no active search" and yields
/// null result sets, which the frontend renders as the pinned-items default.
pub async fn search(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchResults>>, (StatusCode, Json<Value>)> {
    let public_only = current_user(&state, &cookies).await.is_none();
    let order_by = configured_order(&state.db).await;

    let apps = load_apps(&state.db, order_by).await.map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Server error"})),
        )
    })?;

    let categories = load_categories(&state.db, order_by, public_only)
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Server error"})),
            )
        })?;

    let results = run_search(Some(req.query.as_str()), &apps, &categories);

    Ok(Json(ApiResponse::success(results)))
}
