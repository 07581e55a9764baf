use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower_cookies::Cookies;

use ember_backend::utils::now_rfc3339;

use crate::auth::require_admin;
use crate::state::AppState;

/// Keys the settings endpoints will read or write
const SETTING_KEYS: &[&str] = &[
    "site_title",
    "site_description",
    "hide_search",
    "hide_apps",
    "hide_categories",
    "use_ordering",
];

/// Read one site setting
pub async fn get_setting(pool: &sqlx::SqlitePool, key: &str) -> Option<String> {
    sqlx::query_scalar::<_, String>("SELECT value FROM site_settings WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await
        .ok()
        .flatten()
}

fn as_flag(value: Option<&str>) -> bool {
    value == Some("true")
}

/// GET /api/settings/public - display settings consumed by the frontend
pub async fn get_public_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, StatusCode> {
    let mut values: HashMap<&str, Option<String>> = HashMap::new();
    for key in SETTING_KEYS {
        values.insert(*key, get_setting(&state.db, key).await);
    }

    Ok(Json(json!({
        "code": 200,
        "data": {
            "site_title": values["site_title"].as_deref().unwrap_or("Ember"),
            "site_description": values["site_description"].as_deref().unwrap_or(""),
            "hide_search": as_flag(values["hide_search"].as_deref()),
            "hide_apps": as_flag(values["hide_apps"].as_deref()),
            "hide_categories": as_flag(values["hide_categories"].as_deref()),
            "use_ordering": values["use_ordering"].as_deref().unwrap_or("order_index"),
        }
    })))
}

/// POST /api/settings - admin-only update; unknown keys are ignored
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_admin(&state, &cookies).await?;

    let now = now_rfc3339();
    let mut updated = 0u32;

    for key in SETTING_KEYS {
        if let Some(value) = req.get(*key) {
            sqlx::query(
                "INSERT INTO site_settings (key, value, updated_at) VALUES (?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            )
            .bind(*key)
            .bind(value)
            .bind(&now)
            .execute(&state.db)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Server error"})),
                )
            })?;
            updated += 1;
        }
    }

    Ok(Json(json!({
        "code": 200,
        "message": "Settings updated",
        "updated": updated
    })))
}
