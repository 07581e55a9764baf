use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_cookies::Cookies;

use ember_backend::models::{Application, CreateAppRequest, ReorderRequest, UpdateAppRequest};
use ember_backend::utils::{now_rfc3339, order_by_clause};

use crate::auth::require_user;
use crate::state::AppState;

const APP_COLUMNS: &str =
    "id, name, description, url, icon, is_pinned, order_index, created_at, updated_at";

/// Load every application, ordered by a whitelisted ORDER BY fragment.
/// Also feeds the search endpoint so both see the same source order.
pub(crate) async fn load_apps(
    pool: &SqlitePool,
    order_by: &str,
) -> Result<Vec<Application>, sqlx::Error> {
    let sql = format!("SELECT {APP_COLUMNS} FROM applications ORDER BY {order_by}");
    sqlx::query_as::<_, Application>(&sql).fetch_all(pool).await
}

pub(crate) async fn configured_order(pool: &SqlitePool) -> &'static str {
    let mode = super::settings::get_setting(pool, "use_ordering")
        .await
        .unwrap_or_default();
    order_by_clause(&mode)
}

pub async fn list_apps(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let order_by = configured_order(&state.db).await;
    let apps = load_apps(&state.db, order_by).await.map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Server error"})),
        )
    })?;

    Ok(Json(json!({
        "code": 200,
        "data": apps
    })))
}

pub async fn create_app(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<CreateAppRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    if req.name.trim().is_empty() || req.url.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Name and URL are required"})),
        ));
    }

    let now = now_rfc3339();
    let next_order: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(order_index), 0) + 1 FROM applications")
            .fetch_one(&state.db)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Server error"})),
                )
            })?;

    let result = sqlx::query(
        "INSERT INTO applications (name, description, url, icon, is_pinned, order_index, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&req.url)
    .bind(&req.icon)
    .bind(req.is_pinned)
    .bind(next_order)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create application: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to create application"})),
        )
    })?;

    let created: Application = sqlx::query_as(&format!(
        "SELECT {APP_COLUMNS} FROM applications WHERE id = ?"
    ))
    .bind(result.last_insert_rowid())
    .fetch_one(&state.db)
    .await
    .map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Server error"})),
        )
    })?;

    Ok(Json(json!({
        "code": 200,
        "data": created
    })))
}

pub async fn update_app(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(id): Path<i64>,
    Json(req): Json<UpdateAppRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    let existing: Option<Application> = sqlx::query_as(&format!(
        "SELECT {APP_COLUMNS} FROM applications WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&state.db)
    .await
    .map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Server error"})),
        )
    })?;

    let existing = match existing {
        Some(app) => app,
        None => {
            return Ok(Json(json!({
                "code": 404,
                "message": "Application not found"
            })))
        }
    };

    let now = now_rfc3339();
    sqlx::query(
        "UPDATE applications SET name = ?, description = ?, url = ?, icon = ?, is_pinned = ?, order_index = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(req.name.unwrap_or(existing.name))
    .bind(req.description.unwrap_or(existing.description))
    .bind(req.url.unwrap_or(existing.url))
    .bind(req.icon.unwrap_or(existing.icon))
    .bind(req.is_pinned.unwrap_or(existing.is_pinned))
    .bind(req.order_index.unwrap_or(existing.order_index))
    .bind(&now)
    .bind(id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update application {}: {:?}", id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to update application"})),
        )
    })?;

    Ok(Json(json!({
        "code": 200,
        "message": "Application updated"
    })))
}

pub async fn delete_app(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    sqlx::query("DELETE FROM applications WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Server error"})),
            )
        })?;

    Ok(Json(json!({
        "code": 200,
        "message": "Application deleted"
    })))
}

pub async fn pin_app(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    let result = sqlx::query("UPDATE applications SET is_pinned = 1 - is_pinned, updated_at = ? WHERE id = ?")
        .bind(now_rfc3339())
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Server error"})),
            )
        })?;

    if result.rows_affected() == 0 {
        return Ok(Json(json!({
            "code": 404,
            "message": "Application not found"
        })));
    }

    Ok(Json(json!({
        "code": 200,
        "message": "Pin toggled"
    })))
}

pub async fn reorder_apps(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    let now = now_rfc3339();
    for item in &req.items {
        sqlx::query("UPDATE applications SET order_index = ?, updated_at = ? WHERE id = ?")
            .bind(item.order_index)
            .bind(&now)
            .bind(item.id)
            .execute(&state.db)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Server error"})),
                )
            })?;
    }

    Ok(Json(json!({
        "code": 200,
        "message": "Order updated"
    })))
}
