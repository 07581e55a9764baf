use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_cookies::Cookies;

use ember_backend::models::{
    Bookmark, CreateBookmarkRequest, ReorderRequest, UpdateBookmarkRequest,
};
use ember_backend::utils::now_rfc3339;

use crate::auth::{current_user, require_user};
use crate::state::AppState;

const BOOKMARK_COLUMNS: &str =
    "id, name, url, description, icon, is_public, category_id, order_index, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct ListBookmarksQuery {
    pub category_id: Option<i64>,
}

pub async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Query(query): Query<ListBookmarksQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let public_only = current_user(&state, &cookies).await.is_none();

    let mut sql = format!("SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE 1 = 1");
    if query.category_id.is_some() {
        sql.push_str(" AND category_id = ?");
    }
    if public_only {
        sql.push_str(" AND is_public = 1");
    }
    sql.push_str(" ORDER BY category_id ASC, order_index ASC");

    let mut q = sqlx::query_as::<_, Bookmark>(&sql);
    if let Some(category_id) = query.category_id {
        q = q.bind(category_id);
    }

    let bookmarks = q.fetch_all(&state.db).await.map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Server error"})),
        )
    })?;

    Ok(Json(json!({
        "code": 200,
        "data": bookmarks
    })))
}

pub async fn create_bookmark(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<CreateBookmarkRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    if req.name.trim().is_empty() || req.url.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Name and URL are required"})),
        ));
    }

    let category_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
        .bind(req.category_id)
        .fetch_optional(&state.db)
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Server error"})),
            )
        })?;

    if category_exists.is_none() {
        return Ok(Json(json!({
            "code": 404,
            "message": "Category not found"
        })));
    }

    let now = now_rfc3339();
    let next_order: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(order_index), 0) + 1 FROM bookmarks WHERE category_id = ?",
    )
    .bind(req.category_id)
    .fetch_one(&state.db)
    .await
    .map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Server error"})),
        )
    })?;

    let result = sqlx::query(
        "INSERT INTO bookmarks (name, url, description, icon, is_public, category_id, order_index, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&req.name)
    .bind(&req.url)
    .bind(&req.description)
    .bind(&req.icon)
    .bind(req.is_public)
    .bind(req.category_id)
    .bind(next_order)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create bookmark: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to create bookmark"})),
        )
    })?;

    let created: Bookmark = sqlx::query_as(&format!(
        "SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE id = ?"
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

pub async fn update_bookmark(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBookmarkRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    let existing: Option<Bookmark> = sqlx::query_as(&format!(
        "SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE id = ?"
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
        Some(bookmark) => bookmark,
        None => {
            return Ok(Json(json!({
                "code": 404,
                "message": "Bookmark not found"
            })))
        }
    };

    // Moving to another category requires that category to exist
    if let Some(category_id) = req.category_id {
        let target: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
            .bind(category_id)
            .fetch_optional(&state.db)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Server error"})),
                )
            })?;
        if target.is_none() {
            return Ok(Json(json!({
                "code": 404,
                "message": "Category not found"
            })));
        }
    }

    let now = now_rfc3339();
    sqlx::query(
        "UPDATE bookmarks SET name = ?, url = ?, description = ?, icon = ?, is_public = ?, category_id = ?, order_index = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(req.name.unwrap_or(existing.name))
    .bind(req.url.unwrap_or(existing.url))
    .bind(req.description.unwrap_or(existing.description))
    .bind(req.icon.unwrap_or(existing.icon))
    .bind(req.is_public.unwrap_or(existing.is_public))
    .bind(req.category_id.unwrap_or(existing.category_id))
    .bind(req.order_index.unwrap_or(existing.order_index))
    .bind(&now)
    .bind(id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update bookmark {}: {:?}", id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to update bookmark"})),
        )
    })?;

    Ok(Json(json!({
        "code": 200,
        "message": "Bookmark updated"
    })))
}

pub async fn delete_bookmark(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    sqlx::query("DELETE FROM bookmarks WHERE id = ?")
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
        "message": "Bookmark deleted"
    })))
}

pub async fn reorder_bookmarks(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    let now = now_rfc3339();
    for item in &req.items {
        sqlx::query("UPDATE bookmarks SET order_index = ?, updated_at = ? WHERE id = ?")
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
