use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_cookies::Cookies;

use ember_backend::models::{
    Bookmark, Category, CategoryWithBookmarks, CreateCategoryRequest, ReorderRequest,
    UpdateCategoryRequest,
};
use ember_backend::utils::now_rfc3339;

use crate::auth::{current_user, require_user};
use crate::state::AppState;

const CATEGORY_COLUMNS: &str = "id, name, is_pinned, order_index, created_at, updated_at";
const BOOKMARK_COLUMNS: &str =
    "id, name, url, description, icon, is_public, category_id, order_index, created_at, updated_at";

/// Load every category with its ordered bookmark list. Guests only see
/// public bookmarks; visibility is applied here, before any search runs.
pub(crate) async fn load_categories(
    pool: &SqlitePool,
    order_by: &str,
    public_only: bool,
) -> Result<Vec<CategoryWithBookmarks>, sqlx::Error> {
    let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY {order_by}");
    let categories: Vec<Category> = sqlx::query_as(&sql).fetch_all(pool).await?;

    let bookmark_sql = if public_only {
        format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE category_id = ? AND is_public = 1 ORDER BY order_index ASC"
        )
    } else {
        format!(
            "SELECT {BOOKMARK_COLUMNS} FROM bookmarks WHERE category_id = ? ORDER BY order_index ASC"
        )
    };

    let mut result = Vec::with_capacity(categories.len());
    for category in categories {
        let bookmarks: Vec<Bookmark> = sqlx::query_as(&bookmark_sql)
            .bind(category.id)
            .fetch_all(pool)
            .await?;
        result.push(CategoryWithBookmarks {
            category,
            bookmarks,
        });
    }

    Ok(result)
}

pub async fn list_categories(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let public_only = current_user(&state, &cookies).await.is_none();
    let order_by = super::apps::configured_order(&state.db).await;

    let categories = load_categories(&state.db, order_by, public_only)
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Server error"})),
            )
        })?;

    Ok(Json(json!({
        "code": 200,
        "data": categories
    })))
}

pub async fn create_category(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<CreateCategoryRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    if req.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "Name is required"})),
        ));
    }

    let now = now_rfc3339();
    let next_order: i64 =
        sqlx::query_scalar("SELECT COALESCE(MAX(order_index), 0) + 1 FROM categories")
            .fetch_one(&state.db)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Server error"})),
                )
            })?;

    let result = sqlx::query(
        "INSERT INTO categories (name, is_pinned, order_index, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&req.name)
    .bind(req.is_pinned)
    .bind(next_order)
    .bind(&now)
    .bind(&now)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create category: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to create category"})),
        )
    })?;

    let created: Category = sqlx::query_as(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?"
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

pub async fn update_category(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCategoryRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    let existing: Option<Category> = sqlx::query_as(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?"
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
        Some(category) => category,
        None => {
            return Ok(Json(json!({
                "code": 404,
                "message": "Category not found"
            })))
        }
    };

    let now = now_rfc3339();
    sqlx::query(
        "UPDATE categories SET name = ?, is_pinned = ?, order_index = ?, updated_at = ? WHERE id = ?",
    )
    .bind(req.name.unwrap_or(existing.name))
    .bind(req.is_pinned.unwrap_or(existing.is_pinned))
    .bind(req.order_index.unwrap_or(existing.order_index))
    .bind(&now)
    .bind(id)
    .execute(&state.db)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update category {}: {:?}", id, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to update category"})),
        )
    })?;

    Ok(Json(json!({
        "code": 200,
        "message": "Category updated"
    })))
}

/// Deleting a category also deletes its bookmarks. Done explicitly rather
/// than relying on the cascade, which SQLite only honors with the
/// foreign_keys pragma enabled.
pub async fn delete_category(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    sqlx::query("DELETE FROM bookmarks WHERE category_id = ?")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(|_| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Server error"})),
            )
        })?;

    sqlx::query("DELETE FROM categories WHERE id = ?")
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
        "message": "Category deleted"
    })))
}

pub async fn pin_category(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Path(id): Path<i64>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    let result =
        sqlx::query("UPDATE categories SET is_pinned = 1 - is_pinned, updated_at = ? WHERE id = ?")
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
            "message": "Category not found"
        })));
    }

    Ok(Json(json!({
        "code": 200,
        "message": "Pin toggled"
    })))
}

pub async fn reorder_categories(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(req): Json<ReorderRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    require_user(&state, &cookies).await?;

    let now = now_rfc3339();
    for item in &req.items {
        sqlx::query("UPDATE categories SET order_index = ?, updated_at = ? WHERE id = ?")
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
