use axum::http::StatusCode;
use axum::Json;
use rand::Rng;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower_cookies::Cookies;

use ember_backend::models::User;
use ember_backend::utils::now_rfc3339;

use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "ember_session";

/// Sessions live for 7 days
const SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create a session for a user and return its token
pub async fn create_session(pool: &SqlitePool, user_id: &str) -> Result<String, sqlx::Error> {
    let token: String = rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();

    let now = chrono::Utc::now();
    let expires_at = (now + chrono::Duration::seconds(SESSION_TTL_SECONDS)).to_rfc3339();

    sqlx::query("INSERT INTO sessions (id, user_id, expires_at, created_at) VALUES (?, ?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(&expires_at)
        .bind(now.to_rfc3339())
        .execute(pool)
        .await?;

    Ok(token)
}

/// Delete a session (logout)
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

/// Resolve the session cookie to an enabled user, if any
pub async fn current_user(state: &AppState, cookies: &Cookies) -> Option<User> {
    let token = cookies.get(SESSION_COOKIE_NAME)?.value().to_string();

    sqlx::query_as::<_, User>(
        "SELECT u.id, u.username, u.password_hash, u.is_admin, u.enabled, u.created_at, u.updated_at
         FROM users u
         JOIN sessions s ON u.id = s.user_id
         WHERE s.id = ? AND s.expires_at > ? AND u.enabled = 1",
    )
    .bind(&token)
    .bind(now_rfc3339())
    .fetch_optional(&state.db)
    .await
    .ok()
    .flatten()
}

/// Require an authenticated user
pub async fn require_user(
    state: &AppState,
    cookies: &Cookies,
) -> Result<User, (StatusCode, Json<Value>)> {
    current_user(state, cookies).await.ok_or((
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Not logged in"})),
    ))
}

/// Require an authenticated admin user
pub async fn require_admin(
    state: &AppState,
    cookies: &Cookies,
) -> Result<User, (StatusCode, Json<Value>)> {
    let user = require_user(state, cookies).await?;
    if !user.is_admin {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({"error": "Admin privileges required"})),
        ));
    }
    Ok(user)
}
