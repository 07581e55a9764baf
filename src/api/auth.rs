use axum::{
    extract::{ConnectInfo, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_cookies::{Cookie, Cookies};

use ember_backend::models::{LoginRequest, User, UserInfo};

use crate::auth::{create_session, current_user, delete_session, SESSION_COOKIE_NAME};
use crate::state::AppState;

fn session_cookie(token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE_NAME, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    cookies: Cookies,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let ip = addr.ip().to_string();

    if state.login_security.is_ip_blocked(&ip) {
        return Err((
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "Too many failed logins, try again in 30 minutes",
                "blocked": true
            })),
        ));
    }

    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, password_hash, is_admin, enabled, created_at, updated_at
         FROM users WHERE username = ? AND enabled = 1",
    )
    .bind(&req.username)
    .fetch_optional(&state.db)
    .await
    .map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Server error"})),
        )
    })?
    .ok_or_else(|| {
        state.login_security.record_failure(&ip);
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid username or password"})),
        )
    })?;

    let valid = bcrypt::verify(&req.password, &user.password_hash).map_err(|_| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Server error"})),
        )
    })?;

    if !valid {
        state.login_security.record_failure(&ip);
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid username or password"})),
        ));
    }

    state.login_security.clear_failure(&ip);

    let token = create_session(&state.db, &user.id).await.map_err(|e| {
        tracing::error!("Failed to create session: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to create session"})),
        )
    })?;

    cookies.add(session_cookie(token));

    tracing::info!("User {} logged in from {}", user.username, ip);

    Ok(Json(json!({
        "code": 200,
        "data": UserInfo {
            id: user.id,
            username: user.username,
            is_admin: user.is_admin,
        }
    })))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE_NAME) {
        let token = cookie.value().to_string();
        if let Err(e) = delete_session(&state.db, &token).await {
            tracing::warn!("Failed to delete session: {:?}", e);
        }
    }

    cookies.remove(session_cookie(String::new()));

    Ok(Json(json!({
        "code": 200,
        "message": "Logged out"
    })))
}

pub async fn me(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match current_user(&state, &cookies).await {
        Some(user) => Ok(Json(json!({
            "code": 200,
            "data": UserInfo {
                id: user.id,
                username: user.username,
                is_admin: user.is_admin,
            }
        }))),
        None => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Not logged in"})),
        )),
    }
}
