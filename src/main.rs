use axum::{
    routing::{get, post},
    Router,
};
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod auth;
mod db;
mod state;

use ember_backend::config;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ember_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let app_config = config::load_config()?;
    tracing::info!(
        "Server will listen on {}:{}",
        app_config.server.host,
        app_config.server.port
    );

    // Create data directory if it does not exist
    let data_dir = app_config.get_data_dir();
    if !data_dir.exists() {
        std::fs::create_dir_all(&data_dir)?;
        tracing::info!("Created data directory: {:?}", data_dir);
    }

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| app_config.get_database_url());

    let pool = SqlitePool::connect(&database_url).await?;

    db::run_migrations(&pool).await?;

    let state = Arc::new(AppState {
        db: pool,
        login_security: state::LoginSecurity::new(),
    });

    let app = Router::new()
        .route("/api/health", get(api::server::health_check))
        .route("/api/auth/login", post(api::auth::login))
        .route("/api/auth/logout", post(api::auth::logout))
        .route("/api/auth/me", get(api::auth::me))
        .route("/api/apps", get(api::apps::list_apps))
        .route("/api/apps", post(api::apps::create_app))
        .route("/api/apps/reorder", post(api::apps::reorder_apps))
        .route("/api/apps/:id", post(api::apps::update_app))
        .route("/api/apps/:id/delete", post(api::apps::delete_app))
        .route("/api/apps/:id/pin", post(api::apps::pin_app))
        .route("/api/categories", get(api::categories::list_categories))
        .route("/api/categories", post(api::categories::create_category))
        .route(
            "/api/categories/reorder",
            post(api::categories::reorder_categories),
        )
        .route("/api/categories/:id", post(api::categories::update_category))
        .route(
            "/api/categories/:id/delete",
            post(api::categories::delete_category),
        )
        .route("/api/categories/:id/pin", post(api::categories::pin_category))
        .route("/api/bookmarks", get(api::bookmarks::list_bookmarks))
        .route("/api/bookmarks", post(api::bookmarks::create_bookmark))
        .route(
            "/api/bookmarks/reorder",
            post(api::bookmarks::reorder_bookmarks),
        )
        .route("/api/bookmarks/:id", post(api::bookmarks::update_bookmark))
        .route(
            "/api/bookmarks/:id/delete",
            post(api::bookmarks::delete_bookmark),
        )
        .route("/api/settings/public", get(api::settings::get_public_settings))
        .route("/api/settings", post(api::settings::update_settings))
        .route("/api/search", post(api::search::search))
        // Frontend static files with SPA index fallback
        .fallback_service(ServeDir::new("web").not_found_service(ServeFile::new("web/index.html")))
        .layer(TraceLayer::new_for_http())
        .layer(CookieManagerLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}
