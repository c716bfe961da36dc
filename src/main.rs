use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use innkeeper::config::AppConfig;
use innkeeper::db;
use innkeeper::db::queries;
use innkeeper::handlers;
use innkeeper::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;
    let expired = queries::expire_old_sessions(&conn)?;
    if expired > 0 {
        tracing::info!(expired, "purged expired sessions");
    }
    tracing::info!("bookings will be saved to {}", config.database_url);

    let state = Arc::new(AppState::new(conn, config.clone()));

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
