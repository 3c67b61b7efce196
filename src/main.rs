use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use classdesk::config::AppConfig;
use classdesk::state::AppState;
use classdesk::storage::FilesystemBlobStore;
use classdesk::{database, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    seed::ensure_indexes(&db).await?;
    seed::seed_teacher(&db, &config.auth).await?;
    seed::purge_expired_sessions(&db).await?;

    let blob_store = FilesystemBlobStore::new(
        config.storage.upload_dir.clone(),
        config.storage.max_upload_size,
    )
    .await
    .context("Failed to initialize upload storage")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let cors = cors_layer(&config)?;

    let state = AppState {
        db,
        blob_store: Arc::new(blob_store),
        config,
    };

    let mut app = classdesk::build_router(state);
    if let Some(cors) = cors {
        app = app.layer(cors);
    }

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build a CORS layer from config. Credentials are allowed (the session
/// travels in a cookie), so origins must be listed explicitly; an empty list
/// means no CORS layer at all.
fn cors_layer(config: &AppConfig) -> anyhow::Result<Option<CorsLayer>> {
    let origins = &config.server.cors.allow_origins;
    if origins.is_empty() {
        return Ok(None);
    }

    let origins = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {o}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([axum::http::header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(config.server.cors.max_age)),
    ))
}
