use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use polyfeed::{config::Config, i18n::LanguageRegistry, store::ContentStore, web};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("polyfeed=info".parse()?),
        )
        .init();

    info!("Starting polyfeed");

    // Load configuration from environment
    let config = Config::from_env()?;

    let registry =
        LanguageRegistry::from_codes(&config.canonical_language, &config.extra_languages)?;
    info!(
        "Configured languages: {} (canonical: {})",
        registry
            .list_enabled()
            .iter()
            .map(|lang| lang.code.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        registry.canonical().code
    );

    if let Some(parent) = std::path::Path::new(&config.database_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = ContentStore::new(&config.database_path)?;
    info!("Content store ready at {}", config.database_path);

    let addr = format!("0.0.0.0:{}", config.port);
    let state = web::AppState {
        config: Arc::new(config),
        registry: Arc::new(registry),
        store,
    };
    let app = web::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        "Serving feed at {}{}",
        state.config.base_url, state.config.feed_path
    );
    axum::serve(listener, app).await?;

    Ok(())
}
