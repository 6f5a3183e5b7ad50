use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub database_path: String,

    // Server
    pub port: u16,
    pub base_url: String,

    // Feed
    pub feed_path: String,
    pub feed_title: String,
    pub feed_description: String,

    // Languages
    pub canonical_language: String,
    pub extra_languages: Vec<String>,

    // Editor API
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/polyfeed.db".to_string()),

            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            base_url,

            feed_path: normalize_feed_path(
                &std::env::var("FEED_PATH").unwrap_or_else(|_| "/feed.xml".to_string()),
            )
            .context("Invalid FEED_PATH")?,
            feed_title: std::env::var("FEED_TITLE").unwrap_or_else(|_| "polyfeed".to_string()),
            feed_description: std::env::var("FEED_DESCRIPTION")
                .unwrap_or_else(|_| "All content translations, one feed".to_string()),

            canonical_language: std::env::var("CANONICAL_LANGUAGE")
                .unwrap_or_else(|_| "en".to_string()),
            extra_languages: std::env::var("EXTRA_LANGUAGES")
                .unwrap_or_else(|_| "es,pt-br".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),

            api_key: std::env::var("API_KEY").ok().filter(|k| !k.is_empty()),
        })
    }
}

/// Feed paths are matched verbatim by the router, so they must start with '/'.
fn normalize_feed_path(path: &str) -> Result<String> {
    let trimmed = path.trim();
    if trimmed.is_empty() || trimmed == "/" {
        anyhow::bail!("FEED_PATH must name a path, got {:?}", path);
    }
    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{}", trimmed))
    }
}
