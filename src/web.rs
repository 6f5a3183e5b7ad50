//! HTTP surface: the feed endpoint, content pages, and the editor API.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::feed;
use crate::i18n::{
    FeedMetrics, Langcode, LanguageRegistry, TranslationDraft, TranslationValidator,
};
use crate::markup;
use crate::security::constant_time_compare;
use crate::store::{ContentItem, ContentStore, Translation};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<LanguageRegistry>,
    pub store: ContentStore,
}

/// Create the router with all endpoints (feed, content pages, editor API).
pub fn create_router(state: AppState) -> Router {
    let feed_path = state.config.feed_path.clone();

    Router::new()
        // Read-only feed path
        .route(&feed_path, get(serve_feed))
        // Content pages
        .route("/content/:id", get(content_page))
        // Editor API
        .route("/api/content", get(list_content).post(create_content))
        .route(
            "/api/content/:id",
            get(get_content).delete(delete_content),
        )
        .route(
            "/api/content/:id/translations/:langcode",
            put(upsert_translation).delete(delete_translation),
        )
        .route("/api/languages", get(list_languages))
        .route("/api/stats", get(stats))
        // Health
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==================== Feed ====================

async fn serve_feed(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let items = state.store.list_items()?;
    let xml = feed::render_feed(&items, &state.registry, &state.config);

    Ok((
        [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        xml,
    ))
}

// ==================== Content pages ====================

#[derive(Debug, Deserialize)]
struct ContentPageQuery {
    language: Option<String>,
}

async fn content_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ContentPageQuery>,
) -> Result<Html<String>> {
    let item = state.store.get_item(id)?;

    let langcode = match query.language.as_deref() {
        Some(code) => {
            let code = Langcode::new(code)?;
            if !state.registry.is_enabled(code.as_str()) {
                return Err(Error::NotFound(format!("Language {}", code)));
            }
            code
        }
        None => item.canonical_langcode.clone(),
    };

    let translation = item.translation(langcode.as_str()).ok_or_else(|| {
        Error::NotFound(format!("Translation {} of content item {}", langcode, id))
    })?;

    Ok(Html(render_content_page(&item, translation, &state)))
}

/// Minimal hand-built page that serves as the permalink target.
fn render_content_page(item: &ContentItem, translation: &Translation, state: &AppState) -> String {
    let language_name = state
        .registry
        .get(translation.langcode.as_str())
        .map(|lang| lang.native_name.clone())
        .unwrap_or_else(|| translation.langcode.to_string());

    let other_links: Vec<String> = item
        .translations
        .iter()
        .filter(|other| other.langcode != translation.langcode)
        .map(|other| {
            let href = feed::item_link(
                &state.config.base_url,
                item.id,
                &other.langcode,
                other.langcode == item.canonical_langcode,
            );
            format!(
                "<a href=\"{}\">{}</a>",
                markup::escape_html(&href),
                markup::escape_html(other.langcode.as_str())
            )
        })
        .collect();

    let nav = if other_links.is_empty() {
        String::new()
    } else {
        format!("<nav>Also available in: {}</nav>\n", other_links.join(" "))
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n<p><em>{language_name}</em></p>\n{body}\n{nav}</body>\n</html>\n",
        lang = markup::escape_html(translation.langcode.as_str()),
        title = markup::escape_html(&translation.title),
        language_name = markup::escape_html(&language_name),
        body = markup::render_plain_text(&translation.body),
        nav = nav,
    )
}

// ==================== Editor API ====================

#[derive(Debug, Deserialize)]
struct CreateContentRequest {
    langcode: Option<String>,
    title: String,
    body: String,
}

#[derive(Debug, Deserialize)]
struct TranslationRequest {
    title: String,
    body: String,
}

async fn list_content(State(state): State<AppState>) -> Result<Json<Vec<ContentItem>>> {
    Ok(Json(state.store.list_items()?))
}

async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ContentItem>> {
    Ok(Json(state.store.get_item(id)?))
}

async fn create_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateContentRequest>,
) -> Result<impl IntoResponse> {
    require_api_key(&state.config, &headers)?;

    let langcode = match request.langcode.as_deref() {
        Some(code) => Langcode::new(code)?,
        None => state.registry.canonical().code.clone(),
    };
    require_enabled(&state.registry, &langcode)?;

    let draft = TranslationDraft {
        title: &request.title,
        body: &request.body,
    };
    check_translation(&draft, None)?;

    let item = state.store.create_item(&langcode, &request.title, &request.body)?;
    Ok((StatusCode::CREATED, Json(item)))
}

async fn upsert_translation(
    State(state): State<AppState>,
    Path((id, langcode)): Path<(i64, String)>,
    headers: HeaderMap,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<Translation>> {
    require_api_key(&state.config, &headers)?;

    let langcode = Langcode::new(&langcode)?;
    require_enabled(&state.registry, &langcode)?;

    let item = state.store.get_item(id)?;
    let canonical = item.canonical_translation().map(|tr| TranslationDraft {
        title: &tr.title,
        body: &tr.body,
    });

    let draft = TranslationDraft {
        title: &request.title,
        body: &request.body,
    };
    // Don't compare the canonical translation against itself
    let against = if langcode == item.canonical_langcode {
        None
    } else {
        canonical.as_ref()
    };
    check_translation(&draft, against)?;

    let translation =
        state
            .store
            .upsert_translation(id, &langcode, &request.title, &request.body)?;
    Ok(Json(translation))
}

async fn delete_translation(
    State(state): State<AppState>,
    Path((id, langcode)): Path<(i64, String)>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    require_api_key(&state.config, &headers)?;

    let langcode = Langcode::new(&langcode)?;
    state.store.delete_translation(id, &langcode)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_content(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode> {
    require_api_key(&state.config, &headers)?;

    state.store.delete_item(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_languages(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "languages": state.registry.list_enabled() }))
}

async fn stats(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    Ok(Json(json!({
        "items": state.store.item_count()?,
        "translations": state.store.translation_count()?,
        "metrics": FeedMetrics::global().report(),
    })))
}

async fn healthz() -> &'static str {
    "ok"
}

// ==================== Helpers ====================

fn require_api_key(config: &Config, headers: &HeaderMap) -> Result<()> {
    let Some(expected) = config.api_key.as_deref() else {
        // No key configured: editor API is open (development mode)
        return Ok(());
    };

    let provided = headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if constant_time_compare(provided, expected) {
        Ok(())
    } else {
        Err(Error::Unauthorized)
    }
}

fn require_enabled(registry: &LanguageRegistry, langcode: &Langcode) -> Result<()> {
    if registry.is_enabled(langcode.as_str()) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "Language {} is not enabled",
            langcode
        )))
    }
}

fn check_translation(
    draft: &TranslationDraft<'_>,
    canonical: Option<&TranslationDraft<'_>>,
) -> Result<()> {
    let report = TranslationValidator::validate(draft, canonical);

    for warning in &report.warnings {
        warn!("Translation warning: {}", warning);
    }
    if report.has_errors() {
        FeedMetrics::global().record_validation_rejection();
        return Err(Error::UnprocessableTranslation(report.errors.join("; ")));
    }
    Ok(())
}
