//! End-to-end tests for the localized feed service.
//!
//! Each test spawns the real router on an ephemeral port with a
//! tempfile-backed store, drives it over HTTP, and parses feed responses
//! back with the rss crate.

use rss::Channel;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tempfile::TempDir;

use polyfeed::{
    config::Config,
    i18n::LanguageRegistry,
    store::ContentStore,
    web::{self, AppState},
};

// ==================== Test Helpers ====================

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    _temp_dir: TempDir,
}

/// Spawn the service on an ephemeral port.
async fn spawn_app(api_key: Option<&str>) -> TestApp {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind ephemeral port");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let base_url = format!("http://{}", addr);

    let config = Config {
        database_path: db_path.to_str().unwrap().to_string(),
        port: addr.port(),
        base_url: base_url.clone(),
        feed_path: "/feed.xml".to_string(),
        feed_title: "polyfeed test".to_string(),
        feed_description: "test feed".to_string(),
        canonical_language: "en".to_string(),
        extra_languages: vec!["es".to_string(), "pt-br".to_string()],
        api_key: api_key.map(str::to_string),
    };

    let registry =
        LanguageRegistry::from_codes(&config.canonical_language, &config.extra_languages)
            .expect("Failed to build registry");
    let store = ContentStore::new(&config.database_path).expect("Failed to open store");

    let state = AppState {
        config: Arc::new(config),
        registry: Arc::new(registry),
        store,
    };
    let app = web::create_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        base_url,
        client: reqwest::Client::new(),
        _temp_dir: temp_dir,
    }
}

impl TestApp {
    /// Create a content item through the editor API, returning its id.
    async fn create_item(&self, langcode: Option<&str>, title: &str, body: &str) -> i64 {
        let mut payload = json!({ "title": title, "body": body });
        if let Some(code) = langcode {
            payload["langcode"] = json!(code);
        }

        let response = self
            .client
            .post(format!("{}/api/content", self.base_url))
            .json(&payload)
            .send()
            .await
            .expect("POST /api/content failed");
        assert_eq!(response.status(), 201);

        let item: serde_json::Value = response.json().await.expect("item JSON");
        item["id"].as_i64().expect("item id")
    }

    /// Add or update a translation through the editor API.
    async fn put_translation(&self, id: i64, langcode: &str, title: &str, body: &str) {
        let response = self
            .client
            .put(format!(
                "{}/api/content/{}/translations/{}",
                self.base_url, id, langcode
            ))
            .json(&json!({ "title": title, "body": body }))
            .send()
            .await
            .expect("PUT translation failed");
        assert_eq!(response.status(), 200);
    }

    /// Fetch and parse the feed.
    async fn fetch_feed(&self) -> Channel {
        let response = self
            .client
            .get(format!("{}/feed.xml", self.base_url))
            .send()
            .await
            .expect("GET /feed.xml failed");
        assert_eq!(response.status(), 200);

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(
            content_type.starts_with("application/rss+xml"),
            "unexpected content type: {}",
            content_type
        );

        let body = response.bytes().await.expect("feed body");
        Channel::read_from(&body[..]).expect("valid RSS XML")
    }
}

// ==================== Feed Translation Tests ====================

#[tokio::test]
async fn test_feed_contains_one_item_per_translation() {
    let app = spawn_app(None).await;

    // A node titled "en" plus Spanish and Brazilian Portuguese translations;
    // each translation's title is its langcode so items can be matched
    // without relying on feed order.
    let id = app.create_item(None, "en", "Something in English.").await;
    app.put_translation(id, "es", "es", "Algo en Español").await;
    app.put_translation(id, "pt-br", "pt-br", "Algo em Português")
        .await;

    let channel = app.fetch_feed().await;
    assert_eq!(channel.items().len(), 3);

    let mut expected: HashMap<&str, (String, String)> = HashMap::new();
    expected.insert(
        "en",
        (
            "<p>Something in English.</p>".to_string(),
            format!("{}/content/{}", app.base_url, id),
        ),
    );
    expected.insert(
        "es",
        (
            "<p>Algo en Español</p>".to_string(),
            format!("{}/content/{}?language=es", app.base_url, id),
        ),
    );
    expected.insert(
        "pt-br",
        (
            "<p>Algo em Português</p>".to_string(),
            format!("{}/content/{}?language=pt-br", app.base_url, id),
        ),
    );

    let mut seen: HashSet<String> = HashSet::new();
    for item in channel.items() {
        let langcode = item.title().expect("item title");
        let (description, link) = expected
            .get(langcode)
            .unwrap_or_else(|| panic!("unexpected feed item title: {}", langcode));

        assert_eq!(item.description(), Some(description.as_str()));
        assert_eq!(item.link(), Some(link.as_str()));
        seen.insert(langcode.to_string());
    }
    assert_eq!(seen.len(), 3, "every translation appears exactly once");
}

#[tokio::test]
async fn test_empty_store_yields_valid_empty_feed() {
    let app = spawn_app(None).await;

    let channel = app.fetch_feed().await;
    assert!(channel.items().is_empty());
    assert_eq!(channel.title(), "polyfeed test");
}

#[tokio::test]
async fn test_item_in_non_default_canonical_language() {
    let app = spawn_app(None).await;

    // Spanish is this item's canonical language, so its link carries no
    // language parameter even though "es" is not the service default.
    let id = app.create_item(Some("es"), "es", "Algo en Español").await;

    let channel = app.fetch_feed().await;
    assert_eq!(channel.items().len(), 1);

    let item = &channel.items()[0];
    assert_eq!(item.link(), Some(format!("{}/content/{}", app.base_url, id).as_str()));
}

#[tokio::test]
async fn test_deleting_translation_shrinks_feed() {
    let app = spawn_app(None).await;

    let id = app.create_item(None, "en", "Something in English.").await;
    app.put_translation(id, "es", "es", "Algo en Español").await;
    assert_eq!(app.fetch_feed().await.items().len(), 2);

    let response = app
        .client
        .delete(format!(
            "{}/api/content/{}/translations/es",
            app.base_url, id
        ))
        .send()
        .await
        .expect("DELETE translation failed");
    assert_eq!(response.status(), 204);

    assert_eq!(app.fetch_feed().await.items().len(), 1);
}

#[tokio::test]
async fn test_updating_translation_updates_feed() {
    let app = spawn_app(None).await;

    let id = app.create_item(None, "en", "Something in English.").await;
    app.put_translation(id, "es", "es", "Primera versión").await;
    app.put_translation(id, "es", "es", "Segunda versión").await;

    let channel = app.fetch_feed().await;
    assert_eq!(channel.items().len(), 2, "update must not add an entry");

    let spanish = channel
        .items()
        .iter()
        .find(|item| item.title() == Some("es"))
        .expect("Spanish entry");
    assert_eq!(spanish.description(), Some("<p>Segunda versión</p>"));
}

// ==================== Content Page Tests ====================

#[tokio::test]
async fn test_content_page_selects_translation_by_language() {
    let app = spawn_app(None).await;

    let id = app.create_item(None, "en", "Something in English.").await;
    app.put_translation(id, "es", "Título español", "Algo en Español")
        .await;

    // Canonical page, no language parameter
    let response = app
        .client
        .get(format!("{}/content/{}", app.base_url, id))
        .send()
        .await
        .expect("GET content page failed");
    assert_eq!(response.status(), 200);
    let page = response.text().await.expect("page body");
    assert!(page.contains("<p>Something in English.</p>"));

    // Spanish page via language parameter
    let response = app
        .client
        .get(format!("{}/content/{}?language=es", app.base_url, id))
        .send()
        .await
        .expect("GET content page failed");
    assert_eq!(response.status(), 200);
    let page = response.text().await.expect("page body");
    assert!(page.contains("Título español"));
    assert!(page.contains("<p>Algo en Español</p>"));
}

#[tokio::test]
async fn test_content_page_not_found_paths() {
    let app = spawn_app(None).await;
    let id = app.create_item(None, "en", "Something in English.").await;

    // Unknown item
    let response = app
        .client
        .get(format!("{}/content/9999", app.base_url))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 404);

    // Language not enabled in the registry
    let response = app
        .client
        .get(format!("{}/content/{}?language=fr", app.base_url, id))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 404);

    // Enabled language without a translation
    let response = app
        .client
        .get(format!("{}/content/{}?language=es", app.base_url, id))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 404);
}

// ==================== Editor API Tests ====================

#[tokio::test]
async fn test_api_errors_use_json_bodies() {
    let app = spawn_app(None).await;

    let response = app
        .client
        .get(format!("{}/api/content/42", app.base_url))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 404);

    let body: serde_json::Value = response.json().await.expect("error JSON");
    assert!(body["error"].as_str().unwrap().contains("42"));
}

#[tokio::test]
async fn test_create_rejects_disabled_language() {
    let app = spawn_app(None).await;

    let response = app
        .client
        .post(format!("{}/api/content", app.base_url))
        .json(&json!({ "langcode": "fr", "title": "fr", "body": "Quelque chose" }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_translation_validation_rejects_empty_body() {
    let app = spawn_app(None).await;
    let id = app.create_item(None, "en", "Something in English.").await;

    let response = app
        .client
        .put(format!(
            "{}/api/content/{}/translations/es",
            app.base_url, id
        ))
        .json(&json!({ "title": "es", "body": "   " }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 422);
}

#[tokio::test]
async fn test_canonical_translation_cannot_be_deleted() {
    let app = spawn_app(None).await;
    let id = app.create_item(None, "en", "Something in English.").await;

    let response = app
        .client
        .delete(format!(
            "{}/api/content/{}/translations/en",
            app.base_url, id
        ))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 409);

    // The item still renders
    assert_eq!(app.fetch_feed().await.items().len(), 1);
}

#[tokio::test]
async fn test_deleting_item_removes_all_entries() {
    let app = spawn_app(None).await;

    let id = app.create_item(None, "en", "Something in English.").await;
    app.put_translation(id, "es", "es", "Algo en Español").await;
    app.put_translation(id, "pt-br", "pt-br", "Algo em Português")
        .await;

    let response = app
        .client
        .delete(format!("{}/api/content/{}", app.base_url, id))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 204);

    assert!(app.fetch_feed().await.items().is_empty());
}

#[tokio::test]
async fn test_list_languages() {
    let app = spawn_app(None).await;

    let response = app
        .client
        .get(format!("{}/api/languages", app.base_url))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("languages JSON");
    let codes: Vec<&str> = body["languages"]
        .as_array()
        .expect("languages array")
        .iter()
        .map(|lang| lang["code"].as_str().expect("code"))
        .collect();
    assert_eq!(codes, vec!["en", "es", "pt-br"]);
}

#[tokio::test]
async fn test_stats_reports_counts() {
    let app = spawn_app(None).await;

    let id = app.create_item(None, "en", "Something in English.").await;
    app.put_translation(id, "es", "es", "Algo en Español").await;

    let response = app
        .client
        .get(format!("{}/api/stats", app.base_url))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("stats JSON");
    assert_eq!(body["items"], 1);
    assert_eq!(body["translations"], 2);
    assert!(body["metrics"]["renders"].is_u64());
}

// ==================== Authentication Tests ====================

#[tokio::test]
async fn test_mutations_require_api_key_when_configured() {
    let app = spawn_app(Some("feed-secret")).await;

    // No key
    let response = app
        .client
        .post(format!("{}/api/content", app.base_url))
        .json(&json!({ "title": "en", "body": "Something in English." }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 401);

    // Wrong key
    let response = app
        .client
        .post(format!("{}/api/content", app.base_url))
        .header("x-api-key", "wrong")
        .json(&json!({ "title": "en", "body": "Something in English." }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 401);

    // Correct key
    let response = app
        .client
        .post(format!("{}/api/content", app.base_url))
        .header("x-api-key", "feed-secret")
        .json(&json!({ "title": "en", "body": "Something in English." }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn test_feed_stays_public_with_api_key_configured() {
    let app = spawn_app(Some("feed-secret")).await;

    let channel = app.fetch_feed().await;
    assert!(channel.items().is_empty());

    let response = app
        .client
        .get(format!("{}/healthz", app.base_url))
        .send()
        .await
        .expect("request failed");
    assert_eq!(response.status(), 200);
}
