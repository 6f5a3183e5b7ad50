//! Feed renderer: content items in, RSS 2.0 channel out.
//!
//! This is a pure mapping. Every `(ContentItem, Translation)` pair becomes
//! exactly one feed entry, the canonical translation included, so an item
//! with N translations contributes N entries and an item with none
//! contributes none. Entries are transient render-pass values; nothing
//! here is persisted.

use crate::config::Config;
use crate::i18n::{FeedMetrics, Langcode, LanguageRegistry};
use crate::markup;
use crate::store::{ContentItem, Translation};
use chrono::DateTime;
use rss::{Channel, ChannelBuilder, GuidBuilder, ItemBuilder};
use tracing::warn;

/// One feed entry, derived from a single translation at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub description: String,
    pub link: String,
    pub guid: String,
    pub guid_is_permalink: bool,
    pub langcode: Langcode,
    pub pub_date: Option<String>,
}

/// Absolute URL for a content item in a given language.
///
/// The canonical language gets the bare item URL; every other language
/// carries an explicit `language` query parameter.
pub fn item_link(base_url: &str, item_id: i64, langcode: &Langcode, is_canonical: bool) -> String {
    if is_canonical {
        format!("{}/content/{}", base_url, item_id)
    } else {
        format!("{}/content/{}?language={}", base_url, item_id, langcode)
    }
}

/// Derive the feed entry for one translation of one item.
pub fn entry_for(
    item: &ContentItem,
    translation: &Translation,
    registry: &LanguageRegistry,
    base_url: &str,
) -> FeedEntry {
    let is_canonical = translation.langcode == item.canonical_langcode;

    // The registry only supplies URL rules and display metadata here; a
    // translation outlives registry reconfiguration, so it still renders.
    if !registry.is_enabled(translation.langcode.as_str()) {
        warn!(
            "Translation {} of item {} has a langcode not enabled in the registry",
            translation.langcode, item.id
        );
        FeedMetrics::global().record_unregistered_langcode();
    }

    let guid = if is_canonical {
        format!("{}/content/{}", base_url, item.id)
    } else {
        format!("{}/content/{}#{}", base_url, item.id, translation.langcode)
    };

    FeedEntry {
        title: translation.title.clone(),
        description: markup::render_plain_text(&translation.body),
        link: item_link(base_url, item.id, &translation.langcode, is_canonical),
        guid,
        guid_is_permalink: is_canonical,
        langcode: translation.langcode.clone(),
        pub_date: DateTime::parse_from_rfc3339(&translation.updated_at)
            .ok()
            .map(|dt| dt.to_rfc2822()),
    }
}

/// Emit one feed entry per `(item, translation)` pair.
///
/// Entry order follows the input and is not part of the contract.
pub fn collect_entries(
    items: &[ContentItem],
    registry: &LanguageRegistry,
    base_url: &str,
) -> Vec<FeedEntry> {
    items
        .iter()
        .flat_map(|item| {
            item.translations
                .iter()
                .map(|translation| entry_for(item, translation, registry, base_url))
        })
        .collect()
}

/// Build an RSS 2.0 channel from feed entries.
pub fn render_channel(
    title: &str,
    link: &str,
    description: &str,
    entries: &[FeedEntry],
) -> Channel {
    let items: Vec<rss::Item> = entries
        .iter()
        .map(|entry| {
            ItemBuilder::default()
                .title(Some(entry.title.clone()))
                .link(Some(entry.link.clone()))
                .description(Some(entry.description.clone()))
                .guid(Some(
                    GuidBuilder::default()
                        .value(entry.guid.clone())
                        .permalink(entry.guid_is_permalink)
                        .build(),
                ))
                .pub_date(entry.pub_date.clone())
                .build()
        })
        .collect();

    ChannelBuilder::default()
        .title(title.to_string())
        .link(link.to_string())
        .description(description.to_string())
        .items(items)
        .build()
}

/// Render the whole feed to an XML document string.
pub fn render_feed(items: &[ContentItem], registry: &LanguageRegistry, config: &Config) -> String {
    let entries = collect_entries(items, registry, &config.base_url);
    FeedMetrics::global().record_render(entries.len());

    let channel = render_channel(
        &config.feed_title,
        &config.base_url,
        &config.feed_description,
        &entries,
    );
    channel.to_string()
}
