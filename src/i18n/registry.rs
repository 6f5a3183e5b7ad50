//! Language registry: single source of truth for configured languages.
//!
//! The registry holds every language the service knows about, resolves a
//! langcode to its display metadata, and decides which language is
//! canonical. It is built once at startup from configuration and shared
//! behind an `Arc`; nothing mutates it afterwards.

use crate::error::{Error, Result};
use crate::i18n::Langcode;
use serde::Serialize;

/// Configuration for a configured language.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageConfig {
    /// Language code (e.g., "en", "es", "pt-br")
    pub code: Langcode,

    /// English name of the language (e.g., "Spanish")
    pub name: String,

    /// Native name of the language (e.g., "Español")
    pub native_name: String,

    /// Whether this is the canonical/source language (exactly one is)
    pub is_canonical: bool,

    /// Whether this language is enabled for use
    pub enabled: bool,
}

/// Registry of all configured languages.
///
/// Construction enforces the registry invariants: at least one language,
/// unique codes, exactly one canonical language, and the canonical
/// language enabled. Every accessor after that point is infallible.
#[derive(Debug)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

impl LanguageRegistry {
    /// Build a registry from explicit language configurations.
    pub fn new(languages: Vec<LanguageConfig>) -> Result<Self> {
        if languages.is_empty() {
            return Err(Error::Config(
                "Language registry needs at least one language".to_string(),
            ));
        }

        for (i, lang) in languages.iter().enumerate() {
            if languages[..i].iter().any(|other| other.code == lang.code) {
                return Err(Error::Config(format!(
                    "Duplicate language code in registry: {}",
                    lang.code
                )));
            }
        }

        let canonical_count = languages.iter().filter(|lang| lang.is_canonical).count();
        match canonical_count {
            0 => {
                return Err(Error::Config(
                    "No canonical language in registry".to_string(),
                ))
            }
            1 => {}
            n => {
                return Err(Error::Config(format!(
                    "Registry has {} canonical languages, expected exactly one",
                    n
                )))
            }
        }

        let canonical_enabled = languages
            .iter()
            .any(|lang| lang.is_canonical && lang.enabled);
        if !canonical_enabled {
            return Err(Error::Config(
                "The canonical language must be enabled".to_string(),
            ));
        }

        Ok(Self { languages })
    }

    /// Build a registry from a canonical code plus additional enabled codes.
    ///
    /// Display names come from a built-in table of common languages;
    /// unrecognized codes fall back to the code itself as the name.
    pub fn from_codes(canonical: &str, extra: &[String]) -> Result<Self> {
        let canonical = Langcode::new(canonical)?;

        let mut languages = vec![make_config(canonical.clone(), true)];
        for code in extra {
            let code = Langcode::new(code)?;
            if code == canonical {
                continue;
            }
            languages.push(make_config(code, false));
        }

        Self::new(languages)
    }

    /// Registry with the default language set (en canonical, es, pt-br).
    pub fn with_defaults() -> Self {
        Self::from_codes("en", &["es".to_string(), "pt-br".to_string()])
            .expect("default language set is valid")
    }

    /// Look up a language by its code.
    pub fn get(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code.as_str() == code)
    }

    /// The canonical language configuration.
    pub fn canonical(&self) -> &LanguageConfig {
        self.languages
            .iter()
            .find(|lang| lang.is_canonical)
            .expect("registry construction guarantees one canonical language")
    }

    /// All enabled languages.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// All configured languages (including disabled ones).
    pub fn list_all(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Whether a language code is configured and enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get(code).map(|lang| lang.enabled).unwrap_or(false)
    }
}

fn make_config(code: Langcode, is_canonical: bool) -> LanguageConfig {
    let (name, native_name) = match known_language(code.as_str()) {
        Some((name, native)) => (name.to_string(), native.to_string()),
        None => (code.as_str().to_string(), code.as_str().to_string()),
    };
    LanguageConfig {
        code,
        name,
        native_name,
        is_canonical,
        enabled: true,
    }
}

/// Display names for common language codes.
fn known_language(code: &str) -> Option<(&'static str, &'static str)> {
    let entry = match code {
        "en" => ("English", "English"),
        "es" => ("Spanish", "Español"),
        "pt" => ("Portuguese", "Português"),
        "pt-br" => ("Portuguese, Brazil", "Português, Brasil"),
        "fr" => ("French", "Français"),
        "de" => ("German", "Deutsch"),
        "it" => ("Italian", "Italiano"),
        "nl" => ("Dutch", "Nederlands"),
        "ja" => ("Japanese", "日本語"),
        "zh-hans" => ("Chinese, Simplified", "简体中文"),
        _ => return None,
    };
    Some(entry)
}
