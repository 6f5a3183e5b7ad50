//! Editorial validation for incoming translations.
//!
//! Runs when an editor creates or updates a translation. Errors reject the
//! write; warnings are logged and the write goes through.

use regex::Regex;
use std::sync::OnceLock;

/// Upper bound for a translation body, in bytes.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

/// Upper bound for a translation title, in bytes.
pub const MAX_TITLE_BYTES: usize = 1024;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that reject the translation
    pub errors: Vec<String>,

    /// Suspicious but acceptable findings
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// A candidate translation as submitted by an editor.
#[derive(Debug, Clone, Copy)]
pub struct TranslationDraft<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

/// Validator for translation submissions.
pub struct TranslationValidator;

static MARKUP_REGEX: OnceLock<Regex> = OnceLock::new();

fn markup_regex() -> &'static Regex {
    MARKUP_REGEX.get_or_init(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid regex"))
}

impl TranslationValidator {
    /// Validate a translation submission.
    ///
    /// `canonical` is the item's canonical translation when one exists; it
    /// drives the likely-untranslated warnings. Bodies are stored as plain
    /// text and rendered through the text format later, so markup in the
    /// submission is flagged.
    pub fn validate(
        candidate: &TranslationDraft<'_>,
        canonical: Option<&TranslationDraft<'_>>,
    ) -> ValidationReport {
        let mut report = ValidationReport::new();

        if candidate.title.trim().is_empty() {
            report.errors.push("Title must not be empty".to_string());
        } else if candidate.title.len() > MAX_TITLE_BYTES {
            report.errors.push(format!(
                "Title exceeds {} bytes ({} given)",
                MAX_TITLE_BYTES,
                candidate.title.len()
            ));
        }

        if candidate.body.trim().is_empty() {
            report.errors.push("Body must not be empty".to_string());
        } else if candidate.body.len() > MAX_BODY_BYTES {
            report.errors.push(format!(
                "Body exceeds {} bytes ({} given)",
                MAX_BODY_BYTES,
                candidate.body.len()
            ));
        }

        if markup_regex().is_match(candidate.body) {
            report.warnings.push(
                "Body contains markup tags; bodies are stored as plain text".to_string(),
            );
        }

        if let Some(canonical) = canonical {
            if candidate.title == canonical.title {
                report
                    .warnings
                    .push("Title is identical to the canonical title".to_string());
            }
            if candidate.body == canonical.body {
                report
                    .warnings
                    .push("Body is identical to the canonical body".to_string());
            }
        }

        report
    }
}
