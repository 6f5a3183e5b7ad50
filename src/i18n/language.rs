//! Langcode type: validated language code representation.
//!
//! A `Langcode` is a syntactically valid IETF-style language code such as
//! `en`, `es` or `pt-br`. Whether a code is actually configured for the
//! service is a separate question answered by the [`LanguageRegistry`].
//!
//! [`LanguageRegistry`]: crate::i18n::LanguageRegistry

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

// Primary subtag plus an optional region/script subtag, lowercase.
static LANGCODE_REGEX: OnceLock<Regex> = OnceLock::new();

fn langcode_regex() -> &'static Regex {
    LANGCODE_REGEX
        .get_or_init(|| Regex::new(r"^[a-z]{2,3}(-[a-z0-9]{2,8})?$").expect("valid regex"))
}

/// A validated language code.
///
/// Construction normalizes to lowercase and rejects anything that does not
/// look like a language code, so every `Langcode` in the system is
/// well-formed. Region-qualified codes (`pt-br`) are first-class.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Langcode(String);

impl Langcode {
    /// Parse and validate a language code.
    ///
    /// # Returns
    /// * `Ok(Langcode)` for a well-formed code (case-insensitive input)
    /// * `Err(Error::Validation)` otherwise
    pub fn new(code: &str) -> Result<Self> {
        let normalized = code.trim().to_ascii_lowercase();
        if langcode_regex().is_match(&normalized) {
            Ok(Langcode(normalized))
        } else {
            Err(Error::Validation(format!(
                "Invalid language code: {:?}",
                code
            )))
        }
    }

    /// The code as a string slice (always lowercase).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Langcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Langcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Langcode::new(s)
    }
}

impl TryFrom<String> for Langcode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Langcode::new(&value)
    }
}

impl From<Langcode> for String {
    fn from(code: Langcode) -> Self {
        code.0
    }
}

impl AsRef<str> for Langcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
