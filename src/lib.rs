//! polyfeed: serve RSS feeds where every content translation is its own entry.
//!
//! Content items live in a SQLite-backed store, each with one canonical
//! translation and any number of additional ones. The feed renderer maps
//! every `(item, translation)` pair to one RSS entry with a
//! language-qualified permalink; the web layer serves the feed on a fixed
//! path next to a small JSON editor API.

pub mod config;
pub mod error;
pub mod feed;
pub mod i18n;
pub mod markup;
pub mod security;
pub mod store;
pub mod web;

pub use error::{Error, Result};
