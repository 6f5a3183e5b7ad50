//! Feed render metrics and observability.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// Global feed metrics singleton.
pub struct FeedMetrics {
    /// Number of feed render passes
    renders: AtomicUsize,

    /// Number of feed entries emitted across all renders
    entries_emitted: AtomicUsize,

    /// Number of emitted translations whose langcode was not enabled
    /// in the registry at render time
    unregistered_langcodes: AtomicUsize,

    /// Number of translation submissions rejected by validation
    validation_rejections: AtomicUsize,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<FeedMetrics> = OnceLock::new();

impl FeedMetrics {
    /// Get the global feed metrics instance.
    pub fn global() -> &'static FeedMetrics {
        METRICS.get_or_init(|| FeedMetrics {
            renders: AtomicUsize::new(0),
            entries_emitted: AtomicUsize::new(0),
            unregistered_langcodes: AtomicUsize::new(0),
            validation_rejections: AtomicUsize::new(0),
        })
    }

    /// Record one render pass emitting `entries` feed entries.
    pub fn record_render(&self, entries: usize) {
        self.renders.fetch_add(1, Ordering::Relaxed);
        self.entries_emitted.fetch_add(entries, Ordering::Relaxed);
    }

    /// Record an emitted translation whose langcode is not in the registry.
    pub fn record_unregistered_langcode(&self) {
        self.unregistered_langcodes.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a translation submission rejected by validation.
    pub fn record_validation_rejection(&self) {
        self.validation_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::Relaxed)
    }

    pub fn entries_emitted(&self) -> usize {
        self.entries_emitted.load(Ordering::Relaxed)
    }

    pub fn unregistered_langcodes(&self) -> usize {
        self.unregistered_langcodes.load(Ordering::Relaxed)
    }

    pub fn validation_rejections(&self) -> usize {
        self.validation_rejections.load(Ordering::Relaxed)
    }

    /// Snapshot of the current counters.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            renders: self.renders(),
            entries_emitted: self.entries_emitted(),
            unregistered_langcodes: self.unregistered_langcodes(),
            validation_rejections: self.validation_rejections(),
        }
    }
}

/// Serializable snapshot of the feed metrics.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MetricsReport {
    pub renders: usize,
    pub entries_emitted: usize,
    pub unregistered_langcodes: usize,
    pub validation_rejections: usize,
}
