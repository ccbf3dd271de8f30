//! Translation metrics and observability.
//!
//! Counters for cache behavior on the lookup path and for calls made to the
//! translation provider. Each `Translator` owns one instance, so tests get a
//! fresh set of counters with every translator they build.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Lookups answered from render state or the shared cache
    cache_hits: AtomicUsize,

    /// Lookups that had to queue their text
    cache_misses: AtomicUsize,

    /// Lookups that returned the source text because it failed before
    suppressed: AtomicUsize,

    /// Batch requests sent by the coalescer
    batch_requests: AtomicUsize,

    /// Single-text requests sent by translate-and-wait
    single_requests: AtomicUsize,

    /// Provider calls (of either kind) that failed
    provider_failures: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suppressed(&self) {
        self.suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch_request(&self) {
        self.batch_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_single_request(&self) {
        self.single_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn suppressed(&self) -> usize {
        self.suppressed.load(Ordering::Relaxed)
    }

    pub fn batch_requests(&self) -> usize {
        self.batch_requests.load(Ordering::Relaxed)
    }

    pub fn single_requests(&self) -> usize {
        self.single_requests.load(Ordering::Relaxed)
    }

    pub fn provider_failures(&self) -> usize {
        self.provider_failures.load(Ordering::Relaxed)
    }

    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let lookups = hits + misses;
        let cache_hit_rate = if lookups > 0 {
            (hits as f64 / lookups as f64) * 100.0
        } else {
            0.0
        };

        let batches = self.batch_requests();
        let singles = self.single_requests();
        let failures = self.provider_failures();
        let calls = batches + singles;
        let provider_success_rate = if calls > 0 {
            (calls.saturating_sub(failures) as f64 / calls as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            suppressed_lookups: self.suppressed(),
            batch_requests: batches,
            single_requests: singles,
            provider_failures: failures,
            provider_success_rate,
        }
    }
}

/// Point-in-time view of the counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Percentage (0-100)
    pub cache_hit_rate: f64,

    pub suppressed_lookups: usize,
    pub batch_requests: usize,
    pub single_requests: usize,
    pub provider_failures: usize,

    /// Percentage (0-100)
    pub provider_success_rate: f64,
}
