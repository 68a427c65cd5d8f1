/// Metrics for skin resolution
///
/// Provides Prometheus-compatible metrics for:
/// - Cache lookups (live sessions, id cache, skin cache)
/// - Provider requests and their outcomes
/// - Sweep evictions and cache sizes

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec, register_int_gauge_vec, Encoder, IntCounterVec, IntGaugeVec,
    TextEncoder,
};

lazy_static! {
    /// Cache lookups by cache and outcome (hit, miss, expired)
    pub static ref CACHE_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "skin_cache_lookups_total",
        "Total number of skin cache lookups",
        &["cache", "outcome"]
    )
    .expect("skin_cache_lookups_total registers once");

    /// Provider requests by provider and outcome (found, not_found, error)
    pub static ref PROVIDER_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "skin_provider_requests_total",
        "Total number of skin provider requests",
        &["provider", "outcome"]
    )
    .expect("skin_provider_requests_total registers once");

    /// Entries evicted by sweeps
    pub static ref CACHE_EVICTIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "skin_cache_evictions_total",
        "Total number of expired cache entries evicted",
        &["cache"]
    )
    .expect("skin_cache_evictions_total registers once");

    /// Current number of cache entries
    pub static ref CACHE_ENTRIES: IntGaugeVec = register_int_gauge_vec!(
        "skin_cache_entries",
        "Number of entries in the skin caches",
        &["cache"]
    )
    .expect("skin_cache_entries registers once");
}

pub fn record_lookup(cache: &str, outcome: &str) {
    CACHE_LOOKUPS_TOTAL.with_label_values(&[cache, outcome]).inc();
}

pub fn record_provider(provider: &str, outcome: &str) {
    PROVIDER_REQUESTS_TOTAL
        .with_label_values(&[provider, outcome])
        .inc();
}

pub fn record_sweep(cache: &str, evicted: usize, remaining: usize) {
    CACHE_EVICTIONS_TOTAL
        .with_label_values(&[cache])
        .inc_by(evicted as u64);
    CACHE_ENTRIES
        .with_label_values(&[cache])
        .set(remaining as i64);
}

/// Render all registered metrics in the Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}
