/// Metrics and telemetry for MapTools markers
///
/// Provides Prometheus-compatible metrics for monitoring:
/// - Profile cache hit/miss rates
/// - Name and texture lookups against the profile services
/// - Marker update runs

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter_vec, register_int_gauge, Encoder, Histogram,
    IntCounterVec, IntGauge, TextEncoder,
};

lazy_static! {
    // ========== Profile Metrics ==========

    /// Profile cache accesses by result (hit, miss, coalesced)
    pub static ref PROFILE_CACHE_ACCESSES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "profile_cache_accesses_total",
        "Total number of profile cache accesses",
        &["result"]
    )
    .unwrap();

    /// Name lookup requests by status
    pub static ref NAME_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "name_lookups_total",
        "Total number of profile name lookup requests",
        &["status"]
    )
    .unwrap();

    /// Texture lookups by status
    pub static ref TEXTURE_LOOKUPS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "texture_lookups_total",
        "Total number of texture lookups",
        &["status"]
    )
    .unwrap();

    // ========== Marker Metrics ==========

    /// Marker update runs by status
    pub static ref MARKER_UPDATES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "marker_updates_total",
        "Total number of marker update runs",
        &["status"]
    )
    .unwrap();

    /// Marker update duration in seconds
    pub static ref MARKER_UPDATE_DURATION_SECONDS: Histogram = register_histogram!(
        "marker_update_duration_seconds",
        "Marker update run time in seconds",
        vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0]
    )
    .unwrap();

    /// Players in the last snapshot
    pub static ref ONLINE_PLAYERS: IntGauge = register_int_gauge!(
        "online_players",
        "Number of players in the last marker snapshot"
    )
    .unwrap();
}

/// Render metrics in Prometheus text format
pub fn render_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

fn status_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Record a profile cache access
pub fn record_cache_access(result: &str) {
    PROFILE_CACHE_ACCESSES_TOTAL.with_label_values(&[result]).inc();
}

/// Record a name lookup request
pub fn record_name_lookup(success: bool) {
    NAME_LOOKUPS_TOTAL
        .with_label_values(&[status_label(success)])
        .inc();
}

/// Record a texture lookup
pub fn record_texture_lookup(success: bool) {
    TEXTURE_LOOKUPS_TOTAL
        .with_label_values(&[status_label(success)])
        .inc();
}

/// Record a marker update run
pub fn record_marker_update(success: bool, players: usize, duration: f64) {
    MARKER_UPDATES_TOTAL
        .with_label_values(&[status_label(success)])
        .inc();
    MARKER_UPDATE_DURATION_SECONDS.observe(duration);
    if success {
        ONLINE_PLAYERS.set(players as i64);
    }
}
