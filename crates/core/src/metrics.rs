//! Prometheus metrics for the conversion pipeline.
//!
//! This module provides metrics for:
//! - Conversions (attempts and duration by result)
//! - Batch items (by result code)
//! - Object storage transfers (bytes by direction)

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

// =============================================================================
// Conversion Metrics
// =============================================================================

/// Conversion duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "copcify_conversion_duration_seconds",
            "Duration of a single LAS/LAZ to COPC conversion",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 900.0, 1800.0, 3600.0]),
        &["result"], // "succeeded", "failed"
    )
    .unwrap()
});

/// Points written by successful conversions.
pub static POINTS_WRITTEN: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "copcify_points_written_total",
        "Total points written to COPC output",
    )
    .unwrap()
});

// =============================================================================
// Batch Metrics
// =============================================================================

/// Work items processed by result code.
pub static ITEMS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("copcify_items_processed_total", "Total work items processed"),
        &["result"], // "Succeeded", "TemporaryFailure", "PermanentFailure"
    )
    .unwrap()
});

/// Bytes moved to or from object storage.
pub static BYTES_TRANSFERRED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "copcify_bytes_transferred_total",
            "Total bytes downloaded from or uploaded to object storage",
        ),
        &["direction"], // "download", "upload"
    )
    .unwrap()
});

/// Registry holding every copcify metric.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    registry
        .register(Box::new(CONVERSION_DURATION.clone()))
        .unwrap();
    registry.register(Box::new(POINTS_WRITTEN.clone())).unwrap();
    registry.register(Box::new(ITEMS_PROCESSED.clone())).unwrap();
    registry
        .register(Box::new(BYTES_TRANSFERRED.clone()))
        .unwrap();
    registry
});

/// Records a finished conversion.
pub fn record_conversion(succeeded: bool, duration_secs: f64, points: Option<u64>) {
    let result = if succeeded { "succeeded" } else { "failed" };
    CONVERSION_DURATION
        .with_label_values(&[result])
        .observe(duration_secs);
    if let Some(points) = points {
        POINTS_WRITTEN.inc_by(points);
    }
}

/// Records a finished work item.
pub fn record_item(result_code: &str) {
    ITEMS_PROCESSED.with_label_values(&[result_code]).inc();
}

/// Records bytes moved through object storage.
pub fn record_transfer(direction: &str, bytes: u64) {
    BYTES_TRANSFERRED
        .with_label_values(&[direction])
        .inc_by(bytes);
}

/// Encodes all metrics in the Prometheus text exposition format.
pub fn encode_text() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_recorded_metrics() {
        record_item("Succeeded");
        record_transfer("download", 1024);
        record_conversion(true, 1.5, Some(100));

        let text = encode_text();
        assert!(text.contains("copcify_items_processed_total"));
        assert!(text.contains("copcify_bytes_transferred_total"));
        assert!(text.contains("copcify_conversion_duration_seconds"));
        assert!(text.contains("copcify_points_written_total"));
    }
}
