//! Prometheus metrics for store operations

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

#[derive(Debug, Clone)]
pub struct StoreMetrics {
    pub fetches_total: IntCounterVec,
    pub fetches_failed_total: IntCounterVec,
    pub stale_discards_total: IntCounter,
    pub fetch_duration_seconds: HistogramVec,
}

impl StoreMetrics {
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let fetches_total = IntCounterVec::new(
            Opts::new(
                "bigbang_store_fetches_total",
                "Total number of store fetch operations",
            ),
            &["operation"],
        )?;

        let fetches_failed_total = IntCounterVec::new(
            Opts::new(
                "bigbang_store_fetches_failed_total",
                "Total number of failed store fetch operations",
            ),
            &["operation"],
        )?;

        let stale_discards_total = IntCounter::with_opts(Opts::new(
            "bigbang_store_stale_discards_total",
            "Snapshot loads dropped because a newer load was started",
        ))?;

        let fetch_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "bigbang_store_fetch_duration_seconds",
                "Duration of store fetch operations",
            ),
            &["operation"],
        )?;

        registry.register(Box::new(fetches_total.clone()))?;
        registry.register(Box::new(fetches_failed_total.clone()))?;
        registry.register(Box::new(stale_discards_total.clone()))?;
        registry.register(Box::new(fetch_duration_seconds.clone()))?;

        Ok(Self {
            fetches_total,
            fetches_failed_total,
            stale_discards_total,
            fetch_duration_seconds,
        })
    }

    pub(crate) fn observe(&self, operation: &str, seconds: f64, failed: bool) {
        self.fetches_total.with_label_values(&[operation]).inc();
        if failed {
            self.fetches_failed_total.with_label_values(&[operation]).inc();
        }
        self.fetch_duration_seconds
            .with_label_values(&[operation])
            .observe(seconds);
    }
}

/// Render every metric in `registry` in the text exposition format.
pub fn encode_text(registry: &Registry) -> Result<String, prometheus::Error> {
    use prometheus::Encoder;

    let mut buffer = Vec::new();
    prometheus::TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_metrics_creation() {
        let registry = Registry::new();
        let metrics = StoreMetrics::new(&registry).expect("metrics");

        let initial = metrics.fetches_total.with_label_values(&["snapshot"]).get();
        assert_eq!(initial, 0);
    }

    #[test]
    fn test_observe_counts_failures() {
        let registry = Registry::new();
        let metrics = StoreMetrics::new(&registry).expect("metrics");

        metrics.observe("team", 0.01, false);
        metrics.observe("team", 0.02, true);

        assert_eq!(metrics.fetches_total.with_label_values(&["team"]).get(), 2);
        assert_eq!(metrics.fetches_failed_total.with_label_values(&["team"]).get(), 1);
    }

    #[test]
    fn test_double_registration_fails() {
        let registry = Registry::new();
        StoreMetrics::new(&registry).expect("metrics");
        assert!(StoreMetrics::new(&registry).is_err());
    }

    #[test]
    fn test_encode_text() {
        let registry = Registry::new();
        let metrics = StoreMetrics::new(&registry).expect("metrics");
        metrics.stale_discards_total.inc();

        let text = encode_text(&registry).expect("encode");
        assert!(text.contains("bigbang_store_stale_discards_total 1"));
    }
}
