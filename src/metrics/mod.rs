use lazy_static::lazy_static;
/// Prometheus Metrics
/// Application monitoring and observability
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // === Ingestion Metrics ===

    /// Transaction rows accepted from uploads
    pub static ref ROWS_INGESTED: Counter = Counter::new(
        "rows_ingested_total",
        "Total transaction rows accepted"
    ).unwrap();

    /// Rows dropped during ingestion or preprocessing
    pub static ref ROWS_DROPPED: CounterVec = CounterVec::new(
        Opts::new("rows_dropped_total", "Total rows dropped"),
        &["reason"]
    ).unwrap();

    // === Analysis Metrics ===

    /// Batch analyses performed
    pub static ref ANALYSES_TOTAL: Counter = Counter::new(
        "analyses_total",
        "Total batch analyses performed"
    ).unwrap();

    /// Analysis duration
    pub static ref ANALYSIS_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new("analysis_duration_seconds", "Batch analysis duration")
            .buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0])
    ).unwrap();

    /// Accounts flagged by the most recent analysis
    pub static ref FLAGGED_ACCOUNTS: Gauge = Gauge::new(
        "flagged_accounts",
        "Suspicious accounts in the most recent analysis"
    ).unwrap();

    /// Fraud rings detected by the most recent analysis
    pub static ref FRAUD_RINGS: Gauge = Gauge::new(
        "fraud_rings",
        "Fraud rings in the most recent analysis"
    ).unwrap();
}

/// Initialize metrics registry
pub fn init_metrics() {
    REGISTRY.register(Box::new(ROWS_INGESTED.clone())).unwrap();
    REGISTRY.register(Box::new(ROWS_DROPPED.clone())).unwrap();
    REGISTRY.register(Box::new(ANALYSES_TOTAL.clone())).unwrap();
    REGISTRY
        .register(Box::new(ANALYSIS_DURATION.clone()))
        .unwrap();
    REGISTRY
        .register(Box::new(FLAGGED_ACCOUNTS.clone()))
        .unwrap();
    REGISTRY.register(Box::new(FRAUD_RINGS.clone())).unwrap();
}

/// Get metrics in Prometheus format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = vec![];
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}
