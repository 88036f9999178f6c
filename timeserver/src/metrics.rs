use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref TIME_REQUESTS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "timeserver_time_requests_total",
        "Total time endpoint requests served"
    ))
    .unwrap();
    pub static ref POLL_ATTEMPTS_TOTAL: Counter = Counter::with_opts(Opts::new(
        "timeserver_poll_attempts_total",
        "Total status polls attempted"
    ))
    .unwrap();
    pub static ref POLL_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "timeserver_poll_failures_total",
        "Total status polls that could not be queued"
    ))
    .unwrap();
    pub static ref POLL_TICK_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "timeserver_poll_tick_seconds",
            "Time spent in one status poll tick"
        )
        .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0])
    )
    .unwrap();
}

static INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Registers every metric with [`REGISTRY`]. Later calls return the outcome
/// of the first one.
pub fn init_metrics() -> prometheus::Result<()> {
    init_once(&INIT, register_all)
}

fn init_once(
    cell: &OnceLock<Result<(), String>>,
    register: impl FnOnce() -> prometheus::Result<()>,
) -> prometheus::Result<()> {
    cell.get_or_init(|| register().map_err(|e| e.to_string()))
        .clone()
        .map_err(prometheus::Error::Msg)
}

fn register_all() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(TIME_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(POLL_ATTEMPTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(POLL_FAILURES_TOTAL.clone()))?;
    REGISTRY.register(Box::new(POLL_TICK_SECONDS.clone()))?;
    Ok(())
}

pub fn gather_metrics() -> crate::errors::Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    let text = String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))?;
    Ok(text)
}
