//! Prometheus middleware and process-level gauges.

use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use prometheus::{IntGaugeVec, Opts};

use super::state_builders::StoreKind;

const NAMESPACE: &str = "campus_qa";

/// Build the request metrics middleware serving `/metrics`.
pub(crate) fn build_metrics() -> Result<PrometheusMetrics, String> {
    PrometheusMetricsBuilder::new(NAMESPACE)
        .endpoint("/metrics")
        .build()
        .map_err(|err| err.to_string())
}

/// Publish which store backs this process as a labelled `1` gauge.
pub(crate) fn register_store_gauge(
    metrics: &PrometheusMetrics,
    store: StoreKind,
) -> Result<(), prometheus::Error> {
    let gauge = IntGaugeVec::new(
        Opts::new("store_backend", "Repository backend in use").namespace(NAMESPACE),
        &["backend"],
    )?;
    metrics.registry.register(Box::new(gauge.clone()))?;
    gauge.with_label_values(&[store.label()]).set(1);
    Ok(())
}
