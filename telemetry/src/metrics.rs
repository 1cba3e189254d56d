//! Process-level metrics (§10.5): request counts/latencies per route,
//! grant-store operation counters, and signing-key age, published through the
//! global `metrics` recorder and scraped by a Prometheus exporter alongside
//! the `/health` endpoint.

use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::{Result, TelemetryError};

/// Installs the global Prometheus recorder and returns a handle whose
/// `render()` produces the scrape body. The caller serves that body from
/// its own `/metrics` handler, alongside `/health`, rather than this crate
/// binding a second listener.
pub fn install() -> Result<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| TelemetryError::InternalError(anyhow::anyhow!(e)))
}

pub fn record_request(route: &str, method: &str, status: u16, elapsed: Duration) {
    metrics::counter!("identity_http_requests_total", "route" => route.to_string(), "method" => method.to_string(), "status" => status.to_string()).increment(1);
    metrics::histogram!("identity_http_request_duration_seconds", "route" => route.to_string()).record(elapsed.as_secs_f64());
}

pub fn record_grant_store_op(op: &str, store: &str, result: &str) {
    metrics::counter!("identity_grant_store_operations_total", "op" => op.to_string(), "store" => store.to_string(), "result" => result.to_string()).increment(1);
}

pub fn record_signing_key_age(age: Duration) {
    metrics::gauge!("identity_signing_key_age_seconds").set(age.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_request_does_not_panic_without_a_recorder() {
        record_request("/oauth2/token", "POST", 200, Duration::from_millis(12));
        record_grant_store_op("insert", "access_token", "ok");
        record_signing_key_age(Duration::from_secs(3600));
    }
}
