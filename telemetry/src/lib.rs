//! Process-level observability for the identity service (§10.5): request and
//! grant-store metrics published through `metrics` and scraped via
//! `metrics-exporter-prometheus` alongside `/health`. This is observability
//! infrastructure, not one of the OAuth components themselves, and is wired
//! in `server/identity-server` only.

pub mod error;
pub mod metrics;

pub use error::{Result, TelemetryError};
pub use metrics_exporter_prometheus::PrometheusHandle;
