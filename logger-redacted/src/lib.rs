//! PII-redacting logging macros (§10.1): `redacted_info!`/`redacted_warn!`/
//! `redacted_error!` wrap `tracing`'s macros; [`PiiRedactor`] pattern-redacts
//! and correlation-hashes emails, phone numbers, SSNs, credit cards, and IP
//! addresses out of a pre-formatted message before it is logged. Call sites
//! that handle raw token handles or password material format through
//! [`PiiRedactor::redact`] first rather than relying on the macro alone.

pub mod config;
pub mod macros;
pub mod redactor;

pub use config::LoggerConfig;
pub use redactor::{PiiRedactor, RedactionConfig};
