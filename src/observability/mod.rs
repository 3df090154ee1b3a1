//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`; the request ID flows through every
//!   log line emitted while handling a request
//! - Metrics are cheap atomic updates, exposed on a separate Prometheus
//!   scrape address so the application port stays clean

pub mod logging;
pub mod metrics;
