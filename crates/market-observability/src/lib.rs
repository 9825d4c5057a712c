//! Observability infrastructure for the marketplace services.
//!
//! This crate provides:
//! - `init_logging` - Installs the `tracing` subscriber from a `LoggingConfig`
//! - `RequestId` - Unique request identifier for log correlation

mod logging;
mod request_id;

pub use logging::*;
pub use request_id::*;
