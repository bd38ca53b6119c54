//! Telemetry initialization
//!
//! Structured logging through `tracing`; output format is selected at startup.

mod init_basic;

pub use init_basic::init_telemetry;
