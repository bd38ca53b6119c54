//! Sieve Infrastructure Library
//!
//! This crate provides shared infrastructure components used by the Sieve service:
//! - Sliding-window rate limiting for the ingestion path
//! - Telemetry initialization
//! - Error response format

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

// Re-export commonly used types
#[cfg(feature = "observability-basic")]
pub use telemetry::init_telemetry;

pub use error::ErrorResponse;

#[cfg(feature = "rate-limit")]
pub use rate_limit::{spawn_sweeper, RateLimiter};
