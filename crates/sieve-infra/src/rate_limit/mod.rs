//! Rate limiting for the ingestion path
//!
//! Sliding-window admission counting keyed by client address, plus a background sweep
//! that bounds memory under high client churn.

pub use limiter::RateLimiter;
pub use sweeper::spawn_sweeper;

mod limiter;
mod sweeper;
