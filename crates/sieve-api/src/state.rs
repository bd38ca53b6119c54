use sieve_core::Config;
use sieve_infra::RateLimiter;
use sieve_worker::{StatusStore, UploadQueue};

/// Shared state handed to every handler.
///
/// The status store and rate limiter are owned here for the lifetime of the process;
/// the worker holds its own clone of the status store.
pub struct AppState {
    pub config: Config,
    pub rate_limiter: RateLimiter,
    pub status_store: StatusStore,
    pub queue: UploadQueue,
}
