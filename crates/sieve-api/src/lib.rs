//! Sieve API Library
//!
//! HTTP surface of the upload service: ingestion, status polling and health, plus the
//! wiring that starts the background worker.

mod api_doc;
mod handlers;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

pub use error::HttpAppError;
pub use setup::{initialize_app, initialize_app_with, App};
pub use state::AppState;
