//! Application setup and initialization
//!
//! Builds the shared state, starts the background worker and rate-limit sweeper, and
//! assembles the router. Telemetry is initialized by the binary before this runs.

pub mod routes;
pub mod server;

use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sieve_core::Config;
use sieve_infra::{spawn_sweeper, RateLimiter};
use sieve_processing::{ContentClassifier, MagicByteSniffer};
use sieve_storage::{LocalStorage, Storage};
use sieve_worker::{StatusStore, UploadQueue, UploadWorker};

use crate::state::AppState;

/// A running application: router plus the background tasks that must be stopped on exit.
pub struct App {
    pub state: Arc<AppState>,
    pub router: Router,
    pub cancel_token: CancellationToken,
    pub worker: JoinHandle<()>,
    pub sweeper: Option<JoinHandle<()>>,
}

impl App {
    /// Stop the background tasks and wait for the worker to finish its current upload.
    pub async fn shutdown(self) {
        self.cancel_token.cancel();

        if let Err(e) = self.worker.await {
            tracing::error!(error = %e, "Upload worker terminated abnormally");
        }
        if let Some(sweeper) = self.sweeper {
            let _ = sweeper.await;
        }

        tracing::info!(
            tracked_uploads = self.state.status_store.len(),
            "Background tasks stopped"
        );
    }
}

/// Initialize the application with local filesystem storage and the magic-byte sniffer.
pub async fn initialize_app(config: Config) -> Result<App> {
    initialize_app_with(
        config,
        Arc::new(LocalStorage::new()),
        Arc::new(MagicByteSniffer),
    )
    .await
}

/// Initialize the application with a specific storage backend and content classifier.
pub async fn initialize_app_with(
    config: Config,
    storage: Arc<dyn Storage>,
    classifier: Arc<dyn ContentClassifier>,
) -> Result<App> {
    config.validate().context("Configuration validation failed")?;

    tokio::fs::create_dir_all(config.uploads_dir())
        .await
        .with_context(|| {
            format!(
                "Failed to create uploads directory {}",
                config.uploads_dir().display()
            )
        })?;

    let cancel_token = CancellationToken::new();

    let status_store = StatusStore::new();
    let worker = UploadWorker::new(status_store.clone(), storage, classifier);
    let (queue, worker_handle) = UploadQueue::start(&config, worker, cancel_token.clone());

    let rate_limiter = RateLimiter::from_config(&config);
    let sweeper = config
        .rate_limit_sweep_interval()
        .map(|interval| spawn_sweeper(rate_limiter.clone(), interval, cancel_token.child_token()));

    tracing::info!(
        uploads_dir = %config.uploads_dir().display(),
        filename_policy = ?config.filename_policy(),
        simulate_antivirus_scan = config.simulate_antivirus_scan(),
        scan_delay_ms = config.scan_delay().as_millis() as u64,
        rate_limit_max = config.rate_limit_max(),
        rate_limit_window_secs = config.rate_limit_window().as_secs(),
        rate_limit_allow_missing_ip = config.rate_limit_allow_missing_ip(),
        "Upload pipeline initialized"
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        rate_limiter,
        status_store,
        queue,
    });

    let router = routes::setup_routes(&config, state.clone());

    Ok(App {
        state,
        router,
        cancel_token,
        worker: worker_handle,
        sweeper,
    })
}
