//! Configuration module
//!
//! This module provides the configuration consumed by the ingestion path and the
//! background worker: server settings, rate limiting, queueing, scan simulation
//! and storage location. Values come from the environment (optionally via `.env`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    ENQUEUE_TIMEOUT_MS, MAX_UPLOAD_SIZE_MB, RATE_LIMIT_MAX_TRACKED_CLIENTS,
    RATE_LIMIT_SWEEP_INTERVAL_SECS, UPLOADS_DIR, UPLOAD_QUEUE_CAPACITY, UPLOAD_RATE_LIMIT_MAX,
    UPLOAD_RATE_LIMIT_WINDOW_SECS,
};
use crate::models::FilenamePolicy;

const SERVER_PORT: u16 = 4000;
const STORAGE_ROOT: &str = "./wwwroot";

/// Base configuration shared by the HTTP surface
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub log_format: String,
    /// Number of reverse proxies trusted to append to `X-Forwarded-For`.
    pub trusted_proxy_count: usize,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            log_format: "pretty".to_string(),
            trusted_proxy_count: 0,
        }
    }
}

/// Upload ingestion and processing configuration
#[derive(Clone, Debug)]
pub struct IngestConfig {
    pub base: BaseConfig,
    // Storage
    pub storage_root: PathBuf,
    pub max_upload_size_bytes: usize,
    pub filename_policy: FilenamePolicy,
    // Scan simulation
    pub simulate_antivirus_scan: bool,
    pub scan_delay_ms: u64,
    // Rate limiting
    pub rate_limit_max: usize,
    pub rate_limit_window_secs: u64,
    /// Admit requests whose client address cannot be determined. Only safe when every
    /// request arrives through a trusted proxy that enforces its own limits.
    pub rate_limit_allow_missing_ip: bool,
    pub rate_limit_max_tracked_clients: usize,
    /// 0 disables the background sweep; eviction then only happens inline at capacity.
    pub rate_limit_sweep_interval_secs: u64,
    // Queue
    pub upload_queue_capacity: usize,
    pub enqueue_timeout_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            base: BaseConfig::default(),
            storage_root: PathBuf::from(STORAGE_ROOT),
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            filename_policy: FilenamePolicy::Strict,
            simulate_antivirus_scan: false,
            scan_delay_ms: 0,
            rate_limit_max: UPLOAD_RATE_LIMIT_MAX,
            rate_limit_window_secs: UPLOAD_RATE_LIMIT_WINDOW_SECS,
            rate_limit_allow_missing_ip: true,
            rate_limit_max_tracked_clients: RATE_LIMIT_MAX_TRACKED_CLIENTS,
            rate_limit_sweep_interval_secs: RATE_LIMIT_SWEEP_INTERVAL_SECS,
            upload_queue_capacity: UPLOAD_QUEUE_CAPACITY,
            enqueue_timeout_ms: ENQUEUE_TIMEOUT_MS,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<IngestConfig>);

impl Config {
    fn as_ingest(&self) -> &IngestConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.as_ingest().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = IngestConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_ingest().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_ingest().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.as_ingest().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.as_ingest().base.log_format
    }

    pub fn trusted_proxy_count(&self) -> usize {
        self.as_ingest().base.trusted_proxy_count
    }

    pub fn storage_root(&self) -> &PathBuf {
        &self.as_ingest().storage_root
    }

    /// Directory that actually receives accepted uploads: `<storage_root>/uploads`.
    pub fn uploads_dir(&self) -> PathBuf {
        self.as_ingest().storage_root.join(UPLOADS_DIR)
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_ingest().max_upload_size_bytes
    }

    pub fn filename_policy(&self) -> FilenamePolicy {
        self.as_ingest().filename_policy
    }

    pub fn simulate_antivirus_scan(&self) -> bool {
        self.as_ingest().simulate_antivirus_scan
    }

    pub fn scan_delay(&self) -> Duration {
        Duration::from_millis(self.as_ingest().scan_delay_ms)
    }

    pub fn rate_limit_max(&self) -> usize {
        self.as_ingest().rate_limit_max
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.as_ingest().rate_limit_window_secs)
    }

    pub fn rate_limit_allow_missing_ip(&self) -> bool {
        self.as_ingest().rate_limit_allow_missing_ip
    }

    pub fn rate_limit_max_tracked_clients(&self) -> usize {
        self.as_ingest().rate_limit_max_tracked_clients
    }

    pub fn rate_limit_sweep_interval(&self) -> Option<Duration> {
        match self.as_ingest().rate_limit_sweep_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn upload_queue_capacity(&self) -> usize {
        self.as_ingest().upload_queue_capacity
    }

    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.as_ingest().enqueue_timeout_ms)
    }
}

impl From<IngestConfig> for Config {
    fn from(config: IngestConfig) -> Self {
        Config(Box::new(config))
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|s| s.trim().to_lowercase())
        .ok()
        .and_then(|s| match s.as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

impl IngestConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let filename_policy = match env::var("FILENAME_POLICY") {
            Ok(value) => value.parse()?,
            Err(_) => FilenamePolicy::Strict,
        };

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase(),
            trusted_proxy_count: env_or("TRUSTED_PROXY_COUNT", 0),
        };

        let max_upload_size_mb = env_or("MAX_UPLOAD_SIZE_MB", MAX_UPLOAD_SIZE_MB);

        let config = IngestConfig {
            base,
            storage_root: env::var("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(STORAGE_ROOT)),
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            filename_policy,
            simulate_antivirus_scan: env_bool("SIMULATE_ANTIVIRUS_SCAN", false),
            scan_delay_ms: env_or("SCAN_DELAY_MILLISECONDS", 0),
            rate_limit_max: env_or("UPLOAD_RATE_LIMIT_MAX", UPLOAD_RATE_LIMIT_MAX),
            rate_limit_window_secs: env_or(
                "UPLOAD_RATE_LIMIT_WINDOW_SECS",
                UPLOAD_RATE_LIMIT_WINDOW_SECS,
            ),
            rate_limit_allow_missing_ip: env_bool("RATE_LIMIT_ALLOW_MISSING_IP", true),
            rate_limit_max_tracked_clients: env_or(
                "RATE_LIMIT_MAX_TRACKED_CLIENTS",
                RATE_LIMIT_MAX_TRACKED_CLIENTS,
            ),
            rate_limit_sweep_interval_secs: env_or(
                "RATE_LIMIT_SWEEP_INTERVAL_SECS",
                RATE_LIMIT_SWEEP_INTERVAL_SECS,
            ),
            upload_queue_capacity: env_or("UPLOAD_QUEUE_CAPACITY", UPLOAD_QUEUE_CAPACITY),
            enqueue_timeout_ms: env_or("ENQUEUE_TIMEOUT_MS", ENQUEUE_TIMEOUT_MS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        if self.rate_limit_max == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_RATE_LIMIT_MAX must be greater than 0"
            ));
        }

        if self.rate_limit_window_secs == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_RATE_LIMIT_WINDOW_SECS must be greater than 0"
            ));
        }

        if self.upload_queue_capacity == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_QUEUE_CAPACITY must be greater than 0"
            ));
        }

        if self.rate_limit_max_tracked_clients == 0 {
            return Err(anyhow::anyhow!(
                "RATE_LIMIT_MAX_TRACKED_CLIENTS must be greater than 0"
            ));
        }

        Ok(())
    }
}
