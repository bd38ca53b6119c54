use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use sieve_core::Config;

type AdmissionWindow = Arc<Mutex<VecDeque<Instant>>>;

/// Drop admissions older than `window` relative to `now`.
fn prune(admissions: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = admissions.front() {
        if now.saturating_duration_since(*oldest) > window {
            admissions.pop_front();
        } else {
            break;
        }
    }
}

/// Sliding-window rate limiter keyed by client address.
///
/// Each address owns its own admission window behind its own lock. The `DashMap` index
/// only serializes get-or-create of a window, so checks for different addresses never
/// wait on each other.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, AdmissionWindow>>,
    max_admissions: usize,
    window: Duration,
    allow_missing_ip: bool,
    max_tracked_clients: usize,
}

impl RateLimiter {
    /// Create a limiter admitting `max_admissions` per `window` for each address.
    ///
    /// Requests without an address are admitted; use [`RateLimiter::with_missing_ip_policy`]
    /// to reject them instead.
    pub fn new(max_admissions: usize, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            max_admissions,
            window,
            allow_missing_ip: true,
            max_tracked_clients: sieve_core::constants::RATE_LIMIT_MAX_TRACKED_CLIENTS,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rate_limit_max(), config.rate_limit_window())
            .with_missing_ip_policy(config.rate_limit_allow_missing_ip())
            .with_max_tracked_clients(config.rate_limit_max_tracked_clients())
    }

    /// `true` admits requests with no client address (trusted-proxy deployments),
    /// `false` treats them as over the limit.
    pub fn with_missing_ip_policy(mut self, allow_missing_ip: bool) -> Self {
        self.allow_missing_ip = allow_missing_ip;
        self
    }

    pub fn with_max_tracked_clients(mut self, max_tracked_clients: usize) -> Self {
        self.max_tracked_clients = max_tracked_clients.max(1);
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn max_admissions(&self) -> usize {
        self.max_admissions
    }

    /// Number of client addresses currently holding a window.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Check and record an admission for `ip`. Returns `true` when the limit is exceeded.
    ///
    /// A rejected check does not record an admission.
    #[tracing::instrument(skip(self))]
    pub async fn check(&self, ip: Option<&str>) -> bool {
        let Some(ip) = ip.map(str::trim).filter(|ip| !ip.is_empty()) else {
            if self.allow_missing_ip {
                tracing::trace!("No client address, admitting (missing-ip policy: allow)");
                return false;
            }
            tracing::debug!("No client address, rejecting (missing-ip policy: deny)");
            return true;
        };

        if self.windows.len() >= self.max_tracked_clients && !self.windows.contains_key(ip) {
            self.evict_for_capacity();
        }

        let window = Arc::clone(
            self.windows
                .entry(ip.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(VecDeque::new())))
                .value(),
        );

        let now = Instant::now();
        let mut admissions = window.lock().await;
        prune(&mut admissions, now, self.window);

        if admissions.len() >= self.max_admissions {
            tracing::debug!(
                ip = %ip,
                admissions = admissions.len(),
                limit = self.max_admissions,
                "Upload rate limit exceeded"
            );
            return true;
        }

        admissions.push_back(now);
        tracing::trace!(
            ip = %ip,
            remaining = self.max_admissions - admissions.len(),
            "Upload admitted by rate limiter"
        );
        false
    }

    /// Time until the oldest recorded admission for `ip` leaves the window.
    pub async fn retry_after(&self, ip: Option<&str>) -> Duration {
        let Some(window) = ip.and_then(|ip| {
            self.windows
                .get(ip.trim())
                .map(|entry| Arc::clone(entry.value()))
        }) else {
            return Duration::ZERO;
        };

        let admissions = window.lock().await;
        match admissions.front() {
            Some(oldest) => self.window.saturating_sub(oldest.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Remove addresses whose windows hold no live admissions. Returns how many were removed.
    ///
    /// Windows that are locked or referenced by an in-progress check are kept.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.windows.len();

        self.windows.retain(|_ip, window| {
            if Arc::strong_count(window) > 1 {
                return true;
            }
            match window.try_lock() {
                Ok(mut admissions) => {
                    prune(&mut admissions, now, self.window);
                    !admissions.is_empty()
                }
                Err(_) => true,
            }
        });

        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            tracing::debug!(
                windows_removed = removed,
                remaining = self.windows.len(),
                "Swept expired rate limit windows"
            );
        }
        removed
    }

    /// Make room for a new address: sweep, then evict the least recently admitted address.
    fn evict_for_capacity(&self) {
        self.sweep_expired();
        if self.windows.len() < self.max_tracked_clients {
            return;
        }

        let oldest = self
            .windows
            .iter()
            .filter_map(|entry| {
                let newest = entry.value().try_lock().ok()?.back().copied()?;
                Some((entry.key().clone(), newest))
            })
            .min_by_key(|(_, newest)| *newest)
            .map(|(ip, _)| ip);

        if let Some(ip) = oldest {
            self.windows.remove(&ip);
            tracing::debug!(
                removed_ip = %ip,
                remaining = self.windows.len(),
                "Evicted least recently admitted client due to capacity limit"
            );
        }
    }
}
