//! IP address extraction utilities
//!
//! Provides extraction of client IP addresses from X-Forwarded-For headers
//! with validation to prevent header spoofing attacks.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{request::Parts, HeaderMap};
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use crate::state::AppState;

/// Extract and validate client IP from request headers
///
/// Forwarding headers are written by whoever sends the request, so they are only read
/// when `trusted_proxy_count` is non-zero. Order is then `X-Forwarded-For`, `X-Real-IP`,
/// and finally the direct socket address. Returns `None` when nothing yields a valid address.
pub fn extract_client_ip(
    headers: &HeaderMap,
    socket_addr: Option<&SocketAddr>,
    trusted_proxy_count: usize,
) -> Option<String> {
    let socket_ip = socket_addr.map(|addr| addr.ip().to_string());
    if trusted_proxy_count == 0 {
        return socket_ip;
    }

    if let Some(ip) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| extract_from_forwarded_for(value, trusted_proxy_count))
    {
        return Some(ip);
    }

    // X-Real-IP carries a single address set by some proxies
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let trimmed = real_ip.trim();
        if is_valid_ip(trimmed) {
            return Some(trimmed.to_string());
        }
    }

    socket_ip
}

/// Extract client IP from X-Forwarded-For header chain
///
/// Each proxy appends the address it received the request from, so with N trusted
/// proxies the last N entries are theirs and the client is the first of those. Entries
/// further left were supplied by the client and are ignored.
fn extract_from_forwarded_for(header_value: &str, trusted_proxy_count: usize) -> Option<String> {
    if trusted_proxy_count == 0 {
        return None;
    }

    let ips: Vec<&str> = header_value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    let candidate = ips.get(ips.len().saturating_sub(trusted_proxy_count))?;

    is_valid_ip(candidate).then(|| candidate.to_string())
}

fn is_valid_ip(ip_str: &str) -> bool {
    ip_str.parse::<IpAddr>().is_ok()
}

/// Client address of the current request, or `None` when it cannot be determined.
///
/// What `None` means for rate limiting is decided by the limiter's missing-ip policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<String>);

impl FromRequestParts<Arc<AppState>> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let socket_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(ClientIp(extract_client_ip(
            &parts.headers,
            socket_addr.as_ref(),
            state.config.trusted_proxy_count(),
        )))
    }
}
