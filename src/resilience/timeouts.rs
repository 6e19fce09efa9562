//! Timeout enforcement.
//!
//! # Responsibilities
//! - Build HTTP clients with connect and request deadlines
//! - Attach default headers shared by every call to one remote
//!
//! # Design Decisions
//! - Timeouts are set on the reqwest client, not per call
//! - Timed-out requests surface as transport errors to the caller

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Client;

use crate::config::{HubConfig, ProxyManagerConfig};

/// Deadlines applied to every request made by one client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            request: Duration::from_secs(30),
        }
    }
}

impl From<&ProxyManagerConfig> for HttpTimeouts {
    fn from(config: &ProxyManagerConfig) -> Self {
        Self {
            connect: Duration::from_secs(config.connect_timeout_secs),
            request: Duration::from_secs(config.timeout_secs),
        }
    }
}

impl From<&HubConfig> for HttpTimeouts {
    fn from(config: &HubConfig) -> Self {
        Self {
            connect: Duration::from_secs(config.connect_timeout_secs),
            request: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// Build a client enforcing `timeouts` and sending `headers` on each request.
pub fn build_client(timeouts: HttpTimeouts, headers: HeaderMap) -> reqwest::Result<Client> {
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.request)
        .default_headers(headers)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = ProxyManagerConfig {
            timeout_secs: 12,
            connect_timeout_secs: 3,
            ..ProxyManagerConfig::default()
        };
        let timeouts = HttpTimeouts::from(&config);
        assert_eq!(timeouts.request, Duration::from_secs(12));
        assert_eq!(timeouts.connect, Duration::from_secs(3));
    }

    #[test]
    fn test_build_client() {
        assert!(build_client(HttpTimeouts::default(), HeaderMap::new()).is_ok());
    }
}
