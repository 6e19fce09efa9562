//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both
//! automation binaries. All types derive Serde traits for deserialization
//! from a TOML file.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AutomationConfig {
    /// Proxy manager connection and reconciliation settings.
    pub proxy_manager: ProxyManagerConfig,

    /// Services that should have a proxy host.
    pub services: Vec<ServiceDescriptor>,

    /// Home automation hub settings (purger).
    pub hub: HubConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            proxy_manager: ProxyManagerConfig::default(),
            services: default_services(),
            hub: HubConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Proxy manager configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyManagerConfig {
    /// Base URL of the proxy manager (e.g., "http://localhost:81").
    pub url: String,

    /// Base domain appended to each service name.
    pub domain: String,

    /// Update hosts that already exist instead of skipping them.
    pub force_update: bool,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for ProxyManagerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:81".to_string(),
            domain: "fatunicorns.club".to_string(),
            force_update: false,
            timeout_secs: 30,
            connect_timeout_secs: 5,
        }
    }
}

/// Upstream protocol used by the proxy to reach a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ForwardScheme {
    #[default]
    Http,
    Https,
}

impl std::fmt::Display for ForwardScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ForwardScheme::Http => write!(f, "http"),
            ForwardScheme::Https => write!(f, "https"),
        }
    }
}

/// A service that should be reachable at `{name}.{domain}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceDescriptor {
    /// Subdomain label, also used for logging.
    pub name: String,

    #[serde(default)]
    pub forward_scheme: ForwardScheme,

    /// Host the proxy forwards to (container name or address).
    pub forward_host: String,

    pub forward_port: u16,

    /// Service speaks websockets. Informational; the proxy host only uses
    /// `allow_websocket_upgrade`.
    #[serde(default)]
    pub websocket: bool,

    /// Maps to the proxy host's `caching_enabled`.
    #[serde(default)]
    pub cache_assets: bool,

    #[serde(default)]
    pub block_exploits: bool,

    #[serde(default)]
    pub allow_websocket_upgrade: bool,

    #[serde(default)]
    pub ssl_forced: bool,
}

impl ServiceDescriptor {
    /// Fully-qualified domain name of this service under `base_domain`.
    pub fn fqdn(&self, base_domain: &str) -> String {
        format!("{}.{}", self.name, base_domain)
    }
}

/// Home automation hub configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HubConfig {
    /// Base URL of the hub API.
    pub url: String,

    /// Long-lived access token (Bearer token).
    pub token: String,

    /// Entities not updated for this many days are considered stale.
    pub threshold_days: u32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            url: "http://homeassistant.local:8123".to_string(),
            token: String::new(),
            threshold_days: 90,
            timeout_secs: 30,
            connect_timeout_secs: 5,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

fn service(
    name: &str,
    port: u16,
    websocket: bool,
    cache_assets: bool,
) -> ServiceDescriptor {
    ServiceDescriptor {
        name: name.to_string(),
        forward_scheme: ForwardScheme::Http,
        forward_host: name.to_string(),
        forward_port: port,
        websocket,
        cache_assets,
        block_exploits: true,
        allow_websocket_upgrade: websocket,
        ssl_forced: true,
    }
}

/// Built-in service list used when the config file names none.
pub fn default_services() -> Vec<ServiceDescriptor> {
    vec![
        service("plex", 32400, true, true),
        service("sonarr", 8989, false, false),
        service("radarr", 7878, false, false),
        service("sabnzbd", 8080, false, false),
        service("prowlarr", 9696, false, false),
        service("frigate", 5000, true, false),
        service("portainer", 9000, true, false),
    ]
}
