//! Proxy manager wire types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::schema::{ForwardScheme, ServiceDescriptor};

/// Proxy host identifier assigned by the proxy manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct HostId(pub u64);

impl From<u64> for HostId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for HostId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A proxy host as returned by the proxy manager.
///
/// Only the fields the reconciler reads are decoded; the remote sends many
/// more and their types drift between releases.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProxyHostRecord {
    pub id: HostId,

    #[serde(default)]
    pub domain_names: Vec<String>,
}

/// Certificate request metadata sent with every proxy host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostMeta {
    pub letsencrypt_agree: bool,
    pub dns_challenge: bool,
}

/// Request body for creating or updating a proxy host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyHostPayload {
    pub domain_names: Vec<String>,
    pub forward_scheme: ForwardScheme,
    pub forward_host: String,
    pub forward_port: u16,
    pub access_list_id: u64,
    pub certificate_id: u64,
    pub meta: HostMeta,
    pub advanced_config: String,
    pub locations: Vec<serde_json::Value>,
    pub block_exploits: bool,
    pub caching_enabled: bool,
    pub allow_websocket_upgrade: bool,
    pub http2_support: bool,
    pub hsts_enabled: bool,
    pub hsts_subdomains: bool,
    pub ssl_forced: bool,
}

impl ProxyHostPayload {
    /// Build the payload publishing `service` at `{name}.{base_domain}`.
    pub fn for_service(service: &ServiceDescriptor, base_domain: &str) -> Self {
        Self {
            domain_names: vec![service.fqdn(base_domain)],
            forward_scheme: service.forward_scheme,
            forward_host: service.forward_host.clone(),
            forward_port: service.forward_port,
            access_list_id: 0,
            certificate_id: 0,
            meta: HostMeta {
                letsencrypt_agree: true,
                dns_challenge: false,
            },
            advanced_config: String::new(),
            locations: Vec::new(),
            block_exploits: service.block_exploits,
            caching_enabled: service.cache_assets,
            allow_websocket_upgrade: service.allow_websocket_upgrade,
            http2_support: true,
            hsts_enabled: true,
            hsts_subdomains: false,
            ssl_forced: service.ssl_forced,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenRequest<'a> {
    pub identity: &'a str,
    pub secret: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Errors that can occur talking to the proxy manager.
#[derive(Debug, Error)]
pub enum ProxyManagerError {
    /// Base URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// An API call was attempted before `authenticate` succeeded.
    #[error("Not authenticated; call authenticate() first")]
    NotAuthenticated,

    /// The token endpoint answered without a token.
    #[error("Authentication response did not contain a token")]
    MissingToken,

    /// Connection, timeout or body read failure.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type for proxy manager operations.
pub type ProxyManagerResult<T> = Result<T, ProxyManagerError>;
