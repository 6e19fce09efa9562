//! Proxy manager REST client.
//!
//! # Responsibilities
//! - Exchange identity/secret for a bearer token
//! - List, create and update proxy hosts
//! - Log every failure with the response body when one is available
//!
//! The `try_*` methods return typed errors. The `ProxyHostApi` impl wraps
//! them into "result or nothing" so one failed host never stops a run.

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::schema::ServiceDescriptor;
use crate::npm::types::{
    HostId, ProxyHostPayload, ProxyHostRecord, ProxyManagerError, ProxyManagerResult,
    TokenRequest, TokenResponse,
};
use crate::resilience::{build_client, HttpTimeouts};

const TOKENS_PATH: &str = "api/tokens";
const PROXY_HOSTS_PATH: &str = "api/nginx/proxy-hosts";

/// Operations the reconciler needs from a proxy manager.
///
/// Failures are logged by the implementation and reported as an empty list
/// or `None`.
#[allow(async_fn_in_trait)]
pub trait ProxyHostApi {
    async fn list_hosts(&self) -> Vec<ProxyHostRecord>;

    async fn create_host(
        &self,
        service: &ServiceDescriptor,
        base_domain: &str,
    ) -> Option<ProxyHostRecord>;

    async fn update_host(
        &self,
        id: HostId,
        service: &ServiceDescriptor,
        base_domain: &str,
    ) -> Option<ProxyHostRecord>;
}

/// Client for the proxy manager REST API.
pub struct ProxyManagerClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ProxyManagerClient {
    /// Create an unauthenticated client for `base_url`.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> ProxyManagerResult<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ProxyManagerError::InvalidUrl(format!("'{}': {}", base_url, e)))?;

        // Keep any path prefix when joining endpoint paths.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = build_client(timeouts, HeaderMap::new())?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Exchange credentials for a bearer token used by all later calls.
    pub async fn authenticate(&mut self, identity: &str, secret: &str) -> ProxyManagerResult<()> {
        let url = self.endpoint(TOKENS_PATH)?;
        let response = self
            .client
            .post(url)
            .json(&TokenRequest { identity, secret })
            .send()
            .await?;

        let body: TokenResponse = decode(response).await?;
        match body.token {
            Some(token) if !token.is_empty() => {
                self.token = Some(token);
                tracing::info!(url = %self.base_url, "Authenticated with proxy manager");
                Ok(())
            }
            _ => Err(ProxyManagerError::MissingToken),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Fetch all proxy hosts.
    pub async fn try_list_hosts(&self) -> ProxyManagerResult<Vec<ProxyHostRecord>> {
        let token = self.token()?;
        let url = self.endpoint(PROXY_HOSTS_PATH)?;
        let response = self.client.get(url).bearer_auth(token).send().await?;
        decode(response).await
    }

    /// Create a proxy host for `service`.
    pub async fn try_create_host(
        &self,
        service: &ServiceDescriptor,
        base_domain: &str,
    ) -> ProxyManagerResult<ProxyHostRecord> {
        let url = self.endpoint(PROXY_HOSTS_PATH)?;
        self.submit(Method::POST, url, service, base_domain).await
    }

    /// Overwrite proxy host `id` with the configuration of `service`.
    pub async fn try_update_host(
        &self,
        id: HostId,
        service: &ServiceDescriptor,
        base_domain: &str,
    ) -> ProxyManagerResult<ProxyHostRecord> {
        let url = self.endpoint(&format!("{}/{}", PROXY_HOSTS_PATH, id))?;
        self.submit(Method::PUT, url, service, base_domain).await
    }

    async fn submit(
        &self,
        method: Method,
        url: Url,
        service: &ServiceDescriptor,
        base_domain: &str,
    ) -> ProxyManagerResult<ProxyHostRecord> {
        let token = self.token()?;
        let payload = ProxyHostPayload::for_service(service, base_domain);
        let response = self
            .client
            .request(method, url)
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await?;
        decode(response).await
    }

    fn token(&self) -> ProxyManagerResult<&str> {
        self.token.as_deref().ok_or(ProxyManagerError::NotAuthenticated)
    }

    fn endpoint(&self, path: &str) -> ProxyManagerResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ProxyManagerError::InvalidUrl(format!("'{}': {}", path, e)))
    }
}

impl ProxyHostApi for ProxyManagerClient {
    async fn list_hosts(&self) -> Vec<ProxyHostRecord> {
        match self.try_list_hosts().await {
            Ok(hosts) => {
                tracing::debug!(count = hosts.len(), "Fetched existing proxy hosts");
                hosts
            }
            Err(e) => {
                log_failure("Failed to get proxy hosts", None, &e);
                Vec::new()
            }
        }
    }

    async fn create_host(
        &self,
        service: &ServiceDescriptor,
        base_domain: &str,
    ) -> Option<ProxyHostRecord> {
        let fqdn = service.fqdn(base_domain);
        tracing::info!(fqdn = %fqdn, "Creating proxy host");
        match self.try_create_host(service, base_domain).await {
            Ok(record) => Some(record),
            Err(e) => {
                log_failure("Failed to create proxy host", Some(&fqdn), &e);
                None
            }
        }
    }

    async fn update_host(
        &self,
        id: HostId,
        service: &ServiceDescriptor,
        base_domain: &str,
    ) -> Option<ProxyHostRecord> {
        let fqdn = service.fqdn(base_domain);
        tracing::info!(fqdn = %fqdn, id = %id, "Updating proxy host");
        match self.try_update_host(id, service, base_domain).await {
            Ok(record) => Some(record),
            Err(e) => {
                log_failure("Failed to update proxy host", Some(&fqdn), &e);
                None
            }
        }
    }
}

impl std::fmt::Debug for ProxyManagerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyManagerClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

fn log_failure(message: &str, fqdn: Option<&str>, error: &ProxyManagerError) {
    let fqdn = fqdn.unwrap_or("-");
    match error {
        ProxyManagerError::NotAuthenticated => {
            tracing::error!(fqdn = %fqdn, "{}: not authenticated, call authenticate() first", message);
        }
        ProxyManagerError::Status { status, body } => {
            tracing::error!(fqdn = %fqdn, status = *status, response = %body, "{}", message);
        }
        other => {
            tracing::error!(fqdn = %fqdn, error = %other, "{}", message);
        }
    }
}

/// Check status, then decode the JSON body.
async fn decode<T: DeserializeOwned>(response: Response) -> ProxyManagerResult<T> {
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ProxyManagerError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text).map_err(|e| ProxyManagerError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_join_keeps_prefix() {
        let client = ProxyManagerClient::new("http://npm.lan:81/manager", HttpTimeouts::default())
            .unwrap();
        assert_eq!(
            client.endpoint(TOKENS_PATH).unwrap().as_str(),
            "http://npm.lan:81/manager/api/tokens"
        );

        let client = ProxyManagerClient::new("http://localhost:81", HttpTimeouts::default()).unwrap();
        assert_eq!(
            client.endpoint(&format!("{}/{}", PROXY_HOSTS_PATH, HostId(5))).unwrap().as_str(),
            "http://localhost:81/api/nginx/proxy-hosts/5"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ProxyManagerClient::new("not a url", HttpTimeouts::default()).unwrap_err();
        assert!(matches!(err, ProxyManagerError::InvalidUrl(_)));
    }

    #[test]
    fn test_new_client_is_unauthenticated() {
        let client = ProxyManagerClient::new("http://localhost:81", HttpTimeouts::default()).unwrap();
        assert!(!client.is_authenticated());
        assert!(matches!(client.token(), Err(ProxyManagerError::NotAuthenticated)));
    }
}
