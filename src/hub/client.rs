//! Home automation hub REST client.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::hub::types::{DeleteOutcome, HubError, HubResult, StateEntity};
use crate::resilience::{build_client, HttpTimeouts};

/// Operations the purger needs from a state store.
#[allow(async_fn_in_trait)]
pub trait StateStore {
    /// Fetch every state record. Failure aborts the purge.
    async fn fetch_all(&self) -> HubResult<Vec<StateEntity>>;

    /// Delete one state record.
    async fn delete_entity(&self, entity_id: &str) -> HubResult<DeleteOutcome>;
}

/// Client for the hub's `/api/states` resource.
pub struct HubClient {
    client: Client,
    base_url: Url,
}

impl HubClient {
    pub fn new(base_url: &str, token: &str, timeouts: HttpTimeouts) -> HubResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| HubError::InvalidUrl(format!("'{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(HubError::InvalidUrl(format!("'{}' cannot be a base URL", base_url)));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| HubError::InvalidToken(e.to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = build_client(timeouts, headers)?;
        Ok(Self { client, base_url })
    }

    fn states_url(&self, entity_id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "states"]);
            if let Some(id) = entity_id {
                segments.push(id);
            }
        }
        url
    }
}

impl StateStore for HubClient {
    async fn fetch_all(&self) -> HubResult<Vec<StateEntity>> {
        let response = self.client.get(self.states_url(None)).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(HubError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let entities: Vec<StateEntity> =
            serde_json::from_str(&text).map_err(|e| HubError::Decode(e.to_string()))?;
        tracing::debug!(count = entities.len(), "Fetched hub entities");
        Ok(entities)
    }

    async fn delete_entity(&self, entity_id: &str) -> HubResult<DeleteOutcome> {
        let response = self
            .client
            .delete(self.states_url(Some(entity_id)))
            .send()
            .await?;

        if response.status() == StatusCode::OK {
            Ok(DeleteOutcome::Removed)
        } else {
            Ok(DeleteOutcome::Rejected {
                status: response.status().as_u16(),
            })
        }
    }
}

impl std::fmt::Debug for HubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HubClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}
