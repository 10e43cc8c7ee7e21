//! HTTP client for the container image registry's tag listing.
//!
//! Fetches the published tag manifest from a `tags/list` endpoint so the
//! reconciler can resolve the current "stable" image version. One GET per
//! reconciliation; no caching, no retries.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use revsync_core::{ReconcileError, Result, TagManifest};

/// Default tag listing endpoint for the GTM cloud image.
pub const DEFAULT_TAGS_ENDPOINT: &str =
    "https://gcr.io/v2/cloud-tagging-10302018/gtm-cloud-image/tags/list";

/// Canonical stable image reference deployed when versions diverge.
pub const DEFAULT_STABLE_IMAGE: &str = "gcr.io/cloud-tagging-10302018/gtm-cloud-image:stable";

/// Client for the registry's tag manifest endpoint.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    endpoint: Url,
}

impl RegistryClient {
    /// Create a client against the given `tags/list` endpoint.
    pub fn new(endpoint: Url) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, endpoint }
    }

    /// Create with a custom client.
    pub fn with_client(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch and decode the tag manifest.
    ///
    /// A non-2xx response is `RegistryUnavailable`; transport and decode
    /// failures are `Registry`.
    pub async fn fetch_manifest(&self) -> Result<TagManifest> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| ReconcileError::registry(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                "registry tag listing failed"
            );
            return Err(ReconcileError::RegistryUnavailable {
                status: status.as_u16(),
            });
        }

        let manifest: TagManifest = response
            .json()
            .await
            .map_err(|e| ReconcileError::registry(format!("invalid manifest body: {e}")))?;

        tracing::debug!(
            endpoint = %self.endpoint,
            entries = manifest.manifest.len(),
            "registry tag manifest fetched"
        );

        Ok(manifest)
    }
}

impl Default for RegistryClient {
    fn default() -> Self {
        let endpoint = Url::parse(DEFAULT_TAGS_ENDPOINT).expect("default endpoint is valid");
        Self::new(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> RegistryClient {
        let endpoint = Url::parse(&format!("{}/v2/gtm/tags/list", server.uri())).unwrap();
        RegistryClient::new(endpoint)
    }

    #[tokio::test]
    async fn fetches_manifest_and_resolves_stable_key() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "name": "cloud-tagging-10302018/gtm-cloud-image",
            "manifest": {
                "sha256:older": {"tag": ["legacy"]},
                "sha256:abc123": {"tag": ["stable", "live"]}
            }
        });

        Mock::given(method("GET"))
            .and(path("/v2/gtm/tags/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let manifest = client_for(&server).await.fetch_manifest().await.unwrap();
        assert_eq!(manifest.stable_version_key(), Some("abc123"));
    }

    #[tokio::test]
    async fn non_success_status_is_registry_unavailable() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/gtm/tags/list"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_manifest().await.unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::RegistryUnavailable { status: 503 }
        ));
    }

    #[tokio::test]
    async fn invalid_body_is_registry_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/gtm/tags/list"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server).await.fetch_manifest().await.unwrap_err();
        assert!(matches!(err, ReconcileError::Registry(_)));
    }
}
