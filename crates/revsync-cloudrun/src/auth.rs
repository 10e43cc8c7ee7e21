//! Access token acquisition for the Cloud Run Admin API.
//!
//! The client authenticates with a bearer token. In production the token comes
//! from the GCE metadata server; tests and local runs can inject a static token.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use url::Url;

use revsync_core::{ReconcileError, Result};

/// Default GCE metadata server token endpoint.
pub const DEFAULT_METADATA_TOKEN_ENDPOINT: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Slack subtracted from a token's lifetime before it is considered expired.
const EXPIRY_SLACK: Duration = Duration::from_secs(60);

/// Source of bearer tokens for outbound Cloud Run API calls.
#[async_trait]
pub trait AccessTokenProvider: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// Fixed token, for tests and local invocations with a pre-minted credential.
pub struct StaticTokenProvider(String);

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessTokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Token provider backed by the GCE metadata server, with expiry caching so one
/// token serves many reconciliations.
pub struct MetadataTokenProvider {
    client: Client,
    endpoint: Url,
    cached: RwLock<Option<CachedToken>>,
}

impl MetadataTokenProvider {
    pub fn new() -> Self {
        let endpoint =
            Url::parse(DEFAULT_METADATA_TOKEN_ENDPOINT).expect("default endpoint is valid");
        Self::with_endpoint(endpoint)
    }

    pub fn with_endpoint(endpoint: Url) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint,
            cached: RwLock::new(None),
        }
    }

    async fn fetch(&self) -> Result<TokenResponse> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header("Metadata-Flavor", "Google")
            .send()
            .await
            .map_err(|e| ReconcileError::auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReconcileError::auth(format!(
                "metadata server returned HTTP {}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ReconcileError::auth(format!("invalid token response: {e}")))
    }
}

impl Default for MetadataTokenProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccessTokenProvider for MetadataTokenProvider {
    async fn token(&self) -> Result<String> {
        if let Some(cached) = self.cached.read().await.as_ref()
            && cached.expires_at > Instant::now()
        {
            return Ok(cached.token.clone());
        }

        let fresh = self.fetch().await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(EXPIRY_SLACK);
        let token = fresh.access_token;

        tracing::debug!(expires_in = fresh.expires_in, "metadata access token refreshed");

        *self.cached.write().await = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(token)
    }
}
