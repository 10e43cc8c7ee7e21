use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::time::Instant;
use url::Url;

use revsync_core::{ReconcileError, Result, Revision};

use crate::auth::AccessTokenProvider;
use crate::service::Service;
use crate::{RevisionDirectory, ServiceUpdater};

/// Default Cloud Run Admin API endpoint.
pub const DEFAULT_API_ENDPOINT: &str = "https://run.googleapis.com";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListRevisionsResponse {
    revisions: Vec<Revision>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Operation {
    name: String,
    done: bool,
    error: Option<OperationError>,
    #[allow(dead_code)]
    response: Option<Value>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OperationError {
    message: String,
}

/// REST client for the Cloud Run Admin API v2, implementing both collaborator
/// seams. Constructed once at startup and shared across invocations.
pub struct CloudRunClient {
    client: Client,
    api_endpoint: String,
    tokens: Arc<dyn AccessTokenProvider>,
    poll_interval: Duration,
    poll_timeout: Duration,
}

impl CloudRunClient {
    pub fn new(tokens: Arc<dyn AccessTokenProvider>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            tokens,
            poll_interval: Duration::from_secs(2),
            poll_timeout: Duration::from_secs(300),
        }
    }

    /// Override the API endpoint (tests, private endpoints).
    pub fn with_endpoint(mut self, endpoint: &Url) -> Self {
        self.api_endpoint = endpoint.as_str().trim_end_matches('/').to_string();
        self
    }

    /// Tune long-running-operation polling.
    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = interval;
        self.poll_timeout = timeout;
        self
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/v2/{}", self.api_endpoint, resource)
    }

    async fn bearer(&self) -> Result<String> {
        self.tokens.token().await
    }

    async fn poll_operation(&self, mut operation: Operation) -> Result<()> {
        let deadline = Instant::now() + self.poll_timeout;

        loop {
            if let Some(error) = operation.error {
                return Err(ReconcileError::OperationFailed {
                    name: operation.name,
                    message: error.message,
                });
            }
            if operation.done {
                tracing::debug!(operation = %operation.name, "update operation completed");
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ReconcileError::OperationTimeout {
                    name: operation.name,
                });
            }

            tokio::time::sleep(self.poll_interval).await;

            let token = self.bearer().await?;
            let response = self
                .client
                .get(self.url(&operation.name))
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| ReconcileError::updater(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ReconcileError::updater(format!(
                    "operation poll returned HTTP {}",
                    status.as_u16()
                )));
            }

            operation = response
                .json()
                .await
                .map_err(|e| ReconcileError::updater(format!("invalid operation body: {e}")))?;
        }
    }
}

#[async_trait]
impl RevisionDirectory for CloudRunClient {
    async fn list_revisions(&self, parent: &str) -> Result<Vec<Revision>> {
        let mut revisions = Vec::new();
        let mut page_token: Option<String> = None;

        // Drain pagination fully; the reconciler must not act on partial
        // results.
        loop {
            let token = self.bearer().await?;
            let mut request = self
                .client
                .get(self.url(&format!("{parent}/revisions")))
                .bearer_auth(&token);
            if let Some(ref t) = page_token {
                request = request.query(&[("pageToken", t.as_str())]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| ReconcileError::directory(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(ReconcileError::directory(format!(
                    "revision listing returned HTTP {}",
                    status.as_u16()
                )));
            }

            let page: ListRevisionsResponse = response
                .json()
                .await
                .map_err(|e| ReconcileError::directory(format!("invalid listing body: {e}")))?;

            revisions.extend(page.revisions);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(t) => page_token = Some(t),
                None => break,
            }
        }

        tracing::debug!(parent, count = revisions.len(), "revision listing drained");
        Ok(revisions)
    }
}

#[async_trait]
impl ServiceUpdater for CloudRunClient {
    async fn update_service(&self, service: &Service) -> Result<()> {
        let token = self.bearer().await?;
        let response = self
            .client
            .patch(self.url(&service.name))
            .bearer_auth(&token)
            .json(service)
            .send()
            .await
            .map_err(|e| ReconcileError::updater(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReconcileError::updater(format!(
                "service update returned HTTP {}: {body}",
                status.as_u16()
            )));
        }

        let operation: Operation = response
            .json()
            .await
            .map_err(|e| ReconcileError::updater(format!("invalid operation body: {e}")))?;

        tracing::info!(
            service = %service.name,
            operation = %operation.name,
            "service update submitted"
        );

        self.poll_operation(operation).await
    }
}
