//! Cloud Run Admin API collaborators.
//!
//! The reconciler talks to two collaborators on the Cloud Run side: a revision
//! directory (paginated revision listing) and a service updater (submit a new
//! revision template and wait for the long-running operation). Both are trait
//! seams so the reconciler can be exercised against fakes; [`CloudRunClient`]
//! implements them over the Admin API v2 REST surface.

use async_trait::async_trait;

use revsync_core::{Result, Revision};

pub mod auth;
pub mod client;
pub mod service;

pub use auth::{AccessTokenProvider, MetadataTokenProvider, StaticTokenProvider};
pub use client::CloudRunClient;
pub use service::{RevisionTemplate, Service};

/// Lists revisions and their status conditions for a service.
#[async_trait]
pub trait RevisionDirectory: Send + Sync {
    /// List every revision under `parent`
    /// (`projects/{p}/locations/{r}/services/{s}`), draining pagination fully.
    async fn list_revisions(&self, parent: &str) -> Result<Vec<Revision>>;
}

/// Applies a new revision specification to a service.
#[async_trait]
pub trait ServiceUpdater: Send + Sync {
    /// Submit the service spec and wait for the resulting long-running
    /// operation to complete.
    async fn update_service(&self, service: &Service) -> Result<()>;
}
