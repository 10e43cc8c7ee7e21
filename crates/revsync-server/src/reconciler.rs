//! The reconciliation pipeline: discover current state, discover desired state,
//! compare, optionally mutate.

use std::sync::Arc;

use revsync_cloudrun::{RevisionDirectory, Service, ServiceUpdater};
use revsync_core::{
    DeploymentTarget, ReconcileError, ReconcileOutcome, Result, image_version_key, select_active,
};
use revsync_registry::RegistryClient;

/// One-shot reconciler over dependency-injected collaborators.
///
/// Collaborators are constructed once at process start and shared across
/// invocations; each `reconcile` call is an independent linear pass with no
/// state carried between calls.
pub struct Reconciler {
    directory: Arc<dyn RevisionDirectory>,
    updater: Arc<dyn ServiceUpdater>,
    registry: RegistryClient,
    stable_image: String,
    sort_by_create_time: bool,
}

impl Reconciler {
    pub fn new(
        directory: Arc<dyn RevisionDirectory>,
        updater: Arc<dyn ServiceUpdater>,
        registry: RegistryClient,
        stable_image: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            updater,
            registry,
            stable_image: stable_image.into(),
            sort_by_create_time: false,
        }
    }

    /// Order revisions by creation time before last-wins selection.
    pub fn with_sort_by_create_time(mut self, enabled: bool) -> Self {
        self.sort_by_create_time = enabled;
        self
    }

    /// Run one reconciliation pass for the target.
    ///
    /// Compares the active revision's image version key against the registry's
    /// stable key by strict string equality and deploys a replacement revision
    /// when they differ. The update is the only mutating step and is awaited to
    /// completion before returning.
    pub async fn reconcile(&self, target: &DeploymentTarget) -> Result<ReconcileOutcome> {
        let parent = target.resource_path();

        let revisions = self.directory.list_revisions(&parent).await?;
        let active = select_active(&revisions, self.sort_by_create_time)
            .ok_or_else(|| ReconcileError::no_active_revision(&parent))?;

        let container = active
            .containers
            .first()
            .ok_or_else(|| ReconcileError::missing_container(&active.name))?;
        let current_key = image_version_key(&container.image)?.to_string();

        tracing::info!(
            service = %parent,
            revision = %active.name,
            version = %current_key,
            "active revision resolved"
        );

        let manifest = self.registry.fetch_manifest().await?;
        let stable_key = manifest.stable_version_key().map(str::to_string);

        match stable_key {
            Some(ref key) if *key == current_key => {
                tracing::info!(version = %current_key, "deployed version matches stable");
                Ok(ReconcileOutcome::up_to_date(current_key, stable_key))
            }
            _ => {
                if stable_key.is_none() {
                    // Preserved edge case: an absent stable entry still triggers
                    // an update with an undefined desired key.
                    tracing::warn!(
                        registry = %self.registry.endpoint(),
                        "no stable-tagged entry in registry manifest"
                    );
                }

                tracing::info!(
                    current = %current_key,
                    stable = stable_key.as_deref().unwrap_or("<none>"),
                    image = %self.stable_image,
                    "versions differ, deploying stable image"
                );

                let service = Service::replacement_for(&parent, &self.stable_image, active)?;
                self.updater.update_service(&service).await?;

                Ok(ReconcileOutcome::updated(current_key, stable_key))
            }
        }
    }
}
