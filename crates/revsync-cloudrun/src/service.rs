use serde::{Deserialize, Serialize};

use revsync_core::{Container, ReconcileError, Result, Revision, RevisionScaling};

/// Service update request body for the Cloud Run Admin API v2.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Fully-qualified resource name:
    /// `projects/{p}/locations/{r}/services/{s}`.
    pub name: String,
    pub template: RevisionTemplate,
}

/// Template for the revision created by a service update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevisionTemplate {
    pub containers: Vec<Container>,
    pub scaling: RevisionScaling,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

impl Service {
    /// Build the replacement spec that moves `active` onto `image`.
    ///
    /// The single container uses the given image; env, resources and probes are
    /// copied verbatim from the active revision's first container, and scaling
    /// bounds and service account verbatim from the active revision.
    pub fn replacement_for(name: impl Into<String>, image: &str, active: &Revision) -> Result<Self> {
        let current = active
            .containers
            .first()
            .ok_or_else(|| ReconcileError::missing_container(&active.name))?;

        Ok(Self {
            name: name.into(),
            template: RevisionTemplate {
                containers: vec![Container {
                    image: image.to_string(),
                    env: current.env.clone(),
                    resources: current.resources.clone(),
                    liveness_probe: current.liveness_probe.clone(),
                    startup_probe: current.startup_probe.clone(),
                }],
                scaling: active.scaling,
                service_account: active.service_account.clone(),
            },
        })
    }
}
