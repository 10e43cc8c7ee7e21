use serde::{Deserialize, Serialize};

/// A Cloud Run deployment target supplied by the caller.
///
/// Exists only for the duration of one reconciliation request; the boundary is
/// responsible for rejecting empty fields before this reaches the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentTarget {
    pub project_id: String,
    pub region: String,
    pub service_name: String,
}

impl DeploymentTarget {
    pub fn new(
        project_id: impl Into<String>,
        region: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            region: region.into(),
            service_name: service_name.into(),
        }
    }

    /// True when every field is present and non-empty.
    pub fn is_complete(&self) -> bool {
        !self.project_id.is_empty() && !self.region.is_empty() && !self.service_name.is_empty()
    }

    /// Fully-qualified service resource path used by the Cloud Run Admin API.
    pub fn resource_path(&self) -> String {
        format!(
            "projects/{}/locations/{}/services/{}",
            self.project_id, self.region, self.service_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_path_format() {
        let target = DeploymentTarget::new("my-project", "europe-west1", "gtm-server");
        assert_eq!(
            target.resource_path(),
            "projects/my-project/locations/europe-west1/services/gtm-server"
        );
    }

    #[test]
    fn completeness_check() {
        assert!(DeploymentTarget::new("p", "r", "s").is_complete());
        assert!(!DeploymentTarget::new("", "r", "s").is_complete());
        assert!(!DeploymentTarget::new("p", "", "s").is_complete());
        assert!(!DeploymentTarget::new("p", "r", "").is_complete());
    }
}
