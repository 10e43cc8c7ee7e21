use serde::{Deserialize, Serialize};

/// The branch a reconciliation pass took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileStatus {
    /// Deployed version key already matches the registry's stable key.
    #[serde(rename = "no update needed")]
    UpToDate,
    /// A new revision with the stable image was deployed.
    #[serde(rename = "updated successfully")]
    Updated,
}

impl ReconcileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpToDate => "no update needed",
            Self::Updated => "updated successfully",
        }
    }
}

impl std::fmt::Display for ReconcileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one reconciliation pass, serialized verbatim as the API response.
///
/// `latest_image_version` is `null` when the registry manifest carried no
/// stable-tagged entry; the update is still issued in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub status: ReconcileStatus,
    #[serde(rename = "gtm-version")]
    pub gtm_version: String,
    #[serde(rename = "latest-image-version")]
    pub latest_image_version: Option<String>,
}

impl ReconcileOutcome {
    pub fn up_to_date(current: impl Into<String>, latest: Option<String>) -> Self {
        Self {
            status: ReconcileStatus::UpToDate,
            gtm_version: current.into(),
            latest_image_version: latest,
        }
    }

    pub fn updated(current: impl Into<String>, latest: Option<String>) -> Self {
        Self {
            status: ReconcileStatus::Updated,
            gtm_version: current.into(),
            latest_image_version: latest,
        }
    }
}
