use thiserror::Error;

/// Errors produced by a single reconciliation pass.
///
/// None of these are retried; each one is fatal to the current invocation and is
/// mapped to an HTTP status at the server boundary.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("no active revision found for service: {service}")]
    NoActiveRevision { service: String },

    #[error("active revision has no containers: {revision}")]
    MissingContainer { revision: String },

    #[error("image reference has no version key: {image}")]
    MalformedImageReference { image: String },

    #[error("image registry returned HTTP {status}")]
    RegistryUnavailable { status: u16 },

    #[error("image registry request failed: {0}")]
    Registry(String),

    #[error("revision listing failed: {0}")]
    Directory(String),

    #[error("service update failed: {0}")]
    Updater(String),

    #[error("update operation {name} failed: {message}")]
    OperationFailed { name: String, message: String },

    #[error("update operation {name} did not complete in time")]
    OperationTimeout { name: String },

    #[error("access token acquisition failed: {0}")]
    Auth(String),
}

impl ReconcileError {
    pub fn no_active_revision(service: impl Into<String>) -> Self {
        Self::NoActiveRevision {
            service: service.into(),
        }
    }

    pub fn missing_container(revision: impl Into<String>) -> Self {
        Self::MissingContainer {
            revision: revision.into(),
        }
    }

    pub fn malformed_image_reference(image: impl Into<String>) -> Self {
        Self::MalformedImageReference {
            image: image.into(),
        }
    }

    pub fn registry(message: impl Into<String>) -> Self {
        Self::Registry(message.into())
    }

    pub fn directory(message: impl Into<String>) -> Self {
        Self::Directory(message.into())
    }

    pub fn updater(message: impl Into<String>) -> Self {
        Self::Updater(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// True when the failure originated in an upstream collaborator rather than
    /// in the reconciler's own view of the deployment state.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::RegistryUnavailable { .. }
                | Self::Registry(_)
                | Self::Directory(_)
                | Self::Updater(_)
                | Self::OperationFailed { .. }
                | Self::OperationTimeout { .. }
                | Self::Auth(_)
        )
    }
}

/// Convenience result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;
