//! Core domain types and pure reconciliation logic for revsync.
//!
//! This crate has no I/O: it models deployment targets, Cloud Run revisions and
//! registry tag manifests, and implements the selection and comparison rules the
//! reconciler is built on. The HTTP collaborators live in `revsync-registry` and
//! `revsync-cloudrun`.

pub mod error;
pub mod manifest;
pub mod outcome;
pub mod revision;
pub mod target;

pub use error::{ReconcileError, Result};
pub use manifest::{ManifestEntry, TagManifest};
pub use outcome::{ReconcileOutcome, ReconcileStatus};
pub use revision::{Condition, Container, Revision, RevisionScaling, select_active};
pub use target::DeploymentTarget;

/// Extract the version key from an image reference or digest.
///
/// The key is the component between the first and second `:`, matching how the
/// deployed GTM image references are compared (`repo:tag-or-sha` → `tag-or-sha`,
/// `sha256:abc...` → `abc...`).
pub fn image_version_key(reference: &str) -> Result<&str> {
    reference
        .split(':')
        .nth(1)
        .ok_or_else(|| ReconcileError::malformed_image_reference(reference))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_key_from_tagged_reference() {
        let key = image_version_key("gcr.io/cloud-tagging-10302018/gtm-cloud-image:abc123");
        assert_eq!(key.unwrap(), "abc123");
    }

    #[test]
    fn version_key_from_digest() {
        let key = image_version_key("sha256:deadbeef");
        assert_eq!(key.unwrap(), "deadbeef");
    }

    #[test]
    fn version_key_requires_colon() {
        let err = image_version_key("gcr.io/project/image").unwrap_err();
        assert!(matches!(err, ReconcileError::MalformedImageReference { .. }));
    }

    #[test]
    fn version_key_takes_second_component_only() {
        // Additional colons beyond the second are not part of the key.
        assert_eq!(image_version_key("repo:a:b").unwrap(), "a");
    }
}
