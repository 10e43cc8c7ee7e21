use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Registry tag marking the currently recommended image version.
pub const STABLE_TAG: &str = "stable";

/// The registry's published mapping of image digests to tag metadata, as
/// returned by a `tags/list` endpoint.
///
/// Entry iteration preserves document order: the registry does not guarantee a
/// stable ordering, and "first stable entry wins" is defined over whatever order
/// the registry emitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagManifest {
    pub manifest: IndexMap<String, ManifestEntry>,
}

/// Per-digest metadata inside a tag manifest. Fields other than the tag list are
/// irrelevant to reconciliation and are ignored on decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestEntry {
    pub tag: Vec<String>,
}

impl TagManifest {
    /// The first entry in document order whose tag list contains `stable`,
    /// as `(digest, entry)`.
    pub fn stable_entry(&self) -> Option<(&str, &ManifestEntry)> {
        self.manifest
            .iter()
            .find(|(_, entry)| entry.tag.iter().any(|t| t == STABLE_TAG))
            .map(|(digest, entry)| (digest.as_str(), entry))
    }

    /// Version key of the stable entry: the portion of its digest after the
    /// first `:` (`sha256:abc...` → `abc...`).
    ///
    /// `None` when no entry carries the stable tag (or the digest has no colon);
    /// the comparison downstream then always differs and an update is issued.
    pub fn stable_version_key(&self) -> Option<&str> {
        self.stable_entry()
            .and_then(|(digest, _)| digest.split(':').nth(1))
    }
}
