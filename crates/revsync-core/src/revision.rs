use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Condition type marking the revision that currently serves traffic.
pub const CONDITION_ACTIVE: &str = "Active";

/// Condition state reported once a condition has succeeded.
pub const CONDITION_SUCCEEDED: &str = "CONDITION_SUCCEEDED";

/// A point-in-time deployment record of a Cloud Run service, as returned by the
/// Cloud Run Admin API v2. Owned and mutated exclusively by the revision
/// directory; the reconciler only reads it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Revision {
    pub name: String,

    #[serde(with = "time::serde::rfc3339::option")]
    pub create_time: Option<OffsetDateTime>,

    pub conditions: Vec<Condition>,
    pub containers: Vec<Container>,
    pub scaling: RevisionScaling,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

impl Revision {
    /// True when the condition set contains an `Active` condition in the
    /// succeeded state.
    pub fn is_active(&self) -> bool {
        self.conditions
            .iter()
            .any(|c| c.condition_type == CONDITION_ACTIVE && c.state == CONDITION_SUCCEEDED)
    }
}

/// A single status condition on a revision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub state: String,
}

impl Condition {
    pub fn new(condition_type: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            condition_type: condition_type.into(),
            state: state.into(),
        }
    }
}

/// Container specification of a revision.
///
/// Env, resources and probes are carried as opaque JSON: the reconciler copies
/// them verbatim into the replacement revision and never interprets them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Container {
    pub image: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub liveness_probe: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup_probe: Option<Value>,
}

/// Min/max instance bounds of a revision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevisionScaling {
    pub min_instance_count: i32,
    pub max_instance_count: i32,
}

/// Select the active revision from a fully-drained listing.
///
/// The last revision in scan order carrying an `Active`/succeeded condition wins.
/// The API does not guarantee the listing is sorted by recency, so last-wins on
/// raw listing order is a latent ambiguity; `sort_by_create_time` resolves it by
/// ordering on creation time first. It defaults to off in the server config to
/// keep the historical behavior.
pub fn select_active(revisions: &[Revision], sort_by_create_time: bool) -> Option<&Revision> {
    if sort_by_create_time {
        let mut ordered: Vec<&Revision> = revisions.iter().collect();
        ordered.sort_by_key(|r| r.create_time);
        ordered.into_iter().filter(|r| r.is_active()).next_back()
    } else {
        revisions.iter().filter(|r| r.is_active()).next_back()
    }
}
