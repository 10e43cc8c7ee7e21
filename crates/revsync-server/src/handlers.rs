use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

use revsync_core::DeploymentTarget;

use crate::error::ApiError;
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "revsync",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

/// POST /reconcile — the single trigger endpoint.
///
/// Requires non-empty string fields `project_id`, `region` and `service_name`.
/// A missing or malformed body is rejected with the fixed error payload before
/// any outbound call is made; this mirrors the reference contract, fixed 500
/// body included.
pub async fn reconcile(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(target) = serde_json::from_slice::<Value>(&body)
        .ok()
        .as_ref()
        .and_then(target_from_body)
    else {
        return missing_fields_response();
    };

    tracing::info!(
        project_id = %target.project_id,
        region = %target.region,
        service_name = %target.service_name,
        "reconciliation requested"
    );

    match state.reconciler.reconcile(&target).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "reconciliation failed");
            ApiError(err).into_response()
        }
    }
}

fn target_from_body(body: &Value) -> Option<DeploymentTarget> {
    let field = |name: &str| {
        body.get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    Some(DeploymentTarget {
        project_id: field("project_id")?,
        region: field("region")?,
        service_name: field("service_name")?,
    })
}

fn missing_fields_response() -> Response {
    let body = json!({
        "success": "false",
        "message": "Wrong / Missing request body",
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_requires_all_fields_non_empty() {
        let full = json!({"project_id": "p", "region": "r", "service_name": "s"});
        assert!(target_from_body(&full).is_some());

        for missing in ["project_id", "region", "service_name"] {
            let mut body = full.clone();
            body.as_object_mut().unwrap().remove(missing);
            assert!(target_from_body(&body).is_none(), "missing {missing}");

            let mut body = full.clone();
            body[missing] = json!("");
            assert!(target_from_body(&body).is_none(), "empty {missing}");
        }
    }

    #[test]
    fn non_string_fields_are_rejected() {
        let body = json!({"project_id": 42, "region": "r", "service_name": "s"});
        assert!(target_from_body(&body).is_none());
    }
}
