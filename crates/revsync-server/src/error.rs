//! Boundary mapping from reconciliation errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use revsync_core::ReconcileError;

/// Wrapper giving `ReconcileError` an HTTP representation.
///
/// The reference implementation let failures escape the async handler uncaught;
/// here every error kind is mapped explicitly: upstream collaborator failures
/// become 502, deployment-state and parse failures become 500.
#[derive(Debug)]
pub struct ApiError(pub ReconcileError);

impl From<ReconcileError> for ApiError {
    fn from(err: ReconcileError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_upstream() {
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = json!({
            "success": "false",
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
