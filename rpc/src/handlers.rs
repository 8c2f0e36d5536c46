//! RPC request handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tally_types::ProjectId;
use tally_voting::VoteRequest;
use tracing::debug;

use crate::error::{error_body, message_body, rejection_reason};
use crate::server::RpcState;

/// `POST /api/projects/{projectId}/vote`
pub async fn cast_vote(
    State(state): State<Arc<RpcState>>,
    Path(project_id): Path<String>,
    body: Result<Json<VoteRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            debug!(%rejection, "unreadable vote body");
            state
                .metrics
                .votes_rejected
                .with_label_values(&["malformed"])
                .inc();
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(message_body(&rejection.body_text(), None)),
            )
                .into_response();
        }
    };

    let project_id = ProjectId::new(project_id);
    match state.service.cast_vote(&project_id, request).await {
        Ok(project) => {
            state.metrics.votes_accepted.inc();
            Json(json!({ "success": true, "project": project })).into_response()
        }
        Err(err) => {
            debug!(project = %project_id, error = %err, "vote rejected");
            state
                .metrics
                .votes_rejected
                .with_label_values(&[rejection_reason(&err)])
                .inc();
            let (status, body) = error_body(&err);
            (status, Json(body)).into_response()
        }
    }
}

/// Any other method on the vote route.
pub async fn method_not_allowed(method: Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(message_body(&format!("Method {method} Not Allowed!"), None)),
    )
        .into_response()
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(message_body("Not Found", None))).into_response()
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /metrics`
pub async fn metrics(State(state): State<Arc<RpcState>>) -> Response {
    match state.metrics.encode() {
        Ok(text) => (
            [("content-type", "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
