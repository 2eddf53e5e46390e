use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::error;

use super::classifier::RiskModelError;
use super::domain::catalog;
use super::history::SessionId;
use super::notifier::MailTransport;
use super::service::{AssessmentError, AssessmentRequest, AssessmentService};

/// Router builder exposing the catalog, submission and history endpoints.
pub fn assessment_router<T>(service: Arc<AssessmentService<T>>) -> Router
where
    T: MailTransport + 'static,
{
    Router::new()
        .route("/api/v1/assessments", get(catalog_handler))
        .route(
            "/api/v1/sessions/:session_id/assessments",
            post(assess_handler::<T>),
        )
        .route(
            "/api/v1/sessions/:session_id/history",
            get(history_handler::<T>).delete(end_session_handler::<T>),
        )
        .with_state(service)
}

pub(crate) async fn catalog_handler() -> Response {
    (StatusCode::OK, axum::Json(catalog())).into_response()
}

pub(crate) async fn assess_handler<T>(
    State(service): State<Arc<AssessmentService<T>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<AssessmentRequest>,
) -> Response
where
    T: MailTransport + 'static,
{
    let session = SessionId(session_id);
    // Report delivery blocks on SMTP.
    let outcome =
        tokio::task::spawn_blocking(move || service.assess(&session, request)).await;

    match outcome {
        Ok(Ok(report)) => (StatusCode::OK, axum::Json(report)).into_response(),
        Ok(Err(AssessmentError::Model(RiskModelError::Incomplete(err)))) => {
            let payload = json!({
                "error": err.to_string(),
                "missing": err.missing,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Ok(Err(other)) => {
            error!(error = %other, "assessment failed");
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        Err(join_error) => {
            error!(error = %join_error, "assessment task aborted");
            let payload = json!({
                "error": "assessment task aborted",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn history_handler<T>(
    State(service): State<Arc<AssessmentService<T>>>,
    Path(session_id): Path<String>,
) -> Response
where
    T: MailTransport + 'static,
{
    let session = SessionId(session_id);
    let entries = service.history(&session);
    let payload = json!({
        "session_id": session.0,
        "entries": entries,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn end_session_handler<T>(
    State(service): State<Arc<AssessmentService<T>>>,
    Path(session_id): Path<String>,
) -> Response
where
    T: MailTransport + 'static,
{
    let session = SessionId(session_id);
    let cleared = service.end_session(&session);
    let payload = json!({
        "session_id": session.0,
        "cleared": cleared,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
