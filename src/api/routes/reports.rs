//! Report handlers.

use super::EmailReportResponse;
use crate::api::AppState;
use crate::types::SessionId;
use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// GET /sessions/:id/report - Download the full report
#[utoipa::path(
    get,
    path = "/api/v1/sessions/{id}/report",
    tag = "reports",
    params(
        ("id" = String, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "PDF report as an attachment", content_type = "application/pdf"),
        (status = 400, description = "Missing or malformed session ID", body = crate::error::ApiError),
        (status = 404, description = "Session not found", body = crate::error::ApiError),
        (status = 500, description = "Session data could not be read or a page failed to render", body = crate::error::ApiError)
    )
)]
pub async fn download_report(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let session_id = match SessionId::parse(&id) {
        Ok(session_id) => session_id,
        Err(e) => return e.into_response(),
    };

    tracing::info!(session_id = %session_id, "Received request to generate report");

    match state.reporter.generate_report(&session_id).await {
        Ok(document) => {
            let disposition = format!(
                "attachment; filename=quiz_report_session_{}.pdf",
                session_id
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                document,
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "Failed to generate report");
            e.into_response()
        }
    }
}

/// POST /sessions/:id/email-report - Email the report in parts
#[utoipa::path(
    post,
    path = "/api/v1/sessions/{id}/email-report",
    tag = "reports",
    params(
        ("id" = String, Path, description = "Session ID")
    ),
    responses(
        (status = 202, description = "Every part was handed to the mail transport (some may have failed)", body = EmailReportResponse),
        (status = 400, description = "Missing or malformed session ID", body = crate::error::ApiError),
        (status = 404, description = "Session not found", body = crate::error::ApiError),
        (status = 500, description = "Session data could not be read", body = crate::error::ApiError)
    )
)]
pub async fn email_report(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let session_id = match SessionId::parse(&id) {
        Ok(session_id) => session_id,
        Err(e) => return e.into_response(),
    };

    tracing::info!(session_id = %session_id, "Received request to email report");

    match state.reporter.send_report(&session_id).await {
        Ok(summary) => {
            let failed_pages = summary.failures.iter().map(|f| f.page_number).collect();
            (
                StatusCode::ACCEPTED,
                Json(EmailReportResponse {
                    message: format!(
                        "Detailed quiz report for session {} is being sent in parts.",
                        session_id
                    ),
                    pages: summary.pages,
                    delivered: summary.delivered,
                    failed: summary.failed,
                    failed_pages,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(session_id = %session_id, error = %e, "Failed to process email request");
            e.into_response()
        }
    }
}
