//! Terminal stage of the request pipeline.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use clinic_core::NormalizedError;

use crate::{error::PendingFailure, ClinicAxumState};

/// Render a normalized error as `status + JSON body`.
pub fn render(normalized: &NormalizedError) -> Response {
    let status =
        StatusCode::from_u16(normalized.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(normalized)).into_response()
}

/// Replace any response carrying a [`PendingFailure`] with its normalized
/// form. Every other response passes through untouched.
pub async fn normalize_errors(
    State(state): State<ClinicAxumState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    match response.extensions().get::<PendingFailure>().cloned() {
        Some(PendingFailure(failure)) => render(&state.responder.respond(&failure)),
        None => response,
    }
}
