use anyhow::Result;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use clinic_axum::middlewares::Availability;
use clinic_axum::{ClinicApp, ClinicAxumError};
use clinic_core::{ClinicConfigSnapshot, Failure};
use serde_json::{json, Value};

pub fn clinic_app(config: &ClinicConfigSnapshot) -> Result<ClinicApp> {
    let app = ClinicApp::from_config(config)?;
    tracing::info!(locale = app.responder().catalog().locale.tag(), "error messages configured");
    Ok(app)
}

/// Routes that stay reachable while storage is down.
pub fn diagnostics(availability: Availability) -> Router {
    Router::new()
        .route("/test", get(|| async { Json(json!({"ok": true, "message": "API online"})) }))
        .route("/diagnostic/db-check", get(db_check))
        .with_state(availability)
}

async fn db_check(State(availability): State<Availability>) -> Result<Json<Value>, ClinicAxumError> {
    if !availability.is_ready() {
        return Err(Failure::unavailable()
            .with_user_message("Banco de dados indisponível no momento")
            .with_technical_message("db-check: storage not ready")
            .into());
    }
    Ok(Json(json!({"ok": true, "storage": "memory"})))
}
