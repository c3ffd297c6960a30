mod app;
mod services;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use clinic_auth::{JwtOptions, JwtVerifier};
use clinic_axum::ClinicApp;
use clinic_core::ClinicConfigSnapshot;

pub use services::documents::is_valid_cpf;
pub use services::pacientes::{NewPatient, Patient, PatientStore};

/// `http.host:http.port`. A malformed port is an error, not the default.
pub fn listen_addr(config: &ClinicConfigSnapshot) -> Result<String> {
    let host = config.get("http.host").unwrap_or("127.0.0.1");
    let port = config.parse::<u16>("http.port")?.unwrap_or(3000);
    Ok(format!("{host}:{port}"))
}

/// Assemble the API. Storage starts out unavailable; call
/// `availability().mark_ready()` once it can serve traffic.
pub fn build(config: &ClinicConfigSnapshot) -> Result<ClinicApp> {
    let app = app::clinic_app(config)?;
    let verifier = Arc::new(JwtVerifier::new(JwtOptions::from_config(config)?)?);
    let store = Arc::new(PatientStore::default());

    let api = Router::new()
        .merge(app::diagnostics(app.availability()))
        .merge(services::pacientes::router(store, verifier));

    Ok(app.route_get("/health", || async { "ok" }).nest("/api", api))
}
