use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use clinic_core::errors::{Failure, FieldError};

/// Error type returned by handlers and middleware.
///
/// Rendering is deferred: the failure is parked in the response extensions
/// and `normalize_errors` turns it into the final body.
#[derive(Debug)]
pub struct ClinicAxumError(pub anyhow::Error);

/// A failure waiting for the normalization middleware.
#[derive(Debug, Clone)]
pub struct PendingFailure(pub Arc<Failure>);

impl From<anyhow::Error> for ClinicAxumError {
    fn from(e: anyhow::Error) -> Self {
        Self(e)
    }
}

impl From<Failure> for ClinicAxumError {
    fn from(f: Failure) -> Self {
        Self(f.into_anyhow())
    }
}

impl From<JsonRejection> for ClinicAxumError {
    fn from(rejection: JsonRejection) -> Self {
        Failure::validation()
            .with_fields([FieldError::new("_schema", "JSON inválido")])
            .with_technical_message(rejection.body_text())
            .into()
    }
}

impl IntoResponse for ClinicAxumError {
    fn into_response(self) -> Response {
        let failure = Failure::normalize(self.0);
        let mut res = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        res.extensions_mut()
            .insert(PendingFailure(Arc::new(failure)));
        res
    }
}
