use std::any::Any;

use axum::response::{IntoResponse, Response};
use clinic_core::Failure;

use crate::ClinicAxumError;

/// `CatchPanicLayer` handler: a panicking handler becomes an ordinary
/// failure so the normalizer still answers it.
pub fn capture_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "panic with a non-string payload".to_string()
    };

    tracing::warn!(panic = %detail, "handler panicked");

    ClinicAxumError::from(Failure::named("Panic").with_technical_message(detail)).into_response()
}
