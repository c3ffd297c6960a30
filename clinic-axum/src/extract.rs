use axum::extract::FromRequest;

use crate::ClinicAxumError;

/// `Json` extractor whose rejection is a validation failure.
///
/// A body that is not valid JSON, or not the expected shape, answers
/// `400 validation_error` with a `_schema` detail.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ClinicAxumError))]
pub struct JsonBody<T>(pub T);
