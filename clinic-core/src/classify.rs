//! # Error normalization
//!
//! Turns one [`Failure`] into one [`NormalizedError`]: a status from a
//! fixed set, a code from a closed vocabulary, a message that is safe to
//! show, and field details for validation and uniqueness failures.
//!
//! [`classify`] is the pure rule chain. [`Responder`] wraps it with the
//! mandatory diagnostic record and the fallback used when the failure is too
//! malformed to classify.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::diagnostics::{DiagnosticEntry, DiagnosticSink, TracingSink};
use crate::errors::{Failure, FailureKind, FieldError};
use crate::messages::MessageCatalog;

/// Every status a normalized response can carry.
pub const STATUS_SET: [u16; 7] = [400, 401, 403, 404, 409, 500, 503];

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationError,
    UniqueConstraint,
    AuthTokenError,
    AccessDenied,
    NotFound,
    ServiceUnavailable,
    UnexpectedError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 7] = [
        ErrorCode::ValidationError,
        ErrorCode::UniqueConstraint,
        ErrorCode::AuthTokenError,
        ErrorCode::AccessDenied,
        ErrorCode::NotFound,
        ErrorCode::ServiceUnavailable,
        ErrorCode::UnexpectedError,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "validation_error",
            ErrorCode::UniqueConstraint => "unique_constraint",
            ErrorCode::AuthTokenError => "auth_token_error",
            ErrorCode::AccessDenied => "access_denied",
            ErrorCode::NotFound => "not_found",
            ErrorCode::ServiceUnavailable => "service_unavailable",
            ErrorCode::UnexpectedError => "unexpected_error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The externally visible error.
///
/// `status` travels in the status line; the body is
/// `{"error", "code", "details"?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedError {
    #[serde(skip)]
    pub status: u16,
    pub error: String,
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl NormalizedError {
    /// The response sent when classification itself failed.
    pub fn fallback(catalog: &MessageCatalog) -> Self {
        Self {
            status: 500,
            error: catalog.fatal.to_string(),
            code: ErrorCode::UnexpectedError,
            details: None,
        }
    }
}

/// Why a failure could not be classified.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("field errors must be a list, got {found}")]
    MalformedFieldErrors { found: &'static str },

    #[error("field error #{index} is malformed: {reason}")]
    MalformedFieldError { index: usize, reason: &'static str },
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn field_error(index: usize, item: &Value) -> Result<FieldError, ClassifyError> {
    let obj = item.as_object().ok_or(ClassifyError::MalformedFieldError {
        index,
        reason: "not an object",
    })?;

    // Persistence errors name the column `path`.
    let field = obj
        .get("field")
        .or_else(|| obj.get("path"))
        .and_then(Value::as_str)
        .ok_or(ClassifyError::MalformedFieldError {
            index,
            reason: "missing field name",
        })?;
    let message = obj
        .get("message")
        .and_then(Value::as_str)
        .ok_or(ClassifyError::MalformedFieldError {
            index,
            reason: "missing message",
        })?;

    Ok(FieldError::new(field, message))
}

fn field_details(errors: Option<&Value>) -> Result<Vec<FieldError>, ClassifyError> {
    match errors {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(index, item)| field_error(index, item))
            .collect(),
        Some(other) => Err(ClassifyError::MalformedFieldErrors {
            found: json_type(other),
        }),
    }
}

/// Classify a failure. Pure: no logging, no shared state.
///
/// Named kinds win over the declared status; the declared status only picks
/// the code for failures of any other kind.
pub fn classify(
    failure: &Failure,
    catalog: &MessageCatalog,
) -> Result<NormalizedError, ClassifyError> {
    let mut status = failure
        .declared_status
        .filter(|s| STATUS_SET.contains(s))
        .unwrap_or(500);
    let mut code = ErrorCode::UnexpectedError;
    let mut message = catalog.generic;
    let mut details = None;

    if failure.kind.carries_details() {
        details = Some(field_details(failure.field_errors.as_ref())?);
    }

    match &failure.kind {
        FailureKind::Validation => {
            status = 400;
            code = ErrorCode::ValidationError;
            message = catalog.validation;
        }
        FailureKind::UniqueConstraint => {
            status = 409;
            code = ErrorCode::UniqueConstraint;
            message = catalog.duplicate;
        }
        kind if kind.is_credential() => {
            status = 401;
            code = ErrorCode::AuthTokenError;
            message = catalog.session_expired;
        }
        _ => match status {
            403 => {
                code = ErrorCode::AccessDenied;
                message = catalog.access_denied;
            }
            404 => {
                code = ErrorCode::NotFound;
                message = catalog.not_found;
            }
            503 => {
                code = ErrorCode::ServiceUnavailable;
                message = catalog.unavailable;
            }
            _ => {}
        },
    }

    let error = match failure.user_message.as_deref() {
        Some(custom) if !custom.trim().is_empty() => custom.to_string(),
        _ => message.to_string(),
    };

    Ok(NormalizedError {
        status,
        error,
        code,
        details,
    })
}

/// Classifies failures and records one diagnostic entry per call.
#[derive(Clone)]
pub struct Responder {
    catalog: MessageCatalog,
    sink: Arc<dyn DiagnosticSink>,
}

impl Responder {
    pub fn new(catalog: MessageCatalog, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { catalog, sink }
    }

    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    /// Normalize a failure. Never fails: a failure that cannot be classified
    /// gets the fixed fallback and a separate diagnostic entry.
    pub fn respond(&self, failure: &Failure) -> NormalizedError {
        let technical = failure.technical_detail();

        match classify(failure, &self.catalog) {
            Ok(normalized) => {
                self.sink.record(&DiagnosticEntry::Classified {
                    status: normalized.status,
                    code: normalized.code,
                    message: normalized.error.clone(),
                    technical,
                });
                normalized
            }
            Err(cause) => {
                let fallback = NormalizedError::fallback(&self.catalog);
                self.sink.record(&DiagnosticEntry::ClassifierFailure {
                    status: fallback.status,
                    code: fallback.code,
                    cause: cause.to_string(),
                    technical,
                });
                fallback
            }
        }
    }
}

impl Default for Responder {
    fn default() -> Self {
        Self::new(MessageCatalog::default(), Arc::new(TracingSink))
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("locale", &self.catalog.locale)
            .finish_non_exhaustive()
    }
}
