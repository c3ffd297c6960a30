//! # Failures
//!
//! A `Failure` is whatever went wrong while a request was being handled,
//! described by the capabilities the error normalizer understands:
//! - a kind (discriminator)
//! - an optional declared HTTP status
//! - optional per-field sub-errors
//! - an optional user-facing message override
//! - an optional technical message (never shown to clients)
//!
//! Failures can be carried through `anyhow::Error`, so handlers keep using
//! `?` and the transport decides how to serialize them.

use std::fmt;

use anyhow::Error as AnyError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A convenience result type for handlers that may fail with a `Failure`.
pub type ClinicResult<T> = std::result::Result<T, AnyError>;

/// Discriminator of a failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Persistence-side validation rejected the record.
    Validation,
    /// A uniqueness constraint was violated.
    UniqueConstraint,
    /// Malformed, forged or missing credential.
    InvalidToken,
    /// Credential was well formed but has expired.
    ExpiredToken,
    /// Anything else, named by its producer.
    Other(String),
}

impl FailureKind {
    /// Map an upstream error name onto a kind.
    ///
    /// Names come from the persistence and token libraries the API used to
    /// surface directly; unknown names are kept verbatim.
    pub fn from_name(name: &str) -> Self {
        match name {
            "SequelizeValidationError" | "ValidationError" => FailureKind::Validation,
            "SequelizeUniqueConstraintError" | "UniqueConstraintError" => {
                FailureKind::UniqueConstraint
            }
            "JsonWebTokenError" => FailureKind::InvalidToken,
            "TokenExpiredError" => FailureKind::ExpiredToken,
            other => FailureKind::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FailureKind::Validation => "ValidationError",
            FailureKind::UniqueConstraint => "UniqueConstraintError",
            FailureKind::InvalidToken => "JsonWebTokenError",
            FailureKind::ExpiredToken => "TokenExpiredError",
            FailureKind::Other(name) => name,
        }
    }

    pub fn is_credential(&self) -> bool {
        matches!(self, FailureKind::InvalidToken | FailureKind::ExpiredToken)
    }

    /// Kinds whose responses carry field-level details.
    pub fn carries_details(&self) -> bool {
        matches!(self, FailureKind::Validation | FailureKind::UniqueConstraint)
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One `{field, message}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A failure raised anywhere in the request pipeline.
///
/// `field_errors` stays loosely typed: producers hand over whatever their
/// library reported and the classifier checks the shape.
#[derive(Debug)]
pub struct Failure {
    pub kind: FailureKind,
    pub declared_status: Option<u16>,
    pub field_errors: Option<Value>,
    pub user_message: Option<String>,
    pub technical_message: Option<String>,
    pub source: Option<AnyError>,
}

impl Failure {
    pub fn new(kind: FailureKind) -> Self {
        Self {
            kind,
            declared_status: None,
            field_errors: None,
            user_message: None,
            technical_message: None,
            source: None,
        }
    }

    /// Build a failure from an upstream error name.
    pub fn named(name: &str) -> Self {
        Self::new(FailureKind::from_name(name))
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.declared_status = Some(status);
        self
    }

    pub fn with_field_errors(mut self, errors: Value) -> Self {
        self.field_errors = Some(errors);
        self
    }

    /// Attach well-formed field errors.
    pub fn with_fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = FieldError>,
    {
        let list = fields
            .into_iter()
            .map(|f| serde_json::json!({ "field": f.field, "message": f.message }))
            .collect();
        self.field_errors = Some(Value::Array(list));
        self
    }

    pub fn with_user_message(mut self, message: impl Into<String>) -> Self {
        self.user_message = Some(message.into());
        self
    }

    pub fn with_technical_message(mut self, message: impl Into<String>) -> Self {
        self.technical_message = Some(message.into());
        self
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    /// Text for the server log: the technical message, else the source chain.
    pub fn technical_detail(&self) -> Option<String> {
        self.technical_message
            .clone()
            .or_else(|| self.source.as_ref().map(|e| format!("{e:#}")))
    }

    /// Convert into `anyhow::Error` so it flows through `?`.
    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Find a `Failure` anywhere in an `anyhow::Error` chain.
    pub fn from_anyhow(err: &AnyError) -> Option<&Failure> {
        err.chain().find_map(|e| e.downcast_ref::<Failure>())
    }

    /// Turn any error into a Failure:
    /// - if it's already a Failure, keep it (lossless)
    /// - otherwise wrap it as an unnamed internal failure
    pub fn normalize(err: AnyError) -> Failure {
        match err.downcast::<Failure>() {
            Ok(failure) => failure,
            Err(other) => Failure::new(FailureKind::Other("Error".to_string()))
                .with_technical_message(format!("{other:#}"))
                .with_source(other),
        }
    }

    // ---- Constructors ----

    pub fn validation() -> Self {
        Self::new(FailureKind::Validation)
    }
    pub fn unique_constraint() -> Self {
        Self::new(FailureKind::UniqueConstraint)
    }
    pub fn invalid_token() -> Self {
        Self::new(FailureKind::InvalidToken)
    }
    pub fn expired_token() -> Self {
        Self::new(FailureKind::ExpiredToken)
    }
    pub fn forbidden() -> Self {
        Self::new(FailureKind::Other("Forbidden".to_string())).with_status(403)
    }
    pub fn not_found() -> Self {
        Self::new(FailureKind::Other("NotFound".to_string())).with_status(404)
    }
    pub fn unavailable() -> Self {
        Self::new(FailureKind::Other("Unavailable".to_string())).with_status(503)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(status) = self.declared_status {
            write!(f, " ({status})")?;
        }
        if let Some(text) = self.technical_message.as_ref().or(self.user_message.as_ref()) {
            write!(f, ": {text}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| {
            let e: &(dyn std::error::Error + 'static) = e.as_ref();
            e
        })
    }
}

/// Convenience helper for "bail with a Failure".
#[macro_export]
macro_rules! bail_failure {
    ($ctor:ident) => {
        return Err($crate::errors::Failure::$ctor().into_anyhow());
    };
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::Failure::$ctor()
            .with_user_message($msg)
            .into_anyhow());
    };
}
