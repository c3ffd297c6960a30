//! clinic-core: transport-agnostic error normalization for the clinic API.
//!
//! Every failure raised while handling a request ends up in
//! [`Responder::respond`], which classifies it into a [`NormalizedError`]
//! and records one diagnostic entry.

pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod messages;

pub use classify::{classify, ClassifyError, ErrorCode, NormalizedError, Responder, STATUS_SET};
pub use config::{ClinicConfig, ClinicConfigSnapshot, ConfigError};
pub use diagnostics::{DiagnosticEntry, DiagnosticSink, MemorySink, TracingSink};
pub use errors::{ClinicResult, Failure, FailureKind, FieldError};
pub use messages::{Locale, MessageCatalog};
