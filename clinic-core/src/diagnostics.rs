//! Server-side diagnostics for normalized failures.
//!
//! The responder never logs through a global; it is handed a sink.
//! `TracingSink` is what the server runs with, `MemorySink` is for tests.

use std::sync::{Mutex, PoisonError};

use crate::classify::ErrorCode;

/// One diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticEntry {
    /// A failure was classified and is about to be sent.
    Classified {
        status: u16,
        code: ErrorCode,
        message: String,
        technical: Option<String>,
    },
    /// Classification itself failed; the fixed fallback is being sent.
    ClassifierFailure {
        status: u16,
        code: ErrorCode,
        cause: String,
        technical: Option<String>,
    },
}

impl DiagnosticEntry {
    pub fn status(&self) -> u16 {
        match self {
            DiagnosticEntry::Classified { status, .. }
            | DiagnosticEntry::ClassifierFailure { status, .. } => *status,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            DiagnosticEntry::Classified { code, .. }
            | DiagnosticEntry::ClassifierFailure { code, .. } => *code,
        }
    }
}

/// Receives one entry per normalized failure.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, entry: &DiagnosticEntry);
}

/// Writes entries as `tracing` error events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, entry: &DiagnosticEntry) {
        match entry {
            DiagnosticEntry::Classified {
                status,
                code,
                message,
                technical,
            } => {
                tracing::error!(
                    target: "clinic::errors",
                    status = *status,
                    code = %code,
                    message = %message,
                    error = technical.as_deref(),
                    "request failed"
                );
            }
            DiagnosticEntry::ClassifierFailure {
                status,
                code,
                cause,
                technical,
            } => {
                tracing::error!(
                    target: "clinic::errors",
                    status = *status,
                    code = %code,
                    cause = %cause,
                    error = technical.as_deref(),
                    "fatal error in error normalizer"
                );
            }
        }
    }
}

/// Keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<DiagnosticEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, entry: &DiagnosticEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
    }
}
