use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use clinic_core::Failure;

use crate::{ClinicAxumError, ClinicAxumState};

/// Whether the backing store is ready to serve API traffic.
///
/// Starts out unavailable; the server flips it once storage is reachable.
#[derive(Debug, Clone, Default)]
pub struct Availability(Arc<AtomicBool>);

impl Availability {
    pub fn new(ready: bool) -> Self {
        Self(Arc::new(AtomicBool::new(ready)))
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn mark_unavailable(&self) {
        self.0.store(false, Ordering::Release);
    }
}

fn bypasses_gate(path: &str) -> bool {
    !path.starts_with("/api/") || path == "/api/test" || path.starts_with("/api/diagnostic")
}

/// Reject API calls with 503 while storage is not ready.
///
/// `/api/test` and `/api/diagnostic*` stay reachable so operators can probe
/// the outage.
pub async fn require_available(
    State(state): State<ClinicAxumState>,
    request: Request,
    next: Next,
) -> Result<Response, ClinicAxumError> {
    let path = request.uri().path();
    if !state.availability.is_ready() && !bypasses_gate(path) {
        return Err(Failure::unavailable()
            .with_user_message("Banco de dados indisponível no momento")
            .with_technical_message(format!("storage not ready, rejected {path}"))
            .into());
    }
    Ok(next.run(request).await)
}
