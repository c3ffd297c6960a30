use std::sync::Arc;

use clinic_core::Responder;

use crate::middlewares::availability::Availability;

/// State shared by the error-handling middleware.
#[derive(Debug, Clone)]
pub struct ClinicAxumState {
    pub responder: Arc<Responder>,
    pub availability: Availability,
}

impl ClinicAxumState {
    pub fn new(responder: Responder) -> Self {
        Self {
            responder: Arc::new(responder),
            availability: Availability::default(),
        }
    }
}
