//! clinic-axum: Axum adapter for the clinic error normalizer.
//!
//! Handlers return `Result<_, ClinicAxumError>`; the normalization
//! middleware installed by [`ClinicApp::into_router`] renders every failure
//! exactly once.

pub mod app;
pub mod extract;
pub mod middlewares;
pub mod state;
mod error;

pub use error::{ClinicAxumError, PendingFailure};
pub use extract::JsonBody;
pub use state::ClinicAxumState;

pub use app::ClinicApp;

pub use axum;
