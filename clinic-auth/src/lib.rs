// Bearer-token authentication for the clinic API.
//
// Token problems are reported as credential failures and permission
// problems as declared 403s; rendering is left to the error normalizer.

pub mod claims;
pub mod guards;
pub mod jwt;
pub mod middleware;
pub mod options;

pub use claims::{Claims, Role};
pub use jwt::{extract_bearer_token, JwtVerifier};
pub use middleware::{admin_only, authenticate, CurrentUser};
pub use options::JwtOptions;

use clinic_core::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("JWT secret is not configured")]
    MissingSecret,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}
