// Token options.

use clinic_core::ClinicConfigSnapshot;

use crate::AuthError;

/// HMAC settings for access tokens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JwtOptions {
    pub secret: String,
    pub issuer: String,
    pub ttl_seconds: u64,
}

impl JwtOptions {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            issuer: "clinic".to_string(),
            ttl_seconds: 24 * 60 * 60,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Read `auth.jwt.secret` (required), `auth.jwt.issuer` and
    /// `auth.jwt.ttl_seconds`.
    pub fn from_config(config: &ClinicConfigSnapshot) -> Result<Self, AuthError> {
        let mut options = Self::new(config.require("auth.jwt.secret")?);
        if let Some(issuer) = config.get_string("auth.jwt.issuer") {
            options.issuer = issuer;
        }
        if let Some(ttl) = config.parse::<u64>("auth.jwt.ttl_seconds")? {
            options.ttl_seconds = ttl;
        }
        Ok(options)
    }
}
