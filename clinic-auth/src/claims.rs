// Access token claims.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    SuperAdmin,
    Admin,
    Staff,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

/// Who is calling, as asserted by the access token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub tenant_id: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
    /// Modules a staff member may use; admins ignore it.
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub iss: String,
    #[serde(default)]
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Claims without issuer or timestamps; `JwtVerifier::issue` fills them.
    pub fn new(
        sub: impl Into<String>,
        tenant_id: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            sub: sub.into(),
            tenant_id: tenant_id.into(),
            email: email.into(),
            name: String::new(),
            role,
            permissions: Vec::new(),
            iss: String::new(),
            iat: 0,
            exp: 0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }
}
