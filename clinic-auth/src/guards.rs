// Role, permission and tenant checks.

use clinic_core::Failure;

use crate::Claims;

fn denied(message: impl Into<String>) -> Failure {
    Failure::forbidden().with_user_message(message)
}

impl Claims {
    pub fn require_admin(&self) -> Result<(), Failure> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(denied("Acesso negado. Apenas administradores.")
                .with_technical_message(format!("user {} is not an admin", self.sub)))
        }
    }

    pub fn require_super_admin(&self) -> Result<(), Failure> {
        if self.role == crate::Role::SuperAdmin {
            Ok(())
        } else {
            Err(denied("Acesso negado. Apenas Super Administradores.")
                .with_technical_message(format!("user {} is not a super admin", self.sub)))
        }
    }

    /// Admins reach every module; everyone else needs the permission.
    pub fn require_permission(&self, module: &str) -> Result<(), Failure> {
        if self.role.is_admin() || self.permissions.iter().any(|p| p == module) {
            Ok(())
        } else {
            Err(denied(format!(
                "Acesso negado. Você não tem permissão para acessar o módulo: {module}"
            ))
            .with_technical_message(format!("user {} lacks permission {module}", self.sub)))
        }
    }

    /// A resource naming another tenant is off limits. `None` means the
    /// resource does not say, which is allowed.
    pub fn check_tenant_ownership(&self, resource_tenant: Option<&str>) -> Result<(), Failure> {
        match resource_tenant {
            Some(tenant) if tenant != self.tenant_id => Err(denied(
                "Acesso negado. Recurso não pertence à sua empresa.",
            )
            .with_technical_message(format!(
                "user {} of tenant {} touched tenant {tenant}",
                self.sub, self.tenant_id
            ))),
            _ => Ok(()),
        }
    }
}
