// Axum middleware and extractor for authenticated routes.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use clinic_axum::ClinicAxumError;
use clinic_core::Failure;

use crate::{extract_bearer_token, Claims, JwtVerifier};

/// Claims of the caller, inserted by [`authenticate`].
#[derive(Clone, Debug)]
pub struct CurrentUser(pub Claims);

fn missing_token(detail: &str) -> Failure {
    Failure::invalid_token()
        .with_user_message("Token não fornecido")
        .with_technical_message(detail.to_string())
}

/// Verify the bearer token and expose the caller as [`CurrentUser`].
pub async fn authenticate(
    State(verifier): State<Arc<JwtVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ClinicAxumError> {
    let token = extract_bearer_token(request.headers())
        .ok_or_else(|| missing_token("no bearer token in Authorization header"))?;

    let claims = verifier.verify(&token)?;
    tracing::debug!(user = %claims.sub, tenant = %claims.tenant_id, "authenticated");

    request.extensions_mut().insert(CurrentUser(claims));
    Ok(next.run(request).await)
}

/// Let only admins through.
pub async fn admin_only(
    CurrentUser(user): CurrentUser,
    request: Request,
    next: Next,
) -> Result<Response, ClinicAxumError> {
    user.require_admin()?;
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ClinicAxumError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| missing_token("route reached without the authenticate middleware").into())
    }
}
