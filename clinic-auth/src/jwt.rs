// JWT signing and verification.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::Utc;
use clinic_core::Failure;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::{AuthError, Claims, JwtOptions};

/// Pull the token out of `Authorization: Bearer <token>`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let v = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = v.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Signs and verifies HS256 access tokens.
pub struct JwtVerifier {
    options: JwtOptions,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(options: JwtOptions) -> Result<Self, AuthError> {
        if options.secret.trim().is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[options.issuer.as_str()]);

        Ok(Self {
            encoding: EncodingKey::from_secret(options.secret.as_bytes()),
            decoding: DecodingKey::from_secret(options.secret.as_bytes()),
            validation,
            options,
        })
    }

    /// Stamp issuer and lifetime onto `claims` and sign them.
    pub fn issue(&self, mut claims: Claims) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.options.ttl_seconds).unwrap_or(i64::MAX);
        claims.iss = self.options.issuer.clone();
        claims.iat = now;
        claims.exp = now.saturating_add(ttl);
        self.sign(&claims)
    }

    /// Sign claims as they are.
    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding)?)
    }

    /// Verify a token. Failures come back as credential failures so the
    /// normalizer answers them with `401 auth_token_error`.
    pub fn verify(&self, token: &str) -> Result<Claims, Failure> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                JwtErrorKind::ExpiredSignature => Failure::expired_token()
                    .with_user_message("Token expirado")
                    .with_technical_message(e.to_string()),
                _ => Failure::invalid_token()
                    .with_user_message("Token inválido")
                    .with_technical_message(e.to_string()),
            })
    }
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("issuer", &self.options.issuer)
            .field("ttl_seconds", &self.options.ttl_seconds)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use clinic_core::FailureKind;

    use super::*;
    use crate::Role;

    fn verifier() -> JwtVerifier {
        JwtVerifier::new(JwtOptions::new("test-secret").with_issuer("clinic-test")).unwrap()
    }

    fn staff() -> Claims {
        Claims::new("u-1", "empresa-1", "ana@clinica.com.br", Role::Staff)
            .with_permissions(["pacientes"])
    }

    #[test]
    fn issued_tokens_verify() {
        let v = verifier();
        let token = v.issue(staff()).unwrap();
        let claims = v.verify(&token).unwrap();
        assert_eq!(claims.sub, "u-1");
        assert_eq!(claims.iss, "clinic-test");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_tokens_are_expired_token_failures() {
        let v = verifier();
        let now = Utc::now().timestamp();
        let mut claims = staff();
        claims.iss = "clinic-test".to_string();
        claims.iat = now - 7200;
        claims.exp = now - 3600;
        let token = v.sign(&claims).unwrap();

        let failure = v.verify(&token).unwrap_err();
        assert_eq!(failure.kind, FailureKind::ExpiredToken);
        assert_eq!(failure.user_message.as_deref(), Some("Token expirado"));
    }

    #[test]
    fn foreign_signatures_are_invalid_token_failures() {
        let other = JwtVerifier::new(JwtOptions::new("other-secret").with_issuer("clinic-test")).unwrap();
        let token = other.issue(staff()).unwrap();

        let failure = verifier().verify(&token).unwrap_err();
        assert_eq!(failure.kind, FailureKind::InvalidToken);
        assert!(failure.technical_message.is_some());

        let failure = verifier().verify("not.a.jwt").unwrap_err();
        assert_eq!(failure.kind, FailureKind::InvalidToken);
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let other = JwtVerifier::new(JwtOptions::new("test-secret").with_issuer("elsewhere")).unwrap();
        let token = other.issue(staff()).unwrap();
        assert_eq!(verifier().verify(&token).unwrap_err().kind, FailureKind::InvalidToken);
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(
            JwtVerifier::new(JwtOptions::new(" ")),
            Err(AuthError::MissingSecret)
        ));
    }

    #[test]
    fn bearer_tokens_are_extracted() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
