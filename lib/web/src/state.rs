//! Per-process authentication state.

use crate::caller::Caller;
use crate::error::ApiError;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use coursephase_access::{AuthenticationError, Credential, RoleResolver, TokenVerifier};

/// Startup-initialized, read-only verification state.
///
/// Built once in `main` and shared behind an `Arc`; nothing in it changes
/// while the process runs.
pub struct AuthState {
    verifier: TokenVerifier,
    resolver: RoleResolver,
}

impl AuthState {
    #[must_use]
    pub fn new(verifier: TokenVerifier, resolver: RoleResolver) -> Self {
        Self { verifier, resolver }
    }

    /// Verifies the request's bearer token and resolves the caller.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` for a missing, malformed, or rejected token;
    /// `Forbidden` if the token's role claim is inconsistent with its audience.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Caller, ApiError> {
        let header = headers
            .get(AUTHORIZATION)
            .ok_or(AuthenticationError::MissingHeader)?
            .to_str()
            .map_err(|_| AuthenticationError::MalformedHeader)?;
        let credential = Credential::from_header(header)?;

        let claims = self.verifier.verify(credential.token())?;
        let identity = self.resolver.identity(&claims)?;
        let roles = self.resolver.roles(&claims)?;

        Ok(Caller {
            identity: identity.with_roles(roles),
            credential,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use coursephase_access::testing::TestIssuer;
    use coursephase_access::{AuthorizationError, PlatformRole};
    use serde_json::json;

    fn state(issuer: &TestIssuer) -> AuthState {
        AuthState::new(issuer.verifier(), RoleResolver::new("prompt-server"))
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).expect("header"));
        headers
    }

    #[test]
    fn missing_header_is_unauthenticated() {
        let issuer = TestIssuer::new("prompt-server");
        let err = state(&issuer)
            .authenticate(&HeaderMap::new())
            .expect_err("no header");
        assert_eq!(
            err,
            ApiError::Unauthenticated(AuthenticationError::MissingHeader)
        );
    }

    #[test]
    fn resolves_identity_and_roles() {
        let issuer = TestIssuer::new("prompt-server");
        let token = issuer.bearer(&issuer.claims_with_roles("lecturer-1", &["PROMPT_Lecturer"]));

        let caller = state(&issuer)
            .authenticate(&headers(&token))
            .expect("caller");

        assert_eq!(caller.identity.subject_id, "lecturer-1");
        assert!(
            caller
                .identity
                .roles
                .has_platform_role(PlatformRole::Lecturer)
        );
        assert_eq!(caller.credential.header_value(), token);
    }

    #[test]
    fn foreign_audience_authenticates_without_roles() {
        let issuer = TestIssuer::new("prompt-server");
        let token = issuer.bearer(&issuer.student_claims("student-1", "09999999", "as45fgh"));

        let caller = state(&issuer)
            .authenticate(&headers(&token))
            .expect("caller");

        assert!(caller.identity.roles.is_empty());
        assert!(caller.identity.has_university_identity());
    }

    #[test]
    fn inconsistent_role_claim_is_forbidden_not_unauthenticated() {
        let issuer = TestIssuer::new("prompt-server");
        let mut claims = issuer.base_claims("user-1");
        claims["aud"] = json!(["prompt-server"]);
        let token = issuer.bearer(&claims);

        let err = state(&issuer)
            .authenticate(&headers(&token))
            .expect_err("inconsistent");
        assert!(matches!(
            err,
            ApiError::Forbidden(AuthorizationError::InconsistentRoleClaim { .. })
        ));
    }
}
