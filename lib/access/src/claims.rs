//! Claims extraction and role resolution.
//!
//! Turns a verified claim map into an [`Identity`]. Subject is the only
//! required claim. Roles come from `resource_access.<client_id>.roles`, and
//! only when the token's audience names this client.

use crate::error::{AuthenticationError, AuthorizationError};
use crate::identity::Identity;
use crate::role::RoleSet;
use coursephase_core::Result;
use serde_json::{Map, Value};

/// Claims of a token whose signature, expiry, and authorized party were checked.
///
/// Only [`TokenVerifier`](crate::verifier::TokenVerifier) produces these.
#[derive(Debug, Clone)]
pub struct VerifiedClaims(Map<String, Value>);

impl VerifiedClaims {
    pub(crate) fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Returns a claim by name.
    #[must_use]
    pub fn get(&self, claim: &str) -> Option<&Value> {
        self.0.get(claim)
    }

    fn string(&self, claim: &str) -> Option<&str> {
        self.get(claim).and_then(Value::as_str)
    }

    fn optional_string(&self, claim: &str) -> String {
        self.string(claim).unwrap_or_default().to_string()
    }

    /// Returns true if the `aud` claim, string or list, names the client.
    #[must_use]
    pub fn audience_contains(&self, client_id: &str) -> bool {
        match self.get("aud") {
            Some(Value::String(aud)) => aud == client_id,
            Some(Value::Array(auds)) => auds.iter().any(|aud| aud.as_str() == Some(client_id)),
            _ => false,
        }
    }
}

/// Resolves identities and role sets for one service.
#[derive(Debug, Clone)]
pub struct RoleResolver {
    client_id: String,
}

impl RoleResolver {
    /// Creates a resolver for the given client id.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
        }
    }

    /// Extracts the identity fields, without roles.
    ///
    /// # Errors
    ///
    /// Returns `MissingClaim` if `sub` is absent or empty.
    pub fn identity(
        &self,
        claims: &VerifiedClaims,
    ) -> Result<Identity, AuthenticationError> {
        let subject = claims
            .string("sub")
            .filter(|sub| !sub.is_empty())
            .ok_or_else(|| AuthenticationError::MissingClaim {
                claim: "sub".to_string(),
            })?;

        Ok(Identity {
            subject_id: subject.to_string(),
            email: claims.optional_string("email"),
            matriculation_number: claims.optional_string("matriculation_number"),
            university_login: claims.optional_string("university_login"),
            first_name: claims.optional_string("given_name"),
            last_name: claims.optional_string("family_name"),
            roles: RoleSet::none(),
        })
    }

    /// Resolves the caller's effective role set for this client.
    ///
    /// A token whose audience excludes this client authenticates fine and
    /// simply carries no roles here.
    ///
    /// # Errors
    ///
    /// Returns `InconsistentRoleClaim` if the audience names this client but
    /// `resource_access.<client_id>.roles` is absent or not a list of strings.
    pub fn roles(&self, claims: &VerifiedClaims) -> Result<RoleSet, AuthorizationError> {
        if !claims.audience_contains(&self.client_id) {
            return Ok(RoleSet::none());
        }

        let inconsistent = |reason: &str| AuthorizationError::InconsistentRoleClaim {
            reason: reason.to_string(),
        };

        let client_access = claims
            .get("resource_access")
            .and_then(Value::as_object)
            .ok_or_else(|| inconsistent("resource_access is missing"))?
            .get(&self.client_id)
            .and_then(Value::as_object)
            .ok_or_else(|| inconsistent("no resource_access entry for this client"))?;

        let roles = client_access
            .get("roles")
            .and_then(Value::as_array)
            .ok_or_else(|| inconsistent("roles list is missing"))?;

        let roles = roles
            .iter()
            .map(|role| role.as_str().ok_or_else(|| inconsistent("role is not a string")))
            .collect::<std::result::Result<RoleSet, _>>()?;

        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> VerifiedClaims {
        match value {
            Value::Object(map) => VerifiedClaims::new(map),
            _ => panic!("claims must be an object"),
        }
    }

    #[test]
    fn identity_requires_subject() {
        let resolver = RoleResolver::new("prompt-server");
        let err = resolver
            .identity(&claims(json!({ "email": "a@example.com" })))
            .expect_err("missing sub");
        assert_eq!(
            *err.current_context(),
            AuthenticationError::MissingClaim {
                claim: "sub".to_string()
            }
        );
    }

    #[test]
    fn identity_defaults_optional_fields_to_empty() {
        let resolver = RoleResolver::new("prompt-server");
        let identity = resolver
            .identity(&claims(json!({ "sub": "service-account" })))
            .expect("identity");
        assert_eq!(identity.subject_id, "service-account");
        assert_eq!(identity.email, "");
        assert_eq!(identity.matriculation_number, "");
        assert_eq!(identity.university_login, "");
    }

    #[test]
    fn identity_reads_profile_claims() {
        let resolver = RoleResolver::new("prompt-server");
        let identity = resolver
            .identity(&claims(json!({
                "sub": "user-1",
                "email": "student@tum.de",
                "matriculation_number": "09999999",
                "university_login": "as45fgh",
                "given_name": "Ada",
                "family_name": "Student"
            })))
            .expect("identity");
        assert_eq!(identity.matriculation_number, "09999999");
        assert_eq!(identity.university_login, "as45fgh");
        assert_eq!(identity.first_name, "Ada");
        assert!(identity.has_university_identity());
    }

    #[test]
    fn foreign_audience_yields_empty_roles() {
        let resolver = RoleResolver::new("prompt-server");
        let roles = resolver
            .roles(&claims(json!({
                "sub": "user-1",
                "aud": ["account", "other-service"],
                "resource_access": { "other-service": { "roles": ["PROMPT_Admin"] } }
            })))
            .expect("roles");
        assert!(roles.is_empty());
    }

    #[test]
    fn missing_audience_yields_empty_roles() {
        let resolver = RoleResolver::new("prompt-server");
        let roles = resolver
            .roles(&claims(json!({ "sub": "user-1" })))
            .expect("roles");
        assert!(roles.is_empty());
    }

    #[test]
    fn matching_audience_reads_client_roles() {
        let resolver = RoleResolver::new("prompt-server");
        let roles = resolver
            .roles(&claims(json!({
                "sub": "user-1",
                "aud": "prompt-server",
                "resource_access": {
                    "prompt-server": { "roles": ["PROMPT_Lecturer", "ios2425-iPraktikum-Editor"] },
                    "account": { "roles": ["manage-account"] }
                }
            })))
            .expect("roles");
        assert_eq!(roles.len(), 2);
        assert!(roles.contains("ios2425-iPraktikum-Editor"));
        assert!(!roles.contains("manage-account"));
    }

    #[test]
    fn matching_audience_without_client_entry_is_inconsistent() {
        let resolver = RoleResolver::new("prompt-server");
        let err = resolver
            .roles(&claims(json!({
                "sub": "user-1",
                "aud": ["prompt-server"],
                "resource_access": { "account": { "roles": [] } }
            })))
            .expect_err("inconsistent");
        assert!(matches!(
            err.current_context(),
            AuthorizationError::InconsistentRoleClaim { .. }
        ));
    }

    #[test]
    fn matching_audience_without_resource_access_is_inconsistent() {
        let resolver = RoleResolver::new("prompt-server");
        let err = resolver
            .roles(&claims(json!({ "sub": "user-1", "aud": "prompt-server" })))
            .expect_err("inconsistent");
        assert!(matches!(
            err.current_context(),
            AuthorizationError::InconsistentRoleClaim { .. }
        ));
    }

    #[test]
    fn non_string_role_is_inconsistent() {
        let resolver = RoleResolver::new("prompt-server");
        let result = resolver.roles(&claims(json!({
            "sub": "user-1",
            "aud": "prompt-server",
            "resource_access": { "prompt-server": { "roles": ["ok", 7] } }
        })));
        assert!(result.is_err());
    }
}
