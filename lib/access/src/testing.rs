//! Token minting for tests.
//!
//! A [`TestIssuer`] plays the identity provider: it publishes one Ed25519
//! key as a JWK set and signs tokens shaped like the realm's access tokens.

use crate::config::KeycloakConfig;
use crate::verifier::TokenVerifier;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use ed25519_dalek::SigningKey;
use ed25519_dalek::pkcs8::EncodePrivateKey;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Value, json};

/// Fake identity provider for one realm and one client.
#[derive(Debug, Clone)]
pub struct TestIssuer {
    seed: [u8; 32],
    kid: String,
    config: KeycloakConfig,
}

impl TestIssuer {
    /// Creates an issuer for `client_id` in the `prompt` realm.
    #[must_use]
    pub fn new(client_id: &str) -> Self {
        Self::with_seed([7u8; 32], "test-key", client_id)
    }

    /// Creates an issuer with an explicit key seed and key id.
    #[must_use]
    pub fn with_seed(seed: [u8; 32], kid: &str, client_id: &str) -> Self {
        Self {
            seed,
            kid: kid.to_string(),
            config: KeycloakConfig::new(
                "https://keycloak.test".to_string(),
                "prompt".to_string(),
                client_id.to_string(),
            ),
        }
    }

    /// Returns the realm configuration tokens are issued for.
    #[must_use]
    pub fn config(&self) -> &KeycloakConfig {
        &self.config
    }

    /// Returns the published key set.
    ///
    /// # Panics
    ///
    /// Panics if the generated JWK does not deserialize, which would be a bug
    /// in this helper.
    #[must_use]
    pub fn jwks(&self) -> JwkSet {
        let public_key = SigningKey::from_bytes(&self.seed).verifying_key().to_bytes();
        serde_json::from_value(json!({
            "keys": [{
                "kty": "OKP",
                "crv": "Ed25519",
                "kid": self.kid,
                "alg": "EdDSA",
                "use": "sig",
                "x": URL_SAFE_NO_PAD.encode(public_key)
            }]
        }))
        .expect("valid test jwks")
    }

    /// Returns a verifier that trusts this issuer.
    ///
    /// # Panics
    ///
    /// Panics if the verifier cannot be built from the key set.
    #[must_use]
    pub fn verifier(&self) -> TokenVerifier {
        TokenVerifier::from_jwks(&self.jwks(), &self.config).expect("test verifier")
    }

    /// Base claims of a valid token: issuer, subject, azp, and a five minute expiry.
    #[must_use]
    pub fn base_claims(&self, subject: &str) -> Value {
        let now = chrono::Utc::now().timestamp();
        json!({
            "iss": self.config.issuer_url(),
            "sub": subject,
            "azp": self.config.authorized_party(),
            "iat": now,
            "exp": now + 300
        })
    }

    /// Claims granting `roles` to `subject` for this issuer's client.
    #[must_use]
    pub fn claims_with_roles(&self, subject: &str, roles: &[&str]) -> Value {
        let mut claims = self.base_claims(subject);
        claims["aud"] = json!([self.config.client_id(), "account"]);
        let mut resource_access = serde_json::Map::new();
        resource_access.insert(
            self.config.client_id().to_string(),
            json!({ "roles": roles }),
        );
        claims["resource_access"] = Value::Object(resource_access);
        claims
    }

    /// Claims of a student: university identity and no client roles.
    #[must_use]
    pub fn student_claims(
        &self,
        subject: &str,
        matriculation_number: &str,
        university_login: &str,
    ) -> Value {
        let mut claims = self.base_claims(subject);
        claims["aud"] = json!(["account"]);
        claims["matriculation_number"] = json!(matriculation_number);
        claims["university_login"] = json!(university_login);
        claims["email"] = json!(format!("{university_login}@tum.de"));
        claims
    }

    /// Signs arbitrary claims.
    ///
    /// # Panics
    ///
    /// Panics if signing fails.
    #[must_use]
    pub fn sign(&self, claims: &Value) -> String {
        let der = SigningKey::from_bytes(&self.seed)
            .to_pkcs8_der()
            .expect("pkcs8 der");
        let mut header = Header::new(Algorithm::EdDSA);
        header.kid = Some(self.kid.clone());
        jsonwebtoken::encode(&header, claims, &EncodingKey::from_ed_der(der.as_bytes()))
            .expect("signed test token")
    }

    /// Signs claims and returns a complete `Authorization` header value.
    #[must_use]
    pub fn bearer(&self, claims: &Value) -> String {
        format!("Bearer {}", self.sign(claims))
    }
}
