//! Identity provider configuration.
//!
//! Every service is registered with the identity provider (Keycloak) as a
//! client. The client id doubles as the expected audience of role claims and
//! as the expected authorized party (`azp`) of inbound tokens.

use serde::{Deserialize, Serialize};

/// Configuration for the Keycloak realm that issues bearer tokens.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeycloakConfig {
    /// Base URL of the Keycloak server (e.g., "https://keycloak.example.com").
    base_url: String,
    /// Realm that issues tokens for the platform.
    realm: String,
    /// Client id of this service.
    client_id: String,
    /// Expected `azp` claim. Defaults to the client id when omitted.
    #[serde(default)]
    authorized_party: Option<String>,
}

impl KeycloakConfig {
    /// Creates a new configuration where the authorized party equals the client id.
    #[must_use]
    pub fn new(base_url: String, realm: String, client_id: String) -> Self {
        Self {
            base_url,
            realm,
            client_id,
            authorized_party: None,
        }
    }

    /// Creates a configuration builder for more customization.
    #[must_use]
    pub fn builder(base_url: String, realm: String, client_id: String) -> KeycloakConfigBuilder {
        KeycloakConfigBuilder::new(base_url, realm, client_id)
    }

    /// Returns the Keycloak base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Returns the realm name.
    #[must_use]
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Returns this service's client id, which is also the expected audience.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the expected `azp` claim.
    #[must_use]
    pub fn authorized_party(&self) -> &str {
        self.authorized_party.as_deref().unwrap_or(&self.client_id)
    }

    /// Returns the issuer URL tokens of this realm carry in `iss`.
    #[must_use]
    pub fn issuer_url(&self) -> String {
        format!("{}/realms/{}", self.base_url(), self.realm)
    }

    /// Returns the URL of the realm's published signing keys.
    #[must_use]
    pub fn jwks_url(&self) -> String {
        format!("{}/protocol/openid-connect/certs", self.issuer_url())
    }
}

/// Builder for `KeycloakConfig`.
#[derive(Debug)]
pub struct KeycloakConfigBuilder {
    base_url: String,
    realm: String,
    client_id: String,
    authorized_party: Option<String>,
}

impl KeycloakConfigBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(base_url: String, realm: String, client_id: String) -> Self {
        Self {
            base_url,
            realm,
            client_id,
            authorized_party: None,
        }
    }

    /// Overrides the expected `azp` claim.
    #[must_use]
    pub fn authorized_party(mut self, authorized_party: String) -> Self {
        self.authorized_party = Some(authorized_party);
        self
    }

    /// Builds the `KeycloakConfig`.
    #[must_use]
    pub fn build(self) -> KeycloakConfig {
        KeycloakConfig {
            base_url: self.base_url,
            realm: self.realm,
            client_id: self.client_id,
            authorized_party: self.authorized_party,
        }
    }
}
