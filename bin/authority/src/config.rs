//! Authority service configuration.
//!
//! Loaded via the `config` crate from environment variables, with `__`
//! separating nested keys (`KEYCLOAK__BASE_URL`, `KEYCLOAK__REALM`, ...).

use coursephase_access::KeycloakConfig;
use serde::Deserialize;

/// Authority service configuration.
#[derive(Debug, Deserialize)]
pub struct AuthorityConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Identity provider settings.
    pub keycloak: KeycloakConfig,
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

impl AuthorityConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::default())
    }

    fn load(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
