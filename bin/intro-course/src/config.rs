//! Intro course service configuration.
//!
//! Loaded from environment variables with `__` separating nested keys
//! (`AUTHORITY__BASE_URL`, `KEYCLOAK__CLIENT_ID`, ...).

use coursephase_access::KeycloakConfig;
use coursephase_authority_client::AuthorityClientConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct IntroCourseConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Where the course phase authority lives.
    pub authority: AuthorityClientConfig,

    /// Identity provider settings.
    pub keycloak: KeycloakConfig,
}

fn default_bind_address() -> String {
    "0.0.0.0:8082".to_string()
}

impl IntroCourseConfig {
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
