//! Bearer token verification against the identity provider's signing keys.
//!
//! Keys are fetched once when the verifier is built and kept for the life of
//! the process. There is no rotation path: a key the provider publishes after
//! startup is unknown until the service restarts.

use crate::claims::VerifiedClaims;
use crate::config::KeycloakConfig;
use crate::error::AuthenticationError;
use coursephase_core::Result;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{
    AlgorithmParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm, PublicKeyUse,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// One published signing key.
struct VerificationKey {
    kid: Option<String>,
    algorithm: Algorithm,
    key: DecodingKey,
}

/// Verifies bearer tokens issued by one realm for one authorized party.
pub struct TokenVerifier {
    keys: Vec<VerificationKey>,
    issuer: String,
    authorized_party: String,
}

impl TokenVerifier {
    /// Fetches the realm's published keys and builds a verifier.
    ///
    /// Intended to run once at process start.
    ///
    /// # Errors
    ///
    /// Returns `KeyDiscovery` if the key set cannot be fetched or contains no
    /// usable signing key.
    #[instrument(skip(config), fields(jwks_url = %config.jwks_url()))]
    pub async fn discover(config: &KeycloakConfig) -> Result<Self, AuthenticationError> {
        let discovery_error = |reason: String| AuthenticationError::KeyDiscovery { reason };

        let http_client = reqwest::Client::builder()
            .timeout(DISCOVERY_TIMEOUT)
            .build()
            .map_err(|e| discovery_error(format!("failed to create HTTP client: {e}")))?;

        let jwks: JwkSet = http_client
            .get(config.jwks_url())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| discovery_error(format!("failed to fetch signing keys: {e}")))?
            .json()
            .await
            .map_err(|e| discovery_error(format!("failed to parse signing keys: {e}")))?;

        let verifier = Self::from_jwks(&jwks, config)?;
        info!(keys = verifier.keys.len(), "Loaded identity provider signing keys");
        Ok(verifier)
    }

    /// Builds a verifier from an already fetched key set.
    ///
    /// Encryption keys and keys of unsupported types are skipped.
    ///
    /// # Errors
    ///
    /// Returns `KeyDiscovery` if no usable signing key remains.
    pub fn from_jwks(
        jwks: &JwkSet,
        config: &KeycloakConfig,
    ) -> Result<Self, AuthenticationError> {
        let keys: Vec<VerificationKey> = jwks
            .keys
            .iter()
            .filter_map(|jwk| match verification_key(jwk) {
                Ok(key) => Some(key),
                Err(reason) => {
                    debug!(kid = ?jwk.common.key_id, %reason, "Skipping published key");
                    None
                }
            })
            .collect();

        if keys.is_empty() {
            return Err(AuthenticationError::KeyDiscovery {
                reason: "no usable signing key published".to_string(),
            }
            .into());
        }

        Ok(Self {
            keys,
            issuer: config.issuer_url(),
            authorized_party: config.authorized_party().to_string(),
        })
    }

    /// Verifies signature, expiry, issuer, and authorized party.
    ///
    /// Audience is deliberately not checked here; a token for another
    /// audience is authenticated and ends up with an empty role set.
    ///
    /// # Errors
    ///
    /// Returns an `AuthenticationError` describing the first failed check.
    pub fn verify(&self, token: &str) -> Result<VerifiedClaims, AuthenticationError> {
        let header = decode_header(token).map_err(|e| AuthenticationError::InvalidToken {
            reason: e.to_string(),
        })?;

        let key = self.find_key(header.kid.as_deref())?;
        if key.algorithm != header.alg {
            return Err(AuthenticationError::InvalidToken {
                reason: format!(
                    "algorithm {:?} does not match signing key algorithm {:?}",
                    header.alg, key.algorithm
                ),
            }
            .into());
        }

        let mut validation = Validation::new(key.algorithm);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_aud = false;
        validation.leeway = 0;

        let token_data =
            decode::<Map<String, Value>>(token, &key.key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthenticationError::TokenExpired,
                    _ => AuthenticationError::InvalidToken {
                        reason: e.to_string(),
                    },
                }
            })?;

        let claims = token_data.claims;
        let authorized_party = claims.get("azp").and_then(Value::as_str).ok_or_else(|| {
            AuthenticationError::MissingClaim {
                claim: "azp".to_string(),
            }
        })?;
        if authorized_party != self.authorized_party {
            warn!(
                expected = %self.authorized_party,
                actual = %authorized_party,
                "Token issued for another authorized party"
            );
            return Err(AuthenticationError::AuthorizedPartyMismatch {
                expected: self.authorized_party.clone(),
                actual: authorized_party.to_string(),
            }
            .into());
        }

        Ok(VerifiedClaims::new(claims))
    }

    fn find_key(
        &self,
        kid: Option<&str>,
    ) -> std::result::Result<&VerificationKey, AuthenticationError> {
        match kid {
            Some(kid) => self
                .keys
                .iter()
                .find(|key| key.kid.as_deref() == Some(kid))
                .ok_or_else(|| AuthenticationError::UnknownSigningKey {
                    kid: kid.to_string(),
                }),
            None if self.keys.len() == 1 => Ok(&self.keys[0]),
            None => Err(AuthenticationError::InvalidToken {
                reason: "token header has no key id".to_string(),
            }),
        }
    }
}

fn verification_key(jwk: &Jwk) -> std::result::Result<VerificationKey, String> {
    if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
        return Err("encryption key".to_string());
    }

    let algorithm = match jwk.common.key_algorithm {
        Some(key_algorithm) => signing_algorithm(key_algorithm)
            .ok_or_else(|| format!("unsupported key algorithm {key_algorithm:?}"))?,
        None => default_algorithm(&jwk.algorithm)?,
    };

    let key = DecodingKey::from_jwk(jwk).map_err(|e| e.to_string())?;
    Ok(VerificationKey {
        kid: jwk.common.key_id.clone(),
        algorithm,
        key,
    })
}

fn signing_algorithm(key_algorithm: KeyAlgorithm) -> Option<Algorithm> {
    match key_algorithm {
        KeyAlgorithm::RS256 => Some(Algorithm::RS256),
        KeyAlgorithm::RS384 => Some(Algorithm::RS384),
        KeyAlgorithm::RS512 => Some(Algorithm::RS512),
        KeyAlgorithm::PS256 => Some(Algorithm::PS256),
        KeyAlgorithm::PS384 => Some(Algorithm::PS384),
        KeyAlgorithm::PS512 => Some(Algorithm::PS512),
        KeyAlgorithm::ES256 => Some(Algorithm::ES256),
        KeyAlgorithm::ES384 => Some(Algorithm::ES384),
        KeyAlgorithm::EdDSA => Some(Algorithm::EdDSA),
        _ => None,
    }
}

fn default_algorithm(parameters: &AlgorithmParameters) -> std::result::Result<Algorithm, String> {
    match parameters {
        AlgorithmParameters::RSA(_) => Ok(Algorithm::RS256),
        AlgorithmParameters::EllipticCurve(params) => match params.curve {
            EllipticCurve::P256 => Ok(Algorithm::ES256),
            EllipticCurve::P384 => Ok(Algorithm::ES384),
            ref curve => Err(format!("unsupported curve {curve:?}")),
        },
        AlgorithmParameters::OctetKeyPair(params) if params.curve == EllipticCurve::Ed25519 => {
            Ok(Algorithm::EdDSA)
        }
        _ => Err("unsupported key type".to_string()),
    }
}
