//! Error types for the access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `AuthenticationError`: the credential itself is unusable (re-login)
//! - `AuthorizationError`: the credential is valid but grants no access
//! - `AuthorityError`: a lookup against the course phase authority failed
//!
//! The first two are never folded into each other; clients remediate them
//! differently.

use coursephase_core::CoursePhaseId;
use std::fmt;

/// Errors from verifying a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationError {
    /// No `Authorization` header was sent.
    MissingHeader,
    /// The header is not of the form `Bearer <token>`.
    MalformedHeader,
    /// Signature, structure, or issuer validation failed.
    InvalidToken { reason: String },
    /// The token's `exp` is in the past.
    TokenExpired,
    /// The token names a key the identity provider did not publish at startup.
    UnknownSigningKey { kid: String },
    /// The `azp` claim does not name this deployment.
    AuthorizedPartyMismatch { expected: String, actual: String },
    /// A required claim is absent.
    MissingClaim { claim: String },
    /// The identity provider's signing keys could not be loaded.
    KeyDiscovery { reason: String },
}

impl fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "authorization header is missing"),
            Self::MalformedHeader => write!(f, "authorization header is not a bearer token"),
            Self::InvalidToken { reason } => write!(f, "invalid token: {reason}"),
            Self::TokenExpired => write!(f, "token has expired"),
            Self::UnknownSigningKey { kid } => {
                write!(f, "token signed with unknown key '{kid}'")
            }
            Self::AuthorizedPartyMismatch { expected, actual } => {
                write!(
                    f,
                    "token issued for party '{actual}', expected '{expected}'"
                )
            }
            Self::MissingClaim { claim } => write!(f, "missing required claim: {claim}"),
            Self::KeyDiscovery { reason } => {
                write!(f, "failed to load identity provider keys: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthenticationError {}

/// Errors from authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// The role set does not intersect the allowed roles.
    ///
    /// Deliberately carries no detail about which role would have matched.
    Forbidden,
    /// The audience names this client but the role claim is absent or malformed.
    InconsistentRoleClaim { reason: String },
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Forbidden => write!(f, "forbidden"),
            Self::InconsistentRoleClaim { reason } => {
                write!(f, "inconsistent role claim: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthorizationError {}

/// Errors from course phase lookups at the authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityError {
    /// No role mapping exists for the course phase.
    NotFound { course_phase_id: CoursePhaseId },
    /// The lookup was missing an identity field.
    InvalidInput { reason: String },
    /// The authority rejected the forwarded credential.
    Unauthenticated,
    /// The authority accepted the credential but refused the lookup.
    Forbidden,
    /// The authority could not be reached.
    Unavailable { reason: String },
    /// The authority did not answer within the configured timeout.
    Timeout,
    /// The authority's store failed.
    Internal { reason: String },
    /// The authority answered with something that is not the agreed contract.
    InvalidResponse { reason: String },
}

impl fmt::Display for AuthorityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { course_phase_id } => {
                write!(f, "course phase '{course_phase_id}' not found")
            }
            Self::InvalidInput { reason } => write!(f, "invalid lookup input: {reason}"),
            Self::Unauthenticated => write!(f, "authority rejected the credential"),
            Self::Forbidden => write!(f, "authority denied access"),
            Self::Unavailable { reason } => write!(f, "authority unavailable: {reason}"),
            Self::Timeout => write!(f, "authority request timed out"),
            Self::Internal { reason } => write!(f, "authority store error: {reason}"),
            Self::InvalidResponse { reason } => {
                write!(f, "unexpected authority response: {reason}")
            }
        }
    }
}

impl std::error::Error for AuthorityError {}
