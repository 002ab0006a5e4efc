//! The caller's bearer credential as received.

use crate::error::AuthenticationError;
use std::fmt;

const BEARER_PREFIX: &str = "Bearer ";

/// The `Authorization` header of an inbound request.
///
/// Kept verbatim so a delegating service can forward exactly the bytes it
/// received. The `Debug` output never contains the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    header: String,
}

impl Credential {
    /// Parses an `Authorization` header value.
    ///
    /// # Errors
    ///
    /// Returns `MalformedHeader` unless the value is `Bearer <token>` with a
    /// non-empty token.
    pub fn from_header(header: &str) -> Result<Self, AuthenticationError> {
        let token = header
            .strip_prefix(BEARER_PREFIX)
            .ok_or(AuthenticationError::MalformedHeader)?;
        if token.trim().is_empty() {
            return Err(AuthenticationError::MalformedHeader);
        }
        Ok(Self {
            header: header.to_string(),
        })
    }

    /// Returns the full header value, scheme included.
    #[must_use]
    pub fn header_value(&self) -> &str {
        &self.header
    }

    /// Returns the token without the scheme.
    #[must_use]
    pub fn token(&self) -> &str {
        self.header[BEARER_PREFIX.len()..].trim()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").finish_non_exhaustive()
    }
}
