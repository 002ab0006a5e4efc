//! `CoursePhaseAuthority` over HTTP.

use crate::config::AuthorityClientConfig;
use async_trait::async_trait;
use coursephase_access::{
    AuthorityError, CoursePhaseAuthority, CoursePhaseParticipation, Credential, RoleMapping,
};
use coursephase_core::{CoursePhaseId, Result};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use rootcause::prelude::Report;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Client for the authority's `/auth/course_phase/{id}/...` endpoints.
///
/// Nothing is cached: every call is a fresh request carrying the caller's
/// credential, bounded by the configured timeout.
#[derive(Clone)]
pub struct AuthorityClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl AuthorityClient {
    /// Creates a client for the authority at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AuthorityError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthorityError::Unavailable {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        let base_url: String = base_url.into();

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` if the HTTP client cannot be built.
    pub fn from_config(config: &AuthorityClientConfig) -> Result<Self, AuthorityError> {
        Self::new(config.base_url(), config.timeout())
    }

    fn endpoint(&self, course_phase_id: CoursePhaseId, operation: &str) -> String {
        format!(
            "{}/auth/course_phase/{course_phase_id}/{operation}",
            self.base_url
        )
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        course_phase_id: CoursePhaseId,
        operation: &str,
        credential: &Credential,
    ) -> Result<T, AuthorityError> {
        let url = self.endpoint(course_phase_id, operation);
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, credential.header_value())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(%status, operation, "authority responded");

        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                if e.is_timeout() {
                    AuthorityError::Timeout.into()
                } else {
                    AuthorityError::InvalidResponse {
                        reason: e.to_string(),
                    }
                    .into()
                }
            });
        }

        let reason = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        Err(status_error(status, course_phase_id, reason).into())
    }
}

fn transport_error(error: reqwest::Error) -> Report<AuthorityError> {
    if error.is_timeout() {
        warn!("authority request timed out");
        AuthorityError::Timeout.into()
    } else {
        warn!(error = %error, "authority unreachable");
        AuthorityError::Unavailable {
            reason: error.to_string(),
        }
        .into()
    }
}

fn status_error(
    status: StatusCode,
    course_phase_id: CoursePhaseId,
    reason: String,
) -> AuthorityError {
    match status {
        StatusCode::UNAUTHORIZED => AuthorityError::Unauthenticated,
        StatusCode::FORBIDDEN => AuthorityError::Forbidden,
        StatusCode::NOT_FOUND => AuthorityError::NotFound { course_phase_id },
        StatusCode::BAD_REQUEST => AuthorityError::InvalidInput { reason },
        s if s.is_server_error() => AuthorityError::Internal { reason },
        s => AuthorityError::InvalidResponse {
            reason: format!("unexpected status {s}: {reason}"),
        },
    }
}

#[async_trait]
impl CoursePhaseAuthority for AuthorityClient {
    // TODO: cache role mappings per course phase for about a minute once
    // authority load warrants it; a mapping only changes when a course is renamed.
    #[instrument(skip(self, credential), fields(%course_phase_id))]
    async fn role_mapping(
        &self,
        course_phase_id: CoursePhaseId,
        credential: &Credential,
    ) -> Result<RoleMapping, AuthorityError> {
        self.fetch(course_phase_id, "roles", credential).await
    }

    #[instrument(skip(self, credential), fields(%course_phase_id))]
    async fn participation(
        &self,
        course_phase_id: CoursePhaseId,
        credential: &Credential,
    ) -> Result<CoursePhaseParticipation, AuthorityError> {
        self.fetch(course_phase_id, "is_student", credential).await
    }
}
