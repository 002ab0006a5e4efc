//! Request extractors for the verified caller and the course phase path segment.

use crate::error::ApiError;
use crate::state::AuthState;
use axum::extract::{FromRef, FromRequestParts, RawPathParams};
use axum::http::request::Parts;
use coursephase_access::{Credential, Identity};
use coursephase_core::CoursePhaseId;
use std::sync::Arc;

/// Route parameter name every course-phase-scoped route uses.
pub const COURSE_PHASE_ID_PARAM: &str = "course_phase_id";

/// A verified caller and the credential it presented.
///
/// Guards store it as a request extension. As an extractor it reuses that
/// extension when present and otherwise authenticates the request itself.
#[derive(Debug, Clone)]
pub struct Caller {
    pub identity: Identity,
    /// Forwarded unchanged on calls to the course phase authority.
    pub credential: Credential,
}

impl<S> FromRequestParts<S> for Caller
where
    Arc<AuthState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(caller) = parts.extensions.get::<Caller>() {
            return Ok(caller.clone());
        }
        Arc::<AuthState>::from_ref(state).authenticate(&parts.headers)
    }
}

/// The `{course_phase_id}` path segment, parsed.
///
/// Place it before any credential-consuming extractor so a malformed id is
/// rejected with 400 before token verification runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoursePhasePath(pub CoursePhaseId);

impl<S> FromRequestParts<S> for CoursePhasePath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let params = RawPathParams::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::Internal {
                reason: format!("path parameters unavailable: {e}"),
            })?;

        let raw = params
            .iter()
            .find(|(name, _)| *name == COURSE_PHASE_ID_PARAM)
            .map(|(_, value)| value)
            .ok_or_else(|| ApiError::Internal {
                reason: format!("route has no {{{COURSE_PHASE_ID_PARAM}}} parameter"),
            })?;

        raw.parse()
            .map(CoursePhasePath)
            .map_err(|_| ApiError::InvalidCoursePhaseId {
                raw: raw.to_string(),
            })
    }
}
