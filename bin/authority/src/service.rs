//! The authority's two lookups, on top of a store.

use crate::store::CoursePhaseStore;
use coursephase_access::{AuthorityError, CoursePhaseParticipation, Identity, RoleMapping};
use coursephase_core::{CoursePhaseId, Result};
use std::sync::Arc;
use tracing::instrument;

/// Built once at startup and shared by the handlers.
pub struct CoursePhaseService {
    store: Arc<dyn CoursePhaseStore>,
}

impl CoursePhaseService {
    #[must_use]
    pub fn new(store: Arc<dyn CoursePhaseStore>) -> Self {
        Self { store }
    }

    /// Returns the real role names of a course phase.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown phase, `Internal` if the store fails.
    #[instrument(skip(self))]
    pub async fn role_mapping(
        &self,
        course_phase_id: CoursePhaseId,
    ) -> Result<RoleMapping, AuthorityError> {
        let mapping = self.store.role_mapping(course_phase_id).await.map_err(|report| {
            let reason = report.current_context().to_string();
            report.context(AuthorityError::Internal { reason })
        })?;

        mapping.ok_or_else(|| AuthorityError::NotFound { course_phase_id }.into())
    }

    /// Returns the caller's standing in a course phase.
    ///
    /// Only the caller's own verified university identity is used.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the identity lacks a matriculation number or
    /// university login, `Internal` if the store fails.
    #[instrument(skip(self, identity), fields(subject = %identity.subject_id))]
    pub async fn participation(
        &self,
        course_phase_id: CoursePhaseId,
        identity: &Identity,
    ) -> Result<CoursePhaseParticipation, AuthorityError> {
        if identity.matriculation_number.is_empty() {
            return Err(AuthorityError::InvalidInput {
                reason: "matriculation number is missing".to_string(),
            }
            .into());
        }
        if identity.university_login.is_empty() {
            return Err(AuthorityError::InvalidInput {
                reason: "university login is missing".to_string(),
            }
            .into());
        }

        self.store
            .participation(
                course_phase_id,
                &identity.matriculation_number,
                &identity.university_login,
            )
            .await
            .map_err(|report| {
                let reason = report.current_context().to_string();
                report.context(AuthorityError::Internal { reason })
            })
    }
}
