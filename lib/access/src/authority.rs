//! The seam between a service and the course phase authority.
//!
//! Services that do not own the participant store reach it through this
//! trait. Both operations are side-effect-free reads and take the caller's
//! own credential, which the authority verifies again on its side.

use crate::course_phase::{CoursePhaseParticipation, RoleMapping};
use crate::credential::Credential;
use crate::error::AuthorityError;
use async_trait::async_trait;
use coursephase_core::{CoursePhaseId, Result};

/// Read access to course phase role mappings and participations.
#[async_trait]
pub trait CoursePhaseAuthority: Send + Sync {
    /// Returns the real role names of a course phase.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown phase; transport and store failures otherwise.
    async fn role_mapping(
        &self,
        course_phase_id: CoursePhaseId,
        credential: &Credential,
    ) -> Result<RoleMapping, AuthorityError>;

    /// Returns the credential holder's standing in a course phase.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the credential lacks university identity fields;
    /// transport and store failures otherwise. Not being enrolled is not an
    /// error.
    async fn participation(
        &self,
        course_phase_id: CoursePhaseId,
        credential: &Credential,
    ) -> Result<CoursePhaseParticipation, AuthorityError>;
}
