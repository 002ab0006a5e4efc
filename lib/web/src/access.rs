//! The outcome of a course-phase-scoped check.

use coursephase_core::{CourseParticipationId, CoursePhaseId};
use serde::Serialize;

/// Which rule admitted the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AccessGrant {
    /// A platform role, admin included. No lookup was needed.
    Platform,
    /// A course role substituted from the phase's role mapping.
    CourseRole,
    /// Enrollment as a student of the phase.
    Student,
}

/// Stored as a request extension by the course phase guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePhaseAccess {
    #[serde(rename = "coursePhaseID")]
    pub course_phase_id: CoursePhaseId,
    pub granted_by: AccessGrant,
    pub is_student: bool,
    #[serde(rename = "courseParticipationID")]
    pub course_participation_id: Option<CourseParticipationId>,
}

impl CoursePhaseAccess {
    #[must_use]
    pub fn platform(course_phase_id: CoursePhaseId) -> Self {
        Self {
            course_phase_id,
            granted_by: AccessGrant::Platform,
            is_student: false,
            course_participation_id: None,
        }
    }

    #[must_use]
    pub fn course_role(course_phase_id: CoursePhaseId) -> Self {
        Self {
            course_phase_id,
            granted_by: AccessGrant::CourseRole,
            is_student: false,
            course_participation_id: None,
        }
    }

    #[must_use]
    pub fn student(
        course_phase_id: CoursePhaseId,
        course_participation_id: Option<CourseParticipationId>,
    ) -> Self {
        Self {
            course_phase_id,
            granted_by: AccessGrant::Student,
            is_student: true,
            course_participation_id,
        }
    }
}
