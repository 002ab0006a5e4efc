//! Course phase records served by the authority.
//!
//! Field names on the wire follow the authority's JSON contract.

use crate::role::CourseRole;
use coursephase_core::CourseParticipationId;
use serde::{Deserialize, Serialize};

/// The real role names of one course phase.
///
/// Role names are opaque strings synthesized from semester and course and are
/// compared literally against the role strings in tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMapping {
    /// Role string that grants lecturer rights in the phase's course.
    #[serde(rename = "courseLecturerRole")]
    pub lecturer_role_name: String,
    /// Role string that grants editor rights in the phase's course.
    #[serde(rename = "courseEditorRole")]
    pub editor_role_name: String,
    /// Prefix shared by the course's small-group roles.
    #[serde(rename = "customRolePrefix")]
    pub custom_role_prefix: String,
}

impl RoleMapping {
    /// Synthesizes the role names of a course from its semester tag and name.
    #[must_use]
    pub fn for_course(semester_tag: &str, course_name: &str) -> Self {
        let base = format!("{semester_tag}-{course_name}");
        Self {
            lecturer_role_name: format!("{base}-Lecturer"),
            editor_role_name: format!("{base}-Editor"),
            custom_role_prefix: format!("{base}-cg-"),
        }
    }

    /// Returns the real role string a placeholder stands for.
    ///
    /// `Student` has no role string; enrollment is decided by participation.
    #[must_use]
    pub fn role_name(&self, role: &CourseRole) -> Option<String> {
        match role {
            CourseRole::Lecturer => Some(self.lecturer_role_name.clone()),
            CourseRole::Editor => Some(self.editor_role_name.clone()),
            CourseRole::Custom(name) => Some(format!("{}{name}", self.custom_role_prefix)),
            CourseRole::Student => None,
        }
    }
}

/// A person's standing in one course phase.
///
/// `course_participation_id` identifies the person across all phases of the
/// course, independently of whether they are enrolled in this phase. Not
/// being enrolled is `false`, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoursePhaseParticipation {
    /// Whether the person participates in this phase as a student.
    #[serde(rename = "isStudentOfCoursePhase")]
    pub is_student_of_course_phase: bool,
    /// The person's participation in the phase's course, if any.
    #[serde(rename = "courseParticipationID")]
    pub course_participation_id: Option<CourseParticipationId>,
}

impl CoursePhaseParticipation {
    /// A person with no participation in the course at all.
    #[must_use]
    pub fn none() -> Self {
        Self {
            is_student_of_course_phase: false,
            course_participation_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_course_synthesizes_names() {
        let mapping = RoleMapping::for_course("ios2425", "iPraktikum");
        assert_eq!(mapping.lecturer_role_name, "ios2425-iPraktikum-Lecturer");
        assert_eq!(mapping.editor_role_name, "ios2425-iPraktikum-Editor");
        assert_eq!(mapping.custom_role_prefix, "ios2425-iPraktikum-cg-");
    }

    #[test]
    fn role_name_substitutes_placeholders() {
        let mapping = RoleMapping::for_course("ios2425", "iPraktikum");
        assert_eq!(
            mapping.role_name(&CourseRole::Custom("Tutor".to_string())),
            Some("ios2425-iPraktikum-cg-Tutor".to_string())
        );
        assert_eq!(mapping.role_name(&CourseRole::Student), None);
    }

    #[test]
    fn role_mapping_wire_format() {
        let mapping = RoleMapping::for_course("ss25", "ITP");
        let json = serde_json::to_value(&mapping).expect("serialize");
        assert_eq!(json["courseLecturerRole"], "ss25-ITP-Lecturer");
        assert_eq!(json["courseEditorRole"], "ss25-ITP-Editor");
        assert_eq!(json["customRolePrefix"], "ss25-ITP-cg-");
    }

    #[test]
    fn participation_wire_format() {
        let json = r#"{
            "isStudentOfCoursePhase": false,
            "courseParticipationID": "1378db54-6b17-4e5c-9c54-3b2c5d7f21e2"
        }"#;
        let participation: CoursePhaseParticipation =
            serde_json::from_str(json).expect("deserialize");
        assert!(!participation.is_student_of_course_phase);
        assert_eq!(
            participation
                .course_participation_id
                .map(|id| id.to_string())
                .as_deref(),
            Some("1378db54-6b17-4e5c-9c54-3b2c5d7f21e2")
        );
    }
}
