//! In-memory store for tests and local development.
//!
//! Not durable; all state is lost on restart.

use super::{CoursePhaseStore, StoreError};
use async_trait::async_trait;
use coursephase_access::{CoursePhaseParticipation, RoleMapping};
use coursephase_core::{CourseId, CourseParticipationId, CoursePhaseId, Result};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

struct Course {
    semester_tag: String,
    name: String,
}

struct Participation {
    course_id: CourseId,
    matriculation_number: String,
    university_login: String,
}

#[derive(Default)]
struct Tables {
    courses: HashMap<CourseId, Course>,
    course_phases: HashMap<CoursePhaseId, CourseId>,
    participations: HashMap<CourseParticipationId, Participation>,
    phase_participations: HashSet<(CourseParticipationId, CoursePhaseId)>,
}

/// `CoursePhaseStore` over `HashMap`s guarded by a `tokio::sync::RwLock`.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course and returns its id.
    pub async fn add_course(&self, semester_tag: &str, name: &str) -> CourseId {
        let id = CourseId::new();
        self.tables.write().await.courses.insert(
            id,
            Course {
                semester_tag: semester_tag.to_string(),
                name: name.to_string(),
            },
        );
        id
    }

    /// Adds a phase to a course.
    pub async fn add_course_phase(&self, course_id: CourseId, course_phase_id: CoursePhaseId) {
        self.tables
            .write()
            .await
            .course_phases
            .insert(course_phase_id, course_id);
    }

    /// Binds a person to a course.
    pub async fn add_course_participation(
        &self,
        course_id: CourseId,
        course_participation_id: CourseParticipationId,
        matriculation_number: &str,
        university_login: &str,
    ) {
        self.tables.write().await.participations.insert(
            course_participation_id,
            Participation {
                course_id,
                matriculation_number: matriculation_number.to_string(),
                university_login: university_login.to_string(),
            },
        );
    }

    /// Enrolls a course participation in one phase of its course.
    pub async fn add_course_phase_participation(
        &self,
        course_participation_id: CourseParticipationId,
        course_phase_id: CoursePhaseId,
    ) {
        self.tables
            .write()
            .await
            .phase_participations
            .insert((course_participation_id, course_phase_id));
    }
}

#[async_trait]
impl CoursePhaseStore for MemoryStore {
    async fn role_mapping(
        &self,
        course_phase_id: CoursePhaseId,
    ) -> Result<Option<RoleMapping>, StoreError> {
        let tables = self.tables.read().await;
        let mapping = tables
            .course_phases
            .get(&course_phase_id)
            .and_then(|course_id| tables.courses.get(course_id))
            .map(|course| RoleMapping::for_course(&course.semester_tag, &course.name));
        Ok(mapping)
    }

    async fn participation(
        &self,
        course_phase_id: CoursePhaseId,
        matriculation_number: &str,
        university_login: &str,
    ) -> Result<CoursePhaseParticipation, StoreError> {
        let tables = self.tables.read().await;
        let Some(course_id) = tables.course_phases.get(&course_phase_id) else {
            return Ok(CoursePhaseParticipation::none());
        };

        let participation = tables.participations.iter().find(|(_, p)| {
            p.course_id == *course_id
                && p.matriculation_number == matriculation_number
                && p.university_login == university_login
        });

        Ok(match participation {
            Some((id, _)) => CoursePhaseParticipation {
                is_student_of_course_phase: tables
                    .phase_participations
                    .contains(&(*id, course_phase_id)),
                course_participation_id: Some(*id),
            },
            None => CoursePhaseParticipation::none(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_phase_has_no_mapping() {
        let store = MemoryStore::new();
        let mapping = store
            .role_mapping(CoursePhaseId::new())
            .await
            .expect("lookup");
        assert_eq!(mapping, None);
    }

    #[tokio::test]
    async fn mapping_is_synthesized_from_course() {
        let store = MemoryStore::new();
        let course = store.add_course("ios2425", "iPraktikum").await;
        let phase = CoursePhaseId::new();
        store.add_course_phase(course, phase).await;

        let mapping = store.role_mapping(phase).await.expect("lookup");
        assert_eq!(
            mapping.map(|m| m.lecturer_role_name),
            Some("ios2425-iPraktikum-Lecturer".to_string())
        );
    }

    #[tokio::test]
    async fn participation_in_another_course_does_not_count() {
        let store = MemoryStore::new();
        let ours = store.add_course("ios2425", "iPraktikum").await;
        let theirs = store.add_course("ios2425", "Other").await;
        let phase = CoursePhaseId::new();
        store.add_course_phase(ours, phase).await;
        store
            .add_course_participation(theirs, CourseParticipationId::new(), "09999999", "as45fgh")
            .await;

        let participation = store
            .participation(phase, "09999999", "as45fgh")
            .await
            .expect("lookup");
        assert_eq!(participation, CoursePhaseParticipation::none());
    }
}
