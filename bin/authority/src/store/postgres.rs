//! PostgreSQL-backed store.

use super::{CoursePhaseStore, StoreError};
use async_trait::async_trait;
use coursephase_access::{CoursePhaseParticipation, RoleMapping};
use coursephase_core::{CourseParticipationId, CoursePhaseId, Result};
use rootcause::prelude::Report;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

/// Reads the `course`, `course_phase`, `student`, `course_participation`
/// and `course_phase_participation` tables.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CourseRow {
    semester_tag: String,
    name: String,
}

#[derive(FromRow)]
struct ParticipationRow {
    course_participation_id: Uuid,
    is_student_of_course_phase: bool,
}

fn database_error(error: sqlx::Error) -> Report<StoreError> {
    StoreError::Database {
        details: error.to_string(),
    }
    .into()
}

#[async_trait]
impl CoursePhaseStore for PostgresStore {
    #[instrument(skip(self))]
    async fn role_mapping(
        &self,
        course_phase_id: CoursePhaseId,
    ) -> Result<Option<RoleMapping>, StoreError> {
        let row: Option<CourseRow> = sqlx::query_as(
            r#"
            SELECT c.semester_tag, c.name
            FROM course_phase cp
            JOIN course c ON c.id = cp.course_id
            WHERE cp.id = $1
            "#,
        )
        .bind(course_phase_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(|row| RoleMapping::for_course(&row.semester_tag, &row.name)))
    }

    #[instrument(skip(self, matriculation_number, university_login))]
    async fn participation(
        &self,
        course_phase_id: CoursePhaseId,
        matriculation_number: &str,
        university_login: &str,
    ) -> Result<CoursePhaseParticipation, StoreError> {
        let row: Option<ParticipationRow> = sqlx::query_as(
            r#"
            SELECT
                cpa.id AS course_participation_id,
                EXISTS (
                    SELECT 1
                    FROM course_phase_participation cpp
                    WHERE cpp.course_participation_id = cpa.id
                      AND cpp.course_phase_id = cp.id
                ) AS is_student_of_course_phase
            FROM course_phase cp
            JOIN course_participation cpa ON cpa.course_id = cp.course_id
            JOIN student s ON s.id = cpa.student_id
            WHERE cp.id = $1
              AND s.matriculation_number = $2
              AND s.university_login = $3
            "#,
        )
        .bind(course_phase_id.as_uuid())
        .bind(matriculation_number)
        .bind(university_login)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(match row {
            Some(row) => CoursePhaseParticipation {
                is_student_of_course_phase: row.is_student_of_course_phase,
                course_participation_id: Some(CourseParticipationId::from_uuid(
                    row.course_participation_id,
                )),
            },
            None => CoursePhaseParticipation::none(),
        })
    }
}
