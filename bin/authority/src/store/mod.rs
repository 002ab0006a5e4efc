//! Read access to the externally owned course and participation tables.
//!
//! The rows are written by other subsystems; reads here are plain reads and
//! may trail concurrent enrollment writes.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use async_trait::async_trait;
use coursephase_access::{CoursePhaseParticipation, RoleMapping};
use coursephase_core::{CoursePhaseId, Result};
use std::fmt;

/// Errors from the backing store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The query failed or returned undecodable rows.
    Database { details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database { details } => write!(f, "course phase store error: {details}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// The two reads the authority serves.
#[async_trait]
pub trait CoursePhaseStore: Send + Sync {
    /// Returns the role mapping of a course phase, or `None` if the phase is unknown.
    async fn role_mapping(
        &self,
        course_phase_id: CoursePhaseId,
    ) -> Result<Option<RoleMapping>, StoreError>;

    /// Returns a person's standing in a course phase.
    ///
    /// A person with no participation in the phase's course, or an unknown
    /// phase, yields [`CoursePhaseParticipation::none`].
    async fn participation(
        &self,
        course_phase_id: CoursePhaseId,
        matriculation_number: &str,
        university_login: &str,
    ) -> Result<CoursePhaseParticipation, StoreError>;
}
