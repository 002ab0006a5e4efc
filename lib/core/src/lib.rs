//! Core types shared by every course phase service.
//!
//! This crate provides the foundational identifiers and the error handling
//! alias used by the access, authority, and delegate crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{CourseId, CourseParticipationId, CoursePhaseId, ParseIdError};
