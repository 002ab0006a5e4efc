//! The intro course service.
//!
//! Does not own course phase data. Every course-phase-scoped decision is
//! delegated to the authority with the caller's own credential.

pub mod app;
pub mod config;
