//! HTTP client for the course phase authority.
//!
//! Services that do not own the participant store use `AuthorityClient` as
//! their `CoursePhaseAuthority`. Every call forwards the caller's own
//! `Authorization` header, so the authority verifies the caller again
//! instead of trusting the delegating service.

mod client;
mod config;

pub use client::AuthorityClient;
pub use config::AuthorityClientConfig;
