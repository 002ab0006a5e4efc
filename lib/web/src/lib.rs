//! Axum glue for course-phase-scoped authorization.
//!
//! Every service wires the same pieces:
//! - `AuthState`, built once at startup from the token verifier and role resolver
//! - `Caller`, the verified identity plus the credential it arrived with
//! - `platform_guard` / `course_phase_guard`, middleware run via `route_layer`
//! - `ApiError`, which renders every failure as `{"error": "..."}`

mod access;
mod caller;
mod error;
mod guard;
mod state;

pub use access::{AccessGrant, CoursePhaseAccess};
pub use caller::{COURSE_PHASE_ID_PARAM, Caller, CoursePhasePath};
pub use error::ApiError;
pub use guard::{CoursePhaseGuard, PlatformGuard, course_phase_guard, platform_guard};
pub use state::AuthState;

/// Liveness probe shared by every service.
pub async fn health() -> &'static str {
    "ok"
}
