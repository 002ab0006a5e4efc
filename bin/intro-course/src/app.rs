//! Route composition for the intro course service.
//!
//! Each route group carries its own guard through `route_layer`.

use axum::routing::get;
use axum::{Extension, Json, Router, middleware};
use coursephase_access::{AllowedRole, CoursePhaseAuthority, Identity, PermissionGate};
use coursephase_web::{
    AuthState, Caller, CoursePhaseAccess, CoursePhaseGuard, PlatformGuard, course_phase_guard,
    health, platform_guard,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Lecturers and editors of the phase's course.
fn staff_gate() -> PermissionGate {
    PermissionGate::new([
        AllowedRole::ADMIN,
        AllowedRole::COURSE_LECTURER,
        AllowedRole::COURSE_EDITOR,
    ])
}

/// Staff plus the phase's enrolled students.
fn participant_gate() -> PermissionGate {
    PermissionGate::new([
        AllowedRole::ADMIN,
        AllowedRole::COURSE_LECTURER,
        AllowedRole::COURSE_EDITOR,
        AllowedRole::STUDENT,
    ])
}

pub fn build_router(auth: Arc<AuthState>, authority: Arc<dyn CoursePhaseAuthority>) -> Router {
    let participant_routes = Router::new()
        .route(
            "/intro-course/api/course_phase/{course_phase_id}/access",
            get(course_phase_access),
        )
        .route_layer(middleware::from_fn_with_state(
            CoursePhaseGuard::new(Arc::clone(&auth), participant_gate(), Arc::clone(&authority)),
            course_phase_guard,
        ));

    let staff_routes = Router::new()
        .route(
            "/intro-course/api/course_phase/{course_phase_id}/staff/access",
            get(course_phase_access),
        )
        .route_layer(middleware::from_fn_with_state(
            CoursePhaseGuard::new(Arc::clone(&auth), staff_gate(), authority),
            course_phase_guard,
        ));

    let lecturer_routes = Router::new()
        .route("/intro-course/api/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            PlatformGuard::new(
                auth,
                PermissionGate::new([AllowedRole::ADMIN, AllowedRole::PLATFORM_LECTURER]),
            ),
            platform_guard,
        ));

    Router::new()
        .merge(participant_routes)
        .merge(staff_routes)
        .merge(lecturer_routes)
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

async fn course_phase_access(
    Extension(access): Extension<CoursePhaseAccess>,
) -> Json<CoursePhaseAccess> {
    Json(access)
}

async fn me(Extension(caller): Extension<Caller>) -> Json<Identity> {
    Json(caller.identity)
}
