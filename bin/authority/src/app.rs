//! HTTP wiring for the authority.
//!
//! Both lookups require a valid credential and nothing more: any verified
//! caller, whatever its roles, may ask about a course phase.

use crate::service::CoursePhaseService;
use axum::extract::{FromRef, State};
use axum::routing::get;
use axum::{Json, Router};
use coursephase_access::{CoursePhaseParticipation, RoleMapping};
use coursephase_web::{ApiError, AuthState, Caller, CoursePhasePath, health};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthState>,
    pub service: Arc<CoursePhaseService>,
}

impl FromRef<AppState> for Arc<AuthState> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.auth)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/auth/course_phase/{course_phase_id}/roles",
            get(course_phase_roles),
        )
        .route(
            "/auth/course_phase/{course_phase_id}/is_student",
            get(course_phase_is_student),
        )
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn course_phase_roles(
    CoursePhasePath(course_phase_id): CoursePhasePath,
    _caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<RoleMapping>, ApiError> {
    let mapping = state.service.role_mapping(course_phase_id).await?;
    Ok(Json(mapping))
}

async fn course_phase_is_student(
    CoursePhasePath(course_phase_id): CoursePhasePath,
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<CoursePhaseParticipation>, ApiError> {
    let participation = state
        .service
        .participation(course_phase_id, &caller.identity)
        .await?;
    Ok(Json(participation))
}
