//! Route guards.
//!
//! Both guards run as `route_layer` middleware, so unmatched routes still
//! answer 404 rather than 401. On success they store the [`Caller`] (and, for
//! course phase routes, the [`CoursePhaseAccess`]) as request extensions.

use crate::access::CoursePhaseAccess;
use crate::caller::{Caller, CoursePhasePath};
use crate::error::ApiError;
use crate::state::AuthState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use coursephase_access::{
    AuthorityError, AuthorizationError, CoursePhaseAuthority, PermissionGate,
};
use coursephase_core::CoursePhaseId;
use std::sync::Arc;
use tracing::debug;

/// State for [`platform_guard`]: only platform roles are consulted.
#[derive(Clone)]
pub struct PlatformGuard {
    auth: Arc<AuthState>,
    gate: Arc<PermissionGate>,
}

impl PlatformGuard {
    #[must_use]
    pub fn new(auth: Arc<AuthState>, gate: PermissionGate) -> Self {
        Self {
            auth,
            gate: Arc::new(gate),
        }
    }
}

/// Requires a valid credential holding one of the gate's platform roles.
///
/// # Errors
///
/// 401 for an unusable credential, 403 if no accepted role is held.
pub async fn platform_guard(
    State(guard): State<PlatformGuard>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = guard.auth.authenticate(request.headers())?;
    guard.gate.check_platform(&caller.identity.roles)?;

    request.extensions_mut().insert(caller);
    Ok(next.run(request).await)
}

/// State for [`course_phase_guard`]: platform roles first, then the phase's
/// course roles and enrollment as reported by the authority.
#[derive(Clone)]
pub struct CoursePhaseGuard {
    auth: Arc<AuthState>,
    gate: Arc<PermissionGate>,
    authority: Arc<dyn CoursePhaseAuthority>,
}

impl CoursePhaseGuard {
    #[must_use]
    pub fn new(
        auth: Arc<AuthState>,
        gate: PermissionGate,
        authority: Arc<dyn CoursePhaseAuthority>,
    ) -> Self {
        Self {
            auth,
            gate: Arc::new(gate),
            authority,
        }
    }

    /// Decides whether the caller may act on the course phase.
    ///
    /// Lookups only happen when the platform roles do not already grant
    /// access. An unknown course phase denies.
    ///
    /// # Errors
    ///
    /// 403 on denial; authority failures map per [`ApiError`].
    pub async fn resolve(
        &self,
        course_phase_id: CoursePhaseId,
        caller: &Caller,
    ) -> Result<CoursePhaseAccess, ApiError> {
        let roles = &caller.identity.roles;
        if self.gate.check_platform(roles).is_ok() {
            return Ok(CoursePhaseAccess::platform(course_phase_id));
        }

        if self.gate.needs_role_mapping() {
            match self
                .authority
                .role_mapping(course_phase_id, &caller.credential)
                .await
            {
                Ok(mapping) => {
                    if self.gate.check_course(roles, &mapping).is_ok() {
                        return Ok(CoursePhaseAccess::course_role(course_phase_id));
                    }
                }
                Err(report) => {
                    if let AuthorityError::NotFound { .. } = report.current_context() {
                        debug!(%course_phase_id, "unknown course phase, denying");
                        return Err(AuthorizationError::Forbidden.into());
                    }
                    return Err(report.into());
                }
            }
        }

        if self.gate.admits_students() && caller.identity.has_university_identity() {
            let participation = self
                .authority
                .participation(course_phase_id, &caller.credential)
                .await?;
            if participation.is_student_of_course_phase {
                return Ok(CoursePhaseAccess::student(
                    course_phase_id,
                    participation.course_participation_id,
                ));
            }
        }

        debug!(
            %course_phase_id,
            subject = %caller.identity.subject_id,
            "course phase access denied"
        );
        Err(AuthorizationError::Forbidden.into())
    }
}

/// Requires access to the course phase named by `{course_phase_id}`.
///
/// The path segment is parsed before the credential is looked at.
///
/// # Errors
///
/// 400 for a malformed id, 401 for an unusable credential, 403 on denial,
/// 502/504 if the authority is unreachable or slow.
pub async fn course_phase_guard(
    State(guard): State<CoursePhaseGuard>,
    CoursePhasePath(course_phase_id): CoursePhasePath,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = guard.auth.authenticate(request.headers())?;
    let access = guard.resolve(course_phase_id, &caller).await?;

    request.extensions_mut().insert(caller);
    request.extensions_mut().insert(access);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{StatusCode, header::AUTHORIZATION};
    use axum::routing::get;
    use axum::{Extension, Json, Router, middleware};
    use coursephase_access::testing::TestIssuer;
    use coursephase_access::{
        AllowedRole, CoursePhaseParticipation, Credential, RoleMapping, RoleResolver,
    };
    use rootcause::prelude::Report;
    use serde_json::Value;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const CLIENT: &str = "prompt-server";
    const PHASE: &str = "4179d58a-d00d-4fa7-94a5-397bc69fab02";
    const PARTICIPATION: &str = "1378db54-6b17-4e5c-9c54-3b2c5d7f21e2";

    enum Behaviour {
        Answer,
        Unknown,
        Refused,
        Down,
        Slow,
    }

    struct FakeAuthority {
        behaviour: Behaviour,
        calls: AtomicUsize,
        forwarded: Mutex<Vec<String>>,
    }

    impl FakeAuthority {
        fn new(behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                behaviour,
                calls: AtomicUsize::new(0),
                forwarded: Mutex::new(Vec::new()),
            })
        }

        fn record(
            &self,
            course_phase_id: CoursePhaseId,
            credential: &Credential,
        ) -> Result<(), Report<AuthorityError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.forwarded
                .lock()
                .expect("lock")
                .push(credential.header_value().to_string());
            match self.behaviour {
                Behaviour::Answer => Ok(()),
                Behaviour::Unknown => Err(AuthorityError::NotFound { course_phase_id }.into()),
                Behaviour::Down => Err(AuthorityError::Unavailable {
                    reason: "connection refused".to_string(),
                }
                .into()),
                Behaviour::Refused => Err(AuthorityError::Forbidden.into()),
                Behaviour::Slow => Err(AuthorityError::Timeout.into()),
            }
        }
    }

    #[async_trait]
    impl CoursePhaseAuthority for FakeAuthority {
        async fn role_mapping(
            &self,
            course_phase_id: CoursePhaseId,
            credential: &Credential,
        ) -> Result<RoleMapping, Report<AuthorityError>> {
            self.record(course_phase_id, credential)?;
            Ok(RoleMapping::for_course("ios2425", "iPraktikum"))
        }

        async fn participation(
            &self,
            course_phase_id: CoursePhaseId,
            credential: &Credential,
        ) -> Result<CoursePhaseParticipation, Report<AuthorityError>> {
            self.record(course_phase_id, credential)?;
            Ok(CoursePhaseParticipation {
                is_student_of_course_phase: course_phase_id.to_string() == PHASE,
                course_participation_id: Some(PARTICIPATION.parse().expect("id")),
            })
        }
    }

    fn app(issuer: &TestIssuer, gate: PermissionGate, authority: Arc<FakeAuthority>) -> Router {
        let auth = Arc::new(AuthState::new(issuer.verifier(), RoleResolver::new(CLIENT)));
        let guard = CoursePhaseGuard::new(auth, gate, authority);
        Router::new()
            .route(
                "/api/course_phase/{course_phase_id}/access",
                get(|Extension(access): Extension<CoursePhaseAccess>| async move {
                    Json(access)
                }),
            )
            .route_layer(middleware::from_fn_with_state(guard, course_phase_guard))
    }

    fn staff_and_students() -> PermissionGate {
        PermissionGate::new([
            AllowedRole::ADMIN,
            AllowedRole::COURSE_LECTURER,
            AllowedRole::COURSE_EDITOR,
            AllowedRole::STUDENT,
        ])
    }

    async fn call(app: Router, phase: &str, bearer: Option<&str>) -> (StatusCode, Value) {
        let mut request =
            axum::http::Request::builder().uri(format!("/api/course_phase/{phase}/access"));
        if let Some(bearer) = bearer {
            request = request.header(AUTHORIZATION, bearer);
        }
        let response = app
            .oneshot(request.body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn missing_header_is_401_with_error_body() {
        let issuer = TestIssuer::new(CLIENT);
        let authority = FakeAuthority::new(Behaviour::Answer);
        let (status, body) = call(
            app(&issuer, staff_and_students(), authority.clone()),
            PHASE,
            None,
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());
        assert_eq!(authority.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_id_is_400_before_token_checks() {
        let issuer = TestIssuer::new(CLIENT);
        let authority = FakeAuthority::new(Behaviour::Answer);
        let (status, body) = call(
            app(&issuer, staff_and_students(), authority),
            "not-a-uuid",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn admin_passes_without_lookup() {
        let issuer = TestIssuer::new(CLIENT);
        let authority = FakeAuthority::new(Behaviour::Down);
        let bearer = issuer.bearer(&issuer.claims_with_roles("admin-1", &["PROMPT_Admin"]));

        let (status, body) = call(
            app(&issuer, staff_and_students(), authority.clone()),
            PHASE,
            Some(&bearer),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["grantedBy"], "platform");
        assert_eq!(authority.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn course_lecturer_passes_after_substitution() {
        let issuer = TestIssuer::new(CLIENT);
        let authority = FakeAuthority::new(Behaviour::Answer);
        let bearer = issuer.bearer(
            &issuer.claims_with_roles("lecturer-1", &["ios2425-iPraktikum-Lecturer"]),
        );

        let (status, body) = call(
            app(&issuer, staff_and_students(), authority.clone()),
            PHASE,
            Some(&bearer),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["grantedBy"], "courseRole");
        assert_eq!(
            *authority.forwarded.lock().expect("lock"),
            vec![bearer.clone()]
        );
    }

    #[tokio::test]
    async fn other_course_roles_are_denied() {
        let issuer = TestIssuer::new(CLIENT);
        let authority = FakeAuthority::new(Behaviour::Answer);
        let bearer =
            issuer.bearer(&issuer.claims_with_roles("lecturer-2", &["ios2425-Other-Lecturer"]));
        let gate = PermissionGate::new([AllowedRole::COURSE_LECTURER]);

        let (status, body) = call(app(&issuer, gate, authority), PHASE, Some(&bearer)).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
    }

    #[tokio::test]
    async fn enrolled_student_passes_with_participation() {
        let issuer = TestIssuer::new(CLIENT);
        let authority = FakeAuthority::new(Behaviour::Answer);
        let bearer = issuer.bearer(&issuer.student_claims("student-1", "09999999", "as45fgh"));

        let (status, body) = call(
            app(&issuer, staff_and_students(), authority),
            PHASE,
            Some(&bearer),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["grantedBy"], "student");
        assert_eq!(body["isStudent"], true);
        assert_eq!(body["courseParticipationID"], PARTICIPATION);
    }

    #[tokio::test]
    async fn student_of_another_phase_is_denied() {
        let issuer = TestIssuer::new(CLIENT);
        let authority = FakeAuthority::new(Behaviour::Answer);
        let bearer = issuer.bearer(&issuer.student_claims("student-1", "09999999", "as45fgh"));
        let other_phase = CoursePhaseId::new().to_string();

        let (status, _) = call(
            app(&issuer, staff_and_students(), authority),
            &other_phase,
            Some(&bearer),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn student_lookup_needs_university_identity() {
        let issuer = TestIssuer::new(CLIENT);
        let authority = FakeAuthority::new(Behaviour::Answer);
        let bearer = issuer.bearer(&issuer.base_claims("service-account"));
        let gate = PermissionGate::new([AllowedRole::STUDENT]);

        let (status, _) =
            call(app(&issuer, gate, authority.clone()), PHASE, Some(&bearer)).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(authority.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_course_phase_denies() {
        let issuer = TestIssuer::new(CLIENT);
        let authority = FakeAuthority::new(Behaviour::Unknown);
        let bearer = issuer.bearer(
            &issuer.claims_with_roles("lecturer-1", &["ios2425-iPraktikum-Lecturer"]),
        );

        let (status, _) = call(
            app(&issuer, staff_and_students(), authority),
            PHASE,
            Some(&bearer),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn authority_refusal_is_forbidden_not_gateway_error() {
        let issuer = TestIssuer::new(CLIENT);
        let authority = FakeAuthority::new(Behaviour::Refused);
        let bearer = issuer.bearer(
            &issuer.claims_with_roles("lecturer-1", &["ios2425-iPraktikum-Lecturer"]),
        );

        let (status, body) = call(
            app(&issuer, staff_and_students(), authority.clone()),
            PHASE,
            Some(&bearer),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
        assert_eq!(authority.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn authority_failures_are_server_errors() {
        let issuer = TestIssuer::new(CLIENT);
        let bearer = issuer.bearer(
            &issuer.claims_with_roles("lecturer-1", &["ios2425-iPraktikum-Lecturer"]),
        );

        let (status, _) = call(
            app(&issuer, staff_and_students(), FakeAuthority::new(Behaviour::Down)),
            PHASE,
            Some(&bearer),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, _) = call(
            app(&issuer, staff_and_students(), FakeAuthority::new(Behaviour::Slow)),
            PHASE,
            Some(&bearer),
        )
        .await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn every_request_asks_the_authority_again() {
        let issuer = TestIssuer::new(CLIENT);
        let authority = FakeAuthority::new(Behaviour::Answer);
        let bearer = issuer.bearer(
            &issuer.claims_with_roles("lecturer-1", &["ios2425-iPraktikum-Lecturer"]),
        );
        let router = app(&issuer, staff_and_students(), authority.clone());

        for _ in 0..3 {
            let (status, _) = call(router.clone(), PHASE, Some(&bearer)).await;
            assert_eq!(status, StatusCode::OK);
        }
        assert_eq!(authority.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn platform_guard_checks_static_roles() {
        let issuer = TestIssuer::new(CLIENT);
        let auth = Arc::new(AuthState::new(issuer.verifier(), RoleResolver::new(CLIENT)));
        let guard = PlatformGuard::new(
            auth,
            PermissionGate::new([AllowedRole::PLATFORM_LECTURER]),
        );
        let router = Router::new()
            .route(
                "/api/course_phase/{course_phase_id}/access",
                get(|Extension(caller): Extension<Caller>| async move {
                    Json(serde_json::json!({ "subject": caller.identity.subject_id }))
                }),
            )
            .route_layer(middleware::from_fn_with_state(guard, platform_guard));

        let lecturer =
            issuer.bearer(&issuer.claims_with_roles("lecturer-1", &["PROMPT_Lecturer"]));
        let (status, body) = call(router.clone(), PHASE, Some(&lecturer)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subject"], "lecturer-1");

        let student = issuer.bearer(&issuer.student_claims("student-1", "09999999", "as45fgh"));
        let (status, _) = call(router, PHASE, Some(&student)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
