//! Pure allow/deny decisions.
//!
//! `allow = roles ∩ allowed ≠ ∅`. The platform admin role passes every
//! gate. Course placeholders only take part once a [`RoleMapping`] has
//! replaced them with real role strings.

use crate::course_phase::RoleMapping;
use crate::error::AuthorizationError;
use crate::role::{AllowedRole, CourseRole, PlatformRole, RoleSet};

/// Returns true if any role in the set is one of the allowed role strings.
#[must_use]
pub fn intersects<S: AsRef<str>>(roles: &RoleSet, allowed: &[S]) -> bool {
    allowed.iter().any(|role| roles.contains(role.as_ref()))
}

/// The roles a route accepts, and the decisions made against them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGate {
    allowed: Vec<AllowedRole>,
}

impl PermissionGate {
    /// Creates a gate accepting the given roles.
    #[must_use]
    pub fn new(allowed: impl IntoIterator<Item = AllowedRole>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// Checks the platform roles, which need no lookup.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if neither the admin role nor a listed platform
    /// role is held.
    pub fn check_platform(&self, roles: &RoleSet) -> Result<(), AuthorizationError> {
        let platform_roles: Vec<&str> = std::iter::once(PlatformRole::Admin)
            .chain(self.allowed.iter().filter_map(|role| match role {
                AllowedRole::Platform(role) => Some(*role),
                AllowedRole::Course(_) => None,
            }))
            .map(|role| role.as_str())
            .collect();

        if intersects(roles, &platform_roles) {
            Ok(())
        } else {
            Err(AuthorizationError::Forbidden)
        }
    }

    /// Returns true if any listed placeholder maps to a real role string.
    #[must_use]
    pub fn needs_role_mapping(&self) -> bool {
        self.allowed.iter().any(|role| {
            matches!(
                role,
                AllowedRole::Course(
                    CourseRole::Lecturer | CourseRole::Editor | CourseRole::Custom(_)
                )
            )
        })
    }

    /// Returns true if enrolled students are accepted.
    #[must_use]
    pub fn admits_students(&self) -> bool {
        self.allowed
            .iter()
            .any(|role| matches!(role, AllowedRole::Course(CourseRole::Student)))
    }

    /// Substitutes the course placeholders with the phase's real role names.
    #[must_use]
    pub fn course_role_names(&self, mapping: &RoleMapping) -> Vec<String> {
        self.allowed
            .iter()
            .filter_map(|role| match role {
                AllowedRole::Course(role) => mapping.role_name(role),
                AllowedRole::Platform(_) => None,
            })
            .collect()
    }

    /// Checks the substituted course roles.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if no substituted role is held.
    pub fn check_course(
        &self,
        roles: &RoleSet,
        mapping: &RoleMapping,
    ) -> Result<(), AuthorizationError> {
        if intersects(roles, &self.course_role_names(mapping)) {
            Ok(())
        } else {
            Err(AuthorizationError::Forbidden)
        }
    }
}
