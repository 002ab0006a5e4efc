//! Role types for course phase access control.
//!
//! Two kinds of roles meet here:
//! - Platform roles are fixed strings known at compile time.
//! - Course roles are placeholders. They only mean something once the real
//!   per-course-phase role names have been obtained from the authority.
//!
//! A caller's token only ever carries plain strings, so the caller's side is a
//! [`RoleSet`] of strings and the route's side is a list of [`AllowedRole`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Platform-wide role, carried verbatim in tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformRole {
    /// Platform administrator. Passes every guard.
    Admin,
    /// Lecturer with platform-wide course management rights.
    Lecturer,
}

impl PlatformRole {
    /// Returns the role string as it appears in tokens.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "PROMPT_Admin",
            Self::Lecturer => "PROMPT_Lecturer",
        }
    }
}

impl fmt::Display for PlatformRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placeholder for a role scoped to one course phase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CourseRole {
    /// The course's lecturer role.
    Lecturer,
    /// The course's editor role.
    Editor,
    /// Enrolled in the course phase. Decided by participation, not by a role string.
    Student,
    /// Small-group role recognized by the course's custom role prefix.
    Custom(String),
}

impl fmt::Display for CourseRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lecturer => f.write_str("Lecturer"),
            Self::Editor => f.write_str("Editor"),
            Self::Student => f.write_str("Student"),
            Self::Custom(name) => write!(f, "Custom({name})"),
        }
    }
}

/// A role a route accepts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AllowedRole {
    /// A platform-wide role.
    Platform(PlatformRole),
    /// A course phase placeholder.
    Course(CourseRole),
}

impl AllowedRole {
    /// Shorthand for the platform admin role.
    pub const ADMIN: Self = Self::Platform(PlatformRole::Admin);
    /// Shorthand for the platform lecturer role.
    pub const PLATFORM_LECTURER: Self = Self::Platform(PlatformRole::Lecturer);
    /// Shorthand for the course lecturer placeholder.
    pub const COURSE_LECTURER: Self = Self::Course(CourseRole::Lecturer);
    /// Shorthand for the course editor placeholder.
    pub const COURSE_EDITOR: Self = Self::Course(CourseRole::Editor);
    /// Shorthand for the student placeholder.
    pub const STUDENT: Self = Self::Course(CourseRole::Student);

    /// Creates a custom small-group role placeholder.
    #[must_use]
    pub fn custom(name: impl Into<String>) -> Self {
        Self::Course(CourseRole::Custom(name.into()))
    }
}

impl fmt::Display for AllowedRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform(role) => role.fmt(f),
            Self::Course(role) => role.fmt(f),
        }
    }
}

/// Effective role set of a caller.
///
/// An unordered set of opaque role strings compared literally. Ordering is
/// only for stable serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet {
    roles: BTreeSet<String>,
}

impl RoleSet {
    /// Creates an empty role set.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true if the set contains the exact role string.
    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns true if the set contains the platform role.
    #[must_use]
    pub fn has_platform_role(&self, role: PlatformRole) -> bool {
        self.contains(role.as_str())
    }

    /// Returns true if the caller is a platform administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_platform_role(PlatformRole::Admin)
    }

    /// Returns true if the set holds no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Returns the number of roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }
}

impl<S: Into<String>> FromIterator<S> for RoleSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().map(Into::into).collect(),
        }
    }
}
