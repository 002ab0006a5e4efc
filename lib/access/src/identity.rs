//! The caller's identity, recomputed for every request.

use crate::role::RoleSet;
use serde::Serialize;

/// A verified caller.
///
/// Optional profile fields are empty strings when the token omits them;
/// machine-to-machine credentials legitimately carry none of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// The `sub` claim.
    #[serde(rename = "subjectID")]
    pub subject_id: String,
    /// Email address.
    pub email: String,
    /// University matriculation number.
    pub matriculation_number: String,
    /// University login.
    pub university_login: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Effective roles for this service.
    pub roles: RoleSet,
}

impl Identity {
    /// Creates an identity with only a subject and no roles.
    #[must_use]
    pub fn new(subject_id: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            email: String::new(),
            matriculation_number: String::new(),
            university_login: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            roles: RoleSet::none(),
        }
    }

    /// Sets the university identity fields.
    #[must_use]
    pub fn with_university_identity(
        mut self,
        matriculation_number: impl Into<String>,
        university_login: impl Into<String>,
    ) -> Self {
        self.matriculation_number = matriculation_number.into();
        self.university_login = university_login.into();
        self
    }

    /// Sets the roles.
    #[must_use]
    pub fn with_roles(mut self, roles: RoleSet) -> Self {
        self.roles = roles;
        self
    }

    /// Returns true if both fields needed for a participation lookup are present.
    #[must_use]
    pub fn has_university_identity(&self) -> bool {
        !self.matriculation_number.is_empty() && !self.university_login.is_empty()
    }
}
