//! Course-phase-scoped authorization shared by every service.
//!
//! This crate provides:
//! - Bearer token verification against the identity provider's keys (`TokenVerifier`)
//! - Identity extraction and role resolution (`RoleResolver`, `Identity`, `RoleSet`)
//! - Allow/deny decisions for platform and course phase roles (`PermissionGate`)
//! - The course phase records and the `CoursePhaseAuthority` seam
//!
//! # Example
//!
//! ```
//! use coursephase_access::{AllowedRole, PermissionGate, RoleMapping, RoleSet};
//!
//! let gate = PermissionGate::new([AllowedRole::ADMIN, AllowedRole::COURSE_LECTURER]);
//! let roles: RoleSet = ["ios2425-iPraktikum-Lecturer"].into_iter().collect();
//!
//! // Placeholders mean nothing on their own...
//! assert!(gate.check_platform(&roles).is_err());
//!
//! // ...until the phase's real role names are substituted.
//! let mapping = RoleMapping::for_course("ios2425", "iPraktikum");
//! assert!(gate.check_course(&roles, &mapping).is_ok());
//! ```

pub mod authority;
pub mod claims;
pub mod config;
pub mod course_phase;
pub mod credential;
pub mod error;
pub mod gate;
pub mod identity;
pub mod role;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;
pub mod verifier;

// Re-export main types at crate root
pub use authority::CoursePhaseAuthority;
pub use claims::{RoleResolver, VerifiedClaims};
pub use config::{KeycloakConfig, KeycloakConfigBuilder};
pub use course_phase::{CoursePhaseParticipation, RoleMapping};
pub use credential::Credential;
pub use error::{AuthenticationError, AuthorityError, AuthorizationError};
pub use gate::{PermissionGate, intersects};
pub use identity::Identity;
pub use role::{AllowedRole, CourseRole, PlatformRole, RoleSet};
pub use verifier::TokenVerifier;
