//! HTTP rendering of authorization failures.
//!
//! Authentication and authorization failures keep separate status codes so
//! clients can tell "log in again" from "access denied". Internal details are
//! logged here and never echoed to the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coursephase_access::{AuthenticationError, AuthorityError, AuthorizationError};
use rootcause::prelude::Report;
use serde_json::json;
use std::fmt;
use tracing::{debug, error, warn};

/// A request failure with a fixed HTTP mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The course phase id path segment is not a UUID.
    InvalidCoursePhaseId { raw: String },
    /// The credential is missing or unusable.
    Unauthenticated(AuthenticationError),
    /// The credential is valid but grants no access.
    Forbidden(AuthorizationError),
    /// A lookup at the course phase authority failed.
    Authority(AuthorityError),
    /// Anything else.
    Internal { reason: String },
}

impl ApiError {
    /// Returns the status code this error renders with.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCoursePhaseId { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(AuthenticationError::KeyDiscovery { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Authority(err) => match err {
                AuthorityError::NotFound { .. } => StatusCode::NOT_FOUND,
                AuthorityError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
                AuthorityError::Unauthenticated => StatusCode::UNAUTHORIZED,
                AuthorityError::Forbidden => StatusCode::FORBIDDEN,
                AuthorityError::Unavailable { .. } | AuthorityError::InvalidResponse { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                AuthorityError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                AuthorityError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the message sent to the caller.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidCoursePhaseId { raw } => format!("invalid course phase id '{raw}'"),
            Self::Unauthenticated(AuthenticationError::KeyDiscovery { .. }) => {
                "internal server error".to_string()
            }
            Self::Unauthenticated(AuthenticationError::AuthorizedPartyMismatch { .. }) => {
                "token was issued for another client".to_string()
            }
            Self::Unauthenticated(err) => err.to_string(),
            Self::Forbidden(_) => "forbidden".to_string(),
            Self::Authority(err) => match err {
                AuthorityError::NotFound { .. } => "course phase not found".to_string(),
                AuthorityError::InvalidInput { reason } => reason.clone(),
                AuthorityError::Unauthenticated => "not authenticated".to_string(),
                AuthorityError::Forbidden => "forbidden".to_string(),
                AuthorityError::Unavailable { .. } | AuthorityError::InvalidResponse { .. } => {
                    "course phase authority unavailable".to_string()
                }
                AuthorityError::Timeout => "course phase authority timed out".to_string(),
                AuthorityError::Internal { .. } => "internal server error".to_string(),
            },
            Self::Internal { .. } => "internal server error".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCoursePhaseId { raw } => write!(f, "invalid course phase id '{raw}'"),
            Self::Unauthenticated(err) => write!(f, "unauthenticated: {err}"),
            Self::Forbidden(err) => write!(f, "forbidden: {err}"),
            Self::Authority(err) => write!(f, "authority lookup failed: {err}"),
            Self::Internal { reason } => write!(f, "internal error: {reason}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, %status, "request failed");
        } else {
            debug!(error = %self, %status, "request rejected");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

impl From<AuthenticationError> for ApiError {
    fn from(err: AuthenticationError) -> Self {
        Self::Unauthenticated(err)
    }
}

impl From<AuthorizationError> for ApiError {
    fn from(err: AuthorizationError) -> Self {
        Self::Forbidden(err)
    }
}

impl From<AuthorityError> for ApiError {
    fn from(err: AuthorityError) -> Self {
        Self::Authority(err)
    }
}

impl From<Report<AuthenticationError>> for ApiError {
    fn from(report: Report<AuthenticationError>) -> Self {
        debug!(error = %report, "authentication failed");
        Self::Unauthenticated(report.current_context().clone())
    }
}

impl From<Report<AuthorizationError>> for ApiError {
    fn from(report: Report<AuthorizationError>) -> Self {
        debug!(error = %report, "authorization failed");
        Self::Forbidden(report.current_context().clone())
    }
}

impl From<Report<AuthorityError>> for ApiError {
    fn from(report: Report<AuthorityError>) -> Self {
        warn!(error = %report, "authority lookup failed");
        Self::Authority(report.current_context().clone())
    }
}
