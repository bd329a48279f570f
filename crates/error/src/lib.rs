//! # floe-error
//!
//! Unified error types for the Floe warehouse control plane.
//!
//! The control plane never swallows errors: every failure surfaces as one
//! of the variants below, annotated with a stable numeric code
//! (FLOE-XXXX) so API clients can branch without string matching.

mod code;

pub use code::{ErrorCategory, ErrorCode};

use serde::{Deserialize, Serialize};

/// The typed failure surface of the control plane.
///
/// Variants map one-to-one onto stable error codes; the serialized form
/// tags the variant so API clients see `{"kind": "policy_violation", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlPlaneError {
    /// A query was rejected by role policy. Non-retryable; the reason is
    /// surfaced verbatim to the caller.
    #[error("{reason}")]
    PolicyViolation { reason: String },

    /// Warehouse connection establishment failed (unreachable, auth
    /// failure, connect timeout). A later request may succeed once the
    /// warehouse is reachable; the control plane itself never retries.
    #[error("warehouse connection failed: {cause}")]
    Connection { cause: String },

    /// The statement failed on an established connection (syntax error,
    /// statement timeout, runtime failure inside the warehouse). The
    /// pooled connection for the role is invalidated as a side effect.
    #[error("query execution failed: {cause}")]
    Execution { cause: String },

    /// The identity collaborator does not know this caller.
    #[error("unknown identity: {identity}")]
    Identity { identity: String },
}

impl ControlPlaneError {
    pub fn policy(reason: impl Into<String>) -> Self {
        Self::PolicyViolation {
            reason: reason.into(),
        }
    }

    pub fn connection(cause: impl Into<String>) -> Self {
        Self::Connection {
            cause: cause.into(),
        }
    }

    pub fn execution(cause: impl Into<String>) -> Self {
        Self::Execution {
            cause: cause.into(),
        }
    }

    pub fn identity(identity: impl Into<String>) -> Self {
        Self::Identity {
            identity: identity.into(),
        }
    }

    /// The stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::PolicyViolation { .. } => ErrorCode::PolicyDenied,
            Self::Connection { .. } => ErrorCode::ConnectionFailed,
            Self::Execution { .. } => ErrorCode::ExecutionFailed,
            Self::Identity { .. } => ErrorCode::IdentityUnknown,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Whether a subsequent identical request could succeed without any
    /// operator intervention. Only connection failures qualify.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Result type alias for control-plane operations
pub type Result<T> = std::result::Result<T, ControlPlaneError>;
