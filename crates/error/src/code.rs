use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error codes following FLOE-XXXX format.
///
/// ## Code Ranges
/// - **1000-1999**: Connection errors
/// - **2000-2999**: Execution errors
/// - **4000-4999**: Identity/Policy errors
///
/// Codes are stable across versions (semver contract).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
#[non_exhaustive]
pub enum ErrorCode {
    /// FLOE-1001: Warehouse connection could not be established
    ConnectionFailed = 1001,

    /// FLOE-2001: Statement failed on an established connection
    ExecutionFailed = 2001,

    /// FLOE-4001: Caller identity not known to the control plane
    IdentityUnknown = 4001,
    /// FLOE-4002: Query rejected by role policy
    PolicyDenied = 4002,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the formatted code string (e.g., "FLOE-4002")
    pub fn as_str(&self) -> String {
        format!("FLOE-{:04}", self.as_u16())
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self.as_u16() {
            1000..=1999 => ErrorCategory::Connection,
            2000..=2999 => ErrorCategory::Execution,
            _ => ErrorCategory::Auth,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<ErrorCode> for String {
    fn from(code: ErrorCode) -> String {
        code.as_str()
    }
}

impl TryFrom<String> for ErrorCode {
    type Error = String;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        let num: u16 = s
            .strip_prefix("FLOE-")
            .and_then(|n| n.parse().ok())
            .ok_or_else(|| "Invalid format".to_string())?;
        Self::try_from(num).map_err(|_| "Unknown code".to_string())
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(n: u16) -> std::result::Result<Self, Self::Error> {
        match n {
            1001 => Ok(Self::ConnectionFailed),
            2001 => Ok(Self::ExecutionFailed),
            4001 => Ok(Self::IdentityUnknown),
            4002 => Ok(Self::PolicyDenied),
            _ => Err(format!("Unknown error code: {}", n)),
        }
    }
}

/// High-level error category for HTTP status and client retry mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorCategory {
    Connection,
    Execution,
    Auth,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_formatting() {
        assert_eq!(ErrorCode::ConnectionFailed.as_str(), "FLOE-1001");
        assert_eq!(ErrorCode::ExecutionFailed.as_str(), "FLOE-2001");
        assert_eq!(ErrorCode::PolicyDenied.as_str(), "FLOE-4002");
    }

    #[test]
    fn test_error_code_parsing() {
        assert_eq!(
            ErrorCode::try_from("FLOE-1001".to_string()).unwrap(),
            ErrorCode::ConnectionFailed
        );
        assert_eq!(
            ErrorCode::try_from("FLOE-4001".to_string()).unwrap(),
            ErrorCode::IdentityUnknown
        );
    }

    #[test]
    fn test_error_code_parsing_errors() {
        assert!(ErrorCode::try_from("INVALID".to_string()).is_err());
        assert!(ErrorCode::try_from("FLOE-0000".to_string()).is_err());
        assert!(ErrorCode::try_from("FLOE-ABC".to_string()).is_err());
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(
            ErrorCode::ConnectionFailed.category(),
            ErrorCategory::Connection
        );
        assert_eq!(
            ErrorCode::ExecutionFailed.category(),
            ErrorCategory::Execution
        );
        assert_eq!(ErrorCode::IdentityUnknown.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::PolicyDenied.category(), ErrorCategory::Auth);
    }
}
