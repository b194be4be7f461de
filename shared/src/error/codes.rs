//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 3xxx: Client errors
//! - 4xxx: Coach errors
//! - 5xxx: Payment errors
//! - 6xxx: Promotion errors
//! - 7xxx: Attendance errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so API consumers can
/// switch on a number instead of parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,

    // ==================== 1xxx: Auth ====================
    /// Not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Token was revoked by logout
    SessionRevoked = 1005,
    /// Too many login attempts
    TooManyAttempts = 1006,

    // ==================== 3xxx: Client ====================
    /// Client not found
    ClientNotFound = 3001,
    /// Another active client has the same full name
    ClientNameExists = 3002,
    /// Another active client has the same national ID
    ClientNationalIdExists = 3003,
    /// Email already in use
    EmailExists = 3004,
    /// Client younger than the minimum age
    ClientTooYoung = 3005,
    /// Full name changed too recently
    NameChangeTooSoon = 3006,

    // ==================== 4xxx: Coach ====================
    /// Coach not found
    CoachNotFound = 4001,

    // ==================== 5xxx: Payment ====================
    /// Payment not found
    PaymentNotFound = 5001,
    /// Coverage interval overlaps an existing payment
    PaymentOverlap = 5002,
    /// Amount missing, not finite or not positive
    InvalidAmount = 5003,
    /// Subscription period selector missing or invalid
    InvalidPeriod = 5004,

    // ==================== 6xxx: Promotion ====================
    /// Promotion not found
    PromotionNotFound = 6001,
    /// Promotion inactive or outside its validity window
    PromotionInapplicable = 6002,

    // ==================== 7xxx: Attendance ====================
    /// Attendance entry not found
    AttendanceNotFound = 7001,
    /// Client already checked in on that UTC day
    DuplicateCheckIn = 7002,
    /// Client has no current payment coverage
    PaymentNotCurrent = 7003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",

            // Auth
            ErrorCode::NotAuthenticated => "Authentication required",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Token has expired",
            ErrorCode::TokenInvalid => "Invalid token",
            ErrorCode::SessionRevoked => "Session has been closed",
            ErrorCode::TooManyAttempts => "Too many attempts, try again later",

            // Client
            ErrorCode::ClientNotFound => "Client not found",
            ErrorCode::ClientNameExists => "A client with the same full name already exists",
            ErrorCode::ClientNationalIdExists => {
                "A client with the same national ID already exists"
            }
            ErrorCode::EmailExists => "Email is already in use",
            ErrorCode::ClientTooYoung => "Minimum age is 13 years",
            ErrorCode::NameChangeTooSoon => "Full name can only be changed once every 15 days",

            // Coach
            ErrorCode::CoachNotFound => "Coach not found",

            // Payment
            ErrorCode::PaymentNotFound => "Payment not found",
            ErrorCode::PaymentOverlap => "Client already has a payment covering this period",
            ErrorCode::InvalidAmount => "Invalid amount",
            ErrorCode::InvalidPeriod => "Invalid subscription period",

            // Promotion
            ErrorCode::PromotionNotFound => "Promotion not found",
            ErrorCode::PromotionInapplicable => "Promotion is inactive or outside its period",

            // Attendance
            ErrorCode::AttendanceNotFound => "Attendance entry not found",
            ErrorCode::DuplicateCheckIn => "Client already checked in today",
            ErrorCode::PaymentNotCurrent => "Client payment is not up to date",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::SessionRevoked),
            1006 => Ok(ErrorCode::TooManyAttempts),

            // Client
            3001 => Ok(ErrorCode::ClientNotFound),
            3002 => Ok(ErrorCode::ClientNameExists),
            3003 => Ok(ErrorCode::ClientNationalIdExists),
            3004 => Ok(ErrorCode::EmailExists),
            3005 => Ok(ErrorCode::ClientTooYoung),
            3006 => Ok(ErrorCode::NameChangeTooSoon),

            // Coach
            4001 => Ok(ErrorCode::CoachNotFound),

            // Payment
            5001 => Ok(ErrorCode::PaymentNotFound),
            5002 => Ok(ErrorCode::PaymentOverlap),
            5003 => Ok(ErrorCode::InvalidAmount),
            5004 => Ok(ErrorCode::InvalidPeriod),

            // Promotion
            6001 => Ok(ErrorCode::PromotionNotFound),
            6002 => Ok(ErrorCode::PromotionInapplicable),

            // Attendance
            7001 => Ok(ErrorCode::AttendanceNotFound),
            7002 => Ok(ErrorCode::DuplicateCheckIn),
            7003 => Ok(ErrorCode::PaymentNotCurrent),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::ClientNotFound.code(), 3001);
        assert_eq!(ErrorCode::NameChangeTooSoon.code(), 3006);
        assert_eq!(ErrorCode::PaymentOverlap.code(), 5002);
        assert_eq!(ErrorCode::PromotionInapplicable.code(), 6002);
        assert_eq!(ErrorCode::PaymentNotCurrent.code(), 7003);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_every_code() {
        let all = [
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::AlreadyExists,
            ErrorCode::NotAuthenticated,
            ErrorCode::InvalidCredentials,
            ErrorCode::TokenExpired,
            ErrorCode::TokenInvalid,
            ErrorCode::SessionRevoked,
            ErrorCode::TooManyAttempts,
            ErrorCode::ClientNotFound,
            ErrorCode::ClientNameExists,
            ErrorCode::ClientNationalIdExists,
            ErrorCode::EmailExists,
            ErrorCode::ClientTooYoung,
            ErrorCode::NameChangeTooSoon,
            ErrorCode::CoachNotFound,
            ErrorCode::PaymentNotFound,
            ErrorCode::PaymentOverlap,
            ErrorCode::InvalidAmount,
            ErrorCode::InvalidPeriod,
            ErrorCode::PromotionNotFound,
            ErrorCode::PromotionInapplicable,
            ErrorCode::AttendanceNotFound,
            ErrorCode::DuplicateCheckIn,
            ErrorCode::PaymentNotCurrent,
            ErrorCode::InternalError,
            ErrorCode::DatabaseError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
        assert_eq!(
            InvalidErrorCode(4242).to_string(),
            "invalid error code: 4242"
        );
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::DuplicateCheckIn).unwrap();
        assert_eq!(json, "7002");
        let code: ErrorCode = serde_json::from_str("5002").unwrap();
        assert_eq!(code, ErrorCode::PaymentOverlap);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }
}
