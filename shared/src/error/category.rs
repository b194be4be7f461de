//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 3xxx: Client errors
/// - 4xxx: Coach errors
/// - 5xxx: Payment errors
/// - 6xxx: Promotion errors
/// - 7xxx: Attendance errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Client registry errors (3xxx)
    Client,
    /// Coach registry errors (4xxx)
    Coach,
    /// Payment errors (5xxx)
    Payment,
    /// Promotion errors (6xxx)
    Promotion,
    /// Attendance errors (7xxx)
    Attendance,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..3000 => Self::Auth,
            3000..4000 => Self::Client,
            4000..5000 => Self::Coach,
            5000..6000 => Self::Payment,
            6000..7000 => Self::Promotion,
            7000..8000 => Self::Attendance,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Client => "client",
            Self::Coach => "coach",
            Self::Payment => "payment",
            Self::Promotion => "promotion",
            Self::Attendance => "attendance",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
