//! Attendance Model

use serde::{Deserialize, Serialize};

/// One check-in (签到)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Attendance {
    pub id: i64,
    pub client_id: i64,
    pub checked_in_at: i64,
    pub created_at: i64,
}

/// Check-in with the client's name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AttendanceWithClient {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub attendance: Attendance,
    pub client_full_name: String,
}

/// Check-in payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendanceCreate {
    pub client_id: i64,
    /// RFC 3339, default now
    pub time: Option<String>,
}
