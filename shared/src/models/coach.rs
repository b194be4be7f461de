//! Coach Model

use serde::{Deserialize, Serialize};

/// Coach entity (教练)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Coach {
    pub id: i64,
    pub full_name: String,
    pub specialty: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub date_of_birth: Option<String>,
    pub registration_date: i64,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

/// Create coach payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachCreate {
    #[serde(default)]
    pub full_name: String,
    pub specialty: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub date_of_birth: Option<String>,
    pub registration_date: Option<String>,
    pub notes: Option<String>,
}

/// Update coach payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoachUpdate {
    pub full_name: Option<String>,
    pub specialty: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub date_of_birth: Option<String>,
    pub registration_date: Option<String>,
    pub notes: Option<String>,
}
