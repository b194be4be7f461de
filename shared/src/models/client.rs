//! Client Model

use serde::{Deserialize, Serialize};

/// Calendar subscription period (月/季/年)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum SubscriptionPeriod {
    Monthly,
    Quarterly,
    Annual,
}

impl SubscriptionPeriod {
    /// Calendar months covered by one period
    pub fn months(self) -> u32 {
        match self {
            Self::Monthly => 1,
            Self::Quarterly => 3,
            Self::Annual => 12,
        }
    }
}

/// Client entity (会员)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Client {
    pub id: i64,
    /// Uppercase, unique among non-deleted clients
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Uppercase alphanumeric, unique among non-deleted clients
    pub national_id: Option<String>,
    /// YYYY-MM-DD
    pub date_of_birth: Option<String>,
    pub registration_date: i64,
    /// Period of the most recent payment
    pub subscription_period: Option<SubscriptionPeriod>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

/// Create client payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientCreate {
    #[serde(default)]
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    /// dd/MM/yyyy, YYYY-MM-DD or RFC 3339
    pub date_of_birth: Option<String>,
    pub registration_date: Option<String>,
    pub subscription_period: Option<SubscriptionPeriod>,
    pub notes: Option<String>,
}

/// Update client payload (absent fields keep their value)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    pub date_of_birth: Option<String>,
    pub registration_date: Option<String>,
    pub subscription_period: Option<SubscriptionPeriod>,
    pub notes: Option<String>,
}
