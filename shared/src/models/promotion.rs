//! Promotion Model

use serde::{Deserialize, Serialize};

/// Promotion entity (促销)
///
/// Applicable at an instant when `active` and the instant lies inside
/// `[start_date, end_date]`; a missing bound leaves that side open.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Promotion {
    pub id: i64,
    pub name: String,
    /// Price charged instead of the submitted amount
    pub fixed_price: f64,
    /// Coverage length replacing the submitted period
    pub subscription_months: Option<i64>,
    pub active: bool,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create promotion payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromotionCreate {
    #[serde(default)]
    pub name: String,
    pub fixed_price: f64,
    pub subscription_months: Option<i64>,
    pub active: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub notes: Option<String>,
}

/// Update promotion payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromotionUpdate {
    pub name: Option<String>,
    pub fixed_price: Option<f64>,
    pub subscription_months: Option<i64>,
    pub active: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub notes: Option<String>,
}
