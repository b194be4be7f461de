//! Payment Model

use serde::{Deserialize, Serialize};

use super::SubscriptionPeriod;

/// How a payment's coverage length was chosen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentPeriod {
    Monthly,
    Quarterly,
    Annual,
    /// Explicit month count (submitted or imposed by a promotion)
    Custom,
    DayPass,
}

impl From<SubscriptionPeriod> for PaymentPeriod {
    fn from(period: SubscriptionPeriod) -> Self {
        match period {
            SubscriptionPeriod::Monthly => Self::Monthly,
            SubscriptionPeriod::Quarterly => Self::Quarterly,
            SubscriptionPeriod::Annual => Self::Annual,
        }
    }
}

impl PaymentPeriod {
    /// Calendar period recorded on the client, if this is one
    pub fn subscription_period(self) -> Option<SubscriptionPeriod> {
        match self {
            Self::Monthly => Some(SubscriptionPeriod::Monthly),
            Self::Quarterly => Some(SubscriptionPeriod::Quarterly),
            Self::Annual => Some(SubscriptionPeriod::Annual),
            Self::Custom | Self::DayPass => None,
        }
    }
}

/// Payment entity: one coverage interval `[payment_date, next_payment_date)`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub client_id: i64,
    pub promotion_id: Option<i64>,
    pub amount: f64,
    pub period: PaymentPeriod,
    /// Month count used for the end date (None for day passes)
    pub months: Option<i64>,
    pub payment_date: i64,
    pub next_payment_date: i64,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub deleted_at: Option<i64>,
}

/// Payment joined with client and promotion names (list/detail views)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaymentDetail {
    #[serde(flatten)]
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub payment: Payment,
    pub client_full_name: String,
    pub promotion_name: Option<String>,
}

/// Create payment payload
///
/// Exactly one of `subscription_period`, `months` or `day_pass` selects
/// the coverage length; a promotion with its own month count overrides it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub client_id: i64,
    pub subscription_period: Option<SubscriptionPeriod>,
    pub months: Option<u32>,
    #[serde(default)]
    pub day_pass: bool,
    pub promotion_id: Option<i64>,
    pub amount: Option<f64>,
    /// RFC 3339 or YYYY-MM-DD, default now
    pub payment_date: Option<String>,
    /// RFC 3339 or YYYY-MM-DD, default computed from the period
    pub next_payment_date: Option<String>,
    pub notes: Option<String>,
}

/// Update payment payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub client_id: Option<i64>,
    pub amount: Option<f64>,
    pub subscription_period: Option<SubscriptionPeriod>,
    pub payment_date: Option<String>,
    pub next_payment_date: Option<String>,
    pub notes: Option<String>,
}
