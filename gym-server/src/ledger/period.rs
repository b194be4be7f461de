//! Coverage end-date calculation

use chrono::{DateTime, Days, Months, Utc};
use shared::models::{PaymentPeriod, SubscriptionPeriod};

/// What a payment buys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSelector {
    Monthly,
    Quarterly,
    Annual,
    /// Explicit number of calendar months
    Months(u32),
    /// Exactly one calendar day
    DayPass,
}

impl PeriodSelector {
    /// Calendar months covered, `None` for a day pass
    pub fn months(self) -> Option<u32> {
        match self {
            Self::Monthly => Some(1),
            Self::Quarterly => Some(3),
            Self::Annual => Some(12),
            Self::Months(n) => Some(n),
            Self::DayPass => None,
        }
    }

    /// Period tag stored on the payment row
    pub fn payment_period(self) -> PaymentPeriod {
        match self {
            Self::Monthly => PaymentPeriod::Monthly,
            Self::Quarterly => PaymentPeriod::Quarterly,
            Self::Annual => PaymentPeriod::Annual,
            Self::Months(_) => PaymentPeriod::Custom,
            Self::DayPass => PaymentPeriod::DayPass,
        }
    }
}

impl From<SubscriptionPeriod> for PeriodSelector {
    fn from(period: SubscriptionPeriod) -> Self {
        match period {
            SubscriptionPeriod::Monthly => Self::Monthly,
            SubscriptionPeriod::Quarterly => Self::Quarterly,
            SubscriptionPeriod::Annual => Self::Annual,
        }
    }
}

/// Add calendar months, clamping the day to the end of the target month
/// (Jan 31 + 1 month = Feb 28/29). Saturates at the largest representable date.
pub fn add_months(start: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    start
        .checked_add_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// End of the coverage interval starting at `start` (exclusive)
pub fn end_of_coverage(start: DateTime<Utc>, selector: PeriodSelector) -> DateTime<Utc> {
    match selector.months() {
        Some(months) => add_months(start, months),
        None => start
            .checked_add_days(Days::new(1))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
    }
}
