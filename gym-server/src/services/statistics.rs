//! Dashboard figures
//!
//! Money is summed in `Decimal` and rounded to cents once at the end.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use rust_decimal::prelude::*;
use shared::models::StatisticsOverview;
use sqlx::SqlitePool;

use crate::db::repository::attendance;
use crate::db::repository::statistics::{self, EntityCounts, PaymentFact};
use crate::ledger::utc_day_bounds;
use crate::utils::time::{day_start, month_start, year_start};
use crate::utils::AppResult;

const DECIMAL_PLACES: u32 = 2;

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Reference points for one dashboard computation
#[derive(Debug, Clone, Copy)]
pub struct Window {
    pub now: DateTime<Utc>,
    /// Day for `revenue_day` and the attendance figures
    pub day: NaiveDate,
    /// Year of the monthly revenue series
    pub year: i32,
}

impl Window {
    pub fn new(now: DateTime<Utc>, day: Option<NaiveDate>, year: Option<i32>) -> Self {
        Self {
            now,
            day: day.unwrap_or_else(|| now.date_naive()),
            year: year.unwrap_or_else(|| now.year()),
        }
    }
}

/// Payment-derived part of the overview
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaymentSummary {
    pub revenue_total: f64,
    pub revenue_day: f64,
    pub revenue_month: f64,
    pub revenue_year: f64,
    pub monthly_revenue: Vec<f64>,
    pub up_to_date: i64,
    pub not_up_to_date: i64,
    pub new_clients_month: i64,
    pub new_clients_year: i64,
}

/// Fold payment facts into revenue and client-status figures.
///
/// Month and year revenue run from the start of the current UTC month/year
/// (relative to `now`). Per client, the payment with the latest start decides
/// up-to-date status (`next_payment_date >= now`) and the earliest decides
/// whether the client is new.
pub fn summarize(facts: &[PaymentFact], window: &Window) -> PaymentSummary {
    let (day_from, day_to) = utc_day_bounds(day_start(window.day));
    let (day_from, day_to) = (day_from.timestamp_millis(), day_to.timestamp_millis());
    let month_from = month_start(window.now).timestamp_millis();
    let year_from = year_start(window.now).timestamp_millis();
    let now = window.now.timestamp_millis();

    let mut total = Decimal::ZERO;
    let mut day = Decimal::ZERO;
    let mut month = Decimal::ZERO;
    let mut year = Decimal::ZERO;
    let mut monthly = [Decimal::ZERO; 12];
    // client -> (first start, (latest start, its end))
    let mut per_client: BTreeMap<i64, (i64, (i64, i64))> = BTreeMap::new();

    for fact in facts {
        let amount = to_decimal(fact.amount);
        total += amount;
        if (day_from..day_to).contains(&fact.payment_date) {
            day += amount;
        }
        if fact.payment_date >= month_from {
            month += amount;
        }
        if fact.payment_date >= year_from {
            year += amount;
        }
        let paid_on = shared::util::millis_to_utc(fact.payment_date);
        if paid_on.year() == window.year {
            monthly[paid_on.month0() as usize] += amount;
        }

        let entry = per_client
            .entry(fact.client_id)
            .or_insert((fact.payment_date, (fact.payment_date, fact.next_payment_date)));
        entry.0 = entry.0.min(fact.payment_date);
        if fact.payment_date >= entry.1.0 {
            entry.1 = (fact.payment_date, fact.next_payment_date);
        }
    }

    let mut summary = PaymentSummary {
        revenue_total: to_f64(total),
        revenue_day: to_f64(day),
        revenue_month: to_f64(month),
        revenue_year: to_f64(year),
        monthly_revenue: monthly.into_iter().map(to_f64).collect(),
        ..Default::default()
    };
    for (first_start, (_, latest_end)) in per_client.into_values() {
        if latest_end >= now {
            summary.up_to_date += 1;
        } else {
            summary.not_up_to_date += 1;
        }
        if first_start >= month_from {
            summary.new_clients_month += 1;
        }
        if first_start >= year_from {
            summary.new_clients_year += 1;
        }
    }
    summary
}

/// Assemble the dashboard overview
pub async fn overview(pool: &SqlitePool, window: Window) -> AppResult<StatisticsOverview> {
    let EntityCounts {
        clients,
        coaches,
        active_promotions,
    } = statistics::entity_counts(pool).await?;
    let facts = statistics::payment_facts(pool).await?;
    let summary = summarize(&facts, &window);

    let day_from = day_start(window.day);
    let month_from = month_start(day_from);
    let year_from = year_start(day_from);
    let (_, day_to) = utc_day_bounds(day_from);
    let month_to = month_from
        .checked_add_months(Months::new(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let year_to = year_from
        .checked_add_months(Months::new(12))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let count = |from: DateTime<Utc>, to: DateTime<Utc>| {
        attendance::count_between(pool, from.timestamp_millis(), to.timestamp_millis())
    };
    let attendance_day = count(day_from, day_to).await?;
    let attendance_month = count(month_from, month_to).await?;
    let attendance_year = count(year_from, year_to).await?;

    Ok(StatisticsOverview {
        day: window.day.format("%Y-%m-%d").to_string(),
        year: window.year,
        total_clients: clients,
        total_coaches: coaches,
        active_promotions,
        revenue_total: summary.revenue_total,
        revenue_day: summary.revenue_day,
        revenue_month: summary.revenue_month,
        revenue_year: summary.revenue_year,
        monthly_revenue: summary.monthly_revenue,
        up_to_date: summary.up_to_date,
        not_up_to_date: summary.not_up_to_date,
        new_clients_month: summary.new_clients_month,
        new_clients_year: summary.new_clients_year,
        attendance_day,
        attendance_month,
        attendance_year,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ms(y: i32, m: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap().timestamp_millis()
    }

    fn fact(client_id: i64, amount: f64, start: i64, end: i64) -> PaymentFact {
        PaymentFact {
            client_id,
            amount,
            payment_date: start,
            next_payment_date: end,
        }
    }

    #[test]
    fn test_summarize_revenue_and_status() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let window = Window::new(now, None, None);
        let facts = vec![
            // Client 1: since last year, renewed this month, current
            fact(1, 0.1, ms(2023, 12, 10), ms(2024, 1, 10)),
            fact(1, 0.2, ms(2024, 3, 10), ms(2024, 4, 10)),
            // Client 2: new this year, lapsed
            fact(2, 50.0, ms(2024, 1, 5), ms(2024, 2, 5)),
            // Client 3: new this month, coverage ends exactly now
            fact(3, 30.0, ms(2024, 3, 1), now.timestamp_millis()),
        ];

        let s = summarize(&facts, &window);
        assert_eq!(s.revenue_total, 80.3);
        assert_eq!(s.revenue_day, 0.2);
        assert_eq!(s.revenue_month, 30.2);
        assert_eq!(s.revenue_year, 80.2);
        assert_eq!(s.monthly_revenue.len(), 12);
        assert_eq!(s.monthly_revenue[0], 50.0);
        assert_eq!(s.monthly_revenue[2], 30.2);
        assert_eq!((s.up_to_date, s.not_up_to_date), (2, 1));
        assert_eq!((s.new_clients_month, s.new_clients_year), (1, 2));
    }

    #[test]
    fn test_selected_day_and_year() {
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let window = Window::new(now, NaiveDate::from_ymd_opt(2023, 12, 10), Some(2023));
        let facts = vec![fact(1, 25.0, ms(2023, 12, 10), ms(2024, 1, 10))];

        let s = summarize(&facts, &window);
        assert_eq!(s.revenue_day, 25.0);
        assert_eq!(s.monthly_revenue[11], 25.0);
        assert_eq!(s.revenue_year, 0.0);
    }

    #[test]
    fn test_empty() {
        let window = Window::new(Utc::now(), None, None);
        let s = summarize(&[], &window);
        assert_eq!(s.revenue_total, 0.0);
        assert_eq!(s.monthly_revenue, vec![0.0; 12]);
        assert_eq!(s.up_to_date + s.not_up_to_date, 0);
    }
}
