//! Dashboard statistics

use serde::{Deserialize, Serialize};

/// Figures shown on the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatisticsOverview {
    /// Selected UTC day (YYYY-MM-DD)
    pub day: String,
    /// Year of `monthly_revenue`
    pub year: i32,
    pub total_clients: i64,
    pub total_coaches: i64,
    pub active_promotions: i64,
    pub revenue_total: f64,
    pub revenue_day: f64,
    pub revenue_month: f64,
    pub revenue_year: f64,
    /// Revenue per calendar month of `year`, January first
    pub monthly_revenue: Vec<f64>,
    /// Clients whose latest payment still covers now
    pub up_to_date: i64,
    pub not_up_to_date: i64,
    /// Clients whose first payment falls in the current month / year
    pub new_clients_month: i64,
    pub new_clients_year: i64,
    pub attendance_day: i64,
    /// Check-ins in the month / year of the selected day
    pub attendance_month: i64,
    pub attendance_year: i64,
}
