use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Headline numbers for the dashboard. Hour fields are minute totals
/// divided by 60; windows are calendar-based (Sun–Sat weeks, current month).
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub last_activity: Option<DateTime<Utc>>,
    pub total_hours_this_month: f64,
    pub weekly_hours: f64,
    pub previous_week_hours: f64,
    /// Percent change week-over-week; 0 when the previous week is empty.
    pub weekly_trend_pct: f64,
    /// Mon–Fri days from the 1st of the month through today.
    pub working_days: u32,
    pub average_daily_hours: f64,
}

/// Minutes tracked on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyHours {
    pub date: NaiveDate,
    pub minutes: i64,
}

/// Minutes tracked against one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectHours {
    pub project_id: String,
    pub project_name: String,
    pub minutes: i64,
}

/// Minutes tracked in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyHours {
    pub year: i32,
    pub month: u32,
    pub minutes: i64,
}
