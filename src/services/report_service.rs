//! Read-only aggregations over an already-authorized user scope. Nothing
//! here re-derives authorization or mutates entries; only rows with a
//! resolved duration contribute to the sums.

use crate::models::{
    DailyHours, DashboardSummary, MonthlyHours, ProjectHours, ServiceError, UserScope,
};
use crate::repositories::TimeEntryRepository;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct ReportService {
    entries: Arc<dyn TimeEntryRepository>,
}

impl ReportService {
    pub fn new(entries: Arc<dyn TimeEntryRepository>) -> Self {
        Self { entries }
    }

    pub async fn dashboard_summary(
        &self,
        users: &UserScope,
    ) -> Result<DashboardSummary, ServiceError> {
        self.dashboard_summary_at(users, Utc::now()).await
    }

    /// Clock-injected variant: `now` pins the calendar windows.
    pub async fn dashboard_summary_at(
        &self,
        users: &UserScope,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary, ServiceError> {
        let today = now.date_naive();
        let month_first = month_start(today);
        // Weeks run Sunday through Saturday.
        let week_first = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
        let week_last = week_first + Duration::days(6);
        let prev_week_first = week_first - Duration::days(7);
        let prev_week_last = week_first - Duration::days(1);

        let window_start = month_first.min(prev_week_first);
        let entries = self
            .entries
            .find_for_scope(users, Some(window_start), None)
            .await?;
        let last_activity = self.entries.last_started_at(users).await?;

        let mut month_minutes = 0i64;
        let mut week_minutes = 0i64;
        let mut prev_week_minutes = 0i64;
        for item in &entries {
            let Some(minutes) = item.entry.duration_minutes else {
                continue;
            };
            let day = item.entry.start_time.date_naive();
            if day >= month_first {
                month_minutes += minutes;
            }
            if day >= week_first && day <= week_last {
                week_minutes += minutes;
            }
            if day >= prev_week_first && day <= prev_week_last {
                prev_week_minutes += minutes;
            }
        }

        let total_hours_this_month = minutes_to_hours(month_minutes);
        let weekly_hours = minutes_to_hours(week_minutes);
        let previous_week_hours = minutes_to_hours(prev_week_minutes);
        let weekly_trend_pct = if prev_week_minutes == 0 {
            0.0
        } else {
            (weekly_hours - previous_week_hours) / previous_week_hours * 100.0
        };

        let working_days = count_working_days(month_first, today);
        let average_daily_hours = if working_days == 0 {
            0.0
        } else {
            total_hours_this_month / working_days as f64
        };

        Ok(DashboardSummary {
            last_activity,
            total_hours_this_month,
            weekly_hours,
            previous_week_hours,
            weekly_trend_pct,
            working_days,
            average_daily_hours,
        })
    }

    /// Minutes per calendar day over the window `[today - days + 1, today]`,
    /// zero-filled so every day in the window is present.
    pub async fn daily_hours(
        &self,
        users: &UserScope,
        days: u32,
    ) -> Result<Vec<DailyHours>, ServiceError> {
        self.daily_hours_at(users, days, Utc::now()).await
    }

    pub async fn daily_hours_at(
        &self,
        users: &UserScope,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyHours>, ServiceError> {
        if days == 0 {
            return Ok(Vec::new());
        }
        let today = now.date_naive();
        let window_first = today - Duration::days(days as i64 - 1);

        let entries = self
            .entries
            .find_for_scope(users, Some(window_first), Some(today))
            .await?;

        let mut buckets: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        let mut day = window_first;
        while day <= today {
            buckets.insert(day, 0);
            day = day + Duration::days(1);
        }
        for item in &entries {
            let Some(minutes) = item.entry.duration_minutes else {
                continue;
            };
            let day = item.entry.start_time.date_naive();
            if let Some(total) = buckets.get_mut(&day) {
                *total += minutes;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(date, minutes)| DailyHours { date, minutes })
            .collect())
    }

    /// Minutes per project, bounded to the current calendar month. Busiest
    /// projects first.
    pub async fn hours_by_project_current_month(
        &self,
        users: &UserScope,
    ) -> Result<Vec<ProjectHours>, ServiceError> {
        self.hours_by_project_current_month_at(users, Utc::now())
            .await
    }

    pub async fn hours_by_project_current_month_at(
        &self,
        users: &UserScope,
        now: DateTime<Utc>,
    ) -> Result<Vec<ProjectHours>, ServiceError> {
        let today = now.date_naive();
        let entries = self
            .entries
            .find_for_scope(users, Some(month_start(today)), Some(month_end(today)))
            .await?;

        let mut buckets: BTreeMap<String, (String, i64)> = BTreeMap::new();
        for item in &entries {
            let Some(minutes) = item.entry.duration_minutes else {
                continue;
            };
            let bucket = buckets
                .entry(item.entry.project_id.clone())
                .or_insert_with(|| (item.project_name.clone(), 0));
            bucket.1 += minutes;
        }

        let mut totals: Vec<ProjectHours> = buckets
            .into_iter()
            .map(|(project_id, (project_name, minutes))| ProjectHours {
                project_id,
                project_name,
                minutes,
            })
            .collect();
        totals.sort_by(|a, b| b.minutes.cmp(&a.minutes));
        Ok(totals)
    }

    /// Minutes per calendar month over the last `months` months including
    /// the current one, zero-filled, oldest first.
    pub async fn monthly_billed_hours(
        &self,
        users: &UserScope,
        months: u32,
    ) -> Result<Vec<MonthlyHours>, ServiceError> {
        self.monthly_billed_hours_at(users, months, Utc::now()).await
    }

    pub async fn monthly_billed_hours_at(
        &self,
        users: &UserScope,
        months: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<MonthlyHours>, ServiceError> {
        if months == 0 {
            return Ok(Vec::new());
        }
        let today = now.date_naive();
        let current_first = month_start(today);
        let window_first = shift_months_back(current_first, months - 1);

        let entries = self
            .entries
            .find_for_scope(users, Some(window_first), Some(month_end(today)))
            .await?;

        let mut buckets: BTreeMap<(i32, u32), i64> = BTreeMap::new();
        for offset in 0..months {
            let month = shift_months_back(current_first, months - 1 - offset);
            buckets.insert((month.year(), month.month()), 0);
        }
        for item in &entries {
            let Some(minutes) = item.entry.duration_minutes else {
                continue;
            };
            let day = item.entry.start_time.date_naive();
            if let Some(total) = buckets.get_mut(&(day.year(), day.month())) {
                *total += minutes;
            }
        }

        Ok(buckets
            .into_iter()
            .map(|((year, month), minutes)| MonthlyHours { year, month, minutes })
            .collect())
    }
}

fn minutes_to_hours(minutes: i64) -> f64 {
    minutes as f64 / 60.0
}

fn month_start(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

fn month_end(day: NaiveDate) -> NaiveDate {
    let next_first = if day.month() == 12 {
        NaiveDate::from_ymd_opt(day.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(day.year(), day.month() + 1, 1)
    };
    next_first
        .map(|first| first - Duration::days(1))
        .unwrap_or(day)
}

/// First day of the month `n` months before `first` (itself a month start).
fn shift_months_back(first: NaiveDate, n: u32) -> NaiveDate {
    let total = first.year() * 12 + first.month0() as i32 - n as i32;
    let year = total.div_euclid(12);
    let month0 = total.rem_euclid(12) as u32;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or(first)
}

/// Mon–Fri days in `[from, to]`, inclusive.
fn count_working_days(from: NaiveDate, to: NaiveDate) -> u32 {
    let mut count = 0;
    let mut day = from;
    while day <= to {
        if day.weekday().number_from_monday() <= 5 {
            count += 1;
        }
        day = day + Duration::days(1);
    }
    count
}
