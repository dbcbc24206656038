use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single tracked block of work.
///
/// An entry is either running (`is_active`, no end time, no duration) or
/// closed (`end_time` and `duration_minutes` both set). No user ever holds
/// more than one running entry; the store enforces this with a partial
/// unique index on `(user_id) WHERE is_active`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub user_id: String,
    pub project_id: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub is_active: bool,
}

/// A time entry joined with its project, as returned by scoped listings.
#[derive(Debug, Clone, Serialize)]
pub struct EntryWithProject {
    #[serde(flatten)]
    pub entry: TimeEntry,
    pub project_name: String,
    pub client_name: Option<String>,
}

/// Partial update applied to an existing entry.
///
/// When `start_time` or `end_time` changes, the duration is recomputed from
/// the resulting pair. Ordering of the pair is NOT re-validated here — an
/// inverted range slips through. Callers wanting strict ordering must check
/// before updating.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEntry {
    pub description: Option<String>,
    pub project_id: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl UpdateEntry {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.project_id.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }
}
