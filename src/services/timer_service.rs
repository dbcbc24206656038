use crate::models::{ServiceError, TimeEntry, UpdateEntry};
use crate::repositories::{ProjectRepository, TimeEntryRepository};
use crate::services::duration::duration_minutes;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Owns the time-entry lifecycle. Per user the state is either Idle (no
/// active entry) or Running (exactly one); `start` and `stop`/`pause` are
/// the transitions, manual entries bypass the state entirely.
pub struct TimerService {
    entries: Arc<dyn TimeEntryRepository>,
    projects: Arc<dyn ProjectRepository>,
}

impl TimerService {
    pub fn new(entries: Arc<dyn TimeEntryRepository>, projects: Arc<dyn ProjectRepository>) -> Self {
        Self { entries, projects }
    }

    /// Idle → Running. Fails `NotFound` for an unknown project and
    /// `Conflict` when a timer is already running for the user.
    pub async fn start(
        &self,
        user_id: &str,
        project_id: &str,
        description: &str,
    ) -> Result<TimeEntry, ServiceError> {
        self.require_project(project_id).await?;

        // Fast path only; two racing starts can both pass this check. The
        // partial unique index on (user_id) WHERE is_active is what makes
        // the losing insert fail with Conflict.
        if self.entries.find_active(user_id, None).await?.is_some() {
            return Err(ServiceError::Conflict(
                "active entry already exists".to_string(),
            ));
        }

        let entry = TimeEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            project_id: project_id.to_string(),
            description: description.to_string(),
            start_time: Utc::now(),
            end_time: None,
            duration_minutes: None,
            is_active: true,
        };
        self.entries.insert(&entry).await?;

        tracing::info!(user_id, entry_id = %entry.id, project_id, "timer started");
        Ok(entry)
    }

    /// Running → Idle. Closes the active entry (optionally matched against
    /// `entry_id`) with the current time and computed duration.
    pub async fn stop(
        &self,
        user_id: &str,
        entry_id: Option<&str>,
    ) -> Result<TimeEntry, ServiceError> {
        let mut entry = self
            .entries
            .find_active(user_id, entry_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("no active time entry".to_string()))?;

        let end_time = Utc::now();
        entry.end_time = Some(end_time);
        entry.duration_minutes = Some(duration_minutes(entry.start_time, end_time));
        entry.is_active = false;
        self.entries.update(&entry).await?;

        tracing::info!(
            user_id,
            entry_id = %entry.id,
            minutes = entry.duration_minutes,
            "timer stopped"
        );
        Ok(entry)
    }

    /// Identical to [`stop`](Self::stop): there is no resume, so pausing a
    /// timer closes it. Kept as a separate operation because callers expose
    /// both actions.
    pub async fn pause(&self, user_id: &str) -> Result<TimeEntry, ServiceError> {
        self.stop(user_id, None).await
    }

    /// Create an already-closed entry for a past block of work. Does not
    /// touch the user's running timer, if any.
    pub async fn add_manual_entry(
        &self,
        user_id: &str,
        project_id: &str,
        description: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<TimeEntry, ServiceError> {
        self.require_project(project_id).await?;

        if end_time <= start_time {
            return Err(ServiceError::Validation(
                "end time must be after start time".to_string(),
            ));
        }

        let entry = TimeEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            project_id: project_id.to_string(),
            description: description.to_string(),
            start_time,
            end_time: Some(end_time),
            duration_minutes: Some(duration_minutes(start_time, end_time)),
            is_active: false,
        };
        self.entries.insert(&entry).await?;

        tracing::info!(user_id, entry_id = %entry.id, "manual entry added");
        Ok(entry)
    }

    /// Apply a partial update to one of the user's entries. Returns
    /// `Ok(None)` when no such entry exists — callers translate that to
    /// their own not-found handling.
    ///
    /// Changing either time field recomputes the duration from the
    /// resulting pair; the pair's ordering is NOT re-validated, so an
    /// inverted range is stored as-is (see `UpdateEntry`).
    pub async fn update_entry(
        &self,
        user_id: &str,
        entry_id: &str,
        changes: UpdateEntry,
    ) -> Result<Option<TimeEntry>, ServiceError> {
        let Some(mut entry) = self.entries.find_by_id_for_user(user_id, entry_id).await? else {
            return Ok(None);
        };

        if let Some(description) = changes.description {
            entry.description = description;
        }
        if let Some(project_id) = changes.project_id {
            entry.project_id = project_id;
        }

        let times_changed = changes.start_time.is_some() || changes.end_time.is_some();
        if let Some(start_time) = changes.start_time {
            entry.start_time = start_time;
        }
        if let Some(end_time) = changes.end_time {
            entry.end_time = Some(end_time);
        }
        if times_changed {
            if let Some(end_time) = entry.end_time {
                entry.duration_minutes = Some(duration_minutes(entry.start_time, end_time));
                entry.is_active = false;
            }
        }

        self.entries.update(&entry).await?;

        tracing::debug!(user_id, entry_id, "entry updated");
        Ok(Some(entry))
    }

    /// True iff an entry owned by the user was removed.
    pub async fn delete_entry(&self, user_id: &str, entry_id: &str) -> Result<bool, ServiceError> {
        let deleted = self.entries.delete(user_id, entry_id).await?;
        if deleted {
            tracing::info!(user_id, entry_id, "entry deleted");
        }
        Ok(deleted)
    }

    /// Read-only lookup of the user's running entry.
    pub async fn get_active_entry(&self, user_id: &str) -> Result<Option<TimeEntry>, ServiceError> {
        self.entries.find_active(user_id, None).await
    }

    async fn require_project(&self, project_id: &str) -> Result<(), ServiceError> {
        if self.projects.exists(project_id).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound("project not found".to_string()))
        }
    }
}
