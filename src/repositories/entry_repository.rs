use crate::models::{
    EntryWithProject, QueryScope, ServiceError, SortKey, SortOrder, TimeEntry, UserScope,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

#[async_trait]
pub trait TimeEntryRepository: Send + Sync {
    /// Insert a new entry. Inserting a second active entry for the same
    /// user fails with `Conflict` via the store's partial unique index.
    async fn insert(&self, entry: &TimeEntry) -> Result<(), ServiceError>;
    async fn find_by_id_for_user(
        &self,
        user_id: &str,
        entry_id: &str,
    ) -> Result<Option<TimeEntry>, ServiceError>;
    /// The user's running entry, optionally constrained to a specific id.
    async fn find_active(
        &self,
        user_id: &str,
        entry_id: Option<&str>,
    ) -> Result<Option<TimeEntry>, ServiceError>;
    async fn update(&self, entry: &TimeEntry) -> Result<(), ServiceError>;
    /// True iff a row owned by `user_id` was removed.
    async fn delete(&self, user_id: &str, entry_id: &str) -> Result<bool, ServiceError>;
    /// Execute an authorized scope: filtered, sorted, paginated rows plus
    /// the unpaginated total.
    async fn list_scoped(
        &self,
        scope: &QueryScope,
    ) -> Result<(Vec<EntryWithProject>, i64), ServiceError>;
    /// All rows for a user scope within inclusive day-level bounds on the
    /// calendar date of `start_time`. Used by the report aggregations.
    async fn find_for_scope(
        &self,
        users: &UserScope,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<EntryWithProject>, ServiceError>;
    /// Most recent `start_time` within the scope, over all time.
    async fn last_started_at(
        &self,
        users: &UserScope,
    ) -> Result<Option<DateTime<Utc>>, ServiceError>;
}

pub struct SqliteTimeEntryRepository {
    pool: SqlitePool,
}

impl SqliteTimeEntryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: String,
    user_id: String,
    project_id: String,
    description: String,
    start_time: NaiveDateTime,
    end_time: Option<NaiveDateTime>,
    duration_minutes: Option<i64>,
    is_active: bool,
}

impl From<EntryRow> for TimeEntry {
    fn from(row: EntryRow) -> Self {
        TimeEntry {
            id: row.id,
            user_id: row.user_id,
            project_id: row.project_id,
            description: row.description,
            start_time: row.start_time.and_utc(),
            end_time: row.end_time.map(|dt| dt.and_utc()),
            duration_minutes: row.duration_minutes,
            is_active: row.is_active,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EntryWithProjectRow {
    #[sqlx(flatten)]
    entry: EntryRow,
    project_name: String,
    client_name: Option<String>,
}

impl From<EntryWithProjectRow> for EntryWithProject {
    fn from(row: EntryWithProjectRow) -> Self {
        EntryWithProject {
            entry: row.entry.into(),
            project_name: row.project_name,
            client_name: row.client_name,
        }
    }
}

const ENTRY_COLUMNS: &str =
    "e.id, e.user_id, e.project_id, e.description, e.start_time, e.end_time, \
     e.duration_minutes, e.is_active";

/// Append the scope's user/project/search/date predicates. The base query
/// must already contain a `WHERE` clause (`WHERE 1 = 1`).
fn push_scope_filters(builder: &mut QueryBuilder<'_, Sqlite>, scope: &QueryScope) {
    push_user_filter(builder, &scope.users);

    if let Some(projects) = &scope.projects {
        builder.push(" AND e.project_id IN (");
        let mut separated = builder.separated(", ");
        for id in projects {
            separated.push_bind(id.clone());
        }
        builder.push(")");
    }

    if let Some(search) = &scope.search {
        let pattern = format!("%{}%", search.to_lowercase());
        builder
            .push(" AND (LOWER(e.description) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(p.name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(COALESCE(p.client_name, '')) LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    push_date_bounds(builder, scope.date_from, scope.date_to);
}

fn push_user_filter(builder: &mut QueryBuilder<'_, Sqlite>, users: &UserScope) {
    match users {
        UserScope::All => {}
        UserScope::Ids(ids) => {
            builder.push(" AND e.user_id IN (");
            let mut separated = builder.separated(", ");
            for id in ids {
                separated.push_bind(id.clone());
            }
            builder.push(")");
        }
    }
}

// Bounds compare the calendar date portion of start_time only.
fn push_date_bounds(
    builder: &mut QueryBuilder<'_, Sqlite>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) {
    if let Some(from) = from {
        builder
            .push(" AND date(e.start_time) >= date(")
            .push_bind(from)
            .push(")");
    }
    if let Some(to) = to {
        builder
            .push(" AND date(e.start_time) <= date(")
            .push_bind(to)
            .push(")");
    }
}

fn order_clause(sort_by: SortKey, sort_order: SortOrder) -> String {
    let column = match sort_by {
        SortKey::Date => "e.start_time",
        SortKey::Duration => "e.duration_minutes",
        SortKey::Project => "p.name",
    };
    let direction = match sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    // No secondary tie-break key; ordering among equal values is whatever
    // the store returns.
    format!(" ORDER BY {} {}", column, direction)
}

#[async_trait]
impl TimeEntryRepository for SqliteTimeEntryRepository {
    async fn insert(&self, entry: &TimeEntry) -> Result<(), ServiceError> {
        let start_time = entry.start_time.naive_utc();
        let end_time = entry.end_time.map(|dt| dt.naive_utc());
        let result = sqlx::query(
            "INSERT INTO time_entries (id, user_id, project_id, description, start_time, end_time, duration_minutes, is_active)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.project_id)
        .bind(&entry.description)
        .bind(start_time)
        .bind(end_time)
        .bind(entry.duration_minutes)
        .bind(entry.is_active)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            // The losing writer of two concurrent starts lands here.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(
                ServiceError::Conflict("active entry already exists".to_string()),
            ),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_id_for_user(
        &self,
        user_id: &str,
        entry_id: &str,
    ) -> Result<Option<TimeEntry>, ServiceError> {
        let row = sqlx::query_as::<_, EntryRow>(
            "SELECT id, user_id, project_id, description, start_time, end_time, duration_minutes, is_active
             FROM time_entries WHERE id = ? AND user_id = ?",
        )
        .bind(entry_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TimeEntry::from))
    }

    async fn find_active(
        &self,
        user_id: &str,
        entry_id: Option<&str>,
    ) -> Result<Option<TimeEntry>, ServiceError> {
        let row = match entry_id {
            Some(entry_id) => {
                sqlx::query_as::<_, EntryRow>(
                    "SELECT id, user_id, project_id, description, start_time, end_time, duration_minutes, is_active
                     FROM time_entries WHERE user_id = ? AND is_active = 1 AND id = ?",
                )
                .bind(user_id)
                .bind(entry_id)
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, EntryRow>(
                    "SELECT id, user_id, project_id, description, start_time, end_time, duration_minutes, is_active
                     FROM time_entries WHERE user_id = ? AND is_active = 1",
                )
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(row.map(TimeEntry::from))
    }

    async fn update(&self, entry: &TimeEntry) -> Result<(), ServiceError> {
        let start_time = entry.start_time.naive_utc();
        let end_time = entry.end_time.map(|dt| dt.naive_utc());
        sqlx::query(
            "UPDATE time_entries
             SET project_id = ?, description = ?, start_time = ?, end_time = ?, duration_minutes = ?, is_active = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&entry.project_id)
        .bind(&entry.description)
        .bind(start_time)
        .bind(end_time)
        .bind(entry.duration_minutes)
        .bind(entry.is_active)
        .bind(&entry.id)
        .bind(&entry.user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, user_id: &str, entry_id: &str) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM time_entries WHERE id = ? AND user_id = ?")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_scoped(
        &self,
        scope: &QueryScope,
    ) -> Result<(Vec<EntryWithProject>, i64), ServiceError> {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {}, p.name AS project_name, p.client_name \
             FROM time_entries e JOIN projects p ON p.id = e.project_id WHERE 1 = 1",
            ENTRY_COLUMNS
        ));
        push_scope_filters(&mut builder, scope);
        builder.push(order_clause(scope.sort_by, scope.sort_order));
        builder
            .push(" LIMIT ")
            .push_bind(scope.limit)
            .push(" OFFSET ")
            .push_bind(scope.offset);

        let rows: Vec<EntryWithProjectRow> =
            builder.build_query_as().fetch_all(&self.pool).await?;

        let mut count_builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT COUNT(*) FROM time_entries e JOIN projects p ON p.id = e.project_id WHERE 1 = 1",
        );
        push_scope_filters(&mut count_builder, scope);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok((rows.into_iter().map(EntryWithProject::from).collect(), total))
    }

    async fn find_for_scope(
        &self,
        users: &UserScope,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<EntryWithProject>, ServiceError> {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT {}, p.name AS project_name, p.client_name \
             FROM time_entries e JOIN projects p ON p.id = e.project_id WHERE 1 = 1",
            ENTRY_COLUMNS
        ));
        push_user_filter(&mut builder, users);
        push_date_bounds(&mut builder, from, to);
        builder.push(" ORDER BY e.start_time ASC");

        let rows: Vec<EntryWithProjectRow> =
            builder.build_query_as().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(EntryWithProject::from).collect())
    }

    async fn last_started_at(
        &self,
        users: &UserScope,
    ) -> Result<Option<DateTime<Utc>>, ServiceError> {
        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT MAX(start_time) FROM time_entries e WHERE 1 = 1");
        push_user_filter(&mut builder, users);

        let latest: Option<NaiveDateTime> = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(latest.map(|dt| dt.and_utc()))
    }
}
