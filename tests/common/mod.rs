#![allow(dead_code)]

use chrono::NaiveDateTime;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::sync::Arc;
use tempfile::TempDir;
use timetrack_core::{
    repositories::{
        entry_repository::{SqliteTimeEntryRepository, TimeEntryRepository},
        principal_repository::SqlitePrincipalRepository,
        project_repository::SqliteProjectRepository,
    },
    services::{IdentityService, ReportService, TimerService},
};
use uuid::Uuid;

pub struct TestApp {
    pub pool: SqlitePool,
    pub entries: Arc<dyn TimeEntryRepository>,
    pub timers: Arc<TimerService>,
    pub reports: ReportService,
    pub identity: IdentityService,
    #[allow(dead_code)]
    pub temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        // Create temporary database
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        // Create connection pool
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .expect("Failed to create database pool");

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let entry_repository = Arc::new(SqliteTimeEntryRepository::new(pool.clone()));
        let project_repository = Arc::new(SqliteProjectRepository::new(pool.clone()));
        let principal_repository = Arc::new(SqlitePrincipalRepository::new(pool.clone()));

        let entries: Arc<dyn TimeEntryRepository> = entry_repository;
        let timers = Arc::new(TimerService::new(entries.clone(), project_repository));
        let reports = ReportService::new(entries.clone());
        let identity = IdentityService::new(principal_repository);

        Self {
            pool,
            entries,
            timers,
            reports,
            identity,
            temp_dir,
        }
    }

    pub async fn seed_project(&self, id: &str, name: &str, client_name: Option<&str>) {
        sqlx::query("INSERT INTO projects (id, name, client_name) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(client_name)
            .execute(&self.pool)
            .await
            .expect("Failed to seed project");
    }

    pub async fn seed_principal(&self, id: &str, role: Option<&str>, direct_reports: &[&str]) {
        let reports_json = serde_json::to_string(direct_reports).unwrap();
        sqlx::query("INSERT INTO principals (id, role, direct_reports) VALUES (?, ?, ?)")
            .bind(id)
            .bind(role)
            .bind(reports_json)
            .execute(&self.pool)
            .await
            .expect("Failed to seed principal");
    }

    /// Insert a closed entry with an explicit time range and duration.
    pub async fn seed_entry(
        &self,
        user_id: &str,
        project_id: &str,
        description: &str,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        duration_minutes: i64,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO time_entries (id, user_id, project_id, description, start_time, end_time, duration_minutes, is_active)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(project_id)
        .bind(description)
        .bind(start_time)
        .bind(end_time)
        .bind(duration_minutes)
        .execute(&self.pool)
        .await
        .expect("Failed to seed entry");
        id
    }

    /// Insert a running entry (no end time, no duration).
    pub async fn seed_active_entry(
        &self,
        user_id: &str,
        project_id: &str,
        description: &str,
        start_time: NaiveDateTime,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO time_entries (id, user_id, project_id, description, start_time, is_active)
             VALUES (?, ?, ?, ?, ?, 1)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(project_id)
        .bind(description)
        .bind(start_time)
        .execute(&self.pool)
        .await
        .expect("Failed to seed active entry");
        id
    }
}

pub fn ts(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").expect("bad test timestamp")
}
