use crate::models::ServiceError;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::SqlitePool;

/// Project catalog entry. Projects and clients are owned elsewhere; the
/// engine only needs existence checks and names for search/reporting.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub client_name: Option<String>,
}

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn exists(&self, project_id: &str) -> Result<bool, ServiceError>;
    async fn find_by_id(&self, project_id: &str) -> Result<Option<Project>, ServiceError>;
}

pub struct SqliteProjectRepository {
    pool: SqlitePool,
}

impl SqliteProjectRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqliteProjectRepository {
    async fn exists(&self, project_id: &str) -> Result<bool, ServiceError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE id = ?")
            .bind(project_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn find_by_id(&self, project_id: &str) -> Result<Option<Project>, ServiceError> {
        let project = sqlx::query_as::<_, Project>(
            "SELECT id, name, client_name FROM projects WHERE id = ?",
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(project)
    }
}
