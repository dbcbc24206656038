use crate::models::{PrincipalRecord, ServiceError};
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Stored side of the role precedence rule: a principal's database role and
/// direct-report list. The claim side arrives with the request.
#[async_trait]
pub trait PrincipalRepository: Send + Sync {
    async fn find_by_id(&self, principal_id: &str)
        -> Result<Option<PrincipalRecord>, ServiceError>;
}

pub struct SqlitePrincipalRepository {
    pool: SqlitePool,
}

impl SqlitePrincipalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PrincipalRow {
    id: String,
    role: Option<String>,
    direct_reports: Option<String>,
}

#[async_trait]
impl PrincipalRepository for SqlitePrincipalRepository {
    async fn find_by_id(
        &self,
        principal_id: &str,
    ) -> Result<Option<PrincipalRecord>, ServiceError> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            "SELECT id, role, direct_reports FROM principals WHERE id = ?",
        )
        .bind(principal_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            // direct_reports is a JSON array of principal ids; an absent or
            // malformed value means no delegated access.
            let direct_reports = row
                .direct_reports
                .as_deref()
                .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
                .unwrap_or_default();

            PrincipalRecord {
                id: row.id,
                role: row.role,
                direct_reports,
            }
        }))
    }
}
