use sqlx::PgPool;

use crate::core::error::{AppError, Result};

/// Lookup service over the externally-owned tag catalogue.
pub struct TagService {
    pool: PgPool,
}

impl TagService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Filter a candidate id list down to the ids that exist. Unknown ids
    /// are dropped silently.
    pub async fn resolve_existing(&self, ids: &[String]) -> Result<Vec<String>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_scalar::<_, String>("SELECT id FROM tags WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to resolve tag ids: {:?}", e);
                AppError::Database(e)
            })
    }
}
