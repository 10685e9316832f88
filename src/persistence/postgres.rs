//! PostgreSQL implementation of the repository.
//!
//! All collections share the `resources` table; each row holds one
//! serialized record as JSONB, discriminated by `kind`. `position` is a
//! `BIGSERIAL` and gives the insertion order.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::Repository;
use crate::domain::{Record, ResourceId};
use crate::error::CmsError;

/// Opens a connection pool and applies pending migrations.
///
/// # Errors
///
/// Returns [`CmsError::Persistence`] if the database is unreachable or a
/// migration fails.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    connect_timeout: Duration,
) -> Result<PgPool, CmsError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(connect_timeout)
        .connect(database_url)
        .await?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .map_err(|e| CmsError::Persistence(format!("migration failed: {e}")))?;

    tracing::info!(max_connections, "connected to postgres");
    Ok(pool)
}

/// PostgreSQL-backed repository for one collection.
#[derive(Debug)]
pub struct PostgresRepository<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for PostgresRepository<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> PostgresRepository<R> {
    /// Creates a repository over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }

    fn kind() -> &'static str {
        R::KIND.collection()
    }

    fn decode(body: serde_json::Value) -> Result<R, CmsError> {
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl<R: Record> Repository<R> for PostgresRepository<R> {
    async fn list(&self) -> Result<Vec<R>, CmsError> {
        let rows = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT body FROM resources WHERE kind = $1 ORDER BY position ASC",
        )
        .bind(Self::kind())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::decode).collect()
    }

    async fn get(&self, id: &ResourceId) -> Result<R, CmsError> {
        let row = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT body FROM resources WHERE kind = $1 AND id = $2",
        )
        .bind(Self::kind())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::decode)
            .transpose()?
            .ok_or_else(|| CmsError::not_found(R::KIND, id))
    }

    async fn insert(&self, record: R) -> Result<R, CmsError> {
        let body = serde_json::to_value(&record)?;
        let inserted = sqlx::query_scalar::<_, i64>(
            "INSERT INTO resources (kind, id, body, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (kind, id) DO NOTHING RETURNING position",
        )
        .bind(Self::kind())
        .bind(record.id().as_str())
        .bind(&body)
        .bind(record.created_at())
        .bind(record.updated_at())
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(_) => Ok(record),
            None => Err(CmsError::Conflict(format!(
                "{} {} already exists",
                R::KIND,
                record.id()
            ))),
        }
    }

    async fn update(
        &self,
        id: &ResourceId,
        patch: R::Patch,
        now: DateTime<Utc>,
    ) -> Result<R, CmsError> {
        let mut tx = self.pool.begin().await?;

        let body = sqlx::query_scalar::<_, serde_json::Value>(
            "SELECT body FROM resources WHERE kind = $1 AND id = $2 FOR UPDATE",
        )
        .bind(Self::kind())
        .bind(id.as_str())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CmsError::not_found(R::KIND, id))?;

        let mut record = Self::decode(body)?;
        record.apply_patch(patch, now);

        sqlx::query("UPDATE resources SET body = $3, updated_at = $4 WHERE kind = $1 AND id = $2")
            .bind(Self::kind())
            .bind(id.as_str())
            .bind(serde_json::to_value(&record)?)
            .bind(record.updated_at())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn remove(&self, id: &ResourceId) -> Result<R, CmsError> {
        let body = sqlx::query_scalar::<_, serde_json::Value>(
            "DELETE FROM resources WHERE kind = $1 AND id = $2 RETURNING body",
        )
        .bind(Self::kind())
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CmsError::not_found(R::KIND, id))?;

        Self::decode(body)
    }

    async fn len(&self) -> Result<usize, CmsError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM resources WHERE kind = $1")
            .bind(Self::kind())
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}
