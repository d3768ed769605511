//! PostgreSQL implementation of zone repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewZone, Zone, ZonePatch};
use crate::domain::repositories::ZoneRepository;
use crate::error::AppError;

const ZONE_COLUMNS: &str = "id, name, owner, description, created_at, updated_at";

/// PostgreSQL repository for zones.
pub struct PgZoneRepository {
    pool: Arc<PgPool>,
}

impl PgZoneRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ZoneRepository for PgZoneRepository {
    async fn create(&self, new_zone: NewZone) -> Result<Zone, AppError> {
        let sql = format!(
            "INSERT INTO file_zones (name, owner, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $4) RETURNING {}",
            ZONE_COLUMNS
        );

        let zone = sqlx::query_as::<_, Zone>(&sql)
            .bind(new_zone.name)
            .bind(new_zone.owner)
            .bind(new_zone.description)
            .bind(new_zone.created_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(zone)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Zone>, AppError> {
        let sql = format!("SELECT {} FROM file_zones WHERE id = $1", ZONE_COLUMNS);

        let zone = sqlx::query_as::<_, Zone>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(zone)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Zone>, AppError> {
        let sql = format!("SELECT {} FROM file_zones WHERE name = $1", ZONE_COLUMNS);

        let zone = sqlx::query_as::<_, Zone>(&sql)
            .bind(name)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(zone)
    }

    async fn list(&self) -> Result<Vec<Zone>, AppError> {
        let sql = format!("SELECT {} FROM file_zones ORDER BY id", ZONE_COLUMNS);

        let zones = sqlx::query_as::<_, Zone>(&sql)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(zones)
    }

    async fn update(
        &self,
        id: i64,
        patch: ZonePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Zone>, AppError> {
        let sql = format!(
            r#"
            UPDATE file_zones
            SET name        = COALESCE($2, name),
                owner       = COALESCE($3, owner),
                description = COALESCE($4, description),
                updated_at  = $5
            WHERE id = $1
            RETURNING {}
            "#,
            ZONE_COLUMNS
        );

        let zone = sqlx::query_as::<_, Zone>(&sql)
            .bind(id)
            .bind(patch.name)
            .bind(patch.owner)
            .bind(patch.description)
            .bind(updated_at)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(zone)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM file_zones WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
